//! Corpus Driver — iterates a folder of transcripts through the sequencer.
//!
//! Each transcript runs inside an isolation boundary: an error escaping the
//! sequencer (transport failure, unreadable file) is recorded as a failed
//! stub and the run continues with the next file. A pacing delay between
//! transcripts keeps the run under the completion service's rate limit —
//! throughput throttle, not correctness. Cancellation is cooperative and
//! checked between transcripts only, never mid-pass.

pub mod models;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::corpus::models::{merge_records, CorpusResult, FailedFile, FileRecord};
use crate::errors::PipelineError;
use crate::extraction::passes::ExtractorVariant;
use crate::extraction::{sequencer, Transcript};
use crate::llm_client::CompletionClient;

/// Shared cancellation flag, set from a signal handler.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

const DEFAULT_PACING: Duration = Duration::from_millis(1000);

pub struct CorpusDriver<'a> {
    client: &'a dyn CompletionClient,
    variant: ExtractorVariant,
    pacing: Duration,
    cancel: CancelFlag,
}

impl<'a> CorpusDriver<'a> {
    pub fn new(client: &'a dyn CompletionClient, variant: ExtractorVariant) -> Self {
        Self {
            client,
            variant,
            pacing: DEFAULT_PACING,
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Processes every `.txt` transcript in `folder`, merging into `previous`
    /// when resuming. Always returns a result — per-file failures are data,
    /// not errors. Only configuration-level problems (missing folder, no
    /// transcripts at all) fail the call.
    pub async fn process_folder(
        &self,
        folder: &Path,
        previous: Option<CorpusResult>,
    ) -> Result<CorpusResult, PipelineError> {
        if !folder.is_dir() {
            return Err(PipelineError::Config(format!(
                "transcript folder not found: {}",
                folder.display()
            )));
        }

        let files = enumerate_transcripts(folder);
        if files.is_empty() {
            return Err(PipelineError::Config(format!(
                "no .txt transcript files found in {}",
                folder.display()
            )));
        }
        info!("found {} transcript files", files.len());

        let done: Vec<String> = previous
            .as_ref()
            .map(|p| {
                p.completed_identities()
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut fresh: Vec<FileRecord> = Vec::new();
        let mut processed_any = false;

        for (i, path) in files.iter().enumerate() {
            let file_name = file_identity(path);

            if done.iter().any(|d| d == &file_name) {
                debug!("[{}/{}] skipping {file_name} (already processed)", i + 1, files.len());
                continue;
            }
            if self.cancel.is_cancelled() {
                warn!("cancellation requested, stopping before {file_name}");
                break;
            }
            if processed_any {
                tokio::time::sleep(self.pacing).await;
            }

            info!("[{}/{}] {file_name}", i + 1, files.len());
            fresh.push(self.process_one(path, &file_name).await);
            processed_any = true;
        }

        let mut result = previous.unwrap_or_else(|| CorpusResult::new(self.variant));
        result.processed_files = merge_records(result.processed_files, fresh);
        result.recompute_summary(self.variant);
        // Provenance of the run that last wrote the document.
        result.summary.run_id = uuid::Uuid::new_v4();
        result.summary.completed_at = chrono::Utc::now();
        Ok(result)
    }

    /// The per-transcript isolation boundary: nothing thrown past here.
    async fn process_one(&self, path: &Path, file_name: &str) -> FileRecord {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to read {file_name}: {e}");
                return FileRecord::Failed(FailedFile {
                    file_name: file_name.to_string(),
                    error: format!("failed to read transcript: {e}"),
                });
            }
        };

        let transcript = Transcript::new(file_name, text);
        match sequencer::process_transcript(self.client, self.variant, &transcript).await {
            Ok(result) => FileRecord::Extracted(Box::new(result)),
            Err(e) => {
                error!("error processing {file_name}: {e}");
                FileRecord::Failed(FailedFile {
                    file_name: file_name.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }
}

/// Top-level `.txt` files in the folder, sorted by name so corpus runs and
/// incremental resumes are deterministic.
fn enumerate_transcripts(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    files
}

fn file_identity(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::CompletionError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Succeeds with minimal valid JSON, except for transcripts whose text
    /// contains the poison marker, which trip a transport error. Counts
    /// every completion call.
    struct PoisonableClient {
        calls: AtomicUsize,
    }

    impl PoisonableClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for PoisonableClient {
        async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("POISON") {
                return Err(CompletionError::Api {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            Ok(r#"{"constructs_mentioned": [{"construct_name": "Sleep Quality"}]}"#.to_string())
        }
    }

    fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
        for (name, text) in files {
            std::fs::write(dir.join(name), text).unwrap();
        }
    }

    fn driver(client: &PoisonableClient) -> CorpusDriver<'_> {
        CorpusDriver::new(client, ExtractorVariant::Standard).with_pacing(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_missing_folder_is_config_error() {
        let client = PoisonableClient::new();
        let result = driver(&client)
            .process_folder(Path::new("/nonexistent/transcripts"), None)
            .await;
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_folder_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = PoisonableClient::new();
        let result = driver(&client).process_folder(dir.path(), None).await;
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[tokio::test]
    async fn test_non_txt_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("a.txt", "interview"), ("notes.md", "skip me")]);
        let client = PoisonableClient::new();
        let result = driver(&client).process_folder(dir.path(), None).await.unwrap();
        assert_eq!(result.summary.total, 1);
    }

    #[tokio::test]
    async fn test_one_bad_transcript_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(
            dir.path(),
            &[
                ("a.txt", "clean interview"),
                ("b.txt", "POISON interview"),
                ("c.txt", "another clean interview"),
            ],
        );

        let client = PoisonableClient::new();
        let result = driver(&client).process_folder(dir.path(), None).await.unwrap();

        assert_eq!(result.summary.total, 3);
        assert_eq!(result.summary.successful, 2);
        assert_eq!(result.summary.failed, 1);

        let failed: Vec<&str> = result
            .processed_files
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.file_name())
            .collect();
        assert_eq!(failed, vec!["b.txt"]);
        // The files after the failure were still fully processed.
        assert!(result
            .processed_files
            .iter()
            .any(|r| r.file_name() == "c.txt" && !r.is_failed()));
    }

    #[tokio::test]
    async fn test_results_are_in_sorted_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("b.txt", "x"), ("a.txt", "x"), ("c.txt", "x")]);
        let client = PoisonableClient::new();
        let result = driver(&client).process_folder(dir.path(), None).await.unwrap();

        let names: Vec<&str> = result.processed_files.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn test_incremental_second_run_makes_zero_calls() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("a.txt", "x"), ("b.txt", "x")]);

        let client = PoisonableClient::new();
        let first = driver(&client).process_folder(dir.path(), None).await.unwrap();
        let calls_after_first = client.call_count();
        assert_eq!(first.summary.successful, 2);

        let second = driver(&client)
            .process_folder(dir.path(), Some(first.clone()))
            .await
            .unwrap();

        assert_eq!(client.call_count(), calls_after_first);
        assert_eq!(second.summary.successful, first.summary.successful);
        assert_eq!(second.summary.total, first.summary.total);
    }

    #[tokio::test]
    async fn test_incremental_run_retries_failed_stubs() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("a.txt", "POISON")]);

        let client = PoisonableClient::new();
        let first = driver(&client).process_folder(dir.path(), None).await.unwrap();
        assert_eq!(first.summary.failed, 1);

        // Fix the transcript; the failed identity is reprocessed.
        write_corpus(dir.path(), &[("a.txt", "now clean")]);
        let second = driver(&client)
            .process_folder(dir.path(), Some(first))
            .await
            .unwrap();

        assert_eq!(second.summary.failed, 0);
        assert_eq!(second.summary.successful, 1);
        assert_eq!(second.summary.total, 1);
    }

    #[tokio::test]
    async fn test_new_files_merge_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("a.txt", "x")]);

        let client = PoisonableClient::new();
        let first = driver(&client).process_folder(dir.path(), None).await.unwrap();

        write_corpus(dir.path(), &[("b.txt", "x")]);
        let second = driver(&client)
            .process_folder(dir.path(), Some(first))
            .await
            .unwrap();

        assert_eq!(second.summary.total, 2);
        let names: Vec<&str> = second.processed_files.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_api_call_estimate_matches_pass_count() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("a.txt", "x"), ("b.txt", "x")]);
        let client = PoisonableClient::new();
        let result = driver(&client).process_folder(dir.path(), None).await.unwrap();

        assert_eq!(
            result.summary.total_api_calls,
            2 * ExtractorVariant::Standard.pass_count()
        );
        assert_eq!(client.call_count(), result.summary.total_api_calls);
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_transcripts() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[("a.txt", "x"), ("b.txt", "x"), ("c.txt", "x")]);

        let client = PoisonableClient::new();
        let cancel = CancelFlag::default();
        cancel.cancel();

        let result = CorpusDriver::new(&client, ExtractorVariant::Standard)
            .with_pacing(Duration::from_millis(0))
            .with_cancel_flag(cancel)
            .process_folder(dir.path(), None)
            .await
            .unwrap();

        assert_eq!(result.summary.total, 0);
        assert_eq!(client.call_count(), 0);
    }
}
