//! Result Store — persists the corpus document as one JSON file.
//!
//! Writes are whole-document and atomic: the JSON is written to a temp file
//! in the destination directory, then renamed over the target. There is no
//! partial or streaming write, so a killed run never leaves a torn document.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::corpus::models::CorpusResult;
use crate::errors::PipelineError;

/// Saves the full corpus result to `path`, creating parent directories as
/// needed.
pub fn save(result: &CorpusResult, path: &Path) -> Result<(), PipelineError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            fs::create_dir_all(p)?;
            p
        }
        _ => Path::new("."),
    };

    let json = serde_json::to_vec_pretty(result)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&json)?;
    tmp.persist(path)
        .map_err(|e| PipelineError::Store(format!("failed to persist {}: {e}", path.display())))?;

    info!("results saved to {}", path.display());
    Ok(())
}

/// Loads a previously saved corpus result. A missing file is `None` (first
/// run); an unreadable or corrupt document is an error.
pub fn load(path: &Path) -> Result<Option<CorpusResult>, PipelineError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let result = serde_json::from_str(&contents)?;
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::models::{FailedFile, FileRecord, FileResult};
    use crate::extraction::models::PassOutput;
    use crate::extraction::passes::ExtractorVariant;
    use crate::normalize::ParseFailure;
    use serde_json::json;

    fn sample_corpus() -> CorpusResult {
        let mut corpus = CorpusResult::new(ExtractorVariant::Standard);
        corpus.processed_files = vec![
            FileRecord::Extracted(Box::new(FileResult {
                file_name: "a.txt".to_string(),
                transcript_length: 512,
                constructs_identified: 2,
                domains_constructs: PassOutput::Parsed(json!({
                    "constructs_mentioned": [
                        {"construct_name": "Sleep Quality"},
                        {"construct_name": "HRV"}
                    ]
                })),
                assessments: PassOutput::Failed(ParseFailure {
                    error: "JSON parsing failed: EOF while parsing".to_string(),
                    raw_response: "{\"assessments\": [".to_string(),
                }),
                interventions: PassOutput::Parsed(json!({"interventions": []})),
                relationships: PassOutput::Parsed(json!({})),
                native_data: None,
            })),
            FileRecord::Failed(FailedFile {
                file_name: "b.txt".to_string(),
                error: "completion service error".to_string(),
            }),
        ];
        corpus.recompute_summary(ExtractorVariant::Standard);
        corpus
    }

    #[test]
    fn test_save_load_round_trip_including_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs").join("extraction_results.json");

        let corpus = sample_corpus();
        save(&corpus, &path).unwrap();
        let loaded = load(&path).unwrap().unwrap();

        assert_eq!(loaded, corpus);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("out.json");
        save(&sample_corpus(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_save_overwrites_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut corpus = sample_corpus();
        save(&corpus, &path).unwrap();
        corpus.processed_files.pop();
        corpus.recompute_summary(ExtractorVariant::Standard);
        save(&corpus, &path).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.processed_files.len(), 1);
    }
}
