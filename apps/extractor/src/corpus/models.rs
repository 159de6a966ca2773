//! Persisted corpus document shapes.
//!
//! `CorpusResult` is the only cross-process contract: the viewer reads this
//! document and nothing else, so its legacy blocks stay schema-stable across
//! extractor variants. Everything round-trips losslessly, failure markers
//! included.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::models::PassOutput;
use crate::extraction::passes::ExtractorVariant;

/// One fully processed transcript: legacy-shaped blocks plus the variant's
/// native per-pass data. Immutable once assembled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileResult {
    pub file_name: String,
    pub transcript_length: usize,
    pub constructs_identified: usize,
    pub domains_constructs: PassOutput,
    pub assessments: PassOutput,
    pub interventions: PassOutput,
    pub relationships: PassOutput,
    /// Full per-pass record for the robust/guided variants, keyed by pass
    /// name. Absent for the standard variant, whose passes already ARE the
    /// legacy blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_data: Option<BTreeMap<String, PassOutput>>,
}

/// Stub recorded when a transcript failed outside the per-pass boundary
/// (unreadable file, completion-service error). No partial data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedFile {
    pub file_name: String,
    pub error: String,
}

/// One entry of `processed_files`, keyed by transcript identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FileRecord {
    Failed(FailedFile),
    Extracted(Box<FileResult>),
}

impl FileRecord {
    pub fn file_name(&self) -> &str {
        match self {
            FileRecord::Failed(f) => &f.file_name,
            FileRecord::Extracted(r) => &r.file_name,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileRecord::Failed(_))
    }

    pub fn as_extracted(&self) -> Option<&FileResult> {
        match self {
            FileRecord::Extracted(r) => Some(r),
            FileRecord::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub extraction_type: String,
    /// Estimated completion calls: successful files × passes per file.
    pub total_api_calls: usize,
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

impl CorpusSummary {
    fn empty(variant: ExtractorVariant) -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            extraction_type: variant.label().to_string(),
            total_api_calls: 0,
            run_id: Uuid::new_v4(),
            completed_at: Utc::now(),
        }
    }
}

/// The whole-corpus result document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusResult {
    pub processed_files: Vec<FileRecord>,
    pub summary: CorpusSummary,
}

impl CorpusResult {
    pub fn new(variant: ExtractorVariant) -> Self {
        Self {
            processed_files: Vec::new(),
            summary: CorpusSummary::empty(variant),
        }
    }

    /// Identities processed without error — the skip set for incremental
    /// resume. Failed stubs are NOT included, so they get retried.
    pub fn completed_identities(&self) -> HashSet<&str> {
        self.processed_files
            .iter()
            .filter(|r| !r.is_failed())
            .map(|r| r.file_name())
            .collect()
    }

    /// Recomputes every summary count from `processed_files`. Counts are
    /// never incremented across merges — always derived, so repeated
    /// incremental runs cannot drift or double count.
    pub fn recompute_summary(&mut self, variant: ExtractorVariant) {
        let successful = self.processed_files.iter().filter(|r| !r.is_failed()).count();
        self.summary.total = self.processed_files.len();
        self.summary.successful = successful;
        self.summary.failed = self.processed_files.len() - successful;
        self.summary.extraction_type = variant.label().to_string();
        self.summary.total_api_calls = successful * variant.pass_count();
    }
}

/// Merges freshly processed records into a previous run's records.
/// Same identity overwrites in place (never duplicates); new identities
/// append in processing order.
pub fn merge_records(previous: Vec<FileRecord>, fresh: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut merged = previous;
    for record in fresh {
        match merged
            .iter_mut()
            .find(|existing| existing.file_name() == record.file_name())
        {
            Some(slot) => *slot = record,
            None => merged.push(record),
        }
    }
    merged
}
