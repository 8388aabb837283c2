//! JSONL report emission with artifact integrity.
//!
//! Each storm run becomes one JSONL line; the emitted bytes are digested
//! with SHA-256 so a report can be referenced from other artifacts without
//! trusting its path alone.

use std::fs;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::storm::StormMetrics;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no storm records to emit")]
    EmptyReport,
}

/// One JSONL record: a storm run plus correlation fields.
#[derive(Debug, Clone, Serialize)]
pub struct StormRecord {
    pub trace_id: String,
    pub event: &'static str,
    #[serde(flatten)]
    pub metrics: StormMetrics,
}

impl StormRecord {
    #[must_use]
    pub fn new(run_index: usize, metrics: StormMetrics) -> Self {
        Self {
            trace_id: format!(
                "harness::storm::{}::{}::{run_index:04}",
                metrics.shape, metrics.policy
            ),
            event: "storm_settled",
            metrics,
        }
    }
}

/// Digest over an emitted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDigest {
    pub path: String,
    pub sha256: String,
    pub records: usize,
}

/// Renders records as JSONL (one JSON object per line).
pub fn render_jsonl(records: &[StormRecord]) -> Result<String, HarnessError> {
    if records.is_empty() {
        return Err(HarnessError::EmptyReport);
    }
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Writes records as JSONL to `path` and returns the artifact digest.
pub fn write_jsonl(path: &Path, records: &[StormRecord]) -> Result<ArtifactDigest, HarnessError> {
    let rendered = render_jsonl(records)?;
    fs::write(path, rendered.as_bytes())?;
    Ok(ArtifactDigest {
        path: path.display().to_string(),
        sha256: sha256_hex(rendered.as_bytes()),
        records: records.len(),
    })
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> StormMetrics {
        StormMetrics {
            shape: "sawtooth",
            policy: "hybrid",
            ops: 100,
            peak_live_bytes: 2048,
            segment_size: 4096,
            free_bytes: 4096,
            free_blocks: 1,
            fragmentation_ratio: 0.25,
        }
    }

    #[test]
    fn test_render_is_one_object_per_line() {
        let records = vec![
            StormRecord::new(0, sample_metrics()),
            StormRecord::new(1, sample_metrics()),
        ];
        let rendered = render_jsonl(&records).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["event"], "storm_settled");
            // Flattened metrics sit at the top level.
            assert_eq!(value["policy"], "hybrid");
            assert_eq!(value["free_blocks"], 1);
        }
    }

    #[test]
    fn test_empty_report_is_an_error() {
        assert!(matches!(
            render_jsonl(&[]),
            Err(HarnessError::EmptyReport)
        ));
    }

    #[test]
    fn test_digest_is_stable_over_content() {
        let records = vec![StormRecord::new(0, sample_metrics())];
        let a = render_jsonl(&records).unwrap();
        let b = render_jsonl(&records).unwrap();
        assert_eq!(sha256_hex(a.as_bytes()), sha256_hex(b.as_bytes()));
        assert_eq!(sha256_hex(a.as_bytes()).len(), 64);
    }

    #[test]
    fn test_write_reports_record_count() {
        let dir = std::env::temp_dir().join("brkheap-harness-report-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("storms.jsonl");

        let records = vec![
            StormRecord::new(0, sample_metrics()),
            StormRecord::new(1, sample_metrics()),
        ];
        let digest = write_jsonl(&path, &records).unwrap();
        assert_eq!(digest.records, 2);
        assert_eq!(
            digest.sha256,
            sha256_hex(fs::read(&path).unwrap().as_slice())
        );
    }
}
