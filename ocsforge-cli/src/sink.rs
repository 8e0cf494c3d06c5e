//! Local-directory batch sink.
//!
//! Writes one NDJSON file per partition under
//! `<root>/<source>[/<SCHEMA>]/eventDay=<day>/<uuid>.ndjson`, and
//! unmapped records under `<root>/unmapped/` for audit. Columnar
//! conversion and durable object storage belong to external
//! collaborators; this sink exists so batches can be exercised and
//! inspected locally.

use std::path::PathBuf;

use ocsforge_core::error::{OcsforgeError, StorageError};
use ocsforge_core::pipeline::RecordSink;
use ocsforge_core::types::{PartitionKey, TransformedRecord, UnmappedRecord};

/// Directory name for the unmapped audit bucket.
const UNMAPPED_DIR: &str = "unmapped";

/// Local-directory sink writing NDJSON partition files.
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    /// Create a sink rooted at the given output directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write_lines(&self, dir: PathBuf, lines: String) -> Result<PathBuf, OcsforgeError> {
        std::fs::create_dir_all(&dir).map_err(|e| {
            OcsforgeError::Storage(StorageError::Write {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })
        })?;

        let path = dir.join(format!("{}.ndjson", uuid::Uuid::new_v4().simple()));
        std::fs::write(&path, lines).map_err(|e| {
            OcsforgeError::Storage(StorageError::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;

        Ok(path)
    }
}

impl RecordSink for DirSink {
    fn name(&self) -> &str {
        "local-dir"
    }

    fn write_mapped(
        &self,
        partition: &PartitionKey,
        records: &[TransformedRecord],
    ) -> Result<(), OcsforgeError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut dir = self.root.join(&partition.source);
        if let Some(schema) = &partition.schema {
            dir = dir.join(schema.to_uppercase());
        }
        dir = dir.join(format!("eventDay={}", partition.event_day));

        let mut lines = String::new();
        for record in records {
            let line = serde_json::to_string(&record.target_mapping).map_err(|e| {
                OcsforgeError::Storage(StorageError::Write {
                    path: dir.display().to_string(),
                    reason: format!("serialization failed: {e}"),
                })
            })?;
            lines.push_str(&line);
            lines.push('\n');
        }

        let path = self.write_lines(dir, lines)?;
        tracing::info!(
            partition = %partition,
            records = records.len(),
            path = %path.display(),
            "wrote transformed records"
        );
        Ok(())
    }

    fn write_unmapped(&self, records: &[UnmappedRecord]) -> Result<(), OcsforgeError> {
        if records.is_empty() {
            return Ok(());
        }

        let dir = self.root.join(UNMAPPED_DIR);
        let mut lines = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| {
                OcsforgeError::Storage(StorageError::Write {
                    path: dir.display().to_string(),
                    reason: format!("serialization failed: {e}"),
                })
            })?;
            lines.push_str(&line);
            lines.push('\n');
        }

        let path = self.write_lines(dir, lines)?;
        tracing::info!(
            records = records.len(),
            path = %path.display(),
            "wrote unmapped records for audit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocsforge_core::types::UnmappedReason;
    use serde_json::json;

    fn sample_record(schema: &str) -> TransformedRecord {
        TransformedRecord {
            source: "windows-sysmon".to_owned(),
            target_schema: schema.to_owned(),
            target_mapping: json!({"activity_id": 1}),
            event_day: "20240115".to_owned(),
        }
    }

    #[test]
    fn writes_partition_file_with_schema_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirSink::new(dir.path());

        let partition = PartitionKey {
            source: "windows-sysmon".to_owned(),
            schema: Some("process_activity".to_owned()),
            event_day: "20240115".to_owned(),
        };
        sink.write_mapped(
            &partition,
            &[sample_record("process_activity"), sample_record("process_activity")],
        )
        .unwrap();

        let partition_dir = dir
            .path()
            .join("windows-sysmon/PROCESS_ACTIVITY/eventDay=20240115");
        let files: Vec<_> = std::fs::read_dir(&partition_dir).unwrap().collect();
        assert_eq!(files.len(), 1);

        let content =
            std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.contains("activity_id")));
    }

    #[test]
    fn writes_partition_without_schema_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirSink::new(dir.path());

        let partition = PartitionKey {
            source: "alb".to_owned(),
            schema: None,
            event_day: "20240115".to_owned(),
        };
        sink.write_mapped(&partition, &[sample_record("http_activity")])
            .unwrap();

        assert!(dir.path().join("alb/eventDay=20240115").is_dir());
    }

    #[test]
    fn writes_unmapped_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirSink::new(dir.path());

        let records = vec![UnmappedRecord {
            source: Some("alb".to_owned()),
            reason: UnmappedReason::NoMappingForType {
                matched_value: "h2".to_owned(),
            },
            payload: json!({"type": "h2"}),
        }];
        sink.write_unmapped(&records).unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path().join("unmapped")).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn empty_batches_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirSink::new(dir.path());

        let partition = PartitionKey {
            source: "alb".to_owned(),
            schema: None,
            event_day: "20240115".to_owned(),
        };
        sink.write_mapped(&partition, &[]).unwrap();
        sink.write_unmapped(&[]).unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
