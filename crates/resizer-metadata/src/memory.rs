//! In-memory metadata recorder for tests and dry runs

use crate::traits::{require_table, MetadataError, MetadataRecorder, MetadataResult};
use crate::MetadataBackend;
use async_trait::async_trait;
use resizer_core::MetadataRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryRecorder {
    // (table, id) -> record; later puts overwrite
    records: Mutex<HashMap<(String, String), MetadataRecord>>,
    puts: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `put` fail with `WriteFailed`
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Number of `put` calls that reached the store, successful or not
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn get(&self, table: &str, id: &str) -> Option<MetadataRecord> {
        self.records
            .lock()
            .await
            .get(&(table.to_string(), id.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MetadataRecorder for MemoryRecorder {
    async fn put(&self, record: &MetadataRecord) -> MetadataResult<()> {
        let table = require_table(record)?;
        self.puts.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MetadataError::WriteFailed {
                table: table.to_string(),
                id: record.id.clone(),
                message: "injected failure".to_string(),
            });
        }

        self.records
            .lock()
            .await
            .insert((table.to_string(), record.id.clone()), record.clone());
        Ok(())
    }

    fn backend_type(&self) -> MetadataBackend {
        MetadataBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, timestamp: i64) -> MetadataRecord {
        MetadataRecord {
            id: id.to_string(),
            timestamp,
            extension: "png".to_string(),
            filename: None,
            table: "UserImages".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let recorder = MemoryRecorder::new();
        recorder.put(&record("a", 1)).await.unwrap();
        recorder.put(&record("a", 2)).await.unwrap();

        assert_eq!(recorder.put_count(), 2);
        assert_eq!(recorder.len().await, 1);
        assert_eq!(recorder.get("UserImages", "a").await.unwrap().timestamp, 2);
    }

    #[tokio::test]
    async fn test_missing_table_is_not_counted() {
        let recorder = MemoryRecorder::new();
        let mut r = record("a", 1);
        r.table.clear();

        assert!(matches!(
            recorder.put(&r).await,
            Err(MetadataError::MissingTable { .. })
        ));
        assert_eq!(recorder.put_count(), 0);
        assert!(recorder.is_empty().await);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let recorder = MemoryRecorder::new();
        recorder.fail_writes();

        assert!(matches!(
            recorder.put(&record("a", 1)).await,
            Err(MetadataError::WriteFailed { .. })
        ));
        assert!(recorder.is_empty().await);
    }
}
