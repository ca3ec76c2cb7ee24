//! Object-created notification as delivered by S3 event notifications

use resizer_core::SourceDescriptor;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    /// Percent-encoded, with `+` for spaces
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl S3Event {
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Source of the first record. Later records are not processed.
    pub fn first_source(&self) -> Option<SourceDescriptor> {
        self.records.first().map(|record| {
            SourceDescriptor::new(&record.s3.bucket.name, &record.s3.object.key)
        })
    }

    /// Records beyond the first
    pub fn ignored_records(&self) -> usize {
        self.records.len().saturating_sub(1)
    }
}
