//! Domain models for a single resize invocation.
//!
//! Every value here is created fresh per invocation; nothing is carried over
//! between invocations.

use serde::{Deserialize, Serialize};

/// The stored original that triggered an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub bucket: String,
    /// Object key exactly as delivered by the notification (percent-encoded,
    /// `+` for spaces).
    pub encoded_key: String,
}

impl SourceDescriptor {
    pub fn new(bucket: impl Into<String>, encoded_key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            encoded_key: encoded_key.into(),
        }
    }
}

/// One derivative size produced for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    /// Human label, e.g. "thumb" or "full"
    pub label: String,
    pub max_width: u32,
    pub max_height: u32,
    /// Replaces `orig` in the destination key, e.g. "200"
    pub key_suffix: String,
}

impl VariantSpec {
    pub fn new(label: &str, max_width: u32, max_height: u32, key_suffix: &str) -> Self {
        Self {
            label: label.to_string(),
            max_width,
            max_height,
            key_suffix: key_suffix.to_string(),
        }
    }

    /// Square bounding box labelled by its edge length
    pub fn square(label: &str, edge: u32) -> Self {
        Self::new(label, edge, edge, &edge.to_string())
    }
}

/// Everything the orchestrator needs to know before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResizePlan {
    pub source_bucket: String,
    /// Decoded source key
    pub source_key: String,
    pub destination_bucket: String,
    /// One destination key per variant, in declaration order
    pub destination_keys: Vec<String>,
    pub variants: Vec<VariantSpec>,
    /// `None` when the bucket matches no table rule; the record stage fails on it.
    pub target_table: Option<String>,
    pub record_id: String,
    /// Lowercased extension token from the source key
    pub extension: String,
    /// Whether the record should carry the decoded source key
    pub include_filename: bool,
}

impl ResizePlan {
    /// Destination keys paired with their variant specs
    pub fn targets(&self) -> impl Iterator<Item = (&VariantSpec, &str)> {
        self.variants
            .iter()
            .zip(self.destination_keys.iter().map(String::as_str))
    }
}

/// Item written to the metadata store after every variant landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: String,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Target table; empty when the bucket matched no table rule
    pub table: String,
}

impl MetadataRecord {
    /// Build the record for a plan, stamped with the current time.
    pub fn for_plan(plan: &ResizePlan) -> Self {
        Self::for_plan_at(plan, chrono::Utc::now().timestamp_millis())
    }

    pub fn for_plan_at(plan: &ResizePlan, timestamp: i64) -> Self {
        Self {
            id: plan.record_id.clone(),
            timestamp,
            extension: plan.extension.clone(),
            filename: plan.include_filename.then(|| plan.source_key.clone()),
            table: plan.target_table.clone().unwrap_or_default(),
        }
    }
}
