use crate::traits::{require_table, MetadataError, MetadataRecorder, MetadataResult};
use crate::MetadataBackend;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use resizer_core::MetadataRecord;
use std::collections::HashMap;

/// Records metadata items in DynamoDB
pub struct DynamoDbRecorder {
    client: DynamoDbClient,
}

impl DynamoDbRecorder {
    /// Create a recorder for the given region
    ///
    /// # Arguments
    /// * `region` - AWS region of the tables
    /// * `endpoint_url` - Optional endpoint override (e.g. "http://localhost:8000" for DynamoDB Local)
    pub async fn new(region: &str, endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        Self {
            client: DynamoDbClient::new(&config),
        }
    }

    pub fn from_client(client: DynamoDbClient) -> Self {
        Self { client }
    }
}

/// Item attributes for a record: `id`, `date` (epoch ms), `extension` and
/// optionally `filename`.
pub fn item_for(record: &MetadataRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("id".to_string(), AttributeValue::S(record.id.clone())),
        (
            "date".to_string(),
            AttributeValue::N(record.timestamp.to_string()),
        ),
        (
            "extension".to_string(),
            AttributeValue::S(record.extension.clone()),
        ),
    ]);
    if let Some(ref filename) = record.filename {
        item.insert("filename".to_string(), AttributeValue::S(filename.clone()));
    }
    item
}

#[async_trait]
impl MetadataRecorder for DynamoDbRecorder {
    async fn put(&self, record: &MetadataRecord) -> MetadataResult<()> {
        let table = require_table(record)?;
        let start = std::time::Instant::now();

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_for(record)))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                tracing::error!(
                    error = %message,
                    table = %table,
                    id = %record.id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "DynamoDB put failed"
                );
                MetadataError::WriteFailed {
                    table: table.to_string(),
                    id: record.id.clone(),
                    message,
                }
            })?;

        tracing::info!(
            table = %table,
            id = %record.id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "DynamoDB put successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> MetadataBackend {
        MetadataBackend::DynamoDb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_without_filename() {
        let record = MetadataRecord {
            id: "dev/p42-cover".to_string(),
            timestamp: 1_700_000_000_123,
            extension: "png".to_string(),
            filename: None,
            table: "devPostImages".to_string(),
        };

        let item = item_for(&record);
        assert_eq!(item.len(), 3);
        assert_eq!(item["id"], AttributeValue::S("dev/p42-cover".to_string()));
        assert_eq!(item["date"], AttributeValue::N("1700000000123".to_string()));
        assert_eq!(item["extension"], AttributeValue::S("png".to_string()));
    }

    #[test]
    fn test_item_with_filename() {
        let record = MetadataRecord {
            id: "u1/alice-picture".to_string(),
            timestamp: 5,
            extension: "jpg".to_string(),
            filename: Some("u1/alice-picture-orig.jpg".to_string()),
            table: "UserImages".to_string(),
        };

        let item = item_for(&record);
        assert_eq!(
            item.get("filename"),
            Some(&AttributeValue::S("u1/alice-picture-orig.jpg".to_string()))
        );
    }
}
