#[cfg(feature = "metadata-dynamodb")]
use crate::DynamoDbRecorder;
#[cfg(feature = "metadata-memory")]
use crate::MemoryRecorder;
#[cfg(feature = "metadata-postgres")]
use crate::PgRecorder;
use crate::{MetadataBackend, MetadataError, MetadataRecorder, MetadataResult};
use resizer_core::Config;
use std::sync::Arc;

/// Create a metadata recorder based on configuration
pub async fn create_recorder(config: &Config) -> MetadataResult<Arc<dyn MetadataRecorder>> {
    match config.metadata_backend {
        #[cfg(feature = "metadata-dynamodb")]
        MetadataBackend::DynamoDb => {
            let region = config.metadata_region().ok_or_else(|| {
                MetadataError::ConfigError("AWS_REGION or S3_REGION not configured".to_string())
            })?;
            let recorder =
                DynamoDbRecorder::new(region, config.dynamodb_endpoint.as_deref()).await;
            Ok(Arc::new(recorder))
        }

        #[cfg(not(feature = "metadata-dynamodb"))]
        MetadataBackend::DynamoDb => Err(MetadataError::ConfigError(
            "DynamoDB backend not available (metadata-dynamodb feature not enabled)".to_string(),
        )),

        #[cfg(feature = "metadata-postgres")]
        MetadataBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                MetadataError::ConfigError("DATABASE_URL not configured".to_string())
            })?;
            let recorder = PgRecorder::connect(url, config.db_max_connections).await?;
            Ok(Arc::new(recorder))
        }

        #[cfg(not(feature = "metadata-postgres"))]
        MetadataBackend::Postgres => Err(MetadataError::ConfigError(
            "Postgres backend not available (metadata-postgres feature not enabled)".to_string(),
        )),

        #[cfg(feature = "metadata-memory")]
        MetadataBackend::Memory => Ok(Arc::new(MemoryRecorder::new())),

        #[cfg(not(feature = "metadata-memory"))]
        MetadataBackend::Memory => Err(MetadataError::ConfigError(
            "Memory backend not available (metadata-memory feature not enabled)".to_string(),
        )),
    }
}
