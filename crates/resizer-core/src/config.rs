//! Configuration module
//!
//! Runtime configuration only wires the external collaborators (object
//! storage, metadata store, logging). The naming rules themselves are a static
//! table, see [`crate::naming::NamingConfig`].

use std::env;

use crate::backend_types::{MetadataBackend, StorageBackend};

const DB_MAX_CONNECTIONS: u32 = 5;

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub log_format: LogFormat,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, LocalStack, etc.)
    pub local_storage_path: Option<String>,
    // Metadata store configuration
    pub metadata_backend: MetadataBackend,
    pub aws_region: Option<String>,
    pub dynamodb_endpoint: Option<String>,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
            storage_backend: StorageBackend::S3,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: None,
            metadata_backend: MetadataBackend::DynamoDb,
            aws_region: None,
            dynamodb_endpoint: None,
            database_url: None,
            db_max_connections: DB_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        let metadata_backend = env::var("METADATA_BACKEND")
            .ok()
            .map(|s| s.parse::<MetadataBackend>())
            .transpose()?
            .unwrap_or(MetadataBackend::DynamoDb);

        let config = Config {
            environment,
            log_format,
            storage_backend,
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok().filter(|s| !s.is_empty()),
            metadata_backend,
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            dynamodb_endpoint: env::var("DYNAMODB_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DB_MAX_CONNECTIONS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Region used for S3, falling back to the general AWS region
    pub fn storage_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    /// Region used for DynamoDB, falling back to the S3 region
    pub fn metadata_region(&self) -> Option<&str> {
        self.aws_region.as_deref().or(self.s3_region.as_deref())
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.storage_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "memory storage backend cannot be used in production"
                    ));
                }
            }
        }

        match self.metadata_backend {
            MetadataBackend::DynamoDb => {
                if self.metadata_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "AWS_REGION must be set when using DynamoDB metadata backend"
                    ));
                }
            }
            MetadataBackend::Postgres => match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string when using postgres metadata backend"
                    ))
                }
            },
            MetadataBackend::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "memory metadata backend cannot be used in production"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requires_region() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            aws_region: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_region(), Some("eu-west-1"));
    }

    #[test]
    fn test_s3_region_overrides_aws_region() {
        let config = Config {
            s3_region: Some("us-east-1".to_string()),
            aws_region: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.storage_region(), Some("us-east-1"));
        assert_eq!(config.metadata_region(), Some("eu-west-1"));
    }

    #[test]
    fn test_local_backend_requires_path() {
        let config = Config {
            storage_backend: StorageBackend::Local,
            metadata_backend: MetadataBackend::Memory,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            local_storage_path: Some("/tmp/resizer".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = Config {
            storage_backend: StorageBackend::Memory,
            metadata_backend: MetadataBackend::Postgres,
            database_url: Some("mysql://localhost/db".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            database_url: Some("postgresql://localhost/resizer".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backends_rejected_in_production() {
        let config = Config {
            environment: "production".to_string(),
            storage_backend: StorageBackend::Memory,
            metadata_backend: MetadataBackend::Memory,
            ..Config::default()
        };
        assert!(config.is_production());
        assert!(config.validate().is_err());
    }
}
