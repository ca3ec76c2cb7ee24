use crate::traits::{require_table, MetadataError, MetadataRecorder, MetadataResult};
use crate::MetadataBackend;
use async_trait::async_trait;
use resizer_core::MetadataRecord;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Records metadata rows in Postgres, one table per image kind
///
/// Expected table shape:
/// `id TEXT PRIMARY KEY, captured_at BIGINT NOT NULL, extension TEXT NOT NULL, filename TEXT`
#[derive(Clone)]
pub struct PgRecorder {
    pool: PgPool,
}

impl PgRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> MetadataResult<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await
            .map_err(|e| MetadataError::ConfigError(format!("Failed to connect to database: {}", e)))?;

        tracing::info!(max_connections, "Database connected successfully");
        Ok(Self::new(pool))
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn validate_table(table: &str) -> MetadataResult<()> {
    let valid = table
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(MetadataError::InvalidTable(table.to_string()))
    }
}

fn upsert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO "{table}" (id, captured_at, extension, filename)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET captured_at = EXCLUDED.captured_at,
            extension = EXCLUDED.extension,
            filename = EXCLUDED.filename
        "#
    )
}

#[async_trait]
impl MetadataRecorder for PgRecorder {
    #[tracing::instrument(skip(self, record), fields(db.table = %record.table, db.operation = "upsert"))]
    async fn put(&self, record: &MetadataRecord) -> MetadataResult<()> {
        let table = require_table(record)?;
        validate_table(table)?;

        sqlx::query(&upsert_sql(table))
            .bind(&record.id)
            .bind(record.timestamp)
            .bind(&record.extension)
            .bind(record.filename.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, table = %table, id = %record.id, "Postgres upsert failed");
                MetadataError::WriteFailed {
                    table: table.to_string(),
                    id: record.id.clone(),
                    message: e.to_string(),
                }
            })?;

        tracing::info!(table = %table, id = %record.id, "Postgres upsert successful");
        Ok(())
    }

    fn backend_type(&self) -> MetadataBackend {
        MetadataBackend::Postgres
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table() {
        for ok in ["UserImages", "devPostImages", "_t1"] {
            assert!(validate_table(ok).is_ok(), "{ok}");
        }
        for bad in ["", "1abc", "Users; DROP TABLE x", "a\"b", "dev-images"] {
            assert!(
                matches!(validate_table(bad), Err(MetadataError::InvalidTable(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_upsert_sql_quotes_table() {
        let sql = upsert_sql("UserImages");
        assert!(sql.contains(r#"INSERT INTO "UserImages""#));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE"));
    }

    #[tokio::test]
    async fn test_put_without_table_fails_before_query() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let recorder = PgRecorder::new(pool);
        let record = MetadataRecord {
            id: "x".to_string(),
            timestamp: 1,
            extension: "jpg".to_string(),
            filename: None,
            table: String::new(),
        };

        let err = recorder.put(&record).await.unwrap_err();
        assert!(matches!(err, MetadataError::MissingTable { .. }));
    }
}
