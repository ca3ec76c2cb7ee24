//! Resizer Metadata Library
//!
//! Records one item per processed image in the table chosen by the naming
//! rules. Writes are upserts keyed by record id, so a redelivered
//! notification overwrites the earlier item.
//!
//! Backends:
//! - **DynamoDB** (`metadata-dynamodb`): `PutItem` into the named table
//! - **Postgres** (`metadata-postgres`): `INSERT ... ON CONFLICT` into the named table
//! - **Memory** (`metadata-memory`): in-process list, for tests and dry runs

#[cfg(feature = "metadata-dynamodb")]
pub mod dynamodb;
pub mod factory;
#[cfg(feature = "metadata-memory")]
pub mod memory;
#[cfg(feature = "metadata-postgres")]
pub mod postgres;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "metadata-dynamodb")]
pub use dynamodb::DynamoDbRecorder;
pub use factory::create_recorder;
#[cfg(feature = "metadata-memory")]
pub use memory::MemoryRecorder;
#[cfg(feature = "metadata-postgres")]
pub use postgres::PgRecorder;
pub use resizer_core::MetadataBackend;
pub use traits::{MetadataError, MetadataRecorder, MetadataResult};
