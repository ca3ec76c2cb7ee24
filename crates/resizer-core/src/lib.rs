//! Resizer Core Library
//!
//! This crate provides the domain model, the naming resolver, error
//! classification, and configuration shared by every resizer component.

pub mod backend_types;
pub mod config;
pub mod error;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use backend_types::{MetadataBackend, StorageBackend};
pub use config::{Config, LogFormat};
pub use error::{ErrorClass, FailureKind, LogLevel, ResolveError};
pub use models::{MetadataRecord, ResizePlan, SourceDescriptor, VariantSpec};
pub use naming::{
    decode_object_key, CategoryRule, EnvironmentRule, NamingConfig, NamingResolver, TableRule,
};
