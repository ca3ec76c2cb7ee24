//! Resizer Worker
//!
//! Turns an object-created notification into resized variants and a
//! metadata record:
//!
//! `Resolve -> Fetch -> Transcode -> Upload (each variant, in order) -> Record`
//!
//! The first failing stage ends the invocation. Whatever the outcome, the
//! caller gets an [`Acknowledgement`], never an error.

pub mod error;
pub mod event;
pub mod pipeline;
pub mod telemetry;

pub use error::{PipelineError, Stage};
pub use event::{S3Event, S3EventRecord};
pub use pipeline::{Acknowledgement, Orchestrator, Outcome, ResizeReport};
pub use telemetry::init_telemetry;
