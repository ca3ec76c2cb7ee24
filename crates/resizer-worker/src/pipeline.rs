//! Pipeline orchestrator
//!
//! Runs one invocation through the linear stage pipeline. Stages run strictly
//! in order and the first failure short-circuits: nothing after the failing
//! stage executes. In particular the metadata record is written only after
//! every variant upload returned success, so a record's presence means all
//! variants landed.

use crate::error::{PipelineError, Stage};
use crate::event::S3Event;
use resizer_core::{
    ErrorClass, FailureKind, LogLevel, MetadataRecord, NamingResolver, ResizePlan,
    SourceDescriptor,
};
use resizer_metadata::MetadataRecorder;
use resizer_processing::ImageTranscoder;
use resizer_storage::ObjectStorage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Summary of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResizeReport {
    pub source_bucket: String,
    pub source_key: String,
    pub destination_bucket: String,
    pub destination_keys: Vec<String>,
    pub record_id: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Done {
        record_id: String,
        destination_keys: Vec<String>,
    },
    Failed {
        stage: Stage,
        failure_kind: FailureKind,
        retryable: bool,
        reason: String,
    },
}

/// What the invoker gets back. Always produced, whatever the outcome, so the
/// trigger layer never redelivers on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub source_bucket: Option<String>,
    pub source_key: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Acknowledgement {
    fn done(report: ResizeReport) -> Self {
        Self {
            source_bucket: Some(report.source_bucket),
            source_key: Some(report.source_key),
            outcome: Outcome::Done {
                record_id: report.record_id,
                destination_keys: report.destination_keys,
            },
        }
    }

    fn failed(source: Option<(&str, &str)>, err: &PipelineError) -> Self {
        Self {
            source_bucket: source.map(|(bucket, _)| bucket.to_string()),
            source_key: source.map(|(_, key)| key.to_string()),
            outcome: Outcome::Failed {
                stage: err.stage(),
                failure_kind: err.kind(),
                retryable: err.is_retryable(),
                reason: err.to_string(),
            },
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.outcome, Outcome::Done { .. })
    }
}

/// Drives one invocation through every stage
///
/// Holds no per-invocation state; share it behind an `Arc` to serve
/// concurrent invocations.
pub struct Orchestrator {
    resolver: NamingResolver,
    storage: Arc<dyn ObjectStorage>,
    recorder: Arc<dyn MetadataRecorder>,
}

impl Orchestrator {
    pub fn new(
        resolver: NamingResolver,
        storage: Arc<dyn ObjectStorage>,
        recorder: Arc<dyn MetadataRecorder>,
    ) -> Self {
        Self {
            resolver,
            storage,
            recorder,
        }
    }

    /// Parse a raw notification and handle its first record.
    pub async fn handle_notification(&self, payload: &str) -> Acknowledgement {
        tracing::debug!(payload = %payload, "Received notification");

        match S3Event::from_json(payload) {
            Ok(event) => self.handle_event(&event).await,
            Err(e) => {
                let err = PipelineError::Notification(e.to_string());
                log_failure(None, None, &err);
                Acknowledgement::failed(None, &err)
            }
        }
    }

    pub async fn handle_event(&self, event: &S3Event) -> Acknowledgement {
        let Some(source) = event.first_source() else {
            let err = PipelineError::Notification("notification contains no records".to_string());
            log_failure(None, None, &err);
            return Acknowledgement::failed(None, &err);
        };

        let ignored = event.ignored_records();
        if ignored > 0 {
            tracing::warn!(
                ignored_records = ignored,
                "Notification carries more than one record; only the first is processed"
            );
        }

        self.handle(&source).await
    }

    /// Run the pipeline for `source`, log the outcome and acknowledge it.
    pub async fn handle(&self, source: &SourceDescriptor) -> Acknowledgement {
        let plan = match self.resolver.resolve(source) {
            Ok(plan) => plan,
            Err(e) => {
                let err = PipelineError::from(e);
                let ids = Some((source.bucket.as_str(), source.encoded_key.as_str()));
                log_failure(ids, None, &err);
                return Acknowledgement::failed(ids, &err);
            }
        };

        let start = Instant::now();
        match self.execute(&plan).await {
            Ok(report) => {
                tracing::info!(
                    source_bucket = %report.source_bucket,
                    source_key = %report.source_key,
                    destination_bucket = %report.destination_bucket,
                    destination_keys = ?report.destination_keys,
                    record_id = %report.record_id,
                    table = %report.table,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Successfully resized image"
                );
                Acknowledgement::done(report)
            }
            Err(err) => {
                let ids = Some((plan.source_bucket.as_str(), plan.source_key.as_str()));
                log_failure(ids, Some(&plan), &err);
                Acknowledgement::failed(ids, &err)
            }
        }
    }

    /// Run the pipeline for `source` and return the result to the caller
    /// without logging it.
    pub async fn run(&self, source: &SourceDescriptor) -> Result<ResizeReport, PipelineError> {
        let plan = self.resolver.resolve(source)?;
        self.execute(&plan).await
    }

    async fn execute(&self, plan: &ResizePlan) -> Result<ResizeReport, PipelineError> {
        let original = self
            .storage
            .fetch(&plan.source_bucket, &plan.source_key)
            .await
            .map_err(PipelineError::Fetch)?;

        let data = original.data;
        let content_type = original.content_type;
        let variants = plan.variants.clone();
        let transcoded = tokio::task::spawn_blocking(move || {
            ImageTranscoder::transcode(&data, &content_type, &variants)
        })
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))??;

        tracing::debug!(
            source_key = %plan.source_key,
            width = transcoded.source.width,
            height = transcoded.source.height,
            format = %transcoded.source.format,
            size_bytes = transcoded.source.size_bytes,
            "Transcoded source image"
        );

        for ((buffer, variant), key) in transcoded.variants.into_iter().zip(&plan.destination_keys) {
            tracing::debug!(
                variant = %variant.label,
                bucket = %plan.destination_bucket,
                key = %key,
                width = buffer.width,
                height = buffer.height,
                size_bytes = buffer.len(),
                "Uploading variant"
            );
            self.storage
                .store(
                    &plan.destination_bucket,
                    key,
                    buffer.data,
                    &buffer.content_type,
                )
                .await
                .map_err(|source| PipelineError::Upload {
                    key: key.clone(),
                    source,
                })?;
        }

        let record = MetadataRecord::for_plan(plan);
        self.recorder.put(&record).await?;

        Ok(ResizeReport {
            source_bucket: plan.source_bucket.clone(),
            source_key: plan.source_key.clone(),
            destination_bucket: plan.destination_bucket.clone(),
            destination_keys: plan.destination_keys.clone(),
            record_id: plan.record_id.clone(),
            table: record.table,
        })
    }
}

fn log_failure(source: Option<(&str, &str)>, plan: Option<&ResizePlan>, err: &PipelineError) {
    let (source_bucket, source_key) = source.unwrap_or_default();
    let destination_bucket = plan.map(|p| p.destination_bucket.as_str()).unwrap_or_default();
    let destination_keys = plan.map(|p| p.destination_keys.as_slice()).unwrap_or_default();

    macro_rules! emit {
        ($level:ident) => {
            tracing::$level!(
                source_bucket = %source_bucket,
                source_key = %source_key,
                destination_bucket = %destination_bucket,
                destination_keys = ?destination_keys,
                stage = err.stage().as_str(),
                failure_kind = err.kind().as_str(),
                retryable = err.is_retryable(),
                error = %err,
                "Unable to resize image"
            )
        };
    }

    match err.log_level() {
        LogLevel::Warn => emit!(warn),
        LogLevel::Error => emit!(error),
    }
}
