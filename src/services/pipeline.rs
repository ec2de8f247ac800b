use std::sync::Arc;
use std::time::Instant;

use tracing::{error, field, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::models::classification::{
    ClassificationResult, WebhookPayload, FALLBACK_CATEGORY, MAX_TITLE_CHARS,
};
use crate::models::job::{DecodeError, Job, QueueMessage};
use crate::services::extraction::{extract_classification, FallbackReason};
use crate::services::llm::{CompletionClient, LlmError};
use crate::services::prompt::build_classification_prompt;
use crate::services::webhook::{ResultPublisher, WebhookError};

/// Per-message classification pipeline:
/// decode → prompt → LLM → extract → webhook.
///
/// Holds no per-message state; the clients are built once at start-up and
/// shared by every batch.
pub struct Pipeline {
    llm: Arc<dyn CompletionClient>,
    publisher: Arc<dyn ResultPublisher>,
}

/// A message that made it all the way to the webhook.
#[derive(Debug, Clone)]
pub struct Processed {
    pub payload: WebhookPayload,
    pub fallback: Option<FallbackReason>,
}

/// Counts for one batch. Logged and exported as metrics only; the queue
/// never sees per-message outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub received: usize,
    pub published: usize,
    pub failed: usize,
    pub fallbacks: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Classify(#[from] LlmError),

    #[error(transparent)]
    Publish(#[from] WebhookError),
}

impl PipelineError {
    /// Stage name used in logs and metric labels.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "decode",
            PipelineError::Classify(e) if e.is_config() => "config",
            PipelineError::Publish(e) if e.is_config() => "config",
            PipelineError::Classify(_) => "classify",
            PipelineError::Publish(_) => "publish",
        }
    }
}

impl Pipeline {
    pub fn new(llm: Arc<dyn CompletionClient>, publisher: Arc<dyn ResultPublisher>) -> Self {
        Self { llm, publisher }
    }

    /// Process every message of a batch in order. A failing message is
    /// logged and skipped; this never returns an error.
    pub async fn process_batch(&self, batch: &[QueueMessage]) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let mut report = BatchReport {
            received: batch.len(),
            ..BatchReport::default()
        };

        for (index, message) in batch.iter().enumerate() {
            let span = info_span!(
                "message",
                %batch_id,
                index,
                transcription_id = field::Empty
            );
            metrics::counter!("classifier_messages_total").increment(1);

            match self.process_message(message).instrument(span.clone()).await {
                Ok(processed) => {
                    report.published += 1;
                    metrics::counter!("classifier_messages_published").increment(1);
                    if let Some(reason) = processed.fallback {
                        report.fallbacks += 1;
                        let reason: &'static str = reason.into();
                        metrics::counter!("classifier_fallbacks_total", "reason" => reason)
                            .increment(1);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::counter!("classifier_messages_failed", "stage" => e.stage())
                        .increment(1);
                    error!(
                        parent: &span,
                        stage = e.stage(),
                        record = %message.body,
                        error = %e,
                        caused_by = ?source_chain(&e),
                        "Failed to process message"
                    );
                }
            }
        }

        info!(
            %batch_id,
            received = report.received,
            published = report.published,
            failed = report.failed,
            fallbacks = report.fallbacks,
            "Batch processed"
        );

        report
    }

    /// Run one message through every stage.
    pub async fn process_message(&self, message: &QueueMessage) -> Result<Processed, PipelineError> {
        let job = Job::decode(&message.body)?;
        Span::current().record("transcription_id", field::display(&job.transcription_id));

        info!(
            transcription_id = %job.transcription_id,
            category_count = job.categories.len(),
            language = %job.language,
            raw_message = %message.body,
            "Message received from queue"
        );

        let prompt = build_classification_prompt(&job.categories, &job.language, &job.transcription);

        info!(
            transcription_id = %job.transcription_id,
            prompt_chars = prompt.chars().count(),
            "Sending prompt to LLM"
        );

        let start = Instant::now();
        let raw = self.llm.complete(&prompt).await?;
        let elapsed = start.elapsed();
        metrics::histogram!("classifier_llm_duration_seconds").record(elapsed.as_secs_f64());

        let extraction = extract_classification(&raw);
        let fallback = extraction.fallback_reason();
        let result = extraction.into_result();
        review(&job, &result);

        let payload = WebhookPayload::for_job(&job, result);

        info!(
            transcription_id = %job.transcription_id,
            title = %payload.result.title,
            category = %payload.result.category,
            fallback = ?fallback,
            duration_ms = elapsed.as_millis() as u64,
            "Response received from LLM"
        );

        self.publisher.publish(&payload).await?;

        info!(
            transcription_id = %job.transcription_id,
            "Result delivered to webhook"
        );

        Ok(Processed { payload, fallback })
    }
}

/// Checks the prompt asks the model to honour. Violations are logged, not
/// corrected.
fn review(job: &Job, result: &ClassificationResult) {
    let title_chars = result.title.chars().count();
    if title_chars > MAX_TITLE_CHARS {
        warn!(
            transcription_id = %job.transcription_id,
            title_chars,
            "Generated title exceeds {} characters",
            MAX_TITLE_CHARS
        );
    }

    if result.category != FALLBACK_CATEGORY && !job.has_category(&result.category) {
        warn!(
            transcription_id = %job.transcription_id,
            category = %result.category,
            "LLM chose a category outside the job's list"
        );
    }
}

fn source_chain(err: &dyn std::error::Error) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}
