use std::fmt;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One element of a batch popped from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
}

impl QueueMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// Identifier sent by upstream producers, either as a string or an integer.
/// Echoed back to the webhook in its original form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{n}"),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

/// Caller-supplied label used to brief the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Category {
    #[garde(length(min = 1))]
    pub category: String,

    #[garde(skip)]
    #[serde(default)]
    pub description: String,
}

/// A call-transcription classification job as delivered on the queue.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[garde(skip)]
    #[serde(default)]
    pub user_id: Option<Identifier>,

    #[garde(skip)]
    #[serde(default)]
    pub squad_id: Option<Identifier>,

    #[garde(skip)]
    pub transcription_id: Identifier,

    #[garde(length(min = 1), dive)]
    pub categories: Vec<Category>,

    /// May be empty for silent calls; the model is told to fall back to the
    /// "not applicable" title in that case.
    #[garde(skip)]
    pub transcription: String,

    #[garde(length(min = 1))]
    pub language: String,

    /// Call duration, echoed to the webhook exactly as received.
    #[garde(custom(non_negative))]
    pub duration: Number,

    /// Upstream status. Ignored: published results are always `COMPLETED`.
    #[garde(skip)]
    #[serde(default)]
    pub status: Option<String>,
}

impl Job {
    /// Parse and validate a queue message body.
    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        let job: Job = serde_json::from_str(body)?;
        job.validate()?;
        Ok(job)
    }

    /// Whether `name` is one of the job's categories.
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.category == name)
    }
}

fn non_negative(value: &Number, _ctx: &()) -> garde::Result {
    match value.as_f64() {
        Some(v) if v >= 0.0 => Ok(()),
        _ => Err(garde::Error::new("duration must be a non-negative number")),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Message body is not a valid job: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job failed validation: {0}")]
    Validation(#[from] garde::Report),
}
