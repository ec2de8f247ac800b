use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Number;
use strum::Display;

use crate::models::job::{Identifier, Job};

/// Title substituted when the model reply cannot be used.
pub const FALLBACK_TITLE: &str = "Título não aplicável";

/// Category substituted when the model reply cannot be used. Also the
/// category the model is told to pick when nothing applies.
pub const FALLBACK_CATEGORY: &str = "Nenhuma se aplica";

/// Recommended upper bound for generated titles.
pub const MAX_TITLE_CHARS: usize = 40;

/// JSON key the title is published under.
///
/// Results produced when the model reply contained no JSON at all have
/// always been published under `tile`. Webhook consumers may depend on it,
/// so the key is kept until they are confirmed to read `title` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleKey {
    #[default]
    Title,
    LegacyTile,
}

impl TitleKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TitleKey::Title => "title",
            TitleKey::LegacyTile => "tile",
        }
    }
}

/// Title and category chosen for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub title: String,
    pub category: String,
    pub title_key: TitleKey,
}

impl ClassificationResult {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            title_key: TitleKey::Title,
        }
    }

    /// Sentinel result used when the reply held JSON that could not be used.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_TITLE, FALLBACK_CATEGORY)
    }

    /// Sentinel result used when the reply held no JSON object at all.
    pub fn no_json_fallback() -> Self {
        Self {
            title_key: TitleKey::LegacyTile,
            ..Self::fallback()
        }
    }
}

/// Status reported to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Completed,
}

/// Body POSTed to the webhook once per job.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    pub transcription_id: Identifier,
    pub duration: Number,
    pub status: CompletionStatus,
    pub result: ClassificationResult,
}

impl WebhookPayload {
    /// Merge a result with the job metadata. The status is always
    /// `COMPLETED`, whatever the job arrived with.
    pub fn for_job(job: &Job, result: ClassificationResult) -> Self {
        Self {
            transcription_id: job.transcription_id.clone(),
            duration: job.duration.clone(),
            status: CompletionStatus::Completed,
            result,
        }
    }
}

impl Serialize for WebhookPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("transcriptionId", &self.transcription_id)?;
        map.serialize_entry("duration", &self.duration)?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry(self.result.title_key.as_str(), &self.result.title)?;
        map.serialize_entry("category", &self.result.category)?;
        map.end()
    }
}
