use garde::Validate;
use serde::Deserialize;
use strum::{Display, IntoStaticStr};
use tracing::{error, warn};

use crate::models::classification::ClassificationResult;

/// Shape the model is instructed to reply with.
#[derive(Debug, Deserialize, Validate)]
struct ModelReply {
    #[garde(length(min = 1))]
    title: String,

    #[garde(length(min = 1))]
    category: String,
}

/// Why a fallback result was substituted for the model's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FallbackReason {
    /// No `{...}` span in the reply.
    NoJson,
    /// A span was found but is not valid JSON.
    Malformed,
    /// Valid JSON without a usable `title`/`category` pair.
    SchemaMismatch,
}

/// Outcome of reading the model's reply. Always carries a result.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(ClassificationResult),
    Fallback {
        reason: FallbackReason,
        result: ClassificationResult,
    },
}

impl Extraction {
    pub fn into_result(self) -> ClassificationResult {
        match self {
            Extraction::Parsed(result) | Extraction::Fallback { result, .. } => result,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Extraction::Parsed(_) => None,
            Extraction::Fallback { reason, .. } => Some(*reason),
        }
    }
}

/// Greedy span from the first `{` to the last `}`.
fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Pull the classification out of a raw model reply, tolerating prose
/// around the JSON object.
pub fn extract_classification(raw: &str) -> Extraction {
    let Some(span) = json_span(raw) else {
        warn!(raw_len = raw.len(), "No JSON object found in LLM response");
        return Extraction::Fallback {
            reason: FallbackReason::NoJson,
            result: ClassificationResult::no_json_fallback(),
        };
    };

    let value: serde_json::Value = match serde_json::from_str(span) {
        Ok(v) => v,
        Err(e) => {
            error!(extracted = %span, error = %e, "Failed to parse JSON extracted from LLM response");
            return Extraction::Fallback {
                reason: FallbackReason::Malformed,
                result: ClassificationResult::fallback(),
            };
        }
    };

    let reply = serde_json::from_value::<ModelReply>(value)
        .map_err(|e| e.to_string())
        .and_then(|reply| reply.validate().map(|()| reply).map_err(|e| e.to_string()));

    match reply {
        Ok(reply) => Extraction::Parsed(ClassificationResult::new(reply.title, reply.category)),
        Err(e) => {
            warn!(extracted = %span, error = %e, "LLM response JSON does not match the expected schema");
            Extraction::Fallback {
                reason: FallbackReason::SchemaMismatch,
                result: ClassificationResult::fallback(),
            }
        }
    }
}
