use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Health/metrics bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Redis connection string for the job queue
    pub redis_url: String,

    /// Redis list holding pending job messages
    #[serde(default = "default_queue_key")]
    pub queue_key: String,

    /// Maximum number of messages handled per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Sleep between polls when the queue is empty
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat model name. Checked per message, so a missing value fails each
    /// message instead of the process.
    #[serde(default)]
    pub model_openai: Option<String>,

    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,

    /// Destination for classification results. Checked per message.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Sent as `x-webhook-secret` when present
    #[serde(default)]
    pub webhook_secret: Option<String>,

    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_queue_key() -> String {
    "call_classifier:jobs".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Build from an explicit list of variables instead of the process
    /// environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
