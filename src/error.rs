use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum ShadowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Guide error: {0}")]
    Guide(#[from] GuideError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

/// Failure of the hosted completion service. Always surfaced to the caller.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API key missing; set SHADOWLIGHT_API_KEY (or GROQ_API_KEY) or completion.api_key")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("service returned no choices")]
    EmptyResponse,

    #[error("could not parse guidance plan: {0}")]
    MalformedPlan(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuideError {
    #[error("a guide needs at least one step")]
    EmptySteps,

    #[error("guide tracking requires a running tokio runtime")]
    NoRuntime,

    #[error("guide.poll_interval must be greater than zero")]
    ZeroPollInterval,
}

impl ShadowError {
    pub fn store(message: impl Into<String>) -> Self {
        ShadowError::Store(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            ShadowError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            ShadowError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the completion endpoint URL (e.g., https://api.groq.com/openai/v1/chat/completions).",
            ),
            ShadowError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check the snapshot JSON; nodes need id, tag and parent fields.",
            ),
            ShadowError::Toml(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Fix the TOML syntax in the config file or pass --config with a valid file.",
            ),
            ShadowError::Completion(e) => {
                let remediation = match e {
                    CompletionError::MissingApiKey => {
                        "Set SHADOWLIGHT_API_KEY (or GROQ_API_KEY) before running summarize/guide."
                    }
                    CompletionError::Status { status, .. }
                        if *status == StatusCode::UNAUTHORIZED
                            || *status == StatusCode::FORBIDDEN =>
                    {
                        "Check that the API key is valid for the configured endpoint."
                    }
                    CompletionError::Status { status, .. }
                        if *status == StatusCode::TOO_MANY_REQUESTS =>
                    {
                        "Rate limited; wait a moment and retry."
                    }
                    CompletionError::MalformedPlan(_) => {
                        "Rephrase the request; the model did not return a usable step list."
                    }
                    _ => "Check connectivity/proxy/VPN and retry.",
                };
                ErrorPayload::new(ErrorCategory::Completion, e.to_string(), remediation)
            }
            ShadowError::Guide(e) => {
                let remediation = match e {
                    GuideError::EmptySteps => {
                        "Provide a non-empty list of {selector, instruction} steps."
                    }
                    GuideError::NoRuntime => "Start the guide from within a tokio runtime.",
                    GuideError::ZeroPollInterval => {
                        "Set guide.poll_interval to a positive duration (e.g., \"500ms\")."
                    }
                };
                ErrorPayload::new(ErrorCategory::Guide, e.to_string(), remediation)
            }
            ShadowError::Store(msg) => ErrorPayload::new(
                ErrorCategory::Store,
                msg.to_string(),
                "Check that the mode store path is writable (store.path in config).",
            ),
            ShadowError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("node id") || lower.contains("parent") || lower.contains("child")
                {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check the snapshot's parent/children links; every id must exist and links must agree.",
                    )
                } else if lower.contains("mode") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use one of: none, high-contrast-light, high-contrast-dark, color-blind-assist, auto-fix.",
                    )
                } else if lower.contains("color") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use #rgb, #rrggbb, rgb(r, g, b) or rgba(r, g, b, a).",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file values.",
                    )
                }
            }
            ShadowError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShadowError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Completion,
    Guide,
    Store,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
