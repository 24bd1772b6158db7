use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Error type for the advisory service.
///
/// Integration weather (network failures, missing keys, upstream 5xx) is
/// NOT represented here; those paths degrade to fallback values via
/// [`crate::models::Fetch`]. This enum is reserved for caller errors and
/// genuinely unexpected conditions.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("empty query")]
    EmptyQuery,

    #[error("unknown session: {0}")]
    SessionNotFound(uuid::Uuid),

    #[error("no {kind} record named '{name}'")]
    UnknownReference { kind: &'static str, name: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    UpstreamStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {provider} response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AdvisorError {
    pub fn unknown_reference(kind: &'static str, name: &str) -> Self {
        Self::UnknownReference {
            kind,
            name: name.to_string(),
        }
    }
}
