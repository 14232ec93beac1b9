use thiserror::Error;

/// countrypop error types
#[derive(Error, Debug)]
pub enum CountryError {
    /// A single upstream source could not deliver data
    #[error("upstream unavailable: {source_name}: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    /// Every base source failed, nothing to aggregate
    #[error("all sources failed: {0}")]
    AllSourcesFailed(String),

    /// Requested country is absent from the aggregated set
    #[error("country not found: {0}")]
    NotFound(String),

    /// Failed to parse a field or document
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl CountryError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Rebuild an error that is shared between single-flight waiters
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::UpstreamUnavailable {
                source_name,
                reason,
            } => Self::unavailable(source_name.as_str(), reason.as_str()),
            Self::AllSourcesFailed(reason) => Self::AllSourcesFailed(reason.clone()),
            Self::NotFound(name) => Self::NotFound(name.clone()),
            Self::Parse(msg) => Self::Parse(msg.clone()),
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
            Self::Config(msg) => Self::Config(msg.clone()),
        }
    }
}

/// Result type alias for countrypop
pub type Result<T> = std::result::Result<T, CountryError>;
