use std::fmt;
use std::path::PathBuf;

pub(crate) type Result<T> = std::result::Result<T, CollectionError>;

/// Failures surfaced to the operator. Each carries enough context to retry.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CollectionError {
    #[error("failed to load {location}: {detail}")]
    Location { location: String, detail: String },

    #[error("malformed playlist at {location}: {detail}")]
    MalformedData { location: String, detail: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("invalid selection '{expression}': {detail}")]
    Parse { expression: String, detail: String },
}

impl CollectionError {
    pub(crate) fn location(location: &str, detail: impl fmt::Display) -> Self {
        Self::Location {
            location: location.to_string(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn malformed(location: &str, detail: impl fmt::Display) -> Self {
        Self::MalformedData {
            location: location.to_string(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn playlist_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: "playlist",
            name: name.to_string(),
        }
    }

    pub(crate) fn history_not_found(index: usize) -> Self {
        Self::NotFound {
            kind: "history entry",
            name: format!("#{index}"),
        }
    }

    pub(crate) fn parse(expression: &str, detail: impl fmt::Display) -> Self {
        Self::Parse {
            expression: expression.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Load failures are the only kind that get a history record.
    pub(crate) fn is_load_failure(&self) -> bool {
        matches!(self, Self::Location { .. } | Self::MalformedData { .. })
    }
}

/// A history file could not be read or written. The in-memory store keeps working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PersistenceWarning {
    pub(crate) path: PathBuf,
    pub(crate) message: String,
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.path.display())
    }
}
