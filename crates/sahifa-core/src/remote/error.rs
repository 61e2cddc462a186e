//! Persistence client errors

use thiserror::Error;

/// Errors returned by a [`PersistenceClient`](super::PersistenceClient)
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("Request to data store failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The data store rejected the request
    #[error("Data store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// No row with this id
    #[error("No {collection} record with id '{id}'")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// A row could not be translated into a record
    #[error("Could not decode {collection} response: {source}")]
    Decode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The client could not be built from configuration
    #[error("Invalid data store configuration: {0}")]
    Config(String),

    /// The backend is offline
    #[error("Data store unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    pub(crate) fn not_found(collection: &'static str, id: &str) -> Self {
        RemoteError::NotFound {
            collection,
            id: id.to_string(),
        }
    }

    /// Check if a later attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Http(_) | RemoteError::Unavailable(_) => true,
            RemoteError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type for persistence operations
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RemoteError::Unavailable("offline".to_string()).is_transient());
        assert!(RemoteError::Status {
            status: 503,
            message: "busy".to_string()
        }
        .is_transient());
        assert!(!RemoteError::Status {
            status: 400,
            message: "bad column".to_string()
        }
        .is_transient());
        assert!(!RemoteError::not_found("chapters", "42").is_transient());
    }

    #[test]
    fn test_not_found_display() {
        let msg = RemoteError::not_found("notes", "abc").to_string();
        assert!(msg.contains("notes"));
        assert!(msg.contains("abc"));
    }
}
