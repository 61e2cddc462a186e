//! Cache error handling
//!
//! Typed errors for the local cache with descriptive messages and recovery
//! suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the local cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to create the cache directory
    #[error("Failed to create cache directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Disk full or quota exceeded while writing '{path}'.")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cached JSON could not be parsed and could not be moved aside
    #[error("Invalid cache file '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Cached JSON could not be parsed; the file was moved to `backup_path`
    #[error("Cache file '{path}' is corrupted: {details}. A backup has been created at '{backup_path}'.")]
    Corrupt {
        path: PathBuf,
        backup_path: PathBuf,
        details: String,
    },

    /// Records could not be serialized
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Rename of the temp file failed
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Whether the failed operation was reading or writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl CacheError {
    /// Classify an I/O error by its kind, keeping the path for context
    pub fn from_io(error: io::Error, path: PathBuf, access: Access) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => CacheError::PermissionDenied {
                path,
                source: error,
            },
            _ if access == Access::Write && is_disk_full(&error) => CacheError::DiskFull {
                path,
                source: error,
            },
            _ => match access {
                Access::Read => CacheError::ReadError {
                    path,
                    source: error,
                },
                Access::Write => CacheError::WriteError {
                    path,
                    source: error,
                },
            },
        }
    }

    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            CacheError::DiskFull { .. } => Some("Free up disk space and try again."),
            CacheError::PermissionDenied { .. } | CacheError::CreateDirectory { .. } => {
                Some("Check that the data directory is writable, or set data_dir to another location.")
            }
            CacheError::InvalidFormat { .. } => {
                Some("Fix or remove the file by hand; it is left untouched until it can be read.")
            }
            CacheError::Corrupt { .. } => {
                Some("You can try to recover entries from the backup manually, or delete it.")
            }
            _ => None,
        }
    }
}

fn is_disk_full(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left") || msg.contains("disk full") || msg.contains("quota exceeded")
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = CacheError::from_io(io_err, PathBuf::from("/cache/notes.json"), Access::Read);

        assert!(matches!(err, CacheError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_disk_full_only_on_write() {
        let write_err = CacheError::from_io(
            io::Error::new(io::ErrorKind::Other, "No space left on device"),
            PathBuf::from("/full/chapters.json"),
            Access::Write,
        );
        assert!(matches!(write_err, CacheError::DiskFull { .. }));

        let read_err = CacheError::from_io(
            io::Error::new(io::ErrorKind::Other, "No space left on device"),
            PathBuf::from("/full/chapters.json"),
            Access::Read,
        );
        assert!(matches!(read_err, CacheError::ReadError { .. }));
    }

    #[test]
    fn test_invalid_format_display() {
        let err = CacheError::InvalidFormat {
            path: PathBuf::from("/data/cache/bookmarks.json"),
            details: "expected value at line 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bookmarks.json"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_corrupt_names_backup() {
        let err = CacheError::Corrupt {
            path: PathBuf::from("/data/cache/notes.json"),
            backup_path: PathBuf::from("/data/cache/notes.json.bak"),
            details: "expected value at line 1".to_string(),
        };
        assert!(err.to_string().contains("notes.json.bak"));
        assert!(err.recovery_suggestion().unwrap().contains("backup"));
    }
}
