use serde::Serialize;

/// Failure reported by a host service call.
///
/// The host gives back little more than a message, so variants only carry
/// enough structure to let callers tell a missing object from a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", content = "message")]
pub enum HostError {
    /// The host refused the call (duplicate id, no current window, ...).
    #[error("host rejected call: {0}")]
    Rejected(String),
    /// The referenced tab, window, group, or menu item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The key-value store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
    /// The host went away (event stream closed, process shutting down).
    #[error("host connection closed")]
    Closed,
}

pub type HostResult<T> = Result<T, HostError>;

/// Error types for the file-backed store.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "type", content = "message")]
pub enum StorageError {
    #[error("failed to read storage: {0}")]
    ReadError(String),
    #[error("failed to write storage: {0}")]
    WriteError(String),
    #[error("failed to parse storage: {0}")]
    ParseError(String),
    #[error("failed to serialize storage: {0}")]
    SerializeError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::ReadError(e.to_string())
    }
}

impl From<StorageError> for HostError {
    fn from(e: StorageError) -> Self {
        HostError::Storage(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<HostError> for String {
    fn from(e: HostError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_serializes_tagged() {
        let value = serde_json::to_value(HostError::NotFound("tab 4".to_string())).unwrap();
        assert_eq!(value["type"], "NotFound");
        assert_eq!(value["message"], "tab 4");
    }

    #[test]
    fn test_storage_error_converts_to_host_error() {
        let err: HostError = StorageError::WriteError("disk full".to_string()).into();
        assert_eq!(
            err,
            HostError::Storage("failed to write storage: disk full".to_string())
        );
    }
}
