/// Failure reported by an [`ObjectBackend`](crate::ObjectBackend).
///
/// `code` carries the provider error code (`NoSuchKey`, `AccessDenied`, ...)
/// or a transport classification when the request never got a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct BackendError {
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The object does not exist.
    pub fn no_such_key(path: &str) -> Self {
        Self::new("NoSuchKey", format!("the specified key does not exist: {path}"))
    }

    /// The caller may not access the object.
    pub fn access_denied(path: &str) -> Self {
        Self::new("AccessDenied", format!("access denied: {path}"))
    }
}

/// Errors from store operations.
///
/// The `key` carried by the storage variants is the full object path the
/// request was issued against (prefix included).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Fetching an object failed (missing, denied, transport).
    #[error("could not read key: {key} {code}")]
    Read {
        key: String,
        code: String,
        message: String,
    },

    /// Storing an object failed.
    #[error("could not write key: {key} {code}")]
    Write {
        key: String,
        code: String,
        message: String,
    },

    /// Enumerating objects under a prefix failed.
    #[error("could not list key: {key} {code}")]
    List {
        key: String,
        code: String,
        message: String,
    },

    /// The object body is not valid UTF-8.
    #[error("could not decode key: {key} is not valid UTF-8")]
    Decode { key: String },

    /// Store configuration rejected before any request was made.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Provider error code, if this is a storage failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Read { code, .. } | Self::Write { code, .. } | Self::List { code, .. } => {
                Some(code)
            }
            Self::Decode { .. } | Self::InvalidConfig(_) => None,
        }
    }

    /// Object path the failing request targeted.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Read { key, .. }
            | Self::Write { key, .. }
            | Self::List { key, .. }
            | Self::Decode { key } => Some(key),
            Self::InvalidConfig(_) => None,
        }
    }

    pub(crate) fn read(key: &str, err: BackendError) -> Self {
        Self::Read {
            key: key.to_string(),
            code: err.code,
            message: err.message,
        }
    }

    pub(crate) fn write(key: &str, err: BackendError) -> Self {
        Self::Write {
            key: key.to_string(),
            code: err.code,
            message: err.message,
        }
    }

    pub(crate) fn list(key: &str, err: BackendError) -> Self {
        Self::List {
            key: key.to_string(),
            code: err.code,
            message: err.message,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_mentions_key_and_code() {
        let err = StoreError::read("env1/svc/port", BackendError::no_such_key("env1/svc/port"));
        assert_eq!(err.to_string(), "could not read key: env1/svc/port NoSuchKey");
        assert_eq!(err.code(), Some("NoSuchKey"));
        assert_eq!(err.key(), Some("env1/svc/port"));
    }

    #[test]
    fn write_and_list_errors_carry_code() {
        let err = StoreError::write("a/b", BackendError::access_denied("a/b"));
        assert_eq!(err.to_string(), "could not write key: a/b AccessDenied");

        let err = StoreError::list("a", BackendError::new("Timeout", "timed out"));
        assert_eq!(err.code(), Some("Timeout"));
    }

    #[test]
    fn config_error_has_no_code() {
        let err = StoreError::InvalidConfig("empty bucket".into());
        assert!(err.code().is_none());
        assert!(err.key().is_none());
    }
}
