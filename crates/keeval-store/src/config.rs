use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Default key hierarchy separator.
pub const DEFAULT_DELIMITER: &str = ".";

/// Default number of concurrent reads issued by a bulk read.
pub const DEFAULT_BULK_WORKERS: usize = 10;

/// Settings for one [`ConfigStore`](crate::ConfigStore) instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: String,
    pub bulk_workers: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
            bulk_workers: DEFAULT_BULK_WORKERS,
        }
    }
}

impl StoreConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_bulk_workers(mut self, workers: usize) -> Self {
        self.bulk_workers = workers;
        self
    }

    /// Prefix to join onto every path, treating an empty string as absent.
    pub fn effective_prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.bucket.is_empty() {
            return Err(StoreError::InvalidConfig("bucket name is empty".into()));
        }
        if self.delimiter.is_empty() {
            return Err(StoreError::InvalidConfig("delimiter is empty".into()));
        }
        if self.bulk_workers == 0 {
            return Err(StoreError::InvalidConfig(
                "bulk_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Credential material handed to the storage provider.
///
/// Every field is optional. Whatever is left unset is resolved by the
/// provider's default chain (environment, shared config, instance role).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialOptions {
    pub profile: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl CredentialOptions {
    /// Returns `(access_key_id, secret_access_key)` when both halves are present.
    pub fn static_keys(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// Only one half of the key pair was supplied.
    pub fn is_partial(&self) -> bool {
        self.access_key_id.is_some() != self.secret_access_key.is_some()
    }
}

impl std::fmt::Debug for CredentialOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialOptions")
            .field("profile", &self.profile)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.delimiter, ".");
        assert_eq!(c.bulk_workers, 10);
        assert!(c.prefix.is_none());
    }

    #[test]
    fn builder_methods() {
        let c = StoreConfig::new("configs")
            .with_prefix("env1")
            .with_delimiter(":")
            .with_bulk_workers(4);
        assert_eq!(c.bucket, "configs");
        assert_eq!(c.effective_prefix(), Some("env1"));
        assert_eq!(c.delimiter, ":");
        assert_eq!(c.bulk_workers, 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_prefix_is_absent() {
        let c = StoreConfig::new("b").with_prefix("");
        assert!(c.effective_prefix().is_none());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(StoreConfig::default().validate().is_err());
        assert!(StoreConfig::new("b").with_delimiter("").validate().is_err());
        assert!(StoreConfig::new("b").with_bulk_workers(0).validate().is_err());
    }

    #[test]
    fn config_deserializes_from_json() {
        let c: StoreConfig = serde_json::from_str(
            r#"{"bucket":"b","prefix":null,"delimiter":".","bulk_workers":3}"#,
        )
        .unwrap();
        assert_eq!(c, StoreConfig::new("b").with_bulk_workers(3));
    }

    #[test]
    fn static_keys_need_both_halves() {
        let mut creds = CredentialOptions {
            access_key_id: Some("AKIA".into()),
            ..Default::default()
        };
        assert!(creds.static_keys().is_none());
        assert!(creds.is_partial());

        creds.secret_access_key = Some("secret".into());
        assert_eq!(creds.static_keys(), Some(("AKIA", "secret")));
        assert!(!creds.is_partial());
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = CredentialOptions {
            profile: Some("dev".into()),
            access_key_id: Some("AKIA".into()),
            secret_access_key: Some("hunter2".into()),
            session_token: Some("tok".into()),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("dev"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
