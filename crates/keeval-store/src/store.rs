use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::codec;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectBackend;

/// Returned by [`ConfigStore::write`] when the object was stored.
pub const WRITE_SUCCESS: &str = "Success";

/// Key/value view over an object backend.
///
/// Keys are translated to paths with the configured delimiter and joined
/// under the prefix, if one is set. Read results are keyed by the *full*
/// dotted path, prefix included, not by the key the caller passed in.
pub struct ConfigStore<B> {
    backend: B,
    config: StoreConfig,
}

impl<B: ObjectBackend> ConfigStore<B> {
    /// Create a store over `backend`, rejecting an invalid `config`.
    pub fn new(backend: B, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Storage path for `key`, prefix included.
    pub fn full_path(&self, key: &str) -> String {
        let path = codec::to_path(key, &self.config.delimiter);
        match self.config.effective_prefix() {
            Some(prefix) => format!("{prefix}/{path}"),
            None => path,
        }
    }

    fn dotify(&self, path: &str) -> String {
        codec::to_key(path, &self.config.delimiter)
    }

    /// Fetch one value.
    ///
    /// Returns a single-entry map from the dotted full path to the value,
    /// UTF-8 decoded with surrounding whitespace removed.
    pub async fn read(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        let path = self.full_path(key);
        debug!(key = %key, path = %path, "reading key");

        let body = self
            .backend
            .get_object(&path)
            .await
            .map_err(|e| StoreError::read(&path, e))?;

        let value = String::from_utf8(trim_whitespace(&body).to_vec())
            .map_err(|_| StoreError::Decode { key: path.clone() })?;

        Ok(BTreeMap::from([(self.dotify(&path), value)]))
    }

    /// Store `data` under `key`, overwriting whatever was there.
    pub async fn write(&self, key: &str, data: impl Into<Vec<u8>>) -> StoreResult<&'static str> {
        let path = self.full_path(key);
        let body = data.into();
        debug!(key = %key, path = %path, size = body.len(), "writing key");

        self.backend
            .put_object(&path, body)
            .await
            .map_err(|e| StoreError::write(&path, e))?;

        Ok(WRITE_SUCCESS)
    }

    /// Raw storage paths (not dotted keys) of every object under `key_prefix`.
    pub async fn list(&self, key_prefix: &str) -> StoreResult<Vec<String>> {
        let path = self.full_path(key_prefix);
        debug!(key = %key_prefix, path = %path, "listing keys");

        self.backend
            .list_objects(&path)
            .await
            .map_err(|e| StoreError::list(&path, e))
    }

    /// Read many keys concurrently and merge the results.
    ///
    /// At most `bulk_workers` reads are in flight at once. The first failure
    /// aborts the batch: reads still in flight are dropped and no partial
    /// result is returned.
    pub async fn read_bulk<I, K>(&self, keys: I) -> StoreResult<BTreeMap<String, String>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        info!(count = keys.len(), workers = self.config.bulk_workers, "Reading keys");

        let mut reads = stream::iter(keys)
            .map(|key| async move { self.read(key.as_ref()).await })
            .buffer_unordered(self.config.bulk_workers);

        let mut merged = BTreeMap::new();
        while let Some(entry) = reads.next().await {
            merged.extend(entry?);
        }
        Ok(merged)
    }
}

/// Strip leading and trailing space, `\t`, `\n`, `\x0b`, `\x0c` and `\r`.
fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let is_space = |b: &u8| matches!(b, b' ' | b'\t'..=b'\r');
    let start = bytes.iter().position(|b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

impl<B: std::fmt::Debug> std::fmt::Debug for ConfigStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish()
    }
}
