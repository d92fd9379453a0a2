use async_trait::async_trait;

use crate::error::BackendResult;

/// Raw object storage underneath a [`ConfigStore`](crate::ConfigStore).
///
/// Implementations deal only in storage paths (`a/b/c`); key translation
/// and prefixing happen in the store. All implementations must satisfy:
/// - `put_object` overwrites unconditionally.
/// - `list_objects` returns every matching path, in lexicographic order.
/// - Each call is a single request/response; no retries.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Fetch the body stored at `path`.
    async fn get_object(&self, path: &str) -> BackendResult<Vec<u8>>;

    /// Store `body` at `path`, replacing any existing object.
    async fn put_object(&self, path: &str, body: Vec<u8>) -> BackendResult<()>;

    /// Enumerate all object paths starting with `prefix`.
    async fn list_objects(&self, prefix: &str) -> BackendResult<Vec<String>>;
}
