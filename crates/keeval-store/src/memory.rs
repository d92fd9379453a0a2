use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BackendError, BackendResult};
use crate::traits::ObjectBackend;

/// In-memory, BTreeMap-based object backend.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock`;
/// bodies are cloned on read/write. Paths can be marked as denied to
/// emulate permission failures, and an optional latency makes concurrent
/// reads overlap so the peak number of in-flight reads can be observed.
/// Reads that run to completion are recorded in the order they finished.
pub struct InMemoryBackend {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    denied: RwLock<BTreeSet<String>>,
    latency: Option<Duration>,
    path_latency: HashMap<String, Duration>,
    completed: RwLock<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    puts: AtomicUsize,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            denied: RwLock::new(BTreeSet::new()),
            latency: None,
            path_latency: HashMap::new(),
            completed: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    /// Delay every `get_object` call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay `get_object` on `path` by `latency`, overriding the default.
    pub fn with_path_latency(mut self, path: impl Into<String>, latency: Duration) -> Self {
        self.path_latency.insert(path.into(), latency);
        self
    }

    /// Seed an object directly, bypassing the put counter.
    pub fn insert(&self, path: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(path.into(), body.into());
    }

    /// Make every operation on `path` fail with `AccessDenied`.
    pub fn deny(&self, path: impl Into<String>) {
        self.denied.write().expect("lock poisoned").insert(path.into());
    }

    /// Raw body stored at `path`, if any.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().expect("lock poisoned").get(path).cloned()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the backend is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Number of `put_object` calls served so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Highest number of `get_object` calls observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Paths whose `get_object` ran to completion, in completion order.
    pub fn completed_reads(&self) -> Vec<String> {
        self.completed.read().expect("lock poisoned").clone()
    }

    fn check_access(&self, path: &str) -> BackendResult<()> {
        if self.denied.read().expect("lock poisoned").contains(path) {
            return Err(BackendError::access_denied(path));
        }
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even if the read future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectBackend for InMemoryBackend {
    async fn get_object(&self, path: &str) -> BackendResult<Vec<u8>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.path_latency.get(path).copied().or(self.latency) {
            tokio::time::sleep(latency).await;
        }

        self.completed
            .write()
            .expect("lock poisoned")
            .push(path.to_string());
        self.check_access(path)?;
        self.get(path).ok_or_else(|| BackendError::no_such_key(path))
    }

    async fn put_object(&self, path: &str, body: Vec<u8>) -> BackendResult<()> {
        self.check_access(path)?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(path.to_string(), body);
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> BackendResult<Vec<String>> {
        self.check_access(prefix)?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone())
            .collect())
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("object_count", &self.len())
            .field("latency", &self.latency)
            .finish()
    }
}
