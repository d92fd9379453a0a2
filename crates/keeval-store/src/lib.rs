//! Dotted-key configuration store backed by an object-storage bucket.
//!
//! Keys such as `svc.db.port` are mapped onto object paths (`svc/db/port`),
//! optionally namespaced under a fixed prefix, and their values are stored
//! as opaque object bodies.
//!
//! # Components
//!
//! - [`codec`] -- pure key <-> path translation
//! - [`ConfigStore`] -- read / write / list / bulk-read over a backend
//! - [`ObjectBackend`] -- the storage seam
//!
//! # Storage Backends
//!
//! - [`S3Backend`] -- AWS S3 (or any S3-compatible endpoint)
//! - [`InMemoryBackend`] -- `BTreeMap`-based backend for tests and embedding
//!
//! # Design Rules
//!
//! 1. Writes overwrite unconditionally; there is no versioning.
//! 2. Values are read back UTF-8 decoded with surrounding whitespace trimmed.
//! 3. Every failure is returned as a [`StoreError`]; nothing here exits the process.

pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod s3;
pub mod store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{CredentialOptions, StoreConfig, DEFAULT_BULK_WORKERS, DEFAULT_DELIMITER};
pub use error::{BackendError, StoreError, StoreResult};
pub use memory::InMemoryBackend;
pub use s3::S3Backend;
pub use store::{ConfigStore, WRITE_SUCCESS};
pub use traits::ObjectBackend;
