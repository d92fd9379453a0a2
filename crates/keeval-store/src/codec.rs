//! Translation between user-facing keys and storage paths.
//!
//! A key uses a configurable delimiter as its hierarchy separator
//! (`svc.db.port`); a path always uses `/` (`svc/db/port`). The mapping is a
//! plain character substitution with no escaping, so a key segment that
//! itself contains `/` does not survive the round trip.

/// Separator used by storage paths.
pub const PATH_SEPARATOR: &str = "/";

/// Convert a key into a storage path.
pub fn to_path(key: &str, delimiter: &str) -> String {
    key.replace(delimiter, PATH_SEPARATOR)
}

/// Convert a storage path back into a key.
pub fn to_key(path: &str, delimiter: &str) -> String {
    path.replace(PATH_SEPARATOR, delimiter)
}
