//! Constants used throughout the permissions core crate.

/// Minimum length (in characters, after trimming) before tag input is prefix-matched.
pub const PREFIX_MATCH_MIN_LEN: usize = 3;

/// Default bind address for the REST API.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Environment variable holding the REST bind address.
pub const REST_ADDR_ENV: &str = "PERMISSIONS_REST_ADDR";

/// Environment variable naming an optional YAML catalog file.
pub const CATALOG_FILE_ENV: &str = "PERMISSIONS_CATALOG_FILE";
