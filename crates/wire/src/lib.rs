//! YAML wire formats for scope rules.
//!
//! This crate provides **wire models** and **translation helpers** between on-disk YAML and the
//! domain types in `permissions-core`:
//! - rule books (all condition trees of one product)
//! - option catalogs (candidate values per scope type)
//!
//! Parsing is strict: unknown keys are rejected and schema mismatches report the path of the
//! offending field.

pub mod catalog_file;
pub mod rule_book;

pub use catalog_file::CatalogFile;
pub use rule_book::RuleBookFile;

/// Errors returned by the `scope-wire` crate.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid rules: {0}")]
    Rule(#[from] permissions_core::RuleError),
}

/// Type alias for Results that can fail with a [`WireError`].
pub type WireResult<T> = Result<T, WireError>;

/// Deserialises `yaml_text`, reporting the failing field path on schema mismatch.
pub(crate) fn parse_strict<T>(yaml_text: &str, what: &str) -> WireResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    match serde_path_to_error::deserialize::<_, T>(deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(WireError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}
