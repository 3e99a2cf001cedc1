//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services, so request
//! handling never reads process-wide environment variables.

use crate::catalog::OptionCatalog;
use crate::constants::DEFAULT_REST_ADDR;
use crate::{RuleError, RuleResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    rest_addr: String,
    catalog: Arc<OptionCatalog>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidInput`] if `rest_addr` is blank.
    pub fn new(rest_addr: String, catalog: OptionCatalog) -> RuleResult<Self> {
        if rest_addr.trim().is_empty() {
            return Err(RuleError::InvalidInput(
                "rest_addr cannot be empty".into(),
            ));
        }

        Ok(Self {
            rest_addr,
            catalog: Arc::new(catalog),
        })
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn catalog(&self) -> Arc<OptionCatalog> {
        self.catalog.clone()
    }
}

/// Parse the REST bind address from an optional environment value.
///
/// `None` or a blank value falls back to [`DEFAULT_REST_ADDR`].
pub fn rest_addr_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REST_ADDR.to_string())
}

/// Parse the optional catalog file path from an environment value.
pub fn catalog_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
