//! Option catalog wire model.
//!
//! A catalog file maps scope-type labels to ordered candidate lists:
//!
//! ```yaml
//! States:
//!   - California
//!   - Texas
//! Billing Codes:
//!   - HCPCS C9741
//! ```
//!
//! Scope types left out of the file have no candidates; tags typed for them are kept verbatim.

use crate::{parse_strict, WireError, WireResult};
use permissions_core::{OptionCatalog, RuleError, ScopeType};
use std::collections::BTreeMap;
use std::path::Path;

/// Catalog file operations.
pub struct CatalogFile;

impl CatalogFile {
    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] for unknown scope-type labels, a scope type listed twice (labels
    /// ignore case), blank values, or values repeated within one scope type ignoring case.
    pub fn parse(yaml_text: &str) -> WireResult<OptionCatalog> {
        let wire: BTreeMap<String, Vec<String>> = parse_strict(yaml_text, "Catalog")?;

        let mut options = BTreeMap::new();
        for (label, values) in wire {
            let scope_type: ScopeType = label.parse()?;
            if options.insert(scope_type, values).is_some() {
                return Err(RuleError::InvalidCatalog(format!(
                    "scope type {scope_type} is listed more than once"
                ))
                .into());
            }
        }
        Ok(OptionCatalog::from_options(options)?)
    }

    pub fn render(catalog: &OptionCatalog) -> WireResult<String> {
        let wire: BTreeMap<ScopeType, Vec<String>> = catalog
            .iter()
            .map(|(t, values)| (t, values.to_vec()))
            .collect();
        serde_yaml::to_string(&wire)
            .map_err(|e| WireError::Translation(format!("Failed to serialize catalog: {e}")))
    }

    /// Reads a catalog file, falling back to the builtin catalog when `path` is `None`.
    pub fn load(path: Option<&Path>) -> WireResult<OptionCatalog> {
        match path {
            None => Ok(OptionCatalog::builtin()),
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let catalog = Self::parse(&text)?;
                tracing::info!("loaded option catalog from {}", path.display());
                Ok(catalog)
            }
        }
    }
}
