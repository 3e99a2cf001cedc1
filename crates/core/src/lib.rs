//! # Permissions Core
//!
//! Core logic for organisational permission rules:
//! - the option catalog of candidate values per scope type
//! - tag resolution from free text to catalog values
//! - the condition/scope tree that rules are built from
//! - per-product rule books and the in-memory entitlement store
//!
//! **No API concerns**: HTTP servers, file formats and CLIs belong in `api-rest`, `scope-wire`
//! and `permissions-cli`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod resolver;
pub mod sections;
pub mod service;
pub mod tree;

pub use catalog::{OptionCatalog, ScopeFamily, ScopeType};
pub use config::{catalog_path_from_env_value, rest_addr_from_env_value, CoreConfig};
pub use constants::*;
pub use error::{RuleError, RuleResult};
pub use resolver::{find_matching_option, split_comma_separated};
pub use sections::{Product, Role, RuleBook, SectionKey};
pub use service::{EntitlementService, RuleSet};
pub use tree::{Condition, ConditionTree, PruningPolicy, Scope, TagOutcome};

pub use scope_ids::{ConditionId, RuleSetId, ScopeId};
pub use scope_types::NonEmptyText;
