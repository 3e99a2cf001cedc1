use crate::catalog::{ScopeFamily, ScopeType};
use crate::sections::{Product, SectionKey};
use scope_ids::{ConditionId, RuleSetId, ScopeId};

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("unknown scope type: {0}")]
    UnknownScopeType(String),
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("section {section} is not part of product {product}")]
    SectionNotInProduct { section: SectionKey, product: Product },
    #[error("scope type {scope_type} is not offered for {family:?} rules")]
    ScopeTypeNotAllowed {
        scope_type: ScopeType,
        family: ScopeFamily,
    },
    #[error("condition {0} not found")]
    ConditionNotFound(ConditionId),
    #[error("scope {scope} not found in condition {condition}")]
    ScopeNotFound {
        condition: ConditionId,
        scope: ScopeId,
    },
    #[error("tag index {index} out of range for scope {scope} ({len} tags)")]
    TagIndexOutOfRange {
        scope: ScopeId,
        index: usize,
        len: usize,
    },
    #[error("duplicate identifier {0} in rule tree")]
    DuplicateId(u64),
    #[error("duplicate tag '{tag}' in scope {scope}")]
    DuplicateTag { scope: ScopeId, tag: String },
    #[error("rule set {0} not found")]
    RuleSetNotFound(RuleSetId),
    #[error("rule set store lock poisoned")]
    LockPoisoned,
    #[error("invalid text: {0}")]
    Text(#[from] scope_types::TextError),
    #[error("invalid identifier: {0}")]
    Id(#[from] scope_ids::IdError),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;
