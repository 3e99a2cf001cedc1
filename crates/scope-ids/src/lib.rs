//! Identifier utilities for scope-rule trees and stored rule sets.
//!
//! Two kinds of identifier live here:
//!
//! - **Tree-scoped identifiers** ([`ConditionId`], [`ScopeId`]) handed out by an
//!   [`IdAllocator`] owned by a single condition tree. The allocator is a strictly monotonic
//!   counter, so two scopes added back to back can never collide and an identifier is never
//!   reused after its node has been removed.
//! - **Rule-set identifiers** ([`RuleSetId`]) used to address a stored rule set from outside the
//!   core (REST paths, CLI arguments). These are UUID v4 values in a *canonical* text form:
//!   **32 lowercase hexadecimal characters** (no hyphens).
//!
//! ## Canonical rule-set id form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected by
//! [`RuleSetId::parse`].

mod service;

// Re-export public types
pub use service::{ConditionId, IdAllocator, RuleSetId, ScopeId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Every identifier of the allocator has been handed out
    #[error("Identifier space exhausted after {0}")]
    Exhausted(u64),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
