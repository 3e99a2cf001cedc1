//! Internal implementation of identifier services.

use crate::{IdError, IdResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical identifier of a stored rule set (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to be in canonical form, so it can be
/// used directly as a map key and rendered into REST paths without further checks.
///
/// # Construction
/// - [`RuleSetId::new`] generates a fresh identifier.
/// - [`RuleSetId::parse`] validates an externally supplied identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleSetId(Uuid);

impl Default for RuleSetId {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSetId {
    /// Generates a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical form.
    ///
    /// This does **not** normalise other common UUID forms (for example, hyphenated or
    /// uppercase).
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> IdResult<Self> {
        if !Self::is_canonical(input) {
            return Err(IdError::InvalidInput(format!(
                "rule set id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| IdError::InvalidInput(format!("invalid rule set id '{}': {}", input, e)))
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// A purely syntactic check: exactly 32 bytes of `0-9`/`a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for RuleSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RuleSetId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleSetId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RuleSetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RuleSetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RuleSetId::parse(&s).map_err(serde::de::Error::custom)
    }
}

macro_rules! define_tree_id {
    ($name:ident, $label:expr) => {
        #[doc = concat!("Identifier of a ", $label, ", unique within its owning tree.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw value, for example one read back from a file.
            pub fn from_raw(value: u64) -> Self {
                Self(value)
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self).map_err(|e| {
                    IdError::InvalidInput(format!("invalid {} id '{}': {}", $label, s, e))
                })
            }
        }
    };
}

define_tree_id!(ConditionId, "condition");
define_tree_id!(ScopeId, "scope");

/// Monotonic identifier source owned by one condition tree.
///
/// Conditions and scopes draw from the same counter, so within one tree a condition id never
/// equals a scope id. The first identifier handed out is `1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator that resumes after `last`.
    ///
    /// Used when a tree is rebuilt from stored identifiers.
    pub fn resume_after(last: u64) -> Self {
        Self { last }
    }

    /// # Errors
    ///
    /// Returns [`IdError::Exhausted`] once `u64::MAX` has been handed out.
    pub fn next_condition(&mut self) -> IdResult<ConditionId> {
        self.bump().map(ConditionId)
    }

    /// # Errors
    ///
    /// Returns [`IdError::Exhausted`] once `u64::MAX` has been handed out.
    pub fn next_scope(&mut self) -> IdResult<ScopeId> {
        self.bump().map(ScopeId)
    }

    /// The most recently allocated raw value, `0` if nothing has been allocated.
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Moves the counter forward to `last` if it is behind; never moves it back.
    pub fn raise_to(&mut self, last: u64) {
        self.last = self.last.max(last);
    }

    fn bump(&mut self) -> IdResult<u64> {
        let next = self.last.checked_add(1).ok_or(IdError::Exhausted(self.last))?;
        self.last = next;
        Ok(next)
    }
}
