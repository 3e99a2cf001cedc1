//! Rule book wire model and translation helpers.
//!
//! Example:
//!
//! ```yaml
//! product: mrf_search
//! sections:
//!   hospital:
//!     - id: 1
//!       scopes:
//!         - id: 2
//!           type: State
//!           tags:
//!             - Texas
//! ```
//!
//! Identifiers are written out so that a file edited through the CLI keeps stable ids between
//! invocations. Tags are stored already resolved and are not re-resolved on read.

use crate::{parse_strict, WireError, WireResult};
use permissions_core::{
    Condition, ConditionId, ConditionTree, Product, RuleBook, Scope, ScopeId, ScopeType,
    SectionKey,
};
use scope_types::NonEmptyText;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Rule book file operations.
///
/// This is a zero-sized type used for namespacing; all methods are associated functions.
pub struct RuleBookFile;

impl RuleBookFile {
    /// Parse a rule book from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] if:
    /// - the YAML does not match the schema or contains unknown keys,
    /// - a section does not belong to the product,
    /// - a scope type is outside the product's scope family,
    /// - an identifier is repeated, or a scope holds the same tag twice ignoring case.
    pub fn parse(yaml_text: &str) -> WireResult<RuleBook> {
        let wire: RuleBookWire = parse_strict(yaml_text, "Rule book")?;
        wire_to_domain(wire)
    }

    /// Render a rule book as YAML text.
    pub fn render(book: &RuleBook) -> WireResult<String> {
        serde_yaml::to_string(&domain_to_wire(book))
            .map_err(|e| WireError::Translation(format!("Failed to serialize rule book: {e}")))
    }

    pub fn read(path: &Path) -> WireResult<RuleBook> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| {
            tracing::warn!("rejected rule book {}: {}", path.display(), e);
            e
        })
    }

    pub fn write(path: &Path, book: &RuleBook) -> WireResult<()> {
        std::fs::write(path, Self::render(book)?)?;
        Ok(())
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct RuleBookWire {
    product: Product,
    #[serde(default, deserialize_with = "unique_sections")]
    sections: BTreeMap<SectionKey, Vec<ConditionWire>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ConditionWire {
    id: u64,
    #[serde(default)]
    scopes: Vec<ScopeWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ScopeWire {
    id: u64,
    #[serde(rename = "type")]
    scope_type: ScopeType,
    #[serde(default)]
    tags: Vec<NonEmptyText>,
}

/// Reads the `sections` map, refusing a section that appears twice.
///
/// `payer` and `procedure` name the same section, so a plain map would let the later entry
/// silently replace the earlier one.
fn unique_sections<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<SectionKey, Vec<ConditionWire>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SectionsVisitor;

    impl<'de> Visitor<'de> for SectionsVisitor {
        type Value = BTreeMap<SectionKey, Vec<ConditionWire>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of section keys to condition lists")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sections = BTreeMap::new();
            while let Some((key, conditions)) =
                map.next_entry::<SectionKey, Vec<ConditionWire>>()?
            {
                if sections.insert(key, conditions).is_some() {
                    return Err(de::Error::custom(format!("duplicate section `{key}`")));
                }
            }
            Ok(sections)
        }
    }

    deserializer.deserialize_map(SectionsVisitor)
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: RuleBookWire) -> WireResult<RuleBook> {
    let product = wire.product;
    let mut trees = BTreeMap::new();

    for (key, conditions) in wire.sections {
        let conditions = conditions
            .into_iter()
            .map(|c| -> WireResult<Condition> {
                let scopes = c
                    .scopes
                    .into_iter()
                    .map(|s| Scope::new(ScopeId::from_raw(s.id), s.scope_type, s.tags))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Condition::new(ConditionId::from_raw(c.id), scopes))
            })
            .collect::<WireResult<Vec<_>>>()?;

        let tree = ConditionTree::from_conditions(
            product.scope_family(),
            product.pruning_policy(),
            conditions,
        )?;
        trees.insert(key, tree);
    }

    Ok(RuleBook::from_sections(product, trees)?)
}

fn domain_to_wire(book: &RuleBook) -> RuleBookWire {
    let sections = book
        .sections()
        .map(|(key, tree)| {
            let conditions = tree
                .conditions()
                .iter()
                .map(|c| ConditionWire {
                    id: c.id().get(),
                    scopes: c
                        .scopes()
                        .iter()
                        .map(|s| ScopeWire {
                            id: s.id().get(),
                            scope_type: s.scope_type(),
                            tags: s.tags().to_vec(),
                        })
                        .collect(),
                })
                .collect();
            (key, conditions)
        })
        .collect();

    RuleBookWire {
        product: book.product(),
        sections,
    }
}
