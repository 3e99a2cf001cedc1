//! Products, their rule sections, and the rule book that holds one tree per section.
//!
//! Each product fixes which sections exist, which scope family those sections offer, and how
//! empty nodes are pruned. Every section is an independent [`ConditionTree`] addressed by a
//! [`SectionKey`]; there is one set of operations for all of them.

use crate::catalog::ScopeFamily;
use crate::tree::{ConditionTree, PruningPolicy};
use crate::{RuleError, RuleResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Independent rule tree within a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Clear,
    Hospital,
    #[serde(alias = "payer")]
    Procedure,
    Device,
    Drug,
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        SectionKey::Clear,
        SectionKey::Hospital,
        SectionKey::Procedure,
        SectionKey::Device,
        SectionKey::Drug,
    ];

    /// Short key used in paths and files.
    pub fn key(self) -> &'static str {
        match self {
            SectionKey::Clear => "clear",
            SectionKey::Hospital => "hospital",
            SectionKey::Procedure => "procedure",
            SectionKey::Device => "device",
            SectionKey::Drug => "drug",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionKey::Clear => "Clear Contracts",
            SectionKey::Hospital => "Hospital Rates",
            SectionKey::Procedure => "Procedure Rates",
            SectionKey::Device => "Device Rates",
            SectionKey::Drug => "Drug Rates",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionKey {
    type Err = RuleError;

    /// Accepts the short key, the display label, or the legacy `payer` discriminator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted == "payer" {
            return Ok(SectionKey::Procedure);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.key() == wanted || k.label().to_lowercase() == wanted)
            .ok_or_else(|| RuleError::UnknownSection(s.to_string()))
    }
}

/// Product a member can be entitled to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    ClearContracts,
    Analyze,
    MrfSearch,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::ClearContracts, Product::Analyze, Product::MrfSearch];

    pub fn key(self) -> &'static str {
        match self {
            Product::ClearContracts => "clear_contracts",
            Product::Analyze => "analyze",
            Product::MrfSearch => "mrf_search",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Product::ClearContracts => "Clear Contracts",
            Product::Analyze => "Analyze",
            Product::MrfSearch => "MRF Search",
        }
    }

    /// Sections holding scope rules for this product, in display order.
    pub fn sections(self) -> &'static [SectionKey] {
        match self {
            Product::ClearContracts => &[SectionKey::Clear],
            Product::Analyze => &[],
            Product::MrfSearch => &[
                SectionKey::Hospital,
                SectionKey::Procedure,
                SectionKey::Device,
                SectionKey::Drug,
            ],
        }
    }

    pub fn scope_family(self) -> ScopeFamily {
        match self {
            Product::MrfSearch => ScopeFamily::MrfSearch,
            Product::ClearContracts | Product::Analyze => ScopeFamily::Contracts,
        }
    }

    pub fn pruning_policy(self) -> PruningPolicy {
        match self {
            Product::MrfSearch => PruningPolicy::Cascade,
            Product::ClearContracts | Product::Analyze => PruningPolicy::Retain,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Product {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.key() == wanted || p.label().to_lowercase() == wanted)
            .ok_or_else(|| RuleError::UnknownProduct(s.to_string()))
    }
}

/// Role granted on a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn key(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            _ => Err(RuleError::UnknownRole(s.to_string())),
        }
    }
}

/// All scope-rule trees for one product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleBook {
    product: Product,
    sections: BTreeMap<SectionKey, ConditionTree>,
}

impl RuleBook {
    /// Creates a rule book with an empty tree for each of the product's sections.
    pub fn new(product: Product) -> Self {
        let sections = product
            .sections()
            .iter()
            .map(|key| (*key, Self::empty_tree(product)))
            .collect();
        Self { product, sections }
    }

    /// Builds a rule book from stored trees.
    ///
    /// Sections the product has but `trees` lacks start empty.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::SectionNotInProduct`] for a tree keyed by a foreign section, or
    /// [`RuleError::InvalidInput`] if a tree's family or policy does not match the product.
    pub fn from_sections(
        product: Product,
        trees: BTreeMap<SectionKey, ConditionTree>,
    ) -> RuleResult<Self> {
        let mut book = Self::new(product);
        for (key, tree) in trees {
            if !product.sections().contains(&key) {
                return Err(RuleError::SectionNotInProduct {
                    section: key,
                    product,
                });
            }
            if tree.family() != product.scope_family() || tree.policy() != product.pruning_policy()
            {
                return Err(RuleError::InvalidInput(format!(
                    "tree for section {key} does not match product {product}"
                )));
            }
            book.sections.insert(key, tree);
        }
        Ok(book)
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn tree(&self, key: SectionKey) -> RuleResult<&ConditionTree> {
        self.sections.get(&key).ok_or(RuleError::SectionNotInProduct {
            section: key,
            product: self.product,
        })
    }

    pub fn tree_mut(&mut self, key: SectionKey) -> RuleResult<&mut ConditionTree> {
        let product = self.product;
        self.sections
            .get_mut(&key)
            .ok_or(RuleError::SectionNotInProduct {
                section: key,
                product,
            })
    }

    /// Sections in display order with their trees.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKey, &ConditionTree)> {
        self.sections.iter().map(|(k, t)| (*k, t))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(ConditionTree::is_empty)
    }

    /// Replaces each section with the same section of `saved`, keeping identifier counters.
    pub fn restore_from(&mut self, saved: &RuleBook) {
        for (key, tree) in &mut self.sections {
            if let Some(saved_tree) = saved.sections.get(key) {
                tree.restore_from(saved_tree);
            }
        }
    }

    fn empty_tree(product: Product) -> ConditionTree {
        ConditionTree::new(product.scope_family(), product.pruning_policy())
    }
}
