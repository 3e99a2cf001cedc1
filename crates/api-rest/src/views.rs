//! Translation from domain types to response bodies.

use api_shared::{ConditionView, RuleSetRes, RuleSetSummary, ScopeView, SectionView};
use permissions_core::{ConditionTree, RuleSet, SectionKey};

pub fn summary(rule_set: &RuleSet) -> RuleSetSummary {
    RuleSetSummary {
        id: rule_set.id().to_string(),
        name: rule_set.name().to_string(),
        product: rule_set.product().key().to_string(),
        role: rule_set.role().map(|r| r.key().to_string()),
        dirty: rule_set.is_dirty(),
        saved_at: rule_set.saved_at().map(|t| t.to_rfc3339()),
    }
}

pub fn rule_set(rule_set: &RuleSet) -> RuleSetRes {
    RuleSetRes {
        summary: summary(rule_set),
        sections: rule_set
            .current()
            .sections()
            .map(|(key, tree)| section(key, tree))
            .collect(),
    }
}

fn section(key: SectionKey, tree: &ConditionTree) -> SectionView {
    SectionView {
        key: key.key().to_string(),
        label: key.label().to_string(),
        conditions: tree
            .conditions()
            .iter()
            .map(|c| ConditionView {
                id: c.id().get(),
                scopes: c
                    .scopes()
                    .iter()
                    .map(|s| ScopeView {
                        id: s.id().get(),
                        scope_type: s.scope_type().label().to_string(),
                        tags: s.tag_strings(),
                    })
                    .collect(),
            })
            .collect(),
    }
}
