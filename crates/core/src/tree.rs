//! Condition/scope tree for access-scope rules.
//!
//! A tree is an OR of [`Condition`]s; each condition is an AND of [`Scope`]s; each scope is a
//! typed filter holding an ordered list of tags. Tags within one scope are unique ignoring case.
//!
//! How empty nodes are treated is decided by the tree's [`PruningPolicy`]:
//! - [`PruningPolicy::Retain`]: only explicit removal deletes a scope or condition.
//! - [`PruningPolicy::Cascade`]: removing the last tag of a scope removes the scope, and a
//!   condition left without scopes is removed with it.
//!
//! `add_scope(None, ..)` replaces the whole condition list with a single new condition. This
//! reset is deliberate and differs from [`ConditionTree::add_condition`], which appends.

use crate::catalog::{OptionCatalog, ScopeFamily, ScopeType};
use crate::resolver::{find_matching_option, split_comma_separated};
use crate::{RuleError, RuleResult};
use scope_ids::{ConditionId, IdAllocator, ScopeId};
use scope_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Treatment of scopes and conditions that become empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruningPolicy {
    #[default]
    Retain,
    Cascade,
}

/// A typed filter clause and its selected tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    id: ScopeId,
    scope_type: ScopeType,
    tags: Vec<NonEmptyText>,
}

impl Scope {
    /// Creates a scope from stored parts.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateTag`] if two tags are equal ignoring case.
    pub fn new(id: ScopeId, scope_type: ScopeType, tags: Vec<NonEmptyText>) -> RuleResult<Self> {
        let mut seen = HashSet::with_capacity(tags.len());
        for tag in &tags {
            if !seen.insert(scope_types::fold_case(tag.as_str())) {
                return Err(RuleError::DuplicateTag {
                    scope: id,
                    tag: tag.to_string(),
                });
            }
        }
        Ok(Self {
            id,
            scope_type,
            tags,
        })
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn scope_type(&self) -> ScopeType {
        self.scope_type
    }

    pub fn tags(&self) -> &[NonEmptyText] {
        &self.tags
    }

    pub fn tag_strings(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.to_string()).collect()
    }

    /// Returns the stored tag equal to `tag` ignoring case, if any.
    pub fn find_tag(&self, tag: &str) -> Option<&NonEmptyText> {
        self.tags.iter().find(|t| t.eq_ignore_case(tag))
    }

    fn empty(id: ScopeId, scope_type: ScopeType) -> Self {
        Self {
            id,
            scope_type,
            tags: Vec::new(),
        }
    }
}

/// One OR-branch of a rule: scopes that must all match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    id: ConditionId,
    scopes: Vec<Scope>,
}

impl Condition {
    pub fn new(id: ConditionId, scopes: Vec<Scope>) -> Self {
        Self { id, scopes }
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn scope(&self, scope_id: ScopeId) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.id == scope_id)
    }
}

/// Result of adding a single tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagOutcome {
    /// The resolved tag was appended.
    Added(String),
    /// The scope already held this tag (possibly in another casing); nothing changed.
    Duplicate(String),
    /// The input was blank; nothing changed.
    Empty,
}

/// Mutable rule tree owned by one section of one rule set.
#[derive(Clone, Debug)]
pub struct ConditionTree {
    family: ScopeFamily,
    policy: PruningPolicy,
    conditions: Vec<Condition>,
    ids: IdAllocator,
}

/// Trees are equal when they hold the same rules; allocator state is ignored.
impl PartialEq for ConditionTree {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
            && self.policy == other.policy
            && self.conditions == other.conditions
    }
}

impl Eq for ConditionTree {}

impl ConditionTree {
    pub fn new(family: ScopeFamily, policy: PruningPolicy) -> Self {
        Self {
            family,
            policy,
            conditions: Vec::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Rebuilds a tree from stored conditions.
    ///
    /// The identifier allocator resumes after the highest identifier present.
    ///
    /// # Errors
    ///
    /// Returns an error if an identifier is used twice or a scope type is outside `family`.
    pub fn from_conditions(
        family: ScopeFamily,
        policy: PruningPolicy,
        conditions: Vec<Condition>,
    ) -> RuleResult<Self> {
        let mut seen = HashSet::new();
        for condition in &conditions {
            if !seen.insert(condition.id.get()) {
                return Err(RuleError::DuplicateId(condition.id.get()));
            }
            for scope in &condition.scopes {
                if !seen.insert(scope.id.get()) {
                    return Err(RuleError::DuplicateId(scope.id.get()));
                }
                ensure_allowed(family, scope.scope_type)?;
            }
        }
        let last = seen.into_iter().max().unwrap_or(0);
        Ok(Self {
            family,
            policy,
            conditions,
            ids: IdAllocator::resume_after(last),
        })
    }

    pub fn family(&self) -> ScopeFamily {
        self.family
    }

    pub fn policy(&self) -> PruningPolicy {
        self.policy
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn condition(&self, condition_id: ConditionId) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == condition_id)
    }

    pub fn scope(&self, condition_id: ConditionId, scope_id: ScopeId) -> Option<&Scope> {
        self.condition(condition_id)?.scope(scope_id)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn scope_count(&self) -> usize {
        self.conditions.iter().map(|c| c.scopes.len()).sum()
    }

    pub fn tag_count(&self) -> usize {
        self.conditions
            .iter()
            .flat_map(|c| c.scopes.iter())
            .map(|s| s.tags.len())
            .sum()
    }

    /// Adds an empty scope of `scope_type`.
    ///
    /// With `Some(condition_id)` the scope is appended to that condition. With `None` the whole
    /// condition list is replaced by one new condition holding only the new scope.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ScopeTypeNotAllowed`] for a type outside this tree's family, or
    /// [`RuleError::ConditionNotFound`] for an unknown condition. Fails with [`RuleError::Id`]
    /// once the tree has run out of identifiers.
    pub fn add_scope(
        &mut self,
        condition_id: Option<ConditionId>,
        scope_type: ScopeType,
    ) -> RuleResult<(ConditionId, ScopeId)> {
        ensure_allowed(self.family, scope_type)?;

        match condition_id {
            None => {
                let condition_id = self.ids.next_condition()?;
                let scope_id = self.ids.next_scope()?;
                let discarded = self.conditions.len();
                self.conditions = vec![Condition::new(
                    condition_id,
                    vec![Scope::empty(scope_id, scope_type)],
                )];
                tracing::debug!(
                    %condition_id, %scope_id, %scope_type, discarded,
                    "reset conditions with new scope"
                );
                Ok((condition_id, scope_id))
            }
            Some(condition_id) => {
                let index = self.condition_index(condition_id)?;
                let scope_id = self.ids.next_scope()?;
                self.conditions[index]
                    .scopes
                    .push(Scope::empty(scope_id, scope_type));
                tracing::debug!(%condition_id, %scope_id, %scope_type, "added scope");
                Ok((condition_id, scope_id))
            }
        }
    }

    /// Appends a condition with no scopes.
    pub fn add_condition(&mut self) -> RuleResult<ConditionId> {
        let condition_id = self.ids.next_condition()?;
        self.conditions.push(Condition::new(condition_id, Vec::new()));
        tracing::debug!(%condition_id, "added condition");
        Ok(condition_id)
    }

    /// Replaces every condition with those of `saved`.
    ///
    /// The identifier counter keeps whichever position is further along, so ids handed out
    /// since `saved` was taken are not handed out again.
    pub fn restore_from(&mut self, saved: &ConditionTree) {
        let last = self.ids.last();
        *self = saved.clone();
        self.ids.raise_to(last);
    }

    /// Removes a condition and everything under it.
    pub fn remove_condition(&mut self, condition_id: ConditionId) -> RuleResult<Condition> {
        let index = self.condition_index(condition_id)?;
        tracing::debug!(%condition_id, "removed condition");
        Ok(self.conditions.remove(index))
    }

    /// Removes a scope and its tags.
    ///
    /// Under [`PruningPolicy::Cascade`] the condition is removed too once it has no scopes left.
    pub fn remove_scope(
        &mut self,
        condition_id: ConditionId,
        scope_id: ScopeId,
    ) -> RuleResult<Scope> {
        let (ci, si) = self.scope_position(condition_id, scope_id)?;
        let removed = self.conditions[ci].scopes.remove(si);
        tracing::debug!(%condition_id, %scope_id, "removed scope");
        self.prune_condition(ci);
        Ok(removed)
    }

    /// Resolves `raw` against the catalog and appends it unless already present.
    pub fn add_tag(
        &mut self,
        catalog: &OptionCatalog,
        condition_id: ConditionId,
        scope_id: ScopeId,
        raw: &str,
    ) -> RuleResult<TagOutcome> {
        let (ci, si) = self.scope_position(condition_id, scope_id)?;
        let scope = &mut self.conditions[ci].scopes[si];

        let Some(resolved) = find_matching_option(catalog, scope.scope_type, raw) else {
            return Ok(TagOutcome::Empty);
        };
        if let Some(existing) = scope.find_tag(&resolved) {
            return Ok(TagOutcome::Duplicate(existing.to_string()));
        }

        let tag = NonEmptyText::new(&resolved)?;
        scope.tags.push(tag);
        tracing::debug!(%condition_id, %scope_id, tag = %resolved, "added tag");
        Ok(TagOutcome::Added(resolved))
    }

    /// Adds every comma-separated value in `raw`.
    ///
    /// Segments are trimmed, blanks dropped, each resolved against the catalog, and values
    /// already in the scope or earlier in the same batch are skipped (ignoring case).
    ///
    /// # Returns
    ///
    /// The tags actually appended, in input order.
    pub fn add_tags_from_comma_separated(
        &mut self,
        catalog: &OptionCatalog,
        condition_id: ConditionId,
        scope_id: ScopeId,
        raw: &str,
    ) -> RuleResult<Vec<String>> {
        let (ci, si) = self.scope_position(condition_id, scope_id)?;
        let scope = &mut self.conditions[ci].scopes[si];

        let mut resolved = Vec::new();
        for segment in split_comma_separated(raw) {
            let Some(value) = find_matching_option(catalog, scope.scope_type, segment) else {
                continue;
            };
            let tag = NonEmptyText::new(&value)?;
            let in_scope = scope.find_tag(&value).is_some();
            let in_batch = resolved
                .iter()
                .any(|t: &NonEmptyText| t.eq_ignore_case(&value));
            if !in_scope && !in_batch {
                resolved.push(tag);
            }
        }

        let added: Vec<String> = resolved.iter().map(|t| t.to_string()).collect();
        scope.tags.extend(resolved);
        tracing::debug!(%condition_id, %scope_id, added = added.len(), "added tag batch");
        Ok(added)
    }

    /// Removes the tag at `index`.
    ///
    /// Under [`PruningPolicy::Cascade`] removing the last tag removes the scope, and then the
    /// condition if it has no scopes left.
    pub fn remove_tag(
        &mut self,
        condition_id: ConditionId,
        scope_id: ScopeId,
        index: usize,
    ) -> RuleResult<String> {
        let (ci, si) = self.scope_position(condition_id, scope_id)?;
        let scope = &mut self.conditions[ci].scopes[si];

        let len = scope.tags.len();
        if index >= len {
            return Err(RuleError::TagIndexOutOfRange {
                scope: scope_id,
                index,
                len,
            });
        }
        let removed = scope.tags.remove(index).into_inner();
        tracing::debug!(%condition_id, %scope_id, tag = %removed, "removed tag");

        if self.policy == PruningPolicy::Cascade && scope.tags.is_empty() {
            self.conditions[ci].scopes.remove(si);
            tracing::debug!(%condition_id, %scope_id, "pruned empty scope");
            self.prune_condition(ci);
        }
        Ok(removed)
    }

    fn prune_condition(&mut self, index: usize) {
        if self.policy == PruningPolicy::Cascade && self.conditions[index].scopes.is_empty() {
            let pruned = self.conditions.remove(index);
            tracing::debug!(condition_id = %pruned.id, "pruned empty condition");
        }
    }

    fn condition_index(&self, condition_id: ConditionId) -> RuleResult<usize> {
        self.conditions
            .iter()
            .position(|c| c.id == condition_id)
            .ok_or(RuleError::ConditionNotFound(condition_id))
    }

    fn scope_position(
        &self,
        condition_id: ConditionId,
        scope_id: ScopeId,
    ) -> RuleResult<(usize, usize)> {
        let ci = self.condition_index(condition_id)?;
        let si = self.conditions[ci]
            .scopes
            .iter()
            .position(|s| s.id == scope_id)
            .ok_or(RuleError::ScopeNotFound {
                condition: condition_id,
                scope: scope_id,
            })?;
        Ok((ci, si))
    }
}

fn ensure_allowed(family: ScopeFamily, scope_type: ScopeType) -> RuleResult<()> {
    if family.allows(scope_type) {
        Ok(())
    } else {
        Err(RuleError::ScopeTypeNotAllowed { scope_type, family })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contracts() -> ConditionTree {
        ConditionTree::new(ScopeFamily::Contracts, PruningPolicy::Retain)
    }

    fn mrf() -> ConditionTree {
        ConditionTree::new(ScopeFamily::MrfSearch, PruningPolicy::Cascade)
    }

    fn tags(tree: &ConditionTree, c: ConditionId, s: ScopeId) -> Vec<String> {
        tree.scope(c, s).expect("scope exists").tag_strings()
    }

    #[test]
    fn billing_code_scope_restores_catalog_casing() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();

        let (c, s) = tree.add_scope(None, ScopeType::BillingCodes).unwrap();
        assert_eq!(tree.conditions().len(), 1);
        assert_eq!(tree.condition(c).unwrap().scopes().len(), 1);
        assert_eq!(
            tree.scope(c, s).unwrap().scope_type(),
            ScopeType::BillingCodes
        );
        assert!(tags(&tree, c, s).is_empty());

        let outcome = tree.add_tag(&catalog, c, s, "hcpcs c9741").unwrap();
        assert_eq!(outcome, TagOutcome::Added("HCPCS C9741".into()));
        assert_eq!(tags(&tree, c, s), vec!["HCPCS C9741"]);
    }

    #[test]
    fn add_scope_without_condition_resets_existing_conditions() {
        let mut tree = contracts();
        let (c1, _) = tree.add_scope(None, ScopeType::Payers).unwrap();
        tree.add_scope(Some(c1), ScopeType::Providers).unwrap();
        assert_eq!(tree.scope_count(), 2);

        let (c2, s2) = tree.add_scope(None, ScopeType::States).unwrap();

        assert_ne!(c1, c2);
        assert_eq!(tree.conditions().len(), 1);
        let only = &tree.conditions()[0];
        assert_eq!(only.id(), c2);
        assert_eq!(only.scopes().len(), 1);
        assert_eq!(only.scopes()[0].id(), s2);
        assert_eq!(only.scopes()[0].scope_type(), ScopeType::States);
    }

    #[test]
    fn add_scope_to_condition_appends() {
        let mut tree = contracts();
        let (c, s1) = tree.add_scope(None, ScopeType::Payers).unwrap();
        let (c_again, s2) = tree.add_scope(Some(c), ScopeType::States).unwrap();

        assert_eq!(c, c_again);
        assert_ne!(s1, s2);
        let ids: Vec<ScopeId> = tree.condition(c).unwrap().scopes().iter().map(Scope::id).collect();
        assert_eq!(ids, vec![s1, s2]);
    }

    #[test]
    fn add_scope_rejects_other_family_and_unknown_condition() {
        let mut tree = contracts();
        assert!(matches!(
            tree.add_scope(None, ScopeType::Npi),
            Err(RuleError::ScopeTypeNotAllowed { .. })
        ));
        assert!(matches!(
            tree.add_scope(Some(ConditionId::from_raw(99)), ScopeType::States),
            Err(RuleError::ConditionNotFound(_))
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn adding_same_tag_twice_in_any_casing_is_idempotent() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();

        tree.add_tag(&catalog, c, s, "texas").unwrap();
        let second = tree.add_tag(&catalog, c, s, "TEXAS").unwrap();

        assert_eq!(second, TagOutcome::Duplicate("Texas".into()));
        assert_eq!(tags(&tree, c, s), vec!["Texas"]);
    }

    #[test]
    fn free_text_duplicates_are_detected_ignoring_case() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();

        tree.add_tag(&catalog, c, s, "Kansas").unwrap();
        tree.add_tag(&catalog, c, s, "kansas").unwrap();

        assert_eq!(tags(&tree, c, s), vec!["Kansas"]);
    }

    #[test]
    fn blank_tag_is_a_no_op() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();

        assert_eq!(tree.add_tag(&catalog, c, s, "   ").unwrap(), TagOutcome::Empty);
        assert_eq!(tree.tag_count(), 0);
    }

    #[test]
    fn batch_add_dedupes_within_batch_and_applies_catalog_casing() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();

        let added = tree
            .add_tags_from_comma_separated(&catalog, c, s, "California, california, Texas")
            .unwrap();

        assert_eq!(added, vec!["California", "Texas"]);
        assert_eq!(tags(&tree, c, s), vec!["California", "Texas"]);
    }

    #[test]
    fn batch_add_skips_existing_tags_and_blank_segments() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();
        tree.add_tag(&catalog, c, s, "Ohio").unwrap();

        let added = tree
            .add_tags_from_comma_separated(&catalog, c, s, " ohio, , calif ,")
            .unwrap();

        assert_eq!(added, vec!["California"]);
        assert_eq!(tags(&tree, c, s), vec!["Ohio", "California"]);
    }

    #[test]
    fn remove_tag_by_index() {
        let catalog = OptionCatalog::from_options(Default::default()).unwrap();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();
        tree.add_tags_from_comma_separated(&catalog, c, s, "A,B,C")
            .unwrap();

        let removed = tree.remove_tag(c, s, 1).unwrap();

        assert_eq!(removed, "B");
        assert_eq!(tags(&tree, c, s), vec!["A", "C"]);
    }

    #[test]
    fn remove_tag_out_of_range_is_an_error() {
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();

        match tree.remove_tag(c, s, 0) {
            Err(RuleError::TagIndexOutOfRange { index, len, .. }) => {
                assert_eq!((index, len), (0, 0));
            }
            other => panic!("expected TagIndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn retain_policy_keeps_empty_scopes_and_conditions() {
        let catalog = OptionCatalog::builtin();
        let mut tree = contracts();
        let (c, s) = tree.add_scope(None, ScopeType::States).unwrap();
        tree.add_tag(&catalog, c, s, "Texas").unwrap();

        tree.remove_tag(c, s, 0).unwrap();
        assert!(tree.scope(c, s).is_some());

        tree.remove_scope(c, s).unwrap();
        assert!(tree.condition(c).is_some());
        assert_eq!(tree.scope_count(), 0);
    }

    #[test]
    fn cascade_policy_prunes_scope_and_condition_on_last_tag() {
        let catalog = OptionCatalog::builtin();
        let mut tree = mrf();
        let (c, s) = tree.add_scope(None, ScopeType::State).unwrap();
        tree.add_tag(&catalog, c, s, "Texas").unwrap();

        tree.remove_tag(c, s, 0).unwrap();

        assert!(tree.scope(c, s).is_none());
        assert!(tree.condition(c).is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn cascade_policy_keeps_condition_with_remaining_scopes() {
        let catalog = OptionCatalog::builtin();
        let mut tree = mrf();
        let (c, s1) = tree.add_scope(None, ScopeType::State).unwrap();
        let (_, s2) = tree.add_scope(Some(c), ScopeType::Npi).unwrap();
        tree.add_tag(&catalog, c, s1, "Ohio").unwrap();

        tree.remove_tag(c, s1, 0).unwrap();

        assert!(tree.scope(c, s1).is_none());
        assert!(tree.scope(c, s2).is_some());

        tree.remove_scope(c, s2).unwrap();
        assert!(tree.condition(c).is_none());
    }

    #[test]
    fn add_condition_appends_empty_condition() {
        let mut tree = mrf();
        let (c1, _) = tree.add_scope(None, ScopeType::Cbsa).unwrap();
        let c2 = tree.add_condition().unwrap();

        assert_eq!(tree.conditions().len(), 2);
        assert_eq!(tree.conditions()[0].id(), c1);
        assert!(tree.condition(c2).unwrap().scopes().is_empty());
    }

    #[test]
    fn identifiers_are_never_reused() {
        let mut tree = contracts();
        let (c, s1) = tree.add_scope(None, ScopeType::States).unwrap();
        tree.remove_scope(c, s1).unwrap();
        let (_, s2) = tree.add_scope(Some(c), ScopeType::States).unwrap();

        assert!(s2.get() > s1.get());
    }

    #[test]
    fn from_conditions_rejects_duplicate_ids_and_resumes_allocator() {
        let scope = Scope::new(ScopeId::from_raw(2), ScopeType::States, vec![]).unwrap();
        let dup = Condition::new(ConditionId::from_raw(2), vec![scope.clone()]);
        assert!(matches!(
            ConditionTree::from_conditions(ScopeFamily::Contracts, PruningPolicy::Retain, vec![dup]),
            Err(RuleError::DuplicateId(2))
        ));

        let ok = Condition::new(ConditionId::from_raw(1), vec![scope]);
        let mut tree =
            ConditionTree::from_conditions(ScopeFamily::Contracts, PruningPolicy::Retain, vec![ok])
                .unwrap();
        assert_eq!(tree.add_condition().unwrap().get(), 3);
    }

    #[test]
    fn exhausted_identifiers_are_an_error() {
        let scope = Scope::new(ScopeId::from_raw(u64::MAX), ScopeType::States, vec![]).unwrap();
        let full = Condition::new(ConditionId::from_raw(1), vec![scope]);
        let mut tree =
            ConditionTree::from_conditions(ScopeFamily::Contracts, PruningPolicy::Retain, vec![full])
                .unwrap();

        assert!(matches!(tree.add_condition(), Err(RuleError::Id(_))));
        assert!(matches!(
            tree.add_scope(Some(ConditionId::from_raw(1)), ScopeType::Payers),
            Err(RuleError::Id(_))
        ));
        assert!(matches!(
            tree.add_scope(None, ScopeType::Payers),
            Err(RuleError::Id(_))
        ));
        assert_eq!(tree.conditions().len(), 1);
        assert_eq!(tree.scope_count(), 1);
    }

    #[test]
    fn restore_from_keeps_identifier_counter() {
        let mut tree = contracts();
        let (c, _) = tree.add_scope(None, ScopeType::States).unwrap();
        let saved = tree.clone();

        let (_, dropped) = tree.add_scope(Some(c), ScopeType::Payers).unwrap();
        tree.restore_from(&saved);
        assert_eq!(tree, saved);

        let (_, fresh) = tree.add_scope(Some(c), ScopeType::Payers).unwrap();
        assert!(fresh.get() > dropped.get());
    }

    #[test]
    fn scope_new_rejects_case_insensitive_duplicates() {
        let tags = vec![
            NonEmptyText::new("Texas").unwrap(),
            NonEmptyText::new("texas").unwrap(),
        ];
        assert!(matches!(
            Scope::new(ScopeId::from_raw(1), ScopeType::States, tags),
            Err(RuleError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn equality_ignores_allocator_state() {
        let mut a = contracts();
        let b = contracts();
        a.add_condition().unwrap();
        let c = a.conditions()[0].id();
        a.remove_condition(c).unwrap();

        assert_eq!(a, b);
    }
}
