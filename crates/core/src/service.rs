//! In-memory store of rule sets with a save/discard workflow.
//!
//! Every rule set keeps two copies of its rule book: the working copy that edits are applied
//! to, and the last saved copy. Saving copies the working book over the saved one; discarding
//! does the reverse. Nothing leaves the process.

use crate::catalog::OptionCatalog;
use crate::sections::{Product, Role, RuleBook};
use crate::{RuleError, RuleResult};
use chrono::{DateTime, Utc};
use scope_ids::RuleSetId;
use scope_types::NonEmptyText;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A named, product-specific entitlement with working and saved rule books.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSet {
    id: RuleSetId,
    name: NonEmptyText,
    role: Option<Role>,
    current: RuleBook,
    saved: RuleBook,
    saved_at: Option<DateTime<Utc>>,
}

impl RuleSet {
    pub fn id(&self) -> RuleSetId {
        self.id
    }

    pub fn name(&self) -> &NonEmptyText {
        &self.name
    }

    pub fn product(&self) -> Product {
        self.current.product()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The working copy.
    pub fn current(&self) -> &RuleBook {
        &self.current
    }

    /// The last saved copy.
    pub fn saved(&self) -> &RuleBook {
        &self.saved
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    /// True when the working copy differs from the last saved copy.
    pub fn is_dirty(&self) -> bool {
        self.current != self.saved
    }
}

/// Cloneable handle to the shared rule-set store.
#[derive(Clone, Debug)]
pub struct EntitlementService {
    catalog: Arc<OptionCatalog>,
    rule_sets: Arc<RwLock<HashMap<RuleSetId, RuleSet>>>,
}

impl EntitlementService {
    pub fn new(catalog: Arc<OptionCatalog>) -> Self {
        Self {
            catalog,
            rule_sets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    /// Creates an empty rule set for `product`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Text`] if `name` is blank.
    pub fn create(&self, name: &str, product: Product) -> RuleResult<RuleSet> {
        self.insert(name, RuleBook::new(product))
    }

    /// Stores an existing rule book (for example one read from a file) as a new rule set.
    ///
    /// The book is treated as already saved.
    pub fn import(&self, name: &str, book: RuleBook) -> RuleResult<RuleSet> {
        self.insert(name, book)
    }

    /// All rule sets ordered by name, then id.
    pub fn list(&self) -> RuleResult<Vec<RuleSet>> {
        let mut all: Vec<RuleSet> = self.read()?.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    pub fn get(&self, id: RuleSetId) -> RuleResult<RuleSet> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(RuleError::RuleSetNotFound(id))
    }

    /// Applies `edit` to the working rule book.
    ///
    /// The closure receives the catalog so tag edits can be resolved. If it fails, the working
    /// copy is left as it was before the call.
    pub fn update<T>(
        &self,
        id: RuleSetId,
        edit: impl FnOnce(&OptionCatalog, &mut RuleBook) -> RuleResult<T>,
    ) -> RuleResult<T> {
        let mut guard = self.write()?;
        let rule_set = guard.get_mut(&id).ok_or(RuleError::RuleSetNotFound(id))?;

        let mut draft = rule_set.current.clone();
        let value = edit(self.catalog.as_ref(), &mut draft)?;
        rule_set.current = draft;
        Ok(value)
    }

    pub fn set_role(&self, id: RuleSetId, role: Option<Role>) -> RuleResult<()> {
        let mut guard = self.write()?;
        let rule_set = guard.get_mut(&id).ok_or(RuleError::RuleSetNotFound(id))?;
        rule_set.role = role;
        tracing::info!(rule_set = %id, ?role, "set role");
        Ok(())
    }

    /// Copies the working rule book over the saved one.
    pub fn save(&self, id: RuleSetId) -> RuleResult<RuleSet> {
        let mut guard = self.write()?;
        let rule_set = guard.get_mut(&id).ok_or(RuleError::RuleSetNotFound(id))?;

        rule_set.saved = rule_set.current.clone();
        rule_set.saved_at = Some(Utc::now());
        tracing::info!(
            rule_set = %id,
            product = %rule_set.product(),
            "saved rule set"
        );
        Ok(rule_set.clone())
    }

    /// Restores the working rule book from the saved one.
    pub fn discard(&self, id: RuleSetId) -> RuleResult<RuleSet> {
        let mut guard = self.write()?;
        let rule_set = guard.get_mut(&id).ok_or(RuleError::RuleSetNotFound(id))?;

        rule_set.current.restore_from(&rule_set.saved);
        tracing::info!(rule_set = %id, "discarded unsaved changes");
        Ok(rule_set.clone())
    }

    pub fn is_dirty(&self, id: RuleSetId) -> RuleResult<bool> {
        Ok(self.get(id)?.is_dirty())
    }

    pub fn delete(&self, id: RuleSetId) -> RuleResult<()> {
        if self.write()?.remove(&id).is_none() {
            return Err(RuleError::RuleSetNotFound(id));
        }
        tracing::info!(rule_set = %id, "deleted rule set");
        Ok(())
    }

    fn insert(&self, name: &str, book: RuleBook) -> RuleResult<RuleSet> {
        let name = NonEmptyText::new(name)?;
        let rule_set = RuleSet {
            id: RuleSetId::new(),
            name,
            role: None,
            saved: book.clone(),
            current: book,
            saved_at: None,
        };
        self.write()?.insert(rule_set.id, rule_set.clone());
        tracing::info!(
            rule_set = %rule_set.id,
            product = %rule_set.product(),
            name = %rule_set.name,
            "created rule set"
        );
        Ok(rule_set)
    }

    fn read(&self) -> RuleResult<RwLockReadGuard<'_, HashMap<RuleSetId, RuleSet>>> {
        self.rule_sets.read().map_err(|_| RuleError::LockPoisoned)
    }

    fn write(&self) -> RuleResult<RwLockWriteGuard<'_, HashMap<RuleSetId, RuleSet>>> {
        self.rule_sets.write().map_err(|_| RuleError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScopeType;
    use crate::sections::SectionKey;

    fn service() -> EntitlementService {
        EntitlementService::new(Arc::new(OptionCatalog::builtin()))
    }

    #[test]
    fn create_and_get_round_trip() {
        let svc = service();
        let created = svc.create("West region", Product::ClearContracts).unwrap();

        let fetched = svc.get(created.id()).unwrap();
        assert_eq!(fetched.name().as_str(), "West region");
        assert_eq!(fetched.product(), Product::ClearContracts);
        assert!(!fetched.is_dirty());
        assert!(fetched.saved_at().is_none());
    }

    #[test]
    fn create_rejects_blank_name() {
        assert!(matches!(
            service().create("  ", Product::Analyze),
            Err(RuleError::Text(_))
        ));
    }

    #[test]
    fn update_marks_dirty_and_save_clears_it() {
        let svc = service();
        let id = svc.create("Hospitals", Product::MrfSearch).unwrap().id();

        let added = svc
            .update(id, |catalog, book| {
                let tree = book.tree_mut(SectionKey::Hospital)?;
                let (c, s) = tree.add_scope(None, ScopeType::State)?;
                tree.add_tags_from_comma_separated(catalog, c, s, "texas, ohio")
            })
            .unwrap();
        assert_eq!(added, vec!["Texas", "Ohio"]);
        assert!(svc.is_dirty(id).unwrap());

        let saved = svc.save(id).unwrap();
        assert!(!saved.is_dirty());
        assert!(saved.saved_at().is_some());
        assert_eq!(saved.saved().tree(SectionKey::Hospital).unwrap().tag_count(), 2);
    }

    #[test]
    fn discard_restores_saved_copy() {
        let svc = service();
        let id = svc.create("Contracts", Product::ClearContracts).unwrap().id();

        svc.update(id, |_, book| {
            book.tree_mut(SectionKey::Clear)?
                .add_scope(None, ScopeType::Payers)
        })
        .unwrap();
        let discarded = svc.discard(id).unwrap();

        assert!(discarded.current().tree(SectionKey::Clear).unwrap().is_empty());
        assert!(!svc.is_dirty(id).unwrap());
    }

    #[test]
    fn discard_does_not_hand_out_discarded_ids_again() {
        let svc = service();
        let id = svc.create("Contracts", Product::ClearContracts).unwrap().id();

        let (c, _) = svc
            .update(id, |_, book| {
                book.tree_mut(SectionKey::Clear)?
                    .add_scope(None, ScopeType::Payers)
            })
            .unwrap();
        svc.save(id).unwrap();

        let (_, discarded) = svc
            .update(id, |_, book| {
                book.tree_mut(SectionKey::Clear)?
                    .add_scope(Some(c), ScopeType::States)
            })
            .unwrap();
        svc.discard(id).unwrap();
        assert!(!svc.is_dirty(id).unwrap());

        let (_, fresh) = svc
            .update(id, |_, book| {
                book.tree_mut(SectionKey::Clear)?
                    .add_scope(Some(c), ScopeType::States)
            })
            .unwrap();
        assert_ne!(fresh, discarded);
        assert!(fresh.get() > discarded.get());
    }

    #[test]
    fn failed_update_leaves_working_copy_untouched() {
        let svc = service();
        let id = svc.create("Contracts", Product::ClearContracts).unwrap().id();

        let result = svc.update(id, |_, book| {
            let tree = book.tree_mut(SectionKey::Clear)?;
            tree.add_scope(None, ScopeType::Payers)?;
            tree.add_scope(None, ScopeType::Npi)
        });

        assert!(matches!(result, Err(RuleError::ScopeTypeNotAllowed { .. })));
        assert!(!svc.is_dirty(id).unwrap());
    }

    #[test]
    fn unknown_rule_set_is_not_found() {
        let svc = service();
        let missing = RuleSetId::new();
        assert!(matches!(svc.get(missing), Err(RuleError::RuleSetNotFound(_))));
        assert!(matches!(svc.delete(missing), Err(RuleError::RuleSetNotFound(_))));
    }

    #[test]
    fn list_is_sorted_by_name_and_delete_removes() {
        let svc = service();
        let b = svc.create("beta", Product::Analyze).unwrap();
        svc.create("alpha", Product::Analyze).unwrap();

        let names: Vec<String> = svc
            .list()
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);

        svc.delete(b.id()).unwrap();
        assert_eq!(svc.list().unwrap().len(), 1);
    }

    #[test]
    fn set_role_is_stored() {
        let svc = service();
        let id = svc.create("Analysts", Product::Analyze).unwrap().id();
        svc.set_role(id, Some(Role::Viewer)).unwrap();
        assert_eq!(svc.get(id).unwrap().role(), Some(Role::Viewer));
    }
}
