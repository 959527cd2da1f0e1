//! Alias scope for a single translation.
//!
//! Built strictly left-to-right to match the source ordering semantics: a
//! chained join `a.Y b` requires `a` to be bound by a prior join (or the
//! root). Insertion order is preserved so error messages list aliases in
//! declaration order.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Alias → entity bindings for one query.
#[derive(Debug, Clone)]
pub struct AliasScope {
    entries: IndexMap<String, String>,
    /// Case-insensitive shadow set for duplicate detection
    lowered: FxHashSet<String>,
    /// Aliases whose navigation property did not resolve; their joins are
    /// elided and field checks against them are skipped
    unresolved: FxHashSet<String>,
    root_alias: String,
}

impl AliasScope {
    /// Start a scope with the root binding.
    pub fn new(root_alias: impl Into<String>, root_entity: impl Into<String>) -> Self {
        let root_alias = root_alias.into();
        let mut entries = IndexMap::new();
        entries.insert(root_alias.clone(), root_entity.into());
        let mut lowered = FxHashSet::default();
        lowered.insert(root_alias.to_lowercase());
        Self {
            entries,
            lowered,
            unresolved: FxHashSet::default(),
            root_alias,
        }
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Entity bound to the root alias.
    pub fn root_entity(&self) -> &str {
        self.entries
            .get(&self.root_alias)
            .expect("root alias is always bound")
    }

    /// Bind an alias. The caller is responsible for duplicate checks.
    pub fn bind(&mut self, alias: impl Into<String>, entity: impl Into<String>) {
        let alias = alias.into();
        self.lowered.insert(alias.to_lowercase());
        self.entries.insert(alias, entity.into());
    }

    /// Rebind an existing alias to a different entity (type-filter narrowing).
    pub fn rebind(&mut self, alias: &str, entity: impl Into<String>) {
        if let Some(slot) = self.entries.get_mut(alias) {
            *slot = entity.into();
        }
    }

    /// Exact (case-sensitive) lookup.
    pub fn entity_of(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    /// Exact (case-sensitive) membership.
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Case-insensitive duplicate detection; aliases differing only in case
    /// almost always indicate a typo.
    pub fn is_duplicate(&self, alias: &str) -> bool {
        self.lowered.contains(&alias.to_lowercase())
    }

    pub fn mark_unresolved(&mut self, alias: impl Into<String>) {
        self.unresolved.insert(alias.into());
    }

    pub fn is_unresolved(&self, alias: &str) -> bool {
        self.unresolved.contains(alias)
    }

    /// Aliases in declaration order, for error messages.
    pub fn available(&self) -> String {
        self.entries
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Iterate bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, e)| (a.as_str(), e.as_str()))
    }
}
