//! Keyed entity collections with two-level status tracking.
//!
//! An [`EntityContext`] wraps a map from entity id to per-entity
//! [`Context`] inside an outer [`Context`] describing collection-wide
//! operations (for example "fetch all"). The two levels are updated
//! independently and a merge never conflates them.
//!
//! Every operation here is pure: it returns a new collection and leaves
//! the input untouched. Entries absent from an update are preserved
//! unchanged, which is the central correctness property of the merge.

use crate::context::{Context, ContextPatch, Entity, EntityId};
use crate::error::StateError;
use std::collections::BTreeMap;

/// Keyed map of per-entity contexts.
pub type EntityMap<T> = BTreeMap<EntityId, Context<T>>;

/// An entity map wrapped in a collection-level context.
pub type EntityContext<T> = Context<EntityMap<T>>;

/// Build a fresh entity map from a list of fetched entities.
///
/// Each item becomes a new entry keyed by [`Entity::id`], not loading and
/// without error. Duplicate ids keep the last occurrence.
pub fn entity_map_from<T: Entity>(entities: Vec<T>) -> EntityMap<T> {
    entities
        .into_iter()
        .map(|entity| (entity.id(), Context::new(entity)))
        .collect()
}

/// Partial update for an [`EntityContext`]: outer status fields plus
/// per-entry context patches.
#[derive(Clone, Debug)]
pub struct CollectionPatch<T: Entity> {
    pub loading: Option<bool>,
    pub error: Option<Option<StateError>>,
    pub complete: Option<Option<bool>>,
    pub entries: BTreeMap<EntityId, ContextPatch<T::Patch>>,
}

impl<T: Entity> CollectionPatch<T> {
    pub fn empty() -> Self {
        Self {
            loading: None,
            error: None,
            complete: None,
            entries: BTreeMap::new(),
        }
    }

    /// Add a patch for one entry.
    pub fn entry(mut self, id: impl Into<EntityId>, patch: ContextPatch<T::Patch>) -> Self {
        self.entries.insert(id.into(), patch);
        self
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    pub fn with_error(mut self, error: Option<StateError>) -> Self {
        self.error = Some(error);
        self
    }
}

impl<T: Entity> Default for CollectionPatch<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Entity> Context<EntityMap<T>> {
    /// An empty collection: no entries, not loading.
    pub fn empty() -> Self {
        Context::new(EntityMap::new())
    }

    /// Enter collection-level loading; clears the collection error.
    pub fn with_collection_loading(&self) -> Self {
        let mut next = self.clone();
        next.loading = true;
        next.error = None;
        next
    }

    /// Record a collection-level error and leave loading.
    pub fn with_collection_error(&self, err: StateError) -> Self {
        let mut next = self.clone();
        next.loading = false;
        next.error = Some(err);
        next
    }

    /// Leave collection-level loading without touching the error.
    pub fn with_collection_settled(&self) -> Self {
        let mut next = self.clone();
        next.loading = false;
        next
    }

    /// Mark a collection-wide operation as having completed successfully.
    pub fn with_collection_complete(&self) -> Self {
        let mut next = self.clone();
        next.complete = Some(true);
        next
    }

    /// Enter entity-level loading; creates the entry around `T::default()`
    /// if absent and clears the entry's error.
    pub fn with_entity_loading(&self, id: &str) -> Self {
        let mut next = self.clone();
        let entry = next.value.entry(id.to_owned()).or_default();
        entry.loading = true;
        entry.error = None;
        next
    }

    /// Record an entity-level error and leave that entry's loading state.
    /// Creates the entry if absent.
    pub fn with_entity_error(&self, id: &str, err: StateError) -> Self {
        let mut next = self.clone();
        let entry = next.value.entry(id.to_owned()).or_default();
        entry.loading = false;
        entry.error = Some(err);
        next
    }

    /// Leave entity-level loading. A no-op when the entry is absent, so a
    /// settle arriving after removal does not resurrect the entry.
    pub fn with_entity_settled(&self, id: &str) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.value.get_mut(id) {
            entry.loading = false;
        }
        next
    }

    /// Shallow-merge a value patch into one entry, preserving its status
    /// fields. Creates the entry if absent.
    pub fn with_entity_updated(&self, id: &str, patch: T::Patch) -> Self {
        let mut next = self.clone();
        let entry = next.value.entry(id.to_owned()).or_default();
        entry.value = entry.value.apply(patch);
        next
    }

    /// Remove one entry. Removing an absent key is a no-op, not an error.
    pub fn without_entity(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.value.remove(id);
        next
    }

    /// Union fresh entries into the collection. Entries already present
    /// under the same key are replaced wholesale; all other entries are
    /// kept.
    pub fn with_entities_merged(&self, entries: EntityMap<T>) -> Self {
        let mut next = self.clone();
        next.value.extend(entries);
        next
    }

    /// Apply a [`CollectionPatch`]: the outer fields merge field-wise and
    /// every entry patch merges recursively into its entry (created from
    /// `T::default()` when absent). Entries the patch does not name are
    /// left untouched.
    pub fn merged_with(&self, patch: CollectionPatch<T>) -> Self {
        let mut next = self.clone();
        if let Some(loading) = patch.loading {
            next.loading = loading;
        }
        if let Some(error) = patch.error {
            next.error = error;
        }
        if let Some(complete) = patch.complete {
            next.complete = complete;
        }
        for (id, entry_patch) in patch.entries {
            let entry = next.value.entry(id).or_default();
            *entry = entry.merged(entry_patch);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Note {
        id: String,
        text: String,
        pinned: bool,
    }

    #[derive(Clone, Debug, Default)]
    struct NotePatch {
        text: Option<String>,
        pinned: Option<bool>,
    }

    impl Entity for Note {
        type Patch = NotePatch;

        fn id(&self) -> EntityId {
            self.id.clone()
        }

        fn apply(&self, patch: NotePatch) -> Self {
            Self {
                id: self.id.clone(),
                text: patch.text.unwrap_or_else(|| self.text.clone()),
                pinned: patch.pinned.unwrap_or(self.pinned),
            }
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            text: text.into(),
            pinned: false,
        }
    }

    fn seeded() -> EntityContext<Note> {
        EntityContext::empty()
            .with_entities_merged(entity_map_from(vec![note("1", "alpha"), note("2", "beta")]))
    }

    #[test]
    fn merge_preserves_untouched_entries() {
        let old = seeded();
        let patch = CollectionPatch::empty().entry(
            "1",
            ContextPatch::value(NotePatch {
                text: Some("gamma".into()),
                pinned: None,
            }),
        );

        let merged = old.merged_with(patch);

        assert_eq!(merged.value["1"].value.text, "gamma");
        assert_eq!(merged.value["2"], old.value["2"]);
        assert_eq!(merged.loading, old.loading);
    }

    #[test]
    fn merge_updates_outer_and_inner_levels_independently() {
        let old = seeded();
        let patch = CollectionPatch::empty()
            .with_loading(true)
            .with_error(None)
            .entry("2", ContextPatch::loading());

        let merged = old.merged_with(patch);

        assert!(merged.loading);
        assert!(merged.value["2"].loading);
        assert!(!merged.value["1"].loading);
    }

    #[test]
    fn removal_is_idempotent() {
        let once = seeded().without_entity("1");
        let twice = once.without_entity("1");

        assert_eq!(once, twice);
        assert!(once.value.contains_key("2"));
        assert!(!once.value.contains_key("1"));
    }

    #[test]
    fn empty_value_patch_keeps_the_entity_value() {
        let old = seeded();
        let updated = old.with_entity_updated("1", NotePatch::default());

        assert_eq!(updated.value["1"].value, old.value["1"].value);
    }

    #[test]
    fn entity_map_is_keyed_by_entity_id() {
        let map = entity_map_from(vec![note("7", "seven"), note("8", "eight")]);

        assert_eq!(map.len(), 2);
        assert_eq!(map["7"].value.text, "seven");
        assert!(!map["8"].loading);
        assert_eq!(map["8"].error, None);
    }

    #[test]
    fn entity_loading_creates_the_entry_and_clears_its_error() {
        let with_error = seeded().with_entity_error("1", FetchError::new("boom").into());
        assert!(with_error.value["1"].error.is_some());

        let reloading = with_error.with_entity_loading("1");
        assert!(reloading.value["1"].loading);
        assert_eq!(reloading.value["1"].error, None);

        let fresh = seeded().with_entity_loading("9");
        assert!(fresh.value["9"].loading);
        assert_eq!(fresh.value["9"].value, Note::default());
    }

    #[test]
    fn settling_an_absent_entry_is_a_no_op() {
        let old = seeded().without_entity("1");
        let settled = old.with_entity_settled("1");

        assert_eq!(settled, old);
    }

    #[test]
    fn collection_flags_do_not_touch_entries() {
        let old = seeded();

        let loading = old.with_collection_loading();
        assert!(loading.loading);
        assert_eq!(loading.value, old.value);

        let errored = loading.with_collection_error(FetchError::new("down").into());
        assert!(!errored.loading);
        assert_eq!(errored.value, old.value);

        let settled = errored.with_collection_settled();
        assert_eq!(settled.error, errored.error);
    }
}
