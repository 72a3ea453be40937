//! Context values: a payload bundled with loading/error/completion status.
//!
//! A [`Context`] is the unit of status tracking at both levels of an entity
//! collection: the outer collection context and every per-entity entry.
//! Contexts are never mutated in place; the merge operations return new
//! values and preserve everything the update does not touch.

use crate::error::StateError;

/// Key type for entities in a collection. Uniqueness is required;
/// iteration order must not be relied upon.
pub type EntityId = String;

/// A uniquely identified domain record with shallow partial updates.
///
/// Replaces dynamic `idKey` lookups and untyped partial objects with
/// explicit typing: every entity names its own patch type and knows how to
/// apply it field-wise (`Some` fields override, `None` fields keep the old
/// value).
pub trait Entity: Clone + Default + Send + Sync + 'static {
    /// Shallow partial update for this entity.
    type Patch: Clone + std::fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> EntityId;

    /// Apply a patch, returning the updated entity. Must not change fields
    /// the patch leaves unset.
    fn apply(&self, patch: Self::Patch) -> Self;
}

/// A value bundled with loading/error/completion status.
///
/// Invariant: `loading` and a terminal `error` are mutually exclusive at
/// any instant. Producers re-entering `loading` clear the previous error,
/// which [`ContextPatch::loading`] does automatically.
#[derive(Clone, Debug, PartialEq)]
pub struct Context<T> {
    pub value: T,
    pub loading: bool,
    pub error: Option<StateError>,
    pub complete: Option<bool>,
}

impl<T> Context<T> {
    /// A fresh context around `value`: not loading, no error, not complete.
    pub fn new(value: T) -> Self {
        Self {
            value,
            loading: false,
            error: None,
            complete: None,
        }
    }
}

impl<T: Default> Default for Context<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Partial update for a [`Context`].
///
/// Fields left `None` keep the old value; a `value` patch is structurally
/// merged through [`Entity::apply`], never a wholesale replacement.
#[derive(Clone, Debug)]
pub struct ContextPatch<P> {
    pub value: Option<P>,
    pub loading: Option<bool>,
    pub error: Option<Option<StateError>>,
    pub complete: Option<Option<bool>>,
}

impl<P> ContextPatch<P> {
    pub fn empty() -> Self {
        Self {
            value: None,
            loading: None,
            error: None,
            complete: None,
        }
    }

    /// Patch only the value.
    pub fn value(patch: P) -> Self {
        Self {
            value: Some(patch),
            ..Self::empty()
        }
    }

    /// Enter the loading state. Clears any previous error.
    pub fn loading() -> Self {
        Self {
            loading: Some(true),
            error: Some(None),
            ..Self::empty()
        }
    }

    /// Record a terminal error and leave the loading state.
    pub fn error(err: StateError) -> Self {
        Self {
            loading: Some(false),
            error: Some(Some(err)),
            ..Self::empty()
        }
    }

    /// Leave the loading state without touching error or value.
    pub fn settled() -> Self {
        Self {
            loading: Some(false),
            ..Self::empty()
        }
    }

    pub fn with_value(mut self, patch: P) -> Self {
        self.value = Some(patch);
        self
    }

    pub fn with_complete(mut self, complete: bool) -> Self {
        self.complete = Some(Some(complete));
        self
    }
}

impl<P> Default for ContextPatch<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Entity> Context<T> {
    /// Field-wise merge: every field present in `patch` overrides, the
    /// value patch is applied structurally. Pure; `self` is untouched.
    pub fn merged(&self, patch: ContextPatch<T::Patch>) -> Self {
        Self {
            value: match patch.value {
                Some(value_patch) => self.value.apply(value_patch),
                None => self.value.clone(),
            },
            loading: patch.loading.unwrap_or(self.loading),
            error: patch.error.unwrap_or_else(|| self.error.clone()),
            complete: patch.complete.unwrap_or(self.complete),
        }
    }
}
