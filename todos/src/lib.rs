//! Todo feature built on the dataflow core.
//!
//! Provides the [`Todo`] entity and the [`TodoStore`] state container: an
//! explicitly constructed object wiring tracked actions to an entity
//! context collection, fed by any [`dataflow::EntityFetch`] implementation.

pub mod store;
pub mod todo;

pub use store::{TodoIntent, TodoStore};
pub use todo::{Todo, TodoPatch};
