//! Core dataflow primitives for reactive entity state management
//!
//! This crate provides the foundational building blocks for tracking
//! per-entity and per-collection loading/error/completion status while
//! caching fetched entities in a keyed map, independent of any concrete
//! backend or UI layer.
//!
//! # Core Components
//!
//! - **[`Relay`]** - Type-safe event streaming using simple channels
//! - **[`Actor`]** - Single-value reactive state container
//! - **[`Context`]** - A value bundled with loading/error/completion status
//! - **[`EntityContext`]** - Keyed entity map with two-level status tracking
//! - **[`LoadingMark`]** - Temporal bracketing of result streams
//! - **[`TrackedAction`]** - Named intents with derived state signals
//! - **[`ErrorSink`]** - Fire-and-forget reporting of unhandled errors
//!
//! # Architecture Principles
//!
//! 1. **Single Point of Mutation** - collection state changes only inside
//!    an Actor processor, through the pure merge operations
//! 2. **No Direct Access** - consumers read state through signals only
//! 3. **Absorbed Failures** - fetch and transform failures land in error
//!    fields and signals; they never disable the owning container

pub mod actor;
pub mod collection;
pub mod context;
pub mod error;
pub mod fetch;
pub mod loading;
pub mod relay;
pub mod sink;
pub mod task;
pub mod tracked;

pub use actor::Actor;
pub use collection::{CollectionPatch, EntityContext, EntityMap, entity_map_from};
pub use context::{Context, ContextPatch, Entity, EntityId};
pub use error::{FetchError, StateError};
pub use fetch::EntityFetch;
pub use loading::{LoadingMark, with_loading_emission};
pub use relay::{Relay, RelayError, relay};
pub use sink::{ErrorSink, ReportedError};
pub use task::{TaskHandle, spawn_droppable};
pub use tracked::{ActionState, DispatchPolicy, TrackedAction};
