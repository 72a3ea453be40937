//! The fetch-interface boundary consumed by feature stores.

use crate::context::{Entity, EntityId};
use crate::error::FetchError;
use std::future::Future;

/// Asynchronous data source for one entity type.
///
/// The core consumes this interface and never implements it against a real
/// transport. Callers choose the operation shape explicitly (`list` returns
/// many, `get` returns one), so downstream code never branches on response
/// shape.
///
/// Every operation is non-blocking; no timeout policy exists at this
/// layer.
pub trait EntityFetch<T: Entity>: Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<T>, FetchError>> + Send;

    fn get(&self, id: &EntityId) -> impl Future<Output = Result<T, FetchError>> + Send;

    fn create(&self, entity: T) -> impl Future<Output = Result<T, FetchError>> + Send;

    fn update(
        &self,
        id: &EntityId,
        patch: T::Patch,
    ) -> impl Future<Output = Result<T, FetchError>> + Send;

    fn delete(&self, id: &EntityId) -> impl Future<Output = Result<(), FetchError>> + Send;
}
