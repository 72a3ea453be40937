//! TodoStore: the todo feature's state container.
//!
//! Wires tracked actions to an entity context collection held by a single
//! Actor. Every collection mutation funnels through one op relay into the
//! Actor's processor, which applies the pure merge operations
//! sequentially. Fetch results are bracketed with loading emissions before
//! they are merged, so consumers always observe the start marker before
//! any data and the end marker last.

use crate::todo::{Todo, TodoPatch};
use dataflow::{
    Actor, Context, DispatchPolicy, EntityContext, EntityFetch, EntityId, ErrorSink, LoadingMark,
    Relay, StateError, TaskHandle, TrackedAction, entity_map_from, relay, with_loading_emission,
};
use futures::{StreamExt, stream};
use futures_signals::signal::Signal;
use std::pin::pin;
use std::sync::Arc;

/// Collection operation applied by the store's processor.
#[derive(Clone, Debug)]
enum TodoOp {
    CollectionLoading,
    CollectionError(StateError),
    CollectionSettled,
    ListLoaded(Vec<Todo>),
    EntityLoaded(Todo),
    EntityLoading(EntityId),
    EntityError(EntityId, StateError),
    EntitySettled(EntityId),
    EntityUpdated(EntityId, TodoPatch),
    EntityRemoved(EntityId),
}

/// Named intents accepted by [`TodoStore::dispatch_all`].
#[derive(Clone, Debug)]
pub enum TodoIntent {
    FetchAll,
    FetchOne(EntityId),
    Create(Todo),
    Update(EntityId, TodoPatch),
    Remove(EntityId),
}

/// State container for the todo collection.
///
/// Explicitly constructed; dropping the store aborts its processor and
/// action handler tasks, after which dispatches are silent no-ops.
///
/// Concurrency: `fetch_all` uses exhaust semantics (an overlapping
/// dispatch is dropped while one is in flight); the single-entity actions
/// forward every dispatch and the last write observed wins. Concurrent
/// updates to the same entity are not detected as lost updates; this is an
/// accepted limitation.
pub struct TodoStore {
    todos: Actor<EntityContext<Todo>>,
    pub fetch_all: TrackedAction<()>,
    pub fetch_one: TrackedAction<EntityId>,
    pub create: TrackedAction<Todo>,
    pub update: TrackedAction<(EntityId, TodoPatch)>,
    pub remove: TrackedAction<EntityId>,
    _handles: Vec<TaskHandle>,
}

impl TodoStore {
    pub fn new<A>(api: Arc<A>, sink: ErrorSink) -> Self
    where
        A: EntityFetch<Todo>,
    {
        let (ops, mut op_stream) = relay::<TodoOp>();

        let todos = Actor::new(EntityContext::empty(), async move |state| {
            while let Some(op) = op_stream.next().await {
                tracing::debug!(?op, "applying collection op");
                let current = state.lock_ref().clone();
                state.set(applied(&current, op));
            }
        });

        let fetch_all = TrackedAction::new("fetch_all", DispatchPolicy::Exhaust, sink.clone());
        let fetch_one = TrackedAction::new("fetch_one", DispatchPolicy::Latest, sink.clone());
        let create = TrackedAction::new("create", DispatchPolicy::Latest, sink.clone())
            .with_transform(|todo: Todo| {
                let name = todo.name.trim().to_owned();
                if name.is_empty() {
                    Err(StateError::Transform("todo name must not be blank".into()))
                } else {
                    Ok(Todo { name, ..todo })
                }
            });
        let update = TrackedAction::new("update", DispatchPolicy::Latest, sink.clone());
        let remove = TrackedAction::new("remove", DispatchPolicy::Latest, sink);

        let mut handles = Vec::new();

        {
            let api = api.clone();
            let ops = ops.clone();
            handles.push(fetch_all.on(move |()| {
                let api = api.clone();
                let ops = ops.clone();
                async move {
                    let mut outcome = Ok(());
                    let mut marks = pin!(with_loading_emission(stream::once(api.list())));
                    while let Some(mark) = marks.next().await {
                        let op = match mark {
                            LoadingMark::Begin => TodoOp::CollectionLoading,
                            LoadingMark::Item(Ok(list)) => TodoOp::ListLoaded(list),
                            LoadingMark::Item(Err(err)) => {
                                let err = StateError::from(err);
                                outcome = Err(err.clone());
                                TodoOp::CollectionError(err)
                            }
                            LoadingMark::End => TodoOp::CollectionSettled,
                        };
                        apply(&ops, op);
                    }
                    outcome
                }
            }));
        }

        {
            let api = api.clone();
            let ops = ops.clone();
            handles.push(fetch_one.on(move |id: EntityId| {
                let api = api.clone();
                let ops = ops.clone();
                async move {
                    let mut outcome = Ok(());
                    let mut marks = pin!(with_loading_emission(stream::once(api.get(&id))));
                    while let Some(mark) = marks.next().await {
                        let op = match mark {
                            LoadingMark::Begin => TodoOp::EntityLoading(id.clone()),
                            LoadingMark::Item(Ok(todo)) => TodoOp::EntityLoaded(todo),
                            LoadingMark::Item(Err(err)) => {
                                let err = StateError::from(err);
                                outcome = Err(err.clone());
                                TodoOp::EntityError(id.clone(), err)
                            }
                            LoadingMark::End => TodoOp::EntitySettled(id.clone()),
                        };
                        apply(&ops, op);
                    }
                    outcome
                }
            }));
        }

        {
            let api = api.clone();
            let ops = ops.clone();
            handles.push(create.on(move |todo: Todo| {
                let api = api.clone();
                let ops = ops.clone();
                async move {
                    let mut outcome = Ok(());
                    let mut marks = pin!(with_loading_emission(stream::once(api.create(todo))));
                    while let Some(mark) = marks.next().await {
                        let op = match mark {
                            LoadingMark::Begin => TodoOp::CollectionLoading,
                            LoadingMark::Item(Ok(created)) => TodoOp::EntityLoaded(created),
                            LoadingMark::Item(Err(err)) => {
                                let err = StateError::from(err);
                                outcome = Err(err.clone());
                                TodoOp::CollectionError(err)
                            }
                            LoadingMark::End => TodoOp::CollectionSettled,
                        };
                        apply(&ops, op);
                    }
                    outcome
                }
            }));
        }

        {
            let api = api.clone();
            let ops = ops.clone();
            handles.push(update.on(move |(id, patch): (EntityId, TodoPatch)| {
                let api = api.clone();
                let ops = ops.clone();
                async move {
                    let mut outcome = Ok(());
                    let mut marks =
                        pin!(with_loading_emission(stream::once(api.update(&id, patch))));
                    while let Some(mark) = marks.next().await {
                        let op = match mark {
                            LoadingMark::Begin => TodoOp::EntityLoading(id.clone()),
                            LoadingMark::Item(Ok(updated)) => {
                                TodoOp::EntityUpdated(id.clone(), TodoPatch::replace(&updated))
                            }
                            LoadingMark::Item(Err(err)) => {
                                let err = StateError::from(err);
                                outcome = Err(err.clone());
                                TodoOp::EntityError(id.clone(), err)
                            }
                            LoadingMark::End => TodoOp::EntitySettled(id.clone()),
                        };
                        apply(&ops, op);
                    }
                    outcome
                }
            }));
        }

        {
            let ops = ops.clone();
            handles.push(remove.on(move |id: EntityId| {
                let api = api.clone();
                let ops = ops.clone();
                async move {
                    let mut outcome = Ok(());
                    let mut marks = pin!(with_loading_emission(stream::once(api.delete(&id))));
                    while let Some(mark) = marks.next().await {
                        let op = match mark {
                            LoadingMark::Begin => TodoOp::EntityLoading(id.clone()),
                            LoadingMark::Item(Ok(())) => TodoOp::EntityRemoved(id.clone()),
                            LoadingMark::Item(Err(err)) => {
                                let err = StateError::from(err);
                                outcome = Err(err.clone());
                                TodoOp::EntityError(id.clone(), err)
                            }
                            LoadingMark::End => TodoOp::EntitySettled(id.clone()),
                        };
                        apply(&ops, op);
                    }
                    outcome
                }
            }));
        }

        Self {
            todos,
            fetch_all,
            fetch_one,
            create,
            update,
            remove,
            _handles: handles,
        }
    }

    /// Read-only reactive snapshot of the whole collection.
    pub fn todos_signal(&self) -> impl Signal<Item = EntityContext<Todo>> + use<> {
        self.todos.signal()
    }

    /// Read-only reactive view of one entry.
    pub fn todo_signal(&self, id: &str) -> impl Signal<Item = Option<Context<Todo>>> + use<> {
        let id = id.to_owned();
        self.todos
            .signal_ref(move |collection| collection.value.get(&id).cloned())
    }

    /// Dispatch several intents in one call. Each intent follows its own
    /// action's state machine; there is no atomicity across actions.
    pub fn dispatch_all(&self, intents: impl IntoIterator<Item = TodoIntent>) {
        for intent in intents {
            match intent {
                TodoIntent::FetchAll => self.fetch_all.dispatch(()),
                TodoIntent::FetchOne(id) => self.fetch_one.dispatch(id),
                TodoIntent::Create(todo) => self.create.dispatch(todo),
                TodoIntent::Update(id, patch) => self.update.dispatch((id, patch)),
                TodoIntent::Remove(id) => self.remove.dispatch(id),
            }
        }
    }
}

/// The single emission site for collection ops; keeps the op relay's
/// single-source check satisfied across all handlers.
fn apply(ops: &Relay<TodoOp>, op: TodoOp) {
    ops.send(op);
}

fn applied(current: &EntityContext<Todo>, op: TodoOp) -> EntityContext<Todo> {
    match op {
        TodoOp::CollectionLoading => current.with_collection_loading(),
        TodoOp::CollectionError(err) => current.with_collection_error(err),
        TodoOp::CollectionSettled => current.with_collection_settled(),
        TodoOp::ListLoaded(list) => current
            .with_entities_merged(entity_map_from(list))
            .with_collection_complete(),
        TodoOp::EntityLoaded(todo) => current.with_entities_merged(entity_map_from(vec![todo])),
        TodoOp::EntityLoading(id) => current.with_entity_loading(&id),
        TodoOp::EntityError(id, err) => current.with_entity_error(&id, err),
        TodoOp::EntitySettled(id) => current.with_entity_settled(&id),
        TodoOp::EntityUpdated(id, patch) => current
            .with_entity_updated(&id, patch)
            .with_entity_settled(&id),
        TodoOp::EntityRemoved(id) => current.without_entity(&id),
    }
}
