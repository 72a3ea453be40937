//! The todo entity and its shallow patch type.

use dataflow::{Entity, EntityId};
use serde::{Deserialize, Serialize};

/// A single todo item as served by the backing REST API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub name: String,
    pub done: bool,
}

impl Todo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            done: false,
        }
    }
}

/// Shallow partial update for a [`Todo`]. `None` fields keep the old
/// value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    pub name: Option<String>,
    pub done: Option<bool>,
}

impl TodoPatch {
    /// Patch replacing every field with `todo`'s current values.
    pub fn replace(todo: &Todo) -> Self {
        Self {
            name: Some(todo.name.clone()),
            done: Some(todo.done),
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            done: None,
        }
    }

    pub fn set_done(done: bool) -> Self {
        Self {
            name: None,
            done: Some(done),
        }
    }
}

impl Entity for Todo {
    type Patch = TodoPatch;

    fn id(&self) -> EntityId {
        self.id.clone()
    }

    fn apply(&self, patch: TodoPatch) -> Self {
        Self {
            id: self.id.clone(),
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            done: patch.done.unwrap_or(self.done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_applies_only_set_fields() {
        let todo = Todo::new("1", "walk the dog");

        let renamed = todo.apply(TodoPatch::rename("feed the dog"));
        assert_eq!(renamed.name, "feed the dog");
        assert!(!renamed.done);

        let finished = renamed.apply(TodoPatch::set_done(true));
        assert_eq!(finished.name, "feed the dog");
        assert!(finished.done);
        assert_eq!(finished.id, "1");
    }

    #[test]
    fn replace_patch_carries_every_field() {
        let source = Todo {
            id: "2".into(),
            name: "water plants".into(),
            done: true,
        };
        let target = Todo::new("2", "old name");

        let replaced = target.apply(TodoPatch::replace(&source));
        assert_eq!(replaced, source);
    }

    #[test]
    fn deserializes_the_api_list_payload() {
        let payload = r#"[{"id":"1","name":"A","done":false},{"id":"2","name":"B","done":true}]"#;

        let todos: Vec<Todo> = serde_json::from_str(payload).unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0], Todo::new("1", "A"));
        assert!(todos[1].done);
    }
}
