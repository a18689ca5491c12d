//! Todo entity and the request payloads that create or modify it.
//!
//! # Design
//! Request bodies are deserialized into all-optional structs and then
//! validated into `NewTodo` / `TodoPatch`. Keeping the wire shape loose lets
//! the handler answer "title missing" with a 400 instead of letting serde
//! reject the body. JSON `null` is treated the same as an absent field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest title the relational table accepts (`VARCHAR(255)`). Enforced for
/// every backend so both variants share one contract.
pub const MAX_TITLE_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated input for `TodoStore::create`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub completed: bool,
}

/// Fields supplied by a partial update. `None` means "not provided", so a
/// patch carrying the current value is still distinguishable from an empty one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Merge the supplied fields into `todo`. Returns `false` when the patch
    /// was empty and `todo` was left untouched.
    pub fn apply(self, todo: &mut Todo) -> bool {
        if self.is_empty() {
            return false;
        }
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title must be at most 255 characters")]
    TitleTooLong,

    #[error("Invalid request body: {0}")]
    Body(String),
}

/// Body of `POST /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl CreateTodoRequest {
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let title = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => return Err(ValidationError::MissingTitle),
        };
        check_length(&title)?;
        Ok(NewTodo {
            title,
            completed: self.completed.unwrap_or(false),
        })
    }
}

/// Body of `PUT /todos/:id`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    pub fn validate(self) -> Result<TodoPatch, ValidationError> {
        if let Some(title) = &self.title {
            if title.is_empty() {
                return Err(ValidationError::EmptyTitle);
            }
            check_length(title)?;
        }
        Ok(TodoPatch {
            title: self.title,
            completed: self.completed,
        })
    }
}

fn check_length(title: &str) -> Result<(), ValidationError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo() -> Todo {
        Todo {
            id: 1,
            title: "buy milk".to_string(),
            completed: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn in_memory_todo_omits_timestamps() {
        let json = serde_json::to_value(todo()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "buy milk");
        assert_eq!(json["completed"], false);
        assert!(json.get("created_at").is_none());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn persisted_todo_carries_timestamps() {
        let now = Utc::now();
        let todo = Todo {
            created_at: Some(now),
            updated_at: Some(now),
            ..todo()
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json["created_at"].is_string());
        assert!(json["updated_at"].is_string());
    }

    #[test]
    fn create_defaults_completed_to_false() {
        let input: CreateTodoRequest = serde_json::from_str(r#"{"title":"walk dog"}"#).unwrap();
        let new = input.validate().unwrap();
        assert_eq!(new.title, "walk dog");
        assert!(!new.completed);
    }

    #[test]
    fn create_without_title_is_rejected() {
        let input: CreateTodoRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(input.validate(), Err(ValidationError::MissingTitle));
    }

    #[test]
    fn create_with_empty_or_null_title_is_rejected() {
        for body in [r#"{"title":""}"#, r#"{"title":null}"#] {
            let input: CreateTodoRequest = serde_json::from_str(body).unwrap();
            assert_eq!(input.validate(), Err(ValidationError::MissingTitle), "{body}");
        }
    }

    #[test]
    fn overlong_title_is_rejected() {
        let input = CreateTodoRequest {
            title: Some("x".repeat(MAX_TITLE_LEN + 1)),
            completed: None,
        };
        assert_eq!(input.validate(), Err(ValidationError::TitleTooLong));
    }

    #[test]
    fn update_with_no_fields_is_an_empty_patch() {
        let input: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(input.validate().unwrap().is_empty());
    }

    #[test]
    fn update_null_fields_count_as_absent() {
        let input: UpdateTodoRequest =
            serde_json::from_str(r#"{"title":null,"completed":null}"#).unwrap();
        assert!(input.validate().unwrap().is_empty());
    }

    #[test]
    fn update_rejects_empty_title() {
        let input: UpdateTodoRequest = serde_json::from_str(r#"{"title":""}"#).unwrap();
        assert_eq!(input.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn patch_with_completed_keeps_title() {
        let mut todo = todo();
        let patch = TodoPatch {
            title: None,
            completed: Some(true),
        };
        assert!(patch.apply(&mut todo));
        assert_eq!(todo.title, "buy milk");
        assert!(todo.completed);
    }

    #[test]
    fn patch_with_title_keeps_completed() {
        let mut todo = Todo {
            completed: true,
            ..todo()
        };
        let patch = TodoPatch {
            title: Some("buy oat milk".to_string()),
            completed: None,
        };
        assert!(patch.apply(&mut todo));
        assert_eq!(todo.title, "buy oat milk");
        assert!(todo.completed);
    }

    #[test]
    fn empty_patch_leaves_todo_untouched() {
        let mut todo = todo();
        assert!(!TodoPatch::default().apply(&mut todo));
        assert_eq!(todo, self::todo());
    }
}
