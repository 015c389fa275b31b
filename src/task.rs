//! Task data structure and related functionality.
//!
//! This module defines the `Task` record that represents a single learning goal,
//! along with the seed set used when no stored collection is available.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single learning goal.
///
/// Field names are serialized in camelCase so the stored slot keeps the
/// `{id, text, completed, createdAt, completedAt}` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create an incomplete task stamped with `now`.
    pub fn new(id: u64, text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Task {
            id,
            text: text.into(),
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    /// Flip the completion flag, stamping or clearing `completed_at`.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }

    /// Single-character marker used by the list views.
    pub fn status_icon(&self) -> &'static str {
        if self.completed {
            "✔"
        } else {
            "○"
        }
    }
}

/// Texts and completion flags of the fallback collection.
const SEED: [(&str, bool); 3] = [
    ("Learn JavaScript ES6+", true),
    ("Master React fundamentals", false),
    ("Build a personal portfolio", false),
];

/// Build the three example tasks used when nothing valid is stored.
pub fn seed_tasks(now: DateTime<Utc>) -> Vec<Task> {
    SEED.iter()
        .enumerate()
        .map(|(i, &(text, completed))| Task {
            id: i as u64 + 1,
            text: text.to_string(),
            completed,
            created_at: now,
            completed_at: completed.then_some(now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_one_completed_and_two_active() {
        let now = Utc::now();
        let seed = seed_tasks(now);
        assert_eq!(seed.len(), 3);
        assert_eq!(seed.iter().filter(|t| t.completed).count(), 1);
        assert_eq!(seed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(seed.iter().all(|t| t.created_at == now));
    }

    #[test]
    fn toggle_stamps_and_clears_completed_at() {
        let now = Utc::now();
        let mut task = Task::new(7, "Read the book", now);
        task.toggle(now);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));
        task.toggle(now);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let now = Utc::now();
        let task = Task::new(1, "x", now);
        let value = serde_json::to_value(&task).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("completedAt"));
        assert!(obj["completedAt"].is_null());
    }

    #[test]
    fn deserializes_ignoring_unknown_fields_and_missing_completed_at() {
        let json = r#"{"id":1700000000000,"text":"Learn Rust","completed":false,
                       "createdAt":"2024-01-02T03:04:05.000Z","priority":"high"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 1_700_000_000_000);
        assert_eq!(task.text, "Learn Rust");
        assert_eq!(task.completed_at, None);
    }
}
