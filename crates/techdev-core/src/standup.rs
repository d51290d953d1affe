use crate::error::{Result, TechDevError};
use crate::paths::STANDUPS_KEY;
use crate::store::{self, DocumentStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One daily standup submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub student_id: String,
    pub tasks_done: String,
    #[serde(default)]
    pub what_learned: String,
    pub submitted_by: String,
}

pub struct StandupLog {
    store: Arc<dyn DocumentStore>,
}

impl StandupLog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn submit(
        &self,
        submitted_by: &str,
        student_id: &str,
        tasks_done: &str,
        what_learned: &str,
    ) -> Result<StandupEntry> {
        let student_id = student_id.trim();
        let tasks_done = tasks_done.trim();
        if student_id.is_empty() {
            return Err(TechDevError::MissingField("student_id"));
        }
        if tasks_done.is_empty() {
            return Err(TechDevError::MissingField("tasks_done"));
        }
        let entry = StandupEntry {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            student_id: student_id.to_string(),
            tasks_done: tasks_done.to_string(),
            what_learned: what_learned.trim().to_string(),
            submitted_by: submitted_by.to_string(),
        };
        self.store.update(STANDUPS_KEY, &mut |doc| {
            store::encode_entry(doc, &entry.id, &entry)
        })?;
        tracing::info!(submitted_by, student_id = %entry.student_id, "standup submitted");
        Ok(entry)
    }

    /// Every entry, newest first.
    pub fn list(&self) -> Vec<StandupEntry> {
        let mut entries: Vec<StandupEntry> = store::read_entries(self.store.as_ref(), STANDUPS_KEY)
            .into_iter()
            .map(|(_, e)| e)
            .collect();
        entries.sort_by(|a: &StandupEntry, b: &StandupEntry| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        entries
    }
}
