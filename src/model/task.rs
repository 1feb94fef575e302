use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Stable key used in cache keys and JSON output
    pub fn key(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Column heading for text output
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" | "todo" => Ok(TaskStatus::Pending),
            "in_progress" | "in-progress" | "inprogress" | "active" => {
                Ok(TaskStatus::InProgress)
            }
            "completed" | "done" => Ok(TaskStatus::Completed),
            other => Err(format!(
                "unknown status '{}' (expected pending, in_progress, completed)",
                other
            )),
        }
    }
}

/// Task priority, ordered low to urgent
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn key(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!(
                "unknown priority '{}' (expected low, medium, high, urgent)",
                other
            )),
        }
    }
}

/// A typed extension attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TaskExtension {
    /// Recorded audio clip stored alongside the task
    Audio {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
    /// Speech-to-text output for a voice-created task
    Transcription {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// Tags suggested by an integration, not yet promoted to `TaskRecord::tags`
    Tags(Vec<String>),
    /// Free-form note
    Note(String),
}

impl TaskExtension {
    /// Returns the key name for this extension variant
    pub fn key(&self) -> &'static str {
        match self {
            TaskExtension::Audio { .. } => "audio",
            TaskExtension::Transcription { .. } => "transcription",
            TaskExtension::Tags(_) => "tags",
            TaskExtension::Note(_) => "note",
        }
    }
}

/// A task as supplied by the data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    /// Tags in insertion order, no duplicates
    #[serde(default)]
    pub tags: IndexSet<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<TaskExtension>,
}

impl TaskRecord {
    /// Create a pending, medium-priority task with no optional fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        TaskRecord {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::default(),
            project_id: None,
            due: None,
            tags: IndexSet::new(),
            pinned: false,
            extensions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn with_extension(mut self, extension: TaskExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Add a tag, returning false if it was already present
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// First note extension, if any
    pub fn note(&self) -> Option<&str> {
        self.extensions.iter().find_map(|ext| match ext {
            TaskExtension::Note(text) => Some(text.as_str()),
            _ => None,
        })
    }
}
