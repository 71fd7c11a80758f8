use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::thread::{InsightRef, Thread};

/// User bookmark for a thread or an insight
///
/// Thread pins also carry the thread's insight, so the target is
/// decided by whether `thread` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    pub name: Option<String>,
    pub thread: Option<Thread>,
    pub insight: Option<InsightRef>,
    pub inserted_at: Option<DateTime<Utc>>,
}

impl Pin {
    pub fn target(&self) -> Option<PinTarget> {
        match (&self.thread, &self.insight) {
            (Some(thread), _) => Some(PinTarget::Thread(thread.id.clone())),
            (None, Some(insight)) => Some(PinTarget::Insight(insight.id.clone())),
            (None, None) => None,
        }
    }

    pub fn matches(&self, target: &PinTarget) -> bool {
        self.target().as_ref() == Some(target)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match (&self.thread, &self.insight) {
            (Some(thread), _) => thread.timestamp(),
            (None, Some(insight)) => insight.timestamp(),
            (None, None) => self.inserted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PinTarget {
    Thread(String),
    Insight(String),
}

impl PinTarget {
    pub fn id(&self) -> &str {
        match self {
            PinTarget::Thread(id) | PinTarget::Insight(id) => id,
        }
    }
}

impl std::fmt::Display for PinTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinTarget::Thread(id) => write!(f, "thread:{id}"),
            PinTarget::Insight(id) => write!(f, "insight:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PinAttributes {
    pub thread_id: Option<String>,
    pub insight_id: Option<String>,
    pub name: Option<String>,
}

impl PinAttributes {
    /// Pin for a thread, named after its summary
    pub fn for_thread(thread: &Thread, max_name_len: usize) -> Self {
        Self {
            thread_id: Some(thread.id.clone()),
            insight_id: thread.insight.as_ref().map(|insight| insight.id.clone()),
            name: Some(thread.summary.chars().take(max_name_len).collect()),
        }
    }

    pub fn for_insight(insight: &InsightRef, max_name_len: usize) -> Self {
        Self {
            thread_id: None,
            insight_id: Some(insight.id.clone()),
            name: insight
                .name
                .as_ref()
                .map(|name| name.chars().take(max_name_len).collect()),
        }
    }

    /// Bare attributes when only the target id is known
    pub fn for_target(target: &PinTarget) -> Self {
        match target {
            PinTarget::Thread(id) => Self {
                thread_id: Some(id.clone()),
                ..Default::default()
            },
            PinTarget::Insight(id) => Self {
                insight_id: Some(id.clone()),
                ..Default::default()
            },
        }
    }

    pub fn target(&self) -> Option<PinTarget> {
        match (&self.thread_id, &self.insight_id) {
            (Some(id), _) => Some(PinTarget::Thread(id.clone())),
            (None, Some(id)) => Some(PinTarget::Insight(id.clone())),
            (None, None) => None,
        }
    }
}
