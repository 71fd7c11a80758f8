use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A persisted conversation between the user and the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub insight: Option<InsightRef>,
    pub flow: Option<FlowRef>,
    pub session: Option<AgentSession>,
    #[serde(default)]
    pub settings: ThreadSettings,
    pub last_message_at: Option<DateTime<Utc>>,
    pub inserted_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Thread {
    /// Agent kind of the thread's session, if it runs one
    pub fn agent_kind(&self) -> Option<AgentKind> {
        self.session.as_ref().and_then(|session| session.kind)
    }

    pub fn is_agent_session(&self) -> bool {
        self.agent_kind().is_some()
    }

    /// Display timestamp: last activity, falling back to creation
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_message_at.or(self.inserted_at)
    }

    /// Display-only staleness; never used for lifecycle decisions
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.timestamp().is_some_and(|ts| ts + window < now)
    }

    /// First `count` messages, the part of the history a fork copies
    pub fn prefix(&self, count: usize) -> &[Message] {
        &self.messages[..count.min(self.messages.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Kubernetes,
    Terraform,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Kubernetes => "kubernetes",
            AgentKind::Terraform => "terraform",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session descriptor; `kind == None` is a plain chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgentSession {
    pub id: Option<String>,
    pub kind: Option<AgentKind>,
    pub cluster_id: Option<String>,
}

impl AgentSession {
    pub fn agent(kind: AgentKind) -> Self {
        Self {
            id: None,
            kind: Some(kind),
            cluster_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThreadSettings {
    pub memory: bool,
}

/// Diagnostic finding about a monitored resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRef {
    pub id: String,
    pub name: Option<String>,
    /// Route of the resource the insight is attached to, e.g. `/cd/clusters/abc`
    pub path: Option<String>,
    pub inserted_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InsightRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            path: None,
            inserted_at: None,
            updated_at: None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.inserted_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    pub id: String,
    pub name: Option<String>,
}

/// Single message of a thread; immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Position in the thread, starting at 0
    pub seq: u64,
    pub role: MessageRole,
    pub content: String,
    pub inserted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Message as sent by the client, before the backend assigns id and seq
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInput {
    pub role: MessageRole,
    pub content: String,
}

impl MessageInput {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Attributes accepted by thread create/update mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThreadAttributes {
    pub summary: String,
    pub insight_id: Option<String>,
    pub flow_id: Option<String>,
    pub session: Option<AgentSession>,
    pub settings: Option<ThreadSettings>,
    #[serde(default)]
    pub messages: Vec<MessageInput>,
}

impl ThreadAttributes {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn with_insight(mut self, insight_id: impl Into<String>) -> Self {
        self.insight_id = Some(insight_id.into());
        self
    }

    pub fn with_flow(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    pub fn with_agent(mut self, kind: AgentKind) -> Self {
        self.session = Some(AgentSession::agent(kind));
        self
    }

    pub fn with_settings(mut self, settings: ThreadSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread_at(last_message_at: Option<DateTime<Utc>>, inserted_at: Option<DateTime<Utc>>) -> Thread {
        Thread {
            id: "t1".to_string(),
            summary: "cluster upgrade".to_string(),
            messages: Vec::new(),
            insight: None,
            flow: None,
            session: None,
            settings: ThreadSettings::default(),
            last_message_at,
            inserted_at,
            updated_at: None,
        }
    }

    #[test]
    fn test_timestamp_prefers_last_message() {
        let inserted = Utc::now() - Duration::days(3);
        let last = Utc::now() - Duration::hours(1);
        let thread = thread_at(Some(last), Some(inserted));
        assert_eq!(thread.timestamp(), Some(last));

        let thread = thread_at(None, Some(inserted));
        assert_eq!(thread.timestamp(), Some(inserted));
    }

    #[test]
    fn test_staleness_window() {
        let now = Utc::now();
        let window = Duration::hours(24);

        assert!(thread_at(Some(now - Duration::hours(25)), None).is_stale(now, window));
        assert!(!thread_at(Some(now - Duration::hours(23)), None).is_stale(now, window));
        assert!(!thread_at(None, None).is_stale(now, window));
    }

    #[test]
    fn test_agent_kind() {
        let mut thread = thread_at(None, None);
        assert!(!thread.is_agent_session());

        thread.session = Some(AgentSession::default());
        assert!(!thread.is_agent_session());

        thread.session = Some(AgentSession::agent(AgentKind::Terraform));
        assert_eq!(thread.agent_kind(), Some(AgentKind::Terraform));
    }

    #[test]
    fn test_agent_kind_serialization() {
        let json = serde_json::to_string(&AgentKind::Kubernetes).unwrap();
        assert_eq!(json, "\"kubernetes\"");
    }
}
