use colloquy_types::{AgentKind, InsightRef};
use serde::Serialize;

/// Process-wide UI session state; never persisted
///
/// Owned by [`crate::ThreadStore`], views only receive snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SessionState {
    pub is_open: bool,
    pub fullscreen: bool,
    pub current_thread_id: Option<String>,
    pub current_insight: Option<InsightRef>,
    /// Most recent thread whose session was not an agent session
    pub last_non_agent_thread_id: Option<String>,
    /// Agent picked before its thread exists
    pub agent_init_mode: Option<AgentKind>,
}

/// What the conversation surface is showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum ChatbotView {
    Closed,
    ThreadList,
    Thread(String),
    Insight(String),
    AgentInit(AgentKind),
}

impl SessionState {
    pub fn view(&self) -> ChatbotView {
        if !self.is_open {
            return ChatbotView::Closed;
        }
        if let Some(id) = &self.current_thread_id {
            return ChatbotView::Thread(id.clone());
        }
        if let Some(insight) = &self.current_insight {
            return ChatbotView::Insight(insight.id.clone());
        }
        match self.agent_init_mode {
            Some(kind) => ChatbotView::AgentInit(kind),
            None => ChatbotView::ThreadList,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_hides_everything() {
        let state = SessionState {
            current_thread_id: Some("t1".to_string()),
            ..Default::default()
        };
        assert_eq!(state.view(), ChatbotView::Closed);
    }

    #[test]
    fn test_view_precedence() {
        let mut state = SessionState {
            is_open: true,
            agent_init_mode: Some(AgentKind::Kubernetes),
            ..Default::default()
        };
        assert_eq!(state.view(), ChatbotView::AgentInit(AgentKind::Kubernetes));

        state.current_insight = Some(InsightRef::new("ins"));
        assert_eq!(state.view(), ChatbotView::Insight("ins".to_string()));

        state.current_thread_id = Some("t1".to_string());
        assert_eq!(state.view(), ChatbotView::Thread("t1".to_string()));

        state.current_thread_id = None;
        state.current_insight = None;
        state.agent_init_mode = None;
        assert_eq!(state.view(), ChatbotView::ThreadList);
    }
}
