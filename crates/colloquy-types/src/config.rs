use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatbotConfig {
    pub thread_page_size: usize,
    pub pin_page_size: usize,
    /// Scroll the history on every sequence divisible by this
    pub scroll_batch_size: u64,
    pub notification_ttl_ms: u64,
    pub stale_after_hours: i64,
    pub default_thread_summary: String,
    pub pin_name_max_len: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            thread_page_size: 100,
            pin_page_size: 100,
            scroll_batch_size: 10,
            notification_ttl_ms: 3000,
            stale_after_hours: 24,
            default_thread_summary: "New chat".to_string(),
            pin_name_max_len: 250,
        }
    }
}

impl ChatbotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_page_size(mut self, size: usize) -> Self {
        self.thread_page_size = size.max(1);
        self
    }

    pub fn with_pin_page_size(mut self, size: usize) -> Self {
        self.pin_page_size = size.max(1);
        self
    }

    pub fn with_scroll_batch_size(mut self, size: u64) -> Self {
        self.scroll_batch_size = size.max(1);
        self
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn with_default_thread_summary(mut self, summary: impl Into<String>) -> Self {
        self.default_thread_summary = summary.into();
        self
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn stale_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.stale_after_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ChatbotConfig = serde_json::from_str(r#"{"pin_page_size": 20}"#).unwrap();
        assert_eq!(config.pin_page_size, 20);
        assert_eq!(config.thread_page_size, 100);
        assert_eq!(config.notification_ttl(), Duration::from_secs(3));
    }

    #[test]
    fn test_builder_clamps_page_sizes() {
        let config = ChatbotConfig::new()
            .with_pin_page_size(0)
            .with_scroll_batch_size(0);
        assert_eq!(config.pin_page_size, 1);
        assert_eq!(config.scroll_batch_size, 1);
    }
}
