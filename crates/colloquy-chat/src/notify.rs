use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// Transient, self-dismissing message for the render layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Publishes notifications and tracks the ones still on screen
pub struct Notifier {
    ttl: Duration,
    tx: broadcast::Sender<Notification>,
    active: Mutex<Vec<Notification>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            ttl,
            tx,
            active: Mutex::new(Vec::new()),
        }
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.push(Severity::Info, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.push(Severity::Error, message.into())
    }

    fn push(&self, severity: Severity, message: String) -> Notification {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::seconds(3));
        let now = Utc::now();
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            severity,
            message,
            expires_at: now + ttl,
        };

        if let Ok(mut active) = self.active.lock() {
            active.retain(|n| !n.is_expired(now));
            active.push(notification.clone());
        }
        // Nobody subscribed is fine; the active list still has it
        let _ = self.tx.send(notification.clone());
        notification
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Notifications that have not auto-dismissed by `now`
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Notification> {
        match self.active.lock() {
            Ok(mut active) => {
                active.retain(|n| !n.is_expired(now));
                active.clone()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn dismiss(&self, id: &str) {
        if let Ok(mut active) = self.active.lock() {
            active.retain(|n| n.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_auto_dismiss() {
        let notifier = Notifier::new(Duration::from_secs(3));
        let n = notifier.error("Failed to fork thread");

        assert_eq!(notifier.active(Utc::now()).len(), 1);
        assert!(notifier.active(n.expires_at).is_empty());
    }

    #[test]
    fn test_manual_dismiss() {
        let notifier = Notifier::new(Duration::from_secs(3));
        let keep = notifier.info("Thread forked");
        let drop = notifier.error("boom");

        notifier.dismiss(&drop.id);
        let active = notifier.active(Utc::now());
        assert_eq!(active, vec![keep]);
    }

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let notifier = Notifier::new(Duration::from_secs(3));
        let mut rx = notifier.subscribe();

        notifier.info("Thread forked");
        let received = rx.recv().await.unwrap();
        assert_eq!(received.severity, Severity::Info);
        assert_eq!(received.message, "Thread forked");
    }

    #[test]
    fn test_push_drops_expired_entries() {
        let notifier = Notifier::new(Duration::ZERO);
        for n in 0..5 {
            notifier.error(format!("failure {n}"));
        }

        let held = notifier.active.lock().unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].message, "failure 4");
    }
}
