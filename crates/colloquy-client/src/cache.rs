// Shared read cache for threads, keyed by thread id

use colloquy_types::Thread;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::watch;

/// Keyed thread cache shared by every view
///
/// Writes are keyed replacements (last write wins) and never need a
/// lock across an await. Each key owns a watch channel so views bound
/// to an id see a write as soon as it lands.
#[derive(Default)]
pub struct ThreadCache {
    entries: RwLock<HashMap<String, watch::Sender<Option<Thread>>>>,
}

impl ThreadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached thread, if any
    pub fn read(&self, id: &str) -> Option<Thread> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(id)?;
        let thread = entry.borrow().clone();
        thread
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read(id).is_some()
    }

    /// Store a thread under its own id, replacing whatever was there
    pub fn write(&self, thread: Thread) {
        if let Ok(mut entries) = self.entries.write() {
            let id = thread.id.clone();
            match entries.get(&id) {
                Some(entry) => {
                    entry.send_replace(Some(thread));
                }
                None => {
                    let (tx, _) = watch::channel(Some(thread));
                    entries.insert(id, tx);
                }
            }
        }
    }

    /// Drop a thread; watchers observe `None`
    ///
    /// The key is forgotten once nobody watches it.
    pub fn evict(&self, id: &str) {
        if let Ok(mut entries) = self.entries.write() {
            if let Some(entry) = entries.get(id) {
                entry.send_replace(None);
                if entry.receiver_count() == 0 {
                    entries.remove(id);
                }
            }
        }
    }

    /// Subscribe to one key; the receiver starts at the current value
    pub fn watch(&self, id: &str) -> watch::Receiver<Option<Thread>> {
        if let Ok(entries) = self.entries.read() {
            if let Some(entry) = entries.get(id) {
                return entry.subscribe();
            }
        }

        match self.entries.write() {
            Ok(mut entries) => {
                // Empty keys whose watchers are gone
                entries.retain(|_, entry| entry.receiver_count() > 0 || entry.borrow().is_some());
                entries
                    .entry(id.to_string())
                    .or_insert_with(|| watch::channel(None).0)
                    .subscribe()
            }
            // Poisoned map: hand out a detached receiver that stays empty
            Err(_) => watch::channel(None).1,
        }
    }

    #[cfg(test)]
    fn keys(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Number of cached threads
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().filter(|entry| entry.borrow().is_some()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::ThreadSettings;

    fn thread(id: &str, summary: &str) -> Thread {
        Thread {
            id: id.to_string(),
            summary: summary.to_string(),
            messages: Vec::new(),
            insight: None,
            flow: None,
            session: None,
            settings: ThreadSettings::default(),
            last_message_at: None,
            inserted_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_write_then_read() {
        let cache = ThreadCache::new();
        assert!(cache.read("t1").is_none());

        cache.write(thread("t1", "first"));
        assert_eq!(cache.read("t1").map(|t| t.summary), Some("first".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ThreadCache::new();
        cache.write(thread("t1", "first"));
        cache.write(thread("t1", "second"));
        assert_eq!(cache.read("t1").map(|t| t.summary), Some("second".to_string()));
    }

    #[test]
    fn test_watcher_sees_write_made_after_subscribing() {
        let cache = ThreadCache::new();
        let rx = cache.watch("t1");
        assert!(rx.borrow().is_none());

        cache.write(thread("t1", "created"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().as_ref().map(|t| t.summary.clone()), Some("created".to_string()));
    }

    #[test]
    fn test_evict() {
        let cache = ThreadCache::new();
        cache.write(thread("t1", "first"));
        let rx = cache.watch("t1");

        cache.evict("t1");
        assert!(cache.read("t1").is_none());
        assert!(rx.borrow().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unwatched_empty_keys_are_forgotten() {
        let cache = ThreadCache::new();
        for n in 0..10 {
            drop(cache.watch(&format!("gone-{n}")));
        }
        let _live = cache.watch("live");
        assert_eq!(cache.keys(), 1);

        cache.write(thread("t1", "first"));
        cache.evict("t1");
        assert_eq!(cache.keys(), 1);
        assert!(cache.is_empty());
    }
}
