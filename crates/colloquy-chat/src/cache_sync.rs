use colloquy_client::ThreadCache;
use colloquy_types::Thread;
use std::sync::Arc;

/// Publishes freshly created or forked threads into the shared cache
///
/// Writes use the same key a fetch-by-id uses, so a mounted view bound
/// to the id sees the thread without a round trip. Purely additive:
/// a later authoritative fetch overwrites whatever was written here.
#[derive(Clone)]
pub struct CacheSync {
    cache: Arc<ThreadCache>,
}

impl CacheSync {
    pub fn new(cache: Arc<ThreadCache>) -> Self {
        Self { cache }
    }

    /// Write `thread` if the mutation returned one; returns whether it did
    pub fn publish(&self, thread: Option<&Thread>) -> bool {
        match thread {
            Some(thread) => {
                tracing::debug!(thread_id = %thread.id, "Publishing thread to cache");
                self.cache.write(thread.clone());
                true
            }
            None => false,
        }
    }

    pub fn cache(&self) -> &Arc<ThreadCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::ThreadSettings;

    fn thread(id: &str) -> Thread {
        Thread {
            id: id.to_string(),
            summary: "new".to_string(),
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
    fn test_publish_visible_to_bound_view() {
        let cache = Arc::new(ThreadCache::new());
        let view = cache.watch("t1");
        let sync = CacheSync::new(Arc::clone(&cache));

        assert!(sync.publish(Some(&thread("t1"))));
        assert_eq!(view.borrow().as_ref().map(|t| t.id.as_str()), Some("t1"));
    }

    #[test]
    fn test_publish_nothing_is_noop() {
        let cache = Arc::new(ThreadCache::new());
        let sync = CacheSync::new(Arc::clone(&cache));

        assert!(!sync.publish(None));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_authoritative_write_wins_afterwards() {
        let cache = Arc::new(ThreadCache::new());
        let sync = CacheSync::new(Arc::clone(&cache));
        sync.publish(Some(&thread("t1")));

        let mut fetched = thread("t1");
        fetched.summary = "renamed upstream".to_string();
        cache.write(fetched);

        assert_eq!(cache.read("t1").unwrap().summary, "renamed upstream");
    }
}
