use colloquy_client::{QueryClient, Result, ThreadCache};
use colloquy_types::{
    AgentKind, ChatbotConfig, Connection, InsightRef, Message, MessageInput, Page, Thread,
    ThreadAttributes,
};
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache_sync::CacheSync;
use crate::notify::Notifier;
use crate::session::{ChatbotView, SessionState};

/// Owner of the conversation session state and thread operations
///
/// The only writer of [`SessionState`]; views get snapshots through
/// [`ThreadStore::subscribe`]. Mutations write to the shared cache only
/// after they succeed, so a failure leaves state exactly as it was and
/// surfaces as a transient error notification.
pub struct ThreadStore {
    client: Arc<dyn QueryClient>,
    cache: Arc<ThreadCache>,
    sync: CacheSync,
    notifier: Arc<Notifier>,
    config: ChatbotConfig,
    state: watch::Sender<SessionState>,
}

impl ThreadStore {
    pub fn new(client: Arc<dyn QueryClient>, cache: Arc<ThreadCache>, config: ChatbotConfig) -> Self {
        let notifier = Arc::new(Notifier::new(config.notification_ttl()));
        let (state, _) = watch::channel(SessionState::default());
        Self {
            client,
            sync: CacheSync::new(Arc::clone(&cache)),
            cache,
            notifier,
            config,
            state,
        }
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn cache(&self) -> &Arc<ThreadCache> {
        &self.cache
    }

    pub fn config(&self) -> &ChatbotConfig {
        &self.config
    }

    /// Snapshot of the session state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> ChatbotView {
        self.state.borrow().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            apply(state);
            *state != before
        });
    }

    // Agent init mode only exists while no thread is current
    fn enter_thread(&self, thread_id: String) {
        self.update(|state| {
            state.current_thread_id = Some(thread_id);
            state.current_insight = None;
            state.agent_init_mode = None;
            state.is_open = true;
        });
    }

    fn report(&self, action: &str, error: &colloquy_client::ClientError) {
        tracing::warn!(action, error = %error, "Thread operation failed");
        self.notifier.error(format!("Failed to {action}: {error}"));
    }

    /// Open the panel on whatever was last active
    pub fn open(&self) {
        self.update(|state| state.is_open = true);
    }

    /// Close the panel, keeping the current thread for the next open
    pub fn close_chatbot(&self) {
        self.update(|state| state.is_open = false);
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.update(|state| state.fullscreen = fullscreen);
    }

    pub fn toggle_fullscreen(&self) {
        self.update(|state| state.fullscreen = !state.fullscreen);
    }

    pub fn go_to_thread(&self, thread_id: impl Into<String>) {
        let thread_id = thread_id.into();
        tracing::debug!(%thread_id, "Going to thread");
        self.enter_thread(thread_id);
    }

    pub fn go_to_insight(&self, insight: InsightRef) {
        tracing::debug!(insight_id = %insight.id, "Going to insight");
        self.update(|state| {
            state.current_thread_id = None;
            state.current_insight = Some(insight);
            state.agent_init_mode = None;
            state.is_open = true;
        });
    }

    pub fn go_to_thread_list(&self) {
        self.update(|state| {
            state.current_thread_id = None;
            state.current_insight = None;
            state.agent_init_mode = None;
            state.is_open = true;
        });
    }

    /// Return to the last plain chat, creating a default one if there is none
    pub async fn go_to_last_non_agent_thread(&self) -> Result<String> {
        let last = self.state.borrow().last_non_agent_thread_id.clone();
        match last {
            Some(id) => {
                self.go_to_thread(id.clone());
                Ok(id)
            }
            None => {
                let attributes = ThreadAttributes::new(self.config.default_thread_summary.clone());
                let thread = self.create_thread(attributes).await?;
                Ok(thread.id)
            }
        }
    }

    /// Pick an agent; its thread is created by the first sent message
    pub fn select_agent(&self, kind: AgentKind) {
        tracing::debug!(agent = %kind, "Agent selected");
        self.update(|state| {
            state.current_thread_id = None;
            state.current_insight = None;
            state.agent_init_mode = Some(kind);
            state.is_open = true;
        });
    }

    pub async fn deselect_agent(&self) -> Result<String> {
        self.update(|state| state.agent_init_mode = None);
        self.go_to_last_non_agent_thread().await
    }

    pub async fn create_thread(&self, attributes: ThreadAttributes) -> Result<Thread> {
        let thread = match self.client.create_thread(attributes).await {
            Ok(thread) => thread,
            Err(e) => {
                self.report("create thread", &e);
                return Err(e);
            }
        };

        tracing::info!(thread_id = %thread.id, "Thread created");
        self.sync.publish(Some(&thread));
        self.enter_thread(thread.id.clone());
        Ok(thread)
    }

    /// Copy the first `seq` messages of a thread into a new one and switch to it
    pub async fn fork_thread(&self, thread_id: &str, seq: u64) -> Result<Thread> {
        let fork = match self.client.fork_thread(thread_id, seq).await {
            Ok(thread) => thread,
            Err(e) => {
                self.report("fork thread", &e);
                return Err(e);
            }
        };

        tracing::info!(source = thread_id, thread_id = %fork.id, seq, "Thread forked");
        self.sync.publish(Some(&fork));
        self.enter_thread(fork.id.clone());
        self.notifier.info("Thread forked");
        Ok(fork)
    }

    pub async fn rename_thread(&self, thread_id: &str, summary: impl Into<String>) -> Result<Thread> {
        self.update_thread(thread_id, ThreadAttributes::new(summary)).await
    }

    pub async fn update_thread(&self, thread_id: &str, attributes: ThreadAttributes) -> Result<Thread> {
        match self.client.update_thread(thread_id, attributes).await {
            Ok(thread) => {
                tracing::info!(%thread_id, "Thread updated");
                self.cache.write(thread.clone());
                Ok(thread)
            }
            Err(e) => {
                self.report("update thread", &e);
                Err(e)
            }
        }
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<Thread> {
        let deleted = match self.client.delete_thread(thread_id).await {
            Ok(thread) => thread,
            Err(e) => {
                self.report("delete thread", &e);
                return Err(e);
            }
        };

        tracing::info!(%thread_id, "Thread deleted");
        self.cache.evict(thread_id);
        self.update(|state| {
            if state.current_thread_id.as_deref() == Some(thread_id) {
                state.current_thread_id = None;
                state.agent_init_mode = None;
            }
            if state.last_non_agent_thread_id.as_deref() == Some(thread_id) {
                state.last_non_agent_thread_id = None;
            }
        });
        Ok(deleted)
    }

    /// Authoritative fetch of a thread, refreshing the cache
    ///
    /// A missing thread is an empty state, not an error.
    pub async fn load_thread_details(&self, thread_id: &str) -> Result<Option<Thread>> {
        let thread = match self.client.fetch_thread(thread_id).await {
            Ok(Some(thread)) => thread,
            Ok(None) => {
                tracing::debug!(%thread_id, "Thread not found");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(%thread_id, error = %e, "Failed to load thread details");
                return Err(e);
            }
        };

        self.cache.write(thread.clone());
        let is_agent = thread.is_agent_session();
        let id = thread.id.clone();
        self.update(|state| {
            if !is_agent {
                state.last_non_agent_thread_id = Some(id);
            }
        });
        Ok(Some(thread))
    }

    /// Cache-first read of a thread by id
    pub async fn thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        if let Some(thread) = self.cache.read(thread_id) {
            return Ok(Some(thread));
        }
        let thread = self.client.fetch_thread(thread_id).await?;
        if let Some(thread) = &thread {
            self.cache.write(thread.clone());
        }
        Ok(thread)
    }

    pub async fn threads(&self, page: Page) -> Result<Connection<Thread>> {
        let connection = self.client.fetch_threads(page).await?;
        for thread in &connection.items {
            self.cache.write(thread.clone());
        }
        Ok(connection)
    }

    /// First page of the thread list at the configured size
    pub async fn first_threads(&self) -> Result<Connection<Thread>> {
        self.threads(Page::first(self.config.thread_page_size)).await
    }

    /// Send a user message to the current thread
    ///
    /// Without a current thread one is created first, carrying the
    /// selected agent kind if any. Blank content is ignored.
    pub async fn send_message(&self, content: &str) -> Result<Vec<Message>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let (current, agent) = {
            let state = self.state.borrow();
            (state.current_thread_id.clone(), state.agent_init_mode)
        };
        let thread_id = match current {
            Some(id) => id,
            None => {
                let mut attributes = ThreadAttributes::new(self.config.default_thread_summary.clone());
                if let Some(kind) = agent {
                    attributes = attributes.with_agent(kind);
                }
                self.create_thread(attributes).await?.id
            }
        };

        let reply = match self
            .client
            .send_message(&thread_id, vec![MessageInput::user(content)])
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                self.report("send message", &e);
                return Err(e);
            }
        };

        if let Err(e) = self.load_thread_details(&thread_id).await {
            tracing::warn!(%thread_id, error = %e, "Reload after send failed");
        }
        Ok(reply)
    }
}
