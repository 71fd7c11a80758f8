// In-memory backend used by tests and the demo binary

use async_trait::async_trait;
use chrono::Utc;
use colloquy_types::{
    Connection, GenerationKey, InsightRef, Message, MessageInput, MessageRole, Page, PageInfo,
    Pin, PinAttributes, StreamDelta, Thread, ThreadAttributes,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};

use crate::error::{ClientError, Result};
use crate::traits::{CompletionRequest, DeltaChannel, DeltaStream, QueryClient};

const CHANNEL_CAPACITY: usize = 1024;

/// Backend operations, used for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateThread,
    ForkThread,
    UpdateThread,
    DeleteThread,
    FetchThread,
    FetchThreads,
    SendMessage,
    CreatePin,
    DeletePin,
    FetchPins,
    Complete,
    Subscribe,
}

#[derive(Default)]
struct State {
    threads: Vec<Thread>,
    pins: Vec<Pin>,
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, ClientError>,
}

type CompletionSlot = watch::Sender<Option<Result<String>>>;

/// Backend that keeps threads and pins in memory
///
/// Threads are listed newest first, pins in creation order. Page
/// cursors are plain offsets.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
    channels: Mutex<HashMap<GenerationKey, broadcast::Sender<Result<StreamDelta>>>>,
    completions: Mutex<HashMap<GenerationKey, CompletionSlot>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| ClientError::Internal(format!("backend state poisoned: {e}")))
}

fn paginate<T: Clone>(items: &[T], page: &Page) -> Result<Connection<T>> {
    let start = match &page.after {
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| ClientError::Rejected(format!("invalid cursor: {cursor}")))?,
        None => 0,
    };
    let start = start.min(items.len());
    let end = (start + page.first).min(items.len());

    Ok(Connection {
        items: items[start..end].to_vec(),
        page_info: PageInfo {
            has_next_page: end < items.len(),
            end_cursor: Some(end.to_string()),
        },
    })
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a thread as if it already existed on the server
    pub fn insert_thread(&self, thread: Thread) {
        if let Ok(mut state) = lock(&self.state) {
            state.threads.retain(|existing| existing.id != thread.id);
            state.threads.push(thread);
        }
    }

    pub fn thread(&self, id: &str) -> Option<Thread> {
        let state = lock(&self.state).ok()?;
        state.threads.iter().find(|thread| thread.id == id).cloned()
    }

    pub fn pins(&self) -> Vec<Pin> {
        lock(&self.state).map(|state| state.pins.clone()).unwrap_or_default()
    }

    /// How many times an operation has been invoked
    pub fn calls(&self, op: Operation) -> usize {
        lock(&self.state)
            .map(|state| state.calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Make the next invocation of `op` fail with `error`
    pub fn fail_next(&self, op: Operation, error: ClientError) {
        if let Ok(mut state) = lock(&self.state) {
            state.failures.insert(op, error);
        }
    }

    /// Push a delta to every current subscriber of `key`
    pub fn publish(&self, key: &GenerationKey, delta: StreamDelta) {
        self.send(key, Ok(delta));
    }

    /// Deliver a transport error on the channel for `key`
    pub fn publish_error(&self, key: &GenerationKey, error: ClientError) {
        self.send(key, Err(error));
    }

    /// Close the channel for `key`; subscribers see their stream end
    pub fn close_channel(&self, key: &GenerationKey) {
        if let Ok(mut channels) = lock(&self.channels) {
            channels.remove(key);
        }
    }

    pub fn subscriber_count(&self, key: &GenerationKey) -> usize {
        lock(&self.channels)
            .ok()
            .and_then(|channels| channels.get(key).map(|tx| tx.receiver_count()))
            .unwrap_or(0)
    }

    /// Resolve the next completion request for `key`
    pub fn resolve_completion(&self, key: &GenerationKey, result: Result<String>) {
        self.completion_slot(key).send_replace(Some(result));
    }

    fn send(&self, key: &GenerationKey, item: Result<StreamDelta>) {
        if let Ok(channels) = lock(&self.channels) {
            if let Some(tx) = channels.get(key) {
                // No receivers means nobody is listening; the delta is dropped
                let _ = tx.send(item);
            }
        }
    }

    fn completion_slot(&self, key: &GenerationKey) -> CompletionSlot {
        match lock(&self.completions) {
            Ok(mut slots) => slots
                .entry(key.clone())
                .or_insert_with(|| watch::channel(None).0)
                .clone(),
            Err(_) => watch::channel(None).0,
        }
    }

    fn begin(&self, op: Operation) -> Result<MutexGuard<'_, State>> {
        let mut state = lock(&self.state)?;
        *state.calls.entry(op).or_insert(0) += 1;
        if let Some(error) = state.failures.remove(&op) {
            tracing::debug!(?op, %error, "Injected failure");
            return Err(error);
        }
        Ok(state)
    }
}

fn new_thread(attributes: ThreadAttributes, insight: Option<InsightRef>) -> Thread {
    let now = Utc::now();
    Thread {
        id: uuid::Uuid::new_v4().to_string(),
        summary: attributes.summary,
        messages: Vec::new(),
        insight,
        flow: attributes.flow_id.map(|id| colloquy_types::FlowRef { id, name: None }),
        session: attributes.session,
        settings: attributes.settings.unwrap_or_default(),
        last_message_at: None,
        inserted_at: Some(now),
        updated_at: Some(now),
    }
}

fn append(thread: &mut Thread, role: MessageRole, content: String) -> Message {
    let now = Utc::now();
    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        seq: thread.messages.len() as u64,
        role,
        content,
        inserted_at: Some(now),
    };
    thread.messages.push(message.clone());
    thread.last_message_at = Some(now);
    thread.updated_at = Some(now);
    message
}

#[async_trait]
impl QueryClient for InMemoryBackend {
    async fn create_thread(&self, mut attributes: ThreadAttributes) -> Result<Thread> {
        let mut state = self.begin(Operation::CreateThread)?;

        let insight = attributes.insight_id.clone().map(InsightRef::new);
        let initial = std::mem::take(&mut attributes.messages);
        let mut thread = new_thread(attributes, insight);
        for input in initial {
            append(&mut thread, input.role, input.content);
        }

        state.threads.push(thread.clone());
        Ok(thread)
    }

    async fn fork_thread(&self, thread_id: &str, seq: u64) -> Result<Thread> {
        let mut state = self.begin(Operation::ForkThread)?;

        let source = state
            .threads
            .iter()
            .find(|thread| thread.id == thread_id)
            .cloned()
            .ok_or_else(|| ClientError::ThreadNotFound(thread_id.to_string()))?;

        let attributes = ThreadAttributes {
            summary: source.summary.clone(),
            flow_id: source.flow.as_ref().map(|flow| flow.id.clone()),
            settings: Some(source.settings),
            ..Default::default()
        };
        let mut fork = new_thread(attributes, source.insight.clone());
        fork.flow = source.flow.clone();
        fork.messages = source.prefix(seq as usize).to_vec();
        fork.last_message_at = fork.messages.last().and_then(|message| message.inserted_at);

        state.threads.push(fork.clone());
        Ok(fork)
    }

    async fn update_thread(&self, thread_id: &str, attributes: ThreadAttributes) -> Result<Thread> {
        let mut state = self.begin(Operation::UpdateThread)?;

        let thread = state
            .threads
            .iter_mut()
            .find(|thread| thread.id == thread_id)
            .ok_or_else(|| ClientError::ThreadNotFound(thread_id.to_string()))?;

        thread.summary = attributes.summary;
        if let Some(settings) = attributes.settings {
            thread.settings = settings;
        }
        if let Some(session) = attributes.session {
            thread.session = Some(session);
        }
        thread.updated_at = Some(Utc::now());
        Ok(thread.clone())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<Thread> {
        let mut state = self.begin(Operation::DeleteThread)?;

        let index = state
            .threads
            .iter()
            .position(|thread| thread.id == thread_id)
            .ok_or_else(|| ClientError::ThreadNotFound(thread_id.to_string()))?;
        Ok(state.threads.remove(index))
    }

    async fn fetch_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let state = self.begin(Operation::FetchThread)?;
        Ok(state.threads.iter().find(|thread| thread.id == thread_id).cloned())
    }

    async fn fetch_threads(&self, page: Page) -> Result<Connection<Thread>> {
        let state = self.begin(Operation::FetchThreads)?;
        let newest_first: Vec<Thread> = state.threads.iter().rev().cloned().collect();
        paginate(&newest_first, &page)
    }

    async fn send_message(&self, thread_id: &str, messages: Vec<MessageInput>) -> Result<Vec<Message>> {
        let mut state = self.begin(Operation::SendMessage)?;

        let thread = state
            .threads
            .iter_mut()
            .find(|thread| thread.id == thread_id)
            .ok_or_else(|| ClientError::ThreadNotFound(thread_id.to_string()))?;

        let mut last_user = String::new();
        for input in messages {
            if input.role == MessageRole::User {
                last_user = input.content.clone();
            }
            append(thread, input.role, input.content);
        }
        let reply = append(thread, MessageRole::Assistant, format!("Acknowledged: {last_user}"));
        Ok(vec![reply])
    }

    async fn create_pin(&self, attributes: PinAttributes) -> Result<Pin> {
        let mut state = self.begin(Operation::CreatePin)?;

        let thread = match &attributes.thread_id {
            Some(id) => Some(
                state
                    .threads
                    .iter()
                    .find(|thread| &thread.id == id)
                    .cloned()
                    .ok_or_else(|| ClientError::ThreadNotFound(id.clone()))?,
            ),
            None => None,
        };
        let insight = thread
            .as_ref()
            .and_then(|thread| thread.insight.clone())
            .or_else(|| {
                attributes.insight_id.clone().map(|id| InsightRef {
                    name: attributes.name.clone(),
                    ..InsightRef::new(id)
                })
            });

        if thread.is_none() && insight.is_none() {
            return Err(ClientError::Rejected(
                "pin requires a thread or an insight".to_string(),
            ));
        }

        let pin = Pin {
            id: uuid::Uuid::new_v4().to_string(),
            name: attributes.name,
            thread,
            insight,
            inserted_at: Some(Utc::now()),
        };
        state.pins.push(pin.clone());
        Ok(pin)
    }

    async fn delete_pin(&self, pin_id: &str) -> Result<Pin> {
        let mut state = self.begin(Operation::DeletePin)?;

        let index = state
            .pins
            .iter()
            .position(|pin| pin.id == pin_id)
            .ok_or_else(|| ClientError::PinNotFound(pin_id.to_string()))?;
        Ok(state.pins.remove(index))
    }

    async fn fetch_pins(&self, page: Page) -> Result<Connection<Pin>> {
        let state = self.begin(Operation::FetchPins)?;
        paginate(&state.pins, &page)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        drop(self.begin(Operation::Complete)?);

        // Each resolution answers exactly one request
        let slot = self.completion_slot(&request.key);
        let mut rx = slot.subscribe();
        loop {
            rx.wait_for(|result| result.is_some())
                .await
                .map(|_| ())
                .map_err(|e| ClientError::Transport(e.to_string()))?;
            if let Some(result) = slot.send_replace(None) {
                return result;
            }
        }
    }
}

#[async_trait]
impl DeltaChannel for InMemoryBackend {
    async fn subscribe(&self, key: &GenerationKey) -> Result<DeltaStream> {
        drop(self.begin(Operation::Subscribe)?);

        let mut rx = {
            let mut channels = lock(&self.channels)?;
            channels
                .entry(key.clone())
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        };

        let stream = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(item) => yield item,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        yield Err(ClientError::Subscription(format!("lagged by {skipped} deltas")));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
