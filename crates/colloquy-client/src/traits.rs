use async_trait::async_trait;
use colloquy_types::{
    Connection, GenerationKey, Message, MessageInput, Page, Pin, PinAttributes, StreamDelta,
    Thread, ThreadAttributes,
};
use futures::Stream;
use std::pin::Pin as StdPin;

use crate::error::Result;

/// Deltas of one generation, in arrival order
pub type DeltaStream = StdPin<Box<dyn Stream<Item = Result<StreamDelta>> + Send>>;

/// Request/response operations of the backend query layer
///
/// Every operation except creation is idempotent from the caller's side.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Create a new thread; always yields a fresh id
    async fn create_thread(&self, attributes: ThreadAttributes) -> Result<Thread>;

    /// Copy the first `seq` messages of `thread_id` into a new thread
    async fn fork_thread(&self, thread_id: &str, seq: u64) -> Result<Thread>;

    async fn update_thread(&self, thread_id: &str, attributes: ThreadAttributes) -> Result<Thread>;

    async fn delete_thread(&self, thread_id: &str) -> Result<Thread>;

    /// Authoritative fetch; `None` when the thread does not exist
    async fn fetch_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    async fn fetch_threads(&self, page: Page) -> Result<Connection<Thread>>;

    /// Append messages to a thread, returning the assistant's reply
    async fn send_message(&self, thread_id: &str, messages: Vec<MessageInput>) -> Result<Vec<Message>>;

    async fn create_pin(&self, attributes: PinAttributes) -> Result<Pin>;

    async fn delete_pin(&self, pin_id: &str) -> Result<Pin>;

    async fn fetch_pins(&self, page: Page) -> Result<Connection<Pin>>;

    /// One-shot request for the final text of a generation
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Push channel delivering generation deltas
///
/// Delivery is at-least-once and unordered, and there is no end marker.
#[async_trait]
pub trait DeltaChannel: Send + Sync {
    async fn subscribe(&self, key: &GenerationKey) -> Result<DeltaStream>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub key: GenerationKey,
    pub system: String,
    pub input: String,
}

impl CompletionRequest {
    pub fn new(key: GenerationKey, system: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            key,
            system: system.into(),
            input: input.into(),
        }
    }
}
