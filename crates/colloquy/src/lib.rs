//! # Colloquy
//!
//! Conversation core for AI assistant panels: reassembles streamed replies,
//! owns the thread/session state machine, tracks pins and keeps every view
//! of a thread consistent through one shared cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colloquy::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = Arc::new(InMemoryBackend::new());
//!     let store = ThreadStore::new(
//!         backend.clone(),
//!         Arc::new(ThreadCache::new()),
//!         ChatbotConfig::default(),
//!     );
//!
//!     store.send_message("Why is my ingress returning 502?").await?;
//!
//!     if let ChatbotView::Thread(id) = store.view() {
//!         let thread = store.thread(&id).await?;
//!         println!("{:?}", thread.map(|t| t.messages));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`colloquy-types`**: threads, pins, deltas, pages and configuration
//! - **`colloquy-client`**: backend seams (`QueryClient`, `DeltaChannel`,
//!   `PreferenceStore`), the shared `ThreadCache` and an in-memory backend
//! - **`colloquy-stream`**: `StreamReassembler`, scroll throttling and the
//!   generation driver
//! - **`colloquy-chat`**: `ThreadStore`, `PinIndex`, `CacheSync`,
//!   notifications and the explain context
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use colloquy_types::{
    AgentKind, AgentSession, ChatbotConfig, Connection, FlowRef, GenerationKey, InsightRef,
    Message, MessageInput, MessageRole, Page, PageInfo, Pin, PinAttributes, PinTarget,
    StreamDelta, Thread, ThreadAttributes, ThreadSettings, VerbosityLevel,
};

pub use colloquy_client::{
    ClientError, CompletionRequest, DeltaChannel, DeltaStream, FilePreferences,
    InMemoryBackend, MemoryPreferences, Operation, PreferenceStore, QueryClient, ThreadCache,
};

pub use colloquy_stream::{run_generation, GenerationOutcome, ScrollThrottle, StreamReassembler};

pub use colloquy_chat::{
    prioritize_current_page, sort_threads_or_pins, truncate, CacheSync, ChatbotView,
    ExplainContext, Notification, Notifier, PinIndex, PinStatus, PinToggle, PromptGuard,
    SessionState, Severity, ThreadOrPin, ThreadStore, VERBOSITY_PREFERENCE_KEY,
};
