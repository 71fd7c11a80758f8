//! Prelude module for convenient imports
//!
//! ```rust
//! use colloquy::prelude::*;
//! ```

pub use crate::{
    AgentKind, ChatbotConfig, GenerationKey, InsightRef, Page, Pin, PinAttributes, PinTarget,
    StreamDelta, Thread, ThreadAttributes, VerbosityLevel,
    ClientError, DeltaChannel, InMemoryBackend, PreferenceStore, QueryClient, ThreadCache,
    GenerationOutcome, ScrollThrottle, StreamReassembler,
    ChatbotView, ExplainContext, Notifier, PinIndex, PinStatus, PinToggle, SessionState,
    ThreadStore,
};
