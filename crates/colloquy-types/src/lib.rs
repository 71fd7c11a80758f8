pub mod config;
pub mod delta;
pub mod page;
pub mod pin;
pub mod thread;
pub mod verbosity;

pub use config::ChatbotConfig;
pub use delta::{GenerationKey, StreamDelta};
pub use page::{Connection, Page, PageInfo};
pub use pin::{Pin, PinAttributes, PinTarget};
pub use thread::{
    AgentKind, AgentSession, FlowRef, InsightRef, Message, MessageInput, MessageRole, Thread,
    ThreadAttributes, ThreadSettings,
};
pub use verbosity::VerbosityLevel;
