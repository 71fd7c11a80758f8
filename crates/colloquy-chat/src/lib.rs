pub mod cache_sync;
pub mod explain;
pub mod notify;
pub mod ordering;
pub mod pins;
pub mod session;
pub mod store;

pub use cache_sync::CacheSync;
pub use explain::{ExplainContext, PromptGuard, VERBOSITY_PREFERENCE_KEY};
pub use notify::{Notification, Notifier, Severity};
pub use ordering::{prioritize_current_page, sort_threads_or_pins, truncate, ThreadOrPin};
pub use pins::{PinIndex, PinStatus, PinToggle};
pub use session::{ChatbotView, SessionState};
pub use store::ThreadStore;
