pub mod cache;
pub mod error;
pub mod memory;
pub mod preferences;
pub mod traits;

pub use cache::ThreadCache;
pub use error::{ClientError, Result};
pub use memory::{InMemoryBackend, Operation};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use traits::{CompletionRequest, DeltaChannel, DeltaStream, QueryClient};
