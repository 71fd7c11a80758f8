use colloquy_client::{
    ClientError, CompletionRequest, DeltaChannel, PreferenceStore, QueryClient, Result,
};
use colloquy_stream::{run_generation, GenerationOutcome, ScrollThrottle, StreamReassembler};
use colloquy_types::VerbosityLevel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Preference key holding the explain verbosity
pub const VERBOSITY_PREFERENCE_KEY: &str = "ai-verbosity-level";

#[derive(Debug, Clone, PartialEq)]
struct ActivePrompt {
    token: u64,
    text: String,
}

struct PromptSlot {
    current: watch::Sender<Option<ActivePrompt>>,
    tokens: AtomicU64,
}

/// Clears its prompt on drop, unless another prompt replaced it
#[must_use = "the prompt is cleared as soon as the guard is dropped"]
pub struct PromptGuard {
    slot: Arc<PromptSlot>,
    token: u64,
}

impl Drop for PromptGuard {
    fn drop(&mut self) {
        let token = self.token;
        self.slot.current.send_if_modified(|current| match current {
            Some(active) if active.token == token => {
                *current = None;
                true
            }
            _ => false,
        });
    }
}

/// "Explain with AI" prompt plus the persisted verbosity preference
pub struct ExplainContext {
    slot: Arc<PromptSlot>,
    preferences: Arc<dyn PreferenceStore>,
}

impl ExplainContext {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            slot: Arc::new(PromptSlot {
                current,
                tokens: AtomicU64::new(0),
            }),
            preferences,
        }
    }

    /// Make `prompt` the active one for as long as the guard lives
    pub fn set_prompt(&self, prompt: impl Into<String>) -> PromptGuard {
        let token = self.slot.tokens.fetch_add(1, Ordering::SeqCst) + 1;
        self.slot.current.send_replace(Some(ActivePrompt {
            token,
            text: prompt.into(),
        }));
        PromptGuard {
            slot: Arc::clone(&self.slot),
            token,
        }
    }

    pub fn prompt(&self) -> Option<String> {
        self.slot.current.borrow().as_ref().map(|active| active.text.clone())
    }

    /// Stored verbosity; unreadable values fall back to the default
    pub fn verbosity(&self) -> Result<VerbosityLevel> {
        let Some(raw) = self.preferences.get(VERBOSITY_PREFERENCE_KEY)? else {
            return Ok(VerbosityLevel::default());
        };
        match raw.parse() {
            Ok(level) => Ok(level),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "Ignoring stored verbosity level");
                Ok(VerbosityLevel::default())
            }
        }
    }

    pub fn set_verbosity(&self, level: VerbosityLevel) -> Result<()> {
        tracing::debug!(level = level.as_str(), "Verbosity level changed");
        self.preferences.set(VERBOSITY_PREFERENCE_KEY, level.as_str())
    }

    pub fn system(&self) -> Result<String> {
        Ok(self.verbosity()?.system_prompt())
    }

    /// Run one generation for the active prompt
    ///
    /// Deltas land in `reassembler` while the completion request is in
    /// flight; subscribe to it beforehand to render partial text.
    pub async fn explain(
        &self,
        client: &dyn QueryClient,
        channel: &dyn DeltaChannel,
        reassembler: &mut StreamReassembler,
        throttle: Option<&ScrollThrottle>,
    ) -> Result<GenerationOutcome> {
        let prompt = self
            .prompt()
            .ok_or_else(|| ClientError::Rejected("no explain prompt is active".to_string()))?;
        let request = CompletionRequest::new(reassembler.key().clone(), self.system()?, prompt);

        tracing::info!(key = %request.key, "Explaining with AI");
        Ok(run_generation(channel, reassembler, client.complete(request), throttle).await)
    }
}
