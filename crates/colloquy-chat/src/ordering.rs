use chrono::{DateTime, Utc};
use colloquy_types::{Pin, Thread};

/// Row of the combined thread/pin list
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadOrPin {
    Thread(Thread),
    Pin(Pin),
}

impl ThreadOrPin {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ThreadOrPin::Thread(thread) => thread.timestamp(),
            ThreadOrPin::Pin(pin) => pin.timestamp(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ThreadOrPin::Thread(thread) => &thread.id,
            ThreadOrPin::Pin(pin) => &pin.id,
        }
    }
}

/// Newest first; rows without a timestamp sink to the bottom
pub fn sort_threads_or_pins(items: &mut [ThreadOrPin]) {
    items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

/// Move threads whose insight page is the current route to the front
///
/// Relative order inside both groups is kept.
pub fn prioritize_current_page(threads: Vec<Thread>, pathname: &str) -> Vec<Thread> {
    let (current, rest): (Vec<_>, Vec<_>) = threads.into_iter().partition(|thread| {
        thread
            .insight
            .as_ref()
            .and_then(|insight| insight.path.as_deref())
            .is_some_and(|path| !path.is_empty() && pathname.contains(path))
    });
    current.into_iter().chain(rest).collect()
}

/// Cut `text` to at most `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{kept}...")
}
