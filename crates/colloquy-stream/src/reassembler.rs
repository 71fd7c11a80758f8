use colloquy_types::{GenerationKey, StreamDelta};
use std::collections::BTreeMap;
use tokio::sync::watch;

/// Rebuilds the text of one generation from out-of-order deltas
///
/// Fragments are keyed by sequence number, so redelivery replaces
/// instead of duplicating. The visible text is always the fragments
/// joined in ascending sequence order, whatever the arrival order.
pub struct StreamReassembler {
    key: GenerationKey,
    fragments: BTreeMap<u64, String>,
    text_tx: watch::Sender<String>,
}

impl StreamReassembler {
    pub fn new(key: GenerationKey) -> Self {
        let (text_tx, _) = watch::channel(String::new());
        Self {
            key,
            fragments: BTreeMap::new(),
            text_tx,
        }
    }

    pub fn key(&self) -> &GenerationKey {
        &self.key
    }

    /// Insert or replace a fragment and republish the text
    ///
    /// Returns whether the visible text changed.
    pub fn push(&mut self, delta: StreamDelta) -> bool {
        if self.fragments.get(&delta.sequence) == Some(&delta.content) {
            return false;
        }
        self.fragments.insert(delta.sequence, delta.content);

        let text = self.text();
        self.text_tx.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        })
    }

    /// Everything received so far, in sequence order
    pub fn text(&self) -> String {
        let capacity = self.fragments.values().map(String::len).sum();
        self.fragments
            .values()
            .fold(String::with_capacity(capacity), |mut text, fragment| {
                text.push_str(fragment);
                text
            })
    }

    /// Live view of the text for the render layer
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.text_tx.subscribe()
    }

    /// Number of distinct sequences received
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Highest sequence received so far
    pub fn last_sequence(&self) -> Option<u64> {
        self.fragments.keys().next_back().copied()
    }

    pub fn into_text(self) -> String {
        self.fragments.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(deltas: &[(u64, &str)]) -> String {
        let mut reassembler = StreamReassembler::new(GenerationKey::scope("test"));
        for (seq, content) in deltas {
            reassembler.push(StreamDelta::new(*seq, *content));
        }
        reassembler.text()
    }

    #[test]
    fn test_out_of_order_arrival() {
        assert_eq!(reassemble(&[(2, "ld"), (0, "He"), (1, "llo wor")]), "Hello world");
    }

    #[test]
    fn test_every_permutation_yields_same_text() {
        let deltas = [(0, "a"), (1, "bc"), (2, "d"), (3, "ef")];
        let expected = "abcdef";

        // Heap's algorithm over the four deltas
        let mut items = deltas.to_vec();
        let mut c = vec![0usize; items.len()];
        assert_eq!(reassemble(&items), expected);
        let mut i = 0;
        while i < items.len() {
            if c[i] < i {
                if i % 2 == 0 {
                    items.swap(0, i);
                } else {
                    items.swap(c[i], i);
                }
                assert_eq!(reassemble(&items), expected, "order: {items:?}");
                c[i] += 1;
                i = 0;
            } else {
                c[i] = 0;
                i += 1;
            }
        }
    }

    #[test]
    fn test_redelivery_is_idempotent() {
        let once = reassemble(&[(0, "He"), (1, "llo")]);
        let twice = reassemble(&[(0, "He"), (1, "llo"), (0, "He"), (1, "llo")]);
        assert_eq!(once, twice);

        let mut reassembler = StreamReassembler::new(GenerationKey::scope("test"));
        assert!(reassembler.push(StreamDelta::new(0, "He")));
        assert!(!reassembler.push(StreamDelta::new(0, "He")));
        assert_eq!(reassembler.len(), 1);
    }

    #[test]
    fn test_gaps_render_what_arrived() {
        assert_eq!(reassemble(&[(5, "!"), (0, "Hi")]), "Hi!");
    }

    #[test]
    fn test_subscribers_see_latest_text() {
        let mut reassembler = StreamReassembler::new(GenerationKey::insight("ins"));
        let rx = reassembler.subscribe();

        reassembler.push(StreamDelta::new(1, " there"));
        reassembler.push(StreamDelta::new(0, "Hi"));

        assert_eq!(*rx.borrow(), "Hi there");
        assert_eq!(reassembler.last_sequence(), Some(1));
        assert_eq!(reassembler.into_text(), "Hi there");
    }

    #[test]
    fn test_empty_fragment_does_not_change_text() {
        let mut reassembler = StreamReassembler::new(GenerationKey::scope("test"));
        assert!(!reassembler.push(StreamDelta::new(0, "")));
        assert!(reassembler.text().is_empty());
    }
}
