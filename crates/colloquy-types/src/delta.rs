use serde::{Deserialize, Serialize};

/// Identifies one in-flight generation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum GenerationKey {
    /// Explanation of an insight
    Insight(String),
    /// Ad-hoc scope, e.g. one explain request on a page
    Scope(String),
}

impl GenerationKey {
    pub fn insight(id: impl Into<String>) -> Self {
        GenerationKey::Insight(id.into())
    }

    pub fn scope(id: impl Into<String>) -> Self {
        GenerationKey::Scope(id.into())
    }
}

impl std::fmt::Display for GenerationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationKey::Insight(id) => write!(f, "insight:{id}"),
            GenerationKey::Scope(id) => write!(f, "scope:{id}"),
        }
    }
}

/// Incremental fragment of an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    #[serde(rename = "seq")]
    pub sequence: u64,
    pub content: String,
}

impl StreamDelta {
    pub fn new(sequence: u64, content: impl Into<String>) -> Self {
        Self {
            sequence,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_deserialization() {
        let json = r#"{"seq":3,"content":"lo"}"#;
        let delta: StreamDelta = serde_json::from_str(json).unwrap();
        assert_eq!(delta, StreamDelta::new(3, "lo"));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(GenerationKey::insight("abc").to_string(), "insight:abc");
        assert_eq!(GenerationKey::scope("page").to_string(), "scope:page");
    }
}
