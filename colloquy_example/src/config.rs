use colloquy::{ChatbotConfig, FilePreferences, MemoryPreferences, PreferenceStore};
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PreferencesConfig {
    /// JSON file for UI preferences; kept in memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl PreferencesConfig {
    pub fn store(&self) -> Arc<dyn PreferenceStore> {
        match &self.path {
            Some(path) => Arc::new(FilePreferences::new(path)),
            None => Arc::new(MemoryPreferences::new()),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed with `COLLOQUY__`,
    ///    e.g. `COLLOQUY__LOGGING__LEVEL=debug`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("COLLOQUY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [chatbot]
            pin_page_size = 25
            default_thread_summary = "Untitled"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.chatbot.pin_page_size, 25);
        assert_eq!(config.chatbot.thread_page_size, 100);
        assert_eq!(config.chatbot.default_thread_summary, "Untitled");
        assert_eq!(config.logging.format, "json");
        assert!(config.preferences.path.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[chatbot]\nnotification_ttl_ms = 500\n\n[preferences]\npath = \"prefs.json\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chatbot.notification_ttl_ms, 500);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.preferences.path, Some(PathBuf::from("prefs.json")));
    }
}
