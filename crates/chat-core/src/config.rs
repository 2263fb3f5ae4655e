use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::mention::MentionActivation;

const DEFAULT_CLEAR_DELAY_MS: u64 = 10;

fn default_clear_delay_ms() -> u64 {
    DEFAULT_CLEAR_DELAY_MS
}

fn default_true() -> bool {
    true
}

/// How Enter behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorMode {
    /// Enter sends the message, Shift+Enter inserts a newline.
    #[default]
    Chat,
    /// Enter is left to the editor and the host hooks.
    Editor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub mode: EditorMode,
    pub mention_activation: MentionActivation,
    /// Delay between sending a message and clearing the document.
    #[serde(default = "default_clear_delay_ms")]
    pub clear_delay_ms: u64,
    #[serde(default = "default_true")]
    pub decorate_hashtags: bool,
    pub decorate_emoji_shortcodes: bool,
    pub read_only: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mode: EditorMode::default(),
            mention_activation: MentionActivation::default(),
            clear_delay_ms: DEFAULT_CLEAR_DELAY_MS,
            decorate_hashtags: true,
            decorate_emoji_shortcodes: false,
            read_only: false,
        }
    }
}

impl EditorConfig {
    /// Replaces unset values with their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.clear_delay_ms == 0 {
            self.clear_delay_ms = DEFAULT_CLEAR_DELAY_MS;
        }
        self
    }

    pub fn editor_mode(mode: EditorMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EditorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn zero_delay_means_default() {
        let config = EditorConfig::from_json_str(r#"{"clear_delay_ms": 0, "mode": "editor"}"#)
            .unwrap();
        assert_eq!(config.clear_delay_ms, 10);
        assert_eq!(config.mode, EditorMode::Editor);
    }
}
