use serde::{Deserialize, Serialize};

use self::command::*;

/// Names of the editing commands key events are classified into.
pub mod command {
    pub const EDITOR_UNDO: &str = "editor-undo";
    pub const UNDO: &str = "undo";
    pub const REDO: &str = "redo";
    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const UNDERLINE: &str = "underline";
    pub const CODE: &str = "code";
    pub const STRIKETHROUGH: &str = "strikethrough";
    pub const BACKSPACE: &str = "backspace";
    pub const BACKSPACE_WORD: &str = "backspace-word";
    pub const BACKSPACE_TO_START_OF_LINE: &str = "backspace-to-start-of-line";
    pub const DELETE: &str = "delete";
    pub const DELETE_WORD: &str = "delete-word";
    pub const DELETE_TO_END_OF_BLOCK: &str = "delete-to-end-of-block";
    pub const SPLIT_BLOCK: &str = "split-block";
    pub const INSERT_SOFT_NEWLINE: &str = "insert-soft-newline";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn char(ch: char) -> Self {
        Self::new(Key::Char(ch))
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    /// Ctrl or meta, whichever the platform uses for shortcuts.
    pub fn has_command_modifier(&self) -> bool {
        self.modifiers.ctrl || self.modifiers.meta
    }
}

/// Maps a key event to the name of a built-in editing command.
pub fn default_key_binding(event: &KeyEvent) -> Option<&'static str> {
    let m = event.modifiers;
    match event.key {
        Key::Enter if m.shift => Some(INSERT_SOFT_NEWLINE),
        Key::Enter => Some(SPLIT_BLOCK),
        Key::Backspace if m.alt || m.ctrl => Some(BACKSPACE_WORD),
        Key::Backspace if m.meta => Some(BACKSPACE_TO_START_OF_LINE),
        Key::Backspace => Some(BACKSPACE),
        Key::Delete if m.alt || m.ctrl => Some(DELETE_WORD),
        Key::Delete if m.meta => Some(DELETE_TO_END_OF_BLOCK),
        Key::Delete => Some(DELETE),
        Key::Char(ch) if event.has_command_modifier() => {
            match (ch.to_ascii_lowercase(), m.shift) {
                ('b', false) => Some(BOLD),
                ('i', false) => Some(ITALIC),
                ('u', false) => Some(UNDERLINE),
                ('j', false) => Some(CODE),
                ('x', true) => Some(STRIKETHROUGH),
                ('z', false) => Some(UNDO),
                ('z', true) | ('y', false) => Some(REDO),
                _ => None,
            }
        }
        _ => None,
    }
}
