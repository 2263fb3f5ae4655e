use std::time::Duration;

use crate::config::{EditorConfig, EditorMode};
use crate::deferred::{DeferredQueue, DeferredTask};
use crate::document::{Mention, UploadFile};
use crate::key_binding::{Key, KeyEvent, command, default_key_binding};
use crate::markdown::{handle_markdown_shortcut, is_shortcut_trigger};
use crate::mention::MentionAutocomplete;
use crate::modifier;
use crate::paste::paste_fragment;
use crate::rich_utils;
use crate::state::{ChangeType, EditResult, EditorState};

/// Host extension points. Every method has a pass-through default.
pub trait EditorHooks {
    /// Extra key bindings, consulted after the built-in ones.
    fn key_binding(&mut self, _event: &KeyEvent) -> Option<String> {
        None
    }

    fn handle_key_command(&mut self, _command: &str, _state: &EditorState) -> EditResult {
        EditResult::NotHandled
    }

    fn handle_return(&mut self, _event: &KeyEvent, _state: &EditorState) -> EditResult {
        EditResult::NotHandled
    }

    fn handle_before_input(&mut self, _chars: &str, _state: &EditorState) -> EditResult {
        EditResult::NotHandled
    }

    fn handle_pasted_text(
        &mut self,
        _text: &str,
        _html: Option<&str>,
        _state: &EditorState,
    ) -> EditResult {
        EditResult::NotHandled
    }

    /// Called in chat mode when Enter sends the current document.
    fn send_message(&mut self, _state: &EditorState) {}

    fn on_mention_selected(&mut self, _mention: &Mention) {}

    /// May rewrite dropped files before they become pending previews.
    fn on_drop_files(&mut self, files: Vec<UploadFile>) -> Vec<UploadFile> {
        files
    }

    fn on_extra_button(&mut self) {}
}

/// Hooks that accept every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl EditorHooks for NoopHooks {}

/// Routes editor events through the built-in behaviours and the host hooks.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    mode: EditorMode,
    clear_delay: Duration,
    mentions: MentionAutocomplete,
    deferred: DeferredQueue,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl CommandDispatcher {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            mode: config.mode,
            clear_delay: config.clear_delay(),
            mentions: MentionAutocomplete::new(config.mention_activation),
            deferred: DeferredQueue::default(),
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn mentions(&self) -> &MentionAutocomplete {
        &self.mentions
    }

    pub fn mentions_mut(&mut self) -> &mut MentionAutocomplete {
        &mut self.mentions
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    pub fn deferred_mut(&mut self) -> &mut DeferredQueue {
        &mut self.deferred
    }

    /// Names the command a key event triggers.
    ///
    /// Meta+z always means `editor-undo`. Otherwise the built-in bindings
    /// apply, then the host's.
    pub fn classify(&self, event: &KeyEvent, hooks: &mut dyn EditorHooks) -> Option<String> {
        let command = if event.modifiers.meta && event.key == Key::Char('z') {
            Some(command::EDITOR_UNDO.to_string())
        } else {
            default_key_binding(event)
                .map(str::to_string)
                .or_else(|| hooks.key_binding(event))
        };
        tracing::debug!(?event.key, command = command.as_deref(), "key classified");
        command
    }

    pub fn handle_key_command(
        &self,
        command: &str,
        state: &EditorState,
        hooks: &mut dyn EditorHooks,
    ) -> EditResult {
        if command == command::EDITOR_UNDO {
            tracing::debug!("removing the anchor block");
            return EditResult::Handled(remove_anchor_block(state));
        }
        if let Some(next) = rich_utils::handle_key_command(state, command) {
            tracing::debug!(command, "handled by the rich text table");
            return EditResult::Handled(next.focused());
        }
        let result = hooks.handle_key_command(command, state);
        tracing::debug!(command, handled = result.is_handled(), "passed to host");
        result
    }

    /// Enter in chat mode sends the message and schedules the clear; with
    /// Shift, or in editor mode, the host decides.
    pub fn handle_return(
        &mut self,
        event: &KeyEvent,
        state: &EditorState,
        hooks: &mut dyn EditorHooks,
    ) -> EditResult {
        if self.mode == EditorMode::Chat && !event.modifiers.shift {
            tracing::debug!(delay = ?self.clear_delay, "sending message");
            hooks.send_message(state);
            self.mentions.dismiss();
            self.deferred
                .schedule(DeferredTask::ClearDocument, self.clear_delay);
            return EditResult::Handled(state.clone());
        }
        hooks.handle_return(event, state)
    }

    pub fn handle_pasted_text(
        &self,
        text: &str,
        html: Option<&str>,
        state: &EditorState,
        hooks: &mut dyn EditorHooks,
    ) -> EditResult {
        let Some(fragment) = paste_fragment(text, html) else {
            return hooks.handle_pasted_text(text, html, state);
        };
        tracing::debug!(blocks = fragment.len(), "pasting fragment");
        let content = modifier::replace_with_fragment(state.content(), state.selection(), &fragment);
        EditResult::Handled(state.push(content, ChangeType::InsertFragment).focused())
    }

    /// `@` may open mention suggestions and is then inserted as usual; a
    /// space or backtick may complete a markdown shortcut.
    pub fn handle_before_input(
        &mut self,
        chars: &str,
        state: &EditorState,
        hooks: &mut dyn EditorHooks,
    ) -> EditResult {
        if chars == "@" {
            self.mentions.on_trigger(state);
        } else if is_shortcut_trigger(chars) {
            return handle_markdown_shortcut(state, chars);
        }
        hooks.handle_before_input(chars, state)
    }
}

/// Removes the block holding the anchor and puts the caret at the end of the
/// document. Removing the only block leaves a single empty one.
pub fn remove_anchor_block(state: &EditorState) -> EditorState {
    let key = state.selection().anchor.key.clone();
    let content = modifier::remove_block(state.content(), &key, None);
    state
        .push(content, ChangeType::RemoveRange)
        .move_focus_to_end()
}
