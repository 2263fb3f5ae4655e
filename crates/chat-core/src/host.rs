use std::sync::Arc;
use std::time::Instant;

use crate::config::EditorConfig;
use crate::decorator::{CompositeDecorator, DecoratedRange};
use crate::deferred::DeferredTask;
use crate::dispatcher::{CommandDispatcher, EditorHooks};
use crate::document::{BlockKey, BlockType, InlineStyle, Mention, StyleSet, UploadFile};
use crate::entities::{insert_custom_emoji, insert_emoji, insert_uploaded_files};
use crate::error::EditorError;
use crate::key_binding::{Key, KeyEvent};
use crate::reset::clear_document;
use crate::rich_utils;
use crate::selection::SelectionState;
use crate::state::{EditResult, EditorState, HandleValue};

/// An emoji picked from the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiChoice {
    Native(String),
    Custom { image_url: String },
}

/// Owns the live editor state and feeds host events through the dispatcher.
///
/// Events that the dispatcher does not claim fall back to the default editing
/// behaviour, the way a rich text view would handle them itself.
pub struct ChatEditor<H: EditorHooks> {
    state: EditorState,
    config: EditorConfig,
    dispatcher: CommandDispatcher,
    hooks: H,
    mentions: Vec<Mention>,
    previews: Vec<UploadFile>,
}

impl<H: EditorHooks> ChatEditor<H> {
    pub fn new(config: EditorConfig, hooks: H) -> Self {
        let config = config.with_defaults();
        let decorator = CompositeDecorator::from_config(&config).map(Arc::new);
        Self {
            state: EditorState::create_empty().with_decorator(decorator),
            dispatcher: CommandDispatcher::new(&config),
            config,
            hooks,
            mentions: Vec::new(),
            previews: Vec::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Replaces the document, keeping the configured decorator.
    pub fn set_state(&mut self, state: EditorState) {
        let decorator = self.state.decorator().cloned();
        self.state = state.with_decorator(decorator);
    }

    pub fn set_selection(&mut self, selection: SelectionState) {
        self.state = self.state.accept_selection(selection);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn set_mentions(&mut self, mentions: Vec<Mention>) {
        self.mentions = mentions;
    }

    fn apply(&mut self, result: EditResult) -> HandleValue {
        let value = result.value();
        if let EditResult::Handled(state) = result {
            self.state = state;
        }
        value
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> HandleValue {
        if self.is_read_only() {
            return HandleValue::NotHandled;
        }
        if event.key == Key::Enter {
            let result = self
                .dispatcher
                .handle_return(event, &self.state, &mut self.hooks);
            if !result.is_handled() {
                self.state = rich_utils::handle_return_default(&self.state, event.modifiers.shift);
            }
            return self.apply(result);
        }
        let Some(command) = self.dispatcher.classify(event, &mut self.hooks) else {
            return HandleValue::NotHandled;
        };
        let result = self
            .dispatcher
            .handle_key_command(&command, &self.state, &mut self.hooks);
        self.apply(result)
    }

    pub fn before_input(&mut self, chars: &str) -> HandleValue {
        if self.is_read_only() {
            return HandleValue::NotHandled;
        }
        let result = self
            .dispatcher
            .handle_before_input(chars, &self.state, &mut self.hooks);
        if !result.is_handled() {
            self.state = rich_utils::insert_characters(&self.state, chars);
        }
        self.apply(result)
    }

    pub fn paste(&mut self, text: &str, html: Option<&str>) -> HandleValue {
        if self.is_read_only() {
            return HandleValue::NotHandled;
        }
        let result = self
            .dispatcher
            .handle_pasted_text(text, html, &self.state, &mut self.hooks);
        self.apply(result)
    }

    /// Refreshes the mention search; a caret that left the `@` word closes
    /// the suggestions.
    pub fn key_up(&mut self) {
        let mentions = self.dispatcher.mentions_mut();
        if mentions.lost_anchor(&self.state) {
            mentions.dismiss();
        } else {
            mentions.on_key_up(&self.state);
        }
    }

    pub fn select_mention(&mut self, mention: &Mention) {
        if self.is_read_only() {
            return;
        }
        self.hooks.on_mention_selected(mention);
        self.state = self
            .dispatcher
            .mentions_mut()
            .confirm(&self.state, mention);
    }

    pub fn dismiss_suggestions(&mut self) {
        self.dispatcher.mentions_mut().dismiss();
    }

    pub fn is_suggesting(&self) -> bool {
        self.dispatcher.mentions().is_suggesting()
    }

    pub fn mention_suggestions(&self) -> Vec<&Mention> {
        self.dispatcher.mentions().suggestions(&self.mentions)
    }

    pub fn toggle_inline_style(&mut self, style: InlineStyle) {
        if self.is_read_only() {
            return;
        }
        self.state = rich_utils::toggle_inline_style(&self.state, style);
    }

    pub fn toggle_block_type(&mut self, block_type: BlockType) {
        if self.is_read_only() {
            return;
        }
        self.state = rich_utils::toggle_block_type(&self.state, block_type);
    }

    pub fn add_emoji(&mut self, choice: &EmojiChoice) {
        if self.is_read_only() {
            return;
        }
        self.state = match choice {
            EmojiChoice::Native(emoji) => insert_emoji(&self.state, emoji),
            EmojiChoice::Custom { image_url } => insert_custom_emoji(&self.state, image_url),
        };
    }

    pub fn extra_button(&mut self) {
        self.hooks.on_extra_button();
    }

    /// Adds dropped files to the pending previews after the host had its say.
    pub fn drop_files(&mut self, files: Vec<UploadFile>) {
        if self.is_read_only() || files.is_empty() {
            return;
        }
        let files = self.hooks.on_drop_files(files);
        tracing::debug!(count = files.len(), "files dropped");
        self.previews.extend(files);
    }

    pub fn previews(&self) -> &[UploadFile] {
        &self.previews
    }

    pub fn mark_uploaded(&mut self, index: usize, url: impl Into<String>) -> Result<(), EditorError> {
        let len = self.previews.len();
        let file = self
            .previews
            .get_mut(index)
            .ok_or(EditorError::PreviewOutOfRange { index, len })?;
        file.uploaded = true;
        file.url = Some(url.into());
        Ok(())
    }

    pub fn remove_draft(&mut self, index: usize) -> Result<UploadFile, EditorError> {
        if index >= self.previews.len() {
            return Err(EditorError::PreviewOutOfRange {
                index,
                len: self.previews.len(),
            });
        }
        Ok(self.previews.remove(index))
    }

    /// Moves every uploaded preview into the document as one upload block.
    /// Returns how many files were inserted.
    pub fn commit_uploads(&mut self) -> usize {
        let (uploaded, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.previews)
                .into_iter()
                .partition(|file| file.uploaded);
        self.previews = pending;
        if !uploaded.is_empty() {
            self.state = insert_uploaded_files(&self.state, &uploaded);
        }
        uploaded.len()
    }

    pub fn current_inline_style(&self) -> StyleSet {
        self.state.current_inline_style()
    }

    pub fn current_block_type(&self) -> BlockType {
        self.state.current_block_type()
    }

    pub fn decorations(&self, key: &BlockKey) -> Vec<DecoratedRange> {
        match (self.state.decorator(), self.state.content().block_for_key(key)) {
            (Some(decorator), Some(block)) => decorator.decorations(block),
            _ => Vec::new(),
        }
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.dispatcher.deferred().is_empty()
    }

    /// Runs the deferred tasks due at `now` against the current state.
    pub fn run_deferred(&mut self, now: Instant) -> usize {
        let tasks = self.dispatcher.deferred_mut().take_due(now);
        self.run_tasks(tasks)
    }

    /// Runs every deferred task immediately.
    pub fn flush_deferred(&mut self) -> usize {
        let tasks = self.dispatcher.deferred_mut().drain();
        self.run_tasks(tasks)
    }

    fn run_tasks(&mut self, tasks: Vec<DeferredTask>) -> usize {
        let count = tasks.len();
        for task in tasks {
            match task {
                DeferredTask::ClearDocument => self.state = clear_document(&self.state),
            }
        }
        count
    }
}
