use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decorator::CompositeDecorator;
use crate::document::{BlockKey, BlockType, ContentState, InlineStyle, StyleSet};
use crate::selection::{SelectionState, clamp_selection, selection_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    InsertCharacters,
    BackspaceCharacter,
    DeleteCharacter,
    RemoveRange,
    SplitBlock,
    InsertFragment,
    ChangeBlockType,
    ChangeInlineStyle,
    ApplyEntity,
}

/// Outcome of a handler: either a replacement state or a pass to the
/// next handler in line.
#[derive(Debug, Clone, PartialEq)]
pub enum EditResult {
    Handled(EditorState),
    NotHandled,
}

impl EditResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, EditResult::Handled(_))
    }

    pub fn value(&self) -> HandleValue {
        match self {
            EditResult::Handled(_) => HandleValue::Handled,
            EditResult::NotHandled => HandleValue::NotHandled,
        }
    }

    pub fn into_state(self) -> Option<EditorState> {
        match self {
            EditResult::Handled(state) => Some(state),
            EditResult::NotHandled => None,
        }
    }
}

impl From<Option<EditorState>> for EditResult {
    fn from(value: Option<EditorState>) -> Self {
        match value {
            Some(state) => EditResult::Handled(state),
            None => EditResult::NotHandled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleValue {
    Handled,
    NotHandled,
}

/// Immutable editor snapshot. Every transition returns a new value.
#[derive(Debug, Clone)]
pub struct EditorState {
    content: Arc<ContentState>,
    selection: SelectionState,
    decorator: Option<Arc<CompositeDecorator>>,
    inline_style_override: Option<StyleSet>,
    last_change_type: Option<ChangeType>,
}

impl PartialEq for EditorState {
    fn eq(&self, other: &Self) -> bool {
        let same_decorator = match (&self.decorator, &other.decorator) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_decorator
            && (Arc::ptr_eq(&self.content, &other.content) || self.content == other.content)
            && self.selection == other.selection
            && self.inline_style_override == other.inline_style_override
            && self.last_change_type == other.last_change_type
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::create_empty()
    }
}

impl EditorState {
    pub fn create_empty() -> Self {
        Self::create_with_content(ContentState::new())
    }

    pub fn create_with_text(text: &str) -> Self {
        Self::create_with_content(ContentState::from_text(text))
    }

    pub fn create_with_content(content: ContentState) -> Self {
        let selection = content.selection_at_start();
        Self {
            content: Arc::new(content),
            selection,
            decorator: None,
            inline_style_override: None,
            last_change_type: None,
        }
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn decorator(&self) -> Option<&Arc<CompositeDecorator>> {
        self.decorator.as_ref()
    }

    pub fn inline_style_override(&self) -> Option<&StyleSet> {
        self.inline_style_override.as_ref()
    }

    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.last_change_type
    }

    pub fn with_decorator(&self, decorator: Option<Arc<CompositeDecorator>>) -> Self {
        Self {
            decorator,
            ..self.clone()
        }
    }

    /// Records a content change; the selection becomes the content's
    /// `selection_after` and any pending style override is dropped.
    pub fn push(&self, content: ContentState, change: ChangeType) -> Self {
        let selection = clamp_selection(&content, content.selection_after())
            .with_focus(self.selection.has_focus);
        Self {
            content: Arc::new(content),
            selection,
            decorator: self.decorator.clone(),
            inline_style_override: None,
            last_change_type: Some(change),
        }
    }

    /// Replaces the selection and marks the editor focused.
    pub fn force_selection(&self, selection: SelectionState) -> Self {
        let selection = clamp_selection(&self.content, &selection).with_focus(true);
        Self {
            selection,
            inline_style_override: None,
            ..self.clone()
        }
    }

    /// Replaces the selection as reported by the host, keeping its focus flag.
    pub fn accept_selection(&self, selection: SelectionState) -> Self {
        let selection = clamp_selection(&self.content, &selection);
        if selection == self.selection {
            return self.clone();
        }
        Self {
            selection,
            inline_style_override: None,
            ..self.clone()
        }
    }

    /// Keeps the current selection and marks the editor focused.
    pub fn focused(&self) -> Self {
        self.force_selection(self.selection.clone())
    }

    pub fn move_focus_to_end(&self) -> Self {
        self.force_selection(self.content.selection_at_end())
    }

    pub fn move_focus_to_end_of_block(&self, key: &BlockKey) -> Self {
        match self.content.block_for_key(key) {
            Some(block) => self.force_selection(SelectionState::caret(key.clone(), block.len())),
            None => self.move_focus_to_end(),
        }
    }

    pub fn set_inline_style_override(&self, style: Option<StyleSet>) -> Self {
        Self {
            inline_style_override: style,
            ..self.clone()
        }
    }

    /// Style that newly typed characters would get.
    ///
    /// A pending override wins. A collapsed caret takes the style of the
    /// character before it (or at offset 0, the first character); a range
    /// takes the style of its first character.
    pub fn current_inline_style(&self) -> StyleSet {
        if let Some(style) = &self.inline_style_override {
            return style.clone();
        }
        let bounds = selection_bounds(&self.content, &self.selection);
        let Some(block) = self.content.block_for_key(&bounds.start.key) else {
            return StyleSet::new();
        };
        if bounds.is_collapsed() {
            if bounds.start.offset > 0 {
                let before = block.text()[..bounds.start.offset]
                    .char_indices()
                    .next_back()
                    .map(|(ix, _)| ix)
                    .unwrap_or(0);
                return block.style_at(before);
            }
            return block.style_at(0);
        }
        if bounds.start.offset < block.len() {
            block.style_at(bounds.start.offset)
        } else {
            StyleSet::new()
        }
    }

    pub fn has_inline_style(&self, style: InlineStyle) -> bool {
        self.current_inline_style().contains(style)
    }

    /// Type of the block at the selection start.
    pub fn current_block_type(&self) -> BlockType {
        let bounds = selection_bounds(&self.content, &self.selection);
        self.content
            .block_for_key(&bounds.start.key)
            .map(|block| block.block_type())
            .unwrap_or_default()
    }

    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }
}
