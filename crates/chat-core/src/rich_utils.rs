use unicode_segmentation::UnicodeSegmentation;

use crate::document::{BlockType, ContentState, InlineStyle, StyleSet};
use crate::key_binding::command;
use crate::modifier;
use crate::selection::{Point, SelectionState, selection_bounds};
use crate::state::{ChangeType, EditorState};

/// Toggles an inline style.
///
/// On a collapsed caret this only changes the style of the next typed
/// characters. On a range the style is removed when every selected character
/// already has it, and applied otherwise.
pub fn toggle_inline_style(state: &EditorState, style: InlineStyle) -> EditorState {
    let selection = state.selection();
    if selection.is_collapsed() {
        let next = state.current_inline_style().toggled(style);
        return state.set_inline_style_override(Some(next));
    }
    let content = state.content();
    let ranges: Vec<_> = modifier::block_ranges(content, selection)
        .into_iter()
        .filter(|(_, range)| !range.is_empty())
        .collect();
    let fully_styled = !ranges.is_empty()
        && ranges
            .iter()
            .all(|(block, range)| block.styled().every_char_has(range.clone(), style));
    let next = if fully_styled {
        modifier::remove_inline_style(content, selection, style)
    } else {
        modifier::apply_inline_style(content, selection, style)
    };
    state
        .push(next, ChangeType::ChangeInlineStyle)
        .force_selection(selection.clone())
}

/// Applies `block_type` to the selected non-atomic blocks, or reverts them to
/// unstyled when they all have it already.
pub fn toggle_block_type(state: &EditorState, block_type: BlockType) -> EditorState {
    let content = state.content();
    let selection = state.selection();
    let targets: Vec<_> = modifier::block_ranges(content, selection)
        .into_iter()
        .map(|(block, _)| block)
        .filter(|block| !block.is_atomic())
        .collect();
    if targets.is_empty() {
        return state.clone();
    }
    let target_type = if targets.iter().all(|block| block.block_type() == block_type) {
        BlockType::Unstyled
    } else {
        block_type
    };
    let mut next = content.clone();
    for block in targets {
        next.replace_block(block.with_type(target_type));
    }
    next.set_selection_after(selection.clone());
    state.push(next, ChangeType::ChangeBlockType)
}

/// Drops a structural block type when the caret sits at the very start of
/// the block.
pub fn try_to_remove_block_style(state: &EditorState) -> Option<ContentState> {
    let selection = state.selection();
    if !selection.is_collapsed() || selection.anchor.offset != 0 {
        return None;
    }
    let block = state.content().block_for_key(&selection.anchor.key)?;
    if !block.block_type().is_structural() {
        return None;
    }
    Some(modifier::set_block_type(
        state.content(),
        selection,
        BlockType::Unstyled,
    ))
}

/// Default behaviour for the built-in editing commands.
pub fn handle_key_command(state: &EditorState, command: &str) -> Option<EditorState> {
    let next = match command {
        command::BOLD => toggle_inline_style(state, InlineStyle::Bold),
        command::ITALIC => toggle_inline_style(state, InlineStyle::Italic),
        command::UNDERLINE => toggle_inline_style(state, InlineStyle::Underline),
        command::CODE => toggle_inline_style(state, InlineStyle::Code),
        command::STRIKETHROUGH => toggle_inline_style(state, InlineStyle::Strikethrough),
        command::BACKSPACE => backspace(state, DeleteUnit::Grapheme),
        command::BACKSPACE_WORD => backspace(state, DeleteUnit::Word),
        command::BACKSPACE_TO_START_OF_LINE => backspace(state, DeleteUnit::Line),
        command::DELETE => delete_forward(state, DeleteUnit::Grapheme),
        command::DELETE_WORD => delete_forward(state, DeleteUnit::Word),
        command::DELETE_TO_END_OF_BLOCK => delete_forward(state, DeleteUnit::Line),
        command::SPLIT_BLOCK => handle_return_default(state, false),
        command::INSERT_SOFT_NEWLINE => handle_return_default(state, true),
        _ => return None,
    };
    Some(next)
}

/// Inserts typed characters with the current inline style.
pub fn insert_characters(state: &EditorState, chars: &str) -> EditorState {
    let next = modifier::replace_text(
        state.content(),
        state.selection(),
        chars,
        typing_style(state),
        None,
    );
    state.push(next, ChangeType::InsertCharacters)
}

/// Return key behaviour when no handler claims it.
///
/// Shift inserts a soft newline. An empty list, quote or code block drops
/// back to unstyled; anything else splits the block.
pub fn handle_return_default(state: &EditorState, shift: bool) -> EditorState {
    let content = state.content();
    let selection = state.selection();
    if shift {
        let next = modifier::insert_soft_newline(content, selection, typing_style(state));
        return state.push(next, ChangeType::InsertCharacters);
    }
    if selection.is_collapsed()
        && let Some(block) = content.block_for_key(&selection.anchor.key)
        && block.is_empty()
        && block.block_type().is_structural()
    {
        let next = modifier::set_block_type(content, selection, BlockType::Unstyled);
        return state.push(next, ChangeType::ChangeBlockType);
    }
    state.push(modifier::split_block(content, selection), ChangeType::SplitBlock)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeleteUnit {
    Grapheme,
    Word,
    Line,
}

fn backspace(state: &EditorState, unit: DeleteUnit) -> EditorState {
    let content = state.content();
    let selection = state.selection();
    if !selection.is_collapsed() {
        return state.push(
            modifier::remove_range(content, selection),
            ChangeType::RemoveRange,
        );
    }
    let point = selection_bounds(content, selection).start;
    let Some(block) = content.block_for_key(&point.key) else {
        return state.clone();
    };

    if block.is_atomic() {
        let caret = content
            .block_before(block.key())
            .map(|prev| Point::new(prev.key().clone(), prev.len()));
        return match caret {
            Some(caret) => state.push(
                modifier::remove_block(content, block.key(), Some(caret)),
                ChangeType::BackspaceCharacter,
            ),
            None => state.push(
                modifier::reset_block(content, block.key()),
                ChangeType::BackspaceCharacter,
            ),
        };
    }

    if point.offset == 0 {
        if let Some(next) = try_to_remove_block_style(state) {
            return state.push(next, ChangeType::ChangeBlockType);
        }
        let Some(prev) = content.block_before(block.key()) else {
            return state.clone();
        };
        if prev.is_atomic() {
            return state.push(
                modifier::remove_block(content, prev.key(), Some(point)),
                ChangeType::BackspaceCharacter,
            );
        }
        let range = SelectionState::new(Point::new(prev.key().clone(), prev.len()), point, true);
        return state.push(
            modifier::remove_range(content, &range),
            ChangeType::BackspaceCharacter,
        );
    }

    let text = block.text();
    let from = match unit {
        DeleteUnit::Grapheme => grapheme_offset_before(text, point.offset),
        DeleteUnit::Word => word_offset_before(text, point.offset),
        DeleteUnit::Line => 0,
    };
    let range = SelectionState::new(Point::new(point.key.clone(), from), point, true);
    state.push(
        modifier::remove_range(content, &range),
        ChangeType::BackspaceCharacter,
    )
}

fn delete_forward(state: &EditorState, unit: DeleteUnit) -> EditorState {
    let content = state.content();
    let selection = state.selection();
    if !selection.is_collapsed() {
        return state.push(
            modifier::remove_range(content, selection),
            ChangeType::RemoveRange,
        );
    }
    let point = selection_bounds(content, selection).start;
    let Some(block) = content.block_for_key(&point.key) else {
        return state.clone();
    };

    if block.is_atomic() {
        return state.push(
            modifier::reset_block(content, block.key()),
            ChangeType::DeleteCharacter,
        );
    }

    if point.offset >= block.len() {
        let Some(next_block) = content.block_after(block.key()) else {
            return state.clone();
        };
        if next_block.is_atomic() {
            return state.push(
                modifier::remove_block(content, next_block.key(), Some(point)),
                ChangeType::DeleteCharacter,
            );
        }
        let range = SelectionState::new(point, Point::new(next_block.key().clone(), 0), false);
        return state.push(
            modifier::remove_range(content, &range),
            ChangeType::DeleteCharacter,
        );
    }

    let text = block.text();
    let to = match unit {
        DeleteUnit::Grapheme => grapheme_offset_after(text, point.offset),
        DeleteUnit::Word => word_offset_after(text, point.offset),
        DeleteUnit::Line => text.len(),
    };
    let range = SelectionState::new(point.clone(), Point::new(point.key.clone(), to), false);
    state.push(
        modifier::remove_range(content, &range),
        ChangeType::DeleteCharacter,
    )
}

fn grapheme_offset_before(text: &str, offset: usize) -> usize {
    text[..offset]
        .grapheme_indices(true)
        .next_back()
        .map(|(ix, _)| ix)
        .unwrap_or(0)
}

fn grapheme_offset_after(text: &str, offset: usize) -> usize {
    text[offset..]
        .graphemes(true)
        .next()
        .map(|g| offset + g.len())
        .unwrap_or(text.len())
}

/// Start of the word before `offset`, skipping trailing whitespace.
fn word_offset_before(text: &str, offset: usize) -> usize {
    let mut start = offset;
    for (ix, segment) in text[..offset].split_word_bound_indices().rev() {
        start = ix;
        if !segment.chars().all(char::is_whitespace) {
            break;
        }
    }
    start
}

fn word_offset_after(text: &str, offset: usize) -> usize {
    let mut end = offset;
    for (ix, segment) in text[offset..].split_word_bound_indices() {
        end = offset + ix + segment.len();
        if !segment.chars().all(char::is_whitespace) {
            break;
        }
    }
    end
}

/// Style for typed text. MENTION only makes sense together with its entity,
/// so it never carries over from the preceding character.
pub fn typing_style(state: &EditorState) -> StyleSet {
    state.current_inline_style().without(InlineStyle::Mention)
}
