use crate::document::BlockType;
use crate::modifier;
use crate::rich_utils::toggle_block_type;
use crate::selection::{Point, SelectionState, selection_bounds};
use crate::state::{ChangeType, EditResult, EditorState};

/// Characters whose insertion can complete a shortcut.
pub const SHORTCUT_TRIGGERS: [&str; 2] = [" ", "`"];

/// Block type for a block whose entire text is a shortcut.
pub fn shortcut_block_type(text: &str) -> Option<BlockType> {
    match text {
        "-" => Some(BlockType::UnorderedListItem),
        "*" => Some(BlockType::OrderedListItem),
        ">" => Some(BlockType::Blockquote),
        "``" => Some(BlockType::CodeBlock),
        _ => None,
    }
}

pub fn is_shortcut_trigger(chars: &str) -> bool {
    SHORTCUT_TRIGGERS.contains(&chars)
}

/// Turns `-`, `*`, `>` and a pair of backticks into block formatting as the
/// trigger character is typed after them. The typed character itself is
/// swallowed.
pub fn handle_markdown_shortcut(state: &EditorState, chars: &str) -> EditResult {
    if !is_shortcut_trigger(chars) {
        return EditResult::NotHandled;
    }
    let key = selection_bounds(state.content(), state.selection()).start.key;
    let Some(block) = state.content().block_for_key(&key) else {
        return EditResult::NotHandled;
    };
    let Some(block_type) = shortcut_block_type(block.text()) else {
        return EditResult::NotHandled;
    };
    tracing::debug!(%key, block_type = %block_type, "markdown shortcut");
    let cleared = remove_current_block_text(state);
    let toggled = toggle_block_type(&cleared, block_type);
    EditResult::Handled(toggled.move_focus_to_end_of_block(&key))
}

/// Removes the text of the block holding the selection start, from the block
/// start up to the selection end (or the block end when the selection runs on).
pub fn remove_current_block_text(state: &EditorState) -> EditorState {
    let content = state.content();
    let bounds = selection_bounds(content, state.selection());
    let key = bounds.start.key.clone();
    let end = if bounds.end.key == key {
        bounds.end.offset
    } else {
        content
            .block_for_key(&key)
            .map(|block| block.len())
            .unwrap_or(0)
    };
    let range = SelectionState::new(Point::new(key.clone(), 0), Point::new(key, end), false);
    state.push(
        modifier::remove_range(content, &range),
        ChangeType::RemoveRange,
    )
}
