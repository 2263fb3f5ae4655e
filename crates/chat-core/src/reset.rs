use crate::document::ContentState;
use crate::modifier;
use crate::selection::{Point, SelectionState};
use crate::state::{ChangeType, EditorState};

/// Empties the document down to a single unstyled block with the caret in it.
///
/// The whole document is selected and removed, so the surviving block keeps
/// the first block's key. Clearing an already cleared document changes nothing.
pub fn clear_document(state: &EditorState) -> EditorState {
    let content = state.content();
    let (Some(first), Some(last)) = (content.first_block(), content.last_block()) else {
        return state
            .push(ContentState::new(), ChangeType::RemoveRange)
            .move_focus_to_end();
    };
    let key = first.key().clone();
    let everything = SelectionState::new(
        Point::new(key.clone(), 0),
        Point::new(last.key().clone(), last.len()),
        false,
    );
    let removed = modifier::remove_range(content, &everything);
    let cleared = modifier::reset_block(&removed, &key);
    tracing::debug!(%key, "document cleared");
    state
        .push(cleared, ChangeType::RemoveRange)
        .move_focus_to_end()
}
