use crate::document::{Entity, StyleSet, UploadFile};
use crate::modifier;
use crate::state::{ChangeType, EditorState};

/// Text of the single character an atomic block carries.
pub const ATOMIC_PLACEHOLDER: &str = " ";

/// Inserts a native emoji followed by a space, replacing any selected range.
pub fn insert_emoji(state: &EditorState, emoji: &str) -> EditorState {
    let text = format!("{emoji} ");
    let content = modifier::replace_text(
        state.content(),
        state.selection(),
        &text,
        StyleSet::new(),
        None,
    );
    state.push(content, ChangeType::InsertCharacters).focused()
}

/// Inserts an image emoji as an atomic block.
pub fn insert_custom_emoji(state: &EditorState, src: &str) -> EditorState {
    insert_entity_block(state, Entity::emoji(src))
}

/// Inserts one atomic block referencing all `files`. No files, no change.
pub fn insert_uploaded_files(state: &EditorState, files: &[UploadFile]) -> EditorState {
    if files.is_empty() {
        return state.clone();
    }
    insert_entity_block(state, Entity::upload(files.to_vec()))
}

fn insert_entity_block(state: &EditorState, entity: Entity) -> EditorState {
    let entity_type = entity.entity_type();
    let (content, key) = state.content().create_entity(entity);
    tracing::debug!(?entity_type, entity = %key, "inserting atomic block");
    let content =
        modifier::insert_atomic_block(&content, state.selection(), key, ATOMIC_PLACEHOLDER);
    state.push(content, ChangeType::InsertFragment).focused()
}
