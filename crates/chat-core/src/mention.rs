use serde::{Deserialize, Serialize};

use crate::document::{BlockKey, Entity, InlineStyle, Mention, StyleSet, clamp_to_char_boundary};
use crate::modifier;
use crate::selection::{Point, SelectionState, WordAt, word_at};
use crate::state::{ChangeType, EditorState};

/// Where a typed `@` may open the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MentionActivation {
    /// Only at the start of the block or after whitespace.
    #[default]
    WordStart,
    Anywhere,
}

/// The word the caret is in, used as the span a confirmed mention replaces.
pub fn search_text(state: &EditorState) -> WordAt {
    let anchor = &state.selection().anchor;
    let text = state
        .content()
        .block_for_key(&anchor.key)
        .map(|block| block.text())
        .unwrap_or_default();
    word_at(text, anchor.offset.saturating_sub(1))
}

/// Text after the last `@` in the run of non-whitespace ending at the caret.
/// Empty when that run has no `@`.
pub fn search_token(state: &EditorState) -> String {
    let anchor = &state.selection().anchor;
    let Some(block) = state.content().block_for_key(&anchor.key) else {
        return String::new();
    };
    let text = block.text();
    let before = &text[..clamp_to_char_boundary(text, anchor.offset)];
    let run_start = before
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace())
        .map(|(ix, ch)| ix + ch.len_utf8())
        .unwrap_or(0);
    let run = &before[run_start..];
    match run.rfind('@') {
        Some(ix) => run[ix + 1..].to_string(),
        None => String::new(),
    }
}

/// Candidates whose name contains `search`, in host order.
pub fn filter_mentions<'a>(candidates: &'a [Mention], search: &str) -> Vec<&'a Mention> {
    candidates
        .iter()
        .filter(|mention| mention.name.contains(search))
        .collect()
}

/// Replaces the word at the caret with `@name`, backed by a MENTION entity.
///
/// When the replaced word ran to the end of the block a plain space follows
/// so typing continues outside the mention.
pub fn insert_mention(state: &EditorState, mention: &Mention) -> EditorState {
    let anchor = state.selection().anchor.clone();
    let Some(block) = state.content().block_for_key(&anchor.key) else {
        return state.clone();
    };
    let block_len = block.len();
    let WordAt { begin, end, .. } = search_text(state);

    let (content, entity) = state.content().create_entity(Entity::mention(mention.clone()));
    let span = SelectionState::new(
        Point::new(anchor.key.clone(), begin),
        Point::new(anchor.key.clone(), end),
        false,
    );
    let label = format!("@{}", mention.name);
    let mut content = modifier::replace_text(
        &content,
        &span,
        &label,
        StyleSet::of(InlineStyle::Mention),
        Some(entity),
    );
    if end == block_len {
        let caret = content.selection_after().clone();
        content = modifier::replace_text(&content, &caret, " ", StyleSet::new(), None);
    }
    tracing::debug!(id = mention.id, name = %mention.name, "mention inserted");
    let next = state.push(content, ChangeType::ApplyEntity);
    let caret = next.selection().clone();
    next.force_selection(caret)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MentionSession {
    key: BlockKey,
    trigger_offset: usize,
    search: String,
}

/// Suggestion list lifecycle: a typed `@` opens a session, key-ups refine
/// the search, and confirming or dismissing ends it.
#[derive(Debug, Clone, Default)]
pub struct MentionAutocomplete {
    activation: MentionActivation,
    session: Option<MentionSession>,
}

impl MentionAutocomplete {
    pub fn new(activation: MentionActivation) -> Self {
        Self {
            activation,
            session: None,
        }
    }

    pub fn activation(&self) -> MentionActivation {
        self.activation
    }

    pub fn is_suggesting(&self) -> bool {
        self.session.is_some()
    }

    pub fn search(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.search.as_str())
    }

    /// Called when `@` is about to be inserted. Returns whether a session
    /// opened; an already open session is replaced.
    pub fn on_trigger(&mut self, state: &EditorState) -> bool {
        let anchor = &state.selection().anchor;
        let Some(block) = state.content().block_for_key(&anchor.key) else {
            return false;
        };
        let before = &block.text()[..clamp_to_char_boundary(block.text(), anchor.offset)];
        let at_word_start = before.chars().next_back().is_none_or(char::is_whitespace);
        if self.activation == MentionActivation::WordStart && !at_word_start {
            tracing::trace!("`@` typed mid-word, not suggesting");
            return false;
        }
        tracing::debug!(key = %anchor.key, offset = anchor.offset, "mention suggestions opened");
        self.session = Some(MentionSession {
            key: anchor.key.clone(),
            trigger_offset: before.len(),
            search: String::new(),
        });
        true
    }

    /// Recomputes the search from the text before the caret.
    pub fn on_key_up(&mut self, state: &EditorState) {
        if let Some(session) = self.session.as_mut() {
            session.search = search_token(state);
            tracing::trace!(search = %session.search, "mention search updated");
        }
    }

    /// True when the caret has left the block of the `@` or moved back over it.
    pub fn lost_anchor(&self, state: &EditorState) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let anchor = &state.selection().anchor;
        anchor.key != session.key || anchor.offset <= session.trigger_offset
    }

    pub fn suggestions<'a>(&self, candidates: &'a [Mention]) -> Vec<&'a Mention> {
        match self.search() {
            Some(search) => filter_mentions(candidates, search),
            None => Vec::new(),
        }
    }

    /// Inserts the mention and ends the session.
    pub fn confirm(&mut self, state: &EditorState, mention: &Mention) -> EditorState {
        self.session = None;
        insert_mention(state, mention)
    }

    pub fn dismiss(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("mention suggestions dismissed");
        }
    }
}
