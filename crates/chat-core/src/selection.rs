use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{BlockKey, BlockType, ContentBlock, ContentState, clamp_to_char_boundary};
use crate::state::EditorState;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub key: BlockKey,
    pub offset: usize,
}

impl Point {
    pub fn new(key: BlockKey, offset: usize) -> Self {
        Self { key, offset }
    }
}

/// Anchor and focus inside the block list.
///
/// `is_backward` records the direction the user dragged in; every utility here
/// orders the two points by document position instead of trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub anchor: Point,
    pub focus: Point,
    #[serde(default)]
    pub is_backward: bool,
    #[serde(default)]
    pub has_focus: bool,
}

impl SelectionState {
    pub fn new(anchor: Point, focus: Point, is_backward: bool) -> Self {
        Self {
            anchor,
            focus,
            is_backward,
            has_focus: false,
        }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point.clone(), point, false)
    }

    pub fn caret(key: BlockKey, offset: usize) -> Self {
        Self::collapsed(Point::new(key, offset))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn with_focus(mut self, has_focus: bool) -> Self {
        self.has_focus = has_focus;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionBounds {
    pub start: Point,
    pub end: Point,
}

impl SelectionBounds {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Orders anchor and focus by document position.
pub fn selection_bounds(content: &ContentState, selection: &SelectionState) -> SelectionBounds {
    let selection = clamp_selection(content, selection);
    let anchor_ix = content.index_of(&selection.anchor.key).unwrap_or(0);
    let focus_ix = content.index_of(&selection.focus.key).unwrap_or(0);
    let anchor_first = (anchor_ix, selection.anchor.offset) <= (focus_ix, selection.focus.offset);
    if anchor_first {
        SelectionBounds {
            start: selection.anchor,
            end: selection.focus,
        }
    } else {
        SelectionBounds {
            start: selection.focus,
            end: selection.anchor,
        }
    }
}

fn clamp_offset(content: &ContentState, point: &Point) -> Option<Point> {
    let block = content.block_for_key(&point.key)?;
    Some(Point::new(
        point.key.clone(),
        clamp_to_char_boundary(block.text(), point.offset),
    ))
}

/// Snaps offsets into their block. An anchor whose block is gone moves to the
/// start of the first block; a focus whose block is gone collapses onto the
/// anchor.
pub fn clamp_selection(content: &ContentState, selection: &SelectionState) -> SelectionState {
    let anchor = clamp_offset(content, &selection.anchor).unwrap_or_else(|| {
        tracing::warn!(key = %selection.anchor.key, "selection anchor points at a missing block");
        content.selection_at_start().anchor
    });
    let focus = clamp_offset(content, &selection.focus).unwrap_or_else(|| {
        tracing::warn!(key = %selection.focus.key, "selection focus points at a missing block");
        anchor.clone()
    });
    SelectionState {
        anchor,
        focus,
        is_backward: selection.is_backward,
        has_focus: selection.has_focus,
    }
}

/// Blocks from the selection start block through the end block, inclusive.
pub fn selected_blocks(state: &EditorState) -> Vec<&ContentBlock> {
    let content = state.content();
    let bounds = selection_bounds(content, state.selection());
    let start = content.index_of(&bounds.start.key).unwrap_or(0);
    let end = content.index_of(&bounds.end.key).unwrap_or(start);
    content.blocks().skip(start).take(end + 1 - start).collect()
}

pub fn selected_text(state: &EditorState) -> String {
    let bounds = selection_bounds(state.content(), state.selection());
    let blocks = selected_blocks(state);
    let last = blocks.len().saturating_sub(1);
    let mut out = String::new();
    for (ix, block) in blocks.iter().enumerate() {
        let from = if ix == 0 { bounds.start.offset } else { 0 };
        let to = if ix == last {
            bounds.end.offset
        } else {
            block.len()
        };
        let text = block.text();
        let from = clamp_to_char_boundary(text, from);
        let to = clamp_to_char_boundary(text, to).max(from);
        out.push_str(&text[from..to]);
    }
    out
}

/// The shared block type of the selected blocks, if they all agree.
pub fn selected_blocks_type(state: &EditorState) -> Option<BlockType> {
    let blocks = selected_blocks(state);
    let first = blocks.first()?.block_type();
    blocks
        .iter()
        .all(|block| block.block_type() == first)
        .then_some(first)
}

/// The first selected block.
pub fn selected_block(state: &EditorState) -> Option<&ContentBlock> {
    let bounds = selection_bounds(state.content(), state.selection());
    state.content().block_for_key(&bounds.start.key)
}

/// The block preceding the first selected block.
pub fn block_before_selection(state: &EditorState) -> Option<&ContentBlock> {
    let bounds = selection_bounds(state.content(), state.selection());
    state.content().block_before(&bounds.start.key)
}

pub fn all_blocks(state: &EditorState) -> Vec<&ContentBlock> {
    state.content().blocks().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAt {
    pub word: String,
    pub begin: usize,
    pub end: usize,
}

static TRAILING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+$").expect("trailing word pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s").expect("whitespace pattern is valid"));

/// The whitespace-delimited word around `position`.
///
/// The left part includes the character at `position` when it is not
/// whitespace; the right part stops at the first whitespace at or after it.
pub fn word_at(text: &str, position: usize) -> WordAt {
    let pos = clamp_to_char_boundary(text, position);
    let left_end = match text[pos..].chars().next() {
        Some(ch) if !ch.is_whitespace() => pos + ch.len_utf8(),
        _ => pos,
    };
    let begin = TRAILING_WORD
        .find(&text[..left_end])
        .map(|m| m.start())
        .unwrap_or(left_end);
    let end = WHITESPACE
        .find(&text[pos..])
        .map(|m| pos + m.start())
        .unwrap_or(text.len())
        .max(begin);
    WordAt {
        word: text[begin..end].to_string(),
        begin,
        end,
    }
}
