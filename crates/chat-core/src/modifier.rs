//! Pure content transforms. Each takes a content snapshot and a selection and
//! returns new content whose `selection_after` is where the caret lands.

use crate::document::{
    BlockFragment, BlockKey, BlockType, ContentBlock, ContentState, EntityKey, InlineStyle,
    StyleSet, StyledText,
};
use crate::selection::{Point, SelectionBounds, SelectionState, selection_bounds};

pub fn remove_range(content: &ContentState, selection: &SelectionState) -> ContentState {
    let SelectionBounds { start, end } = selection_bounds(content, selection);
    let mut next = content.clone();
    let (Some(start_block), Some(end_block)) = (
        content.block_for_key(&start.key),
        content.block_for_key(&end.key),
    ) else {
        return next;
    };

    if start.key == end.key {
        if start.offset < end.offset {
            let text = start_block
                .styled()
                .splice(start.offset..end.offset, &StyledText::default());
            let mut block = start_block.with_content(text);
            if block.is_atomic() && block.is_empty() {
                block = block.with_type(BlockType::Unstyled);
            }
            next.replace_block(block);
        }
        next.set_selection_after(SelectionState::collapsed(start));
        return next;
    }

    let start_ix = content.index_of(&start.key).unwrap_or(0);
    let end_ix = content.index_of(&end.key).unwrap_or(start_ix);
    let between: Vec<BlockKey> = content.block_keys()[start_ix + 1..end_ix].to_vec();

    let head = start_block.styled().slice(0..start.offset);
    let tail = end_block.styled().slice(end.offset..end_block.len());
    let head_keeps_atomic = start_block.is_atomic() && !head.is_empty();
    let tail_keeps_atomic = end_block.is_atomic() && !tail.is_empty();

    if head_keeps_atomic || tail_keeps_atomic {
        // An atomic block never absorbs text, so both ends stay separate.
        next.remove_blocks(&between);
        next.replace_block(start_block.with_content(head));
        next.replace_block(end_block.with_content(tail));
        let caret = if head_keeps_atomic {
            Point::new(end.key.clone(), 0)
        } else {
            start.clone()
        };
        next.set_selection_after(SelectionState::collapsed(caret));
        return next;
    }

    let merged_type = if start_block.is_atomic() {
        if end_block.is_atomic() {
            BlockType::Unstyled
        } else {
            end_block.block_type()
        }
    } else {
        start_block.block_type()
    };
    let mut removed = between;
    removed.push(end.key.clone());
    next.remove_blocks(&removed);
    next.replace_block(
        start_block
            .with_content(head.concat(&tail))
            .with_type(merged_type),
    );
    next.set_selection_after(SelectionState::collapsed(start));
    next
}

/// Removes the selected range and resolves where inserted text goes.
///
/// A caret inside an atomic block is moved into a fresh unstyled block next
/// to it, since atomic blocks never take text.
fn prepare_insertion(content: &ContentState, selection: &SelectionState) -> (ContentState, Point) {
    let mut next = if selection.is_collapsed() {
        content.clone()
    } else {
        remove_range(content, selection)
    };
    let point = selection_bounds(content, selection).start;
    let Some(block) = next.block_for_key(&point.key).cloned() else {
        return (next, point);
    };
    if !block.is_atomic() {
        return (next, point);
    }
    let key = next.generate_key();
    let fresh = ContentBlock::new(key.clone(), BlockType::Unstyled, StyledText::default());
    if point.offset == 0 {
        next.insert_blocks_before(block.key(), vec![fresh]);
    } else {
        next.insert_blocks_after(block.key(), vec![fresh]);
    }
    (next, Point::new(key, 0))
}

/// Inserts text at the start of the selection, leaving any selected text in
/// place after it.
pub fn insert_text(
    content: &ContentState,
    selection: &SelectionState,
    text: &str,
    style: StyleSet,
    entity: Option<EntityKey>,
) -> ContentState {
    let start = selection_bounds(content, selection).start;
    replace_text(content, &SelectionState::collapsed(start), text, style, entity)
}

/// Replaces the selected range with text; a caret is a plain insertion.
pub fn replace_text(
    content: &ContentState,
    selection: &SelectionState,
    text: &str,
    style: StyleSet,
    entity: Option<EntityKey>,
) -> ContentState {
    let (mut next, point) = prepare_insertion(content, selection);
    let Some(block) = next.block_for_key(&point.key).cloned() else {
        return next;
    };
    let inserted = StyledText::styled(text, style, entity);
    let offset = point.offset.min(block.len());
    let updated = block.styled().splice(offset..offset, &inserted);
    next.replace_block(block.with_content(updated));
    next.set_selection_after(SelectionState::caret(point.key, offset + text.len()));
    next
}

pub fn insert_soft_newline(
    content: &ContentState,
    selection: &SelectionState,
    style: StyleSet,
) -> ContentState {
    replace_text(content, selection, "\n", style, None)
}

/// Splits the caret block in two; the tail keeps the block type.
pub fn split_block(content: &ContentState, selection: &SelectionState) -> ContentState {
    let (mut next, point) = prepare_insertion(content, selection);
    let Some(block) = next.block_for_key(&point.key).cloned() else {
        return next;
    };
    let head = block.styled().slice(0..point.offset);
    let tail = block.styled().slice(point.offset..block.len());
    let key = next.generate_key();
    next.replace_block(block.with_content(head));
    next.insert_blocks_after(
        block.key(),
        vec![ContentBlock::new(key.clone(), block.block_type(), tail)],
    );
    next.set_selection_after(SelectionState::caret(key, 0));
    next
}

/// Places a fragment at the caret.
///
/// A single-block fragment is spliced into the caret block. A multi-block
/// fragment merges its first block into the head of the caret block and its
/// last block into the tail; the blocks in between are inserted whole. The
/// caret lands right after the inserted content.
pub fn replace_with_fragment(
    content: &ContentState,
    selection: &SelectionState,
    fragment: &[BlockFragment],
) -> ContentState {
    let (mut next, point) = prepare_insertion(content, selection);
    let (Some(first), Some(last)) = (fragment.first(), fragment.last()) else {
        next.set_selection_after(SelectionState::collapsed(point));
        return next;
    };
    let Some(target) = next.block_for_key(&point.key).cloned() else {
        return next;
    };
    let head = target.styled().slice(0..point.offset);
    let tail = target.styled().slice(point.offset..target.len());

    if fragment.len() == 1 {
        let block_type = if target.is_empty() {
            first.block_type
        } else {
            target.block_type()
        };
        let caret = head.len() + first.content.len();
        next.replace_block(
            target
                .with_content(head.concat(&first.content).concat(&tail))
                .with_type(block_type),
        );
        next.set_selection_after(SelectionState::caret(point.key, caret));
        return next;
    }

    let head_type = if head.is_empty() {
        first.block_type
    } else {
        target.block_type()
    };
    next.replace_block(
        target
            .with_content(head.concat(&first.content))
            .with_type(head_type),
    );
    let mut inserted = Vec::with_capacity(fragment.len() - 1);
    for block in &fragment[1..fragment.len() - 1] {
        let key = next.generate_key();
        inserted.push(ContentBlock::new(key, block.block_type, block.content.clone()));
    }
    let last_key = next.generate_key();
    inserted.push(ContentBlock::new(
        last_key.clone(),
        last.block_type,
        last.content.concat(&tail),
    ));
    next.insert_blocks_after(target.key(), inserted);
    next.set_selection_after(SelectionState::caret(last_key, last.content.len()));
    next
}

/// Sets the type of every block touched by the selection.
pub fn set_block_type(
    content: &ContentState,
    selection: &SelectionState,
    block_type: BlockType,
) -> ContentState {
    let mut next = content.clone();
    for block in blocks_in_range(content, selection) {
        next.replace_block(block.with_type(block_type));
    }
    next.set_selection_after(selection.clone());
    next
}

pub fn apply_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: InlineStyle,
) -> ContentState {
    map_range_styles(content, selection, |set| set.with(style))
}

pub fn remove_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: InlineStyle,
) -> ContentState {
    map_range_styles(content, selection, |set| set.without(style))
}

fn map_range_styles(
    content: &ContentState,
    selection: &SelectionState,
    f: impl Fn(&StyleSet) -> StyleSet,
) -> ContentState {
    let mut next = content.clone();
    for (block, range) in block_ranges(content, selection) {
        let styled = block.styled().map_styles(range, &f);
        next.replace_block(block.with_content(styled));
    }
    next.set_selection_after(selection.clone());
    next
}

/// Blocks covered by the selection together with the covered byte range of each.
pub fn block_ranges<'a>(
    content: &'a ContentState,
    selection: &SelectionState,
) -> Vec<(&'a ContentBlock, std::ops::Range<usize>)> {
    let bounds = selection_bounds(content, selection);
    let blocks = blocks_in_range(content, selection);
    let last = blocks.len().saturating_sub(1);
    blocks
        .into_iter()
        .enumerate()
        .map(|(ix, block)| {
            let from = if ix == 0 { bounds.start.offset } else { 0 };
            let to = if ix == last {
                bounds.end.offset
            } else {
                block.len()
            };
            (block, from..to.max(from))
        })
        .collect()
}

fn blocks_in_range<'a>(content: &'a ContentState, selection: &SelectionState) -> Vec<&'a ContentBlock> {
    let bounds = selection_bounds(content, selection);
    let start = content.index_of(&bounds.start.key).unwrap_or(0);
    let end = content.index_of(&bounds.end.key).unwrap_or(start);
    content.blocks().skip(start).take(end + 1 - start).collect()
}

/// Splits the caret block around a new atomic block carrying `entity`.
///
/// Afterwards the document holds the head of the split block (original type),
/// the atomic block, then the tail as an unstyled block with the caret at its
/// start.
pub fn insert_atomic_block(
    content: &ContentState,
    selection: &SelectionState,
    entity: EntityKey,
    character: &str,
) -> ContentState {
    let (mut next, point) = prepare_insertion(content, selection);
    let Some(target) = next.block_for_key(&point.key).cloned() else {
        return next;
    };
    let head = target.styled().slice(0..point.offset);
    let tail = target.styled().slice(point.offset..target.len());
    let atomic_key = next.generate_key();
    let after_key = next.generate_key();
    next.replace_block(target.with_content(head));
    next.insert_blocks_after(
        target.key(),
        vec![
            ContentBlock::new(
                atomic_key,
                BlockType::Atomic,
                StyledText::styled(character, StyleSet::new(), Some(entity)),
            ),
            ContentBlock::new(after_key.clone(), BlockType::Unstyled, tail),
        ],
    );
    next.set_selection_after(SelectionState::caret(after_key, 0));
    next
}

/// Drops a block; the caret goes to `caret` when it still exists.
pub fn remove_block(content: &ContentState, key: &BlockKey, caret: Option<Point>) -> ContentState {
    let mut next = content.clone();
    next.remove_block(key);
    let selection = match caret {
        Some(point) if next.block_for_key(&point.key).is_some() => SelectionState::collapsed(point),
        _ => next.selection_at_end(),
    };
    next.set_selection_after(selection);
    next
}

/// Turns a block into an empty unstyled block, keeping its key.
pub fn reset_block(content: &ContentState, key: &BlockKey) -> ContentState {
    let mut next = content.clone();
    if let Some(block) = content.block_for_key(key) {
        next.replace_block(
            block
                .with_content(StyledText::default())
                .with_type(BlockType::Unstyled),
        );
    }
    next.set_selection_after(SelectionState::caret(key.clone(), 0));
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret(content: &ContentState, block: usize, offset: usize) -> SelectionState {
        SelectionState::caret(content.block_keys()[block].clone(), offset)
    }

    #[test]
    fn remove_range_across_blocks_merges_ends() {
        let content = ContentState::from_text("hello\nworld");
        let keys = content.block_keys().to_vec();
        let selection = SelectionState::new(
            Point::new(keys[0].clone(), 2),
            Point::new(keys[1].clone(), 3),
            false,
        );
        let next = remove_range(&content, &selection);
        assert_eq!(next.plain_text(), "held");
        assert_eq!(next.selection_after(), &SelectionState::caret(keys[0].clone(), 2));
    }

    #[test]
    fn split_block_moves_tail_into_a_new_block() {
        let content = ContentState::from_text("hello");
        let next = split_block(&content, &caret(&content, 0, 2));
        assert_eq!(next.plain_text(), "he\nllo");
        let tail_key = next.block_keys()[1].clone();
        assert_eq!(next.selection_after(), &SelectionState::caret(tail_key, 0));
    }

    #[test]
    fn multi_block_fragment_merges_head_and_tail() {
        let content = ContentState::from_text("ab");
        let fragment = vec![
            BlockFragment::unstyled("1"),
            BlockFragment::unstyled("2"),
            BlockFragment::unstyled("3"),
        ];
        let next = replace_with_fragment(&content, &caret(&content, 0, 1), &fragment);
        assert_eq!(next.plain_text(), "a1\n2\n3b");
        let last = next.block_keys()[2].clone();
        assert_eq!(next.selection_after(), &SelectionState::caret(last, 1));
    }

    #[test]
    fn typing_at_an_atomic_block_goes_into_a_new_block() {
        let content = ContentState::from_text("x");
        let (content, entity) = content.create_entity(crate::document::Entity::emoji("a.png"));
        let content = insert_atomic_block(&content, &caret(&content, 0, 1), entity, " ");
        let atomic = caret(&content, 1, 1);
        let next = insert_text(&content, &atomic, "y", StyleSet::new(), None);
        assert_eq!(next.block_count(), 4);
        assert_eq!(next.block_at(1).map(|b| b.text()), Some(" "));
        assert_eq!(next.block_at(2).map(|b| b.text()), Some("y"));
    }
}
