use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::selection::SelectionState;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Unstyled,
    Blockquote,
    OrderedListItem,
    UnorderedListItem,
    CodeBlock,
    Atomic,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::Blockquote => "blockquote",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::CodeBlock => "code-block",
            BlockType::Atomic => "atomic",
        }
    }

    /// Block types that an empty block drops back to `unstyled` from on return.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            BlockType::Blockquote
                | BlockType::OrderedListItem
                | BlockType::UnorderedListItem
                | BlockType::CodeBlock
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unstyled" | "paragraph" => Ok(BlockType::Unstyled),
            "blockquote" => Ok(BlockType::Blockquote),
            "ordered-list-item" => Ok(BlockType::OrderedListItem),
            "unordered-list-item" => Ok(BlockType::UnorderedListItem),
            "code-block" => Ok(BlockType::CodeBlock),
            "atomic" => Ok(BlockType::Atomic),
            other => Err(EditorError::UnknownBlockType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Mention,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 6] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Strikethrough,
        InlineStyle::Code,
        InlineStyle::Mention,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Italic => "ITALIC",
            InlineStyle::Underline => "UNDERLINE",
            InlineStyle::Strikethrough => "STRIKETHROUGH",
            InlineStyle::Code => "CODE",
            InlineStyle::Mention => "MENTION",
        }
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InlineStyle {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InlineStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EditorError::UnknownInlineStyle(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSet(BTreeSet<InlineStyle>);

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(style: InlineStyle) -> Self {
        Self(BTreeSet::from([style]))
    }

    pub fn contains(&self, style: InlineStyle) -> bool {
        self.0.contains(&style)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = InlineStyle> + '_ {
        self.0.iter().copied()
    }

    pub fn with(&self, style: InlineStyle) -> Self {
        let mut next = self.clone();
        next.0.insert(style);
        next
    }

    pub fn without(&self, style: InlineStyle) -> Self {
        let mut next = self.clone();
        next.0.remove(&style);
        next
    }

    pub fn toggled(&self, style: InlineStyle) -> Self {
        if self.contains(style) {
            self.without(style)
        } else {
            self.with(style)
        }
    }
}

impl FromIterator<InlineStyle> for StyleSet {
    fn from_iter<T: IntoIterator<Item = InlineStyle>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u32);

impl EntityKey {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "emoji")]
    Emoji,
    #[serde(rename = "upload")]
    Upload,
    #[serde(rename = "MENTION")]
    Mention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityMutability {
    Mutable,
    #[default]
    Immutable,
    Segmented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub online: bool,
}

impl Mention {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: None,
            email: None,
            online: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    #[serde(default)]
    pub uploaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            uploaded: false,
            url: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityData {
    Mention { mention: Mention },
    Upload { files: Vec<UploadFile> },
    Emoji { src: String },
}

impl EntityData {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityData::Mention { .. } => EntityType::Mention,
            EntityData::Upload { .. } => EntityType::Upload,
            EntityData::Emoji { .. } => EntityType::Emoji,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    entity_type: EntityType,
    #[serde(default)]
    mutability: EntityMutability,
    data: EntityData,
}

impl Entity {
    pub fn emoji(src: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Emoji,
            mutability: EntityMutability::Immutable,
            data: EntityData::Emoji { src: src.into() },
        }
    }

    pub fn upload(files: Vec<UploadFile>) -> Self {
        Self {
            entity_type: EntityType::Upload,
            mutability: EntityMutability::Immutable,
            data: EntityData::Upload { files },
        }
    }

    pub fn mention(mention: Mention) -> Self {
        Self {
            entity_type: EntityType::Mention,
            mutability: EntityMutability::Immutable,
            data: EntityData::Mention { mention },
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn mutability(&self) -> EntityMutability {
        self.mutability
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.entity_type == self.data.entity_type()
    }
}

/// A run of consecutive bytes sharing one style set and entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRun {
    pub len: usize,
    pub style: StyleSet,
    pub entity: Option<EntityKey>,
}

/// Block text with run-length encoded per-character metadata.
///
/// Runs always cover the whole text, never have zero length and adjacent runs
/// never share both style and entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    text: String,
    runs: Vec<CharacterRun>,
}

impl StyledText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, StyleSet::new(), None)
    }

    pub fn styled(text: impl Into<String>, style: StyleSet, entity: Option<EntityKey>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![CharacterRun {
                len: text.len(),
                style,
                entity,
            }]
        };
        Self { text, runs }
    }

    pub(crate) fn from_runs(text: String, runs: Vec<CharacterRun>) -> Self {
        let mut out = Self {
            text,
            runs: Vec::with_capacity(runs.len()),
        };
        for run in runs {
            push_run(&mut out.runs, run);
        }
        debug_assert_eq!(
            out.runs.iter().map(|run| run.len).sum::<usize>(),
            out.text.len()
        );
        out
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn runs(&self) -> &[CharacterRun] {
        &self.runs
    }

    pub fn run_ranges(&self) -> impl Iterator<Item = (Range<usize>, &CharacterRun)> + '_ {
        let mut start = 0;
        self.runs.iter().map(move |run| {
            let range = start..start + run.len;
            start += run.len;
            (range, run)
        })
    }

    fn run_at(&self, offset: usize) -> Option<&CharacterRun> {
        self.run_ranges()
            .find(|(range, _)| range.contains(&offset))
            .map(|(_, run)| run)
    }

    /// Style of the character starting at `offset`; empty past the end.
    pub fn style_at(&self, offset: usize) -> StyleSet {
        self.run_at(offset)
            .map(|run| run.style.clone())
            .unwrap_or_default()
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.run_at(offset).and_then(|run| run.entity)
    }

    pub fn slice(&self, range: Range<usize>) -> StyledText {
        let start = clamp_to_char_boundary(&self.text, range.start);
        let end = clamp_to_char_boundary(&self.text, range.end).max(start);
        let mut runs = Vec::new();
        for (run_range, run) in self.run_ranges() {
            let lo = run_range.start.max(start);
            let hi = run_range.end.min(end);
            if lo < hi {
                runs.push(CharacterRun {
                    len: hi - lo,
                    ..run.clone()
                });
            }
        }
        StyledText {
            text: self.text[start..end].to_string(),
            runs,
        }
    }

    pub fn concat(&self, other: &StyledText) -> StyledText {
        let mut out = self.clone();
        out.text.push_str(&other.text);
        for run in &other.runs {
            push_run(&mut out.runs, run.clone());
        }
        out
    }

    pub fn splice(&self, range: Range<usize>, insert: &StyledText) -> StyledText {
        let start = clamp_to_char_boundary(&self.text, range.start);
        let end = clamp_to_char_boundary(&self.text, range.end).max(start);
        self.slice(0..start)
            .concat(insert)
            .concat(&self.slice(end..self.len()))
    }

    pub fn map_styles(&self, range: Range<usize>, f: impl Fn(&StyleSet) -> StyleSet) -> StyledText {
        let start = clamp_to_char_boundary(&self.text, range.start);
        let end = clamp_to_char_boundary(&self.text, range.end).max(start);
        let mut runs = Vec::with_capacity(self.runs.len() + 2);
        for (run_range, run) in self.run_ranges() {
            let cuts = [run_range.start, start, end, run_range.end];
            let mut points: Vec<usize> = cuts
                .into_iter()
                .filter(|p| *p >= run_range.start && *p <= run_range.end)
                .collect();
            points.sort_unstable();
            points.dedup();
            for pair in points.windows(2) {
                let (lo, hi) = (pair[0], pair[1]);
                let inside = lo >= start && hi <= end;
                runs.push(CharacterRun {
                    len: hi - lo,
                    style: if inside { f(&run.style) } else { run.style.clone() },
                    entity: run.entity,
                });
            }
        }
        StyledText::from_runs(self.text.clone(), runs)
    }

    /// True when the range is non-empty and every character in it carries `style`.
    pub fn every_char_has(&self, range: Range<usize>, style: InlineStyle) -> bool {
        if range.start >= range.end {
            return false;
        }
        self.run_ranges()
            .filter(|(run_range, _)| run_range.start < range.end && range.start < run_range.end)
            .all(|(_, run)| run.style.contains(style))
    }

    /// Maximal ranges carrying `style`, in offset order.
    pub fn style_ranges(&self, style: InlineStyle) -> Vec<Range<usize>> {
        let mut out: Vec<Range<usize>> = Vec::new();
        for (range, run) in self.run_ranges() {
            if !run.style.contains(style) {
                continue;
            }
            match out.last_mut() {
                Some(last) if last.end == range.start => last.end = range.end,
                _ => out.push(range),
            }
        }
        out
    }

    pub fn entity_ranges(&self) -> Vec<(Range<usize>, EntityKey)> {
        let mut out: Vec<(Range<usize>, EntityKey)> = Vec::new();
        for (range, run) in self.run_ranges() {
            let Some(entity) = run.entity else {
                continue;
            };
            match out.last_mut() {
                Some((last, key)) if *key == entity && last.end == range.start => {
                    last.end = range.end
                }
                _ => out.push((range, entity)),
            }
        }
        out
    }
}

fn push_run(runs: &mut Vec<CharacterRun>, run: CharacterRun) {
    if run.len == 0 {
        return;
    }
    if let Some(last) = runs.last_mut()
        && last.style == run.style
        && last.entity == run.entity
    {
        last.len += run.len;
        return;
    }
    runs.push(run);
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    key: BlockKey,
    block_type: BlockType,
    content: StyledText,
}

impl ContentBlock {
    pub fn new(key: BlockKey, block_type: BlockType, content: StyledText) -> Self {
        Self {
            key,
            block_type,
            content,
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn text(&self) -> &str {
        self.content.as_str()
    }

    pub fn styled(&self) -> &StyledText {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_atomic(&self) -> bool {
        self.block_type == BlockType::Atomic
    }

    pub fn style_at(&self, offset: usize) -> StyleSet {
        self.content.style_at(offset)
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.content.entity_at(offset)
    }

    pub fn with_type(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: StyledText) -> Self {
        Self {
            key: self.key.clone(),
            block_type: self.block_type,
            content,
        }
    }
}

/// A keyless block used for pasted or converted content before it is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFragment {
    pub block_type: BlockType,
    pub content: StyledText,
}

impl BlockFragment {
    pub fn new(block_type: BlockType, content: StyledText) -> Self {
        Self {
            block_type,
            content,
        }
    }

    pub fn unstyled(text: impl Into<String>) -> Self {
        Self::new(BlockType::Unstyled, StyledText::plain(text))
    }
}

/// Ordered blocks plus the append-only entity table.
///
/// Always holds at least one block. Blocks are shared between successive
/// states through `Arc`, so an edit only reallocates the blocks it touches.
#[derive(Debug, Clone)]
pub struct ContentState {
    order: Vec<BlockKey>,
    blocks: HashMap<BlockKey, Arc<ContentBlock>>,
    entities: Vec<Arc<Entity>>,
    next_key: u64,
    selection_after: SelectionState,
}

impl Default for ContentState {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares blocks and entities. `selection_after` is transient and ignored.
impl PartialEq for ContentState {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.entities == other.entities
            && self.order.iter().all(|key| {
                match (self.blocks.get(key), other.blocks.get(key)) {
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
                    _ => false,
                }
            })
    }
}

impl ContentState {
    pub fn new() -> Self {
        Self::from_fragment(Vec::new())
    }

    /// One unstyled block per line.
    pub fn from_text(text: &str) -> Self {
        Self::from_fragment(text.split('\n').map(BlockFragment::unstyled).collect())
    }

    pub fn from_fragment(fragment: Vec<BlockFragment>) -> Self {
        let mut content = Self {
            order: Vec::new(),
            blocks: HashMap::new(),
            entities: Vec::new(),
            next_key: 0,
            selection_after: SelectionState::caret(BlockKey::new(""), 0),
        };
        for block in fragment {
            let key = content.generate_key();
            content.push_block(ContentBlock::new(key, block.block_type, block.content));
        }
        content.ensure_block();
        content.selection_after = content.selection_at_start();
        content
    }

    pub(crate) fn from_parts(blocks: Vec<ContentBlock>, entities: Vec<Entity>) -> Self {
        let mut content = Self {
            order: Vec::new(),
            blocks: HashMap::new(),
            entities: entities.into_iter().map(Arc::new).collect(),
            next_key: 0,
            selection_after: SelectionState::caret(BlockKey::new(""), 0),
        };
        for block in blocks {
            content.push_block(block);
        }
        content.ensure_block();
        content.selection_after = content.selection_at_start();
        content
    }

    fn push_block(&mut self, block: ContentBlock) {
        let key = block.key().clone();
        if self.blocks.insert(key.clone(), Arc::new(block)).is_none() {
            self.order.push(key);
        }
    }

    fn ensure_block(&mut self) {
        if self.order.is_empty() {
            let key = self.generate_key();
            self.push_block(ContentBlock::new(
                key,
                BlockType::Unstyled,
                StyledText::default(),
            ));
        }
    }

    pub(crate) fn generate_key(&mut self) -> BlockKey {
        loop {
            let key = BlockKey::new(format!("b{:x}", self.next_key));
            self.next_key += 1;
            if !self.blocks.contains_key(&key) {
                return key;
            }
        }
    }

    pub fn block_count(&self) -> usize {
        self.order.len()
    }

    pub fn block_keys(&self) -> &[BlockKey] {
        &self.order
    }

    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = &ContentBlock> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.blocks.get(key).map(Arc::as_ref))
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks.get(key).map(Arc::as_ref)
    }

    pub fn shared_block(&self, key: &BlockKey) -> Option<&Arc<ContentBlock>> {
        self.blocks.get(key)
    }

    pub fn index_of(&self, key: &BlockKey) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }

    pub fn block_at(&self, index: usize) -> Option<&ContentBlock> {
        self.order.get(index).and_then(|key| self.block_for_key(key))
    }

    pub fn first_block(&self) -> Option<&ContentBlock> {
        self.block_at(0)
    }

    pub fn last_block(&self) -> Option<&ContentBlock> {
        self.order.len().checked_sub(1).and_then(|ix| self.block_at(ix))
    }

    pub fn block_before(&self, key: &BlockKey) -> Option<&ContentBlock> {
        let ix = self.index_of(key)?;
        ix.checked_sub(1).and_then(|ix| self.block_at(ix))
    }

    pub fn block_after(&self, key: &BlockKey) -> Option<&ContentBlock> {
        let ix = self.index_of(key)?;
        self.block_at(ix + 1)
    }

    pub fn plain_text(&self) -> String {
        self.blocks()
            .map(ContentBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_text(&self) -> bool {
        self.block_count() > 1 || self.blocks().any(|block| !block.is_empty())
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key.index()).map(Arc::as_ref)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &Entity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(ix, entity)| (EntityKey::new(ix as u32), entity.as_ref()))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Appends an entity; existing keys stay valid.
    pub fn create_entity(&self, entity: Entity) -> (ContentState, EntityKey) {
        let mut next = self.clone();
        let key = EntityKey::new(next.entities.len() as u32);
        next.entities.push(Arc::new(entity));
        (next, key)
    }

    pub fn selection_after(&self) -> &SelectionState {
        &self.selection_after
    }

    pub fn with_selection_after(&self, selection: SelectionState) -> ContentState {
        let mut next = self.clone();
        next.selection_after = selection;
        next
    }

    pub(crate) fn set_selection_after(&mut self, selection: SelectionState) {
        self.selection_after = selection;
    }

    pub fn selection_at_start(&self) -> SelectionState {
        match self.first_block() {
            Some(block) => SelectionState::caret(block.key().clone(), 0),
            None => SelectionState::caret(BlockKey::new(""), 0),
        }
    }

    pub fn selection_at_end(&self) -> SelectionState {
        match self.last_block() {
            Some(block) => SelectionState::caret(block.key().clone(), block.len()),
            None => SelectionState::caret(BlockKey::new(""), 0),
        }
    }

    pub(crate) fn replace_block(&mut self, block: ContentBlock) {
        let key = block.key().clone();
        if let Some(slot) = self.blocks.get_mut(&key) {
            *slot = Arc::new(block);
        }
    }

    pub(crate) fn insert_blocks_after(&mut self, anchor: &BlockKey, blocks: Vec<ContentBlock>) {
        let at = self
            .index_of(anchor)
            .map(|ix| ix + 1)
            .unwrap_or(self.order.len());
        self.insert_blocks_at(at, blocks);
    }

    pub(crate) fn insert_blocks_before(&mut self, anchor: &BlockKey, blocks: Vec<ContentBlock>) {
        let at = self.index_of(anchor).unwrap_or(0);
        self.insert_blocks_at(at, blocks);
    }

    fn insert_blocks_at(&mut self, at: usize, blocks: Vec<ContentBlock>) {
        let mut keys = Vec::with_capacity(blocks.len());
        for block in blocks {
            let key = block.key().clone();
            if self.blocks.insert(key.clone(), Arc::new(block)).is_none() {
                keys.push(key);
            }
        }
        let tail = self.order.split_off(at.min(self.order.len()));
        self.order.extend(keys);
        self.order.extend(tail);
    }

    /// Removes a block; an emptied document gets a fresh empty unstyled block.
    pub(crate) fn remove_block(&mut self, key: &BlockKey) {
        if self.blocks.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
        self.ensure_block();
    }

    pub(crate) fn remove_blocks(&mut self, keys: &[BlockKey]) {
        for key in keys {
            self.blocks.remove(key);
        }
        self.order.retain(|k| !keys.contains(k));
        self.ensure_block();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_coalesce_on_concat() {
        let a = StyledText::styled("ab", StyleSet::of(InlineStyle::Bold), None);
        let b = StyledText::styled("cd", StyleSet::of(InlineStyle::Bold), None);
        let joined = a.concat(&b);
        assert_eq!(joined.runs().len(), 1);
        assert_eq!(joined.as_str(), "abcd");
    }

    #[test]
    fn map_styles_splits_runs_at_range_edges() {
        let text = StyledText::plain("hello");
        let bold = text.map_styles(1..3, |s| s.with(InlineStyle::Bold));
        assert_eq!(bold.runs().len(), 3);
        assert!(bold.style_at(1).contains(InlineStyle::Bold));
        assert!(!bold.style_at(3).contains(InlineStyle::Bold));
        assert_eq!(bold.style_ranges(InlineStyle::Bold), vec![1..3]);
    }

    #[test]
    fn slice_clamps_to_char_boundaries() {
        let text = StyledText::plain("h😀i");
        assert_eq!(text.slice(0..2).as_str(), "h");
        assert_eq!(text.slice(1..5).as_str(), "😀");
    }

    #[test]
    fn removing_the_last_block_leaves_an_empty_one() {
        let mut content = ContentState::from_text("only");
        let key = content.block_keys()[0].clone();
        content.remove_block(&key);
        assert_eq!(content.block_count(), 1);
        assert_eq!(content.plain_text(), "");
        assert_ne!(content.block_keys()[0], key);
    }
}
