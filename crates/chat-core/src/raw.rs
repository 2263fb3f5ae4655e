use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::document::{
    BlockKey, BlockType, CharacterRun, ContentBlock, ContentState, Entity, EntityKey, InlineStyle,
    StyleSet, StyledText,
};
use crate::error::EditorError;

const DEFAULT_SCHEMA: &str = "manos-chat";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: BlockKey,
    pub text: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
}

/// Plain-data form of a document, as sent with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<String, Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub content: RawContent,
}

impl DocumentValue {
    pub fn from_content(content: &ContentState) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            content: content.to_raw(),
        }
    }

    pub fn into_content(self) -> Result<ContentState, EditorError> {
        ContentState::from_raw(self.content)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ContentState {
    pub fn to_raw(&self) -> RawContent {
        let blocks = self
            .blocks()
            .map(|block| {
                let styled = block.styled();
                let mut inline_style_ranges = Vec::new();
                for style in InlineStyle::ALL {
                    for range in styled.style_ranges(style) {
                        inline_style_ranges.push(RawStyleRange {
                            offset: range.start,
                            length: range.len(),
                            style,
                        });
                    }
                }
                inline_style_ranges.sort_by_key(|range| range.offset);
                let entity_ranges = styled
                    .entity_ranges()
                    .into_iter()
                    .map(|(range, key)| RawEntityRange {
                        offset: range.start,
                        length: range.len(),
                        key: key.index() as u32,
                    })
                    .collect();
                RawBlock {
                    key: block.key().clone(),
                    text: block.text().to_string(),
                    block_type: block.block_type(),
                    inline_style_ranges,
                    entity_ranges,
                }
            })
            .collect();
        let entity_map = self
            .entities()
            .map(|(key, entity)| (key.to_string(), entity.clone()))
            .collect();
        RawContent { blocks, entity_map }
    }

    /// Rebuilds content from its raw form.
    ///
    /// Entity keys are renumbered densely in ascending order of their raw
    /// keys. Block keys must be unique, every range must lie inside its
    /// block on char boundaries, and every entity reference must resolve.
    pub fn from_raw(raw: RawContent) -> Result<ContentState, EditorError> {
        if raw.blocks.is_empty() {
            return Err(EditorError::InvalidRaw("document has no blocks".into()));
        }

        let mut numbered = Vec::with_capacity(raw.entity_map.len());
        for (key, entity) in raw.entity_map {
            let index: u32 = key
                .parse()
                .map_err(|_| EditorError::InvalidRaw(format!("entity key `{key}` is not a number")))?;
            if !entity.is_consistent() {
                return Err(EditorError::InvalidRaw(format!(
                    "entity `{key}` has data of a different type"
                )));
            }
            numbered.push((index, entity));
        }
        numbered.sort_by_key(|(index, _)| *index);
        let remap: HashMap<u32, EntityKey> = numbered
            .iter()
            .enumerate()
            .map(|(ix, (raw_key, _))| (*raw_key, EntityKey::new(ix as u32)))
            .collect();
        let entities = numbered.into_iter().map(|(_, entity)| entity).collect();

        let mut seen = HashSet::new();
        let mut blocks = Vec::with_capacity(raw.blocks.len());
        for block in raw.blocks {
            if !seen.insert(block.key.clone()) {
                return Err(EditorError::InvalidRaw(format!(
                    "duplicate block key `{}`",
                    block.key
                )));
            }
            let styled = styled_from_raw(&block, &remap)?;
            blocks.push(ContentBlock::new(block.key, block.block_type, styled));
        }
        Ok(ContentState::from_parts(blocks, entities))
    }
}

fn check_range(block: &RawBlock, offset: usize, length: usize) -> Result<(), EditorError> {
    let end = offset.checked_add(length).filter(|end| *end <= block.text.len());
    match end {
        Some(end) if block.text.is_char_boundary(offset) && block.text.is_char_boundary(end) => {
            Ok(())
        }
        _ => Err(EditorError::InvalidRaw(format!(
            "range {offset}+{length} does not fit block `{}`",
            block.key
        ))),
    }
}

fn styled_from_raw(
    block: &RawBlock,
    remap: &HashMap<u32, EntityKey>,
) -> Result<StyledText, EditorError> {
    let mut cuts = vec![0, block.text.len()];
    for range in &block.inline_style_ranges {
        check_range(block, range.offset, range.length)?;
        cuts.extend([range.offset, range.offset + range.length]);
    }
    let mut entity_ranges = Vec::with_capacity(block.entity_ranges.len());
    for range in &block.entity_ranges {
        check_range(block, range.offset, range.length)?;
        let key = remap.get(&range.key).copied().ok_or_else(|| {
            EditorError::InvalidRaw(format!(
                "block `{}` references missing entity {}",
                block.key, range.key
            ))
        })?;
        entity_ranges.push((range.offset..range.offset + range.length, key));
        cuts.extend([range.offset, range.offset + range.length]);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let runs = cuts
        .windows(2)
        .map(|pair| {
            let (lo, hi) = (pair[0], pair[1]);
            let style: StyleSet = block
                .inline_style_ranges
                .iter()
                .filter(|r| r.offset <= lo && hi <= r.offset + r.length)
                .map(|r| r.style)
                .collect();
            let entity = entity_ranges
                .iter()
                .find(|(range, _)| range.start <= lo && hi <= range.end)
                .map(|(_, key)| *key);
            CharacterRun {
                len: hi - lo,
                style,
                entity,
            }
        })
        .collect();
    Ok(StyledText::from_runs(block.text.clone(), runs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_style_ranges_split_runs() {
        let raw: RawContent = serde_json::from_value(serde_json::json!({
            "blocks": [{
                "key": "a",
                "text": "hello",
                "type": "unstyled",
                "inlineStyleRanges": [
                    {"offset": 0, "length": 3, "style": "BOLD"},
                    {"offset": 2, "length": 3, "style": "ITALIC"}
                ],
                "entityRanges": []
            }],
            "entityMap": {}
        }))
        .unwrap();
        let content = ContentState::from_raw(raw).unwrap();
        let block = content.first_block().unwrap();
        assert_eq!(block.styled().runs().len(), 3);
        assert!(block.style_at(2).contains(InlineStyle::Bold));
        assert!(block.style_at(2).contains(InlineStyle::Italic));
    }
}
