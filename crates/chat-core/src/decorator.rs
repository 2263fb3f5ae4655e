use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::EditorConfig;
use crate::document::ContentBlock;

pub const HASHTAG: &str = "hashtag";
pub const EMOJI_SHORTCODE: &str = "emoji-shortcode";

static HASHTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#[\w\x{0590}-\x{05ff}\x{3131}-\x{318E}\x{AC00}-\x{D7A3}]+")
        .expect("hashtag pattern is valid")
});

static EMOJI_SHORTCODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":[a-zA-Z0-9_+\-]+::skin-tone-[2-6]:|:[a-zA-Z0-9_+\-]+:")
        .expect("emoji shortcode pattern is valid")
});

/// Calls `found` with the byte range of every match, left to right.
pub fn find_with_regex(regex: &Regex, text: &str, mut found: impl FnMut(usize, usize)) {
    for m in regex.find_iter(text) {
        if m.start() < m.end() {
            found(m.start(), m.end());
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecoratorStrategy {
    name: String,
    pattern: Regex,
}

impl DecoratorStrategy {
    pub fn new(name: impl Into<String>, pattern: Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }

    pub fn hashtag() -> Self {
        Self::new(HASHTAG, HASHTAG_REGEX.clone())
    }

    pub fn emoji_shortcode() -> Self {
        Self::new(EMOJI_SHORTCODE, EMOJI_SHORTCODE_REGEX.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn find_ranges(&self, text: &str) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        find_with_regex(&self.pattern, text, |start, end| out.push(start..end));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedRange {
    pub strategy: String,
    pub range: Range<usize>,
}

/// Ordered decorator strategies. Earlier strategies claim text first.
#[derive(Debug, Clone, Default)]
pub struct CompositeDecorator {
    strategies: Vec<DecoratorStrategy>,
}

impl CompositeDecorator {
    pub fn new(strategies: Vec<DecoratorStrategy>) -> Self {
        Self { strategies }
    }

    /// The built-in strategies the config enables, or `None` if it enables none.
    pub fn from_config(config: &EditorConfig) -> Option<Self> {
        let mut strategies = Vec::new();
        if config.decorate_hashtags {
            strategies.push(DecoratorStrategy::hashtag());
        }
        if config.decorate_emoji_shortcodes {
            strategies.push(DecoratorStrategy::emoji_shortcode());
        }
        (!strategies.is_empty()).then(|| Self::new(strategies))
    }

    pub fn strategies(&self) -> &[DecoratorStrategy] {
        &self.strategies
    }

    pub fn decorations(&self, block: &ContentBlock) -> Vec<DecoratedRange> {
        let text = block.text();
        let mut claimed: Vec<DecoratedRange> = Vec::new();
        for strategy in &self.strategies {
            for range in strategy.find_ranges(text) {
                let overlaps = claimed
                    .iter()
                    .any(|d| d.range.start < range.end && range.start < d.range.end);
                if !overlaps {
                    claimed.push(DecoratedRange {
                        strategy: strategy.name.clone(),
                        range,
                    });
                }
            }
        }
        claimed.sort_by_key(|d| d.range.start);
        claimed
    }
}
