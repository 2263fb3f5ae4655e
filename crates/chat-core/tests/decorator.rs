use manos_chat_core::{
    BlockKey, BlockType, CompositeDecorator, ContentBlock, DecoratorStrategy, EMOJI_SHORTCODE,
    EditorConfig, HASHTAG, StyledText,
};
use regex::Regex;

fn block(text: &str) -> ContentBlock {
    ContentBlock::new(BlockKey::new("b"), BlockType::Unstyled, StyledText::plain(text))
}

#[test]
fn hashtags_include_hangul_and_hebrew() {
    let strategy = DecoratorStrategy::hashtag();
    let text = "#rust #러스트 #שלום # alone";
    let found: Vec<_> = strategy
        .find_ranges(text)
        .into_iter()
        .map(|range| &text[range])
        .collect();
    assert_eq!(found, vec!["#rust", "#러스트", "#שלום"]);
}

#[test]
fn skin_tone_shortcodes_match_as_one() {
    let strategy = DecoratorStrategy::emoji_shortcode();
    let text = "nice :thumbsup::skin-tone-3: and :tada:";
    let found: Vec<_> = strategy
        .find_ranges(text)
        .into_iter()
        .map(|range| &text[range])
        .collect();
    assert_eq!(found, vec![":thumbsup::skin-tone-3:", ":tada:"]);
}

#[test]
fn config_selects_the_strategies() {
    let decorator = CompositeDecorator::from_config(&EditorConfig::default()).unwrap();
    let names: Vec<_> = decorator.strategies().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec![HASHTAG]);

    let config = EditorConfig {
        decorate_hashtags: false,
        ..EditorConfig::default()
    };
    assert!(CompositeDecorator::from_config(&config).is_none());
}

#[test]
fn earlier_strategies_claim_text_first() {
    let decorator = CompositeDecorator::new(vec![
        DecoratorStrategy::hashtag(),
        DecoratorStrategy::emoji_shortcode(),
        DecoratorStrategy::new("word", Regex::new(r"\w+").unwrap()),
    ]);
    let decorations = decorator.decorations(&block("#abc def :smile:"));
    let found: Vec<_> = decorations
        .iter()
        .map(|d| (d.strategy.as_str(), d.range.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            (HASHTAG, 0..4),
            ("word", 5..8),
            (EMOJI_SHORTCODE, 9..16),
        ]
    );
}
