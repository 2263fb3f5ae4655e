use manos_chat_core::{
    ContentState, DocumentValue, EditorError, EditorState, InlineStyle, Mention, RawContent,
    SelectionState, insert_custom_emoji, insert_mention, toggle_inline_style,
};
use serde_json::json;

fn sample_document() -> ContentState {
    let state = EditorState::create_with_text("hey @an");
    let key = state.content().block_keys()[0].clone();
    let state = state.force_selection(SelectionState::caret(key, 7));
    let state = insert_mention(&state, &Mention::new(7, "anna"));
    let state = insert_custom_emoji(&state, "https://cdn.example/wave.png");
    let first = state.content().block_keys()[0].clone();
    let state = state.force_selection(SelectionState::new(
        manos_chat_core::Point::new(first.clone(), 0),
        manos_chat_core::Point::new(first, 3),
        false,
    ));
    toggle_inline_style(&state, InlineStyle::Bold).content().clone()
}

fn raw(value: serde_json::Value) -> RawContent {
    serde_json::from_value(value).unwrap()
}

#[test]
fn documents_survive_json() {
    let content = sample_document();
    let json = DocumentValue::from_content(&content).to_json_pretty().unwrap();
    let restored = DocumentValue::from_json_str(&json)
        .unwrap()
        .into_content()
        .unwrap();
    assert_eq!(restored, content);
}

#[test]
fn raw_form_uses_the_wire_names() {
    let value = serde_json::to_value(DocumentValue::from_content(&sample_document())).unwrap();
    assert_eq!(value["schema"], "manos-chat");
    assert_eq!(value["version"], 1);

    let blocks = value["content"]["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["text"], "hey @anna ");
    assert_eq!(blocks[0]["type"], "unstyled");
    assert_eq!(
        blocks[0]["inlineStyleRanges"],
        json!([
            {"offset": 0, "length": 3, "style": "BOLD"},
            {"offset": 4, "length": 5, "style": "MENTION"}
        ])
    );
    assert_eq!(
        blocks[0]["entityRanges"],
        json!([{"offset": 4, "length": 5, "key": 0}])
    );
    assert_eq!(blocks[1]["type"], "atomic");

    let entities = &value["content"]["entityMap"];
    assert_eq!(entities["0"]["type"], "MENTION");
    assert_eq!(entities["0"]["mutability"], "IMMUTABLE");
    assert_eq!(entities["0"]["data"]["mention"]["name"], "anna");
    assert_eq!(entities["1"]["type"], "emoji");
    assert_eq!(entities["1"]["data"]["src"], "https://cdn.example/wave.png");
}

#[test]
fn sparse_entity_keys_are_renumbered() {
    let content = ContentState::from_raw(raw(json!({
        "blocks": [{
            "key": "a",
            "text": "@bo",
            "entityRanges": [{"offset": 0, "length": 3, "key": 42}]
        }],
        "entityMap": {
            "42": {"type": "MENTION", "data": {"mention": {"id": 1, "name": "bo"}}}
        }
    })))
    .unwrap();
    assert_eq!(content.entity_count(), 1);
    let key = content.first_block().unwrap().entity_at(0).unwrap();
    assert_eq!(key.index(), 0);
}

fn assert_invalid(value: serde_json::Value) {
    let err = ContentState::from_raw(raw(value)).unwrap_err();
    assert!(matches!(err, EditorError::InvalidRaw(_)), "{err}");
}

#[test]
fn empty_documents_are_rejected() {
    assert_invalid(json!({"blocks": []}));
}

#[test]
fn duplicate_block_keys_are_rejected() {
    assert_invalid(json!({
        "blocks": [{"key": "a", "text": "x"}, {"key": "a", "text": "y"}]
    }));
}

#[test]
fn ranges_must_fit_their_block() {
    assert_invalid(json!({
        "blocks": [{
            "key": "a",
            "text": "abc",
            "inlineStyleRanges": [{"offset": 2, "length": 5, "style": "BOLD"}]
        }]
    }));
    assert_invalid(json!({
        "blocks": [{
            "key": "a",
            "text": "é",
            "inlineStyleRanges": [{"offset": 0, "length": 1, "style": "BOLD"}]
        }]
    }));
}

#[test]
fn entity_references_must_resolve() {
    assert_invalid(json!({
        "blocks": [{
            "key": "a",
            "text": "abc",
            "entityRanges": [{"offset": 0, "length": 1, "key": 3}]
        }]
    }));
}

#[test]
fn entity_keys_must_be_numbers() {
    assert_invalid(json!({
        "blocks": [{"key": "a", "text": "abc"}],
        "entityMap": {"first": {"type": "emoji", "data": {"src": "x.png"}}}
    }));
}

#[test]
fn entity_data_must_match_its_type() {
    assert_invalid(json!({
        "blocks": [{"key": "a", "text": "abc"}],
        "entityMap": {"0": {"type": "MENTION", "data": {"src": "x.png"}}}
    }));
}
