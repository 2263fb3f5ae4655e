use manos_chat_core::{
    EditorState, EntityData, EntityType, InlineStyle, Mention, MentionActivation,
    MentionAutocomplete, SelectionState, filter_mentions, insert_characters, insert_mention,
    search_token,
};

fn caret_at_end(text: &str) -> EditorState {
    let state = EditorState::create_with_text(text);
    let key = state.content().block_keys()[0].clone();
    state.force_selection(SelectionState::caret(key, text.len()))
}

fn type_text(state: &EditorState, text: &str) -> EditorState {
    let mut state = state.clone();
    for ch in text.chars() {
        state = insert_characters(&state, &ch.to_string());
    }
    state
}

fn candidates() -> Vec<Mention> {
    vec![
        Mention::new(1, "john"),
        Mention::new(2, "joanna"),
        Mention::new(3, "Jo"),
        Mention::new(4, "mike"),
    ]
}

#[test]
fn confirming_a_mention_replaces_the_token() {
    let state = caret_at_end("hello @jo");
    let john = Mention::new(1, "john");
    let next = insert_mention(&state, &john);

    assert_eq!(next.plain_text(), "hello @john ");
    let block = next.content().first_block().unwrap();
    assert_eq!(block.styled().style_ranges(InlineStyle::Mention), vec![6..11]);
    assert!(!block.style_at(11).contains(InlineStyle::Mention));

    let entity_key = block.entity_at(6).expect("mention entity");
    assert_eq!(block.entity_at(10), Some(entity_key));
    assert_eq!(block.entity_at(11), None);
    let entity = next.content().entity(entity_key).unwrap();
    assert_eq!(entity.entity_type(), EntityType::Mention);
    assert_eq!(entity.data(), &EntityData::Mention { mention: john });

    assert_eq!(next.selection().anchor.offset, 12);
    assert!(next.selection().is_collapsed());
    assert!(next.selection().has_focus);
}

#[test]
fn no_trailing_space_when_text_follows_the_token() {
    let state = EditorState::create_with_text("hi @jo there");
    let key = state.content().block_keys()[0].clone();
    let state = state.force_selection(SelectionState::caret(key, 6));
    let next = insert_mention(&state, &Mention::new(1, "john"));
    assert_eq!(next.plain_text(), "hi @john there");
    assert_eq!(next.selection().anchor.offset, 8);
}

#[test]
fn search_token_follows_the_last_trigger() {
    assert_eq!(search_token(&caret_at_end("hello @jo")), "jo");
    assert_eq!(search_token(&caret_at_end("hello @")), "");
    assert_eq!(search_token(&caret_at_end("a@b@cd")), "cd");
    assert_eq!(search_token(&caret_at_end("@jo hello")), "");
}

#[test]
fn filtering_is_case_sensitive_and_keeps_host_order() {
    let list = candidates();
    let names: Vec<_> = filter_mentions(&list, "jo")
        .into_iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["john", "joanna"]);
    assert_eq!(filter_mentions(&list, "").len(), 4);
}

#[test]
fn at_sign_opens_suggestions_only_at_a_word_start() {
    let mut autocomplete = MentionAutocomplete::default();
    assert!(!autocomplete.on_trigger(&caret_at_end("mail")));
    assert!(!autocomplete.is_suggesting());

    assert!(autocomplete.on_trigger(&caret_at_end("")));
    assert!(autocomplete.is_suggesting());
    autocomplete.dismiss();

    assert!(autocomplete.on_trigger(&caret_at_end("hello ")));
    assert_eq!(autocomplete.search(), Some(""));
}

#[test]
fn anywhere_activation_ignores_the_word_start() {
    let mut autocomplete = MentionAutocomplete::new(MentionActivation::Anywhere);
    assert!(autocomplete.on_trigger(&caret_at_end("mail")));
}

#[test]
fn key_up_refines_the_search_while_suggesting() {
    let list = candidates();
    let mut autocomplete = MentionAutocomplete::default();
    let state = caret_at_end("hi ");
    autocomplete.on_trigger(&state);

    let state = type_text(&state, "@jo");
    autocomplete.on_key_up(&state);
    assert_eq!(autocomplete.search(), Some("jo"));
    assert_eq!(autocomplete.suggestions(&list).len(), 2);

    let state = type_text(&state, "a");
    autocomplete.on_key_up(&state);
    let names: Vec<_> = autocomplete
        .suggestions(&list)
        .into_iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["joanna"]);

    let next = autocomplete.confirm(&state, &list[1]);
    assert!(!autocomplete.is_suggesting());
    assert!(autocomplete.suggestions(&list).is_empty());
    assert_eq!(next.plain_text(), "hi @joanna ");
}

#[test]
fn key_up_is_ignored_without_a_session() {
    let mut autocomplete = MentionAutocomplete::default();
    autocomplete.on_key_up(&caret_at_end("@jo"));
    assert_eq!(autocomplete.search(), None);
}

#[test]
fn deleting_back_over_the_trigger_loses_the_anchor() {
    let mut autocomplete = MentionAutocomplete::default();
    let state = caret_at_end("hi ");
    autocomplete.on_trigger(&state);
    let typed = type_text(&state, "@j");
    assert!(!autocomplete.lost_anchor(&typed));
    assert!(autocomplete.lost_anchor(&state));
}

#[test]
fn typing_after_a_mention_is_not_mention_styled() {
    let state = caret_at_end("@jo");
    let next = insert_mention(&state, &Mention::new(1, "john"));
    let key = next.content().block_keys()[0].clone();
    let at_mention_end = next.force_selection(SelectionState::caret(key, 5));
    let typed = insert_characters(&at_mention_end, "x");
    let block = typed.content().first_block().unwrap();
    assert_eq!(block.text(), "@johnx ");
    assert!(!block.style_at(5).contains(InlineStyle::Mention));
    assert_eq!(block.entity_at(5), None);
}
