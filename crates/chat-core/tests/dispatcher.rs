use manos_chat_core::{
    BlockType, CommandDispatcher, EditResult, EditorConfig, EditorHooks, EditorMode, EditorState,
    HandleValue, InlineStyle, Key, KeyEvent, NoopHooks, Point, SelectionState, command,
};

#[derive(Default)]
struct RecordingHooks {
    sent: Vec<String>,
    returns: usize,
    commands: Vec<String>,
    before_input: Vec<String>,
    pasted: usize,
}

impl EditorHooks for RecordingHooks {
    fn key_binding(&mut self, event: &KeyEvent) -> Option<String> {
        (event.key == Key::Char('k') && event.modifiers.ctrl).then(|| "insert-link".to_string())
    }

    fn handle_key_command(&mut self, command: &str, _state: &EditorState) -> EditResult {
        self.commands.push(command.to_string());
        EditResult::NotHandled
    }

    fn handle_return(&mut self, _event: &KeyEvent, _state: &EditorState) -> EditResult {
        self.returns += 1;
        EditResult::NotHandled
    }

    fn handle_before_input(&mut self, chars: &str, _state: &EditorState) -> EditResult {
        self.before_input.push(chars.to_string());
        EditResult::NotHandled
    }

    fn handle_pasted_text(
        &mut self,
        _text: &str,
        _html: Option<&str>,
        _state: &EditorState,
    ) -> EditResult {
        self.pasted += 1;
        EditResult::NotHandled
    }

    fn send_message(&mut self, state: &EditorState) {
        self.sent.push(state.plain_text());
    }
}

fn caret(state: &EditorState, block: usize, offset: usize) -> EditorState {
    let key = state.content().block_keys()[block].clone();
    state.force_selection(SelectionState::caret(key, offset))
}

fn range(state: &EditorState, block: usize, from: usize, to: usize) -> EditorState {
    let key = state.content().block_keys()[block].clone();
    state.force_selection(SelectionState::new(
        Point::new(key.clone(), from),
        Point::new(key, to),
        false,
    ))
}

#[test]
fn meta_z_always_means_editor_undo() {
    let dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let event = KeyEvent::char('z').with_meta();
    assert_eq!(
        dispatcher.classify(&event, &mut hooks).as_deref(),
        Some(command::EDITOR_UNDO)
    );
    let ctrl = KeyEvent::char('z').with_ctrl();
    assert_eq!(
        dispatcher.classify(&ctrl, &mut hooks).as_deref(),
        Some(command::UNDO)
    );
}

#[test]
fn host_bindings_are_consulted_last() {
    let dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    assert_eq!(
        dispatcher
            .classify(&KeyEvent::char('b').with_ctrl(), &mut hooks)
            .as_deref(),
        Some(command::BOLD)
    );
    assert_eq!(
        dispatcher
            .classify(&KeyEvent::char('k').with_ctrl(), &mut hooks)
            .as_deref(),
        Some("insert-link")
    );
    assert_eq!(dispatcher.classify(&KeyEvent::char('a'), &mut hooks), None);
}

#[test]
fn editor_undo_removes_the_anchor_block() {
    let dispatcher = CommandDispatcher::default();
    let state = caret(&EditorState::create_with_text("first\nsecond"), 0, 2);
    let result = dispatcher.handle_key_command(command::EDITOR_UNDO, &state, &mut NoopHooks);
    let next = result.into_state().expect("handled");
    assert_eq!(next.plain_text(), "second");
    assert_eq!(next.selection().anchor.offset, 6);
    assert!(next.selection().has_focus);
}

#[test]
fn editor_undo_never_leaves_an_empty_document() {
    let dispatcher = CommandDispatcher::default();
    let state = caret(&EditorState::create_with_text("only"), 0, 4);
    let next = dispatcher
        .handle_key_command(command::EDITOR_UNDO, &state, &mut NoopHooks)
        .into_state()
        .expect("handled");
    assert_eq!(next.content().block_count(), 1);
    assert_eq!(next.plain_text(), "");
    assert_eq!(next.current_block_type(), BlockType::Unstyled);
}

#[test]
fn built_in_commands_are_handled_before_the_host() {
    let dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let state = caret(&EditorState::create_with_text("abc"), 0, 3);
    let next = dispatcher
        .handle_key_command(command::BACKSPACE, &state, &mut hooks)
        .into_state()
        .expect("handled");
    assert_eq!(next.plain_text(), "ab");
    assert!(hooks.commands.is_empty());

    let result = dispatcher.handle_key_command("insert-link", &state, &mut hooks);
    assert_eq!(result.value(), HandleValue::NotHandled);
    assert_eq!(hooks.commands, vec!["insert-link"]);
}

#[test]
fn return_in_chat_mode_sends_and_schedules_a_clear() {
    let mut dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let state = caret(&EditorState::create_with_text("hello"), 0, 5);
    let result = dispatcher.handle_return(&KeyEvent::new(Key::Enter), &state, &mut hooks);

    assert!(result.is_handled());
    assert_eq!(result.into_state().unwrap().plain_text(), "hello");
    assert_eq!(hooks.sent, vec!["hello"]);
    assert_eq!(hooks.returns, 0);
    assert_eq!(dispatcher.deferred().len(), 1);
}

#[test]
fn shift_return_in_chat_mode_goes_to_the_host() {
    let mut dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let state = EditorState::create_with_text("hello");
    let result =
        dispatcher.handle_return(&KeyEvent::new(Key::Enter).with_shift(), &state, &mut hooks);
    assert!(!result.is_handled());
    assert!(hooks.sent.is_empty());
    assert_eq!(hooks.returns, 1);
    assert!(dispatcher.deferred().is_empty());
}

#[test]
fn return_in_editor_mode_goes_to_the_host() {
    let mut dispatcher = CommandDispatcher::new(&EditorConfig::editor_mode(EditorMode::Editor));
    let mut hooks = RecordingHooks::default();
    let state = EditorState::create_with_text("hello");
    let result = dispatcher.handle_return(&KeyEvent::new(Key::Enter), &state, &mut hooks);
    assert!(!result.is_handled());
    assert!(hooks.sent.is_empty());
    assert_eq!(hooks.returns, 1);
}

#[test]
fn paste_replaces_the_selection() {
    let dispatcher = CommandDispatcher::default();
    let state = range(&EditorState::create_with_text("hello world"), 0, 6, 11);
    let next = dispatcher
        .handle_pasted_text("X", None, &state, &mut NoopHooks)
        .into_state()
        .expect("handled");
    assert_eq!(next.plain_text(), "hello X");
    assert_eq!(next.selection().anchor.offset, 7);
    assert!(next.selection().is_collapsed());
    assert!(next.selection().has_focus);
}

#[test]
fn multi_line_paste_splits_the_caret_block() {
    let dispatcher = CommandDispatcher::default();
    let state = caret(&EditorState::create_with_text("ab"), 0, 1);
    let next = dispatcher
        .handle_pasted_text("1\n2\n3", None, &state, &mut NoopHooks)
        .into_state()
        .expect("handled");
    assert_eq!(next.plain_text(), "a1\n2\n3b");
    assert_eq!(next.content().block_count(), 3);
    let last = next.content().block_keys()[2].clone();
    assert_eq!(next.selection().anchor, Point::new(last, 1));
}

#[test]
fn empty_paste_is_left_to_the_host() {
    let dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let state = EditorState::create_with_text("abc");
    let result = dispatcher.handle_pasted_text("", None, &state, &mut hooks);
    assert!(!result.is_handled());
    assert_eq!(hooks.pasted, 1);
}

#[test]
fn at_sign_opens_suggestions_and_reaches_the_host() {
    let mut dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let state = caret(&EditorState::create_with_text("hi "), 0, 3);
    let result = dispatcher.handle_before_input("@", &state, &mut hooks);
    assert!(!result.is_handled());
    assert!(dispatcher.mentions().is_suggesting());
    assert_eq!(hooks.before_input, vec!["@"]);
}

#[test]
fn plain_characters_reach_the_host() {
    let mut dispatcher = CommandDispatcher::default();
    let mut hooks = RecordingHooks::default();
    let state = caret(&EditorState::create_with_text("hi"), 0, 2);
    assert!(!dispatcher.handle_before_input("x", &state, &mut hooks).is_handled());
    assert!(!dispatcher.handle_before_input(" ", &state, &mut hooks).is_handled());
    assert_eq!(hooks.before_input, vec!["x"]);
    assert!(!dispatcher.mentions().is_suggesting());
}

#[test]
fn html_paste_replaces_the_selection_with_styled_text() {
    let dispatcher = CommandDispatcher::default();
    let state = range(&EditorState::create_with_text("hello world"), 0, 6, 11);
    let next = dispatcher
        .handle_pasted_text("there", Some("<p><b>there</b></p>"), &state, &mut NoopHooks)
        .into_state()
        .expect("handled");
    assert_eq!(next.plain_text(), "hello there");
    assert_eq!(next.current_block_type(), BlockType::Unstyled);
    let block = next.content().first_block().unwrap();
    assert_eq!(block.styled().style_ranges(InlineStyle::Bold), vec![6..11]);
    assert_eq!(next.selection().anchor.offset, 11);
    assert!(next.selection().is_collapsed());
}

#[test]
fn html_list_paste_splits_into_list_blocks() {
    let dispatcher = CommandDispatcher::default();
    let state = caret(&EditorState::create_with_text(""), 0, 0);
    let next = dispatcher
        .handle_pasted_text(
            "milk\neggs",
            Some("<ul><li>milk</li><li>eggs</li></ul>"),
            &state,
            &mut NoopHooks,
        )
        .into_state()
        .expect("handled");
    let blocks: Vec<_> = next
        .content()
        .blocks()
        .map(|b| (b.block_type(), b.text().to_string()))
        .collect();
    assert_eq!(
        blocks,
        vec![
            (BlockType::UnorderedListItem, "milk".to_string()),
            (BlockType::UnorderedListItem, "eggs".to_string()),
        ]
    );
}
