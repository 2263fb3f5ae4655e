use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use manos_chat_core::{
    BlockType, ChatEditor, DocumentValue, EditorHooks, EditorState, EmojiChoice, InlineStyle, Key,
    KeyEvent, Mention, Modifiers, UploadFile,
};
use serde::Deserialize;

/// A recorded session: the mention candidates and the events to replay.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub mentions: Vec<Mention>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub print_final: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Types each character, with a key-up after each one.
    Type { text: String },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Paste {
        #[serde(default)]
        text: String,
        #[serde(default)]
        html: Option<String>,
    },
    SelectMention { name: String },
    DismissSuggestions,
    Emoji {
        #[serde(default)]
        native: Option<String>,
        #[serde(default)]
        image_url: Option<String>,
    },
    ToggleStyle { style: String },
    ToggleBlock { block_type: String },
    Drop { files: Vec<UploadFile> },
    Uploaded { index: usize, url: String },
    RemoveDraft { index: usize },
    CommitUploads,
    Wait { ms: u64 },
}

/// Collects sent messages instead of posting them anywhere.
#[derive(Debug, Default)]
pub struct ScriptHooks {
    pub sent: Vec<DocumentValue>,
}

impl EditorHooks for ScriptHooks {
    fn send_message(&mut self, state: &EditorState) {
        tracing::info!(text = %state.plain_text(), "message sent");
        self.sent.push(DocumentValue::from_content(state.content()));
    }

    fn on_mention_selected(&mut self, mention: &Mention) {
        tracing::info!(id = mention.id, name = %mention.name, "mention selected");
    }

    fn on_drop_files(&mut self, files: Vec<UploadFile>) -> Vec<UploadFile> {
        files
            .into_iter()
            .filter(|file| file.size > 0)
            .collect()
    }
}

pub fn apply(editor: &mut ChatEditor<ScriptHooks>, mentions: &[Mention], step: &Step) -> Result<()> {
    tracing::debug!(?step, "replaying");
    match step {
        Step::Type { text } => {
            for ch in text.chars() {
                editor.before_input(ch.encode_utf8(&mut [0; 4]));
                editor.key_up();
            }
        }
        Step::Key { key, modifiers } => {
            editor.key_down(&KeyEvent {
                key: *key,
                modifiers: *modifiers,
            });
            editor.key_up();
        }
        Step::Paste { text, html } => {
            editor.paste(text, html.as_deref());
        }
        Step::SelectMention { name } => {
            let mention = mentions
                .iter()
                .find(|mention| &mention.name == name)
                .ok_or_else(|| anyhow!("no mention candidate named `{name}`"))?;
            editor.select_mention(mention);
        }
        Step::DismissSuggestions => editor.dismiss_suggestions(),
        Step::Emoji { native, image_url } => {
            let choice = match (native, image_url) {
                (Some(native), _) => EmojiChoice::Native(native.clone()),
                (None, Some(image_url)) => EmojiChoice::Custom {
                    image_url: image_url.clone(),
                },
                (None, None) => return Err(anyhow!("emoji step needs `native` or `image_url`")),
            };
            editor.add_emoji(&choice);
        }
        Step::ToggleStyle { style } => {
            let style = InlineStyle::from_str(style).context("invalid toggle_style step")?;
            editor.toggle_inline_style(style);
        }
        Step::ToggleBlock { block_type } => {
            let block_type = BlockType::from_str(block_type).context("invalid toggle_block step")?;
            editor.toggle_block_type(block_type);
        }
        Step::Drop { files } => editor.drop_files(files.clone()),
        Step::Uploaded { index, url } => editor.mark_uploaded(*index, url.as_str())?,
        Step::RemoveDraft { index } => {
            editor.remove_draft(*index)?;
        }
        Step::CommitUploads => {
            editor.commit_uploads();
        }
        Step::Wait { ms } => {
            std::thread::sleep(Duration::from_millis(*ms));
            editor.run_deferred(std::time::Instant::now());
        }
    }
    Ok(())
}
