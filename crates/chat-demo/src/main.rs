mod script;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use manos_chat_core::{ChatEditor, DocumentValue, EditorConfig};
use tracing_subscriber::EnvFilter;

use crate::script::{Script, ScriptHooks};

#[derive(Parser, Debug)]
#[command(name = "manos-chat-demo")]
#[command(about = "Replay a scripted chat editor session and print the sent messages", long_about = None)]
struct Args {
    /// Session script (JSON)
    #[arg(short = 's', long = "script", value_name = "FILE")]
    script: PathBuf,

    /// Editor configuration (JSON); chat mode defaults when omitted
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EditorConfig::from_json_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => EditorConfig::default(),
    };
    let raw = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse script {}", args.script.display()))?;

    let mut editor = ChatEditor::new(config, ScriptHooks::default());
    editor.set_mentions(script.mentions.clone());
    for (ix, step) in script.steps.iter().enumerate() {
        script::apply(&mut editor, &script.mentions, step)
            .with_context(|| format!("step {ix} failed"))?;
    }
    let flushed = editor.flush_deferred();
    tracing::debug!(flushed, "session finished");

    for message in &editor.hooks().sent {
        println!("{}", message.to_json_pretty()?);
    }
    if script.print_final {
        let value = DocumentValue::from_content(editor.state().content());
        println!("{}", value.to_json_pretty()?);
    }
    Ok(())
}

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
