#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse pasted HTML: {0}")]
    Html(String),
    #[error("invalid raw content: {0}")]
    InvalidRaw(String),
    #[error("unknown block type `{0}`")]
    UnknownBlockType(String),
    #[error("unknown inline style `{0}`")]
    UnknownInlineStyle(String),
    #[error("no pending upload at index {index} ({len} pending)")]
    PreviewOutOfRange { index: usize, len: usize },
}
