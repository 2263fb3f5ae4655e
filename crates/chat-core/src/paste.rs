use std::io::Cursor;

use tdoc::InlineStyle as HtmlStyle;
use tdoc::{ChecklistItem, Paragraph, Span, html};

use crate::document::{BlockFragment, BlockType, InlineStyle, StyleSet, StyledText};
use crate::error::EditorError;

/// The fragment a paste inserts: HTML when it yields any text, otherwise the
/// plain text. `None` when there is nothing to paste.
pub fn paste_fragment(text: &str, html: Option<&str>) -> Option<Vec<BlockFragment>> {
    if let Some(html) = html.filter(|html| !html.trim().is_empty()) {
        match fragment_from_html(html) {
            Ok(fragment) if fragment.iter().any(|block| !block.content.is_empty()) => {
                return Some(fragment);
            }
            Ok(_) => tracing::warn!("pasted HTML has no text, falling back to plain text"),
            Err(err) => tracing::warn!(%err, "falling back to plain text"),
        }
    }
    if text.is_empty() {
        return None;
    }
    Some(fragment_from_text(text))
}

/// One unstyled block per line.
pub fn fragment_from_text(text: &str) -> Vec<BlockFragment> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(BlockFragment::unstyled)
        .collect()
}

pub fn fragment_from_html(source: &str) -> Result<Vec<BlockFragment>, EditorError> {
    let document = html::parse(Cursor::new(source.as_bytes()))
        .map_err(|err| EditorError::Html(err.to_string()))?;
    let mut out = Vec::new();
    for paragraph in &document.paragraphs {
        append_paragraph(&mut out, paragraph);
    }
    Ok(out)
}

fn append_paragraph(out: &mut Vec<BlockFragment>, paragraph: &Paragraph) {
    match paragraph {
        Paragraph::Text { content }
        | Paragraph::Header1 { content }
        | Paragraph::Header2 { content }
        | Paragraph::Header3 { content } => {
            out.push(BlockFragment::new(BlockType::Unstyled, spans_to_text(content)));
        }
        Paragraph::CodeBlock { content } => {
            out.push(BlockFragment::new(
                BlockType::CodeBlock,
                StyledText::plain(plain_text(content)),
            ));
        }
        Paragraph::OrderedList { entries } => {
            for entry in entries {
                append_entry(out, BlockType::OrderedListItem, entry);
            }
        }
        Paragraph::UnorderedList { entries } => {
            for entry in entries {
                append_entry(out, BlockType::UnorderedListItem, entry);
            }
        }
        Paragraph::Checklist { items } => append_checklist(out, items),
        Paragraph::Quote { children } => {
            for child in children {
                if child.is_leaf() {
                    out.push(BlockFragment::new(
                        BlockType::Blockquote,
                        spans_to_text(child.content()),
                    ));
                } else {
                    append_paragraph(out, child);
                }
            }
        }
    }
}

/// Checklist items, nested ones included, flatten to unordered list items.
fn append_checklist(out: &mut Vec<BlockFragment>, items: &[ChecklistItem]) {
    for item in items {
        out.push(BlockFragment::new(
            BlockType::UnorderedListItem,
            spans_to_text(&item.content),
        ));
        append_checklist(out, &item.children);
    }
}

/// A list entry may hold several paragraphs. Its text paragraphs share one
/// block, separated by soft newlines; nested lists and quotes follow it.
fn append_entry(out: &mut Vec<BlockFragment>, block_type: BlockType, entry: &[Paragraph]) {
    let mut content = StyledText::default();
    let mut nested = Vec::new();
    for paragraph in entry {
        if !paragraph.is_leaf() {
            nested.push(paragraph);
            continue;
        }
        if !content.is_empty() {
            content = content.concat(&StyledText::plain("\n"));
        }
        content = content.concat(&spans_to_text(paragraph.content()));
    }
    out.push(BlockFragment::new(block_type, content));
    for paragraph in nested {
        append_paragraph(out, paragraph);
    }
}

fn spans_to_text(spans: &[Span]) -> StyledText {
    let mut out = StyledText::default();
    for span in spans {
        append_span(&mut out, span, &StyleSet::new());
    }
    out
}

fn append_span(out: &mut StyledText, span: &Span, active: &StyleSet) {
    let style = match map_style(&span.style) {
        Some(style) => active.with(style),
        None => active.clone(),
    };
    if !span.text.is_empty() {
        *out = out.concat(&StyledText::styled(span.text.as_str(), style.clone(), None));
    }
    for child in &span.children {
        append_span(out, child, &style);
    }
}

fn map_style(style: &HtmlStyle) -> Option<InlineStyle> {
    match style {
        HtmlStyle::Bold => Some(InlineStyle::Bold),
        HtmlStyle::Italic => Some(InlineStyle::Italic),
        HtmlStyle::Underline => Some(InlineStyle::Underline),
        HtmlStyle::Strike => Some(InlineStyle::Strikethrough),
        HtmlStyle::Code => Some(InlineStyle::Code),
        _ => None,
    }
}

fn plain_text(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        out.push_str(&span.text);
        out.push_str(&plain_text(&span.children));
    }
    out
}
