use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language sentinel carried by code segments whose fence declares no language.
pub const AUTO_LANGUAGE: &str = "auto";

/// One unit of the structured render output.
///
/// Consumers match exhaustively: HTML segments are injected as-is, code
/// segments are handed to an interactive code component (or turned back into
/// static markup with
/// [`MarkdownRenderer::segment_html`](super::MarkdownRenderer::segment_html)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSegment {
    Html {
        markup: String,
    },
    Code {
        /// Raw text of the fenced block, without the closing newline.
        source: String,
        /// Declared language, or [`AUTO_LANGUAGE`].
        language: String,
        /// Zero-based position among the document's code segments.
        ordinal: usize,
    },
}

impl ContentSegment {
    pub fn html(markup: impl Into<String>) -> Self {
        Self::Html {
            markup: markup.into(),
        }
    }

    pub fn code(source: impl Into<String>, language: impl Into<String>, ordinal: usize) -> Self {
        Self::Code {
            source: source.into(),
            language: language.into(),
            ordinal,
        }
    }
}

/// A fenced code block captured while walking the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CapturedCodeBlock {
    pub(crate) source: String,
    pub(crate) language: Option<String>,
}

impl CapturedCodeBlock {
    pub(crate) fn language_or_auto(&self) -> &str {
        self.language.as_deref().unwrap_or(AUTO_LANGUAGE)
    }
}

/// Coerce an arbitrary JSON value into markdown source text.
///
/// Strings pass through untouched, `null` becomes empty and anything else is
/// rendered with its JSON representation.
pub fn coerce_markdown_source(value: &serde_json::Value) -> Cow<'_, str> {
    match value {
        serde_json::Value::String(text) => Cow::Borrowed(text.as_str()),
        serde_json::Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Errors raised inside the pipeline. They never cross the public render
/// functions, which log them and fall back to degraded output.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown formatting failed: {message}")]
    Markdown { message: String },
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
    #[error("code block placeholder {ordinal} missing from rendered document")]
    MissingPlaceholder { ordinal: usize },
}

/// Rendering surface consumed by the HTTP layer.
///
/// Implementations must be pure and deterministic apart from logging, and must
/// never fail: degraded output replaces errors.
pub trait MarkdownRender: Send + Sync {
    fn markdown_to_html(&self, source: &str) -> String;

    fn parse_markdown_parts(&self, source: &str) -> Vec<ContentSegment>;
}
