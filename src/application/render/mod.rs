//! Markdown rendering pipeline.
//!
//! The pipeline is pure: it accepts markdown input and produces HTML, either as
//! one string or as ordered segments that keep fenced code blocks apart from
//! the surrounding markup. Failures never reach callers; they are logged and
//! replaced by degraded but renderable output.

mod service;
mod types;

pub use service::{
    MarkdownRenderer, RenderConfigError, RenderPipelineConfig, configure_markdown_renderer,
    markdown_renderer,
};
pub use types::{
    AUTO_LANGUAGE, ContentSegment, MarkdownRender, RenderError, coerce_markdown_source,
};
