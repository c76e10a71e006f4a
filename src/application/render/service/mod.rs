mod config;
mod highlight;
mod rewrite;
mod segments;

use std::sync::Arc;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::{Lazy, OnceCell};
use syntect::{dumps::from_uncompressed_data, html::ClassStyle, parsing::SyntaxSet};
use thiserror::Error;
use tracing::warn;

use crate::application::render::types::{
    AUTO_LANGUAGE, ContentSegment, MarkdownRender, RenderError,
};

use config::{build_article_sanitizer, default_options};
use highlight::{HIGHLIGHT_BASE_CLASS, PlainText, code_block_html};
use rewrite::{PlaceholderMarker, rewrite_ast};
use segments::RenderedDocument;

/// Comrak-based markdown pipeline with Syntect highlighting.
///
/// Raw HTML is passed through untouched unless sanitisation is enabled, in
/// which case an Ammonia allow-list runs over the document before code blocks
/// are put back.
pub struct MarkdownRenderer {
    options: comrak::Options<'static>,
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
    sanitizer: Option<ammonia::Builder<'static>>,
}

impl MarkdownRenderer {
    pub fn new(config: RenderPipelineConfig) -> Self {
        let options = default_options();
        let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
        let syntax_set: SyntaxSet =
            from_uncompressed_data(syntax_bytes).expect("syntax pack must be valid");
        let class_style = ClassStyle::SpacedPrefixed { prefix: "syntax-" };
        let sanitizer = config.sanitize_html.then(build_article_sanitizer);

        Self {
            options,
            syntax_set,
            class_style,
            sanitizer,
        }
    }

    /// Render markdown to one HTML string, surfacing pipeline errors.
    pub fn try_markdown_to_html(&self, source: &str) -> Result<String, RenderError> {
        let document = self.render_document(source)?;
        document.to_html(|block| self.code_html(block.language.as_deref(), &block.source))
    }

    /// Render markdown to ordered segments, surfacing pipeline errors.
    pub fn try_parse_markdown_parts(&self, source: &str) -> Result<Vec<ContentSegment>, RenderError> {
        self.render_document(source)?.segments()
    }

    /// Highlighted markup for one segment, identical to what the single-string
    /// render emits at the same position.
    pub fn segment_html(&self, segment: &ContentSegment) -> String {
        match segment {
            ContentSegment::Html { markup } => markup.clone(),
            ContentSegment::Code {
                source, language, ..
            } => {
                let language = (language != AUTO_LANGUAGE).then_some(language.as_str());
                self.code_html(language, source)
            }
        }
    }

    /// Concatenate segments back into a single document.
    pub fn assemble_html(&self, segments: &[ContentSegment]) -> String {
        segments
            .iter()
            .map(|segment| self.segment_html(segment))
            .collect()
    }

    fn render_document(&self, source: &str) -> Result<RenderedDocument, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, source, &self.options);
        let marker = PlaceholderMarker::new();

        let outcome = rewrite_ast(
            root,
            &marker,
            &self.syntax_set,
            &self.class_style,
            self.plain_text(),
        )?;

        let html = render_html_stage(root, &self.options)?;
        let html = self.sanitize_stage(html);

        Ok(RenderedDocument {
            html,
            code_blocks: outcome.code_blocks,
            marker,
        })
    }

    fn sanitize_stage(&self, html: String) -> String {
        match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(&html).to_string(),
            None => html,
        }
    }

    fn code_html(&self, language: Option<&str>, source: &str) -> String {
        code_block_html(
            language,
            source,
            &self.syntax_set,
            &self.class_style,
            self.plain_text(),
        )
    }

    fn plain_text(&self) -> PlainText {
        if self.sanitizer.is_some() {
            PlainText::Escaped
        } else {
            PlainText::Verbatim
        }
    }

    fn verbatim_fallback(&self, source: &str) -> String {
        format!(
            "<pre><code class=\"{HIGHLIGHT_BASE_CLASS}\">{}</code></pre>",
            self.plain_text().apply(source)
        )
    }

    fn html_or_fallback(&self, source: &str, attempt: Result<String, RenderError>) -> String {
        match attempt {
            Ok(html) => html,
            Err(err) => {
                log_render_failure(&err, "markdown_to_html", "verbatim");
                self.verbatim_fallback(source)
            }
        }
    }

    fn parts_or_fallback(
        &self,
        source: &str,
        attempt: Result<Vec<ContentSegment>, RenderError>,
    ) -> Vec<ContentSegment> {
        let err = match attempt {
            Ok(segments) => return segments,
            Err(err) => err,
        };
        log_render_failure(&err, "parse_markdown_parts", "whole_document");

        match self.try_markdown_to_html(source) {
            Ok(html) => vec![ContentSegment::html(html)],
            Err(err) => {
                log_render_failure(&err, "parse_markdown_parts", "verbatim");
                vec![ContentSegment::html(self.verbatim_fallback(source))]
            }
        }
    }
}

impl MarkdownRender for MarkdownRenderer {
    fn markdown_to_html(&self, source: &str) -> String {
        if source.is_empty() {
            return String::new();
        }
        let attempt = self.try_markdown_to_html(source);
        self.html_or_fallback(source, attempt)
    }

    fn parse_markdown_parts(&self, source: &str) -> Vec<ContentSegment> {
        if source.is_empty() {
            return Vec::new();
        }
        let attempt = self.try_parse_markdown_parts(source);
        self.parts_or_fallback(source, attempt)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderPipelineConfig::default())
    }
}

static MARKDOWN_RENDERER: Lazy<Arc<MarkdownRenderer>> =
    Lazy::new(|| Arc::new(MarkdownRenderer::new(active_render_config())));

/// Access the shared renderer instance, initialised on first use.
pub fn markdown_renderer() -> Arc<MarkdownRenderer> {
    Arc::clone(&MARKDOWN_RENDERER)
}

#[derive(Debug, Clone, Default)]
pub struct RenderPipelineConfig {
    pub sanitize_html: bool,
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            sanitize_html: settings.sanitize_html,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("markdown renderer already configured")]
    AlreadyConfigured,
}

static RENDER_PIPELINE_CONFIG: OnceCell<RenderPipelineConfig> = OnceCell::new();

pub fn configure_markdown_renderer(config: RenderPipelineConfig) -> Result<(), RenderConfigError> {
    RENDER_PIPELINE_CONFIG
        .set(config)
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

fn active_render_config() -> RenderPipelineConfig {
    RENDER_PIPELINE_CONFIG.get().cloned().unwrap_or_default()
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}

fn log_render_failure(error: &RenderError, operation: &'static str, fallback: &'static str) {
    warn!(
        target = "homeblog::render",
        operation,
        fallback,
        error = %error,
        "markdown rendering degraded to fallback output"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_segmentation_falls_back_to_whole_document() {
        let renderer = MarkdownRenderer::default();
        let parts = renderer.parts_or_fallback(
            "# Title\n\ntext",
            Err(RenderError::MissingPlaceholder { ordinal: 0 }),
        );

        assert_eq!(parts.len(), 1);
        match &parts[0] {
            ContentSegment::Html { markup } => {
                assert!(markup.contains("<h1>Title</h1>"));
                assert!(markup.contains("<p>text</p>"));
            }
            other => panic!("expected html segment, got {other:?}"),
        }
    }

    #[test]
    fn failed_html_render_wraps_source_verbatim() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.html_or_fallback(
            "*raw* <b>",
            Err(RenderError::Markdown {
                message: "boom".into(),
            }),
        );

        assert_eq!(html, "<pre><code class=\"hljs\">*raw* <b></code></pre>");
    }

    #[test]
    fn sanitizing_renderer_escapes_fallback_and_strips_scripts() {
        let renderer = MarkdownRenderer::new(RenderPipelineConfig {
            sanitize_html: true,
        });

        let html = renderer.markdown_to_html("Hi<script>alert(1)</script>\n\n```\n<b>x</b>\n```");
        assert!(!html.contains("<script>"));
        assert!(html.contains("<pre data-code-block=\"true\""));
        assert!(!html.contains("<b>x</b>"));

        let fallback = renderer.verbatim_fallback("<b>");
        assert!(!fallback.contains("<b>"));
    }

    #[test]
    fn trusted_renderer_passes_raw_html_through() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.markdown_to_html("<div class='note'>\n  <p>hello</p>\n</div>\n");

        assert!(html.contains("<div class='note'>"));
        assert!(html.contains("<p>hello</p>"));
    }
}
