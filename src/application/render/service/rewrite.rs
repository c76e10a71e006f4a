use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use syntect::html::ClassStyle;
use syntect::parsing::SyntaxSet;
use uuid::Uuid;

use crate::application::render::types::{AUTO_LANGUAGE, CapturedCodeBlock, RenderError};

use super::highlight::{self, PlainText};

/// Per-render text marker standing in for fenced code blocks while the rest
/// of the document is formatted. The random component keeps authored text
/// from ever colliding with it.
#[derive(Debug, Clone)]
pub(crate) struct PlaceholderMarker {
    token: String,
}

impl PlaceholderMarker {
    pub(crate) fn new() -> Self {
        Self {
            token: format!("@@homeblog-code:{}", Uuid::new_v4().simple()),
        }
    }

    pub(crate) fn for_ordinal(&self, ordinal: usize) -> String {
        format!("{}:{ordinal}@@", self.token)
    }
}

pub(crate) struct RewriteOutcome {
    pub(crate) code_blocks: Vec<CapturedCodeBlock>,
}

/// Depth-first, document-order walk over `root` and every node below it.
///
/// The walk is iterative, so nesting depth is bounded only by the arena. The
/// visitor sees each node before its children, so rewriting a node's value in
/// place is safe as long as the replacement has no children.
pub(crate) fn visit_nodes<'a, F>(root: &'a AstNode<'a>, visit: &mut F) -> Result<(), RenderError>
where
    F: FnMut(&'a AstNode<'a>) -> Result<(), RenderError>,
{
    for node in root.descendants() {
        visit(node)?;
    }
    Ok(())
}

/// Rewrite the parsed document ready for HTML formatting.
///
/// Fenced code blocks are captured in document order and replaced by marker
/// blocks. Indented code blocks are highlighted in place, and inline code
/// spans become `<code class="hljs">` with their literal content.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    marker: &PlaceholderMarker,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
    plain: PlainText,
) -> Result<RewriteOutcome, RenderError> {
    let mut code_blocks = Vec::new();

    visit_nodes(root, &mut |node| {
        let replacement = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::CodeBlock(block) if block.fenced => {
                    let captured = capture_fenced_block(&block.info, &block.literal);
                    let literal = format!("{}\n", marker.for_ordinal(code_blocks.len()));
                    code_blocks.push(captured);
                    Some(NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 0,
                        literal,
                    }))
                }
                NodeValue::CodeBlock(block) => {
                    let source = strip_closing_newline(&block.literal);
                    let html =
                        highlight::code_block_html(None, source, syntax_set, class_style, plain);
                    Some(NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 0,
                        literal: format!("{html}\n"),
                    }))
                }
                NodeValue::Code(code) => Some(NodeValue::HtmlInline(highlight::inline_code_html(
                    &code.literal,
                    plain,
                ))),
                _ => None,
            }
        };

        if let Some(value) = replacement {
            node.data.borrow_mut().value = value;
        }
        Ok(())
    })?;

    Ok(RewriteOutcome { code_blocks })
}

fn capture_fenced_block(info: &str, literal: &str) -> CapturedCodeBlock {
    let language = info
        .split_whitespace()
        .next()
        .filter(|lang| !lang.is_empty() && *lang != AUTO_LANGUAGE)
        .map(str::to_string);

    CapturedCodeBlock {
        source: strip_closing_newline(literal).to_string(),
        language,
    }
}

fn strip_closing_newline(literal: &str) -> &str {
    literal
        .strip_suffix("\r\n")
        .or_else(|| literal.strip_suffix('\n'))
        .unwrap_or(literal)
}
