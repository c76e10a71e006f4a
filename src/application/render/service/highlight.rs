use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};
use tracing::warn;

use crate::application::render::types::RenderError;

/// Class shared by every highlighted element, block or inline.
pub(crate) const HIGHLIGHT_BASE_CLASS: &str = "hljs";

/// How unhighlighted code text is written into the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlainText {
    /// Emit the text exactly as authored.
    Verbatim,
    /// Entity-escape the text; used when the surrounding document is sanitised.
    Escaped,
}

impl PlainText {
    pub(crate) fn apply(self, text: &str) -> String {
        match self {
            PlainText::Verbatim => text.to_string(),
            PlainText::Escaped => ammonia::clean_text(text),
        }
    }
}

/// Render a full `<pre><code>` block for one code block.
///
/// Never fails: a highlighting error is logged and the plain text is used.
pub(crate) fn code_block_html(
    language: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
    plain: PlainText,
) -> String {
    let body = match highlight_code(language, code, syntax_set, class_style) {
        Ok(Some(highlighted)) => highlighted,
        Ok(None) => plain.apply(code),
        Err(err) => {
            warn!(
                target = "homeblog::render::highlight",
                error = %err,
                "syntax highlighting failed; emitting plain code"
            );
            plain.apply(code)
        }
    };

    let language = language.unwrap_or_default();
    let code_class = if language.is_empty() {
        HIGHLIGHT_BASE_CLASS.to_string()
    } else {
        format!("{HIGHLIGHT_BASE_CLASS} language-{}", escape_attribute(language))
    };

    format!(
        "<pre data-code-block=\"true\" data-language=\"{}\"><code class=\"{code_class}\">{body}</code></pre>",
        escape_attribute(language)
    )
}

/// Render an inline code span. The content is written as-is.
pub(crate) fn inline_code_html(literal: &str, plain: PlainText) -> String {
    format!(
        "<code class=\"{HIGHLIGHT_BASE_CLASS}\">{}</code>",
        plain.apply(literal)
    )
}

/// Highlight `code` with the declared language when it is known, otherwise
/// with a syntax detected from the first line. `Ok(None)` means no syntax
/// applies and the caller should emit the plain text.
///
/// Detection only recognises first-line markers such as a shebang,
/// `<?php` or `<?xml`. There is no content-based guessing, so an untagged
/// snippet like `fn main() {}` stays unhighlighted.
pub(crate) fn highlight_code(
    language: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<Option<String>, RenderError> {
    let declared = language
        .filter(|lang| !lang.trim().is_empty())
        .and_then(|lang| find_syntax(syntax_set, lang));

    let syntax = match declared {
        Some(syntax) => syntax,
        None => {
            if code.trim().is_empty() {
                return Ok(None);
            }
            match detect_syntax(syntax_set, code) {
                Some(syntax) => syntax,
                None => return Ok(None),
            }
        }
    };

    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, *class_style);

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: syntax.name.clone(),
                message: err.to_string(),
            })?;
    }

    Ok(Some(generator.finalize()))
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.trim().to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token.trim()))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

fn detect_syntax<'a>(syntax_set: &'a SyntaxSet, code: &str) -> Option<&'a SyntaxReference> {
    let first_line = code.lines().find(|line| !line.trim().is_empty())?;
    syntax_set.find_syntax_by_first_line(first_line)
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
