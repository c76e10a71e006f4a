use homeblog::application::render::{
    MarkdownRender, MarkdownRenderer, RenderPipelineConfig, coerce_markdown_source,
    markdown_renderer,
};
use serde_json::json;

fn renderer() -> MarkdownRenderer {
    MarkdownRenderer::default()
}

#[test]
fn empty_input_renders_nothing() {
    assert_eq!(renderer().markdown_to_html(""), "");
}

#[test]
fn heading_renders() {
    let html = renderer().markdown_to_html("# Hi");
    assert!(html.contains("<h1>Hi</h1>"), "{html}");
}

#[test]
fn fenced_block_with_language_is_tagged_and_highlighted() {
    let html = renderer().markdown_to_html("```js\nconst x = 1;\n```\n");

    assert!(html.contains("<pre data-code-block=\"true\" data-language=\"js\">"));
    assert!(html.contains("<code class=\"hljs language-js\">"));
    assert!(html.contains("syntax-"), "expected highlighted spans: {html}");
    assert!(html.trim_end().ends_with("</code></pre>"));
}

#[test]
fn fenced_block_without_language_has_no_language_class() {
    let html = renderer().markdown_to_html("```\nplain words here\n```\n");

    assert!(html.contains("data-language=\"\""));
    assert!(html.contains("<code class=\"hljs\">plain words here</code>"));
    assert!(!html.contains("language-"));
}

#[test]
fn unknown_language_keeps_class_and_raw_text() {
    let html = renderer().markdown_to_html("```klingon\nqapla'\n```\n");

    assert!(html.contains("class=\"hljs language-klingon\""));
    assert!(html.contains("qapla'"));
}

#[test]
fn indented_code_is_rendered_as_code_block() {
    let html = renderer().markdown_to_html("para\n\n    indented line\n");

    assert!(html.contains("<p>para</p>"));
    assert!(html.contains("<pre data-code-block=\"true\" data-language=\"\">"));
    assert!(html.contains("indented line"));
}

#[test]
fn inline_code_uses_hljs_class() {
    let html = renderer().markdown_to_html("use `cargo build` here");
    assert!(html.contains("<code class=\"hljs\">cargo build</code>"), "{html}");
}

#[test]
fn raw_html_passes_through_by_default() {
    let html = renderer().markdown_to_html("<details><summary>More</summary>\n\nBody\n\n</details>\n");

    assert!(html.contains("<details><summary>More</summary>"));
    assert!(html.contains("</details>"));
}

#[test]
fn single_newlines_become_line_breaks() {
    let html = renderer().markdown_to_html("line one\nline two");
    assert!(html.contains("<br"), "{html}");
}

#[test]
fn gfm_extensions_are_enabled() {
    let html = renderer().markdown_to_html(
        "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n\nhttps://example.com\n",
    );

    assert!(html.contains("<table>"));
    assert!(html.contains("<del>gone</del>"));
    assert!(html.contains("type=\"checkbox\""));
    assert!(html.contains("<a href=\"https://example.com\">"));
}

#[test]
fn sanitizing_renderer_strips_event_handlers() {
    let renderer = MarkdownRenderer::new(RenderPipelineConfig {
        sanitize_html: true,
    });
    let html = renderer.markdown_to_html("<img src=\"a.png\" onerror=\"alert(1)\">\n\n```rust\nfn x() {}\n```\n");

    assert!(!html.contains("onerror"));
    assert!(html.contains("data-language=\"rust\""));
}

#[test]
fn malformed_markdown_still_renders_its_text() {
    let inputs = [
        "```",
        "````\nunclosed fence with `ticks`",
        "* [ ] \n  - > ```\n  > nested",
        "<div>\n<span>unbalanced",
        "[link](<unterminated",
        "| a |\n|--\n| b | c | d |",
        "\u{0}\u{fffd} odd bytes",
        "#######",
        "> > > > > deep quote with `code`",
    ];

    for input in inputs {
        let html = renderer().markdown_to_html(input);
        assert!(!html.is_empty(), "no output for {input:?}");
    }

    let html = renderer().markdown_to_html("* [ ] \n  - > ```\n  > nested");
    assert!(html.contains("nested"));
}

#[test]
fn deeply_nested_quotes_render_instead_of_exhausting_the_stack() {
    let source = format!("{}x", "> ".repeat(20_000));
    let html = renderer().markdown_to_html(&source);

    assert!(html.starts_with("<blockquote>"));
    assert!(html.contains("<p>x</p>"));
}

#[test]
fn shared_renderer_matches_fresh_instance() {
    let source = "Text\n\n```py\nprint('hi')\n```\n";
    assert_eq!(
        markdown_renderer().markdown_to_html(source),
        renderer().markdown_to_html(source)
    );
}

#[test]
fn non_string_content_is_coerced_before_rendering() {
    let number = json!(42);
    let object = json!({"a": 1});
    let renderer = renderer();

    assert!(
        renderer
            .markdown_to_html(&coerce_markdown_source(&number))
            .contains("<p>42</p>")
    );
    assert!(
        renderer
            .markdown_to_html(&coerce_markdown_source(&object))
            .contains("&quot;a&quot;")
    );
    assert_eq!(
        renderer.markdown_to_html(&coerce_markdown_source(&serde_json::Value::Null)),
        ""
    );
}
