use ammonia::Builder as AmmoniaBuilder;
use comrak::options::{ListStyleType, Options};

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

/// Allow-list applied when sanitisation is switched on. It keeps ordinary
/// article markup plus the attributes the code-block wrapper relies on.
pub(crate) fn build_article_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    builder.add_tags(&[
        "figure",
        "figcaption",
        "input",
        "mark",
        "section",
        "u",
    ]);
    builder.add_generic_attributes(&["class", "id", "aria-hidden", "aria-label", "role"]);
    builder.add_generic_attribute_prefixes(&["data-footnote"]);

    builder.add_tag_attributes("pre", &["data-code-block", "data-language"]);
    builder.add_tag_attributes("code", &["data-language"]);
    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes("img", &["width", "height", "loading", "decoding"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    ext.description_lists = true;
    ext.underline = true;
    ext.cjk_friendly_emphasis = true;

    let render = &mut options.render;
    render.hardbreaks = true;
    render.tasklist_classes = true;
    render.list_style = ListStyleType::Dash;
    render.r#unsafe = true;
    render.sourcepos = false;
    render.gfm_quirks = true;
}

#[cfg(test)]
mod tests {
    use super::build_article_sanitizer;

    #[test]
    fn sanitizer_keeps_code_wrapper_attributes() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer
            .clean(
                "<pre data-code-block=\"true\" data-language=\"js\"><code class=\"hljs language-js\">x</code></pre>",
            )
            .to_string();

        assert!(html.contains("data-code-block=\"true\""));
        assert!(html.contains("data-language=\"js\""));
        assert!(html.contains("class=\"hljs language-js\""));
    }

    #[test]
    fn sanitizer_strips_scripts_and_handlers() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer
            .clean("<p onclick=\"steal()\">Hi</p><script>alert(1)</script>")
            .to_string();

        assert_eq!(html, "<p>Hi</p>");
    }

    #[test]
    fn sanitizer_preserves_underline() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer.clean("<p><u>Underline</u> text</p>").to_string();

        assert!(html.contains("<u>Underline</u>"));
    }
}
