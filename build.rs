use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use syntect::dumps::dump_to_uncompressed_file;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, css_for_theme_with_class_style};
use two_face::syntax;

const HIGHLIGHT_THEME: &str = "base16-ocean.dark";

fn main() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(value) => PathBuf::from(value),
        Err(err) => panic!("OUT_DIR must be set by cargo: {err}"),
    };

    write_syntax_pack(&out_dir).expect("failed to write syntax pack");
    write_theme_css(&out_dir).expect("failed to write highlight theme css");

    println!("cargo:rerun-if-changed=build.rs");
}

fn write_theme_css(out_dir: &Path) -> Result<(), String> {
    let theme_set = ThemeSet::load_defaults();
    let theme = theme_set
        .themes
        .get(HIGHLIGHT_THEME)
        .ok_or_else(|| format!("theme `{HIGHLIGHT_THEME}` not found"))?;

    let css = css_for_theme_with_class_style(theme, ClassStyle::SpacedPrefixed { prefix: "syntax-" })
        .map_err(|err| err.to_string())?;

    let mut combined = String::with_capacity(css.len() + 128);
    combined.push_str(&format!(
        "/* --- Syntect theme ({HIGHLIGHT_THEME}), generated at build time --- */\n"
    ));
    combined.push_str(&css);
    combined.push('\n');

    let css_path = out_dir.join("highlight.css");
    fs::write(&css_path, combined)
        .map_err(|err| format!("failed to write {}: {err}", css_path.display()))?;

    println!("cargo:rustc-env=HIGHLIGHT_CSS_FILE={}", css_path.display());
    Ok(())
}

fn write_syntax_pack(out_dir: &Path) -> Result<(), String> {
    let syntax_set = syntax::extra_newlines();
    let pack_path = out_dir.join("syntaxes.packdump");
    dump_to_uncompressed_file(&syntax_set, &pack_path)
        .map_err(|err| format!("failed to encode syntax set: {err}"))?;

    println!("cargo:rustc-env=SYNTAX_PACK_FILE={}", pack_path.display());

    Ok(())
}
