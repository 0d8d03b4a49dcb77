use anyhow::{Context, Result};
use pulldown_cmark::{html, Options, Parser};

use syntax::markup;

/// Render step text as inline html: markup tokens become glyphs,
/// then markdown is converted. Empty text gives an empty string.
pub fn to_html(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    let text = markup::replace_tokens(text).context("while formatting step text")?;

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(&text, options);

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    Ok(unwrap_paragraph(out))
}

/// Render step text for plain-text output: tokens become glyphs, markdown is left as written.
pub fn to_plain(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    let text = markup::replace_tokens(text).context("while formatting step text")?;
    Ok(text.trim().to_owned())
}

// a single paragraph is unwrapped so it can sit inline next to a step number.
fn unwrap_paragraph(out: String) -> String {
    let trimmed = out.trim_end();
    match trimmed.strip_prefix("<p>").and_then(|s| s.strip_suffix("</p>")) {
        Some(inner) if !inner.contains("<p>") => inner.to_owned(),
        _ => out,
    }
}
