//! `{{TOKEN}}` markup recognized inside step text.
//!
//! Tokens are replaced by fixed glyphs before the text is handed to the
//! markdown formatter. Unknown tokens (and stray braces) are left as written.

use anyhow::Result;

/// A piece of step text.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment<'a> {
    Text(&'a str),
    /// Name between the braces, e.g. "CHECK BOX"
    Token(&'a str),
}

#[derive(Debug, thiserror::Error)]
#[error("Unable to parse markup in '{text}': {msg}")]
pub struct Error {
    msg: String,
    text: String,
}

/// Glyph for a token name, if it is one we know.
pub fn glyph(token: &str) -> Option<&'static str> {
    let glyph = match token {
        "CHECK" => "✓",
        "CHECKBOX" | "CHECK BOX" => "☐",
        "CHECKMARK" | "CHECK MARK" => "✓",
        "CHECKEDBOX" => "☑",
        "LEFT" => "←",
        "RIGHT" => "→",
        "CONNECT" => "→|←",
        "DISCONNECT" => "←|→",
        _ => return None,
    };
    Some(glyph)
}

/// Split text into plain runs and `{{TOKEN}}`s.
pub fn tokenize(text: &str) -> Result<Vec<Segment<'_>>> {
    use combine::EasyParser;
    grammar::segments()
        .easy_parse(text)
        .map(|(segments, _remainder)| segments)
        .map_err(|e| {
            Error {
                msg: format!("{}", e),
                text: text.to_owned(),
            }
            .into()
        })
}

/// Replace all known tokens in `text` with their glyphs.
pub fn replace_tokens(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for segment in tokenize(text)? {
        match segment {
            Segment::Text(s) => out.push_str(s),
            Segment::Token(name) => match glyph(name) {
                Some(g) => out.push_str(g),
                None => {
                    log::debug!("leaving unknown markup token {{{{{name}}}}} as written");
                    out.push_str("{{");
                    out.push_str(name);
                    out.push_str("}}");
                }
            },
        }
    }
    Ok(out)
}

mod grammar {
    use super::Segment;
    use combine::parser::char::{char, string};
    use combine::parser::range::recognize;
    use combine::{attempt, choice, eof, many, satisfy, skip_many1, Parser};

    p! {
        token_name() -> &'a str, {
            recognize(skip_many1(satisfy(|c: char| c.is_ascii_uppercase() || c == ' ')))
        }
    }

    p! {
        token() -> Segment<'a>, {
            attempt(string("{{").with(token_name()).skip(string("}}"))).map(Segment::Token)
        }
    }

    p! {
        plain() -> Segment<'a>, {
            recognize(skip_many1(satisfy(|c: char| c != '{'))).map(Segment::Text)
        }
    }

    // a brace that didn't start a token:
    p! {
        brace() -> Segment<'a>, {
            recognize(char('{')).map(Segment::Text)
        }
    }

    p! {
        segments() -> Vec<Segment<'a>>, {
            many(choice((token(), plain(), brace()))).skip(eof())
        }
    }
}
