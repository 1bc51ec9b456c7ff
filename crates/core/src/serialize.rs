//! Canonical markup rendering for tokens.
//!
//! Each [`Token`] renders itself through [`Display`](fmt::Display), so a token
//! stream can be written out piece by piece or collected with [`serialize`].
//! Attribute values are always double-quoted with exactly `&` and `"`
//! escaped. Text, references and comments come out as they went in.

use std::fmt::{self, Write};

use crate::token::{Attribute, Token};

impl fmt::Display for Attribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            f.write_str("=\"")?;
            write_escaped(f, value)?;
            f.write_char('"')?;
        }
        Ok(())
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartTag { name, attributes } => write_start_tag(f, name, attributes, false),
            Token::SelfClosingStart { name, attributes } => write_start_tag(f, name, attributes, true),
            Token::EndTag { name } => write!(f, "</{name}>"),
            Token::Text(raw) => f.write_str(raw),
            Token::EntityRef(name) => write!(f, "&{name};"),
            Token::CharRef(code) => write!(f, "&#{code};"),
            Token::Comment(raw) => write!(f, "<!--{raw}-->"),
            Token::Declaration(raw) => write!(f, "<!{raw}>"),
            Token::ProcessingInstruction(raw) => write!(f, "<?{raw}>"),
        }
    }
}

fn write_start_tag(f: &mut fmt::Formatter<'_>, name: &str, attributes: &[Attribute<'_>], self_closing: bool) -> fmt::Result {
    write!(f, "<{name}")?;
    for attribute in attributes {
        write!(f, " {attribute}")?;
    }
    if self_closing {
        f.write_str(" />")
    } else {
        f.write_char('>')
    }
}

fn write_escaped<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    let mut last = 0;
    for (i, ch) in value.char_indices() {
        let escaped = match ch {
            '&' => "&amp;",
            '"' => "&quot;",
            _ => continue,
        };
        out.write_str(&value[last..i])?;
        out.write_str(escaped)?;
        last = i + 1;
    }
    out.write_str(&value[last..])
}

/// Escapes `&` and `"` for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let _ = write_escaped(&mut out, value);
    out
}

/// Renders every token and concatenates the pieces without separators,
/// trimming surrounding whitespace from the result.
///
/// ```rust
/// use sitecarve_core::{Tokenizer, serialize};
///
/// let html = "<p class='note' hidden>a &amp; b</p>";
/// assert_eq!(serialize(Tokenizer::new(html)), r#"<p class="note" hidden>a &amp; b</p>"#);
/// ```
pub fn serialize<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut out = String::new();
    for token in tokens {
        let _ = write!(out, "{token}");
    }

    let trimmed = out.trim();
    if trimmed.len() == out.len() { out } else { trimmed.to_string() }
}
