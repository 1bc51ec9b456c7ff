//! Lazy HTML tokenizer.
//!
//! [`Tokenizer`] walks a markup string once, front to back, and yields
//! [`Token`]s covering the whole input in document order. It does not build a
//! tree and does not recover from malformed markup the way an HTML5 parser
//! would: anything it cannot read as a tag, comment or reference is yielded as
//! literal text and scanning continues after it.
//!
//! # Example
//!
//! ```rust
//! use sitecarve_core::{Token, Tokenizer};
//!
//! let tokens: Vec<Token> = Tokenizer::new("<p class=lead>Hi &amp; bye</p>").collect();
//! assert_eq!(tokens.len(), 5);
//! assert_eq!(tokens[0].tag_name(), Some("p"));
//! assert_eq!(tokens[2], Token::EntityRef("amp"));
//! ```

use std::borrow::Cow;
use std::iter::FusedIterator;

use crate::entities::decode_attribute_value;
use crate::token::{Attribute, Token, is_void_element};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Streaming tokenizer over a borrowed markup string.
///
/// Construct a new one to rescan the same input; tokenizers hold no state
/// beyond their position.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0, raw_text: None }
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn emit(&mut self, token: Token<'a>, len: usize) -> Option<Token<'a>> {
        self.pos += len;
        Some(token)
    }

    /// Text up to the next `<` or `&`, starting at least one byte in when the
    /// byte at the cursor is a markup character that failed to parse.
    fn scan_text(&mut self, skip_first: bool) -> Option<Token<'a>> {
        let rest = &self.input[self.pos..];
        let from = usize::from(skip_first);
        let len = rest[from..].find(['<', '&']).map_or(rest.len(), |i| i + from);
        self.emit(Token::Text(&rest[..len]), len)
    }

    fn scan_raw_text(&mut self, element: &'static str) -> Option<Token<'a>> {
        let rest = &self.input[self.pos..];
        let len = find_close_tag(rest, element).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.emit(Token::Text(&rest[..len]), len)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        if let Some(element) = self.raw_text.take()
            && let Some(text) = self.scan_raw_text(element)
        {
            return Some(text);
        }

        let rest = &self.input[self.pos..];
        let scanned = match rest.as_bytes()[0] {
            b'<' => scan_markup(rest),
            b'&' => scan_reference(rest),
            _ => return self.scan_text(false),
        };

        match scanned {
            Some((token, len)) => {
                if let Token::StartTag { name, .. } = &token {
                    self.raw_text = RAW_TEXT_ELEMENTS.iter().copied().find(|el| **el == **name);
                }
                self.emit(token, len)
            }
            None => self.scan_text(true),
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Convenience constructor for [`Tokenizer::new`].
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

/// Parses markup starting with `<`. Returns the token and its byte length, or
/// `None` when the text there is not well-formed enough to be a token.
fn scan_markup(rest: &str) -> Option<(Token<'_>, usize)> {
    if let Some(body) = rest.strip_prefix(COMMENT_START) {
        let end = body.find(COMMENT_END)?;
        return Some((Token::Comment(&body[..end]), COMMENT_START.len() + end + COMMENT_END.len()));
    }

    let bytes = rest.as_bytes();
    match bytes.get(1)? {
        b'!' => {
            let end = rest.find('>')?;
            Some((Token::Declaration(&rest[2..end]), end + 1))
        }
        b'?' => {
            let end = rest.find('>')?;
            Some((Token::ProcessingInstruction(&rest[2..end]), end + 1))
        }
        b'/' => scan_end_tag(rest),
        b if b.is_ascii_alphabetic() => scan_start_tag(rest),
        _ => None,
    }
}

fn scan_end_tag(rest: &str) -> Option<(Token<'_>, usize)> {
    let bytes = rest.as_bytes();
    if !bytes.get(2)?.is_ascii_alphabetic() {
        return None;
    }

    let name_end = scan_name(bytes, 2);
    let close = name_end + rest[name_end..].find('>')?;
    let name = lowercase(&rest[2..name_end]);

    Some((Token::EndTag { name }, close + 1))
}

fn scan_start_tag(rest: &str) -> Option<(Token<'_>, usize)> {
    let bytes = rest.as_bytes();
    let name_end = scan_name(bytes, 1);
    let name = lowercase(&rest[1..name_end]);

    let mut attributes = Vec::new();
    let mut i = name_end;
    let self_closing = loop {
        i = skip_whitespace(bytes, i);
        match *bytes.get(i)? {
            b'>' => {
                i += 1;
                break false;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                i += 2;
                break true;
            }
            b'/' => i += 1,
            _ => {
                let (attribute, next) = scan_attribute(rest, i)?;
                attributes.push(attribute);
                i = next;
            }
        }
    };

    let token = if self_closing || is_void_element(&name) {
        Token::SelfClosingStart { name, attributes }
    } else {
        Token::StartTag { name, attributes }
    };

    Some((token, i))
}

/// Reads one `name`, `name=value`, `name="value"` or `name='value'` starting
/// at `start`. Returns `None` on an unterminated quoted value.
fn scan_attribute(rest: &str, start: usize) -> Option<(Attribute<'_>, usize)> {
    let bytes = rest.as_bytes();

    let mut i = start + 1;
    while i < bytes.len() && !is_attribute_name_end(bytes[i]) {
        i += 1;
    }
    let name = lowercase(&rest[start..i]);

    let after_name = skip_whitespace(bytes, i);
    if bytes.get(after_name) != Some(&b'=') {
        return Some((Attribute { name, value: None }, i));
    }

    i = skip_whitespace(bytes, after_name + 1);
    let (raw, next) = match *bytes.get(i)? {
        quote @ (b'"' | b'\'') => {
            let close = i + 1 + rest[i + 1..].find(char::from(quote))?;
            (&rest[i + 1..close], close + 1)
        }
        _ => {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            (&rest[value_start..i], i)
        }
    };

    Some((Attribute { name, value: Some(decode_attribute_value(raw)) }, next))
}

/// Parses `&name;`, `&#NNN;` or `&#xHH;`. Anything else is literal text.
fn scan_reference(rest: &str) -> Option<(Token<'_>, usize)> {
    let bytes = rest.as_bytes();

    if bytes.get(1) == Some(&b'#') {
        let hex = matches!(bytes.get(2), Some(b'x' | b'X'));
        let digits_start = if hex { 3 } else { 2 };
        let mut i = digits_start;
        while i < bytes.len() && (if hex { bytes[i].is_ascii_hexdigit() } else { bytes[i].is_ascii_digit() }) {
            i += 1;
        }
        if i == digits_start || bytes.get(i) != Some(&b';') {
            return None;
        }
        return Some((Token::CharRef(&rest[2..i]), i + 1));
    }

    if !bytes.get(1)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = 2;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if bytes.get(i) != Some(&b';') {
        return None;
    }

    Some((Token::EntityRef(&rest[1..i]), i + 1))
}

/// Finds `</element` (case-insensitive) followed by a name boundary.
fn find_close_tag(haystack: &str, element: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut from = 0;

    while let Some(found) = haystack[from..].find("</") {
        let at = from + found;
        let name_start = at + 2;
        let name_end = name_start + element.len();
        if name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(element.as_bytes())
            && bytes.get(name_end).is_none_or(|b| b.is_ascii_whitespace() || matches!(b, b'>' | b'/'))
        {
            return Some(at);
        }
        from = name_start;
    }

    None
}

fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'/' | b'>') {
        i += 1;
    }
    i
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn is_attribute_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'/' | b'=' | b'>')
}

fn lowercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    fn start(name: &str, attributes: Vec<Attribute<'static>>) -> Token<'static> {
        Token::StartTag { name: Cow::Owned(name.to_string()), attributes }
    }

    fn end(name: &str) -> Token<'static> {
        Token::EndTag { name: Cow::Owned(name.to_string()) }
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(tokens("<p>hello</p>"), vec![start("p", vec![]), Token::Text("hello"), end("p")]);
    }

    #[test]
    fn test_attributes_preserve_order_and_kinds() {
        let result = tokens(r#"<input type="checkbox" checked data-x='a b' size=3>"#);
        assert_eq!(
            result,
            vec![Token::SelfClosingStart {
                name: "input".into(),
                attributes: vec![
                    Attribute::new("type", "checkbox"),
                    Attribute::boolean("checked"),
                    Attribute::new("data-x", "a b"),
                    Attribute::new("size", "3"),
                ],
            }]
        );
    }

    #[test]
    fn test_names_are_lowercased() {
        let result = tokens(r#"<DIV ID="Main">x</DIV>"#);
        assert_eq!(result[0], start("div", vec![Attribute::new("id", "Main")]));
        assert_eq!(result[2], end("div"));
    }

    #[test]
    fn test_self_closing_and_void() {
        assert!(matches!(&tokens("<br/>")[0], Token::SelfClosingStart { name, .. } if name == "br"));
        assert!(matches!(&tokens("<img src=\"a.png\">")[0], Token::SelfClosingStart { name, .. } if name == "img"));
        assert!(matches!(&tokens("<span />")[0], Token::SelfClosingStart { name, .. } if name == "span"));
    }

    #[test]
    fn test_unquoted_value_keeps_slash() {
        let result = tokens("<a href=/x/>go</a>");
        assert_eq!(result[0], start("a", vec![Attribute::new("href", "/x/")]));
    }

    #[test]
    fn test_quoted_value_may_contain_angle_brackets() {
        let result = tokens(r#"<a title="1 > 0">x</a>"#);
        assert_eq!(result[0], start("a", vec![Attribute::new("title", "1 > 0")]));
        assert_eq!(result[1], Token::Text("x"));
    }

    #[test]
    fn test_attribute_values_are_decoded() {
        let result = tokens(r#"<a href="/q?a=1&amp;b=2">x</a>"#);
        assert_eq!(result[0], start("a", vec![Attribute::new("href", "/q?a=1&b=2")]));
    }

    #[test]
    fn test_named_references_in_attributes_round_trip() {
        let result = tokens(r#"<a title="&copy; me &mdash; Bar&rsquo;s">x</a>"#);
        assert_eq!(result[0], start("a", vec![Attribute::new("title", "\u{a9} me \u{2014} Bar\u{2019}s")]));

        let html = crate::serialize(Tokenizer::new(r#"<a title="&copy; me">x</a>"#));
        assert_eq!(html, "<a title=\"\u{a9} me\">x</a>");
        assert!(!html.contains("&amp;copy;"));
    }

    #[test]
    fn test_references() {
        assert_eq!(
            tokens("a&nbsp;b&#169;c&#x1F600;"),
            vec![
                Token::Text("a"),
                Token::EntityRef("nbsp"),
                Token::Text("b"),
                Token::CharRef("169"),
                Token::Text("c"),
                Token::CharRef("x1F600"),
            ]
        );
    }

    #[test]
    fn test_comment_and_declarations() {
        assert_eq!(
            tokens("<!DOCTYPE html><!-- a <b> & c --><?xml version=\"1.0\"?>"),
            vec![
                Token::Declaration("DOCTYPE html"),
                Token::Comment(" a <b> & c "),
                Token::ProcessingInstruction("xml version=\"1.0\"?"),
            ]
        );
    }

    #[test]
    fn test_script_content_is_raw_text() {
        let result = tokens("<script>if (a < b && c) { x = '</div>'; }</script><p>");
        assert_eq!(result[1], Token::Text("if (a < b && c) { x = '</div>'; }"));
        assert_eq!(result[2], end("script"));
        assert_eq!(result[3], start("p", vec![]));
    }

    #[test]
    fn test_empty_style_element() {
        assert_eq!(tokens("<style></style>"), vec![start("style", vec![]), end("style")]);
    }

    #[rstest]
    #[case("a < b")]
    #[case("<div class=\"unterminated")]
    #[case("<!-- never closed")]
    #[case("fish & chips")]
    #[case("&amp without semicolon")]
    #[case("&#;")]
    #[case("</ >")]
    #[case("<3")]
    #[case("trailing <")]
    fn test_malformed_input_is_literal_text(#[case] input: &str) {
        let result = tokens(input);
        assert!(result.iter().all(|t| matches!(t, Token::Text(_))), "{result:?}");
        let joined: String = result
            .iter()
            .map(|t| match t {
                Token::Text(s) => *s,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let result = tokens("<p>héllo → wörld</p>");
        assert_eq!(result[1], Token::Text("héllo → wörld"));
    }

    #[test]
    fn test_offset_tracks_progress() {
        let mut tokenizer = Tokenizer::new("<b>x</b>");
        tokenizer.next();
        assert_eq!(tokenizer.offset(), 3);
        tokenizer.by_ref().for_each(drop);
        assert_eq!(tokenizer.offset(), 8);
        assert!(tokenizer.next().is_none());
    }
}
