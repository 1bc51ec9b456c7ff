//! Structural markup events produced by the [`Tokenizer`](crate::Tokenizer).
//!
//! Tokens borrow from the scanned input wherever the text is used as-is.
//! Names are lowercased and attribute values have their character references
//! decoded, so those fields are [`Cow`]s that only allocate when needed.

use std::borrow::Cow;

/// A single attribute on a start tag.
///
/// `value` is `None` for boolean attributes such as `<input disabled>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: Cow<'a, str>,
    pub value: Option<Cow<'a, str>>,
}

impl<'a> Attribute<'a> {
    /// Creates an attribute with a value.
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        Self { name: name.into(), value: Some(value.into()) }
    }

    /// Creates a boolean attribute (name only).
    pub fn boolean(name: impl Into<Cow<'a, str>>) -> Self {
        Self { name: name.into(), value: None }
    }

    /// Returns the value as a string slice, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A structural event in an HTML stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// An opening tag such as `<div class="x">`.
    StartTag { name: Cow<'a, str>, attributes: Vec<Attribute<'a>> },

    /// A closing tag such as `</div>`.
    EndTag { name: Cow<'a, str> },

    /// A tag written as `<br />`, or a void element such as `<img>`.
    SelfClosingStart { name: Cow<'a, str>, attributes: Vec<Attribute<'a>> },

    /// Raw text between tags, never decoded.
    Text(&'a str),

    /// A named reference such as `&amp;`, holding the name only.
    EntityRef(&'a str),

    /// A numeric reference such as `&#169;` or `&#xA9;`, holding what follows `#`.
    CharRef(&'a str),

    /// The inner text of `<!-- ... -->`.
    Comment(&'a str),

    /// The inner text of `<!...>`, e.g. `DOCTYPE html`.
    Declaration(&'a str),

    /// The inner text of `<?...>`.
    ProcessingInstruction(&'a str),
}

impl Token<'_> {
    /// Tag name for start, end and self-closing tags.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Token::StartTag { name, .. } | Token::EndTag { name } | Token::SelfClosingStart { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Attributes of start and self-closing tags; empty for everything else.
    pub fn attributes(&self) -> &[Attribute<'_>] {
        match self {
            Token::StartTag { attributes, .. } | Token::SelfClosingStart { attributes, .. } => attributes,
            _ => &[],
        }
    }
}

/// Elements that never have content and are therefore treated as self-closing
/// even when written without the trailing slash.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Whether `name` (lowercase) is a void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}
