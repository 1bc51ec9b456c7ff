//! Region capture over a token stream.
//!
//! [`Capture`] wraps any token iterator and yields only the tokens that lie
//! strictly inside the first element whose start tag satisfies a [`Trigger`].
//! The trigger element's own start and end tags are never yielded. Nesting is
//! tracked by generic open/close balance, so a `<div>` inside a `<div>` region
//! does not end capture early.

use std::str::FromStr;

use crate::token::{Attribute, Token, is_void_element};
use crate::{Result, SitecarveError};

/// Decides whether a start tag opens the region to capture.
///
/// Implemented for [`AttrMatch`], for slices of triggers (any of them
/// matching), and for functions and closures over the attribute list.
pub trait Trigger {
    fn matches(&self, attributes: &[Attribute<'_>]) -> bool;
}

impl<F> Trigger for F
where
    F: Fn(&[Attribute<'_>]) -> bool,
{
    fn matches(&self, attributes: &[Attribute<'_>]) -> bool {
        self(attributes)
    }
}

impl<T: Trigger> Trigger for [T] {
    fn matches(&self, attributes: &[Attribute<'_>]) -> bool {
        self.iter().any(|trigger| trigger.matches(attributes))
    }
}

/// Matches a start tag carrying `name="value"`.
///
/// When an attribute is repeated the last occurrence is the one compared, the
/// same answer a name-to-value map built from the tag would give.
///
/// ```rust
/// use sitecarve_core::AttrMatch;
///
/// let trigger: AttrMatch = "data-content-field=main-content".parse().unwrap();
/// assert_eq!(trigger.name, "data-content-field");
/// assert_eq!(trigger.value, "main-content");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    pub value: String,
}

impl AttrMatch {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into().to_ascii_lowercase(), value: value.into() }
    }

    /// Shorthand for an `id` match.
    pub fn id(value: impl Into<String>) -> Self {
        Self::new("id", value)
    }
}

impl Trigger for AttrMatch {
    fn matches(&self, attributes: &[Attribute<'_>]) -> bool {
        attributes
            .iter()
            .rev()
            .find(|attr| attr.name == self.name.as_str())
            .and_then(Attribute::value)
            == Some(self.value.as_str())
    }
}

impl FromStr for AttrMatch {
    type Err = SitecarveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                Ok(Self::new(name.trim(), value))
            }
            _ => Err(SitecarveError::InvalidTrigger(s.to_string())),
        }
    }
}

impl std::fmt::Display for AttrMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Where the capture machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// Looking for the trigger.
    #[default]
    Inactive,
    /// Inside the region; `depth` counts open tags since the trigger.
    Active { depth: usize },
    /// The region closed. Later matches are ignored.
    Finished,
}

/// Iterator adapter yielding the tokens inside the first triggered region.
///
/// ```rust
/// use sitecarve_core::{AttrMatch, Capture, Token, Tokenizer};
///
/// let html = r#"<div id="main"><p>hi</p></div><p>after</p>"#;
/// let trigger = AttrMatch::id("main");
/// let inside: Vec<Token> = Capture::new(Tokenizer::new(html), &trigger).collect();
/// assert_eq!(inside.len(), 3);
/// ```
pub struct Capture<'t, I, T: ?Sized> {
    tokens: I,
    trigger: &'t T,
    state: CaptureState,
    matched: bool,
}

impl<'a, 't, I, T> Capture<'t, I, T>
where
    I: Iterator<Item = Token<'a>>,
    T: Trigger + ?Sized,
{
    pub fn new(tokens: I, trigger: &'t T) -> Self {
        Self { tokens, trigger, state: CaptureState::Inactive, matched: false }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Whether the trigger has fired at any point so far.
    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Whether the region closed with its own end tag. False while still
    /// active, including after the input ran out mid-region.
    pub fn is_complete(&self) -> bool {
        self.state == CaptureState::Finished
    }
}

impl<'a, I, T> Iterator for Capture<'_, I, T>
where
    I: Iterator<Item = Token<'a>>,
    T: Trigger + ?Sized,
{
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = match self.state {
                CaptureState::Finished => return None,
                CaptureState::Inactive => {
                    if let Token::StartTag { attributes, .. } = self.tokens.next()?
                        && self.trigger.matches(&attributes)
                    {
                        self.state = CaptureState::Active { depth: 0 };
                        self.matched = true;
                    }
                    continue;
                }
                CaptureState::Active { depth } => depth,
            };

            let token = self.tokens.next()?;
            match &token {
                Token::StartTag { .. } => self.state = CaptureState::Active { depth: depth + 1 },
                Token::EndTag { name } if is_void_element(name) => continue,
                Token::EndTag { .. } if depth == 0 => {
                    self.state = CaptureState::Finished;
                    return None;
                }
                Token::EndTag { .. } => self.state = CaptureState::Active { depth: depth - 1 },
                _ => {}
            }
            return Some(token);
        }
    }
}
