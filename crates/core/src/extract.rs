//! Single-region extraction.
//!
//! Ties the [`Tokenizer`], [`Capture`] and [`serialize`] stages together: one
//! call scans one document and returns the first triggered region as a
//! standalone fragment. No state is shared between calls, so documents can be
//! processed in parallel freely.

use serde::Serialize;
use tracing::debug;

use crate::capture::{Capture, Trigger};
use crate::serialize::serialize;
use crate::tokenizer::Tokenizer;

/// The captured content region of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Serialized inner markup of the matched element, trimmed. May be empty.
    pub content: String,
    /// False when the input ended before the region's closing tag.
    pub complete: bool,
    /// Number of tokens captured inside the region.
    pub token_count: usize,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Extracts the contents of the first element whose start tag satisfies
/// `trigger`.
///
/// Returns `None` when no start tag matched, and `Some` with a possibly empty
/// [`Region`] otherwise.
///
/// ```rust
/// use sitecarve_core::{AttrMatch, extract_region};
///
/// let html = r#"<body><div id="mainContent"><div>inner</div>more</div></body>"#;
/// let region = extract_region(html, &AttrMatch::id("mainContent")).unwrap();
/// assert_eq!(region.content, "<div>inner</div>more");
///
/// assert!(extract_region("<p>nothing</p>", &AttrMatch::id("mainContent")).is_none());
/// ```
pub fn extract_region<T>(html: &str, trigger: &T) -> Option<Region>
where
    T: Trigger + ?Sized,
{
    let mut capture = Capture::new(Tokenizer::new(html), trigger);
    let mut token_count = 0usize;
    let content = serialize(capture.by_ref().inspect(|_| token_count += 1));

    if !capture.matched() {
        debug!(bytes = html.len(), "no content region matched");
        return None;
    }

    let complete = capture.is_complete();
    if !complete {
        debug!(token_count, "content region ran to end of input without closing");
    }

    Some(Region { content, complete, token_count })
}

/// Extracts the first region and returns only its markup, or an empty string
/// when nothing matched.
pub fn extract_fragment<T>(html: &str, trigger: &T) -> String
where
    T: Trigger + ?Sized,
{
    extract_region(html, trigger).map(|region| region.content).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttrMatch;

    fn main_content() -> AttrMatch {
        AttrMatch::id("mainContent")
    }

    #[test]
    fn test_nested_same_name_tags() {
        let region = extract_region(r#"<div id="mainContent"><div>inner</div>more</div>"#, &main_content()).unwrap();
        assert_eq!(region.content, "<div>inner</div>more");
        assert!(region.complete);
        assert_eq!(region.token_count, 4);
    }

    #[test]
    fn test_self_closing_inside_region() {
        let region = extract_region(r#"<div id="mainContent"><img src="a.png" />text</div>"#, &main_content()).unwrap();
        assert_eq!(region.content, r#"<img src="a.png" />text"#);
    }

    #[test]
    fn test_not_found_is_distinct_from_empty() {
        assert!(extract_region("<div>x</div>", &main_content()).is_none());

        let empty = extract_region(r#"<div id="mainContent">   </div>"#, &main_content()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.complete);
    }

    #[test]
    fn test_unterminated_region() {
        let region = extract_region(r#"<div id="mainContent"><p>partial</p>tail"#, &main_content()).unwrap();
        assert_eq!(region.content, "<p>partial</p>tail");
        assert!(!region.complete);
    }

    #[test]
    fn test_attribute_escaping_through_capture() {
        let html = r#"<div id="mainContent"><a title='Tom & "Jerry" <ok>'>x</a></div>"#;
        assert_eq!(
            extract_fragment(html, &main_content()),
            r#"<a title="Tom &amp; &quot;Jerry&quot; <ok>">x</a>"#
        );
    }

    #[test]
    fn test_comment_preserved_verbatim() {
        let html = r#"<div id="mainContent"><!-- a < b & "c" --></div>"#;
        assert_eq!(extract_fragment(html, &main_content()), r#"<!-- a < b & "c" -->"#);
    }

    #[test]
    fn test_extract_fragment_defaults_to_empty() {
        assert_eq!(extract_fragment("<p>x</p>", &main_content()), "");
    }
}
