//! Character reference decoding for attribute values.
//!
//! Text runs are never decoded; only attribute values are, so that the
//! serializer can re-escape `&` and `"` without doubling existing references.

use std::borrow::Cow;

/// Decodes every named and numeric character reference in `value`.
///
/// A value without `&` is returned borrowed. A bare `&` that does not start a
/// reference is kept as is.
pub fn decode_attribute_value(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    html_escape::decode_html_entities(value)
}
