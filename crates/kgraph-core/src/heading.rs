//! The heading grammar: short tokens used to address children by name.
//!
//! A heading is restricted to ASCII alphanumerics and underscore, and must
//! be non-empty. This mirrors the original grammar exactly (`isalnum(c) ||
//! c == '_'`) rather than the more permissive separator set used elsewhere
//! in this codebase for application labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The attribute child holding a node's genesis (creation) timestamp.
pub const GENESIS_HEADING: &str = "genesis";
/// The attribute child holding a node's order body.
pub const ORDER_HEADING: &str = "order";
/// The heading given to the singleton root node.
pub const ROOT_HEADING: &str = "root";

/// A validated heading: non-empty, ASCII alphanumeric-or-underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Heading(String);

impl Heading {
    /// Validate and wrap a heading, or `None` if it is not well-formed.
    pub fn parse(s: impl AsRef<str>) -> Option<Self> {
        let s = s.as_ref();
        if is_valid_heading(s) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    /// Build a `Heading` known to be valid at compile time (tests, constants).
    ///
    /// # Panics
    /// Panics if `s` is not a valid heading.
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        let s = s.into();
        assert!(is_valid_heading(&s), "not a valid heading: {s:?}");
        Self(s)
    }

    /// Borrow the underlying text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Heading {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `true` iff `c` is a valid heading character: ASCII alphanumeric or `_`.
pub fn is_valid_heading_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `true` iff `s` is non-empty and every character is a valid heading character.
pub fn is_valid_heading(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_valid_heading_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_and_underscore() {
        assert!(Heading::parse("node_1").is_some());
        assert!(Heading::parse("A1").is_some());
        assert!(Heading::parse("_").is_some());
    }

    #[test]
    fn rejects_empty_and_punctuation() {
        assert!(Heading::parse("").is_none());
        assert!(Heading::parse("foo.bar").is_none());
        assert!(Heading::parse("foo-bar").is_none());
        assert!(Heading::parse("foo bar").is_none());
    }

    #[test]
    fn reserved_headings_are_valid_headings() {
        assert!(is_valid_heading(GENESIS_HEADING));
        assert!(is_valid_heading(ORDER_HEADING));
        assert!(is_valid_heading(ROOT_HEADING));
    }
}
