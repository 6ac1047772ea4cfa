use regex::Regex;

use super::span::{split_on, Span};

/// One span per non-blank paragraph, regardless of length.
pub(crate) fn split(source: &str, separator: &Regex) -> Vec<Span> {
    split_on(source, separator)
}
