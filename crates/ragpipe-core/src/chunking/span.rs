use regex::Regex;

/// Byte range into the cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Spans from the start of `self` to the end of `other`.
    pub fn through(&self, other: Span) -> Span {
        Span { start: self.start, end: other.end }
    }
}

/// `source[start..end]` with surrounding whitespace removed; `None` when blank.
pub(crate) fn trimmed(source: &str, start: usize, end: usize) -> Option<Span> {
    let slice = &source[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = slice.len() - slice.trim_start().len();
    Some(Span { start: start + lead, end: start + lead + trimmed.len() })
}

/// Non-blank pieces of `source` between matches of `separator`.
pub(crate) fn split_on(source: &str, separator: &Regex) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for m in separator.find_iter(source) {
        spans.extend(trimmed(source, cursor, m.start()));
        cursor = m.end();
    }
    spans.extend(trimmed(source, cursor, source.len()));
    spans
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Translates byte offsets into character offsets.
pub(crate) struct CharOffsets {
    // empty for ASCII input, where bytes and chars coincide
    starts: Vec<usize>,
}

impl CharOffsets {
    pub fn new(source: &str) -> Self {
        let starts = if source.is_ascii() { Vec::new() } else { source.char_indices().map(|(i, _)| i).collect() };
        Self { starts }
    }

    pub fn of(&self, byte: usize) -> usize {
        if self.starts.is_empty() {
            byte
        } else {
            self.starts.partition_point(|&b| b < byte)
        }
    }
}
