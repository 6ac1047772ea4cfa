use super::span::{char_len, trimmed, Span};

/// Sentences end at `.`, `!` or `?` immediately followed by whitespace.
/// Trailing text without terminal punctuation forms the last sentence.
pub(crate) fn sentences(source: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = source.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if chars.peek().is_some_and(|&(_, next)| next.is_whitespace()) {
            let end = i + c.len_utf8();
            spans.extend(trimmed(source, start, end));
            start = end;
        }
    }
    spans.extend(trimmed(source, start, source.len()));
    spans
}

/// Packs sentences into spans of at most `size` characters, repeating the
/// last sentence of each emitted span at the head of the next one.
pub(crate) fn split(source: &str, size: usize) -> Vec<Span> {
    let units = sentences(source);
    let mut spans = Vec::new();
    let mut buffer: Option<Span> = None;
    for (i, sentence) in units.iter().enumerate() {
        buffer = Some(match buffer {
            None => *sentence,
            Some(current) => {
                let grown = current.through(*sentence);
                if char_len(grown.text(source)) <= size {
                    grown
                } else {
                    spans.push(current);
                    units[i - 1].through(*sentence)
                }
            }
        });
    }
    spans.extend(buffer);
    spans
}
