use regex::Regex;

use super::span::{char_len, split_on, Span};

/// Packs paragraph segments into spans of at most `size` characters.
///
/// When a segment no longer fits, the buffer is emitted and the next one
/// starts with up to `overlap` trailing characters of it. A single segment
/// longer than `size` is kept whole.
pub(crate) fn split(source: &str, separator: &Regex, size: usize, overlap: usize) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut buffer: Option<Span> = None;
    for segment in split_on(source, separator) {
        buffer = Some(match buffer {
            None => segment,
            Some(current) => {
                let grown = current.through(segment);
                if char_len(grown.text(source)) <= size {
                    grown
                } else {
                    spans.push(current);
                    let start = overlap_start(source, current, overlap).unwrap_or(segment.start);
                    Span { start, end: segment.end }
                }
            }
        });
    }
    spans.extend(buffer);
    spans
}

/// Byte offset where the overlap carried out of `flushed` begins.
///
/// Looks at the last `overlap` characters and moves forward to the first word
/// start inside that window; with no whitespace in the window the cut is made
/// at the character boundary itself.
fn overlap_start(source: &str, flushed: Span, overlap: usize) -> Option<usize> {
    if overlap == 0 {
        return None;
    }
    let body = flushed.text(source);
    let cut = body.char_indices().rev().nth(overlap - 1).map_or(0, |(i, _)| i);
    if cut == 0 || body[..cut].ends_with(char::is_whitespace) {
        return Some(flushed.start + cut);
    }
    let window = &body[cut..];
    let start = match window.find(char::is_whitespace) {
        Some(ws) => {
            let rest = &window[ws..];
            let word = cut + ws + (rest.len() - rest.trim_start().len());
            if word < body.len() { word } else { cut }
        }
        None => cut,
    };
    Some(flushed.start + start)
}
