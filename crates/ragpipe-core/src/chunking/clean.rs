use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").expect("static pattern"));
static LINE_ENDING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n?").expect("static pattern"));
static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("static pattern"));

/// Normalizes extracted text before chunking.
///
/// Line endings become `\n`, runs of spaces/tabs become one space, three or
/// more consecutive newlines become a single blank line, and the result is
/// trimmed. Offsets reported on chunks are relative to this output.
pub fn clean_text(raw: &str) -> String {
    let text = LINE_ENDING.replace_all(raw, "\n");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = NEWLINE_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}
