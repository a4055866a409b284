use regex::Regex;
use std::sync::LazyLock;

/// Sentence-terminal punctuation immediately followed by whitespace
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s").expect("sentence pattern is valid"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("line break pattern is valid"));

/// One provider-sized unit of text, synthesized independently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
}

/// Split text into indexed chunks ready for speech synthesis
pub fn chunk_for_speech(text: &str, max_chunk_length: usize) -> Vec<TextChunk> {
    split_for_speech(text, max_chunk_length)
        .into_iter()
        .enumerate()
        .map(|(index, content)| TextChunk { index, content })
        .collect()
}

/// Split text into chunks of at most `max_chunk_length` characters for TTS
///
/// Break points are chosen inside a sliding window with this priority:
/// - last sentence end (`.`, `!`, `?` followed by whitespace)
/// - last newline
/// - last space
/// - any whitespace within the final quarter of the window
/// - the window boundary (hard cut)
///
/// Chunks are trimmed and whitespace between chunks is dropped, so joining
/// the chunks keeps every non-whitespace character of the input in order.
/// Empty or whitespace-only input yields no chunks. A zero limit also yields
/// no chunks since no progress could be made.
pub fn split_for_speech(text: &str, max_chunk_length: usize) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.is_empty() || max_chunk_length == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        let remaining = chars.len() - cursor;

        // The tail fits entirely, no need to look for a break
        let split_at = if remaining <= max_chunk_length {
            remaining
        } else {
            find_break(&chars[cursor..cursor + max_chunk_length])
        };

        let chunk: String = chars[cursor..cursor + split_at].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        cursor += split_at;
        while cursor < chars.len() && chars[cursor].is_whitespace() {
            cursor += 1;
        }
    }

    chunks
}

/// Returns the break offset inside `window`, always in `1..=window.len()`
fn find_break(window: &[char]) -> usize {
    let segment: String = window.iter().collect();

    if let Some(found) = SENTENCE_END.find_iter(&segment).last() {
        // Punctuation is a single char, break right after it
        return segment[..found.start()].chars().count() + 1;
    }

    if let Some(pos) = window.iter().rposition(|&c| c == '\n').filter(|&p| p > 0) {
        return pos;
    }

    if let Some(pos) = window.iter().rposition(|&c| c == ' ').filter(|&p| p > 0) {
        return pos;
    }

    let quarter_start = window.len() - window.len() / 4;
    if let Some(pos) = window
        .iter()
        .rposition(|c| c.is_whitespace())
        .filter(|&p| p > 0 && p >= quarter_start)
    {
        return pos;
    }

    window.len()
}

/// Batch whole lines into parts for language-model ingestion
///
/// A part is flushed before a line that would push it past `max_chars`
/// (counting one newline per line) or past `max_lines` lines. A single line
/// longer than `max_chars` still becomes its own part. Parts are trimmed and
/// blank parts are dropped.
pub fn split_for_ingestion(text: &str, max_lines: usize, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0;
    let mut line_count = 0;

    for line in LINE_BREAK.split(text) {
        let line_chars = line.chars().count();

        let exceeds = buffer_chars + line_chars + 1 > max_chars || line_count >= max_lines;
        if line_count > 0 && exceeds {
            flush_part(&mut parts, &buffer);
            buffer.clear();
            buffer_chars = 0;
            line_count = 0;
        }

        buffer.push_str(line);
        buffer.push('\n');
        buffer_chars += line_chars + 1;
        line_count += 1;
    }

    flush_part(&mut parts, &buffer);
    parts
}

fn flush_part(parts: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}
