//! Code extraction from chat-message markdown.
//!
//! A message may hold fenced blocks (```` ``` ````, optionally followed by a
//! language tag), inline spans (`` ` `` or ` `` `), both, or no markup at all.
//! Precedence:
//!
//! 1. several fenced blocks → their bodies joined with `\n`
//! 2. one fenced block → its body
//! 3. otherwise the first inline span
//! 4. otherwise the whole message, minus leading blank lines and trailing
//!    whitespace
//!
//! The result is always dedented last.
//!
//! Spans are found with a left-to-right scanner. At each backtick it tries a
//! three-backtick opener first, then two, then one, and a span only closes on
//! the same delimiter it opened with.

use tracing::info;

use crate::types::{ExtractedCode, ExtractionReason};

const BLOCK_DELIMITER: &str = "```";

/// One formatted-code span found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Span<'a> {
    /// Number of backticks in the delimiter (1–3).
    width: usize,
    /// Language tag; only ever set on three-backtick blocks.
    lang: Option<&'a str>,
    code: &'a str,
}

impl Span<'_> {
    fn is_block(&self) -> bool {
        self.width == BLOCK_DELIMITER.len()
    }
}

/// Extract the code a user meant to run from `raw`.
///
/// Never fails: text without usable markup is taken as raw code.
pub fn extract(raw: &str) -> ExtractedCode {
    let spans = scan_spans(raw);
    let blocks: Vec<&Span<'_>> = spans.iter().filter(|s| s.is_block()).collect();

    let (code, reason) = if blocks.len() > 1 {
        let joined = blocks
            .iter()
            .map(|b| b.code)
            .collect::<Vec<_>>()
            .join("\n");
        (joined, ExtractionReason::MultipleFencedBlocks)
    } else if let Some(block) = blocks.first() {
        let reason = match block.lang {
            Some(lang) => ExtractionReason::FencedBlockWithLanguage(lang.to_string()),
            None => ExtractionReason::FencedBlock,
        };
        (block.code.to_string(), reason)
    } else if let Some(inline) = spans.first() {
        (
            inline.code.to_string(),
            ExtractionReason::InlineCode(inline.width),
        )
    } else {
        let start = skip_blank_lines(raw, 0);
        (
            raw[start..].trim_end().to_string(),
            ExtractionReason::RawFallback,
        )
    };

    let code = dedent(&code);
    info!(reason = %reason, "extracted code for evaluation:\n{code}");
    ExtractedCode { code, reason }
}

/// Remove the longest run of leading spaces/tabs shared by every non-blank
/// line. Lines holding only spaces/tabs come out empty.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.split('\n') {
        let content = line.trim_start_matches([' ', '\t']);
        if content.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - content.len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }

    let margin = margin.unwrap_or("");
    text.split('\n')
        .map(|line| {
            if line.trim_start_matches([' ', '\t']).is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Longest common prefix of two indentation strings (ASCII only).
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

/// Find all non-overlapping formatted-code spans, left to right.
fn scan_spans(text: &str) -> Vec<Span<'_>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'`' {
            pos += 1;
            continue;
        }
        match match_span_at(text, pos) {
            Some((span, end)) => {
                spans.push(span);
                pos = end;
            }
            None => pos += 1,
        }
    }

    spans
}

/// Try every delimiter width at `pos`, widest first.
fn match_span_at(text: &str, pos: usize) -> Option<(Span<'_>, usize)> {
    (1..=BLOCK_DELIMITER.len())
        .rev()
        .find_map(|width| match_with_delimiter(text, pos, width))
}

/// Match one span opened by `width` backticks at `pos`.
///
/// Returns the span and the byte offset just past its closing delimiter.
fn match_with_delimiter(text: &str, pos: usize, width: usize) -> Option<(Span<'_>, usize)> {
    let delimiter = &BLOCK_DELIMITER[..width];
    if !text.as_bytes()[pos..].starts_with(delimiter.as_bytes()) {
        return None;
    }

    let mut cursor = pos + width;
    let mut lang = None;
    if width == BLOCK_DELIMITER.len() {
        if let Some((tag, next)) = language_tag(text, cursor) {
            lang = Some(tag);
            cursor = next;
        }
    }
    cursor = skip_blank_lines(text, cursor);

    let close = cursor + text[cursor..].find(delimiter)?;
    let code = text[cursor..close].trim_end();

    Some((Span { width, lang, code }, close + width))
}

/// A run of ASCII letters immediately followed by a newline.
fn language_tag(text: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    let end = start + len;
    if len > 0 && bytes.get(end) == Some(&b'\n') {
        Some((&text[start..end], end + 1))
    } else {
        None
    }
}

/// Skip whole lines made only of spaces and tabs, returning the offset of the
/// first line with other content (or of trailing blanks without a newline).
fn skip_blank_lines(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut cursor = start;
    loop {
        let mut i = cursor;
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'\n' {
            cursor = i + 1;
        } else {
            return cursor;
        }
    }
}
