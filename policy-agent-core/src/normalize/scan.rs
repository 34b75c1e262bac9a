//! Literal-aware scanning
//!
//! Two small state machines live here:
//!
//! - [`split_literals`] cuts text into code and string-literal segments so the
//!   textual repairs only ever rewrite code.
//! - [`find_balanced_span`] locates the first balanced `{...}` or `[...]` span
//!   in mixed prose. Brackets inside string literals and escaped quotes do not
//!   affect depth.

/// A piece of near-JSON text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any string literal
    Code(&'a str),
    /// A string literal including its quotes (may be unterminated at the end)
    Literal(&'a str),
}

/// Split `text` into code and literal segments
///
/// `quotes` lists the characters that open a literal. A literal closes on the
/// same character when it is not preceded by an unescaped backslash.
pub fn split_literals<'a>(text: &'a str, quotes: &[char]) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut open: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        match open {
            None => {
                if quotes.contains(&ch) {
                    if idx > start {
                        segments.push(Segment::Code(&text[start..idx]));
                    }
                    start = idx;
                    open = Some(ch);
                    escaped = false;
                }
            }
            Some(quote) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    let end = idx + ch.len_utf8();
                    segments.push(Segment::Literal(&text[start..end]));
                    start = end;
                    open = None;
                }
            }
        }
    }

    if start < text.len() {
        let rest = &text[start..];
        segments.push(match open {
            Some(_) => Segment::Literal(rest),
            None => Segment::Code(rest),
        });
    }

    segments
}

/// Scanner state for span extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Structural,
    InString,
    Escape,
}

/// Find the first balanced `{...}` or `[...]` span in `text`
///
/// Scanning starts at the first opening bracket of either kind. Returns `None`
/// when that bracket is never closed or a closer of the wrong kind shows up.
pub fn find_balanced_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut expected: Vec<char> = Vec::new();
    let mut state = ScanState::Structural;

    for (offset, ch) in text[start..].char_indices() {
        state = match state {
            ScanState::Escape => ScanState::InString,
            ScanState::InString => match ch {
                '\\' => ScanState::Escape,
                '"' => ScanState::Structural,
                _ => ScanState::InString,
            },
            ScanState::Structural => match ch {
                '"' => ScanState::InString,
                '{' => {
                    expected.push('}');
                    ScanState::Structural
                }
                '[' => {
                    expected.push(']');
                    ScanState::Structural
                }
                '}' | ']' => {
                    if expected.pop() != Some(ch) {
                        return None;
                    }
                    if expected.is_empty() {
                        let end = start + offset + ch.len_utf8();
                        return Some(&text[start..end]);
                    }
                    ScanState::Structural
                }
                _ => ScanState::Structural,
            },
        };
    }

    None
}
