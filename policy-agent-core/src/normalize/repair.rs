//! Heuristic repairs for near-JSON text
//!
//! Each [`Repair`] targets one common malformation in LLM output. They are
//! enabled cumulatively in [`Repair::ESCALATION`] order by the lenient parser,
//! but [`apply_repairs`] always runs the enabled set in a fixed internal order
//! (byte-order mark, comments, quotes, then code-level rewrites), so stripping a
//! comment can still expose a trailing comma that gets removed.
//!
//! Rewrites never touch the inside of string literals. A repair that misfires
//! simply produces text that still fails to parse.

use std::sync::LazyLock;

use regex::Regex;

use super::scan::{split_literals, Segment};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("trailing-comma pattern is valid"));

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_$][A-Za-z0-9_$\-]*)(\s*:)").expect("bare-key pattern is valid")
});

static PY_TRUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTrue\b").expect("literal pattern is valid"));
static PY_FALSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bFalse\b").expect("literal pattern is valid"));
static PY_NONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bNone\b").expect("literal pattern is valid"));

const BOM: char = '\u{feff}';

/// A single textual fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// `{"a": 1,}` → `{"a": 1}`
    TrailingCommas,
    /// `{a: 1}` → `{"a": 1}`
    BareKeys,
    /// `{'a': 'x'}` → `{"a": "x"}`
    SingleQuotes,
    /// `True` / `False` / `None` → `true` / `false` / `null`
    PythonLiterals,
    /// `// ...` and `/* ... */`
    Comments,
    /// Leading U+FEFF
    ByteOrderMark,
}

impl Repair {
    /// Repairs in order of increasing aggressiveness
    pub const ESCALATION: [Repair; 6] = [
        Repair::TrailingCommas,
        Repair::BareKeys,
        Repair::SingleQuotes,
        Repair::PythonLiterals,
        Repair::Comments,
        Repair::ByteOrderMark,
    ];
}

/// Apply the `enabled` repairs to `text`
///
/// Raw control characters inside string literals are always re-escaped, even
/// with an empty set. Pre-cleaning turns `\n` escapes into real newlines and
/// strict JSON rejects those inside strings.
pub fn apply_repairs(text: &str, enabled: &[Repair]) -> String {
    let on = |repair: Repair| enabled.contains(&repair);
    let mut out = text.to_string();

    if on(Repair::ByteOrderMark) {
        out = out.trim_start_matches(BOM).to_string();
    }
    if on(Repair::Comments) {
        out = strip_comments(&out);
    }
    if on(Repair::SingleQuotes) {
        out = convert_single_quotes(&out);
    }

    out = escape_control_chars(&out);

    if on(Repair::PythonLiterals) || on(Repair::BareKeys) || on(Repair::TrailingCommas) {
        out = rewrite_code(&out, |code| {
            let mut code = code.to_string();
            if on(Repair::PythonLiterals) {
                code = PY_TRUE.replace_all(&code, "true").into_owned();
                code = PY_FALSE.replace_all(&code, "false").into_owned();
                code = PY_NONE.replace_all(&code, "null").into_owned();
            }
            if on(Repair::BareKeys) {
                code = BARE_KEY.replace_all(&code, "$1\"$2\"$3").into_owned();
            }
            if on(Repair::TrailingCommas) {
                code = TRAILING_COMMA.replace_all(&code, "$1").into_owned();
            }
            code
        });
    }

    out
}

/// Rewrite every code segment with `f`, copying literals through untouched
fn rewrite_code(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in split_literals(text, &['"']) {
        match segment {
            Segment::Code(code) => out.push_str(&f(code)),
            Segment::Literal(literal) => out.push_str(literal),
        }
    }
    out
}

/// Escape raw control characters that appear inside double-quoted literals
fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in split_literals(text, &['"']) {
        match segment {
            Segment::Code(code) => out.push_str(code),
            Segment::Literal(literal) => {
                for ch in literal.chars() {
                    if (ch as u32) < 0x20 {
                        push_control_escape(&mut out, ch);
                    } else {
                        out.push(ch);
                    }
                }
            }
        }
    }
    out
}

fn push_control_escape(out: &mut String, ch: char) {
    match ch {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{08}' => out.push_str("\\b"),
        '\u{0c}' => out.push_str("\\f"),
        other => out.push_str(&format!("\\u{:04x}", other as u32)),
    }
}

/// Remove `//` line comments and `/* */` block comments outside literals
///
/// Comments are recognised before quotes, so an apostrophe inside a comment
/// does not open a literal.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if let Some(open) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('/', Some('/')) => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            ('"' | '\'', _) => {
                quote = Some(ch);
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Convert single-quoted literals to double-quoted ones
///
/// Apostrophes inside double-quoted strings are left alone. Inside a converted
/// literal, `\'` becomes a bare `'` and a bare `"` gets escaped.
fn convert_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in split_literals(text, &['"', '\'']) {
        match segment {
            Segment::Code(code) => out.push_str(code),
            Segment::Literal(literal) if literal.starts_with('"') => out.push_str(literal),
            Segment::Literal(literal) => {
                let body = &literal[1..];
                let (body, closed) = match body.strip_suffix('\'') {
                    Some(inner) => (inner, true),
                    None => (body, false),
                };

                out.push('"');
                let mut chars = body.chars();
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(next) => {
                                out.push('\\');
                                out.push(next);
                            }
                            None => out.push('\\'),
                        },
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                }
                if closed {
                    out.push('"');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<Repair> {
        Repair::ESCALATION.to_vec()
    }

    #[test]
    fn test_trailing_commas() {
        let fixed = apply_repairs(r#"{"a": 1, "b": [1, 2,],}"#, &[Repair::TrailingCommas]);
        assert_eq!(fixed, r#"{"a": 1, "b": [1, 2]}"#);
    }

    #[test]
    fn test_trailing_comma_inside_string_untouched() {
        let fixed = apply_repairs(r#"{"a": "x,}", }"#, &[Repair::TrailingCommas]);
        assert_eq!(fixed, r#"{"a": "x,}" }"#);
    }

    #[test]
    fn test_bare_keys() {
        let fixed = apply_repairs("{name: \"x\", nested: {deep_key: 1}}", &[Repair::BareKeys]);
        assert_eq!(fixed, r#"{"name": "x", "nested": {"deep_key": 1}}"#);
    }

    #[test]
    fn test_bare_keys_ignore_prose_in_strings() {
        let text = r#"{"msg": "note, see: here", count: 2}"#;
        let fixed = apply_repairs(text, &[Repair::BareKeys]);
        assert_eq!(fixed, r#"{"msg": "note, see: here", "count": 2}"#);
    }

    #[test]
    fn test_single_quotes() {
        let fixed = apply_repairs("{'a': 'x', 'b': \"it's\"}", &[Repair::SingleQuotes]);
        assert_eq!(fixed, r#"{"a": "x", "b": "it's"}"#);
    }

    #[test]
    fn test_single_quotes_escape_handling() {
        let fixed = apply_repairs(r#"{'q': 'say "hi"', 'r': 'don\'t'}"#, &[Repair::SingleQuotes]);
        assert_eq!(fixed, r#"{"q": "say \"hi\"", "r": "don't"}"#);
    }

    #[test]
    fn test_python_literals() {
        let fixed = apply_repairs(
            r#"{"a": True, "b": False, "c": None, "d": "True story"}"#,
            &[Repair::PythonLiterals],
        );
        assert_eq!(fixed, r#"{"a": true, "b": false, "c": null, "d": "True story"}"#);
    }

    #[test]
    fn test_comments() {
        let text = "{\n  \"a\": 1, // first\n  /* block */ \"b\": \"http://x\"\n}";
        let fixed = apply_repairs(text, &[Repair::Comments]);
        let value: serde_json::Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1, "b": "http://x"}));
    }

    #[test]
    fn test_comment_then_trailing_comma() {
        let text = "{\"a\": 1, // last entry\n}";
        let fixed = apply_repairs(text, &[Repair::TrailingCommas, Repair::Comments]);
        let value: serde_json::Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_byte_order_mark() {
        let fixed = apply_repairs("\u{feff}{\"a\": 1}", &[Repair::ByteOrderMark]);
        assert_eq!(fixed, "{\"a\": 1}");
    }

    #[test]
    fn test_control_chars_always_escaped() {
        let fixed = apply_repairs("{\"a\": \"line1\nline2\"}\n", &[]);
        assert_eq!(fixed, "{\"a\": \"line1\\nline2\"}\n");
    }

    #[test]
    fn test_control_char_after_backslash() {
        // `\\n` pre-cleans to a backslash followed by a newline
        let fixed = apply_repairs("{\"p\": \"C:\\\n\"}", &[]);
        let value: serde_json::Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value["p"], "C:\\n");
    }

    #[test]
    fn test_everything_at_once() {
        let text = "\u{feff}{ // config\n  name: 'policy', active: True, tags: ['a', 'b',], }";
        let fixed = apply_repairs(text, &all());
        let value: serde_json::Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "policy", "active": true, "tags": ["a", "b"]})
        );
    }
}
