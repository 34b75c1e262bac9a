//! Text pre-cleaning
//!
//! Agent output frequently arrives with literal `\n` sequences instead of
//! newlines and wrapped in markdown code fences. Pre-cleaning removes both and
//! trims the result. Running it twice yields the same text as running it once.

use std::sync::LazyLock;

use regex::Regex;

/// Opening fence at the very start of the text, optionally tagged `json`/`JSON`
static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A```(?:json|JSON)?[ \t]*\n?").expect("fence-open pattern is valid")
});

/// Closing fence at the very end of the text
static FENCE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n?```[ \t]*\z").expect("fence-close pattern is valid")
});

/// Clean raw agent text before any parse attempt
///
/// Fences are only stripped at the two ends of the payload. Fenced blocks
/// inside the text, such as code samples in a policy draft, are kept.
pub fn pre_clean(text: &str) -> String {
    let unescaped = unescape_control_sequences(text);
    strip_fences(unescaped.trim())
}

/// Turn literal `\n`, `\r` and `\t` sequences into the control characters
fn unescape_control_sequences(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}

/// Strip outer fence pairs until none is left
///
/// Removing one fence can expose another at the same end.
fn strip_fences(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_outer_fence(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_outer_fence(text: &str) -> String {
    let opened = FENCE_OPEN.replace(text, "");
    let closed = FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}
