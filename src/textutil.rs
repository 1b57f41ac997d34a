//! Text shaping helpers shared by the catalog, executor, and model adapter.
//!
//! All truncation counts characters, never bytes, so a cut can't land inside
//! a multi-byte code point.

const REASONING_OPEN: &str = "<reasoning>";
const REASONING_CLOSE: &str = "</reasoning>";

/// Return at most `max_chars` leading characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Truncate by characters and append `...` when anything was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Remove well-formed `<reasoning>...</reasoning>` spans and trim the result.
///
/// Matching is non-greedy: each opening tag pairs with the nearest closing tag
/// after it. An opening tag with no closing tag is left in place together with
/// everything after it.
pub fn strip_reasoning(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(REASONING_OPEN) {
        let after_open = &rest[open + REASONING_OPEN.len()..];
        let Some(close) = after_open.find(REASONING_CLOSE) else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &after_open[close + REASONING_CLOSE.len()..];
    }
    out.push_str(rest);
    out.trim().to_string()
}
