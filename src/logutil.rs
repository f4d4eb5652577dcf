//! Logging helpers for player-supplied text (submitted keys, hall ids) so log
//! lines stay single-line and bounded.

/// Longest preview emitted before truncating with an ellipsis.
pub const MAX_PREVIEW: usize = 80;

/// Escape a string for single-line logging and cap its length.
///
/// `\n`, `\r`, `\t` and backslash are escaped; other control characters are
/// written as `\xNN`.
pub fn preview(s: &str) -> String {
    preview_with_limit(s, MAX_PREVIEW)
}

pub fn preview_with_limit(s: &str, max_chars: usize) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len().min(max_chars) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_chars {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
