//! Shared text helpers.

/// Reduce a handler message to a single display line of at most `max_bytes`.
///
/// Only the first line is kept. A cut never splits a UTF-8 character and is
/// marked with a trailing `...` (counted against `max_bytes`).
pub fn summary_line(message: &str, max_bytes: usize) -> String {
    let line = message.lines().next().unwrap_or_default().trim_end();
    let cut = line.len() < message.trim_end().len();

    if line.len() <= max_bytes && !cut {
        return line.to_string();
    }

    let budget = max_bytes.saturating_sub(3).min(line.len());
    let mut end = budget;
    while end > 0 && !line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &line[..end])
}
