//! Track position formatting

/// Format a position or length given in microseconds as `M:SS`, switching
/// to `H:MM:SS` once it reaches an hour. Negative inputs clamp to zero.
pub fn format_timestamp(microseconds: i64) -> String {
    let total_secs = (microseconds / 1_000_000).max(0);
    let (mins, secs) = (total_secs / 60, total_secs % 60);
    let (hours, mins) = (mins / 60, mins % 60);
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}
