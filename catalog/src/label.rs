//! Button labels

const ELLIPSIS: &str = "...";

/// Display label for an asset file name
///
/// Names longer than `max_len` characters keep their first `max_len - 3`
/// characters followed by `...`, so the label is exactly `max_len` long.
pub fn button_label(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    let kept: String = name
        .chars()
        .take(max_len.saturating_sub(ELLIPSIS.len()))
        .collect();
    format!("{kept}{ELLIPSIS}")
}
