//! Small shared helpers used across extraction and validation.

pub(crate) fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// ±`radius`-char window around `[start, end)`, clamped to `text`'s
/// bounds and to char boundaries.
pub(crate) fn char_window(text: &str, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let win_start = floor_char_boundary(text, start.saturating_sub(radius));
    let win_end = ceil_char_boundary(text, (end + radius).min(text.len()));
    (win_start, win_end)
}

pub(crate) fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

pub(crate) fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
