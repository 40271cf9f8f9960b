//! Render and emission rules of the controlled-value contract. Shared by
//! [`crate::RichTextSurface`] and the browser binding so both behave alike.

use crate::markup::LINE_BREAK;

/// Whether the region must be overwritten with the external `value`.
///
/// Only when the two differ and the region does not hold focus: while the
/// user is typing, the rendered content wins until blur.
pub fn needs_render(rendered: &str, value: &str, focused: bool) -> bool {
    !focused && rendered != value
}

/// Content as reported to the host. The single-empty-line sentinel becomes
/// `""` so an untouched and an emptied editor look the same.
pub fn normalize_output(content: &str) -> String {
    if content == LINE_BREAK {
        String::new()
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_render() {
        assert!(needs_render("<p>a</p>", "<p>b</p>", false));
        assert!(!needs_render("<p>a</p>", "<p>b</p>", true));
        assert!(!needs_render("<p>a</p>", "<p>a</p>", false));
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("<br>"), "");
        assert_eq!(normalize_output("<p><br></p>"), "<p><br></p>");
        assert_eq!(normalize_output("<p>x</p>"), "<p>x</p>");
    }
}
