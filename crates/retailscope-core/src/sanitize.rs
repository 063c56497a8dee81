//! Free-text input sanitization for form fields.

use std::sync::LazyLock;

use regex::Regex;

/// Longest accepted form value, in characters.
pub const MAX_INPUT_LEN: usize = 1000;

static JS_PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));
static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon[a-z]+\s*=").expect("valid regex"));

/// Removes angle brackets, `javascript:` and inline event-handler fragments
/// (`onclick=`), trims, and truncates to [`MAX_INPUT_LEN`] characters.
#[must_use]
pub fn sanitize_input(raw: &str) -> String {
    let without_brackets: String = raw.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let without_js = JS_PROTOCOL_RE.replace_all(&without_brackets, "");
    let without_handlers = EVENT_HANDLER_RE.replace_all(&without_js, "");
    without_handlers
        .trim()
        .chars()
        .take(MAX_INPUT_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_untouched() {
        assert_eq!(sanitize_input("admin"), "admin");
        assert_eq!(sanitize_input("p@ss w0rd!"), "p@ss w0rd!");
    }

    #[test]
    fn strips_angle_brackets() {
        assert_eq!(sanitize_input("<script>alert(1)</script>"), "scriptalert(1)/script");
    }

    #[test]
    fn strips_javascript_protocol_case_insensitively() {
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input("javascript :void(0)"), "void(0)");
    }

    #[test]
    fn strips_event_handlers() {
        assert_eq!(sanitize_input("x onerror=alert(1)"), "x alert(1)");
        assert_eq!(sanitize_input("ONLOAD = go()"), "go()");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize_input("  admin \n"), "admin");
    }

    #[test]
    fn truncates_to_limit_by_characters() {
        let long = "\u{20b9}".repeat(MAX_INPUT_LEN + 50);
        let cleaned = sanitize_input(&long);
        assert_eq!(cleaned.chars().count(), MAX_INPUT_LEN);
    }
}
