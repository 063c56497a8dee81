//! Inline SVG placeholder used when a product image fails to load.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

pub const PLACEHOLDER_LABEL: &str = "Image unavailable";

/// Characters that must be escaped inside a `data:` URI placed in an HTML
/// attribute.
const DATA_URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'&')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Returns a `data:image/svg+xml` URI for a neutral placeholder tile showing
/// `label`.
#[must_use]
pub fn placeholder_data_uri(label: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='400' height='400' viewBox='0 0 400 400'>\
<rect width='400' height='400' fill='#f1f5f9'/>\
<path d='M150 240l40-50 30 36 20-24 40 38z' fill='#cbd5e1'/>\
<circle cx='170' cy='160' r='18' fill='#cbd5e1'/>\
<text x='200' y='300' font-family='sans-serif' font-size='18' fill='#64748b' text-anchor='middle'>{}</text>\
</svg>",
        escape_xml(label)
    );
    format!(
        "data:image/svg+xml;charset=utf-8,{}",
        utf8_percent_encode(&svg, DATA_URI)
    )
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_is_svg_data_uri() {
        let uri = placeholder_data_uri(PLACEHOLDER_LABEL);
        assert!(uri.starts_with("data:image/svg+xml;charset=utf-8,"));
        assert!(uri.contains("Image%20unavailable"));
    }

    #[test]
    fn uri_is_safe_inside_quoted_attributes() {
        let uri = placeholder_data_uri("Tom's \"mug\" <b>");
        assert!(!uri.contains('"'));
        assert!(!uri.contains('\''));
        assert!(!uri.contains('<'));
        assert!(!uri.contains('>'));
    }
}
