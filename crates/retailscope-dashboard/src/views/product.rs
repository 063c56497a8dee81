//! Rendering of [`ProductView`]s: header, image carousel and config-driven
//! sections.

use std::fmt::{self, Write};

use retailscope_core::display::{
    placeholder_data_uri, Carousel, SectionBody, SectionView, PLACEHOLDER_LABEL,
};
use retailscope_core::{DisplayState, ProductView};

use super::{escape, with_query};

/// `onerror` attribute that swaps a broken image for the inline placeholder.
pub(super) fn image_fallback() -> String {
    format!(
        "onerror=\"this.onerror=null;this.src='{}'\"",
        placeholder_data_uri(PLACEHOLDER_LABEL)
    )
}

/// Writes the product card. Links carry UI state in the query string of
/// `base_path`; the payload is never touched.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn render_product(
    out: &mut String,
    view: &ProductView,
    state: &DisplayState,
    base_path: &str,
) -> fmt::Result {
    writeln!(out, "<article class=\"card product\">")?;
    writeln!(
        out,
        "<div style=\"display:grid;grid-template-columns:minmax(0,1fr) minmax(0,1fr);gap:24px\">"
    )?;
    render_carousel(out, view, state, base_path)?;

    writeln!(out, "<div>")?;
    writeln!(out, "<h2>{}</h2>", escape(&view.title))?;
    if let Some(brand) = &view.brand {
        writeln!(out, "<p class=\"muted\">by {}</p>", escape(brand))?;
    }
    write!(out, "<p>")?;
    match &view.price {
        Some(price) => write!(out, "<span class=\"price\">{}</span>", escape(price))?,
        None => write!(out, "<span class=\"muted\">Price unavailable</span>")?,
    }
    if let Some(mrp) = &view.mrp {
        write!(out, "<span class=\"mrp\">{}</span>", escape(mrp))?;
    }
    if let Some(discount) = &view.discount {
        write!(out, "<span class=\"discount\">{}</span>", escape(discount))?;
    }
    writeln!(out, "</p>")?;
    if let Some(rating) = &view.rating {
        writeln!(out, "<p>\u{2605} {}</p>", escape(rating))?;
    }
    writeln!(out, "</div></div>")?;

    for section in &view.sections {
        render_section(out, section, state, base_path)?;
    }
    writeln!(out, "</article>")
}

fn render_carousel(
    out: &mut String,
    view: &ProductView,
    state: &DisplayState,
    base_path: &str,
) -> fmt::Result {
    let fallback = image_fallback();
    let carousel = Carousel::new(view.images.len());
    writeln!(out, "<div class=\"carousel\">")?;

    if carousel.is_empty() {
        writeln!(
            out,
            "<img class=\"main\" src=\"{}\" alt=\"{}\" {fallback}>",
            placeholder_data_uri(PLACEHOLDER_LABEL),
            escape(PLACEHOLDER_LABEL)
        )?;
        return writeln!(out, "</div>");
    }

    let current = carousel.clamp(state.image_index);
    writeln!(
        out,
        "<img class=\"main\" src=\"{}\" alt=\"{} image {} of {}\" {fallback}>",
        escape(&view.images[current]),
        escape(&view.title),
        current + 1,
        carousel.len()
    )?;

    if carousel.len() > 1 {
        let prev = with_query(base_path, &state.with_image(carousel.prev(current)).to_query());
        let next = with_query(base_path, &state.with_image(carousel.next(current)).to_query());
        writeln!(
            out,
            "<div class=\"row\"><a href=\"{}\" aria-label=\"Previous image\">\u{2039} Prev</a>\
<span class=\"muted\">{} / {}</span>\
<a href=\"{}\" aria-label=\"Next image\">Next \u{203a}</a></div>",
            escape(&prev),
            current + 1,
            carousel.len(),
            escape(&next)
        )?;

        writeln!(out, "<div class=\"thumbs\">")?;
        for (index, src) in view.images.iter().enumerate() {
            let href = with_query(base_path, &state.with_image(index).to_query());
            writeln!(
                out,
                "<a href=\"{}\"{}><img src=\"{}\" alt=\"Thumbnail {}\" loading=\"lazy\" {fallback}></a>",
                escape(&href),
                if index == current { " class=\"active\"" } else { "" },
                escape(src),
                index + 1
            )?;
        }
        writeln!(out, "</div>")?;
    }
    writeln!(out, "</div>")
}

fn render_section(
    out: &mut String,
    section: &SectionView,
    state: &DisplayState,
    base_path: &str,
) -> fmt::Result {
    let expanded = state.is_expanded(&section.key);
    let visible = section.visible_len(expanded);

    writeln!(
        out,
        "<section id=\"section-{key}\" data-section=\"{key}\"><h3>{title}</h3>",
        key = escape(&section.key),
        title = escape(&section.title)
    )?;
    match &section.body {
        SectionBody::Pairs(pairs) => {
            writeln!(out, "<table class=\"pairs\">")?;
            for (label, value) in pairs.iter().take(visible) {
                writeln!(
                    out,
                    "<tr><th>{}</th><td>{}</td></tr>",
                    escape(label),
                    escape(value)
                )?;
            }
            writeln!(out, "</table>")?;
        }
        SectionBody::Items(items) => {
            writeln!(out, "<ul>")?;
            for item in items.iter().take(visible) {
                writeln!(out, "<li>{}</li>", escape(item))?;
            }
            writeln!(out, "</ul>")?;
        }
        SectionBody::Text(text) => writeln!(out, "<p>{}</p>", escape(text))?,
    }

    if section.is_truncatable() {
        let href = format!(
            "{}#section-{}",
            with_query(base_path, &state.toggled(&section.key).to_query()),
            section.key
        );
        let label = if expanded {
            "Show less".to_string()
        } else {
            format!("Show all ({})", section.total())
        };
        writeln!(
            out,
            "<p><a class=\"toggle\" href=\"{}\">{}</a></p>",
            escape(&href),
            escape(&label)
        )?;
    }
    writeln!(out, "</section>")
}

#[cfg(test)]
mod tests {
    use retailscope_core::display::SectionView;

    use super::*;

    fn view(images: usize) -> ProductView {
        ProductView {
            title: "Phone".to_string(),
            brand: Some("Acme".to_string()),
            price: Some("\u{20b9}999".to_string()),
            mrp: Some("\u{20b9}1,499".to_string()),
            discount: Some("33% off".to_string()),
            rating: None,
            images: (0..images)
                .map(|i| format!("https://cdn.example.com/{i}.jpg"))
                .collect(),
            sections: vec![SectionView {
                key: "offers".to_string(),
                title: "Offers".to_string(),
                body: SectionBody::Items(vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                ]),
                limit: Some(2),
            }],
        }
    }

    fn render(view: &ProductView, state: &DisplayState) -> String {
        let mut out = String::new();
        render_product(&mut out, view, state, "/retailers/acme").unwrap();
        out
    }

    #[test]
    fn every_image_has_placeholder_fallback() {
        let html = render(&view(3), &DisplayState::default());
        let images = html.matches("<img ").count();
        assert_eq!(images, 4);
        assert_eq!(html.matches("onerror=\"this.onerror=null;").count(), images);
    }

    #[test]
    fn no_images_renders_placeholder_with_fallback() {
        let html = render(&view(0), &DisplayState::default());
        assert_eq!(html.matches("<img ").count(), 1);
        assert!(html.contains("src=\"data:image/svg+xml"));
        assert!(html.contains("onerror="));
    }

    #[test]
    fn carousel_links_wrap() {
        let html = render(&view(3), &DisplayState::default());
        assert!(html.contains("href=\"/retailers/acme?img=2\" aria-label=\"Previous image\""));
        assert!(html.contains("href=\"/retailers/acme?img=1\" aria-label=\"Next image\""));

        let last = DisplayState::from_query(Some(2), None);
        let html = render(&view(3), &last);
        assert!(html.contains("href=\"/retailers/acme\" aria-label=\"Next image\""));
    }

    #[test]
    fn truncated_section_toggle_round_trips() {
        let collapsed = render(&view(1), &DisplayState::default());
        assert!(collapsed.contains("<li>A</li>"));
        assert!(collapsed.contains("<li>B</li>"));
        assert!(!collapsed.contains("<li>C</li>"));
        assert!(collapsed.contains("Show all (3)"));
        assert!(collapsed.contains("href=\"/retailers/acme?expand=offers#section-offers\""));

        let expanded = render(&view(1), &DisplayState::from_query(None, Some("offers")));
        assert!(expanded.contains("<li>C</li>"));
        assert!(expanded.contains("Show less"));
        assert!(expanded.contains("href=\"/retailers/acme#section-offers\""));

        let again = render(&view(1), &DisplayState::default().toggled("offers").toggled("offers"));
        assert_eq!(again, collapsed);
    }

    #[test]
    fn header_shows_struck_mrp_and_discount() {
        let html = render(&view(1), &DisplayState::default());
        assert!(html.contains("<span class=\"mrp\">\u{20b9}1,499</span>"));
        assert!(html.contains("33% off"));
    }
}
