use std::fmt::{self, Write};

use retailscope_core::RetailerRegistry;

use super::{escape, layout, Shell};
use crate::session::CurrentSession;

/// Retailer cards grouped by category. Panels are only built when opened.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn render_dashboard(
    registry: &RetailerRegistry,
    user: &CurrentSession,
    active: &[String],
) -> Result<String, fmt::Error> {
    let mut body = String::new();
    writeln!(body, "<h1>Retailers</h1>")?;
    writeln!(
        body,
        "<p class=\"muted\">Pick a retailer, paste a product URL and scrape it.</p>"
    )?;

    for (group, retailers) in registry.grouped() {
        writeln!(body, "<section><h2>{}</h2><div class=\"grid\">", escape(group.label()))?;
        for retailer in retailers {
            write!(
                body,
                "<a class=\"card\" href=\"/retailers/{slug}\" data-retailer=\"{slug}\"><strong>{name}</strong>",
                slug = escape(&retailer.slug),
                name = escape(&retailer.name)
            )?;
            if let Some(tagline) = &retailer.tagline {
                write!(body, "<br><span class=\"muted\">{}</span>", escape(tagline))?;
            }
            if retailer.supports_category() {
                write!(body, "<br><span class=\"muted\">Category pages supported</span>")?;
            }
            if active.iter().any(|slug| *slug == retailer.slug) {
                write!(body, "<br><span class=\"discount\">Has results</span>")?;
            }
            writeln!(body, "</a>")?;
        }
        writeln!(body, "</div></section>")?;
    }

    layout(
        &Shell {
            title: "Dashboard",
            user: Some(user),
            refresh_secs: None,
        },
        &body,
    )
}
