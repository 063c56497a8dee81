use std::fmt::{self, Write};

use retailscope_core::display::{placeholder_data_uri, PLACEHOLDER_LABEL};
use retailscope_core::product::CategoryPayload;
use retailscope_core::{
    build_product_view, DisplayState, FeatureFlags, PanelState, RetailerConfig, HISTORY_LIMIT,
};

use super::product::{image_fallback, render_product};
use super::{escape, layout, Shell};
use crate::session::CurrentSession;

/// Seconds between automatic reloads while a request is in flight.
const LOADING_REFRESH_SECS: u32 = 2;

pub struct PanelView<'a> {
    pub retailer: &'a RetailerConfig,
    pub panel: &'a PanelState,
    pub state: &'a DisplayState,
    pub features: &'a FeatureFlags,
    pub user: &'a CurrentSession,
}

/// # Errors
///
/// Propagates formatter errors.
pub fn render_panel(view: &PanelView<'_>) -> Result<String, fmt::Error> {
    let retailer = view.retailer;
    let panel = view.panel;
    let base_path = format!("/retailers/{}", retailer.slug);
    let action = |op: &str| escape(&format!("{base_path}/{op}"));

    let mut body = String::new();
    writeln!(body, "<p><a href=\"/dashboard\">\u{2190} All retailers</a></p>")?;
    writeln!(body, "<h1>{}</h1>", escape(&retailer.name))?;
    if let Some(tagline) = &retailer.tagline {
        writeln!(body, "<p class=\"muted\">{}</p>", escape(tagline))?;
    }

    writeln!(body, "<div class=\"card\">")?;
    writeln!(body, "<form method=\"post\" action=\"{}\">", action("scrape"))?;
    writeln!(
        body,
        "<label for=\"url\">Product URL</label>\
<div class=\"row\"><input type=\"url\" id=\"url\" name=\"url\" value=\"{}\" placeholder=\"{}\"{}>\
<button type=\"submit\"{}>{}</button></div>",
        escape(&panel.url),
        escape(retailer.url_rule.example.as_deref().unwrap_or("https://")),
        if panel.is_loading { " disabled" } else { "" },
        if panel.is_loading { " disabled" } else { "" },
        if panel.is_loading { "Scraping\u{2026}" } else { "Scrape" }
    )?;
    writeln!(
        body,
        "<p class=\"muted\">URL must contain {}</p>",
        escape(&retailer.url_rule.describe())
    )?;
    writeln!(body, "</form>")?;

    if panel.is_loading {
        writeln!(
            body,
            "<div class=\"notice\" role=\"status\">Scraping <code>{}</code>\u{2026}</div>",
            escape(panel.last_request.as_ref().map_or("", |r| r.url()))
        )?;
    }

    if let Some(error) = &panel.error {
        writeln!(body, "<div class=\"error\" role=\"alert\">{}", escape(error))?;
        writeln!(body, "<div class=\"row\" style=\"margin-top:8px\">")?;
        if panel.last_request.is_some() {
            writeln!(
                body,
                "<form class=\"inline\" method=\"post\" action=\"{}\"><button type=\"submit\">Retry</button></form>",
                action("retry")
            )?;
        }
        writeln!(
            body,
            "<form class=\"inline\" method=\"post\" action=\"{}\"><button class=\"secondary\" type=\"submit\">Clear</button></form>",
            action("clear")
        )?;
        writeln!(body, "</div></div>")?;
    } else if panel.product.is_some() || panel.category.is_some() {
        writeln!(
            body,
            "<form class=\"inline\" method=\"post\" action=\"{}\"><button class=\"secondary\" type=\"submit\">Clear</button></form>",
            action("clear")
        )?;
    }
    writeln!(body, "</div>")?;

    if let Some(product) = &panel.product {
        let product_view = build_product_view(&retailer.display, product);
        render_product(&mut body, &product_view, view.state, &base_path)?;
        if view.features.debug_payload {
            let raw = serde_json::to_string_pretty(product).map_err(|_| fmt::Error)?;
            writeln!(
                body,
                "<details class=\"card\"><summary>Raw payload</summary><pre>{}</pre></details>",
                escape(&raw)
            )?;
        }
    }

    if view.features.category_scraping {
        if let Some(category) = &retailer.category {
            writeln!(body, "<div class=\"card\"><h2>Category page</h2>")?;
            writeln!(body, "<form method=\"post\" action=\"{}\">", action("category"))?;
            write!(
                body,
                "<div class=\"row\"><input type=\"url\" name=\"url\" aria-label=\"Category URL\" value=\"{}\" placeholder=\"{}\"{}>",
                escape(&panel.category_url),
                escape(category.url_rule.example.as_deref().unwrap_or("https://")),
                if panel.is_loading { " disabled" } else { "" }
            )?;
            if category.paginated {
                write!(
                    body,
                    "<input type=\"number\" name=\"page\" min=\"1\" style=\"width:90px\" aria-label=\"Page\" value=\"{}\">",
                    panel.page.unwrap_or(1)
                )?;
            }
            writeln!(
                body,
                "<button type=\"submit\"{}>Scrape category</button></div>",
                if panel.is_loading { " disabled" } else { "" }
            )?;
            writeln!(
                body,
                "<p class=\"muted\">URL must contain {}</p></form>",
                escape(&category.url_rule.describe())
            )?;
            if let Some(listing) = &panel.category {
                render_category(&mut body, view, listing, category.paginated, &action("category"))?;
            }
            writeln!(body, "</div>")?;
        }
    }

    if view.features.history && !panel.history.is_empty() {
        writeln!(
            body,
            "<div class=\"card\"><h2>Recent scrapes</h2><p class=\"muted\">Last {HISTORY_LIMIT} kept for this session.</p><ol>"
        )?;
        for (index, entry) in panel.history.iter().enumerate() {
            writeln!(
                body,
                "<li><form class=\"inline\" method=\"post\" action=\"{}\">\
<button class=\"secondary\" type=\"submit\">Show</button></form> <strong>{}</strong> \
<span class=\"muted\">{} \u{b7} {}</span></li>",
                action(&format!("history/{index}")),
                escape(&entry.title),
                escape(&entry.url),
                entry.scraped_at.format("%H:%M:%S UTC")
            )?;
        }
        writeln!(body, "</ol></div>")?;
    }

    layout(
        &Shell {
            title: &retailer.name,
            user: Some(view.user),
            refresh_secs: panel.is_loading.then_some(LOADING_REFRESH_SECS),
        },
        &body,
    )
}

fn render_category(
    out: &mut String,
    view: &PanelView<'_>,
    listing: &CategoryPayload,
    paginated: bool,
    action: &str,
) -> fmt::Result {
    let info = listing.page_info();
    write!(out, "<h3>{}</h3>", escape(listing.category.as_deref().unwrap_or("Results")))?;
    write!(out, "<p class=\"muted\">Page {}", info.current)?;
    if let Some(total) = info.total {
        write!(out, " of {total}")?;
    }
    if let Some(count) = listing.total_products {
        write!(out, " \u{b7} {count} products")?;
    }
    writeln!(out, "</p>")?;

    if listing.products.is_empty() {
        writeln!(out, "<p class=\"muted\">No products on this page.</p>")?;
    }

    let placeholder = placeholder_data_uri(PLACEHOLDER_LABEL);
    let fallback = image_fallback();
    writeln!(out, "<div class=\"grid\">")?;
    for product in &listing.products {
        let item = build_product_view(&view.retailer.display, product);
        let src = item.images.first().map_or(placeholder.as_str(), String::as_str);
        writeln!(
            out,
            "<div class=\"card\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\" style=\"width:100%;height:140px;object-fit:contain\" {fallback}><div>{}</div><div class=\"price\">{}</div></div>",
            escape(src),
            escape(&item.title),
            escape(&item.title),
            escape(item.price.as_deref().unwrap_or(""))
        )?;
    }
    writeln!(out, "</div>")?;

    if paginated {
        let page_button = |page: u32, label: &str| {
            format!(
                "<form class=\"inline\" method=\"post\" action=\"{action}\">\
<input type=\"hidden\" name=\"url\" value=\"{}\"><input type=\"hidden\" name=\"page\" value=\"{page}\">\
<button class=\"secondary\" type=\"submit\">{label}</button></form>",
                escape(&view.panel.category_url)
            )
        };
        write!(out, "<div class=\"row\">")?;
        if info.current > 1 {
            write!(out, "{}", page_button(info.current - 1, "\u{2039} Previous page"))?;
        }
        if info.has_next {
            write!(out, "{}", page_button(info.current + 1, "Next page \u{203a}"))?;
        }
        writeln!(out, "</div>")?;
    }
    Ok(())
}
