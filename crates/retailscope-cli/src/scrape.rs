//! One-off scrapes from the terminal.
//!
//! URLs are checked against the retailer's rule before any request is made,
//! matching what the dashboard panel does.

use retailscope_client::ScrapeClient;
use retailscope_core::display::SectionBody;
use retailscope_core::{
    build_product_view, AppConfig, CategoryPayload, ProductView, RetailerConfig, RetailerRegistry,
};

fn find_retailer<'a>(
    registry: &'a RetailerRegistry,
    slug: &str,
) -> anyhow::Result<&'a RetailerConfig> {
    registry
        .get(slug)
        .filter(|r| r.enabled)
        .ok_or_else(|| anyhow::anyhow!("retailer '{slug}' not found or disabled"))
}

fn client(config: &AppConfig) -> anyhow::Result<ScrapeClient> {
    ScrapeClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build scraping API client: {e}"))
}

/// Plain-text rendering of a product view. Sections are printed in full.
pub(crate) fn product_lines(view: &ProductView) -> Vec<String> {
    let mut lines = vec![view.title.clone()];
    if let Some(brand) = &view.brand {
        lines.push(format!("brand:    {brand}"));
    }
    let mut price = view.price.clone().unwrap_or_else(|| "-".to_string());
    if let Some(mrp) = &view.mrp {
        price.push_str(&format!(" (MRP {mrp})"));
    }
    if let Some(discount) = &view.discount {
        price.push_str(&format!(" {discount}"));
    }
    lines.push(format!("price:    {price}"));
    if let Some(rating) = &view.rating {
        lines.push(format!("rating:   {rating}"));
    }
    lines.push(format!("images:   {}", view.images.len()));

    for section in &view.sections {
        lines.push(String::new());
        lines.push(format!("[{}]", section.title));
        match &section.body {
            SectionBody::Pairs(pairs) => {
                let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
                lines.extend(pairs.iter().map(|(k, v)| format!("  {k:<width$}  {v}")));
            }
            SectionBody::Items(items) => {
                lines.extend(items.iter().map(|item| format!("  - {item}")));
            }
            SectionBody::Text(text) => lines.push(format!("  {text}")),
        }
    }
    lines
}

pub(crate) fn category_lines(retailer: &RetailerConfig, listing: &CategoryPayload) -> Vec<String> {
    let info = listing.page_info();
    let mut lines = vec![format!(
        "{} - page {}{}{}",
        listing.category.as_deref().unwrap_or("category"),
        info.current,
        info.total.map(|t| format!(" of {t}")).unwrap_or_default(),
        if info.has_next { " (more pages)" } else { "" }
    )];
    for product in &listing.products {
        let view = build_product_view(&retailer.display, product);
        let title = if view.title.chars().count() > 60 {
            format!("{}...", view.title.chars().take(60).collect::<String>())
        } else {
            view.title
        };
        lines.push(format!(
            "  {:<64}{}",
            title,
            view.price.as_deref().unwrap_or("-")
        ));
    }
    lines
}

/// # Errors
///
/// Returns an error if the retailer is unknown, the URL fails its rule, or
/// the scraping API request fails.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    registry: &RetailerRegistry,
    slug: &str,
    url: &str,
    json: bool,
) -> anyhow::Result<()> {
    let retailer = find_retailer(registry, slug)?;
    retailer.url_rule.check(url).map_err(|e| {
        anyhow::anyhow!(
            "not a valid {} URL: {e} (expected {})",
            retailer.name,
            retailer.url_rule.describe()
        )
    })?;

    let scraped = client(config)?
        .scrape_product(retailer, url.trim())
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    tracing::info!(
        retailer = %retailer.slug,
        saved_to = scraped.saved_to.as_deref().unwrap_or(""),
        "product scraped"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&scraped.data)?);
    } else {
        for line in product_lines(&build_product_view(&retailer.display, &scraped.data)) {
            println!("{line}");
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the retailer is unknown or has no category route,
/// the URL fails the category rule, or the scraping API request fails.
pub(crate) async fn run_category(
    config: &AppConfig,
    registry: &RetailerRegistry,
    slug: &str,
    url: &str,
    page: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let retailer = find_retailer(registry, slug)?;
    let category = retailer
        .category
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("{} does not support category pages", retailer.name))?;
    category.url_rule.check(url).map_err(|e| {
        anyhow::anyhow!(
            "not a valid {} category URL: {e} (expected {})",
            retailer.name,
            category.url_rule.describe()
        )
    })?;

    let scraped = client(config)?
        .scrape_category(retailer, url.trim(), page)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scraped.data)?);
    } else {
        for line in category_lines(retailer, &scraped.data) {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use retailscope_core::display::SectionView;
    use retailscope_core::ProductPayload;
    use serde_json::json;

    use super::*;

    #[test]
    fn product_lines_show_price_block_and_sections() {
        let view = ProductView {
            title: "Phone".to_string(),
            brand: Some("Acme".to_string()),
            price: Some("\u{20b9}999".to_string()),
            mrp: Some("\u{20b9}1,499".to_string()),
            discount: Some("33% off".to_string()),
            rating: None,
            images: vec!["https://cdn.example.com/1.jpg".to_string()],
            sections: vec![SectionView {
                key: "specs".to_string(),
                title: "Specs".to_string(),
                body: SectionBody::Pairs(vec![
                    ("RAM".to_string(), "8 GB".to_string()),
                    ("Colour".to_string(), "Black".to_string()),
                ]),
                limit: Some(1),
            }],
        };
        let lines = product_lines(&view);
        assert_eq!(lines[0], "Phone");
        assert!(lines.contains(&"price:    \u{20b9}999 (MRP \u{20b9}1,499) 33% off".to_string()));
        assert!(lines.contains(&"[Specs]".to_string()));
        assert!(lines.contains(&"  RAM     8 GB".to_string()));
        assert!(lines.contains(&"  Colour  Black".to_string()));
    }

    #[test]
    fn category_lines_summarize_pages() {
        let retailer: RetailerConfig = serde_json::from_value(json!({
            "slug": "myntra",
            "name": "Myntra",
            "group": "fashion",
            "route": "/myntra",
            "url_rule": { "hosts": ["myntra.com"] }
        }))
        .unwrap();
        let listing = CategoryPayload {
            category: Some("Shirts".to_string()),
            products: vec![serde_json::from_value::<ProductPayload>(json!({ "title": "Linen shirt" }))
                .unwrap()],
            current_page: Some(1),
            total_pages: Some(3),
            ..CategoryPayload::default()
        };
        let lines = category_lines(&retailer, &listing);
        assert_eq!(lines[0], "Shirts - page 1 of 3 (more pages)");
        assert!(lines[1].trim_start().starts_with("Linen shirt"));
    }
}
