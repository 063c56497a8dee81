//! Registry inspection commands.

use retailscope_core::{RetailerConfig, RetailerRegistry};

/// Table rows for `retailers`, header first.
pub(crate) fn retailer_rows(
    registry: &RetailerRegistry,
    group: Option<&str>,
    include_disabled: bool,
) -> Vec<String> {
    let mut selected: Vec<&RetailerConfig> = registry
        .iter()
        .filter(|r| include_disabled || r.enabled)
        .filter(|r| group.is_none_or(|g| r.group.to_string() == g.trim().to_lowercase()))
        .collect();
    selected.sort_by_key(|r| r.group);

    let mut rows = vec![format!(
        "{:<18}{:<20}{:<13}{:<22}{:<10}STATUS",
        "SLUG", "NAME", "GROUP", "ROUTE", "CATEGORY"
    )];
    for retailer in selected {
        rows.push(format!(
            "{:<18}{:<20}{:<13}{:<22}{:<10}{}",
            retailer.slug,
            retailer.name,
            retailer.group,
            retailer.route,
            if retailer.supports_category() { "yes" } else { "-" },
            if retailer.enabled { "enabled" } else { "disabled" }
        ));
    }
    rows
}

pub(crate) fn run_list(registry: &RetailerRegistry, group: Option<&str>, include_disabled: bool) {
    let rows = retailer_rows(registry, group, include_disabled);
    if rows.len() == 1 {
        println!(
            "no retailers found{}",
            group.map(|g| format!(" in group {g}")).unwrap_or_default()
        );
        return;
    }
    for row in rows {
        println!("{row}");
    }
}

/// Checks `url` against one retailer's rule, or finds the retailer whose
/// rule accepts it.
///
/// # Errors
///
/// Returns an error if the named retailer is unknown, the URL fails its
/// rule, or no retailer accepts the URL.
pub(crate) fn check_url(
    registry: &RetailerRegistry,
    url: &str,
    retailer: Option<&str>,
) -> anyhow::Result<String> {
    match retailer {
        Some(slug) => {
            let retailer = registry
                .get(slug)
                .ok_or_else(|| anyhow::anyhow!("retailer '{slug}' not found"))?;
            retailer.url_rule.check(url).map_err(|e| {
                anyhow::anyhow!(
                    "not a valid {} URL: {e} (expected {})",
                    retailer.name,
                    retailer.url_rule.describe()
                )
            })?;
            Ok(format!("ok: valid {} URL", retailer.name))
        }
        None => {
            let retailer = registry
                .detect(url)
                .ok_or_else(|| anyhow::anyhow!("no configured retailer accepts {url}"))?;
            Ok(format!("ok: {} ({})", retailer.name, retailer.slug))
        }
    }
}

pub(crate) fn run_check(
    registry: &RetailerRegistry,
    url: &str,
    retailer: Option<&str>,
) -> anyhow::Result<()> {
    println!("{}", check_url(registry, url, retailer)?);
    Ok(())
}
