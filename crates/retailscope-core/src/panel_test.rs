use chrono::TimeZone;
use serde_json::json;

use super::*;
use crate::display::DisplayConfig;
use crate::retailers::{CategoryConfig, RetailerGroup};
use crate::url_rule::UrlRule;

fn amazon() -> RetailerConfig {
    RetailerConfig {
        slug: "amazon".to_string(),
        name: "Amazon".to_string(),
        group: RetailerGroup::Marketplace,
        route: "/amazon".to_string(),
        url_rule: UrlRule {
            hosts: vec!["amazon.in".to_string()],
            paths: vec!["/dp/".to_string()],
            example: None,
        },
        enabled: true,
        tagline: None,
        category: None,
        display: DisplayConfig::default(),
    }
}

fn flipkart() -> RetailerConfig {
    RetailerConfig {
        slug: "flipkart".to_string(),
        name: "Flipkart".to_string(),
        group: RetailerGroup::Marketplace,
        route: "/flipkart".to_string(),
        url_rule: UrlRule {
            hosts: vec!["flipkart.com".to_string()],
            paths: vec!["/p/".to_string()],
            example: None,
        },
        enabled: true,
        tagline: None,
        category: Some(CategoryConfig {
            route: "/flipkart/category".to_string(),
            paginated: true,
            url_rule: UrlRule {
                hosts: vec!["flipkart.com".to_string()],
                paths: vec!["/search".to_string()],
                example: None,
            },
        }),
        display: DisplayConfig::default(),
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn stale() -> Duration {
    Duration::seconds(60)
}

fn product(title: &str) -> ProductPayload {
    serde_json::from_value(json!({ "title": title })).unwrap()
}

fn product_request(url: &str) -> ScrapeRequest {
    ScrapeRequest::Product {
        url: url.to_string(),
    }
}

const URL: &str = "https://www.amazon.in/dp/B0CHX1W1XY";

#[test]
fn empty_url_is_rejected_without_loading() {
    let mut panel = PanelState::default();
    let err = panel
        .begin(&amazon(), product_request("   "), at(0), stale())
        .unwrap_err();
    assert_eq!(err, PanelError::EmptyUrl);
    assert_eq!(panel.error.as_deref(), Some("Please enter a product URL"));
    assert!(!panel.is_loading);
    assert!(panel.last_request.is_none());
}

#[test]
fn url_failing_rule_names_the_expected_shape() {
    let mut panel = PanelState::default();
    let err = panel
        .begin(
            &amazon(),
            product_request("https://www.amazon.in/s?k=phone"),
            at(0),
            stale(),
        )
        .unwrap_err();
    assert!(matches!(err, PanelError::InvalidUrl { .. }));
    let message = panel.error.unwrap();
    assert!(message.starts_with("Please enter a valid Amazon URL"));
    assert!(message.contains("/dp/"));
    assert!(!panel.is_loading);
}

#[test]
fn begin_trims_and_marks_loading() {
    let mut panel = PanelState {
        error: Some("old".to_string()),
        product: Some(product("old")),
        ..PanelState::default()
    };
    panel
        .begin(&amazon(), product_request(&format!("  {URL} ")), at(0), stale())
        .unwrap();
    assert!(panel.is_loading);
    assert_eq!(panel.url, URL);
    assert!(panel.error.is_none());
    assert!(panel.product.is_none());
    assert_eq!(panel.last_request, Some(product_request(URL)));
}

#[test]
fn second_submit_while_loading_is_busy() {
    let mut panel = PanelState::default();
    panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    let err = panel
        .begin(&amazon(), product_request(URL), at(5), stale())
        .unwrap_err();
    assert_eq!(err, PanelError::Busy);
}

#[test]
fn abandoned_loading_state_expires() {
    let mut panel = PanelState::default();
    panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    assert!(panel
        .begin(&amazon(), product_request(URL), at(61), stale())
        .is_ok());
}

#[test]
fn success_stores_product_and_prepends_history() {
    let mut panel = PanelState::default();
    let ticket = panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    assert!(panel.complete(
        ticket,
        Ok(ScrapeOutcome::Product(product("iPhone 15"))),
        true,
        at(2)
    ));
    assert!(!panel.is_loading);
    assert_eq!(panel.product, Some(product("iPhone 15")));
    assert_eq!(panel.history.len(), 1);
    let entry = panel.history.get(0).unwrap();
    assert_eq!(entry.url, URL);
    assert_eq!(entry.title, "iPhone 15");
    assert_eq!(entry.scraped_at, at(2));
}

#[test]
fn history_is_capped_newest_first() {
    let mut panel = PanelState::default();
    for i in 0..7 {
        let ticket = panel
            .begin(&amazon(), product_request(URL), at(i), stale())
            .unwrap();
        panel.complete(
            ticket,
            Ok(ScrapeOutcome::Product(product(&format!("item {i}")))),
            true,
            at(i),
        );
    }
    assert_eq!(panel.history.len(), HISTORY_LIMIT);
    let titles: Vec<&str> = panel.history.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["item 6", "item 5", "item 4", "item 3", "item 2"]);
}

#[test]
fn history_can_be_disabled() {
    let mut panel = PanelState::default();
    let ticket = panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    panel.complete(ticket, Ok(ScrapeOutcome::Product(product("x"))), false, at(1));
    assert!(panel.history.is_empty());
    assert!(panel.product.is_some());
}

#[test]
fn failure_stores_message_with_fallback() {
    let mut panel = PanelState::default();
    let ticket = panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    panel.complete(ticket, Err("Product not found".to_string()), true, at(1));
    assert_eq!(panel.error.as_deref(), Some("Product not found"));
    assert!(panel.history.is_empty());

    let ticket = panel.begin(&amazon(), product_request(URL), at(2), stale()).unwrap();
    panel.complete(ticket, Err("  ".to_string()), true, at(3));
    assert_eq!(panel.error.as_deref(), Some(FALLBACK_FAILURE_MESSAGE));
}

#[test]
fn stale_response_is_discarded() {
    let mut panel = PanelState::default();
    let first = panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    panel.clear();
    let second = panel.begin(&amazon(), product_request(URL), at(1), stale()).unwrap();

    assert!(!panel.complete(first, Ok(ScrapeOutcome::Product(product("old"))), true, at(2)));
    assert!(panel.is_loading);
    assert!(panel.product.is_none());

    assert!(panel.complete(second, Ok(ScrapeOutcome::Product(product("new"))), true, at(3)));
    assert_eq!(panel.product, Some(product("new")));
    assert_eq!(panel.history.len(), 1);
}

#[test]
fn retry_reissues_last_request() {
    let mut panel = PanelState::default();
    let ticket = panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    panel.complete(ticket, Err("timeout".to_string()), true, at(1));

    let (ticket, request) = panel.retry(&amazon(), at(2), stale()).unwrap();
    assert_eq!(request, product_request(URL));
    assert!(panel.is_loading);
    assert!(panel.error.is_none());
    assert!(panel.complete(ticket, Ok(ScrapeOutcome::Product(product("ok"))), true, at(3)));
}

#[test]
fn clear_keeps_history_and_forgets_request() {
    let mut panel = PanelState::default();
    let ticket = panel.begin(&amazon(), product_request(URL), at(0), stale()).unwrap();
    panel.complete(ticket, Ok(ScrapeOutcome::Product(product("x"))), true, at(1));
    panel.clear();
    assert!(panel.url.is_empty());
    assert!(panel.product.is_none());
    assert_eq!(panel.history.len(), 1);
    assert_eq!(
        panel.retry(&amazon(), at(2), stale()).unwrap_err(),
        PanelError::NothingToRetry
    );
}

#[test]
fn restore_makes_entry_current_without_loading() {
    let mut panel = PanelState::default();
    for (i, title) in ["first", "second"].iter().enumerate() {
        let ticket = panel
            .begin(&amazon(), product_request(URL), at(i64::try_from(i).unwrap()), stale())
            .unwrap();
        panel.complete(ticket, Ok(ScrapeOutcome::Product(product(title))), true, at(5));
    }
    panel.restore(1).unwrap();
    assert_eq!(panel.product, Some(product("first")));
    assert!(!panel.is_loading);
    assert_eq!(panel.history.len(), 2);
    assert_eq!(panel.restore(9).unwrap_err(), PanelError::HistoryOutOfRange(9));
}

#[test]
fn retry_after_restore_targets_restored_url() {
    let older = "https://www.amazon.in/dp/B0OLDER";
    let mut panel = PanelState::default();
    for (i, url) in [older, URL].iter().enumerate() {
        let ticket = panel
            .begin(&amazon(), product_request(url), at(i64::try_from(i).unwrap()), stale())
            .unwrap();
        panel.complete(ticket, Ok(ScrapeOutcome::Product(product(url))), true, at(5));
    }
    assert_eq!(panel.last_request, Some(product_request(URL)));

    panel.restore(1).unwrap();
    assert_eq!(panel.url, older);
    let (_, request) = panel.retry(&amazon(), at(6), stale()).unwrap();
    assert_eq!(request, product_request(older));
}

#[test]
fn category_requires_category_config() {
    let mut panel = PanelState::default();
    let err = panel
        .begin(
            &amazon(),
            ScrapeRequest::Category {
                url: URL.to_string(),
                page: None,
            },
            at(0),
            stale(),
        )
        .unwrap_err();
    assert!(matches!(err, PanelError::CategoryUnsupported { .. }));
}

#[test]
fn category_request_defaults_page_and_stores_result() {
    let mut panel = PanelState::default();
    let ticket = panel
        .begin(
            &flipkart(),
            ScrapeRequest::Category {
                url: "https://www.flipkart.com/search?q=shoes".to_string(),
                page: Some(0),
            },
            at(0),
            stale(),
        )
        .unwrap();
    assert_eq!(
        panel.last_request,
        Some(ScrapeRequest::Category {
            url: "https://www.flipkart.com/search?q=shoes".to_string(),
            page: Some(1),
        })
    );
    let listing: CategoryPayload =
        serde_json::from_value(json!({"products": [{"title": "A"}]})).unwrap();
    panel.complete(ticket, Ok(ScrapeOutcome::Category(listing)), true, at(1));
    assert_eq!(panel.category.as_ref().map(|c| c.products.len()), Some(1));
    assert!(panel.history.is_empty());
}

#[test]
fn empty_category_url_has_its_own_message() {
    let mut panel = PanelState::default();
    let err = panel
        .begin(
            &flipkart(),
            ScrapeRequest::Category {
                url: String::new(),
                page: None,
            },
            at(0),
            stale(),
        )
        .unwrap_err();
    assert_eq!(err, PanelError::EmptyCategoryUrl);
}
