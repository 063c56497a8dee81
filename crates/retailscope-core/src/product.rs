//! Payload shapes returned by the scraping API.
//!
//! Every retailer returns its own product shape. Rather than one struct per
//! retailer, a product is kept as the JSON object it arrived as and common
//! fields are read through alias lists. Retailer-specific fields are reached
//! by the display config (see [`crate::display`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TITLE_KEYS: &[&str] = &["title", "name", "productName", "product_name"];
const BRAND_KEYS: &[&str] = &["brand", "brandName", "brand_name", "manufacturer"];
const MRP_KEYS: &[&str] = &["mrp", "originalPrice", "original_price", "listPrice", "maxPrice"];
const PRICE_KEYS: &[&str] = &[
    "sellingPrice",
    "selling_price",
    "price",
    "salePrice",
    "finalPrice",
    "offerPrice",
];
const DISCOUNT_KEYS: &[&str] = &["discount", "discountPercentage", "discountText", "savings"];
const RATING_KEYS: &[&str] = &["rating", "averageRating", "avgRating", "ratings.average"];
const REVIEW_COUNT_KEYS: &[&str] = &["reviewCount", "ratingCount", "totalRatings", "ratings.count"];
const IMAGE_KEYS: &[&str] = &["images", "imageUrls", "image_urls", "image", "mainImage"];
const IMAGE_OBJECT_KEYS: &[&str] = &["hiRes", "large", "url", "src", "thumbnail"];

/// A scraped product as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductPayload(Map<String, Value>);

impl ProductPayload {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Looks up a dotted path (`"details.composition"`). `null` counts as absent.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        (!current.is_null()).then_some(current)
    }

    /// Returns the first present value among `paths`.
    pub fn first<S: AsRef<str>>(&self, paths: &[S]) -> Option<&Value> {
        paths.iter().find_map(|p| self.get(p.as_ref()))
    }

    /// Returns the first scalar among `paths` rendered as non-empty text.
    pub fn first_text<S: AsRef<str>>(&self, paths: &[S]) -> Option<String> {
        paths
            .iter()
            .filter_map(|p| self.get(p.as_ref()))
            .find_map(scalar_text)
    }

    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.first_text(TITLE_KEYS)
    }

    #[must_use]
    pub fn brand(&self) -> Option<String> {
        self.first_text(BRAND_KEYS)
    }

    #[must_use]
    pub fn mrp(&self) -> Option<&Value> {
        self.first(MRP_KEYS)
    }

    #[must_use]
    pub fn selling_price(&self) -> Option<&Value> {
        self.first(PRICE_KEYS)
    }

    #[must_use]
    pub fn discount(&self) -> Option<&Value> {
        self.first(DISCOUNT_KEYS)
    }

    #[must_use]
    pub fn rating(&self) -> Option<&Value> {
        self.first(RATING_KEYS)
    }

    #[must_use]
    pub fn review_count(&self) -> Option<String> {
        self.first_text(REVIEW_COUNT_KEYS)
    }

    /// Raw image URL candidates in payload order, before any filtering.
    ///
    /// Accepts a single string, an array of strings, or an array of objects
    /// carrying the URL under one of the usual keys (`hiRes`, `large`, `url`, ...).
    #[must_use]
    pub fn image_candidates(&self) -> Vec<String> {
        let Some(value) = self.first(IMAGE_KEYS) else {
            return Vec::new();
        };
        match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => IMAGE_OBJECT_KEYS
                        .iter()
                        .find_map(|k| map.get(*k).and_then(Value::as_str))
                        .map(str::to_owned),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Renders a scalar JSON value as text. Arrays, objects, `null` and blank
/// strings yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("Yes".to_owned()),
        Value::Bool(false) => Some("No".to_owned()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Nested pagination block some retailers return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default, alias = "page", alias = "current_page")]
    pub current_page: Option<u32>,
    #[serde(default, alias = "total_pages")]
    pub total_pages: Option<u32>,
    #[serde(default, alias = "hasNext", alias = "has_next_page")]
    pub has_next_page: Option<bool>,
}

/// A category (listing) page result.
///
/// Retailers disagree on pagination: some report it at the top level, some
/// nest it under `pagination`. Both are accepted and merged by
/// [`CategoryPayload::page_info`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(default, alias = "categoryName", alias = "title")]
    pub category: Option<String>,
    #[serde(default, alias = "items")]
    pub products: Vec<ProductPayload>,
    #[serde(default, alias = "page", alias = "current_page")]
    pub current_page: Option<u32>,
    #[serde(default, alias = "total_pages")]
    pub total_pages: Option<u32>,
    #[serde(default, alias = "totalCount", alias = "total_products")]
    pub total_products: Option<u64>,
    #[serde(default, alias = "hasNext", alias = "has_next_page")]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination facts merged from a [`CategoryPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current: u32,
    pub total: Option<u32>,
    pub has_next: bool,
}

impl CategoryPayload {
    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        let nested = self.pagination.clone().unwrap_or_default();
        let current = self.current_page.or(nested.current_page).unwrap_or(1);
        let total = self.total_pages.or(nested.total_pages);
        let has_next = self
            .has_next_page
            .or(nested.has_next_page)
            .unwrap_or_else(|| total.is_some_and(|t| current < t));
        PageInfo {
            current,
            total,
            has_next,
        }
    }
}
