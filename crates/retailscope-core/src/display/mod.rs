//! Generic product display.
//!
//! Each retailer contributes a [`DisplayConfig`] (which payload fields feed
//! which section, how images are filtered). [`build_product_view`] interprets
//! that config against a [`ProductPayload`] and produces a [`ProductView`]
//! that front ends (HTML dashboard, CLI) render without knowing the retailer.

mod placeholder;
mod state;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::{format_discount, format_price_value, format_rating, parse_amount};
use crate::product::{scalar_text, ProductPayload};
use crate::text::{collapse_whitespace, normalize_text};

pub use placeholder::{placeholder_data_uri, PLACEHOLDER_LABEL};
pub use state::{Carousel, DisplayState};

fn default_currency() -> String {
    "\u{20b9}".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-retailer display configuration, read from the retailer registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Run scraped text through [`normalize_text`].
    #[serde(default = "default_true")]
    pub clean_text: bool,
    #[serde(default)]
    pub image_filter: ImageFilter,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            clean_text: true,
            image_filter: ImageFilter::default(),
            sections: Vec::new(),
        }
    }
}

/// Drops image URLs that are not worth showing (sprites, tracking pixels,
/// relative paths) and caps how many are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilter {
    /// Case-insensitive substrings; any match drops the URL.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl ImageFilter {
    /// Keeps absolute http(s) URLs (protocol-relative ones are upgraded to
    /// https), drops excluded ones and duplicates, and preserves order.
    #[must_use]
    pub fn apply<I>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let excluded: Vec<String> = self.exclude.iter().map(|e| e.to_lowercase()).collect();
        let mut kept: Vec<String> = Vec::new();
        for raw in candidates {
            let trimmed = raw.trim();
            let url = if let Some(rest) = trimmed.strip_prefix("//") {
                format!("https://{rest}")
            } else {
                trimmed.to_owned()
            };
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                continue;
            }
            let lower = url.to_lowercase();
            if excluded.iter().any(|e| lower.contains(e.as_str())) {
                continue;
            }
            if self.max.is_some_and(|max| kept.len() >= max) {
                break;
            }
            if kept.contains(&url) {
                continue;
            }
            kept.push(url);
        }
        kept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Label/value rows from a map, a list of `{name, value}` objects, or
    /// `"Label: value"` strings.
    KeyValue,
    /// Bullet items from an array (offers, highlights, sizes).
    List,
    /// One block of prose (description).
    Text,
    /// Fixed labelled scalar fields (manufacturer, composition, ...).
    Fields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledField {
    pub label: String,
    /// Candidate payload paths, first present wins.
    pub source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Stable identifier, used in the `expand` query parameter.
    pub key: String,
    pub title: String,
    pub kind: SectionKind,
    /// Candidate payload paths for `key_value`, `list` and `text` sections.
    #[serde(default)]
    pub source: Vec<String>,
    /// Labelled fields for `fields` sections.
    #[serde(default)]
    pub fields: Vec<LabeledField>,
    /// Rows shown before the "show all" toggle.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Pairs(Vec<(String, String)>),
    Items(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub key: String,
    pub title: String,
    pub body: SectionBody,
    pub limit: Option<usize>,
}

impl SectionView {
    /// Number of rows (pairs or items); text counts as one.
    #[must_use]
    pub fn total(&self) -> usize {
        match &self.body {
            SectionBody::Pairs(pairs) => pairs.len(),
            SectionBody::Items(items) => items.len(),
            SectionBody::Text(_) => 1,
        }
    }

    /// `true` when the section has more rows than its limit.
    #[must_use]
    pub fn is_truncatable(&self) -> bool {
        self.limit.is_some_and(|limit| self.total() > limit)
    }

    /// How many rows to show for the given expansion state.
    #[must_use]
    pub fn visible_len(&self, expanded: bool) -> usize {
        match self.limit {
            Some(limit) if !expanded => self.total().min(limit),
            _ => self.total(),
        }
    }
}

/// Everything a front end needs to render one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub title: String,
    pub brand: Option<String>,
    pub price: Option<String>,
    /// Only set when it differs from `price`.
    pub mrp: Option<String>,
    pub discount: Option<String>,
    pub rating: Option<String>,
    pub images: Vec<String>,
    pub sections: Vec<SectionView>,
}

impl ProductView {
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.key == key)
    }
}

/// Interprets `config` against `product`. The payload is only read.
#[must_use]
pub fn build_product_view(config: &DisplayConfig, product: &ProductPayload) -> ProductView {
    let clean = |raw: &str| -> String {
        if config.clean_text {
            normalize_text(raw)
        } else {
            collapse_whitespace(raw)
        }
    };

    let title = product
        .title()
        .map(|t| clean(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled product".to_string());
    let brand = product.brand().map(|b| clean(&b)).filter(|b| !b.is_empty());

    let price_value = product.selling_price();
    let mrp_value = product.mrp();
    let price_amount = price_value.and_then(parse_amount);
    let mrp_amount = mrp_value.and_then(parse_amount);

    let price = price_value.and_then(|v| format_price_value(v, &config.currency));
    let mrp = match (mrp_amount, price_amount) {
        (Some(m), Some(p)) if m <= p => None,
        _ => mrp_value
            .and_then(|v| format_price_value(v, &config.currency))
            .filter(|m| price.as_ref() != Some(m)),
    };
    let discount = format_discount(product.discount(), mrp_amount, price_amount);
    let rating = product
        .rating()
        .and_then(|r| format_rating(r, product.review_count().as_deref()));

    let images = config.image_filter.apply(product.image_candidates());

    let sections = config
        .sections
        .iter()
        .filter_map(|section| build_section(section, product, &clean))
        .collect();

    ProductView {
        title,
        brand,
        price,
        mrp,
        discount,
        rating,
        images,
        sections,
    }
}

fn build_section(
    section: &SectionConfig,
    product: &ProductPayload,
    clean: &dyn Fn(&str) -> String,
) -> Option<SectionView> {
    let body = match section.kind {
        SectionKind::KeyValue => {
            let pairs = key_value_pairs(product.first(section.source.as_slice())?, clean);
            (!pairs.is_empty()).then_some(SectionBody::Pairs(pairs))?
        }
        SectionKind::List => {
            let items = list_items(product.first(section.source.as_slice())?, clean);
            (!items.is_empty()).then_some(SectionBody::Items(items))?
        }
        SectionKind::Text => {
            let text = text_block(product.first(section.source.as_slice())?, clean);
            (!text.is_empty()).then_some(SectionBody::Text(text))?
        }
        SectionKind::Fields => {
            let pairs: Vec<(String, String)> = section
                .fields
                .iter()
                .filter_map(|field| {
                    let value = product
                        .first(field.source.as_slice())
                        .and_then(|v| scalar_or_joined(v, clean))?;
                    Some((field.label.clone(), value))
                })
                .collect();
            (!pairs.is_empty()).then_some(SectionBody::Pairs(pairs))?
        }
    };

    Some(SectionView {
        key: section.key.clone(),
        title: section.title.clone(),
        body,
        limit: section.limit,
    })
}

const PAIR_NAME_KEYS: &[&str] = &["name", "key", "label", "title", "attribute"];
const PAIR_VALUE_KEYS: &[&str] = &["value", "val", "description", "details"];
const ITEM_HEAD_KEYS: &[&str] = &["title", "name", "type", "offer", "label", "heading"];
const ITEM_BODY_KEYS: &[&str] = &["description", "details", "text", "value", "summary"];

fn key_value_pairs(value: &Value, clean: &dyn Fn(&str) -> String) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                match inner {
                    // Grouped specs: {"General": {"Model": "X"}}
                    Value::Object(group) => {
                        for (inner_key, inner_value) in group {
                            if let Some(v) = scalar_or_joined(inner_value, clean) {
                                pairs.push((clean(inner_key), v));
                            }
                        }
                    }
                    other => {
                        if let Some(v) = scalar_or_joined(other, clean) {
                            pairs.push((clean(key), v));
                        }
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => {
                        let name = PAIR_NAME_KEYS
                            .iter()
                            .find_map(|k| map.get(*k).and_then(scalar_text));
                        let val = PAIR_VALUE_KEYS
                            .iter()
                            .find_map(|k| map.get(*k).and_then(|v| scalar_or_joined(v, clean)));
                        if let (Some(name), Some(val)) = (name, val) {
                            pairs.push((clean(&name), val));
                        }
                    }
                    Value::String(s) => {
                        let cleaned = clean(s);
                        match cleaned.split_once(':') {
                            Some((k, v)) if !k.trim().is_empty() => {
                                pairs.push((k.trim().to_owned(), v.trim().to_owned()));
                            }
                            _ if !cleaned.is_empty() => pairs.push((cleaned, String::new())),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    pairs.retain(|(k, _)| !k.is_empty());
    pairs
}

fn list_items(value: &Value, clean: &dyn Fn(&str) -> String) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(map) => {
                    let head = ITEM_HEAD_KEYS
                        .iter()
                        .find_map(|k| map.get(*k).and_then(scalar_text));
                    let body = ITEM_BODY_KEYS
                        .iter()
                        .find_map(|k| map.get(*k).and_then(scalar_text));
                    match (head, body) {
                        (Some(h), Some(b)) if h != b => Some(format!("{}: {}", clean(&h), clean(&b))),
                        (Some(h), _) => Some(clean(&h)),
                        (None, Some(b)) => Some(clean(&b)),
                        (None, None) => {
                            let joined: Vec<String> =
                                map.values().filter_map(scalar_text).collect();
                            (!joined.is_empty()).then(|| clean(&joined.join(" \u{b7} ")))
                        }
                    }
                }
                other => scalar_text(other).map(|s| clean(&s)),
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| scalar_or_joined(v, clean).map(|v| format!("{}: {v}", clean(k))))
            .collect(),
        other => scalar_text(other).map(|s| clean(&s)).into_iter().collect(),
    };
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

fn text_block(value: &Value, clean: &dyn Fn(&str) -> String) -> String {
    match value {
        Value::Array(parts) => {
            let joined: Vec<String> = parts.iter().filter_map(scalar_text).collect();
            clean(&joined.join(" "))
        }
        other => scalar_text(other).map(|s| clean(&s)).unwrap_or_default(),
    }
}

fn scalar_or_joined(value: &Value, clean: &dyn Fn(&str) -> String) -> Option<String> {
    let text = match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))?
        }
        other => scalar_text(other)?,
    };
    let cleaned = clean(&text);
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
#[path = "display_test.rs"]
mod tests;
