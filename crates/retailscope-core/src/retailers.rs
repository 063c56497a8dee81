use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::display::DisplayConfig;
use crate::url_rule::UrlRule;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetailerGroup {
    Marketplace,
    Fashion,
    Electronics,
    Grocery,
    Pharmacy,
    Beauty,
    Home,
    Kids,
}

impl RetailerGroup {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RetailerGroup::Marketplace => "Marketplaces",
            RetailerGroup::Fashion => "Fashion",
            RetailerGroup::Electronics => "Electronics",
            RetailerGroup::Grocery => "Grocery",
            RetailerGroup::Pharmacy => "Pharmacy",
            RetailerGroup::Beauty => "Beauty",
            RetailerGroup::Home => "Home & Furniture",
            RetailerGroup::Kids => "Kids",
        }
    }
}

impl std::fmt::Display for RetailerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RetailerGroup::Marketplace => "marketplace",
            RetailerGroup::Fashion => "fashion",
            RetailerGroup::Electronics => "electronics",
            RetailerGroup::Grocery => "grocery",
            RetailerGroup::Pharmacy => "pharmacy",
            RetailerGroup::Beauty => "beauty",
            RetailerGroup::Home => "home",
            RetailerGroup::Kids => "kids",
        };
        write!(f, "{name}")
    }
}

/// Category (listing page) scraping for retailers whose API supports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// API route, e.g. `/flipkart/category`.
    pub route: String,
    /// When true the request body carries `page`.
    #[serde(default)]
    pub paginated: bool,
    pub url_rule: UrlRule,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerConfig {
    pub slug: String,
    pub name: String,
    pub group: RetailerGroup,
    /// API route for product scrapes, e.g. `/amazon`.
    pub route: String,
    pub url_rule: UrlRule,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryConfig>,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl RetailerConfig {
    #[must_use]
    pub fn supports_category(&self) -> bool {
        self.category.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerConfig>,
}

/// Validated, ordered set of retailers. Order follows the registry file.
#[derive(Debug, Clone, Default)]
pub struct RetailerRegistry {
    retailers: Vec<RetailerConfig>,
}

impl RetailerRegistry {
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when the set fails validation.
    pub fn new(retailers: Vec<RetailerConfig>) -> Result<Self, ConfigError> {
        validate_retailers(&retailers)?;
        Ok(Self { retailers })
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&RetailerConfig> {
        self.retailers.iter().find(|r| r.slug == slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetailerConfig> {
        self.retailers.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &RetailerConfig> {
        self.retailers.iter().filter(|r| r.enabled)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.retailers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retailers.is_empty()
    }

    /// Enabled retailers grouped for the dashboard, groups in declaration
    /// order of [`RetailerGroup`], retailers in file order.
    #[must_use]
    pub fn grouped(&self) -> Vec<(RetailerGroup, Vec<&RetailerConfig>)> {
        let mut groups: Vec<(RetailerGroup, Vec<&RetailerConfig>)> = Vec::new();
        for retailer in self.enabled() {
            match groups.iter_mut().find(|(g, _)| *g == retailer.group) {
                Some((_, members)) => members.push(retailer),
                None => groups.push((retailer.group, vec![retailer])),
            }
        }
        groups.sort_by_key(|(g, _)| *g);
        groups
    }

    /// First retailer whose product URL rule accepts `url`.
    #[must_use]
    pub fn detect(&self, url: &str) -> Option<&RetailerConfig> {
        self.retailers.iter().find(|r| r.url_rule.matches(url))
    }
}

/// Load and validate the retailer registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<RetailerRegistry, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_retailers(&content)
}

/// Parse and validate registry YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_retailers(yaml: &str) -> Result<RetailerRegistry, ConfigError> {
    let file: RetailersFile = serde_yaml::from_str(yaml).map_err(ConfigError::RetailersFileParse)?;
    RetailerRegistry::new(file.retailers)
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn validate_rule(slug: &str, what: &str, rule: &UrlRule) -> Result<(), ConfigError> {
    if rule.hosts.iter().all(|h| h.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "retailer '{slug}' {what} rule must list at least one host"
        )));
    }
    if let Some(example) = &rule.example {
        if !rule.matches(example) {
            return Err(ConfigError::Validation(format!(
                "retailer '{slug}' {what} example '{example}' does not satisfy its own rule"
            )));
        }
    }
    Ok(())
}

fn validate_retailers(retailers: &[RetailerConfig]) -> Result<(), ConfigError> {
    if retailers.is_empty() {
        return Err(ConfigError::Validation(
            "retailer registry must contain at least one retailer".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();

    for retailer in retailers {
        if !is_valid_slug(&retailer.slug) {
            return Err(ConfigError::Validation(format!(
                "retailer slug '{}' must be lowercase ascii letters, digits and inner dashes",
                retailer.slug
            )));
        }
        if !seen_slugs.insert(retailer.slug.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer slug: '{}'",
                retailer.slug
            )));
        }
        if retailer.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' name must be non-empty",
                retailer.slug
            )));
        }
        if !retailer.route.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' route '{}' must start with '/'",
                retailer.slug, retailer.route
            )));
        }
        validate_rule(&retailer.slug, "product", &retailer.url_rule)?;

        if let Some(category) = &retailer.category {
            if !category.route.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "retailer '{}' category route '{}' must start with '/'",
                    retailer.slug, category.route
                )));
            }
            validate_rule(&retailer.slug, "category", &category.url_rule)?;
        }

        let mut seen_sections = HashSet::new();
        for section in &retailer.display.sections {
            if !seen_sections.insert(section.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "retailer '{}' has duplicate display section key '{}'",
                    retailer.slug, section.key
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "retailers_test.rs"]
mod tests;
