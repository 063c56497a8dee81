//! Host/path substring rules used to reject retailer URLs before any request
//! leaves the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlRuleError {
    #[error("URL is empty")]
    Empty,

    #[error("\"{input}\" is not a valid http(s) URL")]
    Malformed { input: String },

    #[error("host must contain {expected}")]
    WrongHost { expected: String },

    #[error("path must contain {expected}")]
    WrongPath { expected: String },
}

/// Accepts a URL when its host contains one of `hosts` and its path (plus
/// query string) contains one of `paths`. An empty `paths` list accepts any path.
///
/// Matching is case-insensitive substring matching, not a URL grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRule {
    pub hosts: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    /// A URL that satisfies the rule, shown as an input placeholder.
    #[serde(default)]
    pub example: Option<String>,
}

impl UrlRule {
    /// Checks `input` against the rule and returns the parsed URL.
    ///
    /// # Errors
    ///
    /// Returns the first failed check: empty input, unparsable or non-http(s)
    /// URL, host mismatch, then path mismatch.
    pub fn check(&self, input: &str) -> Result<Url, UrlRuleError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UrlRuleError::Empty);
        }

        let url = Url::parse(trimmed).map_err(|_| UrlRuleError::Malformed {
            input: trimmed.to_owned(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UrlRuleError::Malformed {
                input: trimmed.to_owned(),
            });
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !self
            .hosts
            .iter()
            .any(|h| host.contains(&h.to_ascii_lowercase()))
        {
            return Err(UrlRuleError::WrongHost {
                expected: join_alternatives(&self.hosts),
            });
        }

        if !self.paths.is_empty() {
            let mut target = url.path().to_ascii_lowercase();
            if let Some(query) = url.query() {
                target.push('?');
                target.push_str(&query.to_ascii_lowercase());
            }
            if !self
                .paths
                .iter()
                .any(|p| target.contains(&p.to_ascii_lowercase()))
            {
                return Err(UrlRuleError::WrongPath {
                    expected: join_alternatives(&self.paths),
                });
            }
        }

        Ok(url)
    }

    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.check(input).is_ok()
    }

    /// Human-readable summary, e.g. `"amazon.in and /dp/"`.
    #[must_use]
    pub fn describe(&self) -> String {
        let hosts = join_alternatives(&self.hosts);
        if self.paths.is_empty() {
            hosts
        } else {
            format!("{hosts} and {}", join_alternatives(&self.paths))
        }
    }
}

fn join_alternatives(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amazon() -> UrlRule {
        UrlRule {
            hosts: vec!["amazon.in".to_string()],
            paths: vec!["/dp/".to_string()],
            example: None,
        }
    }

    fn pharmacy() -> UrlRule {
        UrlRule {
            hosts: vec!["1mg.com".to_string()],
            paths: vec!["/drugs/".to_string(), "/otc/".to_string()],
            example: None,
        }
    }

    #[test]
    fn accepts_matching_url() {
        let url = amazon()
            .check("https://www.amazon.in/Apple-iPhone-15/dp/B0CHX1W1XY?th=1")
            .expect("valid amazon url");
        assert_eq!(url.host_str(), Some("www.amazon.in"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(amazon().matches("   https://www.amazon.in/dp/B0CHX1W1XY  "));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(amazon().check(""), Err(UrlRuleError::Empty));
        assert_eq!(amazon().check(" \t\n"), Err(UrlRuleError::Empty));
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(matches!(
            amazon().check("www.amazon.in/dp/B0CHX1W1XY"),
            Err(UrlRuleError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            amazon().check("javascript://amazon.in/dp/x"),
            Err(UrlRuleError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_wrong_host() {
        assert!(matches!(
            amazon().check("https://www.amazon.com/dp/B0CHX1W1XY"),
            Err(UrlRuleError::WrongHost { .. })
        ));
    }

    #[test]
    fn rejects_missing_path_segment() {
        assert!(matches!(
            amazon().check("https://www.amazon.in/s?k=iphone"),
            Err(UrlRuleError::WrongPath { .. })
        ));
    }

    #[test]
    fn path_match_is_case_insensitive() {
        assert!(amazon().matches("https://www.AMAZON.in/gp/DP/B0CHX1W1XY"));
    }

    #[test]
    fn any_listed_path_is_enough() {
        let rule = pharmacy();
        assert!(rule.matches("https://www.1mg.com/drugs/dolo-650-tablet-74467"));
        assert!(rule.matches("https://www.1mg.com/otc/volini-gel-otc322956"));
        assert!(!rule.matches("https://www.1mg.com/categories/health"));
    }

    #[test]
    fn empty_path_list_accepts_any_path() {
        let rule = UrlRule {
            hosts: vec!["myntra.com".to_string()],
            paths: vec![],
            example: None,
        };
        assert!(rule.matches("https://www.myntra.com/men-tshirts"));
    }

    #[test]
    fn query_string_counts_toward_path_match() {
        let rule = UrlRule {
            hosts: vec!["flipkart.com".to_string()],
            paths: vec!["pid=".to_string()],
            example: None,
        };
        assert!(rule.matches("https://www.flipkart.com/item?pid=MOBGTAGPTB3VS24W"));
    }

    #[test]
    fn describe_lists_alternatives() {
        assert_eq!(amazon().describe(), "amazon.in and /dp/");
        assert_eq!(pharmacy().describe(), "1mg.com and /drugs/ or /otc/");
    }
}
