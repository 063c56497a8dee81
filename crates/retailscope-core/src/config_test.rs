use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production_short_form() {
    assert_eq!(parse_environment("prod").unwrap(), Environment::Production);
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "RETAILSCOPE_ENV"));
}

#[test]
fn empty_environment_yields_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should load");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.api_base_url, "http://localhost:3333/api");
    assert_eq!(cfg.demo_username, "admin");
    assert_eq!(cfg.demo_password, "demo123");
    assert!(cfg.demo_credentials_defaulted);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.features, FeatureFlags::default());
    assert_eq!(
        cfg.retailers_path.to_string_lossy(),
        "./config/retailers.yaml"
    );
}

#[test]
fn demo_credentials_override() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_DEMO_USERNAME", "operator");
    map.insert("RETAILSCOPE_DEMO_PASSWORD", "s3cret-pass");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.demo_username, "operator");
    assert_eq!(cfg.demo_password, "s3cret-pass");
    assert!(!cfg.demo_credentials_defaulted);
}

#[test]
fn blank_demo_username_falls_back() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_DEMO_USERNAME", "   ");
    map.insert("RETAILSCOPE_DEMO_PASSWORD", "s3cret-pass");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.demo_username, "admin");
    assert!(cfg.demo_credentials_defaulted);
}

#[test]
fn api_base_url_trailing_slash_is_stripped() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_API_BASE_URL", "https://scraper.internal/api/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "https://scraper.internal/api");
}

#[test]
fn api_base_url_rejects_non_http_scheme() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_API_BASE_URL", "ftp://scraper.internal/api");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILSCOPE_API_BASE_URL"),
        "expected InvalidEnvVar(RETAILSCOPE_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn api_base_url_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_API_BASE_URL", "not a url");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn invalid_bind_addr_fails() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILSCOPE_BIND_ADDR"),
        "expected InvalidEnvVar(RETAILSCOPE_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_REQUEST_TIMEOUT_SECS", "90");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 90);
}

#[test]
fn request_timeout_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILSCOPE_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(RETAILSCOPE_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_REQUEST_TIMEOUT_SECS", "soon");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn feature_flags_parse_common_spellings() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_ENABLE_CATEGORY_SCRAPING", "off");
    map.insert("RETAILSCOPE_ENABLE_HISTORY", "0");
    map.insert("RETAILSCOPE_ENABLE_DEBUG_PAYLOAD", "Yes");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.features.category_scraping);
    assert!(!cfg.features.history);
    assert!(cfg.features.debug_payload);
}

#[test]
fn feature_flag_invalid_value_fails() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_ENABLE_HISTORY", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILSCOPE_ENABLE_HISTORY"),
        "expected InvalidEnvVar(RETAILSCOPE_ENABLE_HISTORY), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_demo_password() {
    let mut map = HashMap::new();
    map.insert("RETAILSCOPE_DEMO_PASSWORD", "super-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
