use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;

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
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_dir, PathBuf::from("./data"));
    assert_eq!(cfg.country_code, "234");
    assert_eq!(cfg.search_base_url, "https://www.google.com/maps/search/");
    assert_eq!(cfg.scroll_pause_ms, 3000);
    assert_eq!(cfg.scroll_max_iterations, 50);
    assert_eq!(cfg.feed_timeout_secs, 15);
    assert_eq!(cfg.detail_timeout_secs, 15);
    assert_eq!(cfg.request_delay_ms, 2000);
    assert_eq!(cfg.verify_url_template, "https://wa.me/{phone}");
    assert_eq!(cfg.verify_timeout_secs, 10);
    assert_eq!(cfg.probe.host, "wa.me");
    assert_eq!(cfg.probe.port, 80);
    assert_eq!(cfg.probe.timeout_secs, 5);
    assert!(cfg.browser.headless);
    assert!(cfg.browser.chrome_path.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_DATA_DIR", "/tmp/scout");
    map.insert("DIRSCOUT_SCROLL_MAX_ITERATIONS", "5");
    map.insert("DIRSCOUT_REQUEST_DELAY_MS", "0");
    map.insert("DIRSCOUT_HEADLESS", "false");
    map.insert("CHROME_PATH", "/usr/bin/chromium");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.data_dir, PathBuf::from("/tmp/scout"));
    assert_eq!(cfg.scroll_max_iterations, 5);
    assert_eq!(cfg.request_delay_ms, 0);
    assert!(!cfg.browser.headless);
    assert_eq!(
        cfg.browser.chrome_path,
        Some(PathBuf::from("/usr/bin/chromium"))
    );
}

#[test]
fn country_code_plus_prefix_is_stripped() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_COUNTRY_CODE", "+44");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.country_code, "44");
}

#[test]
fn country_code_with_letters_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_COUNTRY_CODE", "ng");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_COUNTRY_CODE"),
        "expected InvalidEnvVar(DIRSCOUT_COUNTRY_CODE), got: {result:?}"
    );
}

#[test]
fn country_code_with_leading_zero_is_rejected() {
    for code in ["01", "+044", "0"] {
        let mut map = HashMap::new();
        map.insert("DIRSCOUT_COUNTRY_CODE", code);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_COUNTRY_CODE"),
            "expected {code} to be rejected, got: {result:?}"
        );
    }
}

#[test]
fn verify_template_without_placeholder_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_VERIFY_URL_TEMPLATE", "https://wa.me/");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_VERIFY_URL_TEMPLATE"),
        "expected InvalidEnvVar(DIRSCOUT_VERIFY_URL_TEMPLATE), got: {result:?}"
    );
}

#[test]
fn invalid_scroll_pause_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_SCROLL_PAUSE_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_SCROLL_PAUSE_MS"),
        "expected InvalidEnvVar(DIRSCOUT_SCROLL_PAUSE_MS), got: {result:?}"
    );
}

#[test]
fn invalid_probe_port_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_PROBE_PORT", "70000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_PROBE_PORT"),
        "expected InvalidEnvVar(DIRSCOUT_PROBE_PORT), got: {result:?}"
    );
}

#[test]
fn invalid_headless_flag_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_HEADLESS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_HEADLESS"),
        "expected InvalidEnvVar(DIRSCOUT_HEADLESS), got: {result:?}"
    );
}

#[test]
fn duration_helpers_convert_units() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scroll_pause().as_millis(), 3000);
    assert_eq!(cfg.detail_timeout().as_secs(), 15);
    assert_eq!(cfg.verify_timeout().as_secs(), 10);
    assert_eq!(cfg.probe.timeout().as_secs(), 5);
}
