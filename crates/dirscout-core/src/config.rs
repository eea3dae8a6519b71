use std::path::PathBuf;

use crate::app_config::{AppConfig, BrowserSettings, ProbeSettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        or_default(var, default)
            .parse::<u16>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let log_level = or_default("DIRSCOUT_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("DIRSCOUT_DATA_DIR", "./data"));

    let country_code = or_default("DIRSCOUT_COUNTRY_CODE", "234");
    let country_code = country_code.trim().trim_start_matches('+').to_string();
    if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(
            "DIRSCOUT_COUNTRY_CODE",
            format!("expected digits only, got \"{country_code}\""),
        ));
    }
    if country_code.starts_with('0') {
        return Err(invalid(
            "DIRSCOUT_COUNTRY_CODE",
            format!("calling codes never start with 0, got \"{country_code}\""),
        ));
    }

    let search_base_url = or_default(
        "DIRSCOUT_SEARCH_BASE_URL",
        "https://www.google.com/maps/search/",
    );

    let scroll_pause_ms = parse_u64("DIRSCOUT_SCROLL_PAUSE_MS", "3000")?;
    let scroll_max_iterations = parse_u32("DIRSCOUT_SCROLL_MAX_ITERATIONS", "50")?;
    let feed_timeout_secs = parse_u64("DIRSCOUT_FEED_TIMEOUT_SECS", "15")?;
    let detail_timeout_secs = parse_u64("DIRSCOUT_DETAIL_TIMEOUT_SECS", "15")?;
    let request_delay_ms = parse_u64("DIRSCOUT_REQUEST_DELAY_MS", "2000")?;

    let verify_url_template = or_default("DIRSCOUT_VERIFY_URL_TEMPLATE", "https://wa.me/{phone}");
    if !verify_url_template.contains("{phone}") {
        return Err(invalid(
            "DIRSCOUT_VERIFY_URL_TEMPLATE",
            "template must contain the {phone} placeholder".to_string(),
        ));
    }
    let verify_timeout_secs = parse_u64("DIRSCOUT_VERIFY_TIMEOUT_SECS", "10")?;

    let probe = ProbeSettings {
        host: or_default("DIRSCOUT_PROBE_HOST", "wa.me"),
        port: parse_u16("DIRSCOUT_PROBE_PORT", "80")?,
        timeout_secs: parse_u64("DIRSCOUT_PROBE_TIMEOUT_SECS", "5")?,
    };

    let browser = BrowserSettings {
        headless: parse_bool("DIRSCOUT_HEADLESS", "true")?,
        chrome_path: lookup("CHROME_PATH").ok().map(PathBuf::from),
    };

    Ok(AppConfig {
        log_level,
        data_dir,
        country_code,
        search_base_url,
        scroll_pause_ms,
        scroll_max_iterations,
        feed_timeout_secs,
        detail_timeout_secs,
        request_delay_ms,
        verify_url_template,
        verify_timeout_secs,
        probe,
        browser,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
