use std::path::PathBuf;
use std::time::Duration;

/// Browser launch settings for the page-driver session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
}

/// Target of the network pre-flight check run before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl ProbeSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub data_dir: PathBuf,
    pub country_code: String,
    pub search_base_url: String,
    pub scroll_pause_ms: u64,
    pub scroll_max_iterations: u32,
    pub feed_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub verify_url_template: String,
    pub verify_timeout_secs: u64,
    pub probe: ProbeSettings,
    pub browser: BrowserSettings,
}

impl AppConfig {
    #[must_use]
    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    #[must_use]
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    #[must_use]
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }
}
