//! # Lookup Configuration
//!
//! Where the product database lives and how long to wait for it.

use std::time::Duration;

/// Public Open Food Facts instance.
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Upper bound on a single lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Open Food Facts asks API clients to identify themselves.
pub const DEFAULT_USER_AGENT: &str = concat!("pantry-scanner/", env!("CARGO_PKG_VERSION"));

/// Product source configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SourceConfig::new("http://127.0.0.1:9000")
///     .timeout(Duration::from_secs(2))
///     .user_agent("pantry-tests/0.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,

    /// Total time allowed per request (connect + body).
    /// Default: 5 seconds
    pub timeout: Duration,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl SourceConfig {
    /// Creates a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        SourceConfig {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// URL of the product document for a barcode.
    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{}.json", self.base_url, barcode)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::new(DEFAULT_BASE_URL)
    }
}
