//! Runtime configuration for the proxy

use crate::cache::DEFAULT_TTL;
use crate::upstream::DEFAULT_API_BASE;
use std::time::Duration;

/// Configuration consumed by the proxy core.
///
/// Populated by the CLI from flags and `BOARDCAST_*` environment variables;
/// the core itself never reads the environment.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream API key (query-string auth)
    pub api_key: String,

    /// Upstream API token (query-string auth)
    pub api_token: String,

    /// Base URL of the upstream API
    pub api_base: String,

    /// Maximum age before a cached snapshot is treated as expired
    pub cache_ttl: Duration,

    /// Board ids to eagerly fetch on startup
    pub warm_boards: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl: DEFAULT_TTL,
            warm_boards: Vec::new(),
        }
    }
}

impl ProxyConfig {
    /// Parse a comma-separated board id list (as passed via
    /// `BOARDCAST_WARM_BOARDS`), dropping empty segments.
    pub fn parse_warm_boards(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
