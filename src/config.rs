use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::teams::team_count;

pub const DEFAULT_BASE_URL: &str = "https://www.pro-football-reference.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;

/// Runtime settings for acquisition. Read from the environment by the binaries,
/// built directly in tests.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Duration,
    /// Worker pool size for the per-team fan-out. Defaults to the roster size.
    pub fetch_parallelism: usize,
    pub retry: RetryPolicy,
    pub extended_overall: bool,
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            fetch_parallelism: team_count(),
            retry: RetryPolicy::default(),
            extended_overall: false,
            accept_invalid_certs: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let base_url = env::var("STATS_BASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let request_timeout = Duration::from_secs(
            env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .clamp(1, 300),
        );
        let fetch_parallelism = env_parse::<usize>("FETCH_PARALLELISM")
            .unwrap_or(team_count())
            .clamp(1, team_count());
        let retry = RetryPolicy {
            max_attempts: env_parse("RETRY_MAX_ATTEMPTS").unwrap_or(0),
            base_delay_ms: env_parse("RETRY_BASE_DELAY_MS").unwrap_or(0),
            max_delay_ms: env_parse("RETRY_MAX_DELAY_MS").unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS),
        };

        Self {
            base_url,
            request_timeout,
            fetch_parallelism,
            retry,
            extended_overall: env_flag("EXTENDED_OVERALL_STATS", false),
            accept_invalid_certs: env_flag("TLS_ACCEPT_INVALID_CERTS", true),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
