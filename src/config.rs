use std::time::Duration;

use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONCURRENCY: usize = 1;

/// Process settings, read once from the environment in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub http_timeout: Duration,
    /// Number of article pages fetched at once per request. 1 keeps the
    /// upstream portals on strictly sequential traffic.
    pub fetch_concurrency: usize,
    pub insecure_ssl: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetch_concurrency: DEFAULT_CONCURRENCY,
            insecure_ssl: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bind_addr = lookup("HYNEWS_BIND_ADDR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.bind_addr);

        let http_timeout = parse_or("HYNEWS_HTTP_TIMEOUT_SECS", &lookup, DEFAULT_TIMEOUT_SECS)
            .max(1);

        let fetch_concurrency =
            parse_or("HYNEWS_FETCH_CONCURRENCY", &lookup, DEFAULT_CONCURRENCY).max(1);

        Self {
            bind_addr,
            http_timeout: Duration::from_secs(http_timeout),
            fetch_concurrency,
            insecure_ssl: lookup("HYNEWS_INSECURE_SSL").as_deref() == Some("1"),
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "Unparseable setting; using default");
                default
            }
        },
    }
}
