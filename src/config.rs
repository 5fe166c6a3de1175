use std::{fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::anyhow;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Always starts and ends with `/`.
    pub base_path: String,
    /// Always ends with `/`; endpoint names are appended to it.
    pub api_prefix: String,
    /// Origin plus base path that shareable room links are built on.
    pub public_url: String,
    pub cache_stale: Duration,
    pub cache_gc: Duration,
    pub api_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            base_path: "/confessionrooms/".to_owned(),
            api_prefix: "http://127.0.0.1:8000/confessionrooms/api/".to_owned(),
            public_url: "http://localhost:8080/confessionrooms/".to_owned(),
            cache_stale: Duration::from_secs(10),
            cache_gc: Duration::from_secs(300),
            api_timeout: None,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Config> {
        let defaults = Config::default();

        let bind_addr = parse_var("BIND_ADDR")?.unwrap_or(defaults.bind_addr);
        let base_path = var("BASE_PATH").unwrap_or(defaults.base_path);
        let api_prefix = var("API_PREFIX").unwrap_or(defaults.api_prefix);
        let public_url = var("PUBLIC_URL").unwrap_or(defaults.public_url);
        let cache_stale = parse_var("CACHE_STALE_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_stale);
        let cache_gc = parse_var("CACHE_GC_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_gc);
        let api_timeout = parse_var("API_TIMEOUT_SECS")?.map(Duration::from_secs);

        if !api_prefix.starts_with("http://") && !api_prefix.starts_with("https://") {
            return Err(anyhow!("API_PREFIX must be an absolute http(s) url, got {api_prefix}"));
        }

        Ok(Config {
            bind_addr,
            base_path: normalize_base_path(&base_path),
            api_prefix: with_trailing_slash(api_prefix),
            public_url: with_trailing_slash(public_url),
            cache_stale,
            cache_gc,
            api_timeout,
        })
    }

    /// Base path without its trailing slash, empty when mounted at the root.
    pub fn base(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }

    pub fn room_link(&self, code: &str) -> String {
        format!(
            "{}{}",
            with_trailing_slash(self.public_url.clone()),
            code.trim_start_matches('/')
        )
    }
}

fn var(key: &str) -> Option<String> {
    match dotenv::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
        _ => None,
    }
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        return Ok(None);
    };

    let value = raw
        .parse::<T>()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))?;
    info!("{key} = {raw}");
    Ok(Some(value))
}

fn with_trailing_slash(mut value: String) -> String {
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}

fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}
