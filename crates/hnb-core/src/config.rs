use std::{
    env, fs,
    net::{IpAddr, SocketAddr},
    path::Path,
    time::Duration,
};

use url::Url;

use crate::{errors::Error, Result};

pub const DEFAULT_HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Typed process configuration, read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    /// Externally reachable base URL; presence switches delivery to webhooks.
    pub public_url: Option<Url>,
    pub listen_addr: SocketAddr,
    pub telegram_safe_limit: usize,

    // Content API
    pub hn_api_base: String,
    pub http_timeout: Duration,
    pub fetch_concurrency: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN")
            .or_else(|| var("BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let public_url = var("PUBLIC_URL")
            .map(|raw| {
                Url::parse(raw.trim())
                    .map_err(|e| Error::Config(format!("PUBLIC_URL is not a valid URL: {e}")))
            })
            .transpose()?;

        let host: IpAddr = match var("HOST") {
            Some(h) => h
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("HOST is not an IP address: {e}")))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = parse_or(&var, "PORT", 10_000u16)?;
        let listen_addr = SocketAddr::new(host, port);

        let telegram_safe_limit = parse_or(&var, "TELEGRAM_SAFE_LIMIT", 4000usize)?;

        let hn_api_base = var("HN_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_HN_API_BASE.to_string());
        let http_timeout = Duration::from_millis(parse_or(&var, "HTTP_TIMEOUT_MS", 10_000u64)?);
        let fetch_concurrency = parse_or(&var, "FETCH_CONCURRENCY", 5usize)?.max(1);

        Ok(Self {
            telegram_bot_token,
            public_url,
            listen_addr,
            telegram_safe_limit,
            hn_api_base,
            http_timeout,
            fetch_concurrency,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(load(&[]), Err(Error::Config(_))));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "  ")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn defaults_to_long_polling() {
        let cfg = load(&[("BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert!(cfg.public_url.is_none());
        assert_eq!(cfg.listen_addr, "0.0.0.0:10000".parse().unwrap());
        assert_eq!(cfg.hn_api_base, DEFAULT_HN_API_BASE);
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.fetch_concurrency, 5);
        assert_eq!(cfg.telegram_safe_limit, 4000);
    }

    #[test]
    fn primary_token_wins_and_overrides_apply() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "primary"),
            ("BOT_TOKEN", "fallback"),
            ("PUBLIC_URL", "https://bot.example.com"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8443"),
            ("HN_API_BASE", "http://localhost:9000/v0/"),
            ("FETCH_CONCURRENCY", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.telegram_bot_token, "primary");
        assert_eq!(
            cfg.public_url.unwrap().as_str(),
            "https://bot.example.com/"
        );
        assert_eq!(cfg.listen_addr, "127.0.0.1:8443".parse().unwrap());
        assert_eq!(cfg.hn_api_base, "http://localhost:9000/v0");
        assert_eq!(cfg.fetch_concurrency, 1);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(load(&[("BOT_TOKEN", "t"), ("PORT", "http")]).is_err());
        assert!(load(&[("BOT_TOKEN", "t"), ("PUBLIC_URL", "not a url")]).is_err());
        assert!(load(&[("BOT_TOKEN", "t"), ("HOST", "localhost")]).is_err());
    }
}
