use std::env;
use std::fmt::Display;
use std::str::FromStr;

use actix_web::http::Uri;
use anyhow::{Result, anyhow, bail};
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    /// Origin allowed by CORS.
    pub frontend_url: String,

    // Rate limiting, per client IP
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,

    pub log_dir: String,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

/// Normalizes a CORS origin to `scheme://host[:port]`. Wildcards, paths and
/// non-HTTP schemes are refused.
fn parse_origin(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let uri: Uri = trimmed
        .parse()
        .map_err(|e| anyhow!("FRONTEND_URL '{raw}' is not a valid origin: {e}"))?;

    let scheme = match uri.scheme_str() {
        Some(scheme @ ("http" | "https")) => scheme,
        _ => bail!("FRONTEND_URL '{raw}' must start with http:// or https://"),
    };
    let authority = match uri.authority() {
        Some(authority) if !authority.host().is_empty() && !authority.as_str().contains('@') => {
            authority
        }
        _ => bail!("FRONTEND_URL '{raw}' must name a host"),
    };
    if !matches!(uri.path(), "" | "/") || uri.query().is_some() {
        bail!("FRONTEND_URL '{raw}' must be an origin without a path");
    }

    Ok(format!("{scheme}://{authority}"))
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `DATABASE_URL` is mandatory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => bail!("DATABASE_URL must be set"),
        };

        let rate_limit_requests = parse_or(&lookup, "RATE_LIMIT_REQUESTS", 100)?;
        if rate_limit_requests == 0 {
            bail!("RATE_LIMIT_REQUESTS must be greater than zero");
        }

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            frontend_url: parse_origin(
                &lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            )?,
            rate_limit_requests,
            rate_limit_window_secs: parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?, // 15 min
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}
