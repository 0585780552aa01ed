//! Runtime configuration for the league auction server.

use once_cell::sync::Lazy;
use std::{env, str::FromStr};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Countdown length when a player has no resolvable category.
    pub default_timer_secs: u32,
    /// Floor bid when a player carries no (or a zero) base price.
    pub default_base_price: i64,
    /// Maximum rows returned by the typeahead search.
    pub search_limit: i64,
    /// Quiet period before a typed search query is executed.
    pub search_debounce_ms: u64,
    /// HS256 secret for access tokens; auth endpoints refuse to work without it.
    pub jwt_secret: Option<String>,
    pub access_token_ttl: u64,
    pub refresh_token_ttl: u64,
    /// Directory backing the object bucket.
    pub storage_root: String,
    /// Prefix prepended to object paths to build public URLs.
    pub public_base_url: String,
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Settings {
    /// Build settings from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Settings {
            default_timer_secs: parse_or(&lookup, "DEFAULT_TIMER_SECS", 10),
            default_base_price: parse_or(&lookup, "DEFAULT_BASE_PRICE", 200_000),
            search_limit: parse_or(&lookup, "SEARCH_LIMIT", 10),
            search_debounce_ms: parse_or(&lookup, "SEARCH_DEBOUNCE_MS", 300),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            access_token_ttl: parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", 15 * 60),
            refresh_token_ttl: parse_or(&lookup, "REFRESH_TOKEN_TTL_SECS", 30 * 24 * 3_600),
            storage_root: lookup("STORAGE_ROOT").unwrap_or_else(|| "./storage".into()),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8080/media".into()),
        }
    }

    fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
