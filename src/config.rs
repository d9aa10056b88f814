use std::net::SocketAddr;
use std::str::FromStr;

use crate::suggest::SuggestOptions;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub secure_cookies: bool,
    pub tag_name_max_len: usize,
    pub suggest: SuggestOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/tagdesk.db".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            secure_cookies: false,
            tag_name_max_len: 50,
            suggest: SuggestOptions::default(),
        }
    }
}

impl Config {
    /// Build a config from environment variables, falling back to defaults
    /// for anything missing or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let suggest = SuggestOptions {
            max_results: parse_or("SUGGEST_MAX_RESULTS", &lookup, defaults.suggest.max_results),
            max_edit_distance: parse_or(
                "SUGGEST_MAX_EDIT_DISTANCE",
                &lookup,
                defaults.suggest.max_edit_distance,
            ),
            min_candidate_len: parse_or(
                "SUGGEST_MIN_LENGTH",
                &lookup,
                defaults.suggest.min_candidate_len,
            ),
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse_or("BIND_ADDR", &lookup, defaults.bind_addr),
            secure_cookies: parse_or("SECURE_COOKIES", &lookup, defaults.secure_cookies),
            tag_name_max_len: parse_or("TAG_NAME_MAX_LEN", &lookup, defaults.tag_name_max_len),
            suggest,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {key}={raw:?}, using default");
            default
        }),
        None => default,
    }
}
