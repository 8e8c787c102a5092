use std::{env, str::FromStr};

/// Reads `key` and parses it as `T`, falling back to `default` when the
/// variable is unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok().as_deref(), default)
}

/// Reads `key` as a comma-separated list. Unset means empty.
pub fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

pub fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.map(str::trim)
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
