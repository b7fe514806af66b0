use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Resolves a variable name to its value. `process_env` in production,
/// a map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub enum EnvKey {
    ServerPort,
    StorageEndpoint,
    StorageAccessKey,
    StorageSecretKey,
    StorageRegion,
    StoragePublicUrl,
    DatabaseUrl,
    MoviesCollection,
    StoreTimeoutSecs,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::StorageEndpoint => "STORAGE_ENDPOINT",
            EnvKey::StorageAccessKey => "STORAGE_ACCESS_KEY",
            EnvKey::StorageSecretKey => "STORAGE_SECRET_KEY",
            EnvKey::StorageRegion => "STORAGE_REGION",
            EnvKey::StoragePublicUrl => "STORAGE_PUBLIC_URL",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::MoviesCollection => "MOVIES_COLLECTION",
            EnvKey::StoreTimeoutSecs => "STORE_TIMEOUT_SECS",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Blank values count as unset.
fn lookup_value(lookup: Lookup<'_>, key: &EnvKey) -> Option<String> {
    lookup(key.as_str()).filter(|value| !value.trim().is_empty())
}

pub fn get(lookup: Lookup<'_>, key: EnvKey) -> Result<String, ConfigError> {
    lookup_value(lookup, &key).ok_or(ConfigError::Missing(key.as_str()))
}

pub fn get_optional(lookup: Lookup<'_>, key: EnvKey) -> Option<String> {
    lookup_value(lookup, &key)
}

pub fn get_or(lookup: Lookup<'_>, key: EnvKey, default: &str) -> String {
    lookup_value(lookup, &key).unwrap_or_else(|| default.to_string())
}

pub fn get_parsed<T>(lookup: Lookup<'_>, key: EnvKey, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup_value(lookup, &key) {
        Some(val) => val.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key: key.as_str(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
