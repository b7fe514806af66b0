use crate::config::env::{self, ConfigError, EnvKey, Lookup};
use std::fmt;
use std::time::Duration;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_COLLECTION: &str = "movies";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Clone)]
pub struct StorageSettings {
    pub endpoint: Url,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base used to build the URIs handed back to clients.
    pub public_url: Url,
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("public_url", &self.public_url.as_str())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub storage: StorageSettings,
    pub database_url: String,
    pub movies_collection: String,
    pub store_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let endpoint = parse_url(EnvKey::StorageEndpoint, &env::get(lookup, EnvKey::StorageEndpoint)?)?;
        let public_url = match env::get_optional(lookup, EnvKey::StoragePublicUrl) {
            Some(raw) => parse_url(EnvKey::StoragePublicUrl, &raw)?,
            None => endpoint.clone(),
        };

        let storage = StorageSettings {
            endpoint,
            access_key: env::get(lookup, EnvKey::StorageAccessKey)?,
            secret_key: env::get(lookup, EnvKey::StorageSecretKey)?,
            region: env::get_or(lookup, EnvKey::StorageRegion, DEFAULT_REGION),
            public_url,
        };

        let movies_collection = env::get_or(lookup, EnvKey::MoviesCollection, DEFAULT_COLLECTION);
        if !is_plain_identifier(&movies_collection) {
            return Err(ConfigError::Invalid {
                key: EnvKey::MoviesCollection.as_str(),
                reason: format!("'{movies_collection}' is not a plain identifier"),
            });
        }

        let timeout_secs = env::get_parsed(lookup, EnvKey::StoreTimeoutSecs, DEFAULT_STORE_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: EnvKey::StoreTimeoutSecs.as_str(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            server_port: env::get_parsed(lookup, EnvKey::ServerPort, DEFAULT_PORT)?,
            storage,
            database_url: env::get(lookup, EnvKey::DatabaseUrl)?,
            movies_collection,
            store_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes: env::get_parsed(lookup, EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_url(key: EnvKey, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: key.as_str(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: key.as_str(),
            reason: "expected an http(s) URL".to_string(),
        });
    }

    Ok(url)
}

/// The collection name ends up in SQL as a table identifier, so only
/// `[A-Za-z_][A-Za-z0-9_]*` is accepted.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
