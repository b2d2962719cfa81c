/// Storage configuration and credential loading
///
/// The bucket, region and endpoint are fixed for this internal tool;
/// only the access credentials come from the environment. Everything is
/// read once at process entry and handed to the application by value —
/// there is no global configuration state.

use thiserror::Error;

/// S3-compatible endpoint the uploads go to (DigitalOcean Spaces)
pub const STORAGE_ENDPOINT: &str = "https://nyc3.digitaloceanspaces.com";

/// Region name matching the endpoint
pub const STORAGE_REGION: &str = "nyc3";

/// Destination bucket for all uploads
pub const STORAGE_BUCKET: &str = "divinetradingcardllccdn";

/// Prefix every object key is placed under
pub const KEY_PREFIX: &str = "test";

/// Environment variable holding the access key ID
pub const ENV_ACCESS_ID: &str = "access_ID";

/// Environment variable holding the secret access key
pub const ENV_ACCESS_KEY: &str = "access_Key";

/// Errors raised while loading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("missing environment variable '{0}'")]
    MissingVar(&'static str),
}

/// Everything the upload path needs to talk to the bucket
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Access key ID (from `access_ID`)
    pub access_key_id: String,
    /// Secret access key (from `access_Key`)
    pub secret_access_key: String,
    /// Endpoint URL, e.g. "https://nyc3.digitaloceanspaces.com"
    pub endpoint: String,
    /// Region name for the SDK
    pub region: String,
    /// Destination bucket
    pub bucket: String,
}

impl StorageConfig {
    /// Load the configuration from the process environment.
    ///
    /// Fails if either credential variable is missing or empty — the
    /// caller is expected to treat this as fatal before showing any UI.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Split out from `from_env` so the parsing is testable without
    /// mutating the (process-global) environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key_id = lookup(ENV_ACCESS_ID)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar(ENV_ACCESS_ID))?;

        let secret_access_key = lookup(ENV_ACCESS_KEY)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar(ENV_ACCESS_KEY))?;

        Ok(StorageConfig {
            access_key_id,
            secret_access_key,
            endpoint: STORAGE_ENDPOINT.to_string(),
            region: STORAGE_REGION.to_string(),
            bucket: STORAGE_BUCKET.to_string(),
        })
    }

    /// Host part of the endpoint, used to template public URLs
    /// (e.g. "nyc3.digitaloceanspaces.com")
    pub fn endpoint_host(&self) -> &str {
        self.endpoint
            .strip_prefix("https://")
            .or_else(|| self.endpoint.strip_prefix("http://"))
            .unwrap_or(&self.endpoint)
    }
}
