use std::time::Duration;

use serde_json::{Map, Value, json};

use crate::error::ConfigError;

/// Supported API versions and their path segments
pub const VERSIONS: &[(u32, &str)] = &[(1, "v1")];

pub const DEFAULT_VERSION: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const PACKAGE_NAME_HEADER: &str = "X-Package-Name";
pub const PACKAGE_VERSION_HEADER: &str = "X-Package-Version";

const ENV_BASE_URI: &str = "HTTP_FACADE_BASE_URI";
const ENV_TIMEOUT: &str = "HTTP_FACADE_TIMEOUT";
const ENV_PACKAGE_NAME: &str = "HTTP_FACADE_PACKAGE_NAME";
const ENV_API_VERSION: &str = "HTTP_FACADE_API_VERSION";

/// Connection settings shared by every request built from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    version: u32,
    base_uri: Option<String>,
    name: Option<String>,
    timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            base_uri: None,
            name: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Create configuration, setting the base URI when one is given.
    /// An empty string counts as no base URI.
    #[must_use]
    pub fn new(base_uri: Option<impl Into<String>>) -> Self {
        let mut config = Self::default();
        if let Some(base_uri) = base_uri.map(Into::into)
            && !base_uri.is_empty()
        {
            config.set_base_uri(base_uri);
        }
        config
    }

    /// Create configuration from environment variables
    ///
    /// Reads (all optional):
    /// - `HTTP_FACADE_BASE_URI`: base address of the remote API
    /// - `HTTP_FACADE_TIMEOUT`: request timeout in seconds (default: 30)
    /// - `HTTP_FACADE_PACKAGE_NAME`: value of the `X-Package-Name` header
    /// - `HTTP_FACADE_API_VERSION`: API version number (default: 1)
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEnv`] for values that are not numbers and
    /// [`ConfigError::UnsupportedVersion`] for unknown API versions.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(std::env::var(ENV_BASE_URI).ok());

        if let Ok(raw) = std::env::var(ENV_TIMEOUT) {
            let seconds = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT,
                value: raw.clone(),
            })?;
            config.set_timeout(seconds);
        }

        if let Ok(name) = std::env::var(ENV_PACKAGE_NAME) {
            config.set_package_name(name);
        }

        if let Ok(raw) = std::env::var(ENV_API_VERSION) {
            let version = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_API_VERSION,
                value: raw.clone(),
            })?;
            config.use_version(version)?;
        }

        Ok(config)
    }

    /// Use the given API version if it is supported
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedVersion`] and keeps the current
    /// version when `version` is not in [`VERSIONS`].
    pub fn use_version(&mut self, version: u32) -> Result<&mut Self, ConfigError> {
        if version_path(version).is_none() {
            return Err(ConfigError::UnsupportedVersion(version));
        }
        self.version = version;
        Ok(self)
    }

    /// Set the base address requests are resolved against
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = Some(base_uri.into());
    }

    /// Set the request timeout in seconds; 0 disables it
    pub fn set_timeout(&mut self, seconds: u64) {
        self.timeout = seconds;
    }

    /// Set the value sent as `X-Package-Name`
    pub fn set_package_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get the base URI
    #[must_use]
    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Get the request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Get the request timeout in seconds
    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout
    }

    /// Get the package name
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the selected API version
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Path segment of the selected API version, e.g. `v1`
    #[must_use]
    pub fn version_path(&self) -> &'static str {
        // `version` only ever holds keys of VERSIONS
        version_path(self.version).unwrap_or_default()
    }

    /// Headers identifying the calling package. The name is `null` until
    /// one is set.
    #[must_use]
    pub fn package_headers(&self) -> Map<String, Value> {
        let mut headers = Map::new();
        headers.insert(PACKAGE_NAME_HEADER.to_owned(), json!(self.name));
        headers.insert(PACKAGE_VERSION_HEADER.to_owned(), json!(self.version));
        headers
    }
}

fn version_path(version: u32) -> Option<&'static str> {
    VERSIONS
        .iter()
        .find(|(known, _)| *known == version)
        .map(|(_, path)| *path)
}
