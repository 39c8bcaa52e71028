/// Public client configuration
///
/// Auth settings are fetched from the server's `/api/config` rather than
/// compiled into the client. A [`ConfigLoader`] holds the result: it starts
/// empty, is filled once by [`ConfigLoader::initialize`] (or up front by
/// [`ConfigLoader::preload`] when the settings are already known), and is
/// then passed by reference to whoever needs it.
///
/// # Example
///
/// ```
/// use taskboard_client::config::{ConfigLoader, PublicConfig};
///
/// let mut loader = ConfigLoader::new();
/// assert!(loader.get().is_none());
///
/// loader.preload(PublicConfig {
///     auth_url: "https://auth.example.com".to_string(),
///     auth_public_key: "pk_test".to_string(),
/// });
/// assert_eq!(loader.get().unwrap().auth_public_key, "pk_test");
/// ```

use serde::{Deserialize, Serialize};

use crate::api::{ClientError, TaskApi};

/// Settings served by `GET /api/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub auth_url: String,
    pub auth_public_key: String,
}

/// Holds the public config once it is known
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: Option<PublicConfig>,
}

impl ConfigLoader {
    /// Creates an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the config unless it is already present
    ///
    /// A failed fetch leaves the loader empty so a later call can retry.
    pub async fn initialize(&mut self, api: &dyn TaskApi) -> Result<&PublicConfig, ClientError> {
        match self.config {
            Some(ref config) => Ok(config),
            None => {
                let fetched = api.public_config().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to fetch public config");
                    e
                })?;
                Ok(self.config.insert(fetched))
            }
        }
    }

    /// Seeds the config without a fetch
    pub fn preload(&mut self, config: PublicConfig) {
        self.config = Some(config);
    }

    /// The config, if initialized
    pub fn get(&self) -> Option<&PublicConfig> {
        self.config.as_ref()
    }
}
