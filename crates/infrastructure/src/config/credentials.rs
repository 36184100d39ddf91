//! Engine client credentials supplied through configuration.

use domain::DomainError;
use domain::value_objects::Credentials;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Optional client id/secret pair
///
/// Hosts usually pass credentials to `initialize` directly; operators running
/// the CLI can keep them in the config file or environment instead.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub client_secret: Option<SecretString>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &if self.client_secret.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .finish()
    }
}

impl CredentialsConfig {
    /// Validated credentials; a missing value is reported like an empty one
    pub fn to_credentials(&self) -> Result<Credentials, DomainError> {
        let client_id = self.client_id.as_deref().unwrap_or_default();
        let client_secret = self
            .client_secret
            .as_ref()
            .map(|secret| secret.expose_secret())
            .unwrap_or_default();
        Credentials::new(client_id, client_secret)
    }
}
