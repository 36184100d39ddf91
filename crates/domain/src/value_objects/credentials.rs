//! Engine client credentials

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::DomainError;

/// Client id and secret the engine authenticates with
///
/// The secret is zeroized on drop and never appears in `Debug` output.
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    /// Validate and wrap a client id/secret pair
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if either value is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "Client ID and Client Secret are required to initialize the speech session"
                    .to_string(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
        })
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub const fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            client_id: self.client_id.clone(),
            client_secret: SecretString::from(self.client_secret.expose_secret().to_owned()),
        }
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.client_id == other.client_id
            && self.client_secret.expose_secret() == other.client_secret.expose_secret()
    }
}

impl Eq for Credentials {}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}
