use std::{fmt, sync::Arc};

use crate::error::ConfigError;

/// Environment variable holding the token signing secret.
pub const SESSION_SECRET_VAR: &str = "SESSION_SECRET";

/// Symmetric key used to sign and verify cart tokens.
///
/// The secret's UTF-8 bytes are used directly as the HMAC key, so tokens issued by other
/// HS256 implementations configured with the same string verify here too.
#[derive(Clone)]
pub struct SessionSecret(Arc<[u8]>);

impl SessionSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ConfigError::Invalid {
                name: SESSION_SECRET_VAR,
                reason: "secret must not be empty".into(),
            });
        }

        Ok(Self(Arc::from(secret)))
    }

    /// Load the secret from `SESSION_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(SESSION_SECRET_VAR)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(SESSION_SECRET_VAR))?;
        Self::new(secret)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionSecret").field(&"<redacted>").finish()
    }
}
