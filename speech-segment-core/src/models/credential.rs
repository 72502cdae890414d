use std::env;
use std::fmt;

use super::error::ServiceError;

/// Bearer token for the remote transcription and translation services.
///
/// Read from the process environment. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    pub fn new(token: impl Into<String>) -> Result<Self, ServiceError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ServiceError::MissingCredential("empty token".into()));
        }
        Ok(Self(token))
    }

    /// Load the token stored in environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, ServiceError> {
        let token = env::var(var)
            .map_err(|_| ServiceError::MissingCredential(format!("{} is not set", var)))?;
        Self::new(token).map_err(|_| ServiceError::MissingCredential(format!("{} is empty", var)))
    }

    /// Value for an HTTP `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerCredential").field(&"<redacted>").finish()
    }
}
