//! Cyclic pool of API credentials

use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Error, Result};

/// One API key; never printed in full
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building requests only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short stable identifier safe for logs
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

/// Ordered, non-empty credential list with one active entry
///
/// Rotation wraps around indefinitely; liveness is only discovered through
/// failed generation calls.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
    index: usize,
}

impl CredentialPool {
    /// Create a pool; the first credential starts active
    pub fn new(credentials: Vec<Credential>) -> Result<Self> {
        if credentials.is_empty() {
            return Err(Error::config("credential pool must contain at least one API key"));
        }
        Ok(Self {
            credentials,
            index: 0,
        })
    }

    /// Build a pool from raw keys, ignoring blank entries
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let credentials = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Credential::new)
            .collect();
        Self::new(credentials)
    }

    /// Active credential
    pub fn current(&self) -> &Credential {
        &self.credentials[self.index]
    }

    /// Advance to the next credential (mod pool size) and return it
    pub fn rotate(&mut self) -> &Credential {
        self.index = (self.index + 1) % self.credentials.len();
        tracing::info!(
            credential = self.index + 1,
            total = self.credentials.len(),
            fingerprint = %self.credentials[self.index].fingerprint(),
            "Switched to next API credential"
        );
        &self.credentials[self.index]
    }

    /// Zero-based index of the active credential
    pub fn position(&self) -> usize {
        self.index
    }

    /// Pool size
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always false; construction rejects empty pools
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
