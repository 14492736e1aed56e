//! Cipher key state.
//!
//! Decoding never reads ambient state: every decode call takes an explicit
//! `Option<&CipherKey>`. [`KeyStore`] is a caller-owned holder for that key,
//! and the process-wide functions at the bottom of this module wrap one
//! shared store for callers that want the classic set/get password API.
//!
//! Setting an empty password clears the key: reads then return `None`.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Secret passphrase used by decryption plugins.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey(String);

impl CipherKey {
    /// Wraps a passphrase. Empty input yields `None`.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(CipherKey(secret))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(<redacted>)")
    }
}

/// Thread-safe holder for the current decryption key.
#[derive(Debug, Default)]
pub struct KeyStore {
    key: RwLock<Option<CipherKey>>,
}

impl KeyStore {
    pub const fn new() -> Self {
        KeyStore {
            key: RwLock::new(None),
        }
    }

    /// Replaces the stored key; an empty secret clears it.
    pub fn set(&self, secret: &str) {
        let mut guard = self.key.write().unwrap_or_else(PoisonError::into_inner);
        *guard = CipherKey::new(secret);
    }

    pub fn clear(&self) {
        self.set("");
    }

    /// Snapshot of the current key.
    pub fn get(&self) -> Option<CipherKey> {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

static PASSWORD: KeyStore = KeyStore::new();

/// The process-wide key store.
pub fn global() -> &'static KeyStore {
    &PASSWORD
}

/// Sets the process-wide password for decryption.
pub fn set_password(pass: &str) {
    PASSWORD.set(pass);
}

/// Gets the process-wide password, `None` when unset or cleared.
pub fn get_password() -> Option<String> {
    PASSWORD.get().map(|k| k.0)
}

/// Clears the process-wide password.
pub fn clear_password() {
    PASSWORD.clear();
}
