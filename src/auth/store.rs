//! Durable storage for the session's [`TokenPair`].
//!
//! The pair is the sole persistent record: it lives in the platform keyring
//! under one well-known entry, serialized as its `{access, refresh}` JSON
//! shape. A memory-backed mode exists for tests and for running with
//! `--no-keyring` on hosts without a usable credential service.

use crate::auth::token::TokenPair;
use keyring::Entry;
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

const KEYRING_SERVICE: &str = "chipi";
const KEYRING_ACCOUNT: &str = "session";

/// Failures reading or writing the stored token pair.
#[derive(Debug)]
pub enum StoreError {
    /// The platform keyring rejected the operation.
    Keyring(keyring::Error),
    /// The stored record could not be serialized or deserialized.
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Keyring(err) => write!(f, "keyring access failed: {err}"),
            StoreError::Serde(err) => write!(f, "stored session record is invalid: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Keyring(err) => Some(err),
            StoreError::Serde(err) => Some(err),
        }
    }
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        StoreError::Keyring(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}

enum Backend {
    Keyring,
    Memory(Mutex<Option<TokenPair>>),
}

fn lock_slot(slot: &Mutex<Option<TokenPair>>) -> std::sync::MutexGuard<'_, Option<TokenPair>> {
    // A poisoned lock still holds a usable Option; recover it.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns the durable token pair. Writes happen only inside login/logout
/// flows; every outbound API request reads through [`TokenStore::load`].
pub struct TokenStore {
    backend: Backend,
}

impl TokenStore {
    /// Store backed by the platform keyring.
    pub fn new() -> Self {
        Self {
            backend: Backend::Keyring,
        }
    }

    /// In-memory store with no durability. Used by tests and `--no-keyring`.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(None)),
        }
    }

    fn entry() -> Result<Entry, StoreError> {
        Ok(Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)?)
    }

    pub fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Keyring => {
                let record = serde_json::to_string(pair)?;
                Self::entry()?.set_password(&record)?;
            }
            Backend::Memory(slot) => {
                *lock_slot(slot) = Some(pair.clone());
            }
        }
        Ok(())
    }

    pub fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        match &self.backend {
            Backend::Keyring => match Self::entry()?.get_password() {
                Ok(record) => Ok(Some(serde_json::from_str(&record)?)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(err) => Err(err.into()),
            },
            Backend::Memory(slot) => Ok(lock_slot(slot).clone()),
        }
    }

    /// Delete the stored pair. Deleting an absent entry is success, so
    /// repeated logouts are safe.
    pub fn clear(&self) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Keyring => match Self::entry()?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(err) => Err(err.into()),
            },
            Backend::Memory(slot) => {
                *lock_slot(slot) = None;
                Ok(())
            }
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access: "a".to_string(),
            refresh: "r".to_string(),
        }
    }

    #[test]
    fn memory_store_round_trips() {
        let store = TokenStore::in_memory();
        assert_eq!(store.load().unwrap(), None);
        store.save(&pair()).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair()));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = TokenStore::in_memory();
        store.save(&pair()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
