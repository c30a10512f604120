//! [`KeyCell`]: lazily loaded, lock-free cache for one vault's key.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{info, warn};

use super::material::{KeyError, KeyMaterial};

enum KeySource {
    /// Decode from this environment variable on first use.
    Env(String),
    /// Injected directly by the embedder.
    Fixed(Arc<KeyMaterial>),
}

/// Per-vault key holder.
///
/// Environment-backed cells decode their variable on the first [`KeyCell::get`]
/// and publish the result through an [`ArcSwapOption`], so subsequent reads
/// are a single atomic load. Two requests racing on the first load both decode
/// the same value; whichever publishes last wins, with identical contents.
#[derive(Clone)]
pub struct KeyCell {
    source: Arc<KeySource>,
    loaded: Arc<ArcSwapOption<KeyMaterial>>,
}

impl KeyCell {
    /// A cell that reads the environment variable `name` on first use.
    pub fn from_env(name: impl Into<String>) -> Self {
        Self {
            source: Arc::new(KeySource::Env(name.into())),
            loaded: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// A cell holding `key` from the start.
    pub fn fixed(key: KeyMaterial) -> Self {
        let key = Arc::new(key);
        Self {
            source: Arc::new(KeySource::Fixed(key.clone())),
            loaded: Arc::new(ArcSwapOption::new(Some(key))),
        }
    }

    /// Name used in logs: the environment variable, or `"fixed"`.
    pub fn name(&self) -> &str {
        match &*self.source {
            KeySource::Env(name) => name,
            KeySource::Fixed(_) => "fixed",
        }
    }

    /// Returns `true` once a key has been published.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load().is_some()
    }

    /// Return the key, decoding it on first use.
    ///
    /// Failures are not cached: a corrected environment is picked up by the
    /// next call.
    ///
    /// # Errors
    ///
    /// Any [`KeyError`] from [`KeyMaterial::from_env`].
    pub fn get(&self) -> Result<Arc<KeyMaterial>, KeyError> {
        if let Some(key) = self.loaded.load_full() {
            return Ok(key);
        }
        match &*self.source {
            KeySource::Fixed(key) => Ok(key.clone()),
            KeySource::Env(name) => match KeyMaterial::from_env(name) {
                Ok(key) => {
                    let key = Arc::new(key);
                    self.loaded.store(Some(key.clone()));
                    info!(key = %name, "vault key loaded");
                    Ok(key)
                }
                Err(e) => {
                    warn!(key = %name, error = %e, "vault key unavailable");
                    Err(e)
                }
            },
        }
    }
}

impl std::fmt::Debug for KeyCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCell")
            .field("name", &self.name())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KEY_LEN;

    #[test]
    fn fixed_cell_is_ready() {
        let cell = KeyCell::fixed(KeyMaterial::from_bytes([0x42; KEY_LEN]));
        assert!(cell.is_loaded());
        assert_eq!(cell.get().unwrap().as_bytes(), &[0x42; KEY_LEN]);
        assert_eq!(cell.name(), "fixed");
    }

    #[test]
    fn env_cell_loads_lazily() {
        let var = "PII_VAULT_TEST_CELL_LAZY";
        let cell = KeyCell::from_env(var);
        assert!(!cell.is_loaded());

        std::env::set_var(var, hex::encode([0x07u8; KEY_LEN]));
        let key = cell.get().unwrap();
        assert_eq!(key.as_bytes(), &[0x07; KEY_LEN]);
        assert!(cell.is_loaded());
        std::env::remove_var(var);

        // Published keys live for the process lifetime.
        assert!(cell.get().is_ok());
    }

    #[test]
    fn env_cell_failure_is_not_cached() {
        let var = "PII_VAULT_TEST_CELL_RETRY";
        let cell = KeyCell::from_env(var);
        assert!(matches!(cell.get(), Err(KeyError::Missing(_))));
        assert!(!cell.is_loaded());

        std::env::set_var(var, hex::encode([0x09u8; KEY_LEN]));
        assert!(cell.get().is_ok());
        std::env::remove_var(var);
    }

    #[test]
    fn clones_share_loaded_key() {
        let var = "PII_VAULT_TEST_CELL_SHARED";
        std::env::set_var(var, hex::encode([0x0Au8; KEY_LEN]));
        let a = KeyCell::from_env(var);
        let b = a.clone();
        a.get().unwrap();
        assert!(b.is_loaded());
        std::env::remove_var(var);
    }

    #[test]
    fn debug_shows_name_not_key() {
        let cell = KeyCell::from_env("SSN_ENCRYPTION_KEY");
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("SSN_ENCRYPTION_KEY"));
        assert!(dbg.contains("loaded: false"));
    }
}
