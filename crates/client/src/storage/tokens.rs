//! Access/refresh token persistence and the auth state derived from it.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError, keys};

/// Whether a user is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthState {
    Guest,
    Authenticated,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// A change in [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTransition {
    /// Guest to authenticated.
    LoggedIn,
    /// Authenticated to guest.
    LoggedOut,
}

/// A token pair issued at login or refresh.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

impl Tokens {
    /// Create a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }
}

/// Token storage that broadcasts auth state changes.
///
/// The auth state is derived from the presence of an access token. Every
/// save or clear through this handle publishes the new state to
/// [`TokenStore::subscribe`] receivers. Changes made by another process are
/// only noticed on [`TokenStore::sync_from_storage`].
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<TokenStoreInner>,
}

struct TokenStoreInner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<AuthState>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Wrap a key-value store, reading the initial auth state from it.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let initial = match store.get(keys::ACCESS_TOKEN) {
            Ok(Some(_)) => AuthState::Authenticated,
            Ok(None) => AuthState::Guest,
            Err(e) => {
                warn!(error = %e, "Failed to read stored tokens, starting as guest");
                AuthState::Guest
            }
        };
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(TokenStoreInner { store, state }),
        }
    }

    /// Current access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn access_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .inner
            .store
            .get(keys::ACCESS_TOKEN)?
            .map(SecretString::from))
    }

    /// Current refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn refresh_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .inner
            .store
            .get(keys::REFRESH_TOKEN)?
            .map(SecretString::from))
    }

    /// Persist a token pair and mark the session authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, tokens: &Tokens) -> Result<(), StorageError> {
        self.inner
            .store
            .set(keys::ACCESS_TOKEN, tokens.access_token.expose_secret())?;
        self.inner
            .store
            .set(keys::REFRESH_TOKEN, tokens.refresh_token.expose_secret())?;
        self.publish(AuthState::Authenticated);
        debug!("Tokens saved");
        Ok(())
    }

    /// Remove both tokens and mark the session as guest.
    ///
    /// The state is published as guest even if a removal fails.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub fn clear(&self) -> Result<(), StorageError> {
        let access = self.inner.store.remove(keys::ACCESS_TOKEN);
        let refresh = self.inner.store.remove(keys::REFRESH_TOKEN);
        self.publish(AuthState::Guest);
        debug!("Tokens cleared");
        access.and(refresh)
    }

    /// Current auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.inner.state.borrow()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Receive every auth state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Re-read the store and publish any login or logout made elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn sync_from_storage(&self) -> Result<Option<AuthTransition>, StorageError> {
        let stored = if self.inner.store.get(keys::ACCESS_TOKEN)?.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Guest
        };
        Ok(self.publish(stored))
    }

    fn publish(&self, next: AuthState) -> Option<AuthTransition> {
        let mut transition = None;
        self.inner.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            transition = Some(match next {
                AuthState::Authenticated => AuthTransition::LoggedIn,
                AuthState::Guest => AuthTransition::LoggedOut,
            });
            *current = next;
            true
        });
        transition
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (Arc<MemoryStore>, TokenStore) {
        let backing = Arc::new(MemoryStore::new());
        let tokens = TokenStore::new(backing.clone());
        (backing, tokens)
    }

    #[test]
    fn test_initial_state_from_store() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(keys::ACCESS_TOKEN, "a").unwrap();
        assert!(TokenStore::new(backing).is_authenticated());

        let (_, tokens) = store();
        assert_eq!(tokens.state(), AuthState::Guest);
    }

    #[test]
    fn test_save_and_clear_publish_state() {
        let (backing, tokens) = store();
        let rx = tokens.subscribe();

        tokens.save(&Tokens::new("access", "refresh")).unwrap();
        assert_eq!(*rx.borrow(), AuthState::Authenticated);
        assert_eq!(
            tokens.access_token().unwrap().unwrap().expose_secret(),
            "access"
        );

        tokens.clear().unwrap();
        assert_eq!(*rx.borrow(), AuthState::Guest);
        assert!(backing.get(keys::REFRESH_TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_sync_from_storage_reports_transitions() {
        let (backing, tokens) = store();
        assert_eq!(tokens.sync_from_storage().unwrap(), None);

        backing.set(keys::ACCESS_TOKEN, "from-another-tab").unwrap();
        assert_eq!(
            tokens.sync_from_storage().unwrap(),
            Some(AuthTransition::LoggedIn)
        );
        assert_eq!(tokens.sync_from_storage().unwrap(), None);

        backing.remove(keys::ACCESS_TOKEN).unwrap();
        assert_eq!(
            tokens.sync_from_storage().unwrap(),
            Some(AuthTransition::LoggedOut)
        );
    }

    #[test]
    fn test_debug_hides_tokens() {
        let pair = Tokens::new("very-secret-access", "very-secret-refresh");
        let out = format!("{pair:?}");
        assert!(!out.contains("very-secret"));
    }
}
