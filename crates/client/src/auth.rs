//! OTP sign-in and session lifecycle.
//!
//! [`AuthSession`] validates input before it reaches the backend, stores the
//! issued token pair, and tears the session down on logout. Logout always
//! ends the local session, even when the server call fails.

use std::sync::Arc;

use shopfront_core::{MobileNumber, Otp};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, OtpSent};
use crate::cache::QueryCache;
use crate::error::{Result, add_breadcrumb, clear_sentry_user};
use crate::notify::Notifier;
use crate::storage::{AuthState, AuthTransition, TokenStore};

/// Sign-in, sign-out and auth state.
#[derive(Clone)]
pub struct AuthSession {
    api: ApiClient,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    #[must_use]
    pub fn new(api: ApiClient, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    fn tokens(&self) -> &TokenStore {
        self.api.tokens()
    }

    /// Text a login code to `mobile`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a malformed number, or an error
    /// if the backend refuses (rate limit, network).
    #[instrument(skip(self))]
    pub async fn send_otp(&self, mobile: &str) -> Result<OtpSent> {
        let mobile = MobileNumber::parse(mobile)?;
        let sent = self.api.send_otp(&mobile).await?;
        add_breadcrumb("auth", "OTP requested", None);
        Ok(sent)
    }

    /// Exchange a login code for tokens and store them.
    ///
    /// Does not merge the guest cart; see `Storefront::login`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for malformed input, or an error if
    /// the code is wrong or expired.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, mobile: &str, otp: &str) -> Result<()> {
        let mobile = MobileNumber::parse(mobile)?;
        let otp = Otp::parse(otp)?;

        let tokens = self.api.verify_otp(&mobile, &otp).await?;
        self.tokens().save(&tokens)?;

        // Anything cached while signed out belongs to nobody.
        self.cache.invalidate_private();

        info!(mobile = %mobile.masked(), "Signed in");
        add_breadcrumb("auth", "Signed in", None);
        Ok(())
    }

    /// End the session.
    ///
    /// The server is told on a best-effort basis. Tokens and cached private
    /// data are removed in every case.
    ///
    /// # Errors
    ///
    /// Returns an error only if the stored tokens could not be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if self.tokens().is_authenticated()
            && let Err(e) = self.api.logout().await
        {
            warn!(error = %e, "Server-side logout failed, clearing local session anyway");
        }

        let cleared = self.tokens().clear();
        self.cache.clear();
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);

        cleared?;
        self.notifier.info("You have been signed out");
        Ok(())
    }

    /// Current auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.tokens().state()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated()
    }

    /// Receive every auth state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tokens().subscribe()
    }

    /// Pick up a login or logout made by another process sharing storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn sync_from_storage(&self) -> Result<Option<AuthTransition>> {
        Ok(self.tokens().sync_from_storage()?)
    }
}
