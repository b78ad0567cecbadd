//! OTP login endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::{MobileNumber, Otp};
use tracing::{debug, instrument};

use super::{Access, ApiClient, ApiError};
use crate::storage::Tokens;

/// Raw token response from the auth endpoints.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl From<TokenResponse> for Tokens {
    fn from(raw: TokenResponse) -> Self {
        debug!(
            token_type = raw.token_type.as_deref().unwrap_or("bearer"),
            expires_in = raw.expires_in,
            "Received token pair"
        );
        Self::new(raw.access_token, raw.refresh_token)
    }
}

/// Acknowledgement from `POST /auth/send-otp`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpSent {
    pub message: String,
    #[serde(default = "default_success")]
    pub success: bool,
}

const fn default_success() -> bool {
    true
}

/// Generic `{message, success}` body.
#[derive(Debug, Deserialize)]
pub(super) struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
struct SendOtpRequest<'a> {
    mobile_number: &'a str,
}

#[derive(Serialize)]
struct VerifyOtpRequest<'a> {
    mobile_number: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Ask the backend to text a login code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rate limited.
    #[instrument(skip(self), fields(mobile = %mobile.masked()))]
    pub async fn send_otp(&self, mobile: &MobileNumber) -> Result<OtpSent, ApiError> {
        let body = SendOtpRequest {
            mobile_number: mobile.as_str(),
        };
        self.public(Method::POST, "auth/send-otp", Some(&body)).await
    }

    /// Exchange a login code for a token pair.
    ///
    /// The tokens are returned, not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, otp), fields(mobile = %mobile.masked()))]
    pub async fn verify_otp(&self, mobile: &MobileNumber, otp: &Otp) -> Result<Tokens, ApiError> {
        let body = VerifyOtpRequest {
            mobile_number: mobile.as_str(),
            otp: otp.as_str(),
        };
        let raw: TokenResponse = self.public(Method::POST, "auth/verify-otp", Some(&body)).await?;
        Ok(raw.into())
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Sent straight to the transport: this call runs inside the 401 path of
    /// [`ApiClient::execute`] and must never refresh itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<Tokens, ApiError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        };
        let url = self.endpoint("auth/refresh")?;
        let response = self
            .send(&Method::POST, &url, &[], Some(&body), None)
            .await?;
        let raw: TokenResponse = Self::decode(response).await?;
        Ok(raw.into())
    }

    /// Revoke the current access token server-side.
    ///
    /// Sent once with the stored token; a 401 is not refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no token or the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response: MessageResponse = self
            .execute::<_, ()>(Method::POST, "auth/logout", &[], None, Access::BearerOnce)
            .await?;
        debug!(message = %response.message, "Logged out server-side");
        Ok(())
    }
}
