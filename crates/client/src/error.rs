//! Unified error handling with Sentry integration.
//!
//! Every public operation returns `Result<T, ClientError>`. Presentation code
//! turns errors into notices with [`ClientError::user_message`], which shows
//! the server's `detail` when there is one and a generic fallback otherwise.

use std::sync::Arc;

use shopfront_core::{AddressError, MobileError, OtpError, PincodeError, QuantityError};
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    ///
    /// Shared because cached loads hand the same error to every waiter.
    #[error("API error: {0}")]
    Api(Arc<ApiError>),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The operation requires a signed-in user.
    #[error("Not signed in")]
    NotAuthenticated,

    /// The refresh token was rejected; the user must sign in again.
    #[error("Session expired")]
    SessionExpired,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Text for a user-facing notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.server_message().map_or_else(
                || match err.as_ref() {
                    ApiError::Http(_) => {
                        "Could not reach the server. Check your connection and try again."
                            .to_string()
                    }
                    _ => "Something went wrong. Please try again.".to_string(),
                },
                str::to_string,
            ),
            Self::Validation(msg) => msg.clone(),
            Self::NotAuthenticated => "Please sign in to continue.".to_string(),
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::Config(_) => "The app is not configured correctly.".to_string(),
            Self::Storage(_) => "Could not save your data on this device.".to_string(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// HTTP status code of a backend error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the user has to sign in (again) to proceed.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::SessionExpired)
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::NotAuthenticated,
            ApiError::SessionExpired => Self::SessionExpired,
            ApiError::Storage(e) => Self::Storage(e),
            other => Self::Api(Arc::new(other)),
        }
    }
}

impl From<Arc<ApiError>> for ClientError {
    fn from(err: Arc<ApiError>) -> Self {
        match err.as_ref() {
            ApiError::Unauthorized => Self::NotAuthenticated,
            ApiError::SessionExpired => Self::SessionExpired,
            _ => Self::Api(err),
        }
    }
}

macro_rules! validation_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for ClientError {
                fn from(err: $ty) -> Self {
                    Self::Validation(err.to_string())
                }
            }
        )+
    };
}

validation_from!(MobileError, OtpError, PincodeError, QuantityError, AddressError);

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

// =============================================================================
// Sentry helpers
// =============================================================================

/// Set the Sentry user context.
///
/// Call this after sign-in to associate errors with the user.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

/// Report a payment that may have been charged but was not verified.
///
/// These need a human to reconcile against the gateway dashboard.
pub fn flag_for_follow_up(order_number: &str, gateway_order_id: &str, reason: &str) {
    let event_id = sentry::with_scope(
        |scope| {
            scope.set_tag("follow_up", "payment_verification");
            scope.set_tag("order_number", order_number);
            scope.set_extra("gateway_order_id", gateway_order_id.into());
        },
        || {
            sentry::capture_message(
                &format!("Payment verification failed for order {order_number}: {reason}"),
                sentry::Level::Warning,
            )
        },
    );
    tracing::warn!(
        order_number,
        gateway_order_id,
        reason,
        sentry_event_id = %event_id,
        "Payment flagged for follow-up"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err: ClientError = ApiError::Status {
            status: 400,
            message: "Only 3 items available".to_string(),
        }
        .into();
        assert_eq!(err.user_message(), "Only 3 items available");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_user_message_generic_fallback() {
        let err: ClientError = ApiError::Status {
            status: 502,
            message: String::new(),
        }
        .into();
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_auth_errors_map_to_login_required() {
        let expired: ClientError = ApiError::SessionExpired.into();
        assert!(matches!(expired, ClientError::SessionExpired));
        assert!(expired.requires_login());

        let anon: ClientError = Arc::new(ApiError::Unauthorized).into();
        assert!(matches!(anon, ClientError::NotAuthenticated));
    }

    #[test]
    fn test_validation_from_core_errors() {
        let err: ClientError = MobileError::Empty.into();
        assert_eq!(err.user_message(), "mobile number cannot be empty");
    }
}
