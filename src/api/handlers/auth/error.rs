use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::error::detail;
use crate::stytch;

/// Authentication failures surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no session cookie")]
    SessionNotFound,
    #[error("invalid or expired session")]
    InvalidSession,
    #[error("session fingerprint mismatch")]
    SecurityViolation,
    #[error("authentication service unavailable")]
    ProviderUnavailable,
    #[error("authentication failed")]
    Authentication,
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    #[must_use]
    pub const fn detail(&self) -> &'static str {
        match self {
            Self::SessionNotFound => "Authentication required",
            Self::InvalidSession | Self::SecurityViolation => "Invalid or expired session",
            Self::ProviderUnavailable => "Authentication service temporarily unavailable",
            Self::Authentication => "Authentication failed",
        }
    }
}

impl From<stytch::Error> for AuthError {
    fn from(err: stytch::Error) -> Self {
        match err {
            stytch::Error::Unavailable(_) => Self::ProviderUnavailable,
            stytch::Error::Unauthorized { .. } | stytch::Error::NotFound { .. } => {
                Self::InvalidSession
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        detail(self.status(), self.detail())
    }
}
