use reqwest::StatusCode;
use serde::Deserialize;

/// Failures reported by the Stytch client.
///
/// Only `Unavailable` means "try again later"; the other variants are
/// definitive answers from the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("stytch rejected the request ({error_type}): {message}")]
    Unauthorized { error_type: String, message: String },
    #[error("stytch resource not found ({error_type})")]
    NotFound { error_type: String },
    #[error("stytch unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Map a non-success HTTP status plus the provider error body.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (error_type, message) = parsed.map_or_else(
            || (status.as_str().to_string(), String::new()),
            |body| (body.error_type, body.error_message),
        );

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::Unauthorized {
                    error_type,
                    message,
                }
            }
            StatusCode::NOT_FOUND => Self::NotFound { error_type },
            _ => Self::Unavailable(format!("{status}: {error_type}")),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_type: String,
    #[serde(default)]
    error_message: String,
}
