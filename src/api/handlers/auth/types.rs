//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub user: User,
    pub authenticated: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionEstablishRequest {
    pub session_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionEstablishResponse {
    pub success: bool,
    pub user: User,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MfaCheckResponse {
    pub mfa_required: bool,
    pub user_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MfaChallengeRequest {
    pub user_id: String,
    /// `sms` or `totp`
    pub challenge_type: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MfaVerifyRequest {
    pub user_id: String,
    pub code: String,
    /// `sms` or `totp`
    pub challenge_type: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MfaResponse {
    pub success: bool,
    pub message: String,
}

impl MfaResponse {
    pub(super) fn new(success: bool, message: &str) -> Self {
        Self {
            success,
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeType {
    Sms,
    Totp,
}

impl ChallengeType {
    /// Unknown values are answered with a soft failure, not a 422.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sms" => Some(Self::Sms),
            "totp" => Some(Self::Totp),
            _ => None,
        }
    }
}
