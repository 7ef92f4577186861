//! MFA endpoints. Factor state and code checks live in Stytch.

use axum::{
    Json,
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info, warn};

use super::{
    principal::{authenticate, peer_ip, with_rotated_cookie},
    state::AuthState,
    types::{
        ChallengeType, MfaChallengeRequest, MfaCheckResponse, MfaResponse, MfaVerifyRequest,
    },
};
use crate::api::error::ErrorDetail;

const INVALID_CHALLENGE_TYPE: &str = "Invalid challenge type";

#[utoipa::path(
    post,
    path = "/auth/mfa/check",
    responses(
        (status = 200, description = "Whether the user must complete MFA", body = MfaCheckResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorDetail)
    ),
    tag = "mfa"
)]
pub async fn check(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    let current = match authenticate(&auth_state, &headers, peer_ip(connect_info)).await {
        Ok(current) => current,
        Err(err) => return err.into_response(),
    };

    let user_id = current.user.user_id.clone();
    let mfa_required = match auth_state.provider().get_user(&user_id).await {
        Ok(user) => user.has_verified_totp() || user.has_verified_phone(),
        Err(err) => {
            error!("MFA check error for user {user_id}: {err}");
            false
        }
    };

    let response = (
        StatusCode::OK,
        Json(MfaCheckResponse {
            mfa_required,
            user_id,
        }),
    )
        .into_response();
    with_rotated_cookie(response, &current, auth_state.config())
}

#[utoipa::path(
    post,
    path = "/auth/mfa/challenge",
    request_body = MfaChallengeRequest,
    responses(
        (status = 200, description = "Challenge outcome", body = MfaResponse)
    ),
    tag = "mfa"
)]
pub async fn challenge(
    auth_state: Extension<Arc<AuthState>>,
    payload: Json<MfaChallengeRequest>,
) -> impl IntoResponse {
    let response = match ChallengeType::parse(&payload.challenge_type) {
        Some(ChallengeType::Sms) => send_sms_challenge(&auth_state, &payload.user_id).await,
        Some(ChallengeType::Totp) => MfaResponse::new(true, "Enter code from authenticator app"),
        None => MfaResponse::new(false, INVALID_CHALLENGE_TYPE),
    };
    (StatusCode::OK, Json(response))
}

async fn send_sms_challenge(auth_state: &AuthState, user_id: &str) -> MfaResponse {
    const FAILED: &str = "Failed to send challenge";

    let provider = auth_state.provider();
    let user = match provider.get_user(user_id).await {
        Ok(user) => user,
        Err(err) => {
            error!("MFA challenge error for user {user_id}: {err}");
            return MfaResponse::new(false, FAILED);
        }
    };
    let Some(phone) = user.sms_factor() else {
        warn!("MFA challenge for user {user_id} without a phone number");
        return MfaResponse::new(false, FAILED);
    };

    match provider
        .send_sms_otp(
            user_id,
            &phone.phone_number,
            auth_state.config().sms_expiration_minutes(),
        )
        .await
    {
        Ok(_) => {
            info!("SMS challenge sent for user {user_id}");
            MfaResponse::new(true, "SMS code sent")
        }
        Err(err) => {
            error!("MFA challenge error for user {user_id}: {err}");
            MfaResponse::new(false, FAILED)
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/mfa/verify",
    request_body = MfaVerifyRequest,
    responses(
        (status = 200, description = "Verification outcome", body = MfaResponse)
    ),
    tag = "mfa"
)]
pub async fn verify(
    auth_state: Extension<Arc<AuthState>>,
    payload: Json<MfaVerifyRequest>,
) -> impl IntoResponse {
    let Some(challenge_type) = ChallengeType::parse(&payload.challenge_type) else {
        return (StatusCode::OK, Json(MfaResponse::new(false, INVALID_CHALLENGE_TYPE)));
    };

    let provider = auth_state.provider();
    let user_id = payload.user_id.as_str();
    let code = payload.code.trim();
    let result = match challenge_type {
        ChallengeType::Sms => match provider.get_user(user_id).await {
            Ok(user) => match user.sms_factor() {
                Some(phone) => provider.authenticate_otp(&phone.phone_id, code).await,
                None => {
                    warn!("MFA verify for user {user_id} without a phone number");
                    return (StatusCode::OK, Json(MfaResponse::new(false, "Invalid code")));
                }
            },
            Err(err) => Err(err),
        },
        ChallengeType::Totp => provider.authenticate_totp(user_id, code).await,
    };

    let response = match result {
        Ok(()) => {
            info!("MFA verified for user {user_id}");
            MfaResponse::new(true, "MFA verified")
        }
        Err(err) => {
            warn!("MFA verify error for user {user_id}: {err}");
            MfaResponse::new(false, "Invalid code")
        }
    };
    (StatusCode::OK, Json(response))
}
