use super::{
    Config, Error, IdentityProvider, ProviderFuture,
    types::{
        OtpAuthenticateRequest, SessionAuthenticateRequest, SessionAuthenticateResponse,
        SmsSendRequest, SmsSendResponse, TotpAuthenticateRequest, User,
    },
};
use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{Instrument, debug, info_span};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the Stytch consumer API (basic auth `project_id:secret`).
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    secret: SecretString,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("secret", &"***")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client for the configured project.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build Stytch HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            project_id: config.project_id().to_string(),
            secret: config.secret().clone(),
        })
    }

    /// `POST /v1/sessions/authenticate`
    ///
    /// # Errors
    /// Returns [`Error`] when the token is rejected or the provider is unreachable.
    pub async fn authenticate_session(
        &self,
        session_token: &str,
        session_duration_minutes: Option<u32>,
    ) -> Result<SessionAuthenticateResponse, Error> {
        let body = SessionAuthenticateRequest {
            session_token,
            session_duration_minutes,
        };
        self.call(Method::POST, "/v1/sessions/authenticate", Some(&body))
            .await
    }

    /// `GET /v1/users/{user_id}`
    ///
    /// # Errors
    /// Returns [`Error`] when the user is unknown or the provider is unreachable.
    pub async fn get_user(&self, user_id: &str) -> Result<User, Error> {
        let path = format!("/v1/users/{user_id}");
        self.call::<(), User>(Method::GET, &path, None).await
    }

    /// `POST /v1/otps/sms/send`
    ///
    /// # Errors
    /// Returns [`Error`] when the send is rejected or the provider is unreachable.
    pub async fn send_sms_otp(
        &self,
        user_id: &str,
        phone_number: &str,
        expiration_minutes: u32,
    ) -> Result<SmsSendResponse, Error> {
        let body = SmsSendRequest {
            phone_number,
            user_id,
            expiration_minutes,
        };
        self.call(Method::POST, "/v1/otps/sms/send", Some(&body))
            .await
    }

    /// `POST /v1/otps/authenticate`
    ///
    /// # Errors
    /// Returns [`Error`] when the code is rejected or the provider is unreachable.
    pub async fn authenticate_otp(&self, method_id: &str, code: &str) -> Result<(), Error> {
        let body = OtpAuthenticateRequest { method_id, code };
        self.call::<_, serde_json::Value>(Method::POST, "/v1/otps/authenticate", Some(&body))
            .await
            .map(|_| ())
    }

    /// `POST /v1/totps/authenticate`
    ///
    /// # Errors
    /// Returns [`Error`] when the code is rejected or the provider is unreachable.
    pub async fn authenticate_totp(&self, user_id: &str, code: &str) -> Result<(), Error> {
        let body = TotpAuthenticateRequest {
            user_id,
            totp_code: code,
        };
        self.call::<_, serde_json::Value>(Method::POST, "/v1/totps/authenticate", Some(&body))
            .await
            .map(|_| ())
    }

    async fn call<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let span = info_span!(
            "stytch.request",
            http.method = %method,
            http.path = path,
            http.status_code = tracing::field::Empty
        );

        let mut request = self.authorized(self.http.request(method, &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        async move {
            let response = request.send().await?;
            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                debug!("Stytch returned {status} for {path}");
                return Err(Error::from_status(status, &text));
            }

            response
                .json::<R>()
                .await
                .map_err(|err| Error::Unavailable(format!("invalid response body: {err}")))
        }
        .instrument(span)
        .await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.project_id, Some(self.secret.expose_secret()))
    }
}

impl IdentityProvider for Client {
    fn authenticate_session<'a>(
        &'a self,
        session_token: &'a str,
        session_duration_minutes: Option<u32>,
    ) -> ProviderFuture<'a, SessionAuthenticateResponse> {
        Box::pin(self.authenticate_session(session_token, session_duration_minutes))
    }

    fn get_user<'a>(&'a self, user_id: &'a str) -> ProviderFuture<'a, User> {
        Box::pin(self.get_user(user_id))
    }

    fn send_sms_otp<'a>(
        &'a self,
        user_id: &'a str,
        phone_number: &'a str,
        expiration_minutes: u32,
    ) -> ProviderFuture<'a, SmsSendResponse> {
        Box::pin(self.send_sms_otp(user_id, phone_number, expiration_minutes))
    }

    fn authenticate_otp<'a>(
        &'a self,
        method_id: &'a str,
        code: &'a str,
    ) -> ProviderFuture<'a, ()> {
        Box::pin(self.authenticate_otp(method_id, code))
    }

    fn authenticate_totp<'a>(&'a self, user_id: &'a str, code: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(self.authenticate_totp(user_id, code))
    }
}
