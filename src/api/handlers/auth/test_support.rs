//! In-memory identity provider for handler and cache tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use chrono::Utc;

use crate::stytch::{
    Error, IdentityProvider, ProviderFuture,
    types::{Email, Name, PhoneNumber, Session, SessionAuthenticateResponse, SmsSendResponse, Totp, User},
};

#[derive(Default)]
pub(crate) struct FakeProvider {
    sessions: Mutex<HashMap<String, Session>>,
    users: Mutex<HashMap<String, User>>,
    rotation: Mutex<Option<String>>,
    unavailable: AtomicBool,
    session_calls: AtomicUsize,
    last_duration: Mutex<Option<u32>>,
    sms_sent: Mutex<Vec<(String, String)>>,
    otp_codes: Mutex<HashMap<String, String>>,
    totp_codes: Mutex<HashMap<String, String>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_session(self, token: &str, user_id: &str) -> Self {
        let session = Session {
            session_id: format!("session-{token}"),
            user_id: user_id.to_string(),
            started_at: Some(Utc::now()),
            last_accessed_at: None,
            expires_at: None,
        };
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(token.to_string(), session);
        }
        self
    }

    pub(crate) fn with_user(self, user_id: &str, email: &str, name: Option<(&str, &str)>) -> Self {
        let user = User {
            user_id: user_id.to_string(),
            emails: vec![Email {
                email_id: format!("email-{user_id}"),
                email: email.to_string(),
                verified: true,
            }],
            name: name.map(|(first, last)| Name {
                first_name: first.to_string(),
                middle_name: String::new(),
                last_name: last.to_string(),
            }),
            ..User::default()
        };
        if let Ok(mut users) = self.users.lock() {
            users.insert(user_id.to_string(), user);
        }
        self
    }

    pub(crate) fn with_phone(self, user_id: &str, phone_id: &str, phone_number: &str) -> Self {
        if let Ok(mut users) = self.users.lock() {
            let user = users.entry(user_id.to_string()).or_insert_with(|| User {
                user_id: user_id.to_string(),
                ..User::default()
            });
            user.phone_numbers.push(PhoneNumber {
                phone_id: phone_id.to_string(),
                phone_number: phone_number.to_string(),
                verified: true,
            });
        }
        self
    }

    pub(crate) fn with_totp(self, user_id: &str, code: &str) -> Self {
        if let Ok(mut users) = self.users.lock() {
            let user = users.entry(user_id.to_string()).or_insert_with(|| User {
                user_id: user_id.to_string(),
                ..User::default()
            });
            user.totps.push(Totp {
                totp_id: format!("totp-{user_id}"),
                verified: true,
            });
        }
        if let Ok(mut codes) = self.totp_codes.lock() {
            codes.insert(user_id.to_string(), code.to_string());
        }
        self
    }

    pub(crate) fn with_otp_code(self, method_id: &str, code: &str) -> Self {
        if let Ok(mut codes) = self.otp_codes.lock() {
            codes.insert(method_id.to_string(), code.to_string());
        }
        self
    }

    /// Token handed back when a session is extended.
    pub(crate) fn with_rotation(self, token: &str) -> Self {
        if let Ok(mut rotation) = self.rotation.lock() {
            *rotation = Some(token.to_string());
        }
        self
    }

    pub(crate) fn revoke(&self, token: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(token);
        }
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_duration_minutes(&self) -> Option<u32> {
        self.last_duration.lock().ok().and_then(|value| *value)
    }

    pub(crate) fn sms_sent(&self) -> Vec<(String, String)> {
        self.sms_sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(Error::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn unauthorized(error_type: &str) -> Error {
        Error::Unauthorized {
            error_type: error_type.to_string(),
            message: String::new(),
        }
    }

    fn session_response(
        &self,
        token: &str,
        duration: Option<u32>,
    ) -> Result<SessionAuthenticateResponse, Error> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_duration.lock() {
            *last = duration;
        }
        self.check_available()?;

        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| Error::Unavailable("poisoned".to_string()))?;
        let session = sessions
            .get(token)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                error_type: "session_not_found".to_string(),
            })?;

        let rotated = duration.and(self.rotation.lock().ok().and_then(|r| r.clone()));
        let session_token = match rotated {
            Some(new_token) => {
                sessions.insert(new_token.clone(), session.clone());
                new_token
            }
            None => token.to_string(),
        };

        Ok(SessionAuthenticateResponse {
            session: Some(session),
            session_token,
        })
    }
}

impl IdentityProvider for FakeProvider {
    fn authenticate_session<'a>(
        &'a self,
        session_token: &'a str,
        session_duration_minutes: Option<u32>,
    ) -> ProviderFuture<'a, SessionAuthenticateResponse> {
        Box::pin(async move { self.session_response(session_token, session_duration_minutes) })
    }

    fn get_user<'a>(&'a self, user_id: &'a str) -> ProviderFuture<'a, User> {
        Box::pin(async move {
            self.check_available()?;
            self.users
                .lock()
                .ok()
                .and_then(|users| users.get(user_id).cloned())
                .ok_or_else(|| Error::NotFound {
                    error_type: "user_not_found".to_string(),
                })
        })
    }

    fn send_sms_otp<'a>(
        &'a self,
        user_id: &'a str,
        phone_number: &'a str,
        _expiration_minutes: u32,
    ) -> ProviderFuture<'a, SmsSendResponse> {
        Box::pin(async move {
            self.check_available()?;
            if let Ok(mut sent) = self.sms_sent.lock() {
                sent.push((user_id.to_string(), phone_number.to_string()));
            }
            Ok(SmsSendResponse {
                phone_id: format!("phone-{user_id}"),
                user_id: user_id.to_string(),
            })
        })
    }

    fn authenticate_otp<'a>(&'a self, method_id: &'a str, code: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.check_available()?;
            let expected = self
                .otp_codes
                .lock()
                .ok()
                .and_then(|codes| codes.get(method_id).cloned());
            if expected.as_deref() == Some(code) {
                Ok(())
            } else {
                Err(Self::unauthorized("otp_code_not_found"))
            }
        })
    }

    fn authenticate_totp<'a>(&'a self, user_id: &'a str, code: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.check_available()?;
            let expected = self
                .totp_codes
                .lock()
                .ok()
                .and_then(|codes| codes.get(user_id).cloned());
            if expected.as_deref() == Some(code) {
                Ok(())
            } else {
                Err(Self::unauthorized("invalid_totp_code"))
            }
        })
    }
}
