//! Wire types for the subset of the Stytch consumer API we call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub user_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionAuthenticateResponse {
    pub session: Option<Session>,
    #[serde(default)]
    pub session_token: String,
}

impl SessionAuthenticateResponse {
    /// The session, if the provider returned one carrying a user id.
    #[must_use]
    pub fn valid_session(&self) -> Option<&Session> {
        self.session
            .as_ref()
            .filter(|session| !session.user_id.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub emails: Vec<Email>,
    pub name: Option<Name>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub totps: Vec<Totp>,
}

impl User {
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .first()
            .map(|email| email.email.as_str())
            .filter(|email| !email.is_empty())
    }

    /// `"first last"` trimmed, or `None` when both parts are blank.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.as_ref()?;
        let full = format!("{} {}", name.first_name.trim(), name.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            None
        } else {
            Some(full.to_string())
        }
    }

    #[must_use]
    pub fn has_verified_totp(&self) -> bool {
        self.totps.iter().any(|totp| totp.verified)
    }

    #[must_use]
    pub fn has_verified_phone(&self) -> bool {
        self.phone_numbers.iter().any(|phone| phone.verified)
    }

    /// First phone number, verified ones preferred.
    #[must_use]
    pub fn sms_factor(&self) -> Option<&PhoneNumber> {
        self.phone_numbers
            .iter()
            .find(|phone| phone.verified)
            .or_else(|| self.phone_numbers.first())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Email {
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Name {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PhoneNumber {
    #[serde(default)]
    pub phone_id: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Totp {
    #[serde(default)]
    pub totp_id: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsSendResponse {
    #[serde(default)]
    pub phone_id: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionAuthenticateRequest<'a> {
    pub session_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SmsSendRequest<'a> {
    pub phone_number: &'a str,
    pub user_id: &'a str,
    pub expiration_minutes: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpAuthenticateRequest<'a> {
    pub method_id: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TotpAuthenticateRequest<'a> {
    pub user_id: &'a str,
    pub totp_code: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn session_response_without_user_is_not_valid() -> Result<()> {
        let response: SessionAuthenticateResponse =
            serde_json::from_str(r#"{"session":{"session_id":"s-1","user_id":""}}"#)?;
        assert!(response.valid_session().is_none());

        let response: SessionAuthenticateResponse = serde_json::from_str(r#"{"session":null}"#)?;
        assert!(response.valid_session().is_none());
        Ok(())
    }

    #[test]
    fn session_parses_timestamps() -> Result<()> {
        let response: SessionAuthenticateResponse = serde_json::from_str(
            r#"{
                "session": {
                    "session_id": "session-test-1",
                    "user_id": "user-test-1",
                    "started_at": "2024-01-01T10:00:00Z",
                    "last_accessed_at": "2024-01-01T10:05:00Z",
                    "expires_at": "2024-01-01T11:00:00Z"
                },
                "session_token": "tok"
            }"#,
        )?;
        let session = response.valid_session();
        assert_eq!(session.map(|s| s.user_id.as_str()), Some("user-test-1"));
        assert!(session.and_then(|s| s.started_at).is_some());
        assert_eq!(response.session_token, "tok");
        Ok(())
    }

    #[test]
    fn display_name_trims_and_skips_blank() {
        let mut user = User {
            user_id: "user-1".to_string(),
            name: Some(Name {
                first_name: "  Ada ".to_string(),
                middle_name: String::new(),
                last_name: " Lovelace".to_string(),
            }),
            ..User::default()
        };
        assert_eq!(user.display_name().as_deref(), Some("Ada Lovelace"));

        user.name = Some(Name {
            first_name: "Ada".to_string(),
            ..Name::default()
        });
        assert_eq!(user.display_name().as_deref(), Some("Ada"));

        user.name = Some(Name::default());
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn sms_factor_prefers_verified_numbers() {
        let user = User {
            user_id: "user-1".to_string(),
            phone_numbers: vec![
                PhoneNumber {
                    phone_id: "phone-a".to_string(),
                    phone_number: "+15550000001".to_string(),
                    verified: false,
                },
                PhoneNumber {
                    phone_id: "phone-b".to_string(),
                    phone_number: "+15550000002".to_string(),
                    verified: true,
                },
            ],
            ..User::default()
        };
        assert_eq!(user.sms_factor().map(|p| p.phone_id.as_str()), Some("phone-b"));
        assert!(user.has_verified_phone());
        assert!(!user.has_verified_totp());
    }
}
