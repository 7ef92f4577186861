use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_STYTCH_PROJECT_ID: &str = "stytch-project-id";
pub const ARG_STYTCH_SECRET: &str = "stytch-secret";
pub const ARG_STYTCH_BASE_URL: &str = "stytch-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_STYTCH_PROJECT_ID)
                .long(ARG_STYTCH_PROJECT_ID)
                .help("Stytch project ID")
                .env("STYTCH_PROJECT_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_STYTCH_SECRET)
                .long(ARG_STYTCH_SECRET)
                .help("Stytch project secret")
                .env("STYTCH_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_STYTCH_BASE_URL)
                .long(ARG_STYTCH_BASE_URL)
                .help("Stytch API base URL")
                .long_help(
                    "Stytch API base URL. Defaults to https://test.stytch.com for project-test-* IDs, otherwise https://api.stytch.com.",
                )
                .env("STYTCH_BASE_URL"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub project_id: String,
    pub secret: SecretString,
    pub base_url: Option<String>,
}

impl Options {
    /// Read Stytch credentials from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the project id or secret is missing or blank, or the
    /// base URL does not parse.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let project_id = matches
            .get_one::<String>(ARG_STYTCH_PROJECT_ID)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .context("missing required argument: --stytch-project-id")?;
        let secret = matches
            .get_one::<String>(ARG_STYTCH_SECRET)
            .filter(|value| !value.trim().is_empty())
            .map(|value| SecretString::from(value.trim().to_string()))
            .context("missing required argument: --stytch-secret")?;
        let base_url = matches
            .get_one::<String>(ARG_STYTCH_BASE_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| {
                Url::parse(&value)
                    .with_context(|| format!("invalid --stytch-base-url: {value}"))
                    .map(|_| value)
            })
            .transpose()?;

        Ok(Self {
            project_id,
            secret,
            base_url,
        })
    }
}
