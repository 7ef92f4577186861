//! Map parsed CLI arguments to the action to run.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{
    ARG_DB_INIT_TIMEOUT_SECONDS, ARG_DSN, ARG_ENVIRONMENT, ARG_PORT, http, session, stytch,
};
use anyhow::{Context, Result};

/// Build the server action from validated matches.
///
/// # Errors
/// Returns an error if required arguments are missing or blank.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8000);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let environment = matches
        .get_one::<String>(ARG_ENVIRONMENT)
        .cloned()
        .unwrap_or_else(|| "development".to_string());
    let db_init_timeout_seconds = matches
        .get_one::<u64>(ARG_DB_INIT_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(60);

    let stytch_opts = stytch::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        environment,
        cors_origins: http::cors_origins(matches),
        db_init_timeout_seconds,
        cookie_max_age_seconds: session_opts.cookie_max_age_seconds,
        sms_expiration_minutes: session_opts.sms_expiration_minutes,
        stytch_project_id: stytch_opts.project_id,
        stytch_secret: stytch_opts.secret,
        stytch_base_url: stytch_opts.base_url,
    }))
}
