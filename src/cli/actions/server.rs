use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState},
    },
    db, stytch,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub db_init_timeout_seconds: u64,
    pub cookie_max_age_seconds: u64,
    pub sms_expiration_minutes: u32,
    pub stytch_project_id: String,
    pub stytch_secret: SecretString,
    pub stytch_base_url: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the Stytch client cannot be built, the schema cannot be
/// applied before the timeout, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let stytch_config = stytch::Config::new(args.stytch_project_id, args.stytch_secret)
        .with_base_url(args.stytch_base_url);
    debug!("Stytch config: {:?}", stytch_config);
    info!("Using Stytch API at {}", stytch_config.base_url());

    let provider = Arc::new(
        stytch::Client::new(&stytch_config).context("Failed to build Stytch client")?,
    );

    let pool = db::connect(&args.dsn)?;
    db::init_schema(&pool, Duration::from_secs(args.db_init_timeout_seconds)).await?;

    let auth_config = AuthConfig::new(args.environment)
        .with_cookie_max_age_seconds(args.cookie_max_age_seconds)
        .with_sms_expiration_minutes(args.sms_expiration_minutes);
    info!(
        "Environment: {} (secure cookies: {})",
        auth_config.environment(),
        auth_config.is_production()
    );
    let auth_state = Arc::new(AuthState::new(auth_config, provider));

    api::new(args.port, pool, auth_state, &args.cors_origins).await
}
