pub mod http;
pub mod logging;
pub mod session;
pub mod stytch;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_DB_INIT_TIMEOUT_SECONDS: &str = "db-init-timeout-seconds";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("saas-api")
        .about("Backend API for SaaS Template")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8000")
                .env("SAAS_API_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("DATABASE_URL")
                .default_value("postgres://postgres:postgres@db:5432/saas"),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; \"production\" enables Secure cookies")
                .env("ENVIRONMENT")
                .default_value("development"),
        )
        .arg(
            Arg::new(ARG_DB_INIT_TIMEOUT_SECONDS)
                .long(ARG_DB_INIT_TIMEOUT_SECONDS)
                .help("Seconds to keep retrying schema initialization at startup")
                .env("SAAS_API_DB_INIT_TIMEOUT_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..)),
        );

    let command = stytch::with_args(command);
    let command = http::with_args(command);
    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 11] = [
        "SAAS_API_PORT",
        "DATABASE_URL",
        "ENVIRONMENT",
        "SAAS_API_DB_INIT_TIMEOUT_SECONDS",
        "SAAS_API_CORS_ORIGINS",
        "SAAS_API_COOKIE_MAX_AGE_SECONDS",
        "SAAS_API_SMS_EXPIRATION_MINUTES",
        "SAAS_API_LOG_LEVEL",
        "STYTCH_BASE_URL",
        "STYTCH_PROJECT_ID",
        "STYTCH_SECRET",
    ];

    fn with_clean_env<F: FnOnce()>(f: F) {
        let vars: Vec<(&str, Option<&str>)> = ENV_VARS.iter().map(|name| (*name, None)).collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "saas-api");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Backend API for SaaS Template".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn defaults_apply_without_env() {
        with_clean_env(|| {
            let matches = new().get_matches_from(vec![
                "saas-api",
                "--stytch-project-id",
                "project-test-1",
                "--stytch-secret",
                "secret",
            ]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8000));
            assert_eq!(
                matches.get_one::<String>(ARG_DSN).map(String::as_str),
                Some("postgres://postgres:postgres@db:5432/saas")
            );
            assert_eq!(
                matches.get_one::<String>(ARG_ENVIRONMENT).map(String::as_str),
                Some("development")
            );
            assert_eq!(
                matches.get_one::<u64>(ARG_DB_INIT_TIMEOUT_SECONDS).copied(),
                Some(60)
            );
            assert_eq!(
                session::Options::parse(&matches),
                session::Options {
                    cookie_max_age_seconds: 3600,
                    sms_expiration_minutes: 10,
                }
            );
        });
    }

    #[test]
    fn env_overrides_defaults() {
        with_clean_env(|| {
            temp_env::with_vars(
                [
                    ("SAAS_API_PORT", Some("9000")),
                    ("DATABASE_URL", Some("postgres://app@localhost:5432/app")),
                    ("ENVIRONMENT", Some("production")),
                    ("STYTCH_PROJECT_ID", Some("project-live-1")),
                    ("STYTCH_SECRET", Some("secret-live")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["saas-api"]);
                    assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9000));
                    assert_eq!(
                        matches.get_one::<String>(ARG_DSN).map(String::as_str),
                        Some("postgres://app@localhost:5432/app")
                    );
                    assert_eq!(
                        matches.get_one::<String>(ARG_ENVIRONMENT).map(String::as_str),
                        Some("production")
                    );
                },
            );
        });
    }

    #[test]
    fn invalid_port_is_rejected() {
        with_clean_env(|| {
            let result = new().try_get_matches_from(vec![
                "saas-api",
                "--port",
                "70000",
                "--stytch-project-id",
                "p",
                "--stytch-secret",
                "s",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn zero_init_timeout_is_rejected() {
        with_clean_env(|| {
            let result = new().try_get_matches_from(vec![
                "saas-api",
                "--db-init-timeout-seconds",
                "0",
                "--stytch-project-id",
                "p",
                "--stytch-secret",
                "s",
            ]);
            assert!(result.is_err());
        });
    }
}
