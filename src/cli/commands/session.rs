use clap::{Arg, ArgMatches, Command};

pub const ARG_COOKIE_MAX_AGE_SECONDS: &str = "cookie-max-age-seconds";
pub const ARG_SMS_EXPIRATION_MINUTES: &str = "sms-expiration-minutes";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_COOKIE_MAX_AGE_SECONDS)
                .long(ARG_COOKIE_MAX_AGE_SECONDS)
                .help("Max-Age of the session and CSRF cookies, in seconds")
                .env("SAAS_API_COOKIE_MAX_AGE_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SMS_EXPIRATION_MINUTES)
                .long(ARG_SMS_EXPIRATION_MINUTES)
                .help("Lifetime of SMS one-time passcodes, in minutes (1 to 10)")
                .env("SAAS_API_SMS_EXPIRATION_MINUTES")
                .default_value("10")
                .value_parser(clap::value_parser!(u32).range(1..=10)),
        )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub cookie_max_age_seconds: u64,
    pub sms_expiration_minutes: u32,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            cookie_max_age_seconds: matches
                .get_one::<u64>(ARG_COOKIE_MAX_AGE_SECONDS)
                .copied()
                .unwrap_or(3600),
            sms_expiration_minutes: matches
                .get_one::<u32>(ARG_SMS_EXPIRATION_MINUTES)
                .copied()
                .unwrap_or(10),
        }
    }
}
