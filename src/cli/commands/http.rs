use clap::{Arg, ArgMatches, Command};

pub const ARG_CORS_ORIGINS: &str = "cors-origins";
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://127.0.0.1:5173,http://frontend:5173";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CORS_ORIGINS)
            .long(ARG_CORS_ORIGINS)
            .help("Comma separated origins allowed to call the API with credentials")
            .env("SAAS_API_CORS_ORIGINS")
            .value_delimiter(',')
            .default_value(DEFAULT_CORS_ORIGINS),
    )
}

#[must_use]
pub fn cors_origins(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>(ARG_CORS_ORIGINS)
        .map(|values| {
            values
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
