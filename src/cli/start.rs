use crate::cli::{
    actions::Action,
    commands::{self, logging::ARG_VERBOSITY},
    dispatch::handler,
    telemetry,
};
use anyhow::Result;
use tracing::Level;

fn verbosity_level(matches: &clap::ArgMatches) -> Option<Level> {
    match matches.get_one::<u8>(ARG_VERBOSITY).copied() {
        Some(1) => Some(Level::WARN),
        Some(2) => Some(Level::INFO),
        Some(3) => Some(Level::DEBUG),
        Some(level) if level >= 4 => Some(Level::TRACE),
        _ => None,
    }
}

/// Parse arguments, install logging and map the matches to an action.
///
/// # Errors
/// Returns an error if telemetry cannot be initialized or arguments are invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(verbosity_level(&matches))?;

    handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::logging;
    use clap::Command;

    #[test]
    fn verbosity_counts_map_to_levels() {
        temp_env::with_var("SAAS_API_LOG_LEVEL", None::<&str>, || {
            let command = logging::with_args(Command::new("test"));
            for (args, expected) in [
                (vec!["test"], None),
                (vec!["test", "-v"], Some(Level::WARN)),
                (vec!["test", "-vv"], Some(Level::INFO)),
                (vec!["test", "-vvv"], Some(Level::DEBUG)),
                (vec!["test", "-vvvvv"], Some(Level::TRACE)),
            ] {
                let matches = command.clone().get_matches_from(args);
                assert_eq!(verbosity_level(&matches), expected);
            }
        });
    }
}
