//! Verbosity: repeated `-v` or `SUMMARIZER_LOG_LEVEL`.

use clap::{builder::ValueParser, Arg, ArgAction, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

// Position is the verbosity count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const MAX_COUNT: u8 = 5;

/// Level name (any case) or a count up to 5.
fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim();

    if let Ok(count) = value.parse::<u8>() {
        return if count <= MAX_COUNT {
            Ok(count)
        } else {
            Err(format!("verbosity count must be at most {MAX_COUNT}"))
        };
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("expected one of {} or 0-{MAX_COUNT}", LEVEL_NAMES.join(", ")))
}

/// Default log level for a verbosity count. `None` leaves the subscriber at
/// its quiet default (errors only).
#[must_use]
pub const fn level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace")
            .long_help(
                "Log more: -v warn, -vv info, -vvv debug, -vvvv trace.\n\nSUMMARIZER_LOG_LEVEL accepts a level name or a count. RUST_LOG directives override both.",
            )
            .env("SUMMARIZER_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_verbosity)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(parse_verbosity("error"), Ok(0));
        assert_eq!(parse_verbosity("Info"), Ok(2));
        assert_eq!(parse_verbosity(" TRACE "), Ok(4));
    }

    #[test]
    fn counts_are_bounded() {
        assert_eq!(parse_verbosity("3"), Ok(3));
        assert_eq!(parse_verbosity("5"), Ok(5));
        assert!(parse_verbosity("6").is_err());
    }

    #[test]
    fn unknown_name_lists_choices() {
        let err = parse_verbosity("chatty").err().unwrap_or_default();
        assert!(err.contains("error, warn, info, debug, trace"));
    }

    #[test]
    fn counts_map_to_levels() {
        assert_eq!(level(0), None);
        assert_eq!(level(1), Some(Level::WARN));
        assert_eq!(level(2), Some(Level::INFO));
        assert_eq!(level(3), Some(Level::DEBUG));
        assert_eq!(level(4), Some(Level::TRACE));
        assert_eq!(level(MAX_COUNT), Some(Level::TRACE));
    }
}
