use crate::session::DEFAULT_SESSION_TTL;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;

pub const ARG_SECURE_COOKIE: &str = "secure-cookie";
pub const ARG_SESSION_TTL: &str = "session-ttl";

const DEFAULT_TTL_SECONDS: &str = "43200";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub secure_cookie: bool,
    pub ttl: Duration,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let ttl = matches
            .get_one::<u64>(ARG_SESSION_TTL)
            .map_or(DEFAULT_SESSION_TTL, |seconds| Duration::from_secs(*seconds));

        Self {
            secure_cookie: matches.get_flag(ARG_SECURE_COOKIE),
            ttl,
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECURE_COOKIE)
                .long(ARG_SECURE_COOKIE)
                .help("Mark the session cookie Secure (serve behind HTTPS)")
                .env("SUMMARIZER_SECURE_COOKIE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long(ARG_SESSION_TTL)
                .help("Seconds of inactivity after which a session is dropped")
                .env("SUMMARIZER_SESSION_TTL")
                .default_value(DEFAULT_TTL_SECONDS)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
