use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use clap::{Arg, ArgMatches, Command};

pub const ARG_GEMINI_URL: &str = "gemini-url";
pub const ARG_GEMINI_MODEL: &str = "gemini-model";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub model: String,
}

impl Options {
    /// Parse Gemini arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a value is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // clap passes through empty strings when the env var is set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(url) = get_non_empty(ARG_GEMINI_URL) else {
            anyhow::bail!("missing required argument: --{ARG_GEMINI_URL}");
        };
        let Some(model) = get_non_empty(ARG_GEMINI_MODEL) else {
            anyhow::bail!("missing required argument: --{ARG_GEMINI_MODEL}");
        };

        Ok(Self { url, model })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GEMINI_URL)
                .long(ARG_GEMINI_URL)
                .help("Base URL of the Gemini API")
                .env("SUMMARIZER_GEMINI_URL")
                .default_value(DEFAULT_BASE_URL),
        )
        .arg(
            Arg::new(ARG_GEMINI_MODEL)
                .long(ARG_GEMINI_MODEL)
                .help("Gemini model used for summaries")
                .long_help(
                    "Gemini model used for summaries.\n\nThe API key is not configured here: every visitor supplies their own through the form.",
                )
                .env("SUMMARIZER_GEMINI_MODEL")
                .default_value(DEFAULT_MODEL),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_api() -> anyhow::Result<()> {
        temp_env::with_vars(
            [
                ("SUMMARIZER_GEMINI_URL", None::<&str>),
                ("SUMMARIZER_GEMINI_MODEL", None::<&str>),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(vec!["test"]);
                let options = Options::parse(&matches)?;
                assert_eq!(options.url, DEFAULT_BASE_URL);
                assert_eq!(options.model, DEFAULT_MODEL);
                Ok(())
            },
        )
    }

    #[test]
    fn blank_model_is_rejected() {
        temp_env::with_vars([("SUMMARIZER_GEMINI_MODEL", Some("  "))], || {
            let matches = with_args(Command::new("test")).get_matches_from(vec!["test"]);
            let result = Options::parse(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err
                    .to_string()
                    .contains("missing required argument: --gemini-model"));
            }
        });
    }
}
