use crate::{
    api::{self, AppConfig, AppState},
    cli::telemetry,
    gemini::GeminiClient,
};
use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub gemini_url: String,
    pub gemini_model: String,
    pub secure_cookie: bool,
    pub session_ttl: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the Gemini client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        gemini_url = %args.gemini_url,
        gemini_model = %args.gemini_model,
        secure_cookie = args.secure_cookie,
        session_ttl_secs = args.session_ttl.as_secs(),
        "Starting summarizer"
    );

    let gemini = GeminiClient::new(&args.gemini_url, args.gemini_model)?;

    let config = AppConfig::new(gemini.model())
        .with_secure_cookie(args.secure_cookie)
        .with_session_ttl(args.session_ttl);

    let state = Arc::new(AppState::new(config, Arc::new(gemini)));

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}
