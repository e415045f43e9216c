use super::{build_prompt, SummarizeError, Summarizer, SummaryFuture};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint.
///
/// The API key is not part of the client; it travels with every call.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: Url,
    model: String,
}

impl GeminiClient {
    /// # Errors
    /// Returns an error if `base_url` is not an http(s) URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid Gemini URL: {base_url}"))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Gemini URL must use http or https: {}",
                base_url.as_str()
            ));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            client,
            base_url,
            model: model.into(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        )
    }

    /// Send `prompt` as a single user turn and return the completion text.
    ///
    /// # Errors
    /// Transport failures, non-2xx answers, blocked prompts and answers
    /// without text are all returned as [`SummarizeError`].
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        api_key: &SecretString,
    ) -> Result<String, SummarizeError> {
        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = provider_message(&body).unwrap_or(body);

            error!("Gemini returned {}: {}", status, message);

            return Err(SummarizeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateContentResponse = response.json().await?;

        let completion = completion(response)?;

        debug!("completion length: {}", completion.len());

        Ok(completion)
    }
}

impl Summarizer for GeminiClient {
    fn summarize<'a>(&'a self, text: &'a str, api_key: &'a SecretString) -> SummaryFuture<'a> {
        Box::pin(async move {
            if api_key.expose_secret().is_empty() {
                return Err(SummarizeError::MissingApiKey);
            }

            self.generate(&build_prompt(text), api_key).await
        })
    }
}

/// `error.message` from a Google API error body, if there is one.
fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(ToString::to_string)
}

fn completion(response: GenerateContentResponse) -> Result<String, SummarizeError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(
            match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => SummarizeError::Blocked(reason),
                None => SummarizeError::EmptyCompletion("no candidates".to_string()),
            },
        );
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(SummarizeError::EmptyCompletion(
            candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn key(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn new_rejects_bad_urls() {
        assert!(GeminiClient::new("not a url", DEFAULT_MODEL).is_err());
        assert!(GeminiClient::new("ftp://example.com", DEFAULT_MODEL).is_err());
        assert!(GeminiClient::new(DEFAULT_BASE_URL, DEFAULT_MODEL).is_ok());
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new("http://localhost:1234/", "gemini-pro").unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(client.model(), "gemini-pro");
    }

    #[tokio::test]
    async fn summarize_forwards_prompt_and_returns_completion() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header(API_KEY_HEADER, "key-123"))
            .and(body_json(json!({
                "contents": [{
                    "parts": [{
                        "text": "Summarize the following text clearly and concisely:\n\nThe quick brown fox jumps over the lazy dog."
                    }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "A fox " }, { "text": "jumps.\n" }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), DEFAULT_MODEL)?;
        let summary = client
            .summarize(
                "The quick brown fox jumps over the lazy dog.",
                &key("key-123"),
            )
            .await?;

        assert_eq!(summary, "A fox jumps.\n");
        Ok(())
    }

    #[tokio::test]
    async fn summarize_without_key_makes_no_request() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), DEFAULT_MODEL)?;
        let result = client.summarize("some text", &key("")).await;

        assert!(matches!(result, Err(SummarizeError::MissingApiKey)));
        Ok(())
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), DEFAULT_MODEL)?;
        let err = client
            .summarize("some text", &key("bad-key"))
            .await
            .unwrap_err();

        match &err {
            SummarizeError::Api { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "API key not valid. Please pass a valid API key.");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        assert!(err
            .to_string()
            .contains("API key not valid. Please pass a valid API key."));
        Ok(())
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_raw() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), DEFAULT_MODEL)?;
        let err = client.summarize("text", &key("k")).await.unwrap_err();

        assert_eq!(err.to_string(), "upstream unavailable (HTTP 503)");
        Ok(())
    }

    #[tokio::test]
    async fn blocked_prompt_reports_reason() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), DEFAULT_MODEL)?;
        let err = client.summarize("text", &key("k")).await.unwrap_err();

        assert!(matches!(err, SummarizeError::Blocked(ref reason) if reason == "SAFETY"));
        Ok(())
    }

    #[tokio::test]
    async fn candidate_without_text_is_an_error() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), DEFAULT_MODEL)?;
        let err = client.summarize("text", &key("k")).await.unwrap_err();

        assert!(matches!(err, SummarizeError::EmptyCompletion(ref reason) if reason == "MAX_TOKENS"));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() -> anyhow::Result<()> {
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr()?.port(),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };
        // The listener is dropped above, so nothing accepts on this port.
        let client = GeminiClient::new(&format!("http://127.0.0.1:{port}"), DEFAULT_MODEL)?;
        let err = client.summarize("text", &key("k")).await.unwrap_err();

        assert!(matches!(err, SummarizeError::Transport(_)));
        Ok(())
    }
}
