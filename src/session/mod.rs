//! Per-browser session context and the transitions user actions drive.
//!
//! Handlers never mutate a [`Session`] directly. They hand an [`Event`] to
//! [`SessionStore::update`], which runs [`Session::apply`] under the store
//! lock. The only side effect, the Gemini call, happens between
//! [`Session::summarize_request`] and the `Summary*` events.

mod store;

pub use store::{SessionStore, DEFAULT_SESSION_TTL};

use secrecy::{ExposeSecret, SecretString};
use std::str::FromStr;
use thiserror::Error;

pub const LOGIN_FIELDS_REQUIRED: &str = "Please enter both email and password.";
pub const API_KEY_SAVED: &str = "API Key saved successfully!";
pub const API_KEY_INVALID: &str = "Please enter a valid API Key.";
pub const API_KEY_MISSING: &str = "Please enter your Gemini API Key in API Key Management.";
pub const TEXT_MISSING: &str = "Please enter some text to summarize.";

/// The two screens behind the navigation selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    ApiKey,
    Summarize,
}

impl Page {
    pub const ALL: [Self; 2] = [Self::ApiKey, Self::Summarize];

    /// Value used in forms and query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api-key",
            Self::Summarize => "summarize",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ApiKey => "API Key Management",
            Self::Summarize => "Text Summarization",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown page: {0}")]
pub struct UnknownPage(String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|page| page.as_str() == value)
            .ok_or_else(|| UnknownPage(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Inline message shown next to the form that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// State held for one browser between requests.
///
/// A default session is anonymous: no email, no API key, no summary.
#[derive(Clone, Debug, Default)]
pub struct Session {
    user_email: Option<String>,
    api_key: SecretString,
    page: Page,
    summary: Option<String>,
}

/// A user action, already decoded from its form.
#[derive(Debug)]
pub enum Event {
    /// Placeholder login: the password is checked for presence only.
    Login {
        email: String,
        password: SecretString,
    },
    Logout,
    Navigate(Page),
    SaveApiKey(SecretString),
    SummaryReady(String),
    SummaryFailed(String),
}

/// Result of [`Session::apply`].
#[derive(Debug)]
pub struct Transition {
    pub session: Session,
    pub notice: Option<Notice>,
}

impl Transition {
    fn quiet(session: Session) -> Self {
        Self {
            session,
            notice: None,
        }
    }

    fn notify(session: Session, notice: Notice) -> Self {
        Self {
            session,
            notice: Some(notice),
        }
    }
}

/// Whether a summarize action may reach the network.
#[derive(Debug)]
pub enum Gate {
    LoginRequired,
    Blocked(Notice),
    Ready { api_key: SecretString },
}

impl Session {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user_email.is_some()
    }

    #[must_use]
    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }

    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    /// Last completion returned by the model, if the last attempt succeeded.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Compute the session that follows `event`.
    ///
    /// Everything except `Login` and `Logout` is ignored for anonymous
    /// sessions.
    #[must_use]
    pub fn apply(self, event: Event) -> Transition {
        match event {
            Event::Login { email, password } => self.login(email, &password),
            Event::Logout => Transition::quiet(Self::default()),
            _ if !self.is_logged_in() => Transition::quiet(self),
            Event::Navigate(page) => Transition::quiet(Self { page, ..self }),
            Event::SaveApiKey(key) => self.save_api_key(&key),
            Event::SummaryReady(summary) => Transition::quiet(Self {
                summary: Some(summary),
                ..self
            }),
            Event::SummaryFailed(message) => Transition::notify(
                Self {
                    summary: None,
                    ..self
                },
                Notice::error(format!("Summarization failed: {message}")),
            ),
        }
    }

    /// Check the preconditions of the outbound call for `text`.
    ///
    /// The text itself is forwarded untrimmed; only its emptiness is judged
    /// on the trimmed value.
    #[must_use]
    pub fn summarize_request(&self, text: &str) -> Gate {
        if !self.is_logged_in() {
            return Gate::LoginRequired;
        }
        if !self.has_api_key() {
            return Gate::Blocked(Notice::warning(API_KEY_MISSING));
        }
        if text.trim().is_empty() {
            return Gate::Blocked(Notice::warning(TEXT_MISSING));
        }
        Gate::Ready {
            api_key: self.api_key.clone(),
        }
    }

    fn login(self, email: String, password: &SecretString) -> Transition {
        if self.is_logged_in() {
            return Transition::quiet(self);
        }
        if email.is_empty() || password.expose_secret().is_empty() {
            return Transition::notify(self, Notice::error(LOGIN_FIELDS_REQUIRED));
        }
        Transition::quiet(Self {
            user_email: Some(email),
            ..self
        })
    }

    fn save_api_key(self, key: &SecretString) -> Transition {
        let trimmed = key.expose_secret().trim();
        if trimmed.is_empty() {
            return Transition::notify(self, Notice::error(API_KEY_INVALID));
        }
        let api_key = SecretString::from(trimmed.to_string());
        Transition::notify(Self { api_key, ..self }, Notice::success(API_KEY_SAVED))
    }
}
