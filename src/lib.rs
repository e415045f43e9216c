//! # Summarizer
//!
//! `summarizer` serves a single-page form that turns pasted text into a short
//! summary using Google's Gemini models.
//!
//! ## Flow
//!
//! 1. The visitor logs in with an email and password.
//! 2. The visitor stores a Gemini API key for the duration of the session.
//! 3. The visitor pastes text, gets a summary back and can download it as
//!    `summary.txt`.
//!
//! ## Login is a placeholder
//!
//! The login form does **not** authenticate anyone. Any non-empty
//! email/password pair opens a session; the email is only displayed back to
//! the visitor. Nothing is checked against a user store.
//!
//! ## Sessions
//!
//! Each browser gets an opaque session cookie pointing at an in-memory
//! [`session::Session`]. Sessions live only in process memory: a restart or a
//! logout drops the email, the API key and the last summary together.

pub mod api;
pub mod cli;
pub mod gemini;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
