pub mod api_key;
pub mod auth;
pub mod download;
pub mod health;
pub mod navigate;
pub mod root;
pub mod summarize;

// common functions for the handlers
use super::{cookie, views, AppState};
use crate::session::Session;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::debug;
use ulid::Ulid;

/// Live session for the request, or an anonymous one when the cookie is
/// missing or points at a removed session.
pub(crate) async fn load_session(state: &AppState, headers: &HeaderMap) -> (Option<Ulid>, Session) {
    let Some(id) = cookie::extract_session_id(headers) else {
        return (None, Session::default());
    };

    match state.sessions().get(&id).await {
        Some(session) => (Some(id), session),
        None => {
            debug!("unknown session id in cookie");
            (None, Session::default())
        }
    }
}

pub(crate) fn render(
    state: &AppState,
    status: StatusCode,
    session: &Session,
    view: &views::View,
) -> Response {
    (status, Html(views::render(state.config(), session, view))).into_response()
}
