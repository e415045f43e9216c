//! Placeholder login and logout.
//!
//! Login only checks that both fields are present. It does not verify the
//! password against anything.

use super::{load_session, render};
use crate::{
    api::{cookie, views::View, AppState},
    session::{Event, Session},
};
use axum::{
    extract::{Extension, Form},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

// password is left out on purpose
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[instrument(skip_all)]
pub async fn login(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let (_, session) = load_session(&state, &headers).await;

    if session.is_logged_in() {
        return Redirect::to("/").into_response();
    }

    let transition = Session::default().apply(Event::Login {
        email: form.email,
        password: SecretString::from(form.password),
    });

    if !transition.session.is_logged_in() {
        return render(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            &transition.session,
            &View::sidebar(transition.notice),
        );
    }

    let id = state.sessions().create(transition.session).await;

    match cookie::session_cookie(
        id,
        state.config().secure_cookie(),
        state.sessions().ttl(),
    ) {
        Ok(value) => {
            info!("session opened");
            ([(SET_COOKIE, value)], Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!("Failed to build session cookie: {}", err);
            state.sessions().remove(&id).await;
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    if let Some(id) = cookie::extract_session_id(&headers) {
        if state.sessions().remove(&id).await.is_some() {
            info!("session closed");
        }
    }

    match cookie::clear_session_cookie(state.config().secure_cookie()) {
        Ok(value) => ([(SET_COOKIE, value)], Redirect::to("/")).into_response(),
        Err(err) => {
            error!("Failed to build session cookie: {}", err);
            Redirect::to("/").into_response()
        }
    }
}
