use super::{load_session, render};
use crate::{
    api::{views::View, AppState},
    session::{Event, NoticeLevel, Page},
};
use axum::{
    extract::{Extension, Form},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Deserialize)]
pub struct ApiKeyForm {
    #[serde(default)]
    api_key: String,
}

impl std::fmt::Debug for ApiKeyForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyForm").finish_non_exhaustive()
    }
}

/// Store the credential for this session. It never leaves the process except
/// in the request header of the outbound call.
#[instrument(skip_all)]
pub async fn save(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Form(form): Form<ApiKeyForm>,
) -> Response {
    let (Some(id), session) = load_session(&state, &headers).await else {
        return Redirect::to("/").into_response();
    };

    if !session.is_logged_in() {
        return Redirect::to("/").into_response();
    }

    let sessions = state.sessions();
    if sessions.update(&id, Event::Navigate(Page::ApiKey)).await.is_none() {
        return Redirect::to("/").into_response();
    }
    let Some(transition) = sessions
        .update(&id, Event::SaveApiKey(SecretString::from(form.api_key)))
        .await
    else {
        return Redirect::to("/").into_response();
    };

    let status = match &transition.notice {
        Some(notice) if notice.level == NoticeLevel::Success => {
            debug!("API key saved");
            StatusCode::OK
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };

    render(
        &state,
        status,
        &transition.session,
        &View::sidebar(transition.notice),
    )
}
