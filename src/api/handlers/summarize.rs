use super::render;
use crate::{
    api::{cookie, views::View, AppState},
    session::{Event, Gate, Page},
};
use axum::{
    extract::{Extension, Form},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    #[serde(default)]
    text: String,
}

/// Run one summarization.
///
/// The session is not held while the model answers. Only the outcome event
/// is applied afterwards, so changes saved by other requests in the meantime
/// (a new API key, a navigation) survive.
#[instrument(skip_all)]
pub async fn summarize(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Form(form): Form<SummarizeForm>,
) -> Response {
    let Some(id) = cookie::extract_session_id(&headers) else {
        return Redirect::to("/").into_response();
    };
    let sessions = state.sessions();

    let Some(opened) = sessions.update(&id, Event::Navigate(Page::Summarize)).await else {
        return Redirect::to("/").into_response();
    };

    let api_key = match opened.session.summarize_request(&form.text) {
        Gate::LoginRequired => return Redirect::to("/").into_response(),
        Gate::Blocked(notice) => {
            let view = View {
                main_notice: Some(notice),
                text: form.text,
                ..View::default()
            };
            return render(&state, StatusCode::UNPROCESSABLE_ENTITY, &opened.session, &view);
        }
        Gate::Ready { api_key } => api_key,
    };

    let (status, event, summary) = match state.summarizer().summarize(&form.text, &api_key).await {
        Ok(summary) => {
            info!(summary_len = summary.len(), "summary ready");
            (StatusCode::OK, Event::SummaryReady(summary.clone()), Some(summary))
        }
        Err(err) => {
            warn!("Summarization failed: {}", err);
            (StatusCode::BAD_GATEWAY, Event::SummaryFailed(err.to_string()), None)
        }
    };

    // Logged out while the model was answering.
    let Some(transition) = sessions.update(&id, event).await else {
        return Redirect::to("/").into_response();
    };

    let view = View {
        main_notice: transition.notice,
        text: form.text,
        summary,
        ..View::default()
    };
    render(&state, status, &transition.session, &view)
}
