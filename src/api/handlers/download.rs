use super::load_session;
use crate::api::AppState;
use axum::{
    extract::Extension,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// The last summary as a `summary.txt` attachment, unmodified.
pub async fn summary_txt(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    let (_, session) = load_session(&state, &headers).await;

    match session.summary() {
        Some(summary) if session.is_logged_in() => (
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8"),
                (CONTENT_DISPOSITION, "attachment; filename=\"summary.txt\""),
            ],
            summary.to_string(),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "No summary available").into_response(),
    }
}
