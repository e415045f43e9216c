use super::{load_session, render};
use crate::api::{views::View, AppState};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;

pub async fn index(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    let (_, session) = load_session(&state, &headers).await;
    render(&state, StatusCode::OK, &session, &View::default())
}
