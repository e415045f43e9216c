use super::load_session;
use crate::{
    api::AppState,
    session::{Event, Page},
};
use axum::{
    extract::{Extension, Form},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct NavigateForm {
    #[serde(default)]
    page: String,
}

pub async fn navigate(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Form(form): Form<NavigateForm>,
) -> Response {
    let (Some(id), session) = load_session(&state, &headers).await else {
        return Redirect::to("/").into_response();
    };

    if !session.is_logged_in() {
        return Redirect::to("/").into_response();
    }

    let page = match form.page.parse::<Page>() {
        Ok(page) => page,
        Err(err) => {
            debug!("{}", err);
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    if state.sessions().update(&id, Event::Navigate(page)).await.is_none() {
        debug!("session ended before navigation was stored");
    }

    Redirect::to("/").into_response()
}
