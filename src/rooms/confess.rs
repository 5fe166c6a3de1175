use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::{error, info, warn};

use crate::{
    api::{ApiClient, ApiError, Credentials},
    cache::RoomCache,
    config::Config,
    forms::ConfessionForm,
    res,
    AppResult,
};

use super::{
    load_room,
    render::{submitted_page, RoomView},
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn submit(
    State(config): State<Arc<Config>>,
    State(api): State<ApiClient>,
    State(cache): State<RoomCache>,
    credentials: Credentials,
    Path(code): Path<String>,
    Form(form): Form<ConfessionForm>,
) -> AppResult<Response> {
    let outcome = match form.validate() {
        Err(message) => Err((StatusCode::UNPROCESSABLE_ENTITY, message)),
        Ok(content) => match api.submit_confession(&credentials, &code, content).await {
            Ok(Some(receipt)) => {
                info!("confession {} submitted to {code}", receipt.id);
                cache.invalidate(&code).await;
                Ok(receipt.token)
            }
            Ok(None) => {
                warn!("backend refused a confession for {code}");
                Err((
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Your confession was not accepted.".to_owned(),
                ))
            }
            Err(err @ ApiError::RequestFailed { .. }) => {
                Err((StatusCode::BAD_GATEWAY, err.to_string()))
            }
            Err(err) => return Err(err.into()),
        },
    };

    let loaded = load_room(&cache, &api, &credentials, &code).await;
    let room = match (loaded, &outcome) {
        (Ok(Some(room)), _) => room,
        (Ok(None), Err(_)) => return Ok(res::not_found(config.base())),
        (Err(err), Err(_)) => return Err(err.into()),
        // Stored already, so the token is all that can still be shown.
        (loaded, Ok(token)) => {
            let message = match loaded {
                Err(err) => {
                    error!("reloading {code} after a confession: {err}");
                    err.public_message()
                }
                Ok(_) => "The room no longer exists.".to_owned(),
            };
            return Ok(no_store(Html(submitted_page(&config, &code, token, &message))));
        }
    };

    let (status, view) = match outcome {
        Ok(token) => (
            StatusCode::OK,
            RoomView {
                token: Some(token),
                ..RoomView::default()
            },
        ),
        Err((status, message)) => (
            status,
            RoomView {
                draft: form.content,
                confession_error: message,
                ..RoomView::default()
            },
        ),
    };

    Ok(no_store((status, Html(view.render(&config, &code, &room)))))
}

// The token must not come back from a history cache.
fn no_store(page: impl IntoResponse) -> Response {
    let mut response = page.into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
