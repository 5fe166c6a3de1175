use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{info, warn};

use crate::{
    api::{ApiClient, ApiError, Credentials},
    cache::RoomCache,
    config::Config,
    forms::RevokeForm,
    res,
    AppResult,
};

use super::{load_room, render::RoomView};

/// The token is assumed to belong to a confession in this room, so only this
/// room's cache entry is invalidated.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn revoke(
    State(config): State<Arc<Config>>,
    State(api): State<ApiClient>,
    State(cache): State<RoomCache>,
    credentials: Credentials,
    Path(code): Path<String>,
    Form(form): Form<RevokeForm>,
) -> AppResult<Response> {
    let (status, message) = match form.validate() {
        Err(message) => (StatusCode::UNPROCESSABLE_ENTITY, message.to_owned()),
        Ok(token) => match api.revoke_confession(&credentials, token).await {
            Ok(true) => {
                info!("confession revoked in {code}");
                cache.invalidate(&code).await;
                return Ok(Redirect::to(&format!("{}/{code}", config.base())).into_response());
            }
            Ok(false) => {
                warn!("revocation refused in {code}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The confession could not be revoked.".to_owned(),
                )
            }
            Err(err @ ApiError::RequestFailed { .. }) => (StatusCode::BAD_GATEWAY, err.to_string()),
            Err(err) => return Err(err.into()),
        },
    };

    let Some(room) = load_room(&cache, &api, &credentials, &code).await? else {
        return Ok(res::not_found(config.base()));
    };

    let view = RoomView {
        revoke_error: Some((form.token, message)),
        ..RoomView::default()
    };
    Ok((status, Html(view.render(&config, &code, &room))).into_response())
}
