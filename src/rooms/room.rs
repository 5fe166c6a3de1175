use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};

use crate::{api::{ApiClient, Credentials}, cache::RoomCache, config::Config, res, AppResult};

use super::{load_room, render::RoomView};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room(
    State(config): State<Arc<Config>>,
    State(api): State<ApiClient>,
    State(cache): State<RoomCache>,
    credentials: Credentials,
    Path(code): Path<String>,
) -> AppResult<Response> {
    let Some(room) = load_room(&cache, &api, &credentials, &code).await? else {
        return Ok(res::not_found(config.base()));
    };

    Ok(Html(RoomView::default().render(&config, &code, &room)).into_response())
}
