mod confess;
mod render;
mod revoke;
mod room;

use axum::{routing::{get, post}, Router};

use crate::{
    api::{ApiClient, ApiError, ConfessionRoom, Credentials},
    cache::RoomCache,
    AppState,
};

pub fn router(base: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("{base}/{{code}}"), get(room::room).post(confess::submit))
        .route(&format!("{base}/{{code}}/revoke"), post(revoke::revoke))
}

/// Reads a room through the shared cache.
pub(crate) async fn load_room(
    cache: &RoomCache,
    api: &ApiClient,
    credentials: &Credentials,
    code: &str,
) -> Result<Option<ConfessionRoom>, ApiError> {
    cache
        .fetch_with(code, || api.get_confession_room(credentials, code))
        .await
}
