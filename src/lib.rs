pub mod api;
pub mod cache;
pub mod config;
pub mod forms;
pub mod index;
pub mod res;
pub mod rooms;
pub mod timeago;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::error;

use api::{ApiClient, ApiError};
use cache::RoomCache;
use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub api: ApiClient,
    pub cache: RoomCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<AppState> {
        Ok(AppState {
            api: ApiClient::new(&config.api_prefix, config.api_timeout)?,
            cache: RoomCache::new(config.cache_stale, config.cache_gc),
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let base = state.config.base().to_owned();

    let mut app = Router::new()
        .route(&format!("{base}/"), get(index::index).post(index::create_room))
        .merge(rooms::router(&base));

    if !base.is_empty() {
        let home = format!("{base}/");
        app = app.route(
            &base,
            get(move || {
                let home = home.clone();
                async move { Redirect::permanent(&home) }
            }),
        );
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0.downcast_ref::<ApiError>() {
            Some(err @ ApiError::RequestFailed { .. }) => {
                res::error_page(StatusCode::BAD_GATEWAY, &err.to_string())
            }
            Some(err @ ApiError::Transport(_)) => {
                error!("{err}");
                res::error_page(StatusCode::BAD_GATEWAY, &err.public_message())
            }
            None => {
                error!("{}\n\n{}", self.0, self.0.backtrace());
                res::error_page(StatusCode::INTERNAL_SERVER_ERROR, &self.0.to_string())
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
