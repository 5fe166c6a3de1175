use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    api::{ApiClient, ApiError, Credentials},
    config::Config,
    forms::{NewRoomErrors, NewRoomForm},
    include_res,
    res::{self, escape, fill},
    AppResult,
};

#[derive(Deserialize)]
pub struct LandingQuery {
    #[serde(default)]
    pub create: bool,
}

#[debug_handler(state = crate::AppState)]
pub async fn index(
    State(config): State<Arc<Config>>,
    Query(LandingQuery { create }): Query<LandingQuery>,
) -> Html<String> {
    let base = config.base();
    if create {
        return Html(creation_page(base, &NewRoomForm::default(), &NewRoomErrors::default(), ""));
    }

    let body = fill(include_res!(str, "/pages/landing.html"), &[("base", base)]);
    Html(res::page(base, "Confession Rooms", &body))
}

#[debug_handler(state = crate::AppState)]
pub async fn create_room(
    State(config): State<Arc<Config>>,
    State(api): State<ApiClient>,
    credentials: Credentials,
    Form(form): Form<NewRoomForm>,
) -> AppResult<Response> {
    let base = config.base();

    let params = match form.validate() {
        Ok(params) => params,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(creation_page(base, &form, &errors, "")),
            )
                .into_response());
        }
    };

    let (status, message) = match api.create_room(&credentials, &params).await {
        Ok(Some(code)) => {
            info!("created room {code}");
            return Ok(Html(created_page(&config, &params.name, &code)).into_response());
        }
        Ok(None) => {
            warn!("backend refused to create room {:?}", params.name);
            (StatusCode::UNPROCESSABLE_ENTITY, "The room could not be created.".to_owned())
        }
        Err(err @ ApiError::RequestFailed { .. }) => (StatusCode::BAD_GATEWAY, err.to_string()),
        Err(err) => return Err(err.into()),
    };

    Ok((
        status,
        Html(creation_page(base, &form, &NewRoomErrors::default(), &message)),
    )
        .into_response())
}

fn creation_page(base: &str, form: &NewRoomForm, errors: &NewRoomErrors, form_error: &str) -> String {
    let body = fill(
        include_res!(str, "/pages/create_room.html"),
        &[
            ("base", base),
            ("name", &escape(&form.name)),
            ("description", &escape(&form.description)),
            ("name_error", errors.name.unwrap_or_default()),
            ("description_error", errors.description.unwrap_or_default()),
            ("form_error", &escape(form_error)),
        ],
    );
    res::page(base, "Create Confession Room", &body)
}

fn created_page(config: &Config, name: &str, code: &str) -> String {
    let base = config.base();
    let link = config.room_link(code);
    let body = fill(
        include_res!(str, "/pages/room_created.html"),
        &[
            ("name", &escape(name)),
            ("link_box", &res::link_box(&link)),
            ("room_path", &escape(&format!("{base}/{code}"))),
        ],
    );
    res::page(base, name, &body)
}
