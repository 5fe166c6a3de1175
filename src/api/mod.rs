//! Client for the confession-room backend.
//!
//! Every endpoint is a JSON `POST` to `{prefix}{endpoint}`. A non-2xx
//! response is reported with its raw body text and nothing is retried.

mod credentials;
mod types;

use std::time::Duration;

use reqwest::{header::COOKIE, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use credentials::Credentials;
pub use types::*;

pub const CREATE_ROOM: &str = "create-room";
pub const GET_CONFESSION_ROOM: &str = "get-confession-room";
pub const SUBMIT_CONFESSION: &str = "submit-confession";
pub const REVOKE_CONFESSION: &str = "revoke-confession";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// What a visitor gets to read. Transport errors name the backend url, so
    /// only the response text of a failed request is passed through.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::RequestFailed { body, .. } => body.clone(),
            ApiError::Transport(_) => "The backend is unreachable right now.".to_owned(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    prefix: String,
}

impl ApiClient {
    pub fn new(prefix: &str, timeout: Option<Duration>) -> reqwest::Result<ApiClient> {
        let mut builder = reqwest::ClientBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let mut prefix = prefix.to_owned();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        Ok(ApiClient {
            http: builder.build()?,
            prefix,
        })
    }

    async fn call<P, T>(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        parameters: &P,
    ) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.prefix);
        debug!("POST {url}");

        let mut request = self.http.post(&url).json(parameters);
        if let Some(cookie) = &credentials.0 {
            request = request.header(COOKIE, cookie.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!("{endpoint} failed with {status}: {body}");
            return Err(ApiError::RequestFailed { status, body });
        }

        Ok(response.json().await?)
    }

    /// `None` means the backend refused to create the room.
    pub async fn create_room(
        &self,
        credentials: &Credentials,
        parameters: &CreateRoomParameters,
    ) -> Result<Option<String>, ApiError> {
        self.call(credentials, CREATE_ROOM, parameters).await
    }

    pub async fn get_confession_room(
        &self,
        credentials: &Credentials,
        code: &str,
    ) -> Result<Option<ConfessionRoom>, ApiError> {
        let parameters = GetConfessionRoomParameters {
            code: code.to_owned(),
        };
        self.call(credentials, GET_CONFESSION_ROOM, &parameters).await
    }

    pub async fn submit_confession(
        &self,
        credentials: &Credentials,
        code: &str,
        content: &str,
    ) -> Result<Option<SubmitConfessionResponse>, ApiError> {
        let parameters = SubmitConfessionParameters {
            code: code.to_owned(),
            content: content.to_owned(),
            context: serde_json::json!({}).to_string(),
        };
        self.call(credentials, SUBMIT_CONFESSION, &parameters).await
    }

    /// The token alone identifies the confession; the backend owns that mapping.
    pub async fn revoke_confession(
        &self,
        credentials: &Credentials,
        token: &str,
    ) -> Result<bool, ApiError> {
        let parameters = RevokeConfessionParameters {
            token: token.to_owned(),
        };
        self.call(credentials, REVOKE_CONFESSION, &parameters).await
    }
}
