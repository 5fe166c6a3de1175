use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderValue},
};

/// The browser's cookies, passed through to the backend untouched.
#[derive(Debug, Clone, Default)]
pub struct Credentials(pub Option<HeaderValue>);

impl Credentials {
    pub fn none() -> Self {
        Self(None)
    }
}

impl<S> FromRequestParts<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Credentials(parts.headers.get(COOKIE).cloned()))
    }
}
