//! `Authorization: Bearer <token>` extractor.
//!
//! Only pulls the raw token out of the header. Verification needs the
//! username from the path, so it happens in the service.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::ApiError;

/// Raw bearer token taken from the `Authorization` header.
#[derive(Clone)]
pub struct BearerToken(pub String);

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl BearerToken {
    fn parse(header: &str) -> Option<&str> {
        let (scheme, token) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Err(ApiError::unauthorized("Missing bearer token"));
        };

        let header = header
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

        BearerToken::parse(header)
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(|| ApiError::unauthorized("Authorization header must use the Bearer scheme"))
    }
}
