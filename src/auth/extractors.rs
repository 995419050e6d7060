use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use super::claims::Claims;
use crate::{error::ApiError, state::AppState};

/// Extracts and validates the bearer JWT, returning the user ID.
/// Rejects the request when the header is missing or the token is bad.
pub struct AuthUser(pub Uuid);

/// Like [`AuthUser`] but tolerates an absent Authorization header:
/// `Viewer(None)` is an anonymous request. A header that is present but
/// invalid is still rejected.
pub struct Viewer(pub Option<Uuid>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}

fn decode_user_id(token: &str, state: &AppState) -> Result<Uuid, ApiError> {
    let cfg = &state.config.jwt;
    let mut validation = Validation::default();
    validation.set_audience(std::slice::from_ref(&cfg.audience));
    validation.set_issuer(std::slice::from_ref(&cfg.issuer));
    let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

    let data =
        decode::<Claims>(token, &decoding, &validation).map_err(|_| ApiError::Unauthorized)?;
    Ok(data.claims.sub)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        Ok(AuthUser(decode_user_id(token, state)?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(Viewer(None)),
            Some(token) => Ok(Viewer(Some(decode_user_id(token, state)?))),
        }
    }
}
