//! Authentication middleware
//!
//! Bearer tokens are HS256 JWTs issued by the identity provider. A valid
//! token becomes an [`Actor`] in the request extensions; handlers pick it up
//! with [`CurrentActor`] (required) or [`MaybeActor`] (public routes).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::types::{Actor, Role};
use uuid::Uuid;

use crate::{config::JwtConfig, error::AppError, AppState};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Resolve the claims into an actor
    pub fn into_actor(self) -> Result<Actor, AppError> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthenticated("Invalid user ID in token".to_string()))?;
        let role = Role::from_str(&self.role)
            .ok_or_else(|| AppError::Unauthenticated("Invalid role in token".to_string()))?;
        let zone = self.zone.filter(|z| !z.trim().is_empty());

        Ok(Actor::new(id, role, zone))
    }
}

/// Decode and validate a bearer token
pub fn decode_token(token: &str, jwt: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    if let Some(issuer) = &jwt.issuer {
        validation.set_issuer(&[issuer]);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))
}

/// Resolve the bearer token, if any, into an [`Actor`] extension.
///
/// Requests without an Authorization header pass through anonymously; a
/// header that is present but malformed or invalid is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => value.to_str().ok(),
        None => return next.run(request).await,
    };

    let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return AppError::Unauthenticated("Invalid Authorization header".to_string())
                .into_response()
        }
    };

    let actor = match decode_token(token, &state.config.jwt).and_then(Claims::into_actor) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    tracing::debug!(actor_id = %actor.id(), role = actor.role().as_str(), "Authenticated request");
    request.extensions_mut().insert(actor);

    next.run(request).await
}

/// Extractor for the authenticated actor; rejects anonymous requests
#[derive(Clone, Debug)]
pub struct CurrentActor(pub Actor);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(CurrentActor)
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))
    }
}

/// Extractor for routes that also serve anonymous callers
#[derive(Clone, Debug)]
pub struct MaybeActor(pub Option<Actor>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeActor(parts.extensions.get::<Actor>().cloned()))
    }
}
