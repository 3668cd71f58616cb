use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// Identity of the user performing a mutating request, taken from the
/// `X-Actor-Id` header. Absent header means an anonymous actor; a present but
/// malformed header is rejected.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Actor(None));
        };
        let raw = value.to_str().map_err(|_| {
            ServiceError::ValidationError("X-Actor-Id header must be valid UTF-8".to_string())
        })?;
        let id = Uuid::parse_str(raw).map_err(|_| {
            ServiceError::ValidationError("X-Actor-Id header must be a UUID".to_string())
        })?;
        Ok(Actor(Some(id)))
    }
}
