//! Handler-side auth extractors.
//!
//! The bearer-token middleware stores the resolved `user::Model` in the
//! request extensions. These extractors read it back out: [`AuthUser`]
//! rejects with 401 when no caller was resolved, [`MaybeAuthUser`] never
//! rejects and is used on public endpoints that personalize when a token
//! happens to be present.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use trackdrop_db::entities::user;

#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

fn caller(parts: &Parts) -> Option<user::Model> {
    parts.extensions.get::<user::Model>().cloned()
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller(parts)
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(caller(parts)))
    }
}
