use std::{ops::Deref, sync::Arc};

use auth::{ProfileType, RequestAttributes, UserProfile};
use axum::{body::Body, extract::FromRequestParts};
use http::{Response, StatusCode, request::Parts};

use crate::error::ErrorResponse;

/// Extracts the profile the authentication layer resolved for the request.
///
/// Requests that did not pass the authentication layer are rejected with `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedProfile(pub Arc<UserProfile>);

impl Deref for AuthenticatedProfile {
    type Target = UserProfile;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthenticatedProfile
where
    S: Send + Sync,
{
    type Rejection = Response<Body>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestAttributes>()
            .and_then(|attributes| attributes.profile(ProfileType::User))
            .map(AuthenticatedProfile)
            .ok_or_else(|| {
                ErrorResponse::new("unauthorized").into_response(StatusCode::UNAUTHORIZED)
            })
    }
}
