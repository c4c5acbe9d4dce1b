use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use auth::{AuthError, AuthFilter, HttpAction, HttpWebContext, RequestAttributes};
use axum::body::Body;
use http::{
    HeaderMap, HeaderValue, Request, Response, StatusCode,
    header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, WWW_AUTHENTICATE},
    request::Parts,
};
use tower::Layer;

use crate::error::ErrorResponse;

/// Largest form body buffered for the identity clients.
const FORM_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub(crate) struct AuthLayer(Arc<AuthFilter>);

impl AuthLayer {
    pub fn new(filter: AuthFilter) -> Self {
        Self(Arc::new(filter))
    }
}

impl<Service> Layer<Service> for AuthLayer
where
    Service: Send + Clone,
{
    type Service = AuthService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        AuthService {
            next,
            filter: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AuthService<Service> {
    next: Service,
    filter: Arc<AuthFilter>,
}

impl<Service> tower::Service<Request<Body>> for AuthService<Service>
where
    Service: tower::Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut next = self.next.clone();
        let filter = self.filter.clone();

        let (mut parts, body) = req.into_parts();

        Box::pin(async move {
            let (context, body) = match web_context(&parts, body).await {
                Ok(context) => context,
                Err(response) => return Ok(response),
            };

            let attributes = parts
                .extensions
                .get::<RequestAttributes>()
                .cloned()
                .unwrap_or_default();

            match filter.handle(&context, &attributes).await {
                Ok(profile) => {
                    log::debug!("Request authenticated as '{}'", profile.id());

                    parts.extensions.insert(attributes);
                    next.call(Request::from_parts(parts, body)).await
                }
                Err(error) => Ok(error_response(&error)),
            }
        })
    }
}

/// Builds the client view of the request, buffering url-encoded form bodies so that both the
/// clients and the handler can read them.
async fn web_context(parts: &Parts, body: Body) -> Result<(HttpWebContext, Body), Response<Body>> {
    let context = HttpWebContext::new(parts);

    if !is_form(&parts.headers) {
        return Ok((context, body));
    }

    let too_large = || {
        ErrorResponse::with_description("payload_too_large", "Form body exceeds 64 KiB")
            .into_response(StatusCode::PAYLOAD_TOO_LARGE)
    };

    let declared_length = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if declared_length.is_some_and(|length| length > FORM_BODY_LIMIT) {
        return Err(too_large());
    }

    match axum::body::to_bytes(body, FORM_BODY_LIMIT).await {
        Ok(bytes) => Ok((context.with_form(&bytes), Body::from(bytes))),
        Err(error) => {
            log::debug!("Failed to buffer form body: {error}");
            Err(too_large())
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

fn error_response(error: &AuthError) -> Response<Body> {
    match error {
        AuthError::Challenge(action) => challenge_response(action),
        AuthError::NoClient(_) => {
            ErrorResponse::with_description("unauthorized", error.to_string()).into_response(StatusCode::UNAUTHORIZED)
        }
        AuthError::NoProfile(_) => ErrorResponse::with_description("invalid_credentials", "Credentials were not accepted")
            .into_response(StatusCode::UNAUTHORIZED),
        AuthError::Technical(_) | AuthError::Store(_) => {
            log::error!("Authentication failed: {error}");

            ErrorResponse::with_description("internal_server_error", "An internal error occurred")
                .into_response(error.status())
        }
    }
}

fn challenge_response(action: &HttpAction) -> Response<Body> {
    let status = action.status();

    let error = match status {
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        status if status.is_redirection() => "login_required",
        _ => "authentication_required",
    };

    let mut response = ErrorResponse::with_description(error, action.message()).into_response(status);
    let headers = response.headers_mut();

    // Use HeaderValue for proper validation and to prevent header injection
    if let Some(location) = action.location() {
        match HeaderValue::from_str(location) {
            Ok(value) => {
                headers.insert(LOCATION, value);
            }
            Err(_) => log::warn!("Dropping invalid challenge location"),
        }
    }

    if let Some(challenge) = action.www_authenticate() {
        let value = HeaderValue::from_str(challenge).unwrap_or_else(|_| HeaderValue::from_static("Bearer"));
        headers.insert(WWW_AUTHENTICATE, value);
    }

    response
}
