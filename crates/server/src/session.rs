//! Server-side sessions keyed by a cookie.
//!
//! The session holds the string request attributes between requests. Each request gets a
//! [`RequestAttributes`] extension restored from its session; attributes changed by the request
//! are written back once the response is produced.

use std::{
    collections::BTreeMap,
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use auth::{AUTH_ID, RequestAttributes};
use axum::body::Body;
use config::SessionConfig;
use http::{
    HeaderMap, HeaderValue, Request, Response,
    header::{COOKIE, SET_COOKIE},
};
use mini_moka::sync::Cache;
use tower::Layer;

type SessionValues = Arc<BTreeMap<String, String>>;

#[derive(Clone)]
pub(crate) struct SessionLayer(Arc<Sessions>);

struct Sessions {
    cookie_name: String,
    secure: bool,
    values: Cache<String, SessionValues>,
}

impl SessionLayer {
    pub fn new(config: &SessionConfig) -> Self {
        let values = Cache::builder()
            .max_capacity(config.max_size)
            .time_to_idle(config.idle_timeout)
            .build();

        Self(Arc::new(Sessions {
            cookie_name: config.cookie_name.clone(),
            secure: config.secure,
            values,
        }))
    }
}

impl<Service> Layer<Service> for SessionLayer
where
    Service: Send + Clone,
{
    type Service = SessionService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        SessionService {
            next,
            sessions: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct SessionService<Service> {
    next: Service,
    sessions: Arc<Sessions>,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for SessionService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut next = self.next.clone();
        let sessions = self.sessions.clone();

        let (mut parts, body) = req.into_parts();

        Box::pin(async move {
            let session = sessions
                .session_id(&parts.headers)
                .and_then(|id| sessions.values.get(&id).map(|values| (id, values)));

            let attributes = match &session {
                Some((_, values)) => RequestAttributes::from_values(values.as_ref().clone()),
                None => RequestAttributes::default(),
            };

            parts.extensions.insert(attributes.clone());

            let mut response = next.call(Request::from_parts(parts, body)).await?;

            if attributes.is_modified() {
                sessions.commit(session, attributes.values(), response.headers_mut());
            }

            Ok(response)
        })
    }
}

impl Sessions {
    fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| name.trim() == self.cookie_name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Persists the attributes of a finished request.
    ///
    /// An emptied session is dropped together with its cookie. A session whose profile changed
    /// gets a fresh identifier.
    fn commit(
        &self,
        session: Option<(String, SessionValues)>,
        values: BTreeMap<String, String>,
        headers: &mut HeaderMap,
    ) {
        if values.is_empty() {
            if let Some((id, _)) = session {
                log::debug!("Dropping emptied session");
                self.values.invalidate(&id);
                self.append_cookie(headers, None);
            }

            return;
        }

        let id = match session {
            Some((id, previous)) if previous.get(AUTH_ID) == values.get(AUTH_ID) => {
                self.values.insert(id, Arc::new(values));
                return;
            }
            Some((id, _)) => {
                self.values.invalidate(&id);
                uuid::Uuid::new_v4().to_string()
            }
            None => uuid::Uuid::new_v4().to_string(),
        };

        log::debug!("Starting a new session");

        self.values.insert(id.clone(), Arc::new(values));
        self.append_cookie(headers, Some(&id));
    }

    fn append_cookie(&self, headers: &mut HeaderMap, id: Option<&str>) {
        let mut cookie = match id {
            Some(id) => format!("{}={id}; Path=/; HttpOnly; SameSite=Lax", self.cookie_name),
            None => format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.cookie_name),
        };

        if self.secure {
            cookie.push_str("; Secure");
        }

        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(error) => log::error!("Invalid session cookie: {error}"),
        }
    }
}
