use http::{HeaderMap, Method, request::Parts};
use url::form_urlencoded;

/// Read access to the incoming request, as seen by identity clients.
pub trait WebContext: Send + Sync {
    /// First value of a query or form parameter.
    fn request_parameter(&self, name: &str) -> Option<&str>;

    /// A header value, if present and valid UTF-8.
    fn request_header(&self, name: &str) -> Option<&str>;

    /// The request method.
    fn request_method(&self) -> &Method;

    /// The request path including its query string.
    fn full_request_url(&self) -> &str;
}

/// [`WebContext`] over the parts of an `http` request.
#[derive(Debug, Clone)]
pub struct HttpWebContext {
    method: Method,
    url: String,
    headers: HeaderMap,
    parameters: Vec<(String, String)>,
}

impl HttpWebContext {
    /// Builds the context from the request head. Query parameters are parsed eagerly.
    pub fn new(parts: &Parts) -> Self {
        let url = parts
            .uri
            .path_and_query()
            .map(|path| path.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let parameters = parts
            .uri
            .query()
            .map(|query| parse_parameters(query.as_bytes()))
            .unwrap_or_default();

        Self {
            method: parts.method.clone(),
            url,
            headers: parts.headers.clone(),
            parameters,
        }
    }

    /// Adds the parameters of an `application/x-www-form-urlencoded` body. Query parameters
    /// keep precedence.
    pub fn with_form(mut self, body: &[u8]) -> Self {
        self.parameters.extend(parse_parameters(body));
        self
    }
}

impl WebContext for HttpWebContext {
    fn request_parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn request_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn request_method(&self) -> &Method {
        &self.method
    }

    fn full_request_url(&self) -> &str {
        &self.url
    }
}

fn parse_parameters(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}
