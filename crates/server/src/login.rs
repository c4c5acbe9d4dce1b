//! Login form, form callback and logout endpoints.

use std::sync::Arc;

use auth::{AUTH_ID, ClientKind, FormClient, ProfileStore, RequestAttributes};
use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{Html, Redirect},
};
use config::{AuthConfig, ClientConfig};
use serde::Deserialize;
use url::form_urlencoded;

pub(crate) struct LoginState {
    callback_action: String,
    username_parameter: String,
    password_parameter: String,
    store: Arc<dyn ProfileStore>,
}

impl LoginState {
    pub fn new(config: &AuthConfig, store: Arc<dyn ProfileStore>) -> Self {
        let (username_parameter, password_parameter) = config
            .clients
            .iter()
            .find_map(|client| match client {
                ClientConfig::Form(form) => Some((form.username_parameter.clone(), form.password_parameter.clone())),
                _ => None,
            })
            .unwrap_or_else(|| ("username".to_string(), "password".to_string()));

        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair(&config.client_name_parameter, ClientKind::Form.simple_name())
            .finish();

        Self {
            callback_action: format!("{}?{query}", config.callback_path),
            username_parameter,
            password_parameter,
            store,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginQuery {
    redirect: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RedirectForm {
    redirect: Option<String>,
}

/// Renders the login form posting to the form client's callback.
pub(crate) async fn login_page(State(state): State<Arc<LoginState>>, Query(query): Query<LoginQuery>) -> Html<String> {
    let message = match query.error.as_deref() {
        Some("invalid_credentials") => "<p class=\"error\">Invalid username or password.</p>\n",
        Some("missing_credentials") => "<p class=\"error\">Please enter a username and a password.</p>\n",
        _ => "",
    };

    let redirect = safe_redirect(query.redirect.as_deref());

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign in</title></head>
<body>
<h1>Sign in</h1>
{message}<form method="post" action="{action}">
<input type="hidden" name="{redirect_parameter}" value="{redirect}">
<label>Username <input type="text" name="{username}" autocomplete="username"></label>
<label>Password <input type="password" name="{password}" autocomplete="current-password"></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#,
        action = escape_html(&state.callback_action),
        redirect_parameter = FormClient::REDIRECT_PARAMETER,
        redirect = escape_html(redirect),
        username = escape_html(&state.username_parameter),
        password = escape_html(&state.password_parameter),
    ))
}

/// Reached once the form client authenticated the posted credentials.
pub(crate) async fn callback(Form(form): Form<RedirectForm>) -> Redirect {
    Redirect::to(safe_redirect(form.redirect.as_deref()))
}

/// Unbinds the profile from the session and forgets it.
pub(crate) async fn logout(
    State(state): State<Arc<LoginState>>,
    attributes: Option<Extension<RequestAttributes>>,
    Query(query): Query<LoginQuery>,
) -> Redirect {
    if let Some(Extension(attributes)) = attributes
        && let Some(id) = attributes.remove(AUTH_ID)
    {
        log::debug!("Logging out profile '{id}'");

        if let Err(error) = state.store.remove(&id).await {
            log::error!("Failed to remove profile on logout: {error}");
        }
    }

    Redirect::to(safe_redirect(query.redirect.as_deref()))
}

/// Only local absolute paths are followed after login and logout.
fn safe_redirect(target: Option<&str>) -> &str {
    match target {
        Some(target) if target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') => target,
        _ => "/",
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_stay_local() {
        assert_eq!(safe_redirect(Some("/private?x=1")), "/private?x=1");
        assert_eq!(safe_redirect(Some("//evil.example")), "/");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/");
        assert_eq!(safe_redirect(Some("/\\evil.example")), "/");
        assert_eq!(safe_redirect(None), "/");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"/a?b="c"&d=<e>"#), "/a?b=&quot;c&quot;&amp;d=&lt;e&gt;");
    }

    #[tokio::test]
    async fn login_page_posts_to_the_form_callback() {
        let state = Arc::new(LoginState::new(
            &AuthConfig::default(),
            Arc::new(auth::InMemoryProfileStore::default()),
        ));

        let Html(page) = login_page(
            State(state),
            Query(LoginQuery {
                redirect: Some("/private?x=1".to_string()),
                error: Some("invalid_credentials".to_string()),
            }),
        )
        .await;

        assert!(page.contains(r#"action="/callback?client_name=FormClient""#));
        assert!(page.contains(r#"name="redirect" value="/private?x=1""#));
        assert!(page.contains("Invalid username or password."));
    }

    #[tokio::test]
    async fn logout_forgets_the_profile() {
        let store = Arc::new(auth::InMemoryProfileStore::default());
        store
            .set(Arc::new(auth::UserProfile::new("123", auth::ProfileType::Http)))
            .await
            .unwrap();

        let state = Arc::new(LoginState::new(&AuthConfig::default(), store.clone()));
        let attributes = RequestAttributes::from_values([(AUTH_ID.to_string(), "123".to_string())]);

        logout(
            State(state),
            Some(Extension(attributes.clone())),
            Query(LoginQuery::default()),
        )
        .await;

        assert_eq!(attributes.get(AUTH_ID), None);
        assert!(store.get("123").await.unwrap().is_none());
    }
}
