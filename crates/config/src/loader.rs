use std::{collections::BTreeSet, fmt::Write, path::Path, str::FromStr};

use anyhow::bail;
use indoc::indoc;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::Config;

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref().to_path_buf();
    let content = std::fs::read_to_string(&path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;

    for warning in validate(&config)? {
        log::warn!("{warning}");
    }

    Ok(config)
}

/// Rejects configurations the server cannot start with and returns warnings for the
/// suspicious ones.
pub(crate) fn validate(config: &Config) -> anyhow::Result<Vec<String>> {
    let mut warnings = Vec::new();

    if !config.server.health.path.starts_with('/') {
        bail!("Health path '{}' must start with '/'", config.server.health.path);
    }

    let auth = &config.auth;

    if !auth.enabled {
        if !auth.clients.is_empty() {
            warnings.push("Authentication clients are configured but [auth] is not enabled".to_string());
        }

        return Ok(warnings);
    }

    if auth.clients.is_empty() {
        bail!(indoc! {r#"
            Authentication is enabled but no clients are configured. Define at least one client, for example:

              [[auth.clients]]
              type = "parameter"
              parameter_name = "token"

              [[auth.tokens]]
              token = "{{ env.API_TOKEN }}"
              id = "service-account"
        "#});
    }

    let mut seen = BTreeSet::new();

    for client in &auth.clients {
        if !seen.insert(client.simple_name()) {
            bail!("Client {} is configured more than once", client.simple_name());
        }
    }

    for (name, path) in [
        ("login_path", &auth.login_path),
        ("callback_path", &auth.callback_path),
        ("logout_path", &auth.logout_path),
    ] {
        if !path.starts_with('/') {
            bail!("auth.{name} '{path}' must start with '/'");
        }
    }

    for (name, path) in [("login_path", &auth.login_path), ("callback_path", &auth.callback_path)] {
        if auth.logout_path == *path {
            bail!("auth.logout_path '{path}' must differ from auth.{name}");
        }
    }

    let health = &config.server.health;

    if health.enabled && health.listen.is_none() {
        for (name, path) in [
            ("login_path", &auth.login_path),
            ("callback_path", &auth.callback_path),
            ("logout_path", &auth.logout_path),
        ] {
            if health.path == path.as_str() {
                bail!("Health path '{path}' must differ from auth.{name}");
            }
        }
    }

    if auth.client_name_parameter.is_empty() {
        bail!("auth.client_name_parameter must not be empty");
    }

    let mut usernames = BTreeSet::new();

    for user in &auth.users {
        if !usernames.insert(user.username.as_str()) {
            bail!("User '{}' is configured more than once", user.username);
        }
    }

    let uses_passwords = auth.clients.iter().any(|client| client.uses_passwords());
    let uses_tokens = auth.clients.iter().any(|client| !client.uses_passwords());

    if uses_passwords && auth.users.is_empty() {
        warnings.push("Username/password clients are configured but no [[auth.users]] are defined".to_string());
    }

    if uses_tokens && auth.tokens.is_empty() {
        warnings.push("Token clients are configured but no [[auth.tokens]] are defined".to_string());
    }

    Ok(warnings)
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();

                for segment in path.iter() {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => write!(p, "[{i}]")?,
                    }
                }

                if p.ends_with('.') {
                    p.pop();
                }

                bail!("Failed to expand dynamic string at path '{p}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
