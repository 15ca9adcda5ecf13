//! Support for library configuration options

use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::Error;

/// Where the backend listens when nothing else is configured
pub static DEFAULT_BASE_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost:8000/").unwrap(/* this literal is a valid URL */)
});

/// Environment variable overriding [`Settings::base_url`]
pub const ENV_BASE_URL: &str = "TODO_API_URL";
/// Environment variable setting [`Settings::timeout`], in seconds
pub const ENV_TIMEOUT_SECS: &str = "TODO_API_TIMEOUT_SECS";

const GRAPHQL_PATH: &str = "query";
const LOGIN_PATH: &str = "login/github";
const LOGOUT_PATH: &str = "login/logout";

/// Connection settings shared by the transport and the controllers
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Base of every endpoint. Must end with a `/` so that relative paths are appended to it
    pub base_url: Url,
    /// Path of the GraphQL endpoint, relative to `base_url`
    pub graphql_path: String,
    /// Request timeout. `None` keeps the HTTP stack default (no timeout); requests are never retried
    pub timeout: Option<Duration>,
    /// How many undelivered events a slow bus subscriber may lag behind
    pub bus_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.clone(),
            graphql_path: GRAPHQL_PATH.to_string(),
            timeout: None,
            bus_capacity: 64,
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults for missing variables
    pub fn from_env() -> Result<Self, Error> {
        let mut settings = Self::default();

        if let Ok(raw) = std::env::var(ENV_BASE_URL) {
            settings.base_url = normalize_base(Url::parse(&raw)?);
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => settings.timeout = Some(Duration::from_secs(secs)),
                Err(err) => log::warn!("Ignoring invalid {} value {:?}: {}", ENV_TIMEOUT_SECS, raw, err),
            }
        }

        Ok(settings)
    }

    /// Same settings, pointing at another server
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = normalize_base(base_url);
        self
    }

    pub fn graphql_url(&self) -> Result<Url, Error> {
        self.rest_url(&self.graphql_path)
    }

    /// URL of a REST endpoint, `path` being relative to the base URL
    pub fn rest_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// The page a browser is sent to in order to start the external login flow
    pub fn login_url(&self) -> Result<Url, Error> {
        self.rest_url(LOGIN_PATH)
    }

    pub fn logout_path(&self) -> &'static str {
        LOGOUT_PATH
    }
}

fn normalize_base(mut url: Url) -> Url {
    if url.path().ends_with('/') == false {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn endpoints_are_relative_to_the_base() {
        let settings = Settings::default();
        assert_eq!(settings.graphql_url().unwrap().as_str(), "http://localhost:8000/query");
        assert_eq!(settings.login_url().unwrap().as_str(), "http://localhost:8000/login/github");
        assert_eq!(settings.rest_url("/login/logout").unwrap().as_str(), "http://localhost:8000/login/logout");
    }

    #[test]
    fn base_without_trailing_slash_keeps_its_path() {
        let settings = Settings::default().with_base_url("https://todo.example.com/api".parse().unwrap());
        assert_eq!(settings.graphql_url().unwrap().as_str(), "https://todo.example.com/api/query");
    }
}
