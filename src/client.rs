//! This module provides a client to connect to the to-do list backend

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Settings;
use crate::error::{Error, GraphQlError};
use crate::operations::Operation;
use crate::session::CookieSource;
use crate::traits::{RestResponse, Transport};

/// A client sending operations to the backend over HTTP
///
/// Session cookies set by the backend are kept in a cookie jar and sent back automatically.
pub struct Client {
    settings: Settings,
    http: reqwest::Client,
    cookies: Arc<Jar>,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new(settings: Settings) -> Result<Self, Error> {
        let cookies = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder().cookie_provider(Arc::clone(&cookies));
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { settings, http, cookies })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Store a cookie for the backend, as if it had been set by a `Set-Cookie` header
    ///
    /// This is how a session obtained elsewhere (e.g. by the browser that went through the login flow) is handed over.
    pub fn add_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.settings.base_url);
    }

    async fn sub_request(&self, operation: &Operation) -> Result<String, Error> {
        let url = self.settings.graphql_url()?;
        log::debug!("Sending {} to {}", operation.name(), url);

        let res = self.http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(operation.to_body()?)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() == false {
            log::warn!("{} failed with status {}", operation.name(), status);
            return Err(transport_error(status));
        }
        Ok(res.text().await?)
    }
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, operation: &Operation) -> Result<Value, Error> {
        let text = self.sub_request(operation).await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|err| Error::Protocol(format!("response to {} is not JSON: {}", operation.name(), err)))?;
        unwrap_envelope(body)
    }

    async fn execute_rest(&self, path: &str, method: Method, body: Option<Value>) -> Result<RestResponse, Error> {
        let url = self.settings.rest_url(path)?;
        log::debug!("Sending {} {}", method, url);

        let mut req = self.http
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;

        let status = res.status();
        let text = res.text().await?;
        if status.is_success() == false {
            return Err(transport_error(status));
        }
        Ok(RestResponse { status: status.as_u16(), body: text })
    }
}

impl CookieSource for Client {
    fn cookie_header(&self) -> Option<String> {
        self.cookies
            .cookies(&self.settings.base_url)
            .and_then(|value| value.to_str().ok().map(|s| s.to_string()))
    }
}

fn transport_error(status: StatusCode) -> Error {
    Error::Transport {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
    }
}

/// Extract `data.result` from a GraphQL response body
///
/// * a non-empty `errors` array is an [`Error::Application`], even when some data came along
/// * a body without a `data.result` key is an [`Error::Protocol`]
/// * an explicit `null` result is returned as is, it means "nothing"
pub fn unwrap_envelope(mut body: Value) -> Result<Value, Error> {
    if let Some(errors) = body.get("errors") {
        if errors.is_null() == false {
            let errors: Vec<GraphQlError> = serde_json::from_value(errors.clone())?;
            if errors.is_empty() == false {
                return Err(Error::Application(errors));
            }
        }
    }

    body.get_mut("data")
        .and_then(|data| data.as_object_mut())
        .and_then(|data| data.remove("result"))
        .ok_or_else(|| Error::Protocol("missing data.result in response".to_string()))
}

/// Run an operation whose result is a single object. `None` when the backend answered `null`
pub async fn fetch<T: DeserializeOwned>(transport: &dyn Transport, operation: &Operation) -> Result<Option<T>, Error> {
    let value = transport.execute(operation).await?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// Run an operation whose result is an array. A `null` result is an empty vector
pub async fn fetch_all<T: DeserializeOwned>(transport: &dyn Transport, operation: &Operation) -> Result<Vec<T>, Error> {
    Ok(fetch::<Vec<T>>(transport, operation).await?.unwrap_or_default())
}
