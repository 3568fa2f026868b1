//! HTTP transport implementation using reqwest.

use std::time::Duration;

use bytes::Bytes;
use log::{debug, warn};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use super::Transport;
use super::config::HttpConfig;
use crate::error::{Result, TransportError};
use crate::random::{ALPHANUMERIC, LETTERS, random_string_upto};

/// Transport posting wire bytes to a single URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// The reqwest client, carrying the static headers.
    client: reqwest::Client,

    /// Parsed target URL.
    url: Url,

    /// User agent chosen for this transport, if any.
    user_agent: Option<String>,

    /// Whether to append a cache-busting parameter.
    random_param_nocache: bool,

    /// Per-request timeout.
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Build a transport from configuration.
    ///
    /// The user agent is chosen once here and reused for every request.
    pub fn new(config: HttpConfig) -> std::result::Result<Self, TransportError> {
        let url = Url::parse(&config.url).map_err(|e| TransportError::InvalidUrl {
            url: config.url.clone(),
            message: e.to_string(),
        })?;

        let user_agent = config.select_user_agent();

        let mut headers = HeaderMap::new();
        if let Some(ref ua) = user_agent {
            let value = HeaderValue::from_str(ua).map_err(|_| TransportError::InvalidHeader {
                name: USER_AGENT.to_string(),
            })?;
            headers.insert(USER_AGENT, value);
        }
        for (name, value) in config.extra_headers() {
            let invalid = || TransportError::InvalidHeader {
                name: name.to_string(),
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.append(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            url,
            user_agent,
            random_param_nocache: config.random_param_nocache,
            timeout: config.timeout,
        })
    }

    /// The configured target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scheme and authority of the target, e.g. `http://host:8080`.
    pub fn base_url(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// The user agent sent with every request.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// URL for the next request.
    fn request_url(&self) -> String {
        if self.random_param_nocache {
            add_random_url_param(self.url.as_str())
        } else {
            self.url.to_string()
        }
    }

    async fn exchange(&self, url: &str, body: Vec<u8>) -> reqwest::Result<Bytes> {
        let response = self.client.post(url).body(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Target answered with HTTP status {}", status);
        }
        response.bytes().await
    }
}

impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Option<Bytes>> {
        let url = self.request_url();

        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.exchange(&url, body))
                .await
                .map_err(|_| {
                    warn!("Request to {} timed out after {:?}", self.url, timeout);
                    TransportError::Timeout(timeout)
                })?,
            None => self.exchange(&url, body).await,
        };

        let response = result.map_err(|e| {
            warn!("Connection closed unexpectedly: {}", e);
            TransportError::Request(e)
        })?;

        if response.is_empty() {
            return Ok(None);
        }
        Ok(Some(response))
    }
}

/// Append a random throw-away query parameter to a URL.
///
/// The name is 1-4 ASCII letters and the value 1-10 alphanumerics.
pub fn add_random_url_param(url: &str) -> String {
    let param = format!(
        "{}={}",
        random_string_upto(4, LETTERS),
        random_string_upto(10, ALPHANUMERIC)
    );

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{param}")
}
