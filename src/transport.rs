use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::WebDAVConfig;
use crate::errors::SyncError;

/// Header attached to relayed requests so the proxy can recognize them.
pub const PROXY_DISCOVERY_HEADER: &str = "X-Proxy-Request";

/// A WebDAV request before transport resolution. The `url` is the real
/// target; the transport decides what actually goes on the wire.
pub struct DavRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
    pub basic_auth: Option<(String, String)>,
}

impl DavRequest {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            basic_auth: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some((username.to_string(), password.to_string()));
        self
    }
}

/// Normalized response shape, independent of the underlying channel.
pub struct DavResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl DavResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// True for any 2xx status (which includes 207 Multi-Status).
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> Result<String, SyncError> {
        String::from_utf8(self.body.clone()).map_err(|e| SyncError::Parse {
            details: format!("response body is not valid UTF-8: {}", e),
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        serde_json::from_slice(&self.body).map_err(|e| SyncError::Parse {
            details: format!("response body is not valid JSON: {}", e),
        })
    }
}

/// A channel for executing WebDAV requests. One implementation per
/// environment, selected once per call from the injected configuration.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// The URL that actually goes on the wire for a given target.
    fn effective_url(&self, target: &str) -> String;

    async fn execute(&self, request: DavRequest) -> Result<DavResponse, SyncError>;
}

/// Issues requests straight at the target URL. In a native process the
/// plain HTTP client is not subject to origin restrictions, so this covers
/// both the "native bridge" and "direct fetch" environments.
pub struct DirectTransport {
    client: Client,
}

impl DirectTransport {
    pub fn new(timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for DirectTransport {
    fn effective_url(&self, target: &str) -> String {
        target.to_string()
    }

    async fn execute(&self, request: DavRequest) -> Result<DavResponse, SyncError> {
        send(&self.client, self.effective_url(&request.url), request, &[]).await
    }
}

/// Relays every request through a CORS proxy endpoint: the effective URL is
/// the proxy endpoint with the percent-encoded target appended, and a
/// discovery header marks the request as proxied.
pub struct ProxyTransport {
    client: Client,
    proxy_url: String,
}

impl ProxyTransport {
    pub fn new(proxy_url: String, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, proxy_url })
    }
}

#[async_trait]
impl HttpTransport for ProxyTransport {
    fn effective_url(&self, target: &str) -> String {
        format!("{}{}", self.proxy_url, urlencoding::encode(target))
    }

    async fn execute(&self, request: DavRequest) -> Result<DavResponse, SyncError> {
        let url = self.effective_url(&request.url);
        send(
            &self.client,
            url,
            request,
            &[(PROXY_DISCOVERY_HEADER, "webdav")],
        )
        .await
    }
}

async fn send(
    client: &Client,
    url: String,
    request: DavRequest,
    extra_headers: &[(&'static str, &'static str)],
) -> Result<DavResponse, SyncError> {
    debug!("{} {}", request.method, url);

    let mut builder = client.request(request.method, &url);

    if let Some((username, password)) = &request.basic_auth {
        builder = builder.basic_auth(username, Some(password));
    }

    for (name, value) in &request.headers {
        builder = builder.header(*name, value.as_str());
    }

    for (name, value) in extra_headers {
        builder = builder.header(*name, *value);
    }

    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    Ok(DavResponse::new(status, body))
}

/// Picks the transport for a config: the proxy transport when proxying is
/// enabled and an endpoint is configured, the direct transport otherwise.
pub fn select_transport(config: &WebDAVConfig) -> Result<Arc<dyn HttpTransport>, SyncError> {
    if config.use_proxy {
        if let Some(proxy_url) = config.proxy_url.as_deref().filter(|s| !s.is_empty()) {
            debug!("relaying WebDAV requests through proxy {}", proxy_url);
            return Ok(Arc::new(ProxyTransport::new(
                proxy_url.to_string(),
                config.timeout(),
            )?));
        }
    }

    Ok(Arc::new(DirectTransport::new(config.timeout())?))
}
