use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    ENDPOINT_REQUEST_DURATION, ENDPOINT_REQUEST_ERRORS, ENDPOINT_REQUESTS,
};
use crate::types::{ChatRequest, ChatResponse};

/// Base URL used when neither an explicit URL nor the environment provides one.
pub const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:8000/";

/// Environment variable consulted for the base URL.
pub const ENDPOINT_URL_ENV: &str = "RELAY_CHAT_ENDPOINT";

const CHAT_PATH: &str = "chat";

/// Something that can answer a chat request.
///
/// [`HttpEndpoint`] is the production implementation; tests substitute their own.
#[async_trait::async_trait]
pub trait ChatEndpoint: Send + Sync {
    /// Sends one request and waits for its reply.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Chat endpoint reached over HTTP at `{base_url}/chat`.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: ReqwestClient,
    chat_url: Url,
    timeout: Option<Duration>,
}

impl HttpEndpoint {
    /// Create a new endpoint.
    ///
    /// The base URL can be provided directly or read from the RELAY_CHAT_ENDPOINT
    /// environment variable, falling back to [`DEFAULT_ENDPOINT_URL`].  No timeout
    /// is imposed.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new endpoint with an optional transport timeout.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => {
                env::var(ENDPOINT_URL_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT_URL.to_string())
            }
        };
        let chat_url = chat_url(&base_url)?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            chat_url,
            timeout,
        })
    }

    /// The full URL requests are posted to.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Error::api(status_code, body),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.chat_url.clone())
            .headers(Self::default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        self.timeout.map(|t| t.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.bytes().await.map_err(|e| {
            Error::http_client(format!("Failed to read response: {}", e), Some(Box::new(e)))
        })?;
        serde_json::from_slice::<ChatResponse>(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl ChatEndpoint for HttpEndpoint {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        ENDPOINT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send(request).await;
        ENDPOINT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            ENDPOINT_REQUEST_ERRORS.click();
        }
        result
    }
}

/// Resolves the `/chat` URL relative to `base_url`.
///
/// A base without a trailing slash is treated as a directory, so both
/// `http://host/api` and `http://host/api/` post to `http://host/api/chat`.
fn chat_url(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(CHAT_PATH)?)
}
