use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

pub mod auth;
pub mod chatbot;
pub mod common_types;
pub mod live;
pub mod live_feed;
pub mod storage;
pub mod weather;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(
        "Server responded with status {status}: {}",
        .message.as_deref().unwrap_or("no details")
    )]
    Status { status: u16, message: Option<String> },
    #[error("Backend url `{0}` cannot hold an endpoint path")]
    Endpoint(Url),
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Message the backend attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Shared HTTP plumbing of the backend REST APIs.
#[derive(Clone, Debug)]
pub struct Backend {
    client: Client,
    base: Url,
}

impl Backend {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|_| ApiError::Endpoint(self.base.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    pub fn get(&self, url: Url, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.get(url), token)
    }

    pub fn post(&self, url: Url, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.post(url), token)
    }

    /// Sends `request`, mapping non-success statuses to [`ApiError::Status`].
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.or(body.message));

            log::warn!("Backend responded with {status}: {message:?}");

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
