//! HTTP capability shared by the release resolver, the config cascade and the
//! push notifier.
//!
//! Components take an `Arc<dyn HttpClient>` at construction so tests can hand
//! in a mock and count calls instead of swapping a process-wide client.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::NetworkError;

const USER_AGENT: &str = concat!("resticup/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    async fn get(&self, url: &str) -> Result<Vec<u8>, NetworkError>;

    /// POST `form` as `application/x-www-form-urlencoded`.
    async fn post_form(&self, url: &str, form: Vec<(String, String)>) -> Result<(), NetworkError>;
}

/// Production client backed by reqwest.
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, NetworkError> {
        // Only the connect phase is bounded; a peer that stalls mid-body blocks.
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| NetworkError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { inner })
    }
}

fn transport(url: &str, e: reqwest::Error) -> NetworkError {
    NetworkError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        let response = self.inner.get(url).send().await.map_err(|e| transport(url, e))?;

        if !response.status().is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| transport(url, e))?;
        Ok(body.to_vec())
    }

    async fn post_form(&self, url: &str, form: Vec<(String, String)>) -> Result<(), NetworkError> {
        let response = self
            .inner
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        if !response.status().is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
