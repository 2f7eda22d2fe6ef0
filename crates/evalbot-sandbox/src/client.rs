use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use evalbot_core::config::SandboxConfig;

use crate::error::SandboxError;
use crate::types::ExecutionResult;

/// An execution service that runs code and reports its output.
#[async_trait]
pub trait Sandbox: Send + Sync {
    fn name(&self) -> &str;

    /// Run `code` and return its stdout and return code.
    async fn eval(&self, code: &str) -> Result<ExecutionResult, SandboxError>;
}

#[derive(Serialize)]
struct EvalRequest<'a> {
    input: &'a str,
}

/// HTTP client for a snekbox instance.
pub struct SnekboxClient {
    client: reqwest::Client,
    eval_url: String,
}

impl SnekboxClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SandboxError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            eval_url: format!("{}/eval", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &SandboxConfig) -> Result<Self, SandboxError> {
        Self::new(
            &config.url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn eval_url(&self) -> &str {
        &self.eval_url
    }
}

#[async_trait]
impl Sandbox for SnekboxClient {
    fn name(&self) -> &str {
        "snekbox"
    }

    async fn eval(&self, code: &str) -> Result<ExecutionResult, SandboxError> {
        debug!(url = %self.eval_url, bytes = code.len(), "posting code to snekbox");

        let resp = self
            .client
            .post(&self.eval_url)
            .json(&EvalRequest { input: code })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    SandboxError::Unavailable(e.to_string())
                } else {
                    SandboxError::Http(e)
                }
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "snekbox API error");
            return Err(SandboxError::Status { status, body });
        }

        resp.json::<ExecutionResult>()
            .await
            .map_err(|e| SandboxError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_url_appends_endpoint_once() {
        let client = SnekboxClient::new("http://localhost:8060/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.eval_url(), "http://localhost:8060/eval");
    }

    #[test]
    fn from_config_uses_configured_url() {
        let config = SandboxConfig {
            url: "http://snekbox:8060".to_string(),
            request_timeout_secs: 10,
        };
        let client = SnekboxClient::from_config(&config).unwrap();
        assert_eq!(client.eval_url(), "http://snekbox:8060/eval");
        assert_eq!(client.name(), "snekbox");
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        // Port 9 (discard) is closed on test machines.
        let client = SnekboxClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.eval("print(1)").await.unwrap_err();
        assert!(matches!(err, SandboxError::Unavailable(_)), "got {err:?}");
    }
}
