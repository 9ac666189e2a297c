//! Resilient Request Client
//!
//! Thin wrapper over `reqwest` that retries transient failures with backoff
//! and collapses exhausted retries into "signal unavailable" (`None`).

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;

use super::error::RequestError;
use super::retry::RetryPolicy;

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    /// Result (if success)
    pub result: Option<T>,
    /// Error (if failure)
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ResilientClient {
    http: Client,
    policy: RetryPolicy,
}

impl ResilientClient {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self, RequestError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestError::ClientSetup(e.to_string()))?;

        Ok(Self { http, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent. Never sleeps after the final attempt.
    pub async fn execute_with_retry<F, Fut, T>(&self, label: &str, operation: F) -> Result<T, RequestError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = RequestError::Network("No attempts made".into());

        for attempt in 0..attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() {
                        tracing::debug!("{} failed permanently: {}", label, e);
                        return Err(e);
                    }

                    if attempt + 1 < attempts {
                        let delay = self.policy.delay_for(&e, attempt);
                        if e == RequestError::RateLimited {
                            tracing::warn!(
                                "Rate limited (429) on {}, backing off for {:?} (attempt {}/{})",
                                label,
                                delay,
                                attempt + 1,
                                attempts
                            );
                        } else {
                            tracing::debug!(
                                "{} failed: {}, retrying in {:?} (attempt {}/{})",
                                label,
                                e,
                                delay,
                                attempt + 1,
                                attempts
                            );
                        }
                        tokio::time::sleep(delay).await;
                    }
                    last_error = e;
                }
            }
        }

        Err(RequestError::SourceUnavailable {
            attempts,
            last_error: last_error.to_string(),
        })
    }

    /// POST a JSON-RPC call and return its `result`.
    pub async fn try_rpc_call(&self, url: &str, method: &str, params: Value) -> Result<Value, RequestError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let http = &self.http;
        let body = &body;

        self.execute_with_retry(method, move || async move {
            let response = http.post(url).json(body).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(RequestError::from_status(status.as_u16()));
            }

            let rpc: JsonRpcResponse<Value> = response.json().await?;
            if let Some(err) = rpc.error {
                return Err(RequestError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            Ok(rpc.result.unwrap_or(Value::Null))
        })
        .await
    }

    /// [`Self::try_rpc_call`], with any failure logged and mapped to `None`.
    pub async fn rpc_call(&self, url: &str, method: &str, params: Value) -> Option<Value> {
        match self.try_rpc_call(url, method, params).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("RPC {} unavailable: {}", method, e);
                None
            }
        }
    }

    /// GET a JSON document.
    pub async fn try_get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, RequestError> {
        let http = &self.http;

        self.execute_with_retry(url, move || async move {
            let response = http.get(url).query(query).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(RequestError::from_status(status.as_u16()));
            }
            Ok(response.json::<Value>().await?)
        })
        .await
    }

    /// [`Self::try_get_json`], with any failure logged and mapped to `None`.
    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Option<Value> {
        match self.try_get_json(url, query).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("GET {} unavailable: {}", url, e);
                None
            }
        }
    }
}
