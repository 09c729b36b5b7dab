// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Authenticated GraphQL transport for the Warcraft Logs v2 client API.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::error::AppError;
use crate::metrics::Metrics;

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
}

/// Standard GraphQL response envelope, typed over the `data` projection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, deserialize_with = "crate::model::null_as_default")]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: String,
}

/// HTTP client wrapper that POSTs query documents with a bearer token.
#[derive(Clone)]
pub struct GraphqlClient {
    endpoint: String,
    timeout: Duration,
    client: Client,
    metrics: Metrics,
}

impl GraphqlClient {
    pub fn new(client: Client, endpoint: String, timeout: Duration, metrics: Metrics) -> Self {
        Self {
            endpoint,
            timeout,
            client,
            metrics,
        }
    }

    /// Execute `query` and return the decoded response body.
    ///
    /// GraphQL-level `errors` are left in the document for the caller to inspect.
    pub async fn execute(&self, query: &str, token: &str) -> Result<Value, AppError> {
        self.metrics.record_upstream_request();
        let start = Instant::now();

        let result = self.send(query, token).await;

        self.metrics.record_upstream_latency(start.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.record_upstream_failure();
        }

        result
    }

    async fn send(&self, query: &str, token: &str) -> Result<Value, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .json(&GraphqlRequest { query })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("GraphQL request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("failed to read GraphQL response: {e}")))?;

        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AppError::UpstreamDecode(e.to_string()))
    }
}
