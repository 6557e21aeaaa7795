//! HTTP chain client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_program::{RollupProof, RollupState};

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ClientError, ClientResult};
use crate::retry::with_retry;
use crate::source::{ActionSource, RollupSubmitter, StateReader};
use crate::types::{
    FetchActionsRequest, FetchActionsResponse, StateResponse, SubmitRollupRequest,
    SubmitRollupResponse,
};

/// HTTP client for a chain API exposing rollup contracts
#[derive(Debug, Clone)]
pub struct HttpChainClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpChainClient {
    pub fn try_new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, address: &str, path: &str) -> String {
        format!("{}/api/v1/rollup/{}/{}", self.base_url, address, path)
    }

    async fn fetch_state_once(&self, address: &str) -> ClientResult<RollupState> {
        let response = self.client.get(self.url(address, "state")).send().await?;
        let state: StateResponse = read_json(response, address).await?;
        Ok(state.into())
    }

    async fn fetch_actions_once<A: Action>(
        &self,
        address: &str,
        request: &FetchActionsRequest,
    ) -> ClientResult<Vec<Vec<A>>> {
        let response = self
            .client
            .post(self.url(address, "actions/query"))
            .json(request)
            .send()
            .await?;
        let actions: FetchActionsResponse<A> = read_json(response, address).await?;
        actions.into_checked()
    }

    async fn submit_once(
        &self,
        address: &str,
        request: &SubmitRollupRequest,
    ) -> ClientResult<SubmitRollupResponse> {
        let response = self
            .client
            .post(self.url(address, "proofs"))
            .json(request)
            .send()
            .await?;
        read_json(response, address).await
    }
}

/// Map a non-success status to an error
pub(crate) fn status_error(status: u16, body: String, context: &str) -> ClientError {
    match status {
        404 => ClientError::NotFound(context.to_string()),
        401 | 403 => ClientError::Unauthorized(body),
        409 => ClientError::StaleSubmission(body),
        _ => ClientError::ApiError {
            status,
            message: body,
        },
    }
}

/// Decode a success body
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ClientResult<T> {
    Ok(serde_json::from_slice(body)?)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, context: &str) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        let body = response.bytes().await?;
        decode_body(&body)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), body, context))
    }
}

#[async_trait]
impl StateReader for HttpChainClient {
    async fn fetch_state(&self, address: &str) -> ClientResult<RollupState> {
        with_retry(&self.retry, "fetch_state", move || self.fetch_state_once(address)).await
    }
}

#[async_trait]
impl<A: Action> ActionSource<A> for HttpChainClient {
    async fn fetch_actions(
        &self,
        address: &str,
        from: &ActionState,
        to: Option<&ActionState>,
    ) -> ClientResult<Vec<Vec<A>>> {
        let request = FetchActionsRequest {
            from: *from,
            to: to.copied(),
        };
        let request = &request;
        let batches = with_retry(&self.retry, "fetch_actions", move || {
            self.fetch_actions_once::<A>(address, request)
        })
        .await?;
        debug!(address, batches = batches.len(), "fetched actions");
        Ok(batches)
    }
}

#[async_trait]
impl RollupSubmitter for HttpChainClient {
    async fn submit_rollup(&self, address: &str, proof: &RollupProof) -> ClientResult<RollupState> {
        let request = SubmitRollupRequest::from_proof(proof)?;
        let request = &request;
        let response = with_retry(&self.retry, "submit_rollup", move || {
            self.submit_once(address, request)
        })
        .await?;
        debug!(address, tx_hash = ?response.tx_hash, "submitted rollup");
        Ok(response.into())
    }
}
