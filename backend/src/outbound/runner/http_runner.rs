//! Reqwest-backed pipeline runner adapter.
//!
//! Owns transport details only: JSON serialisation of the update command,
//! request timeout, and HTTP error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::ReleaseId;
use crate::domain::ports::{PipelineRunner, RunnerError};

const UPDATE_ACTION: &str = "UPDATE";

#[derive(Debug, Serialize)]
struct UpdateCommand {
    release_id: i64,
    action: &'static str,
}

/// Runner adapter that POSTs update commands to one endpoint.
pub struct HttpPipelineRunner {
    client: Client,
    endpoint: Url,
}

impl HttpPipelineRunner {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PipelineRunner for HttpPipelineRunner {
    async fn update_release(&self, release_id: ReleaseId) -> Result<(), RunnerError> {
        let command = UpdateCommand {
            release_id: release_id.as_i64(),
            action: UPDATE_ACTION,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&command)
            .send()
            .await
            .map_err(|err| RunnerError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunnerError::status(status.as_u16()));
        }
        Ok(())
    }
}
