use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use super::types::{Collection, ListResponse};
use crate::error::AuthError;

/// Generic list/create access to record collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self, collection: Collection) -> Result<Vec<Value>, AuthError>;
    async fn create_record(&self, collection: Collection, record: Value)
        -> Result<Value, AuthError>;
}

/// HTTP client for `{base}/tables/{collection}`.
///
/// One attempt per call: no retry, no timeout, no pagination. Every failure is
/// reported as the same network error; the cause only goes to the log.
#[derive(Clone)]
pub struct RecordClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecordClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, collection: Collection) -> String {
        format!("{}/tables/{}", self.base_url, collection)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, AuthError> {
        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "api call failed");
            return Err(AuthError::network());
        }
        response.json::<T>().await.map_err(|e| {
            error!(%url, error = %e, "api response decode failed");
            AuthError::network()
        })
    }
}

#[async_trait]
impl RecordStore for RecordClient {
    async fn list_records(&self, collection: Collection) -> Result<Vec<Value>, AuthError> {
        let url = self.url(collection);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "api call failed");
                AuthError::network()
            })?;
        let body: ListResponse<Value> = Self::read_json(response, &url).await?;
        debug!(%collection, count = body.data.len(), "records listed");
        Ok(body.data)
    }

    async fn create_record(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<Value, AuthError> {
        let url = self.url(collection);
        let response = self
            .http
            .post(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "api call failed");
                AuthError::network()
            })?;
        let stored: Value = Self::read_json(response, &url).await?;
        debug!(%collection, "record created");
        Ok(stored)
    }
}
