//! RemoteStore - HTTP client for the shared document API
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET | `{base}/tables/{collection}/items` | → `[{"key": .., "value": ..}]` |
//! | GET | `{base}/tables/{collection}/items/{key}` | → document (404 = absent) |
//! | PUT | `{base}/tables/{collection}/items/{key}` | document |
//! | DELETE | `{base}/tables/{collection}/items/{key}` | (404 = absent) |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{Collection, RecordStore, StoreError, StoreResult};

/// One entry of a collection listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub key: String,
    pub value: Value,
}

/// HTTP client for the remote document store
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Remote(format!("Invalid remote store URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Remote(format!(
                "Remote store URL cannot be a base: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Remote(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/tables/{collection}/items[/{key}]`, segments percent-encoded
    fn items_url(&self, collection: Collection, key: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["tables", collection.as_str(), "items"]);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Remote(e.to_string()))
    }

    async fn fail(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::RemoteStatus { status, body }
    }
}

#[async_trait]
impl RecordStore for RemoteStore {
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>> {
        let url = self.items_url(collection, Some(key));
        let response = self.send(self.client.get(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let doc = response
                    .json::<Value>()
                    .await
                    .map_err(|e| StoreError::Remote(format!("Invalid document body: {e}")))?;
                Ok(Some(doc))
            }
            _ => Err(Self::fail(response).await),
        }
    }

    async fn put(&self, collection: Collection, key: &str, value: &Value) -> StoreResult<()> {
        let url = self.items_url(collection, Some(key));
        let response = self.send(self.client.put(url).json(value)).await?;

        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let url = self.items_url(collection, Some(key));
        let response = self.send(self.client.delete(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(Self::fail(response).await),
        }
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>> {
        let url = self.items_url(collection, None);
        let response = self.send(self.client.get(url)).await?;

        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let items: Vec<RemoteItem> = response
            .json()
            .await
            .map_err(|e| StoreError::Remote(format!("Invalid listing body: {e}")))?;
        Ok(items.into_iter().map(|i| (i.key, i.value)).collect())
    }
}
