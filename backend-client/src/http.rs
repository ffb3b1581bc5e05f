//! HTTP implementation of the persistence endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use nasara_mutation::PersistFailure;
use nasara_protocol::ItemKind;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::FetchError;
use crate::PersistenceEndpoint;

/// Status update request body.
#[derive(Debug, Serialize)]
struct StatusUpdateRequest<'a> {
    status: &'a str,
}

/// Collection response body: `{"items": {"<id>": "<status>", ...}}`.
#[derive(Debug, Deserialize)]
struct CollectionResponse {
    items: HashMap<String, String>,
}

/// Persistence endpoint backed by the product's REST API.
pub struct HttpEndpoint {
    client: Client,
    base_url: String,
}

impl HttpEndpoint {
    /// Build an endpoint for `base_url` with a client-level timeout.
    ///
    /// The timeout turns a hung server into a `PersistFailure::Timeout`
    /// instead of an indefinitely "saving" item.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn item_url(&self, kind: ItemKind, item_id: &str) -> String {
        format!(
            "{}/api/collections/{kind}/items/{item_id}",
            self.base_url.trim_end_matches('/')
        )
    }

    fn collection_url(&self, kind: ItemKind, parent_id: &str) -> String {
        format!(
            "{}/api/collections/{kind}/{parent_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

fn classify(err: reqwest::Error) -> PersistFailure {
    if err.is_timeout() {
        PersistFailure::Timeout
    } else {
        PersistFailure::Transport(err.to_string())
    }
}

#[async_trait]
impl PersistenceEndpoint for HttpEndpoint {
    async fn persist(
        &self,
        kind: ItemKind,
        item_id: &str,
        status: &str,
    ) -> Result<(), PersistFailure> {
        let url = self.item_url(kind, item_id);
        debug!(%url, status, "persisting status");
        let response = self
            .client
            .put(&url)
            .json(&StatusUpdateRequest { status })
            .send()
            .await
            .map_err(classify)?;

        let http_status = response.status();
        if http_status.is_success() {
            Ok(())
        } else {
            Err(PersistFailure::Rejected {
                status: http_status.as_u16(),
            })
        }
    }

    async fn fetch_collection(
        &self,
        kind: ItemKind,
        parent_id: &str,
    ) -> Result<HashMap<String, String>, FetchError> {
        let url = self.collection_url(kind, parent_id);
        debug!(%url, "fetching collection");
        let response = self.client.get(&url).send().await?.error_for_status()?;

        // Validate the shape ourselves so a drifted server schema surfaces
        // as MalformedResponse, which the session downgrades to an empty
        // collection instead of a crash.
        let body: serde_json::Value = response.json().await?;
        let parsed: CollectionResponse =
            serde_json::from_value(body).map_err(|e| FetchError::MalformedResponse {
                reason: e.to_string(),
            })?;
        Ok(parsed.items)
    }
}
