//! PostgREST-style remote record store.
//!
//! Updates are `PATCH {url}/{table}?id=eq.{id}` with a JSON body holding the
//! columns; deletes are `DELETE {url}/{table}?id=eq.{id}`. Any non-2xx answer
//! is a failure.

use anyhow::Context;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::error::{PersistenceError, PersistenceOperation};
use crate::services::persistence::{RecordStore, RemoteTable};

/// Record store talking to a REST endpoint over blocking HTTP.
pub struct RestRecordStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestRecordStore {
    /// Creates a store for `base_url`.
    ///
    /// `timeout` of `None` waits forever for an answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Creates a store from the `[store]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if no URL is configured or the client cannot be built.
    pub fn from_config(config: &StoreConfig) -> anyhow::Result<Self> {
        let url = config
            .url
            .as_ref()
            .context("REST store selected but no store URL configured")?;
        Self::new(
            url.clone(),
            config.api_key.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Endpoint for a table.
    fn table_url(&self, table: RemoteTable) -> String {
        format!("{}/{}", self.base_url, table.name())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    fn send(
        &self,
        request: RequestBuilder,
        table: RemoteTable,
        id: &str,
        operation: PersistenceOperation,
    ) -> Result<(), PersistenceError> {
        let fail = |message: String| PersistenceError::new(table.name(), id, operation, message);

        let response = self
            .authorize(request)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .send()
            .map_err(|e| fail(format!("request error: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(fail(format!("store responded with {status}: {}", body.trim())))
    }
}

impl RecordStore for RestRecordStore {
    fn update(
        &self,
        table: RemoteTable,
        id: &str,
        columns: &Map<String, Value>,
    ) -> Result<(), PersistenceError> {
        let request = self.client.patch(self.table_url(table)).json(columns);
        self.send(request, table, id, PersistenceOperation::Update)
    }

    fn delete(&self, table: RemoteTable, id: &str) -> Result<(), PersistenceError> {
        let request = self.client.delete(self.table_url(table));
        self.send(request, table, id, PersistenceOperation::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let store = RestRecordStore::new("https://example.test/rest/v1/", None, None).unwrap();
        assert_eq!(
            store.table_url(RemoteTable::Rooms),
            "https://example.test/rest/v1/rooms"
        );
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = StoreConfig::default();
        assert!(RestRecordStore::from_config(&config).is_err());
    }

    #[test]
    fn test_unreachable_store_reports_persistence_error() {
        let store = RestRecordStore::new(
            "http://127.0.0.1:9",
            Some("key".to_string()),
            Some(Duration::from_secs(2)),
        )
        .unwrap();
        let err = store.delete(RemoteTable::Features, "w1").unwrap_err();
        assert_eq!(err.table, "features");
        assert_eq!(err.id, "w1");
        assert_eq!(err.operation, PersistenceOperation::Delete);
    }
}
