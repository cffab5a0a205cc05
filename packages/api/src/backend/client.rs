//! REST client implementing [`TableStore`] against the hosted backend.
//!
//! Each request carries the project's anon key as `apikey` and either the
//! caller's access token or the anon key as the bearer token, so row-level
//! security sees the signed-in user.

use std::sync::OnceLock;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use store::{Filter, Query, StoreError, TableStore};

use super::rest;
use super::{BackendConfig, BackendError};

static CLIENT: OnceLock<Client> = OnceLock::new();

pub(crate) fn http() -> &'static Client {
    CLIENT.get_or_init(Client::new)
}

#[derive(Clone, Debug)]
pub struct HostedStore {
    config: BackendConfig,
    access_token: Option<String>,
}

impl HostedStore {
    /// A store acting as `access_token`'s user, or anonymously.
    pub fn new(config: BackendConfig, access_token: Option<String>) -> Self {
        Self {
            config,
            access_token,
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .access_token
            .as_deref()
            .unwrap_or(&self.config.anon_key);
        http()
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    async fn rows(&self, builder: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let response = check(builder.send().await?).await?;
        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(BackendError::Response(other.to_string())),
        }
    }

    async fn single(&self, builder: RequestBuilder) -> Result<Value, BackendError> {
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Response("no row returned".into()))
    }
}

/// Turn non-success statuses into [`BackendError::Status`] with the body's message.
pub(crate) async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = rest::error_message(&body);
    tracing::warn!("Backend returned {}: {}", status, message);
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

impl TableStore for HostedStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let url = rest::table_url(&self.config.url, &query.table);
        let builder = self
            .request(Method::GET, &url)
            .query(&rest::query_params(query));
        Ok(self.rows(builder).await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let url = rest::table_url(&self.config.url, table);
        let builder = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&row);
        Ok(self.single(builder).await?)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let url = rest::table_url(&self.config.url, table);
        let builder = self
            .request(Method::PATCH, &url)
            .query(&rest::filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        Ok(self.rows(builder).await?)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Value, StoreError> {
        let url = rest::table_url(&self.config.url, table);
        let builder = self
            .request(Method::POST, &url)
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);
        Ok(self.single(builder).await?)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        let url = rest::table_url(&self.config.url, table);
        let builder = self
            .request(Method::DELETE, &url)
            .query(&rest::filter_params(filters))
            .header("Prefer", "return=representation");
        Ok(self.rows(builder).await?.len())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        let url = rest::object_url(&self.config.url, bucket, path);
        let response = self
            .request(Method::POST, &url)
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(BackendError::from)?;
        check(response).await?;
        tracing::info!("Uploaded {}/{}", bucket, path);
        Ok(rest::public_object_url(&self.config.url, bucket, path))
    }
}
