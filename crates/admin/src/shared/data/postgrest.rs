use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{DataService, RowPage};
use crate::shared::config::DataServiceConfig;
use crate::shared::error::CatalogError;

/// HTTP-клиент PostgREST-совместимого сервиса данных (REST + хранилище объектов)
pub struct PostgrestClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Тело ошибки REST (`message`, `code`) или хранилища (`error`, `message`)
#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
    code: Option<String>,
    error: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

impl PostgrestClient {
    pub fn new(config: &DataServiceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, urlencoding::encode(table))
    }

    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            urlencoding::encode(name)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, CatalogError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            tracing::error!("Data service request failed ({}): {}", what, e);
            CatalogError::backend(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!("Data service {} -> {}", what, status);
        if status.is_success() {
            return Ok(response);
        }
        Err(error_from_response(response, what).await)
    }
}

async fn error_from_response(response: Response, what: &str) -> CatalogError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!("Data service {} failed with status {}: {}", what, status, body);
    let parsed: ServiceErrorBody = serde_json::from_str(&body).unwrap_or_default();
    CatalogError::Backend {
        message: error_message(status, &parsed, &body),
        code: parsed.code,
    }
}

fn error_message(status: StatusCode, body: &ServiceErrorBody, raw: &str) -> String {
    let mut message = body
        .message
        .clone()
        .or_else(|| body.error.clone())
        .unwrap_or_else(|| {
            if raw.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                raw.trim().to_string()
            }
        });
    if let Some(details) = body.details.as_deref().filter(|d| !d.is_empty()) {
        message = format!("{} ({})", message, details);
    }
    if let Some(hint) = body.hint.as_deref().filter(|h| !h.is_empty()) {
        message = format!("{}. {}", message, hint);
    }
    message
}

/// Общее количество строк из заголовка `Content-Range: 0-11/25` (или `*/0`)
pub fn parse_content_range(value: &str) -> Option<usize> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}

fn total_from_headers(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl DataService for PostgrestClient {
    async fn select_range(
        &self,
        table: &str,
        order_by: &str,
        from: usize,
        to: usize,
    ) -> Result<RowPage, CatalogError> {
        let limit = to.saturating_sub(from) + 1;
        let request = self
            .client
            .get(self.rest_url(table))
            .query(&[
                ("select", "*".to_string()),
                ("order", format!("{}.asc", order_by)),
                ("offset", from.to_string()),
                ("limit", limit.to_string()),
            ])
            .header("Prefer", "count=exact");

        let response = self.send(request, &format!("select {}", table)).await?;
        let total = total_from_headers(response.headers()).ok_or_else(|| {
            CatalogError::backend(format!("{}: exact row count missing in response", table))
        })?;
        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(RowPage { rows, total })
    }

    async fn select_by_id(&self, table: &str, id: &str) -> Result<Value, CatalogError> {
        let request = self
            .client
            .get(self.rest_url(table))
            .query(&[("select", "*")])
            .query(&id_filter(id))
            .header(ACCEPT, SINGLE_OBJECT);

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| CatalogError::backend(e.to_string()))?;

        // 406: запрос одного объекта вернул ноль строк
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(CatalogError::not_found(table, id));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response, &format!("get {}", table)).await);
        }
        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, CatalogError> {
        let request = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);

        let response = self.send(request, &format!("insert {}", table)).await?;
        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: Value,
    ) -> Result<Vec<Value>, CatalogError> {
        let request = self
            .client
            .patch(self.rest_url(table))
            .query(&id_filter(id))
            .header("Prefer", "return=representation")
            .json(&fields);

        let response = self.send(request, &format!("update {}", table)).await?;
        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), CatalogError> {
        let request = self
            .client
            .delete(self.rest_url(table))
            .query(&id_filter(id));
        self.send(request, &format!("delete {}", table)).await?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CatalogError> {
        let request = self
            .client
            .post(self.object_url(bucket, name))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        match self.send(request, &format!("upload {}/{}", bucket, name)).await {
            Ok(_) => Ok(()),
            Err(CatalogError::Backend { message, .. }) => Err(CatalogError::Storage(message)),
            Err(e) => Err(CatalogError::Storage(e.to_string())),
        }
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            urlencoding::encode(name)
        )
    }
}
