use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::types::{Config, Credentials, MonitorDefinition, RemoteMonitor};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("platform returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Monitor CRUD and credential validation on the monitoring platform.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    async fn validate_credentials(&self) -> Result<bool, ApiError>;
    async fn create_monitor(&self, def: &MonitorDefinition) -> Result<i64, ApiError>;
    async fn update_monitor(&self, id: i64, def: &MonitorDefinition) -> Result<i64, ApiError>;
    async fn delete_monitor(&self, id: i64) -> Result<(), ApiError>;
    async fn list_monitors(&self) -> Result<Vec<RemoteMonitor>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct MonitorIdResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    valid: bool,
}

/// Datadog v1 monitor API client.
pub struct DatadogClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl DatadogClient {
    pub fn new(cfg: &Config) -> Result<Self, ApiError> {
        let credentials = cfg
            .credentials
            .clone()
            .ok_or_else(|| ApiError::Config("DD_API_KEY and DD_APP_KEY must be set".to_string()))?;
        let mut builder = Client::builder().timeout(Duration::from_secs(cfg.timeout_secs));
        if let Some(proxy) = &cfg.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header("DD-API-KEY", &self.credentials.api_key)
            .header("DD-APPLICATION-KEY", &self.credentials.app_key)
            .header("Accept", "application/json")
    }
}

async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), body })
}

#[async_trait]
impl MonitorApi for DatadogClient {
    async fn validate_credentials(&self) -> Result<bool, ApiError> {
        let resp = self.request(Method::GET, "/api/v1/validate").send().await?;
        if matches!(resp.status().as_u16(), 401 | 403) {
            return Ok(false);
        }
        let body: ValidateResponse = ensure_success(resp).await?.json().await?;
        Ok(body.valid)
    }

    async fn create_monitor(&self, def: &MonitorDefinition) -> Result<i64, ApiError> {
        let resp = self.request(Method::POST, "/api/v1/monitor").json(def).send().await?;
        let created: MonitorIdResponse = ensure_success(resp).await?.json().await?;
        Ok(created.id)
    }

    async fn update_monitor(&self, id: i64, def: &MonitorDefinition) -> Result<i64, ApiError> {
        let path = format!("/api/v1/monitor/{}", id);
        let resp = self.request(Method::PUT, &path).json(def).send().await?;
        let updated: MonitorIdResponse = ensure_success(resp).await?.json().await?;
        Ok(updated.id)
    }

    async fn delete_monitor(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/api/v1/monitor/{}", id);
        let resp = self.request(Method::DELETE, &path).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn list_monitors(&self) -> Result<Vec<RemoteMonitor>, ApiError> {
        let resp = self.request(Method::GET, "/api/v1/monitor").send().await?;
        Ok(ensure_success(resp).await?.json().await?)
    }
}
