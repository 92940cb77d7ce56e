//! Remote data client for the snapshot REST interface.
//!
//! Every resource is a plain `GET` under `http://{api_host}:{api_port}` that
//! answers with JSON. The client performs exactly one request per call: no
//! retries, no timeout.

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
        }
    }
}

impl ApiConfig {
    pub fn new(api_host: impl Into<String>, api_port: u16) -> Self {
        Self {
            api_host: api_host.into(),
            api_port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.api_host, self.api_port)
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

/// Resource paths, relative to the API base URL.
pub mod path {
    use crate::Id;

    pub fn users() -> String {
        "users".to_string()
    }

    pub fn user(uid: &Id) -> String {
        format!("users/{uid}")
    }

    pub fn snapshots(uid: &Id) -> String {
        format!("users/{uid}/snapshots")
    }

    pub fn snapshot(uid: &Id, sid: &Id) -> String {
        format!("users/{uid}/snapshots/{sid}")
    }

    pub fn field(uid: &Id, sid: &Id, name: &str) -> String {
        format!("users/{uid}/snapshots/{sid}/{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request for {path} failed: {message}")]
    Transport { path: String, message: String },
    #[error("{path} answered HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("{path} returned a non-JSON body: {message}")]
    Decode { path: String, message: String },
    #[error("{path} returned an unexpected payload: {message}")]
    Shape { path: String, message: String },
}

impl FetchError {
    pub fn path(&self) -> &str {
        match self {
            FetchError::Transport { path, .. }
            | FetchError::Status { path, .. }
            | FetchError::Decode { path, .. }
            | FetchError::Shape { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Anything that can resolve a resource path to a JSON document.
pub trait ResourceSource: Send + Sync {
    fn fetch(&self, path: String) -> BoxFuture<'static, Result<Value, FetchError>>;
}

/// Parses a fetched document into its typed entity.
pub fn decode_payload<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|err| FetchError::Shape {
        path: path.to_string(),
        message: err.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| FetchError::Transport {
                path: config.base_url(),
                message: err.to_string(),
            })?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn fetch_resource(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.config.url_for(path);
        debug!(%url, "fetch_resource");
        let transport = |err: reqwest::Error| FetchError::Transport {
            path: path.to_string(),
            message: err.to_string(),
        };

        let resp = self.http.get(&url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|err| FetchError::Decode {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}

impl ResourceSource for ApiClient {
    fn fetch(&self, path: String) -> BoxFuture<'static, Result<Value, FetchError>> {
        let client = self.clone();
        Box::pin(async move { client.fetch_resource(&path).await })
    }
}
