//! Async HTTP client for the certification lookup service.
//!
//! | operation     | request                                  |
//! |---------------|------------------------------------------|
//! | `ingest`      | `POST {base}/ingest` (multipart, `file`) |
//! | `lookup_one`  | `GET {base}/cpf/{id}`                    |
//! | `lookup_many` | `GET {base}/cpfs?cpfs=<id,id,...>`       |
//!
//! Every operation answers with a JSON array of person records.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use certview_core::{
  lookup::{LookupService, UploadFile},
  record::RecordSet,
};
use reqwest::{
  Client, RequestBuilder, StatusCode, Url,
  multipart::{Form, Part},
};
use thiserror::Error;

/// Connection settings for the lookup service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Any failure talking to the service. The orchestrator treats them all the
/// same; the variants only feed the log.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("{endpoint} failed: {source}")]
  Transport {
    endpoint: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{endpoint} → {status}")]
  Status {
    endpoint: &'static str,
    status:   StatusCode,
  },

  #[error("decoding {endpoint} response: {source}")]
  Decode {
    endpoint: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  #[error("invalid upload: {0}")]
  InvalidFile(String),
}

/// HTTP implementation of [`LookupService`].
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  base:   Url,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url)
      .with_context(|| format!("invalid base URL {:?}", config.base_url))?;
    if base.cannot_be_a_base() {
      bail!("base URL {:?} cannot carry a path", config.base_url);
    }
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base })
  }

  /// `base` with `segments` appended, each percent-encoded.
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn records(
    &self,
    endpoint: &'static str,
    request: RequestBuilder,
  ) -> Result<RecordSet, ClientError> {
    let resp = request
      .send()
      .await
      .map_err(|source| ClientError::Transport { endpoint, source })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(ClientError::Status { endpoint, status });
    }
    resp
      .json()
      .await
      .map_err(|source| ClientError::Decode { endpoint, source })
  }
}

impl LookupService for ApiClient {
  type Error = ClientError;

  async fn ingest(&self, file: UploadFile) -> Result<RecordSet, ClientError> {
    let part = Part::bytes(file.bytes)
      .file_name(file.file_name)
      .mime_str(&file.content_type)
      .map_err(|e| ClientError::InvalidFile(e.to_string()))?;
    let form = Form::new().part("file", part);

    let request = self.client.post(self.endpoint(&["ingest"])).multipart(form);
    self.records("POST /ingest", request).await
  }

  async fn lookup_one(&self, id: String) -> Result<RecordSet, ClientError> {
    let request = self.client.get(self.endpoint(&["cpf", &id]));
    self.records("GET /cpf", request).await
  }

  async fn lookup_many(&self, ids: Vec<String>) -> Result<RecordSet, ClientError> {
    let request = self
      .client
      .get(self.endpoint(&["cpfs"]))
      .query(&[("cpfs", ids.join(","))]);
    self.records("GET /cpfs", request).await
  }
}
