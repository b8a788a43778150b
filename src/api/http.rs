use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{ApiRequest, MultipartField, MultipartPayload, RequestBody, Transport};
use crate::config::BackendConfig;
use crate::errors::{AppError, AppResult, TransportError};

/// reqwest-backed transport. The request timeout configured here is the only
/// cancellation the tracking core has.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(cfg: &BackendConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(cfg.timeout_secs.min(15)))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token: cfg.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn to_form(payload: MultipartPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for field in payload.fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name, value),
            MultipartField::File {
                name,
                file_name,
                mime_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| TransportError::Network(e.to_string()))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.url(request.endpoint.path());

        let builder = match request.body {
            RequestBody::Json(body) => self.client.post(&url).json(&body),
            RequestBody::Multipart(payload) => self.client.post(&url).multipart(to_form(payload)?),
            RequestBody::Query(params) => self.client.get(&url).query(&params),
        };

        let builder = match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "backend replied");

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "backend returned an error status");
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
