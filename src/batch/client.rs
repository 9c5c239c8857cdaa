use std::time::Duration;

use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::error::ExtractError;
use crate::model::BatchJob;

/// Client for the provider's file and batch-job endpoints.
pub struct BatchClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BatchClient {
    /// Create a client from provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ExtractError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            config::ConfigError::Message(
                "api_key not found in config or OPENAI_API_KEY environment".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(BatchClient {
            client,
            api_key,
            base_url: config.resolve_base_url(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        BatchClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Upload a JSONL manifest and return the provider file id.
    pub async fn upload_manifest(&self, content: String) -> Result<String, ExtractError> {
        let file = Part::bytes(content.into_bytes())
            .file_name("tasks.jsonl")
            .mime_str("application/jsonl")?;
        let form = Form::new().text("purpose", "batch").part("file", file);

        let response = self
            .client
            .post(format!("{}/v1/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let body: Value = check_status(response).await?;

        body["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ExtractError::MalformedResponse("file upload has no id".to_string()))
    }

    /// Create an asynchronous batch job over an uploaded manifest.
    pub async fn create_job(&self, input_file_id: &str) -> Result<BatchJob, ExtractError> {
        let response = self
            .client
            .post(format!("{}/v1/batches", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "input_file_id": input_file_id,
                "endpoint": "/v1/responses",
                "completion_window": "24h",
            }))
            .send()
            .await?;
        let body: Value = check_status(response).await?;

        debug!("create_job response: {}", body);
        serde_json::from_value(body)
            .map_err(|e| ExtractError::MalformedResponse(format!("batch object: {}", e)))
    }

    /// Retrieve the current state of a batch job.
    pub async fn retrieve_job(&self, batch_id: &str) -> Result<BatchJob, ExtractError> {
        let response = self
            .client
            .get(format!("{}/v1/batches/{}", self.base_url, batch_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let body: Value = check_status(response).await?;

        serde_json::from_value(body)
            .map_err(|e| ExtractError::MalformedResponse(format!("batch object: {}", e)))
    }

    /// Download the content of a provider file (result or error stream).
    pub async fn download_file(&self, file_id: &str) -> Result<String, ExtractError> {
        let response = self
            .client
            .get(format!("{}/v1/files/{}/content", self.base_url, file_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<Value, ExtractError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ExtractError::ProviderError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}
