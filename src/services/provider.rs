use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::errors::{AppError, Result};
use crate::models::GenerationStyle;

/// External image generation API. The HTTP implementation talks to the
/// configured provider; tests substitute their own.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates images for `(prompt, style)` and returns their URLs.
    async fn generate(&self, prompt: &str, style: GenerationStyle) -> Result<Vec<String>>;

    fn name(&self) -> &str;
}

pub struct HttpImageProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    image_count: u8,
}

#[derive(Debug, Serialize)]
struct ProviderRequest<'a> {
    prompt: &'a str,
    style: &'a str,
    samples: u8,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    images: Vec<ProviderImage>,
}

#[derive(Debug, Deserialize)]
struct ProviderImage {
    url: String,
}

impl HttpImageProvider {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            api_key: config.provider_api_key.clone(),
            image_count: config.provider_image_count,
        })
    }
}

#[async_trait]
impl ImageProvider for HttpImageProvider {
    async fn generate(&self, prompt: &str, style: GenerationStyle) -> Result<Vec<String>> {
        let request = ProviderRequest {
            prompt,
            style: style.as_str(),
            samples: self.image_count,
        };

        debug!("requesting {} images from {}", self.image_count, self.base_url);

        let mut builder = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        let parsed: ProviderResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Malformed provider response: {}", e)))?;

        if parsed.images.is_empty() {
            return Err(AppError::Provider("Provider returned no images".to_string()));
        }

        Ok(parsed.images.into_iter().map(|i| i.url).collect())
    }

    fn name(&self) -> &str {
        "http"
    }
}
