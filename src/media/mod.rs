/// Hosted image service passthrough
///
/// Inline (data-URI) image payloads are forwarded to the hosted media API
/// and only the resulting hosted URI is ever persisted.

use crate::{
    config::MediaConfig,
    error::{ApiError, ApiResult},
};
use serde::Deserialize;

/// Upload response from the image host
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Media store service
pub struct MediaStore {
    config: Option<MediaConfig>,
    client: reqwest::Client,
}

impl MediaStore {
    /// Create a new media store
    pub fn new(config: Option<MediaConfig>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if the image host is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Upload an inline image and return its hosted URI
    pub async fn upload(&self, image: &str) -> ApiResult<String> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ApiError::upstream("Image host not configured"))?;

        let form = [
            ("file", image),
            ("upload_preset", config.upload_preset.as_str()),
            ("folder", config.folder.as_str()),
            ("api_key", config.api_key.as_str()),
        ];

        let response = self
            .client
            .post(format!(
                "{}/{}/image/upload",
                config.api_url, config.cloud_name
            ))
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::upstream(format!("Image upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::upstream(format!(
                "Image upload failed with status {}",
                response.status()
            )));
        }

        let uploaded = response
            .json::<UploadResponse>()
            .await
            .map_err(|e| ApiError::upstream(format!("Malformed upload response: {}", e)))?;

        tracing::debug!(url = %uploaded.secure_url, "Image uploaded");

        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_is_upstream_error() {
        let store = MediaStore::new(None).unwrap();

        assert!(matches!(
            store.upload("data:image/png;base64,AAAA").await,
            Err(ApiError::Upstream { .. })
        ));
    }
}
