use async_trait::async_trait;
use uuid::Uuid;

use crate::content::application::ports::outgoing::url_strategy::{
    UrlMetadata, UrlStrategy, UrlStrategyError,
};

/// All three URLs route through application endpoints; the handler behind
/// them is responsible for fetching bytes from the backend itself.
#[derive(Debug, Clone)]
pub struct ContentBasedUrlStrategy {
    api_base: String,
}

impl ContentBasedUrlStrategy {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    fn query_string(metadata: Option<&UrlMetadata>, disposition_inline: bool) -> String {
        let mut params = Vec::new();
        if let Some(m) = metadata {
            if let Some(ref file_name) = m.file_name {
                params.push(format!("filename={file_name}"));
            }
            if let Some(version) = m.version {
                params.push(format!("version={version}"));
            }
            if let Some(ref content_type) = m.content_type {
                params.push(format!("type={content_type}"));
            }
        }
        if disposition_inline {
            params.push("disposition=inline".to_string());
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

#[async_trait]
impl UrlStrategy for ContentBasedUrlStrategy {
    async fn generate_download_url(
        &self,
        content_id: Uuid,
        _object_key: &str,
        _backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        Ok(format!(
            "{}/contents/{}/download{}",
            self.api_base.trim_end_matches('/'),
            content_id,
            Self::query_string(metadata.as_ref(), false)
        ))
    }

    async fn generate_preview_url(
        &self,
        content_id: Uuid,
        _object_key: &str,
        _backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        Ok(format!(
            "{}/contents/{}/preview{}",
            self.api_base.trim_end_matches('/'),
            content_id,
            Self::query_string(metadata.as_ref(), true)
        ))
    }

    async fn generate_upload_url(
        &self,
        content_id: Uuid,
        _object_key: &str,
        _backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        Ok(format!(
            "{}/contents/{}/upload{}",
            self.api_base.trim_end_matches('/'),
            content_id,
            Self::query_string(metadata.as_ref(), false)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn download_url_is_an_application_endpoint() {
        let strategy = ContentBasedUrlStrategy::new("https://api.example.com");
        let content_id = Uuid::new_v4();
        let url = strategy
            .generate_download_url(content_id, "k", "s3", None)
            .await
            .unwrap();
        assert_eq!(url, format!("https://api.example.com/contents/{content_id}/download"));
    }

    #[tokio::test]
    async fn preview_url_always_carries_inline_disposition() {
        let strategy = ContentBasedUrlStrategy::new("https://api.example.com");
        let content_id = Uuid::new_v4();
        let url = strategy
            .generate_preview_url(content_id, "k", "s3", None)
            .await
            .unwrap();
        assert!(url.ends_with("?disposition=inline"));
    }

    #[tokio::test]
    async fn query_params_compose_filename_and_version() {
        let strategy = ContentBasedUrlStrategy::new("https://api.example.com");
        let content_id = Uuid::new_v4();
        let url = strategy
            .generate_download_url(
                content_id,
                "k",
                "s3",
                Some(UrlMetadata {
                    file_name: Some("a.pdf".to_string()),
                    version: Some(2),
                    content_type: None,
                }),
            )
            .await
            .unwrap();
        assert_eq!(
            url,
            format!("https://api.example.com/contents/{content_id}/download?filename=a.pdf&version=2")
        );
    }
}
