use async_trait::async_trait;
use uuid::Uuid;

use crate::content::application::ports::outgoing::url_strategy::{
    UrlMetadata, UrlStrategy, UrlStrategyError,
};

/// Downloads/previews are served straight off the CDN; CDNs typically don't
/// accept writes, so uploads fall back to an application endpoint under
/// `api_base`.
#[derive(Debug, Clone)]
pub struct CdnUrlStrategy {
    cdn_base: String,
    api_base: String,
}

impl CdnUrlStrategy {
    pub fn new(cdn_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            cdn_base: cdn_base.into(),
            api_base: api_base.into(),
        }
    }

    fn cdn_url(&self, object_key: &str, metadata: Option<&UrlMetadata>) -> String {
        let mut url = format!("{}/{}", self.cdn_base.trim_end_matches('/'), object_key);
        if let Some(file_name) = metadata.and_then(|m| m.file_name.as_deref()) {
            url.push_str(&format!("?filename={}", urlencoding_light(file_name)));
        }
        url
    }
}

/// Minimal percent-encoding for query-string placement; only the characters
/// that would otherwise break the URL need escaping here.
fn urlencoding_light(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '?' => "%3F".to_string(),
            '#' => "%23".to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[async_trait]
impl UrlStrategy for CdnUrlStrategy {
    async fn generate_download_url(
        &self,
        _content_id: Uuid,
        object_key: &str,
        _backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        Ok(self.cdn_url(object_key, metadata.as_ref()))
    }

    async fn generate_preview_url(
        &self,
        _content_id: Uuid,
        object_key: &str,
        _backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        Ok(self.cdn_url(object_key, metadata.as_ref()))
    }

    async fn generate_upload_url(
        &self,
        content_id: Uuid,
        _object_key: &str,
        _backend: &str,
        _metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        Ok(format!(
            "{}/contents/{}/upload",
            self.api_base.trim_end_matches('/'),
            content_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn download_url_points_at_cdn() {
        let strategy = CdnUrlStrategy::new("https://cdn.example.com", "https://api.example.com");
        let url = strategy
            .generate_download_url(Uuid::nil(), "t1/abc/1", "s3", None)
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/t1/abc/1");
    }

    #[tokio::test]
    async fn download_url_carries_filename_hint() {
        let strategy = CdnUrlStrategy::new("https://cdn.example.com", "https://api.example.com");
        let url = strategy
            .generate_download_url(
                Uuid::nil(),
                "t1/abc/1",
                "s3",
                Some(UrlMetadata {
                    file_name: Some("report.pdf".to_string()),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/t1/abc/1?filename=report.pdf");
    }

    #[tokio::test]
    async fn upload_url_falls_back_to_application_endpoint() {
        let strategy = CdnUrlStrategy::new("https://cdn.example.com", "https://api.example.com");
        let content_id = Uuid::new_v4();
        let url = strategy
            .generate_upload_url(content_id, "t1/abc/1", "s3", None)
            .await
            .unwrap();
        assert_eq!(url, format!("https://api.example.com/contents/{content_id}/upload"));
    }
}
