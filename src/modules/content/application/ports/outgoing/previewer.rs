use async_trait::async_trait;

/// Optional hint contract consumed from an external previewer (e.g. an
/// image-resize pipeline). The core never decodes media itself; it only
/// records whatever hint the previewer reports.
#[derive(Debug, Clone, Default)]
pub struct PreviewHint {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub dominant_color: Option<String>,
}

#[async_trait]
pub trait Previewer: Send + Sync {
    async fn hint_for(&self, object_key: &str, mime_type: &str) -> Option<PreviewHint>;
}
