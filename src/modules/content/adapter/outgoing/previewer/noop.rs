use async_trait::async_trait;

use crate::content::application::ports::outgoing::previewer::{PreviewHint, Previewer};

/// Default previewer: no external resize pipeline configured, so every
/// object gets no hint. Swap for a real adapter once one is wired up.
#[derive(Debug, Clone, Default)]
pub struct NoopPreviewer;

#[async_trait]
impl Previewer for NoopPreviewer {
    async fn hint_for(&self, _object_key: &str, _mime_type: &str) -> Option<PreviewHint> {
        None
    }
}
