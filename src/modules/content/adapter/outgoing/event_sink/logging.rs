use async_trait::async_trait;
use tracing::info;

use crate::content::application::ports::outgoing::event_sink::{EventSink, LifecycleEvent};

/// Fire-and-forget observer that writes lifecycle transitions to the
/// structured log. Stands in until a real audit/webhook sink
/// (`EVENT_AUDIT_URL`) is configured.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::ContentCreated { content_id } => {
                info!(%content_id, "content created");
            }
            LifecycleEvent::ContentUploaded { content_id } => {
                info!(%content_id, "content uploaded");
            }
            LifecycleEvent::ContentDeleted { content_id } => {
                info!(%content_id, "content deleted");
            }
            LifecycleEvent::ObjectUploadFailed { object_id, reason } => {
                tracing::warn!(%object_id, %reason, "object upload failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn emit_does_not_panic_on_any_event_variant() {
        let sink = LoggingEventSink;
        sink.emit(LifecycleEvent::ContentCreated {
            content_id: Uuid::new_v4(),
        })
        .await;
        sink.emit(LifecycleEvent::ObjectUploadFailed {
            object_id: Uuid::new_v4(),
            reason: "disk full".into(),
        })
        .await;
    }
}
