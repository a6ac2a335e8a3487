use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    ContentCreated { content_id: Uuid },
    ContentUploaded { content_id: Uuid },
    ContentDeleted { content_id: Uuid },
    ObjectUploadFailed { object_id: Uuid, reason: String },
}

/// Fire-and-forget observer invoked on lifecycle transitions. Errors from it
/// must never fail the originating operation — callers log and move on.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: LifecycleEvent);
}
