pub mod cdn;
pub mod content_based;
pub mod storage_delegated;
