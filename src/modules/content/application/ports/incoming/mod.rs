pub mod admin_service;
pub mod core_service;
pub mod derivation_service;
pub mod error;
pub mod storage_service;
