// Adapters layer: concrete implementations for external systems (AI endpoint, storage, report bundle).

pub mod openrouter;
pub mod report_archive;
pub mod storage;
