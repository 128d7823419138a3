//! Service layer composing repository calls into request-level flows.

pub mod content_history_service;

pub use content_history_service::{ContentEdit, ContentHistoryService, OriginalContent};
