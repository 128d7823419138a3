//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! an explicit `&mut PgConnection` as the first argument. Pass a pooled
//! connection or `&mut *tx` to run inside a caller's transaction.

pub mod content_history_repo;

pub use content_history_repo::ContentHistoryRepo;
