//! Domain types and rules for issue content history.
//!
//! This crate has no database dependency so the retention policy, the
//! identifier rules, and the revision diff can be tested in isolation.

pub mod content_history;
pub mod diff;
pub mod error;
pub mod pagination;
pub mod types;
