//! Data model for the adaptive TTL estimator

pub mod burst_state;
pub mod source_id;
pub mod summary;
pub mod time_field;

pub use burst_state::BurstState;
pub use source_id::SourceId;
pub use summary::{FeedRecord, SourceStatus, SourceSummary};
pub use time_field::TimeField;
