//! Event ingestion and backfill pipeline.
//!
//! Maps raw contract logs of the three known shapes into uniform records and
//! keeps coverage gapless by reconciling live subscriptions with ranged
//! historical queries:
//!
//! - `normalizer`: Raw log to `EventRecord` mapping
//! - `listener`: Per-kind live subscription with reconnect and gap tracking
//! - `backfiller`: Paginated historical queries, sorted duplicate-free output
//! - `sink`: Delivery boundary with identity-keyed dedupe
//! - `storage`: Persisted cursors and last-fired date

mod backfiller;
mod error;
mod listener;
mod normalizer;
mod sink;
mod storage;

pub use backfiller::Backfiller;
pub use error::IngestError;
pub use listener::LiveListener;
pub use normalizer::normalize;
pub use sink::{DedupingSink, EventSink, LoggingSink, TrackingSink};
pub use storage::{CursorStorage, FileCursorStorage};
