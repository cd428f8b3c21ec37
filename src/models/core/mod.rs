//! Core domain models.
//!
//! - `event`: Normalized event records and raw log shapes
//! - `cursor`: Backfill cursor tracking per event kind
//! - `transaction`: Transaction request lifecycle and failure taxonomy

mod cursor;
mod event;
mod transaction;

pub use cursor::BackfillCursor;
pub use event::{EventIdentity, EventKind, EventRecord, RawLog};
pub use transaction::{FailureReason, TransactionReceipt, TransactionRequest, TransactionStatus};
