use serde::{Deserialize, Serialize};

use crate::models::EventKind;

/// Inclusive block range a backfill run covers for one event kind.
///
/// Cursors only ever advance; the persisted per-kind position is the highest
/// `to_block` a completed run has covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillCursor {
    pub kind: EventKind,
    pub from_block: u64,
    pub to_block: u64,
}

impl BackfillCursor {
    pub fn new(kind: EventKind, from_block: u64, to_block: u64) -> Self {
        Self {
            kind,
            from_block,
            to_block,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from_block > self.to_block
    }
}
