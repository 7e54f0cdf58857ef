use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A story's position within a ranking context (a backlog).
///
/// Entries are owned by their context. At most one entry exists per
/// `(context_id, item_id)` pair, and the positions of all entries in a context
/// form the range `0..n` once a ranking operation has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub id: Uuid,
    /// The backlog this entry orders the story in.
    pub context_id: Uuid,
    /// The ranked story.
    pub item_id: Uuid,
    /// Zero-based rank, 0 is the top of the backlog.
    ///
    /// `None` only for an entry created inside an operation that has not yet
    /// reached its re-sequencing pass.
    pub position: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl RankEntry {
    /// Whether this entry belongs to the given `(context, item)` pair.
    pub fn is_for(&self, context_id: Uuid, item_id: Uuid) -> bool {
        self.context_id == context_id && self.item_id == item_id
    }
}
