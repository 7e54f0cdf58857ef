use uuid::Uuid;

use super::Result;
use crate::models::RankEntry;

/// Persistence seam for the ranking engine.
///
/// Every call made by one engine operation must land in the same atomic unit
/// (a transaction, or a lock over the context), so that no other operation on
/// the context can observe or interleave with a half-written ordering.
pub trait RankStore {
    /// The entry for `item_id` in `context_id`, if it has one.
    fn find_entry(&self, context_id: Uuid, item_id: Uuid) -> Result<Option<RankEntry>>;

    /// Insert a new entry with no position yet.
    fn create_entry(&self, context_id: Uuid, item_id: Uuid) -> Result<RankEntry>;

    fn delete_entry(&self, entry: &RankEntry) -> Result<()>;

    /// All entries of a context ordered by position. Entries without a
    /// position come last, oldest first.
    fn list_entries(&self, context_id: Uuid) -> Result<Vec<RankEntry>>;

    /// All entries of a story, across every context it is ranked in.
    fn list_entries_for_item(&self, item_id: Uuid) -> Result<Vec<RankEntry>>;

    fn update_entry(&self, entry: &RankEntry, position: u32) -> Result<()>;
}
