//! The ranking engine.
//!
//! A backlog's stories are kept in an explicit total order. Every operation
//! loads the whole context, edits it as a `Vec`, and then re-sequences it so
//! the stored positions are exactly `0..n`. Only entries whose position
//! actually changed are written back.
//!
//! The engine owns no state: it borrows a [`RankStore`] for the duration of
//! one operation, and the store decides what "atomic" means. See
//! [`crate::db::Database`] for the SQLite-backed store.

mod error;
mod store;

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Placement, RankEntry};

pub use error::{RankError, Result};
pub use store::RankStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
}

/// Applies ranking operations against a [`RankStore`].
pub struct Ranker<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: RankStore + ?Sized> Ranker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Place `item_id` immediately before `reference_id`.
    ///
    /// If the reference has no entry in the context the story goes to the
    /// tail, not the head.
    pub fn rank_above(&self, item_id: Uuid, context_id: Uuid, reference_id: Uuid) -> Result<()> {
        self.insert_relative(item_id, context_id, reference_id, Side::Above)
    }

    /// Place `item_id` immediately after `reference_id`, or at the tail if
    /// the reference has no entry in the context.
    pub fn rank_below(&self, item_id: Uuid, context_id: Uuid, reference_id: Uuid) -> Result<()> {
        self.insert_relative(item_id, context_id, reference_id, Side::Below)
    }

    pub fn rank_to_head(&self, item_id: Uuid, context_id: Uuid) -> Result<()> {
        let (entry, mut ranks) = self.prepare(item_id, context_id)?;
        let moving = take_item(&mut ranks, item_id).unwrap_or(entry);
        ranks.insert(0, moving);
        self.resequence(context_id, &ranks)?;
        Ok(())
    }

    pub fn rank_to_bottom(&self, item_id: Uuid, context_id: Uuid) -> Result<()> {
        let (entry, mut ranks) = self.prepare(item_id, context_id)?;
        let moving = take_item(&mut ranks, item_id).unwrap_or(entry);
        ranks.push(moving);
        self.resequence(context_id, &ranks)?;
        Ok(())
    }

    pub fn rank(&self, item_id: Uuid, context_id: Uuid, placement: Placement) -> Result<()> {
        tracing::debug!(
            "Ranking item {} {} in context {}",
            item_id,
            placement.as_str(),
            context_id
        );
        match placement {
            Placement::Above(reference_id) => self.rank_above(item_id, context_id, reference_id),
            Placement::Below(reference_id) => self.rank_below(item_id, context_id, reference_id),
            Placement::Head => self.rank_to_head(item_id, context_id),
            Placement::Bottom => self.rank_to_bottom(item_id, context_id),
        }
    }

    /// Take a story out of one backlog and rank it in another.
    ///
    /// The source backlog is re-sequenced. Moving within the same backlog is
    /// a plain [`Ranker::rank`].
    pub fn move_to_context(
        &self,
        item_id: Uuid,
        from_context_id: Uuid,
        to_context_id: Uuid,
        placement: Placement,
    ) -> Result<()> {
        if from_context_id != to_context_id {
            self.remove_rank(item_id, from_context_id)?;
        }
        self.rank(item_id, to_context_id, placement)
    }

    /// Delete the story's entry in the context and close the gap.
    ///
    /// Returns `false` if the story was not ranked there.
    pub fn remove_rank(&self, item_id: Uuid, context_id: Uuid) -> Result<bool> {
        let Some(entry) = self.store.find_entry(context_id, item_id)? else {
            return Ok(false);
        };

        self.store.delete_entry(&entry)?;
        let ranks = self.load_context(context_id)?;
        self.resequence(context_id, &ranks)?;
        Ok(true)
    }

    /// Unrank a story everywhere, re-sequencing each backlog it was in.
    pub fn remove_all_ranks_for_item(&self, item_id: Uuid) -> Result<usize> {
        let entries = self.store.list_entries_for_item(item_id)?;
        for entry in &entries {
            self.store.delete_entry(entry)?;
            let ranks = self.load_context(entry.context_id)?;
            self.resequence(entry.context_id, &ranks)?;
        }

        tracing::info!(
            "Removed {} rank entries for item {}",
            entries.len(),
            item_id
        );
        Ok(entries.len())
    }

    /// Drop every entry of a backlog that is going away.
    pub fn remove_all_ranks_for_context(&self, context_id: Uuid) -> Result<usize> {
        let entries = self.store.list_entries(context_id)?;
        for entry in &entries {
            self.store.delete_entry(entry)?;
        }

        tracing::info!(
            "Removed {} rank entries for context {}",
            entries.len(),
            context_id
        );
        Ok(entries.len())
    }

    /// The stories of a backlog, top first.
    pub fn list_ordered(&self, context_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .load_context(context_id)?
            .into_iter()
            .map(|entry| entry.item_id)
            .collect())
    }

    pub fn list_entries(&self, context_id: Uuid) -> Result<Vec<RankEntry>> {
        self.load_context(context_id)
    }

    pub fn position_of(&self, item_id: Uuid, context_id: Uuid) -> Result<Option<u32>> {
        Ok(self
            .store
            .find_entry(context_id, item_id)?
            .and_then(|entry| entry.position))
    }

    fn insert_relative(
        &self,
        item_id: Uuid,
        context_id: Uuid,
        reference_id: Uuid,
        side: Side,
    ) -> Result<()> {
        let (entry, mut ranks) = self.prepare(item_id, context_id)?;

        // Ranking a story relative to itself leaves it where it is.
        if item_id == reference_id {
            tracing::debug!("Item {} ranked relative to itself, keeping position", item_id);
            self.resequence(context_id, &ranks)?;
            return Ok(());
        }

        let moving = take_item(&mut ranks, item_id).unwrap_or(entry);
        match (side, ranks.iter().position(|r| r.item_id == reference_id)) {
            (Side::Above, Some(index)) => ranks.insert(index, moving),
            (Side::Below, Some(index)) => ranks.insert(index + 1, moving),
            (_, None) => ranks.push(moving),
        }

        self.resequence(context_id, &ranks)?;
        Ok(())
    }

    /// Find or create the story's entry, then load the full context.
    fn prepare(&self, item_id: Uuid, context_id: Uuid) -> Result<(RankEntry, Vec<RankEntry>)> {
        let entry = match self.store.find_entry(context_id, item_id)? {
            Some(entry) => entry,
            None => {
                let entry = self.store.create_entry(context_id, item_id)?;
                tracing::debug!("Created rank entry {} for item {}", entry.id, item_id);
                entry
            }
        };
        let ranks = self.load_context(context_id)?;
        Ok((entry, ranks))
    }

    /// Load a context and reject entry sets that cannot be ordered.
    fn load_context(&self, context_id: Uuid) -> Result<Vec<RankEntry>> {
        let ranks = self.store.list_entries(context_id)?;

        let mut seen = HashSet::with_capacity(ranks.len());
        for entry in &ranks {
            if entry.context_id != context_id {
                return Err(RankError::ForeignEntry {
                    entry: entry.id,
                    expected: context_id,
                    found: entry.context_id,
                });
            }
            if !seen.insert(entry.item_id) {
                return Err(RankError::DuplicateEntry {
                    context: context_id,
                    item: entry.item_id,
                });
            }
        }

        Ok(ranks)
    }

    /// Assign positions `0..n` in sequence order, writing only changes.
    fn resequence(&self, context_id: Uuid, ranks: &[RankEntry]) -> Result<usize> {
        let mut changed = 0;
        for (index, entry) in ranks.iter().enumerate() {
            let position = index as u32;
            if entry.position != Some(position) {
                self.store.update_entry(entry, position)?;
                changed += 1;
            }
        }

        tracing::debug!(
            "Re-sequenced context {}: {} entries, {} moved",
            context_id,
            ranks.len(),
            changed
        );
        Ok(changed)
    }
}

/// Remove the story from the working sequence and hand back its entry.
fn take_item(ranks: &mut Vec<RankEntry>, item_id: Uuid) -> Option<RankEntry> {
    let index = ranks.iter().position(|r| r.item_id == item_id)?;
    Some(ranks.remove(index))
}
