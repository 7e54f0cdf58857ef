use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, RankError>;

/// Ranking errors.
///
/// A missing story or reference is never an error: those resolve to
/// auto-creation or tail placement. What remains is either the store failing
/// or the store handing back an entry set that cannot be ordered.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Duplicate rank entry for item {item} in context {context}")]
    DuplicateEntry { context: Uuid, item: Uuid },

    #[error("Rank entry {entry} belongs to context {found}, expected {expected}")]
    ForeignEntry {
        entry: Uuid,
        expected: Uuid,
        found: Uuid,
    },
}

impl RankError {
    /// Wrap any store-specific failure.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }

    /// Whether the loaded ordering itself was inconsistent.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateEntry { .. } | Self::ForeignEntry { .. }
        )
    }
}

impl From<rusqlite::Error> for RankError {
    fn from(err: rusqlite::Error) -> Self {
        Self::storage(err)
    }
}
