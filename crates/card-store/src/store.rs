use async_trait::async_trait;

use crate::{CardStatusQuery, CardStatusRecord, Result};

/// Source of card status records.
///
/// Implementations return one record per card that has an active status
/// row, ordered by card name. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Reads the active card status records matching `query`.
    async fn card_statuses(&self, query: CardStatusQuery) -> Result<Vec<CardStatusRecord>>;
}
