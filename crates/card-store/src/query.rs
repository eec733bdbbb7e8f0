/// Filter for card status reads.
///
/// Without a `since` bound every active record is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardStatusQuery {
    /// Only records with `last_updated >= since` (inclusive).
    pub since: Option<i64>,
}

impl CardStatusQuery {
    /// Creates a query for all active records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for records updated at or after `timestamp`.
    pub fn since(timestamp: i64) -> Self {
        Self {
            since: Some(timestamp),
        }
    }

    /// Returns true if a record last updated at `last_updated` passes the filter.
    pub fn matches(&self, last_updated: i64) -> bool {
        self.since.is_none_or(|since| last_updated >= since)
    }
}
