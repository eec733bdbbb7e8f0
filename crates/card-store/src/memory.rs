use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{CardStatusQuery, CardStatusRecord, Result, SectorMap, store::CardStore};

/// A row of the `cards` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub id: i64,
    pub name: String,
    pub uuid: String,
    pub size: i64,
    pub sector_size: i32,
}

impl CardRow {
    pub fn new(id: i64, name: impl Into<String>, size: i64) -> Self {
        Self {
            id,
            name: name.into(),
            uuid: format!("card-{id:08}"),
            size,
            sector_size: 512,
        }
    }
}

/// A row of the `consolidated_sector_maps` table.
///
/// A card may have several rows; only the one with `is_active` set is
/// reported.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorMapRow {
    pub id: i64,
    pub is_active: bool,
    pub consolidated_sector_map: Option<Vec<u8>>,
    pub last_updated: i64,
    pub cur_round_num: i64,
    pub round_num_offset: i64,
    pub num_bad_sectors: i64,
    pub status: i64,
    pub rate: f64,
}

impl SectorMapRow {
    /// Creates an active row with an empty map and zeroed counters.
    pub fn active(id: i64, last_updated: i64) -> Self {
        Self {
            id,
            is_active: true,
            consolidated_sector_map: Some(Vec::new()),
            last_updated,
            cur_round_num: 0,
            round_num_offset: 0,
            num_bad_sectors: 0,
            status: 0,
            rate: 0.0,
        }
    }

    /// Marks the row as a historical, non-authoritative entry.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Sets the consolidated sector map blob.
    pub fn with_map(mut self, map: impl Into<Vec<u8>>) -> Self {
        self.consolidated_sector_map = Some(map.into());
        self
    }

    /// Sets the round counter and the offset added to it on output.
    pub fn with_rounds(mut self, cur_round_num: i64, round_num_offset: i64) -> Self {
        self.cur_round_num = cur_round_num;
        self.round_num_offset = round_num_offset;
        self
    }

    /// Sets the tester state code, throughput and bad-sector count.
    pub fn with_status(mut self, status: i64, rate: f64, num_bad_sectors: i64) -> Self {
        self.status = status;
        self.rate = rate;
        self.num_bad_sectors = num_bad_sectors;
        self
    }
}

/// Orders names the way MySQL's default case-insensitive collation does,
/// with byte order breaking ties between names that differ only in case.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Default)]
struct Tables {
    cards: Vec<CardRow>,
    sector_maps: Vec<SectorMapRow>,
}

/// In-memory card store for testing.
///
/// Holds the two tables the tester writes and answers reads with the same
/// join, filter and ordering as the MySQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryCardStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCardStore {
    /// Creates a new empty in-memory card store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_card(&self, card: CardRow) {
        self.tables.write().await.cards.push(card);
    }

    pub async fn insert_sector_map(&self, row: SectorMapRow) {
        self.tables.write().await.sector_maps.push(row);
    }

    /// Returns the number of rows in `cards` and `consolidated_sector_maps`.
    pub async fn row_counts(&self) -> (usize, usize) {
        let tables = self.tables.read().await;
        (tables.cards.len(), tables.sector_maps.len())
    }

    /// Clears both tables.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.cards.clear();
        tables.sector_maps.clear();
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn card_statuses(&self, query: CardStatusQuery) -> Result<Vec<CardStatusRecord>> {
        let tables = self.tables.read().await;

        let mut records: Vec<CardStatusRecord> = tables
            .sector_maps
            .iter()
            .filter(|row| row.is_active && query.matches(row.last_updated))
            .flat_map(|row| {
                tables
                    .cards
                    .iter()
                    .filter(move |card| card.id == row.id)
                    .map(move |card| CardStatusRecord {
                        id: card.id,
                        name: card.name.clone(),
                        data: SectorMap::from(row.consolidated_sector_map.clone()),
                        last_updated: row.last_updated,
                        size: card.size,
                        status: row.status,
                        rate: row.rate,
                        num_bad_sectors: row.num_bad_sectors,
                        cur_round_num: row.cur_round_num + row.round_num_offset,
                    })
            })
            .collect();

        records.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(records)
    }
}
