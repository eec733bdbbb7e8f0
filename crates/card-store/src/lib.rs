//! Read-only access to the card health records kept by the card tester.
//!
//! The tester writes one row per card into `cards` and keeps its current
//! sector map, speed and round counters in `consolidated_sector_maps`. This
//! crate joins the two into [`CardStatusRecord`]s for reporting.

pub mod error;
pub mod memory;
pub mod mysql;
pub mod query;
pub mod record;
pub mod settings;
pub mod store;

pub use error::{CardStoreError, Result};
pub use memory::{CardRow, InMemoryCardStore, SectorMapRow};
pub use mysql::MySqlCardStore;
pub use query::CardStatusQuery;
pub use record::{CardStatusRecord, SectorMap};
pub use settings::MySqlSettings;
pub use store::CardStore;
