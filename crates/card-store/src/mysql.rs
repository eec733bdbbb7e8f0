use std::time::Instant;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};

use crate::{
    CardStatusQuery, CardStatusRecord, CardStoreError, MySqlSettings, Result, SectorMap,
    store::CardStore,
};

const SELECT_ACTIVE_STATUSES: &str = r#"
    SELECT CAST(a.id AS SIGNED) AS id,
           a.name AS name,
           CAST(a.size AS SIGNED) AS size,
           CAST(b.status AS SIGNED) AS status,
           b.rate AS rate,
           CAST(b.cur_round_num + b.round_num_offset AS SIGNED) AS cur_round_num,
           CAST(b.num_bad_sectors AS SIGNED) AS num_bad_sectors,
           b.consolidated_sector_map AS data,
           CAST(b.last_updated AS SIGNED) AS last_updated
    FROM cards a
    JOIN consolidated_sector_maps b ON a.id = b.id
    WHERE b.is_active = 1"#;

/// MySQL-backed card store.
///
/// Every read opens its own connection and closes it before returning;
/// nothing is pooled between requests.
#[derive(Debug, Clone)]
pub struct MySqlCardStore {
    options: MySqlConnectOptions,
}

impl MySqlCardStore {
    /// Creates a store that connects with the given settings.
    pub fn new(settings: &MySqlSettings) -> Self {
        Self::from_options(settings.connect_options())
    }

    /// Creates a store from prepared sqlx connect options.
    pub fn from_options(options: MySqlConnectOptions) -> Self {
        Self { options }
    }

    fn build_sql(query: &CardStatusQuery) -> String {
        let mut sql = String::from(SELECT_ACTIVE_STATUSES);
        if query.since.is_some() {
            sql.push_str(" AND b.last_updated >= ?");
        }
        sql.push_str(" ORDER BY name");
        sql
    }

    fn row_to_record(row: MySqlRow) -> std::result::Result<CardStatusRecord, sqlx::Error> {
        Ok(CardStatusRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            data: SectorMap::from(row.try_get::<Option<Vec<u8>>, _>("data")?),
            last_updated: row.try_get("last_updated")?,
            size: row.try_get("size")?,
            status: row.try_get("status")?,
            rate: row.try_get("rate")?,
            num_bad_sectors: row.try_get("num_bad_sectors")?,
            cur_round_num: row.try_get("cur_round_num")?,
        })
    }

    async fn fetch(
        conn: &mut MySqlConnection,
        query: CardStatusQuery,
    ) -> std::result::Result<Vec<CardStatusRecord>, sqlx::Error> {
        let sql = Self::build_sql(&query);

        let mut sqlx_query = sqlx::query(&sql);
        if let Some(since) = query.since {
            sqlx_query = sqlx_query.bind(since);
        }

        let rows = sqlx_query.fetch_all(&mut *conn).await?;
        rows.into_iter().map(Self::row_to_record).collect()
    }
}

#[async_trait]
impl CardStore for MySqlCardStore {
    #[tracing::instrument(skip(self))]
    async fn card_statuses(&self, query: CardStatusQuery) -> Result<Vec<CardStatusRecord>> {
        let started = Instant::now();

        let mut conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(CardStoreError::Connection)?;

        let result = Self::fetch(&mut conn, query).await;

        // Closed on success and on query failure alike.
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "failed to close MySQL connection cleanly");
        }

        let records = result.map_err(CardStoreError::Query)?;

        metrics::histogram!("card_status_query_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(count = records.len(), "read card status records");

        Ok(records)
    }
}
