//! MySQL integration tests
//!
//! These tests share one MySQL container and reset its tables per test.
//! Run with:
//!
//! ```bash
//! cargo test -p card-store --test mysql_integration
//! ```

use std::sync::Arc;

use card_store::{
    CardRow, CardStatusQuery, CardStore, CardStoreError, MySqlCardStore, MySqlSettings,
    SectorMapRow,
};
use serial_test::serial;
use sqlx::{Connection, MySqlConnection};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::mysql::Mysql;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Mysql>,
    settings: MySqlSettings,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Mysql::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(3306).await.unwrap();

            let settings = MySqlSettings {
                host: host.to_string(),
                port,
                user: "root".to_string(),
                password: String::new(),
                database: "test".to_string(),
            };

            let mut conn = MySqlConnection::connect_with(&settings.connect_options())
                .await
                .unwrap();

            for statement in include_str!("fixtures/collector_schema.sql")
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                sqlx::query(statement).execute(&mut conn).await.unwrap();
            }

            conn.close().await.unwrap();

            Arc::new(ContainerInfo {
                container,
                settings,
            })
        })
        .await
        .clone()
}

/// Opens a seeding connection on cleared tables and returns it with a store.
async fn get_test_store() -> (MySqlConnection, MySqlCardStore) {
    let info = get_container_info().await;

    let mut conn = MySqlConnection::connect_with(&info.settings.connect_options())
        .await
        .unwrap();

    for table in ["cards", "consolidated_sector_maps"] {
        sqlx::query(&format!("TRUNCATE TABLE {table}"))
            .execute(&mut conn)
            .await
            .unwrap();
    }

    (conn, MySqlCardStore::new(&info.settings))
}

async fn insert_card(conn: &mut MySqlConnection, card: &CardRow) {
    sqlx::query("INSERT INTO cards (id, name, uuid, size, sector_size) VALUES (?, ?, ?, ?, ?)")
        .bind(card.id)
        .bind(&card.name)
        .bind(&card.uuid)
        .bind(card.size)
        .bind(card.sector_size)
        .execute(&mut *conn)
        .await
        .unwrap();
}

async fn insert_sector_map(conn: &mut MySqlConnection, row: &SectorMapRow) {
    sqlx::query(
        r#"
        INSERT INTO consolidated_sector_maps
            (id, is_active, consolidated_sector_map, last_updated, cur_round_num,
             round_num_offset, num_bad_sectors, status, rate)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(row.id)
    .bind(row.is_active)
    .bind(row.consolidated_sector_map.as_deref())
    .bind(row.last_updated)
    .bind(row.cur_round_num)
    .bind(row.round_num_offset)
    .bind(row.num_bad_sectors)
    .bind(row.status)
    .bind(row.rate)
    .execute(&mut *conn)
    .await
    .unwrap();
}

async fn seed_three_cards(conn: &mut MySqlConnection) {
    insert_card(conn, &CardRow::new(1, "sd-zulu", 64_000_000_000)).await;
    insert_card(conn, &CardRow::new(2, "sd-alpha", 8_000_000_000)).await;
    insert_card(conn, &CardRow::new(3, "sd-mike", 16_000_000_000)).await;

    insert_sector_map(conn, &SectorMapRow::active(1, 1_700_000_300)).await;
    insert_sector_map(conn, &SectorMapRow::active(2, 1_700_000_100)).await;
    insert_sector_map(conn, &SectorMapRow::active(3, 1_700_000_200)).await;
}

#[tokio::test]
#[serial]
async fn returns_all_active_records_ordered_by_name() {
    let (mut conn, store) = get_test_store().await;
    seed_three_cards(&mut conn).await;

    let records = store.card_statuses(CardStatusQuery::new()).await.unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["sd-alpha", "sd-mike", "sd-zulu"]);
}

#[tokio::test]
#[serial]
async fn name_ordering_ignores_case() {
    let (mut conn, store) = get_test_store().await;
    insert_card(&mut conn, &CardRow::new(1, "Beta", 1)).await;
    insert_card(&mut conn, &CardRow::new(2, "alpha", 1)).await;
    insert_card(&mut conn, &CardRow::new(3, "Charlie", 1)).await;
    for id in 1..=3 {
        insert_sector_map(&mut conn, &SectorMapRow::active(id, 1)).await;
    }

    let records = store.card_statuses(CardStatusQuery::new()).await.unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["alpha", "Beta", "Charlie"]);
}

#[tokio::test]
#[serial]
async fn since_filter_is_inclusive() {
    let (mut conn, store) = get_test_store().await;
    seed_three_cards(&mut conn).await;

    let records = store
        .card_statuses(CardStatusQuery::since(1_700_000_200))
        .await
        .unwrap();

    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, [3, 1]);
    assert!(records.iter().all(|r| r.last_updated >= 1_700_000_200));
}

#[tokio::test]
#[serial]
async fn inactive_rows_are_excluded() {
    let (mut conn, store) = get_test_store().await;
    insert_card(&mut conn, &CardRow::new(5, "sd-history", 4_000_000_000)).await;
    insert_sector_map(
        &mut conn,
        &SectorMapRow::active(5, 10).with_status(1, 1.0, 99).inactive(),
    )
    .await;
    insert_sector_map(&mut conn, &SectorMapRow::active(5, 20).with_status(4, 2.5, 3)).await;

    let records = store.card_statuses(CardStatusQuery::new()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].last_updated, 20);
    assert_eq!(records[0].status, 4);
    assert_eq!(records[0].num_bad_sectors, 3);
    assert_eq!(records[0].rate, 2.5);
}

#[tokio::test]
#[serial]
async fn cur_round_num_sums_stored_columns() {
    let (mut conn, store) = get_test_store().await;
    insert_card(&mut conn, &CardRow::new(1, "sd-rounds", 1_000_000)).await;
    insert_sector_map(&mut conn, &SectorMapRow::active(1, 1).with_rounds(7, 35)).await;

    let records = store.card_statuses(CardStatusQuery::new()).await.unwrap();

    assert_eq!(records[0].cur_round_num, 42);
    assert_eq!(records[0].size, 1_000_000);
}

#[tokio::test]
#[serial]
async fn sector_map_bytes_survive_round_trip() {
    let (mut conn, store) = get_test_store().await;
    let map: Vec<u8> = (0..5000u32).map(|i| (i % 256) as u8).collect();
    insert_card(&mut conn, &CardRow::new(1, "sd-map", 1)).await;
    insert_sector_map(&mut conn, &SectorMapRow::active(1, 1).with_map(map.clone())).await;

    let records = store.card_statuses(CardStatusQuery::new()).await.unwrap();

    assert_eq!(records[0].data.as_bytes(), map.as_slice());
}

#[tokio::test]
#[serial]
async fn null_sector_map_reads_as_empty() {
    let (mut conn, store) = get_test_store().await;
    let mut row = SectorMapRow::active(1, 1);
    row.consolidated_sector_map = None;
    insert_card(&mut conn, &CardRow::new(1, "sd-null", 1)).await;
    insert_sector_map(&mut conn, &row).await;

    let records = store.card_statuses(CardStatusQuery::new()).await.unwrap();

    assert!(records[0].data.as_bytes().is_empty());
    assert_eq!(records[0].data.to_base64(), "");
}

#[tokio::test]
#[serial]
async fn missing_tables_surface_as_query_error() {
    let info = get_container_info().await;
    let settings = MySqlSettings {
        database: "information_schema".to_string(),
        ..info.settings.clone()
    };
    let store = MySqlCardStore::new(&settings);

    let result = store.card_statuses(CardStatusQuery::new()).await;

    assert!(matches!(result, Err(CardStoreError::Query(_))));
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let settings = MySqlSettings {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..Default::default()
    };
    let store = MySqlCardStore::new(&settings);

    let result = store.card_statuses(CardStatusQuery::new()).await;

    assert!(matches!(result, Err(CardStoreError::Connection(_))));
}
