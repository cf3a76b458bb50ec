//! ClickHouse-backed analytics store.

mod clickhouse_store;

pub use clickhouse_store::ClickHouseStore;
