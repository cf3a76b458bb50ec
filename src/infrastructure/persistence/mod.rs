//! PostgreSQL-backed persistence for the durable alias map.

mod pg_alias_repository;

pub use pg_alias_repository::PgAliasRepository;
