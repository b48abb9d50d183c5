//! `db` crate — Postgres persistence layer.
//!
//! Provides a connection pool, typed row structs, repository functions for
//! every table in the marketplace schema, and [`PgStore`], the
//! [`store::RecordStore`] implementation built on top of them. No business
//! logic lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;
pub mod pg_store;

pub use pool::DbPool;
pub use error::DbError;
pub use pg_store::PgStore;
