//! `store` crate — marketplace records, the query spec handed to storage, and
//! the `RecordStore` trait every backend implements.
//!
//! The engine crate only ever talks to storage through [`RecordStore`]; the
//! `db` crate provides the Postgres implementation and [`mock::InMemoryStore`]
//! backs tests.

pub mod error;
pub mod models;
pub mod query;
pub mod traits;
pub mod mock;

pub use error::StoreError;
pub use models::{
    Ad, AdId, AdPatch, AdStatus, Category, CategoryId, InsertOutcome, NewAd, NewRepairRequest,
    RepairRequest, RepairRequestId, RepairStatus, Role, User, UserId,
};
pub use query::{EqualityFilters, FilterSpec, RepairRequestFilter, SortDirection, SortKey};
pub use traits::RecordStore;
