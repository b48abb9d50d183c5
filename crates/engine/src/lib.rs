//! `engine` crate — the marketplace decision layer: the ad listing query
//! builder, the repair-request workflow, and ad creation rules.
//!
//! Nothing here talks to a database directly; every read and write goes
//! through a [`store::RecordStore`].

pub mod error;
pub mod filter;
pub mod repair;
pub mod ads;

pub use error::EngineError;
pub use filter::build_filter;
pub use repair::{RepairOutcome, RepairWorkflow};
pub use ads::{AdDraft, AdService};
