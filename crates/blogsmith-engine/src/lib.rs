//! Campaign generation engine.
//!
//! Glues the pure building blocks together into the per-campaign cycle:
//! catalog fetch and product selection, article generation, attribute
//! merging, validation, persistence, and the schedule bookkeeping around
//! them. [`sweep_due`] is the scheduler entry point; [`run_campaign`] also
//! backs manual run-now requests.
//!
//! External collaborators sit behind the [`Catalog`], [`ArticleWriter`],
//! and [`PublishHook`] traits so cycle behavior is testable without a
//! storefront or a writing model.

pub mod cycle;
pub mod deps;
pub mod error;
pub mod sweep;

pub use cycle::{run_campaign, CycleOutcome};
pub use deps::{
    ArticleWriter, Catalog, EngineConfig, EngineDeps, HttpCatalog, HttpWriter, NoopPublisher,
    PublishError, PublishHook,
};
pub use error::EngineError;
pub use sweep::{sweep_due, SweepSummary};
