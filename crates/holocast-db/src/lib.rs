//! Project persistence for Holocast.
//!
//! `ProjectStore` is the single seam between the HTTP/worker layers and
//! whatever holds project records. The Postgres implementation is the
//! production backend; the in-memory implementation backs tests and
//! single-process deployments without a database.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryProjectStore;
pub use postgres::PostgresProjectStore;
pub use traits::{ClaimOutcome, ProjectStore, StoreError, StoreResult};
