//! # Likegraph - portable likes-graph store
//!
//! A small social graph (users, roles, directed "appreciates" edges)
//! persisted in a relational database, built to run with identical semantics
//! across SQL backends that disagree on identifier quoting, generated
//! primary keys and string concatenation.
//!
//! Likegraph provides:
//! - An engine dialect table producing the per-backend SQL fragments
//! - A fixed logical schema with a create/drop/reset lifecycle
//! - Entity persistence for roles and users, with database-assigned ids
//! - Directed appreciates queries and the derived mutual "friends" query
//! - Atomic replacement of a user's outgoing edge set

pub mod config;
pub mod dialect;
pub mod role;
pub mod store;
pub mod ui;
pub mod user;

// Re-exports for convenient access
pub use dialect::{ConnectTarget, Engine};
pub use role::Role;
pub use store::{DropOutcome, DropReport, DropStep, Store};
pub use user::{NewUser, User};

/// Result type alias for likegraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for likegraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A foreign-key or uniqueness constraint rejected the statement. The
    /// store never cascades or retries on these; the caller decides.
    #[error("constraint violation during {operation}")]
    Constraint {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The engine is a dialect target only; no driver for it ships with
    /// this crate.
    #[error("no bundled driver for engine {0}; only sqlite engines can be opened")]
    UnsupportedDriver(dialect::Engine),

    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
