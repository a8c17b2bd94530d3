//! Core domain logic for the policy exporter.
//! This crate is the single source of truth for policy invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::note::{NewNote, Note, NoteId};
pub use model::policy::{
    NewPolicy, Policy, PolicyId, PolicyRecord, PolicyValidationError, Premium,
};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::policy_repo::{PolicyRepository, SqlitePolicyRepository};
pub use repo::{RepoError, RepoResult};
pub use seed::{seed_sample_data, SeedSummary};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::policy_service::{PolicyService, PolicyServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
