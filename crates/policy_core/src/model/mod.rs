//! Policy/note domain model.
//!
//! # Responsibility
//! - Define the records persisted by the storage gateway.
//! - Define the read-view returned by every policy read use-case.
//! - Own field-level validation for new policies.
//!
//! # Invariants
//! - Identities are assigned by storage and never reused.
//! - A note always belongs to exactly one policy.

pub mod date;
pub mod note;
pub mod policy;
