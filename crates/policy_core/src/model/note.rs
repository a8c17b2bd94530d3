//! Note domain model.

use crate::model::policy::PolicyId;
use serde::{Deserialize, Serialize};

/// Storage-assigned note identity.
pub type NoteId = i64;

/// Free-text note owned by one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Owning policy. Always references an existing row.
    pub policy_id: PolicyId,
}

/// Insert shape for a note; identity is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub policy_id: PolicyId,
    pub text: String,
}

impl NewNote {
    pub fn new(policy_id: PolicyId, text: impl Into<String>) -> Self {
        Self {
            policy_id,
            text: text.into(),
        }
    }
}
