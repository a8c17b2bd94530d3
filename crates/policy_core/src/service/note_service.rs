//! Note use-case service.
//!
//! Notes are attached to existing policies only; the HTTP surface never
//! creates them, seeding and tests do.

use crate::model::note::{NewNote, Note};
use crate::model::policy::PolicyId;
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NoteServiceError {
    /// Owning policy does not exist.
    PolicyNotFound(PolicyId),
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PolicyNotFound(id) => write!(f, "policy not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::PolicyNotFound(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PolicyNotFound(id) => Self::PolicyNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Attaches a note to an existing policy.
    pub fn add_note(
        &self,
        policy_id: PolicyId,
        text: impl Into<String>,
    ) -> Result<Note, NoteServiceError> {
        Ok(self.repo.create_note(&NewNote::new(policy_id, text))?)
    }

    pub fn notes_for_policy(&self, policy_id: PolicyId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes_for_policy(policy_id)?)
    }
}
