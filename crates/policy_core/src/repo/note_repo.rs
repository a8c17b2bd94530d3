//! Note repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Every stored note references an existing policy (`foreign_keys=ON`).
//! - Notes for one policy are returned in `id ASC` order.

use super::{constraint_code, ensure_table_ready, RepoError, RepoResult};
use crate::model::note::{NewNote, Note};
use crate::model::policy::PolicyId;
use rusqlite::{params, Connection};

pub(crate) const NOTE_COLUMNS: &[&str] = &["id", "text", "policy_id"];

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Stores one note; `PolicyNotFound` when the owning policy is absent.
    fn create_note(&self, note: &NewNote) -> RepoResult<Note>;
    fn list_notes_for_policy(&self, policy_id: PolicyId) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "notes", NOTE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &NewNote) -> RepoResult<Note> {
        let inserted = self.conn.execute(
            "INSERT INTO notes (text, policy_id) VALUES (?1, ?2);",
            params![note.text.as_str(), note.policy_id],
        );

        if let Err(err) = inserted {
            if constraint_code(&err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                return Err(RepoError::PolicyNotFound(note.policy_id));
            }
            return Err(err.into());
        }

        Ok(Note {
            id: self.conn.last_insert_rowid(),
            text: note.text.clone(),
            policy_id: note.policy_id,
        })
    }

    fn list_notes_for_policy(&self, policy_id: PolicyId) -> RepoResult<Vec<Note>> {
        load_notes_for_policy(self.conn, policy_id)
    }
}

pub(crate) fn load_notes_for_policy(conn: &Connection, policy_id: PolicyId) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, text, policy_id
         FROM notes
         WHERE policy_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([policy_id])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(Note {
            id: row.get("id")?,
            text: row.get("text")?,
            policy_id: row.get("policy_id")?,
        });
    }
    Ok(notes)
}
