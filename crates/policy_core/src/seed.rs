//! Opt-in sample data for demos and manual testing.
//!
//! # Invariants
//! - Nothing is seeded unless a caller asks for it.
//! - Seeding is idempotent: policies whose number already exists are
//!   skipped together with their notes.
//! - All rows are written in one transaction.

use crate::model::note::NewNote;
use crate::model::policy::{NewPolicy, Premium};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::policy_repo::{PolicyRepository, SqlitePolicyRepository};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;

struct SamplePolicy {
    policy_number: &'static str,
    premium: i64,
    start: (i32, u32, u32),
    notes: &'static [&'static str],
}

const SAMPLE_POLICIES: &[SamplePolicy] = &[
    SamplePolicy {
        policy_number: "HSCX1001",
        premium: 200,
        start: (2024, 4, 1),
        notes: &["First note for policy 1", "Second note for policy 1"],
    },
    SamplePolicy {
        policy_number: "HSCX1002",
        premium: 153,
        start: (2024, 4, 5),
        notes: &["First note for policy 2"],
    },
    SamplePolicy {
        policy_number: "HSCX1003",
        premium: 220,
        start: (2024, 3, 10),
        notes: &[
            "First note for policy 3",
            "Second note for policy 3",
            "Third note for policy 3",
        ],
    },
    SamplePolicy {
        policy_number: "HSCX1004",
        premium: 200,
        start: (2024, 5, 1),
        notes: &[],
    },
    SamplePolicy {
        policy_number: "HSCX1005",
        premium: 100,
        start: (2024, 4, 1),
        notes: &[],
    },
];

/// Counts of rows written by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub policies: usize,
    pub notes: usize,
}

/// Inserts the sample policies and notes.
///
/// Rows go straight to the repositories: the fixed sample dates are not
/// subject to the creation-time window.
pub fn seed_sample_data(conn: &mut Connection) -> RepoResult<SeedSummary> {
    let tx = conn.transaction()?;
    let mut summary = SeedSummary::default();
    {
        let policies = SqlitePolicyRepository::try_new(&tx)?;
        let notes = SqliteNoteRepository::try_new(&tx)?;

        for sample in SAMPLE_POLICIES {
            if policies.exists_by_policy_number(sample.policy_number)? {
                continue;
            }

            let (year, month, day) = sample.start;
            let start_date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                crate::repo::RepoError::InvalidData(format!(
                    "invalid sample date for `{}`",
                    sample.policy_number
                ))
            })?;
            let stored = policies.insert_policy(&NewPolicy::new(
                sample.policy_number,
                Premium::from_major(sample.premium),
                start_date,
            ))?;
            summary.policies += 1;

            for text in sample.notes {
                notes.create_note(&NewNote::new(stored.id, *text))?;
                summary.notes += 1;
            }
        }
    }
    tx.commit()?;

    info!(
        "event=db_seed module=seed status=ok policies={} notes={}",
        summary.policies, summary.notes
    );
    Ok(summary)
}
