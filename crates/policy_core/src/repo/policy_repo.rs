//! Policy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/lookup/list/range APIs over the `policies` table.
//! - Attach each policy's notes when building read-views.
//!
//! # Invariants
//! - `policy_number` uniqueness is a storage constraint; a violation is
//!   reported as `RepoError::DuplicatePolicyNumber`, never as a raw DB error.
//! - Lists are ordered by `id ASC` (insertion order).
//! - Persisted premiums must be positive and dates must parse; anything
//!   else is `RepoError::InvalidData`.

use super::note_repo::load_notes_for_policy;
use super::{constraint_code, ensure_table_ready};
use crate::db::DbError;
use crate::model::policy::{NewPolicy, Policy, PolicyId, PolicyRecord, Premium};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const POLICY_SELECT_SQL: &str = "SELECT
    id,
    policy_number,
    premium,
    start_date
FROM policies";

const POLICY_COLUMNS: &[&str] = &["id", "policy_number", "premium", "start_date"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for policy/note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    DuplicatePolicyNumber(String),
    PolicyNotFound(PolicyId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicatePolicyNumber(number) => {
                write!(f, "policy number already stored: `{number}`")
            }
            Self::PolicyNotFound(id) => write!(f, "policy not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage gateway contract consumed by the policy service.
pub trait PolicyRepository {
    /// Persists a policy and returns it with its assigned id.
    fn insert_policy(&self, policy: &NewPolicy) -> RepoResult<Policy>;
    /// Case-sensitive exact match on `policy_number`.
    fn exists_by_policy_number(&self, policy_number: &str) -> RepoResult<bool>;
    fn get_policy(&self, id: PolicyId) -> RepoResult<Option<PolicyRecord>>;
    fn list_policies(&self) -> RepoResult<Vec<PolicyRecord>>;
    /// Policies with `start <= start_date <= end`.
    fn list_policies_by_start_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<PolicyRecord>>;
}

/// SQLite-backed policy repository.
pub struct SqlitePolicyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePolicyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails with `MissingRequiredTable`/`MissingRequiredColumn` when the
    /// schema is not in place.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "policies", POLICY_COLUMNS)?;
        ensure_table_ready(conn, "notes", super::note_repo::NOTE_COLUMNS)?;
        Ok(Self { conn })
    }

    fn load_records(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<PolicyRecord>> {
        let policies = {
            let mut stmt = self.conn.prepare(sql)?;
            let mut rows = stmt.query(bind)?;
            let mut policies = Vec::new();
            while let Some(row) = rows.next()? {
                policies.push(parse_policy_row(row)?);
            }
            policies
        };

        policies
            .into_iter()
            .map(|policy| {
                let notes = load_notes_for_policy(self.conn, policy.id)?;
                Ok(PolicyRecord::from_policy(policy, notes))
            })
            .collect()
    }
}

impl PolicyRepository for SqlitePolicyRepository<'_> {
    fn insert_policy(&self, policy: &NewPolicy) -> RepoResult<Policy> {
        let inserted = self.conn.execute(
            "INSERT INTO policies (
                policy_number,
                premium,
                start_date
            ) VALUES (?1, ?2, ?3);",
            params![
                policy.policy_number.as_str(),
                policy.premium.to_string(),
                policy.start_date,
            ],
        );

        if let Err(err) = inserted {
            if constraint_code(&err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
                return Err(RepoError::DuplicatePolicyNumber(
                    policy.policy_number.clone(),
                ));
            }
            return Err(err.into());
        }

        Ok(Policy {
            id: self.conn.last_insert_rowid(),
            policy_number: policy.policy_number.clone(),
            premium: policy.premium,
            start_date: policy.start_date,
        })
    }

    fn exists_by_policy_number(&self, policy_number: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM policies
                WHERE policy_number = ?1
            );",
            [policy_number],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_policy(&self, id: PolicyId) -> RepoResult<Option<PolicyRecord>> {
        let mut records = self.load_records(
            &format!("{POLICY_SELECT_SQL} WHERE id = ?1;"),
            [id],
        )?;
        Ok(records.pop())
    }

    fn list_policies(&self) -> RepoResult<Vec<PolicyRecord>> {
        self.load_records(&format!("{POLICY_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn list_policies_by_start_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<PolicyRecord>> {
        let (start, end) = clamp_to_stored_range(start, end);
        self.load_records(
            &format!(
                "{POLICY_SELECT_SQL}
                 WHERE start_date >= ?1
                   AND start_date <= ?2
                 ORDER BY id ASC;"
            ),
            params![start, end],
        )
    }
}

// Dates are stored as `YYYY-MM-DD` text, which only orders correctly for
// four-digit years; bounds beyond that range are pulled in to its edges.
fn clamp_to_stored_range(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(0, 1, 1).unwrap_or(NaiveDate::MIN);
    let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
    (start.clamp(first, last), end.clamp(first, last))
}

fn parse_policy_row(row: &Row<'_>) -> RepoResult<Policy> {
    let id: PolicyId = row.get("id")?;

    let premium_text: String = row.get("premium")?;
    let premium = premium_text
        .parse::<Premium>()
        .ok()
        .filter(|premium| premium.is_positive())
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid premium `{premium_text}` in policies.premium for id {id}"
            ))
        })?;

    let start_text: String = row.get("start_date")?;
    let start_date = NaiveDate::parse_from_str(&start_text, "%Y-%m-%d").map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{start_text}` in policies.start_date for id {id}"
        ))
    })?;

    Ok(Policy {
        id,
        policy_number: row.get("policy_number")?,
        premium,
        start_date,
    })
}
