//! Versioned schema for the policy store.
//!
//! `PRAGMA user_version` holds the version of the last applied step. All
//! pending steps run inside one transaction, so a store is either moved to
//! the latest version or left exactly where it was.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by `version`, starting at 1, without gaps.
const POLICY_SCHEMA: &[Migration] = &[
    Migration {
        version: 1,
        name: "policies",
        sql: include_str!("0001_policies.sql"),
    },
    Migration {
        version: 2,
        name: "notes",
        sql: include_str!("0002_notes.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    POLICY_SCHEMA.last().map_or(0, |step| step.version)
}

/// Reads the version recorded in the store.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings `conn` up to `latest_version()`.
///
/// Fails with `UnsupportedSchemaVersion` for stores from a newer build and
/// with `Migration` when a step's SQL is rejected.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    upgrade(conn, POLICY_SCHEMA)
}

fn upgrade(conn: &mut Connection, schema: &'static [Migration]) -> DbResult<()> {
    let found = schema_version(conn)?;
    let supported = schema.last().map_or(0, |step| step.version);
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending = &schema[schema.partition_point(|step| step.version <= found)..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| {
                error!(
                    "event=db_migrate module=db status=error version={} name={} error={source}",
                    step.version, step.name
                );
                DbError::Migration {
                    version: step.version,
                    name: step.name,
                    source,
                }
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={supported} steps={}",
        pending.len()
    );
    Ok(())
}
