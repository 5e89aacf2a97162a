//! Schema migrations for the state database.
//!
//! Applied versions are recorded in `_migrations`; each pending migration
//! runs once, in order, inside its own transaction.

use rusqlite::Connection;

use super::error::StateError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_job_runs_table",
        sql: include_str!("sql/001_create_job_runs.sql"),
    },
    Migration {
        version: 2,
        description: "create_run_checkpoint_table",
        sql: include_str!("sql/002_create_run_checkpoint.sql"),
    },
    Migration {
        version: 3,
        description: "create_record_state_table",
        sql: include_str!("sql/003_create_record_state.sql"),
    },
    Migration {
        version: 4,
        description: "index_record_state_last_seen",
        sql: include_str!("sql/004_index_record_state_last_seen.sql"),
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &mut Connection) -> Result<(), StateError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running state migration v{}: {}",
            migration.version,
            migration.description
        );

        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|e| StateError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;
        tx.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
        tx.commit()?;
    }

    Ok(())
}
