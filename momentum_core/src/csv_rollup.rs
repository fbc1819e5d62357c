//! Archiving of the session log into CSV.
//!
//! The whole rollup runs under an exclusive lock on the log, so appends from
//! other processes wait for it and land in the emptied log afterwards. The
//! CSV is synced to disk before the log is emptied, so a crash in between
//! leaves the log in place and a rerun only duplicates rows (history loading
//! deduplicates by id).

use crate::{Result, WorkoutSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

/// One archived session
#[derive(Debug, serde::Serialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub program_id: String,
    pub user_id: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub duration_minutes: u32,
    pub exercise_count: usize,
    pub set_count: usize,
}

impl From<&WorkoutSession> for CsvRow {
    fn from(session: &WorkoutSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            program_id: session.program_id.clone(),
            user_id: session.user_id.clone(),
            started_at: session.started_at.to_rfc3339(),
            completed_at: session.completed_at.map(|t| t.to_rfc3339()),
            duration_minutes: session.total_duration_minutes,
            exercise_count: session.exercises.len(),
            set_count: session.sets_completed(),
        }
    }
}

/// Append every logged session to `csv_path` and empty the log
///
/// The raw log lines are appended to `<name>.jsonl.processed` before the log
/// is truncated, so they can be recovered by hand. The log file itself stays
/// in place: a writer already waiting on its lock keeps a valid handle.
/// Returns the number of sessions archived.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    if !log_path.exists() {
        tracing::info!("No session log at {:?} to roll up", log_path);
        return Ok(0);
    }

    let log = OpenOptions::new().read(true).write(true).open(log_path)?;
    log.lock_exclusive()?;
    let archived = archive_locked(&log, log_path, csv_path);
    log.unlock()?;
    archived
}

fn archive_locked(mut log: &File, log_path: &Path, csv_path: &Path) -> Result<usize> {
    let mut contents = String::new();
    log.read_to_string(&mut contents)?;
    let sessions = crate::wal::parse_sessions(&contents);

    if sessions.is_empty() {
        tracing::info!("No sessions in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only for a fresh file
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in &sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to CSV", sessions.len());

    let processed_path = log_path.with_extension("jsonl.processed");
    let mut processed = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&processed_path)?;
    processed.write_all(contents.as_bytes())?;
    processed.sync_all()?;

    log.set_len(0)?;
    log.sync_all()?;

    tracing::info!("Archived session log to {:?}", processed_path);

    Ok(sessions.len())
}

/// Remove archived `.processed` logs from `dir`
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed logs", count);
    }

    Ok(count)
}
