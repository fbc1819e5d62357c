//! Session history from the live log and the CSV archive.

use crate::{Result, WorkoutSession};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// Archived row as written by the rollup
#[derive(Debug, Deserialize)]
struct ArchivedRow {
    id: String,
    program_id: String,
    user_id: String,
    started_at: String,
    completed_at: Option<String>,
    duration_minutes: u32,
}

impl TryFrom<ArchivedRow> for WorkoutSession {
    type Error = crate::Error;

    fn try_from(row: ArchivedRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let started_at = DateTime::parse_from_rfc3339(&row.started_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let completed_at = row
            .completed_at
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(WorkoutSession {
            id,
            program_id: row.program_id,
            user_id: row.user_id,
            started_at,
            completed_at,
            exercises: vec![], // per-set detail stays in the processed log
            total_duration_minutes: row.duration_minutes,
            notes: None,
        })
    }
}

/// Sessions performed in the last `days` days, newest first
pub fn load_recent_sessions(
    log_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<WorkoutSession>> {
    let cutoff = Utc::now() - Duration::days(days);
    let sessions = load_sessions_since(log_path, csv_path, Some(cutoff))?;
    tracing::info!(
        "Loaded {} sessions from the last {} days",
        sessions.len(),
        days
    );
    Ok(sessions)
}

/// Every recorded session, newest first
pub fn load_all_sessions(log_path: &Path, csv_path: &Path) -> Result<Vec<WorkoutSession>> {
    load_sessions_since(log_path, csv_path, None)
}

/// Union of log and archive, deduplicated by id. The log copy wins.
fn load_sessions_since(
    log_path: &Path,
    csv_path: &Path,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<WorkoutSession>> {
    let in_window = |s: &WorkoutSession| cutoff.map_or(true, |c| s.performed_at() >= c);
    let mut sessions = Vec::new();
    let mut seen_ids = HashSet::new();

    if log_path.exists() {
        for session in crate::wal::read_sessions(log_path)? {
            if in_window(&session) && seen_ids.insert(session.id) {
                sessions.push(session);
            }
        }
        tracing::debug!("Loaded {} sessions from log", sessions.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for session in load_sessions_from_csv(csv_path)? {
            if in_window(&session) && seen_ids.insert(session.id) {
                sessions.push(session);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} sessions from CSV", csv_count);
    }

    sessions.sort_by(|a, b| b.performed_at().cmp(&a.performed_at()));
    Ok(sessions)
}

fn load_sessions_from_csv(path: &Path) -> Result<Vec<WorkoutSession>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sessions = Vec::new();
    for result in reader.deserialize::<ArchivedRow>() {
        match result {
            Ok(row) => match WorkoutSession::try_from(row) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::tests::finished_session;
    use crate::wal::{JsonlSink, SessionSink};

    #[test]
    fn test_load_recent_sessions_from_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&finished_session("a", 1)).unwrap();
        sink.append(&finished_session("b", 3)).unwrap();
        sink.append(&finished_session("c", 10)).unwrap();

        assert_eq!(load_recent_sessions(&log_path, &csv_path, 7).unwrap().len(), 2);
        assert_eq!(load_all_sessions(&log_path, &csv_path).unwrap().len(), 3);
    }

    #[test]
    fn test_archived_sessions_are_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let session = finished_session("core-crusher", 2);
        let mut sink = JsonlSink::new(&log_path);
        sink.append(&session).unwrap();
        crate::csv_rollup::log_to_csv_and_archive(&log_path, &csv_path).unwrap();

        let sessions = load_all_sessions(&log_path, &csv_path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session.id);
        assert_eq!(sessions[0].program_id, "core-crusher");
        assert_eq!(sessions[0].total_duration_minutes, 30);
        assert_eq!(
            sessions[0].completed_at.map(|t| t.timestamp()),
            session.completed_at.map(|t| t.timestamp())
        );
    }

    #[test]
    fn test_deduplication_across_log_and_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let session = finished_session("a", 1);
        let mut sink = JsonlSink::new(&log_path);
        sink.append(&session).unwrap();
        crate::csv_rollup::log_to_csv_and_archive(&log_path, &csv_path).unwrap();

        // Same session logged again, as after an interrupted rollup
        let mut sink = JsonlSink::new(&log_path);
        sink.append(&session).unwrap();

        let sessions = load_recent_sessions(&log_path, &csv_path, 7).unwrap();
        assert_eq!(sessions.iter().filter(|s| s.id == session.id).count(), 1);
        // The log copy keeps per-set detail
        assert_eq!(sessions[0].exercises.len(), 1);
    }

    #[test]
    fn test_sessions_sorted_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&finished_session("old", 5)).unwrap();
        sink.append(&finished_session("new", 1)).unwrap();

        let sessions = load_recent_sessions(&log_path, &csv_path, 7).unwrap();
        assert_eq!(sessions[0].program_id, "new");
        assert_eq!(sessions[1].program_id, "old");
    }
}
