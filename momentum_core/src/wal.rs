//! Append-only session log.
//!
//! Finished workouts are appended to a JSONL (JSON Lines) file under an
//! exclusive file lock, one session per line.

use crate::store::StorageAvailability;
use crate::{Result, WorkoutSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Where finished sessions are handed off to
pub trait SessionSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
    availability: StorageAvailability,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            availability: StorageAvailability::Available,
        }
    }

    /// Appends become no-ops when storage is unavailable
    pub fn with_availability(mut self, availability: StorageAvailability) -> Self {
        self.availability = availability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()> {
        if !self.availability.is_available() {
            tracing::debug!("Storage unavailable, session {} not logged", session.id);
            return Ok(());
        }

        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended session {} to {:?}", session.id, self.path);
        Ok(())
    }
}

/// In-memory sink, handy for front-ends without a data directory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub sessions: Vec<WorkoutSession>,
}

impl SessionSink for MemorySink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()> {
        self.sessions.push(session.clone());
        Ok(())
    }
}

/// Read every session in a log file. Unparseable lines are skipped.
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    let sessions = parse_sessions(&contents);
    tracing::debug!("Read {} sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

/// Parse log contents line by line, skipping blank and unreadable lines
pub(crate) fn parse_sessions(contents: &str) -> Vec<WorkoutSession> {
    let mut sessions = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Skipping unreadable session at line {}: {}", line_num + 1, e);
            }
        }
    }

    sessions
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{CompletedExercise, CompletedSet};
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    /// A finished session `days_ago` days before now
    pub(crate) fn finished_session(program_id: &str, days_ago: i64) -> WorkoutSession {
        let completed_at: DateTime<Utc> = Utc::now() - Duration::days(days_ago);
        WorkoutSession {
            id: Uuid::new_v4(),
            program_id: program_id.into(),
            user_id: "local-user".into(),
            started_at: completed_at - Duration::minutes(30),
            completed_at: Some(completed_at),
            exercises: vec![CompletedExercise {
                exercise_id: "1".into(),
                sets: vec![CompletedSet {
                    set_number: 1,
                    reps: Some(8),
                    duration_seconds: None,
                    completed: true,
                    rest_seconds: Some(60),
                }],
                notes: None,
            }],
            total_duration_minutes: 30,
            notes: None,
        }
    }

    #[test]
    fn test_append_and_read_single_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");

        let session = finished_session("beginner-strength", 0);
        let mut sink = JsonlSink::new(&log_path);
        sink.append(&session).unwrap();

        let sessions = read_sessions(&log_path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session.id);
        assert_eq!(sessions[0].exercises, session.exercises);
    }

    #[test]
    fn test_append_multiple_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("sessions.jsonl");

        let mut sink = JsonlSink::new(&log_path);
        for _ in 0..5 {
            sink.append(&finished_session("core-crusher", 1)).unwrap();
        }

        assert_eq!(read_sessions(&log_path).unwrap().len(), 5);
    }

    #[test]
    fn test_unavailable_storage_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");

        let mut sink =
            JsonlSink::new(&log_path).with_availability(StorageAvailability::Unavailable);
        sink.append(&finished_session("core-crusher", 0)).unwrap();

        assert!(!log_path.exists());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&finished_session("a", 0)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        sink.append(&finished_session("b", 0)).unwrap();

        let sessions = read_sessions(&log_path).unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sessions = read_sessions(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_memory_sink_keeps_sessions() {
        let mut sink = MemorySink::default();
        sink.append(&finished_session("a", 0)).unwrap();
        assert_eq!(sink.sessions.len(), 1);
    }
}
