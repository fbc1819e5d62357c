//! Workout session controller.
//!
//! Walks a program's entries in playback order, one set at a time. The
//! controller owns no timers: the caller drives both clocks through
//! [`SessionController::tick`] (or [`SessionController::advance`]) once per
//! second, and the wall clock is only consulted to stamp start and end.

use crate::clock::{Clock, SystemClock};
use crate::types::*;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Where the controller currently stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Built but nothing has been started, completed or skipped yet
    AwaitingStart,
    /// Working on the current set (running or paused)
    InSet,
    /// Counting down rest before the next set
    Resting,
    /// The final set was completed or skipped
    Completed,
    /// The next entry references an exercise the catalog does not have
    Faulted { exercise_id: String },
}

/// Result of completing or skipping a set
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// Same exercise, next set
    NextSet {
        set_number: u32,
        rest_seconds: u32,
    },
    /// First set of the following exercise
    NextExercise {
        exercise_index: usize,
        rest_seconds: u32,
    },
    /// The session is over; hand the record to persistence
    Finished(WorkoutSession),
}

pub struct SessionController<'a, C: Clock = SystemClock> {
    catalog: &'a Catalog,
    clock: C,
    session_id: Uuid,
    program_id: String,
    user_id: String,
    entries: Vec<ProgramExercise>,
    current_exercise_index: usize,
    current_set: u32,
    started: bool,
    is_playing: bool,
    elapsed_seconds: u64,
    rest_seconds_remaining: u32,
    completed_exercises: Vec<CompletedExercise>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    missing_exercise: Option<String>,
}

impl<'a> SessionController<'a, SystemClock> {
    /// Start a session against the wall clock
    pub fn start(program: &WorkoutProgram, catalog: &'a Catalog, user_id: &str) -> Result<Self> {
        Self::new(program, catalog, user_id, SystemClock)
    }
}

impl<'a, C: Clock> SessionController<'a, C> {
    /// Prepare a session for `program`.
    ///
    /// Fails with `Error::Session` for a program without entries or with an
    /// entry of zero sets, and with `Error::ExerciseNotFound` when the first
    /// entry cannot be resolved.
    pub fn new(program: &WorkoutProgram, catalog: &'a Catalog, user_id: &str, clock: C) -> Result<Self> {
        let entries = program.ordered_exercises();
        let first = entries
            .first()
            .ok_or_else(|| Error::Session(format!("program '{}' has no exercises", program.id)))?;
        if let Some(empty) = entries.iter().find(|entry| entry.sets == 0) {
            return Err(Error::Session(format!(
                "entry '{}' of program '{}' has no sets",
                empty.id, program.id
            )));
        }
        if catalog.get_exercise(&first.exercise_id).is_none() {
            return Err(Error::ExerciseNotFound(first.exercise_id.clone()));
        }

        let started_at = clock.now();
        let session_id = Uuid::new_v4();
        tracing::debug!(
            "Session {} prepared for program '{}' ({} entries)",
            session_id,
            program.id,
            entries.len()
        );

        Ok(Self {
            catalog,
            clock,
            session_id,
            program_id: program.id.clone(),
            user_id: user_id.to_string(),
            entries,
            current_exercise_index: 0,
            current_set: 1,
            started: false,
            is_playing: false,
            elapsed_seconds: 0,
            rest_seconds_remaining: 0,
            completed_exercises: Vec::new(),
            started_at,
            completed_at: None,
            missing_exercise: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        if self.completed_at.is_some() {
            SessionPhase::Completed
        } else if let Some(exercise_id) = &self.missing_exercise {
            SessionPhase::Faulted {
                exercise_id: exercise_id.clone(),
            }
        } else if self.rest_seconds_remaining > 0 {
            SessionPhase::Resting
        } else if !self.started {
            SessionPhase::AwaitingStart
        } else {
            SessionPhase::InSet
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    pub fn current_exercise_index(&self) -> usize {
        self.current_exercise_index
    }

    /// 1-indexed set number within the current exercise
    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn total_exercises(&self) -> usize {
        self.entries.len()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn rest_seconds_remaining(&self) -> u32 {
        self.rest_seconds_remaining
    }

    pub fn completed_exercises(&self) -> &[CompletedExercise] {
        &self.completed_exercises
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Program entry for the current position
    pub fn current_entry(&self) -> Option<&ProgramExercise> {
        self.entries.get(self.current_exercise_index)
    }

    /// Catalog exercise for the current position
    pub fn current_exercise(&self) -> Result<&'a Exercise> {
        let entry = self
            .current_entry()
            .ok_or_else(|| Error::Session("no current exercise".into()))?;
        self.catalog
            .get_exercise(&entry.exercise_id)
            .ok_or_else(|| Error::ExerciseNotFound(entry.exercise_id.clone()))
    }

    /// Flip between running and paused. Returns the new running state.
    pub fn toggle_play_pause(&mut self) -> Result<bool> {
        self.ensure_active()?;
        self.started = true;
        self.is_playing = !self.is_playing;
        tracing::debug!(
            "Session {} {}",
            self.session_id,
            if self.is_playing { "running" } else { "paused" }
        );
        Ok(self.is_playing)
    }

    /// Record the current set as performed, then move on
    pub fn complete_set(&mut self) -> Result<SessionEvent> {
        self.ensure_active()?;
        let entry = &self.entries[self.current_exercise_index];
        let (reps, duration_seconds) = entry.reps.realized();
        let set = CompletedSet {
            set_number: self.current_set,
            reps,
            duration_seconds,
            completed: true,
            rest_seconds: Some(entry.rest_seconds),
        };
        let exercise_id = entry.exercise_id.clone();

        match self
            .completed_exercises
            .iter_mut()
            .find(|c| c.exercise_id == exercise_id)
        {
            Some(existing) => existing.sets.push(set),
            None => self.completed_exercises.push(CompletedExercise {
                exercise_id,
                sets: vec![set],
                notes: None,
            }),
        }

        self.move_on()
    }

    /// Move on without recording the current set
    pub fn skip(&mut self) -> Result<SessionEvent> {
        self.ensure_active()?;
        self.move_on()
    }

    /// End the current rest immediately
    pub fn skip_rest(&mut self) -> Result<()> {
        self.ensure_active()?;
        if self.rest_seconds_remaining > 0 {
            tracing::debug!(
                "Rest skipped with {}s remaining",
                self.rest_seconds_remaining
            );
            self.rest_seconds_remaining = 0;
        }
        Ok(())
    }

    /// One second of wall time.
    ///
    /// Elapsed time only accumulates while playing; rest counts down either
    /// way. Returns true when this tick ended a rest period.
    pub fn tick(&mut self) -> bool {
        if self.completed_at.is_some() || self.missing_exercise.is_some() {
            return false;
        }
        if self.is_playing {
            self.elapsed_seconds += 1;
        }
        if self.rest_seconds_remaining > 0 {
            self.rest_seconds_remaining -= 1;
            if self.rest_seconds_remaining == 0 {
                tracing::debug!("Rest over, back to set {}", self.current_set);
                return true;
            }
        }
        false
    }

    /// `seconds` ticks in a row. Returns true if a rest period ended along the way.
    pub fn advance(&mut self, seconds: u32) -> bool {
        let mut rest_ended = false;
        for _ in 0..seconds {
            rest_ended |= self.tick();
        }
        rest_ended
    }

    /// Abandon the session. Nothing is recorded.
    pub fn cancel(self) {
        tracing::info!(
            "Session {} for '{}' cancelled after {}s",
            self.session_id,
            self.program_id,
            self.elapsed_seconds
        );
    }

    fn ensure_active(&self) -> Result<()> {
        if self.completed_at.is_some() {
            return Err(Error::Session(format!(
                "session {} is already completed",
                self.session_id
            )));
        }
        if let Some(exercise_id) = &self.missing_exercise {
            return Err(Error::ExerciseNotFound(exercise_id.clone()));
        }
        Ok(())
    }

    fn move_on(&mut self) -> Result<SessionEvent> {
        self.started = true;
        self.rest_seconds_remaining = 0;

        let entry = &self.entries[self.current_exercise_index];
        let rest_seconds = entry.rest_seconds;
        let last_set = self.current_set >= entry.sets;
        let last_exercise = self.current_exercise_index + 1 >= self.entries.len();

        if last_set && last_exercise {
            return Ok(SessionEvent::Finished(self.finalize()));
        }

        if !last_set {
            self.current_set += 1;
            self.rest_seconds_remaining = rest_seconds;
            return Ok(SessionEvent::NextSet {
                set_number: self.current_set,
                rest_seconds,
            });
        }

        self.current_exercise_index += 1;
        self.current_set = 1;
        let next_id = self.entries[self.current_exercise_index].exercise_id.clone();
        if self.catalog.get_exercise(&next_id).is_none() {
            tracing::warn!(
                "Program '{}' references unknown exercise '{}'",
                self.program_id,
                next_id
            );
            self.is_playing = false;
            self.missing_exercise = Some(next_id.clone());
            return Err(Error::ExerciseNotFound(next_id));
        }

        self.rest_seconds_remaining = rest_seconds;
        Ok(SessionEvent::NextExercise {
            exercise_index: self.current_exercise_index,
            rest_seconds,
        })
    }

    fn finalize(&mut self) -> WorkoutSession {
        let completed_at = self.clock.now();
        self.completed_at = Some(completed_at);
        self.is_playing = false;

        let session = WorkoutSession {
            id: self.session_id,
            program_id: self.program_id.clone(),
            user_id: self.user_id.clone(),
            started_at: self.started_at,
            completed_at: Some(completed_at),
            exercises: self.completed_exercises.clone(),
            total_duration_minutes: (self.elapsed_seconds / 60) as u32,
            notes: None,
        };
        tracing::info!(
            "Session {} for '{}' finished: {} sets in {} min",
            session.id,
            session.program_id,
            session.sets_completed(),
            session.total_duration_minutes
        );
        session
    }
}
