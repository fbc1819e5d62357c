//! Core domain types for Momentum.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises, difficulty levels and catalog groupings
//! - User preferences and profiles
//! - Generated weekly schedules
//! - Workout programs and recorded sessions

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Levels and Goals
// ============================================================================

/// Exercise difficulty, also used as the user's skill level
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

/// A user's self-assessed level shares the difficulty scale
pub type SkillLevel = Difficulty;

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
        }
    }

    /// Whether a user at this skill level is shown exercises of `difficulty`.
    ///
    /// Leniency only reaches one step down: intermediate users also get
    /// beginner work, expert users also get intermediate work. Experts never
    /// see beginner exercises.
    pub fn accepts(&self, difficulty: Difficulty) -> bool {
        matches!(
            (*self, difficulty),
            (Difficulty::Beginner, Difficulty::Beginner)
                | (Difficulty::Intermediate, Difficulty::Intermediate)
                | (Difficulty::Intermediate, Difficulty::Beginner)
                | (Difficulty::Expert, Difficulty::Expert)
                | (Difficulty::Expert, Difficulty::Intermediate)
        )
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "expert" => Ok(Difficulty::Expert),
            other => Err(Error::Validation(format!("unknown level '{}'", other))),
        }
    }
}

/// Training goal chosen in the program builder
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    WeightLoss,
    #[default]
    MuscleBuilding,
    StrengthTraining,
    CardioEndurance,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight-loss",
            Goal::MuscleBuilding => "muscle-building",
            Goal::StrengthTraining => "strength-training",
            Goal::CardioEndurance => "cardio-endurance",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weight-loss" => Ok(Goal::WeightLoss),
            "muscle-building" => Ok(Goal::MuscleBuilding),
            "strength-training" => Ok(Goal::StrengthTraining),
            "cardio-endurance" => Ok(Goal::CardioEndurance),
            other => Err(Error::Validation(format!("unknown goal '{}'", other))),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// A catalog exercise (e.g., "Push-ups")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub muscle_groups: Vec<String>,
    pub equipment: String,
    pub difficulty: Difficulty,
    pub instructions: Vec<String>,
}

impl Exercise {
    /// Case-insensitive match on name, description or any muscle group
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .muscle_groups
                .iter()
                .any(|m| m.to_lowercase().contains(&needle))
    }
}

/// A named grouping of exercise ids used for library filtering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub exercise_ids: Vec<String>,
}

/// Whether a program ships with the app or was authored by a user
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramType {
    PreBuilt,
    Custom,
}

/// Prescribed work for one set: a rep count or a free-form target
/// such as "30 seconds" or "5 breaths each side".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RepTarget {
    Count(u32),
    Text(String),
}

impl RepTarget {
    /// Split the target into (reps, duration seconds) as a completed set records it.
    ///
    /// Text targets contribute their leading number: as seconds when followed by
    /// a time unit, as reps otherwise.
    pub fn realized(&self) -> (Option<u32>, Option<u32>) {
        match self {
            RepTarget::Count(reps) => (Some(*reps), None),
            RepTarget::Text(text) => {
                let trimmed = text.trim();
                let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
                let Ok(value) = digits.parse::<u32>() else {
                    return (None, None);
                };
                let unit = trimmed[digits.len()..].trim_start().to_lowercase();
                if unit.starts_with("min") {
                    (None, Some(value.saturating_mul(60)))
                } else if unit.starts_with("sec") || unit == "s" {
                    (None, Some(value))
                } else {
                    (Some(value), None)
                }
            }
        }
    }
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepTarget::Count(reps) => write!(f, "{} reps", reps),
            RepTarget::Text(text) => f.write_str(text),
        }
    }
}

/// One entry of a program's playback list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramExercise {
    pub id: String,
    pub exercise_id: String,
    pub sets: u32,
    pub reps: RepTarget,
    pub rest_seconds: u32,
    pub order: u32,
    pub notes: Option<String>,
}

/// A complete workout program definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutProgram {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub exercises: Vec<ProgramExercise>,
    pub target_muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutProgram {
    /// Entries in playback order (ascending `order`)
    pub fn ordered_exercises(&self) -> Vec<ProgramExercise> {
        let mut entries = self.exercises.clone();
        entries.sort_by_key(|e| e.order);
        entries
    }
}

/// The static catalog of exercises, categories and pre-built programs
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
    pub categories: Vec<ExerciseCategory>,
    pub programs: Vec<WorkoutProgram>,
}

// ============================================================================
// User Types
// ============================================================================

/// Program builder input. Missing fields fall back to defaults when loaded.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    pub goal: Goal,
    pub skill_level: SkillLevel,
    pub body_parts: Vec<String>,
}

impl UserPreferences {
    /// Boundary check: the generator assumes at least one target area
    pub fn validate(&self) -> Result<()> {
        if self.body_parts.iter().all(|p| p.trim().is_empty()) {
            return Err(Error::Validation(
                "select at least one body part to target".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    PreferNotToSay,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "prefer-not-to-say" => Ok(Gender::PreferNotToSay),
            other => Err(Error::Validation(format!("unknown gender '{}'", other))),
        }
    }
}

pub const MIN_AGE: u32 = 13;
pub const MAX_AGE: u32 = 100;

/// Onboarding profile
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub age: u32,
    pub gender: Gender,
    pub fitness_goals: Vec<String>,
    pub preferred_workout_styles: Vec<String>,
    pub target_muscle_groups: Vec<String>,
    pub skill_level: SkillLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(Error::Validation("name must not be empty".into()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(Error::Validation(format!(
                "age {} outside {}..={}",
                self.age, MIN_AGE, MAX_AGE
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Schedule Types
// ============================================================================

/// One day of a generated 7-day schedule
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutDay {
    /// Short label ("Mon")
    pub day: String,
    /// Full name ("Monday")
    pub day_name: String,
    pub focus: String,
    pub exercises: Vec<Exercise>,
    pub is_rest_day: bool,
    pub duration_minutes: u32,
}

// ============================================================================
// Session Types
// ============================================================================

/// What was actually performed for one set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletedSet {
    pub set_number: u32,
    pub reps: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub completed: bool,
    pub rest_seconds: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletedExercise {
    pub exercise_id: String,
    pub sets: Vec<CompletedSet>,
    pub notes: Option<String>,
}

/// A recorded workout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub program_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<CompletedExercise>,
    pub total_duration_minutes: u32,
    pub notes: Option<String>,
}

impl WorkoutSession {
    /// Number of sets logged across all exercises
    pub fn sets_completed(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// The moment the workout counts for in history and streaks
    pub fn performed_at(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.started_at)
    }
}
