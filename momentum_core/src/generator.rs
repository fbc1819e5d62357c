//! Weekly program generator.
//!
//! Turns user preferences into a 7-day schedule:
//! - Pick a split template from how many body parts the user targets
//! - Filter the catalog per focus day by skill level and target muscles
//! - Narrow cardio days further for endurance goals
//! - Shuffle the candidates and keep up to the configured cap

use crate::config::GeneratorConfig;
use crate::{Catalog, Exercise, Goal, UserPreferences, WorkoutDay};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const REST_DAY: &str = "Rest Day";
pub const ACTIVE_RECOVERY: &str = "Active Recovery";
const FULL_BODY_TARGET: &str = "Full Body";

/// A focus day gets at least this many exercises when the catalog has them
pub const MIN_EXERCISES_PER_DAY: usize = 4;
pub const MAX_EXERCISES_PER_DAY: usize = 6;
pub const MINUTES_PER_EXERCISE: f64 = 4.5;

/// Selection parameters
#[derive(Clone, Debug)]
pub struct GeneratorSettings {
    /// Clamped to `MIN_EXERCISES_PER_DAY..=MAX_EXERCISES_PER_DAY` when used
    pub max_exercises: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            max_exercises: MAX_EXERCISES_PER_DAY,
        }
    }
}

impl GeneratorSettings {
    fn cap(&self) -> usize {
        self.max_exercises
            .clamp(MIN_EXERCISES_PER_DAY, MAX_EXERCISES_PER_DAY)
    }
}

impl From<&GeneratorConfig> for GeneratorSettings {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            max_exercises: config.max_exercises,
        }
    }
}

/// Weekly split template
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitKind {
    /// Push / lower / pull / core & cardio / circuit, for full-body or 5+ parts
    FullBody,
    /// Primary and secondary focus days plus cardio/core and full body, for 3-4 parts
    FourDay,
    /// Primary focus twice plus cardio and full body, for 1-2 parts
    ThreeDay,
}

/// One template entry before exercises are chosen
#[derive(Clone, Debug, PartialEq)]
pub struct DayPlan {
    pub day_name: &'static str,
    pub focus: &'static str,
    pub target_muscles: Vec<String>,
}

impl DayPlan {
    fn new(day_name: &'static str, focus: &'static str, target_muscles: &[&str]) -> Self {
        Self {
            day_name,
            focus,
            target_muscles: target_muscles.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn targeting(day_name: &'static str, focus: &'static str, target_muscles: &[String]) -> Self {
        Self {
            day_name,
            focus,
            target_muscles: target_muscles.to_vec(),
        }
    }

    pub fn is_recovery(&self) -> bool {
        is_recovery_focus(self.focus)
    }
}

pub fn is_recovery_focus(focus: &str) -> bool {
    focus == REST_DAY || focus == ACTIVE_RECOVERY
}

/// Choose the split from the breadth of the selected body parts
pub fn select_split(body_parts: &[String]) -> SplitKind {
    let wants_full_body = body_parts.iter().any(|p| p == "full-body");

    if wants_full_body || body_parts.len() >= 5 {
        SplitKind::FullBody
    } else if body_parts.len() >= 3 {
        SplitKind::FourDay
    } else {
        SplitKind::ThreeDay
    }
}

/// Expand a split into its seven day plans, Monday first
pub fn split_template(kind: SplitKind, body_parts: &[String]) -> Vec<DayPlan> {
    match kind {
        SplitKind::FullBody => vec![
            DayPlan::new("Monday", "Upper Body Push", &["Chest", "Shoulders", "Arms"]),
            DayPlan::new("Tuesday", "Lower Body", &["Legs", "Glutes"]),
            DayPlan::new("Wednesday", REST_DAY, &[]),
            DayPlan::new("Thursday", "Upper Body Pull", &["Back", "Arms"]),
            DayPlan::new("Friday", "Core & Cardio", &["Abs", "Cardio"]),
            DayPlan::new("Saturday", "Full Body Circuit", &[FULL_BODY_TARGET, "Cardio"]),
            DayPlan::new("Sunday", ACTIVE_RECOVERY, &[]),
        ],
        SplitKind::FourDay => {
            let primary = &body_parts[..body_parts.len().min(2)];
            let secondary = body_parts.get(1..).unwrap_or(&[]);
            vec![
                DayPlan::targeting("Monday", "Primary Focus", primary),
                DayPlan::new("Tuesday", "Cardio & Core", &["Cardio", "Abs"]),
                DayPlan::new("Wednesday", REST_DAY, &[]),
                DayPlan::targeting("Thursday", "Secondary Focus", secondary),
                DayPlan::new("Friday", "Full Body", &[FULL_BODY_TARGET]),
                DayPlan::new("Saturday", REST_DAY, &[]),
                DayPlan::new("Sunday", ACTIVE_RECOVERY, &[]),
            ]
        }
        SplitKind::ThreeDay => vec![
            DayPlan::targeting("Monday", "Primary Focus", body_parts),
            DayPlan::new("Tuesday", "Cardio", &["Cardio"]),
            DayPlan::new("Wednesday", REST_DAY, &[]),
            DayPlan::targeting("Thursday", "Primary Focus", body_parts),
            DayPlan::new("Friday", "Full Body", &[FULL_BODY_TARGET, "Cardio"]),
            DayPlan::new("Saturday", REST_DAY, &[]),
            DayPlan::new("Sunday", ACTIVE_RECOVERY, &[]),
        ],
    }
}

/// Case-insensitive substring match in either direction, or the literal full-body target
fn targets_exercise(target: &str, exercise: &Exercise) -> bool {
    let target_lower = target.to_lowercase();
    exercise.muscle_groups.iter().any(|muscle| {
        let muscle_lower = muscle.to_lowercase();
        muscle_lower.contains(&target_lower)
            || target_lower.contains(&muscle_lower)
            || target == FULL_BODY_TARGET
    })
}

fn suits_endurance(exercise: &Exercise) -> bool {
    let name = exercise.name.to_lowercase();
    exercise.muscle_groups.iter().any(|m| m == "Cardio")
        || name.contains("burpee")
        || name.contains("mountain")
        || exercise.equipment == "Bodyweight"
}

/// Catalog exercises eligible for a focus day, in catalog order
pub fn candidates_for_day<'a>(
    catalog: &'a Catalog,
    preferences: &UserPreferences,
    plan: &DayPlan,
) -> Vec<&'a Exercise> {
    let mut candidates = catalog.filter_exercises(|exercise| {
        preferences.skill_level.accepts(exercise.difficulty)
            && plan
                .target_muscles
                .iter()
                .any(|target| targets_exercise(target, exercise))
    });

    if preferences.goal == Goal::CardioEndurance && plan.focus.contains("Cardio") {
        candidates.retain(|exercise| suits_endurance(exercise));
    }

    candidates
}

/// Estimated minutes for a workout day, rounded up
pub fn estimate_duration(exercise_count: usize) -> u32 {
    (exercise_count as f64 * MINUTES_PER_EXERCISE).ceil() as u32
}

fn day_label(day_name: &str) -> String {
    day_name.chars().take(3).collect()
}

fn recovery_day(plan: &DayPlan) -> WorkoutDay {
    WorkoutDay {
        day: day_label(plan.day_name),
        day_name: plan.day_name.to_string(),
        focus: plan.focus.to_string(),
        exercises: Vec::new(),
        is_rest_day: true,
        duration_minutes: 0,
    }
}

/// Generate a 7-day schedule using the supplied source of randomness
///
/// Preferences are assumed to be validated. A focus day with no eligible
/// exercises is returned with an empty list rather than treated as an error.
pub fn generate_weekly_program<R: Rng + ?Sized>(
    preferences: &UserPreferences,
    catalog: &Catalog,
    settings: &GeneratorSettings,
    rng: &mut R,
) -> Vec<WorkoutDay> {
    let split = select_split(&preferences.body_parts);
    tracing::info!(
        "Generating {:?} split for goal {} at {} level",
        split,
        preferences.goal,
        preferences.skill_level
    );

    split_template(split, &preferences.body_parts)
        .iter()
        .map(|plan| {
            if plan.is_recovery() {
                return recovery_day(plan);
            }

            let mut candidates = candidates_for_day(catalog, preferences, plan);
            candidates.shuffle(rng);
            candidates.truncate(settings.cap());

            if candidates.is_empty() {
                tracing::warn!(
                    "No exercises available for {} ({})",
                    plan.day_name,
                    plan.focus
                );
            } else {
                tracing::debug!(
                    "{} ({}): selected {} exercises",
                    plan.day_name,
                    plan.focus,
                    candidates.len()
                );
            }

            WorkoutDay {
                day: day_label(plan.day_name),
                day_name: plan.day_name.to_string(),
                focus: plan.focus.to_string(),
                duration_minutes: estimate_duration(candidates.len()),
                exercises: candidates.into_iter().cloned().collect(),
                is_rest_day: false,
            }
        })
        .collect()
}

/// Generate with a fixed seed when given, otherwise from OS entropy
pub fn generate_weekly_program_seeded(
    preferences: &UserPreferences,
    catalog: &Catalog,
    settings: &GeneratorSettings,
    seed: Option<u64>,
) -> Vec<WorkoutDay> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_weekly_program(preferences, catalog, settings, &mut rng)
}

/// Totals shown above a weekly schedule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeeklySummary {
    pub workout_days: usize,
    pub total_minutes: u32,
}

pub fn summarize_week(days: &[WorkoutDay]) -> WeeklySummary {
    WeeklySummary {
        workout_days: days.iter().filter(|d| !d.is_rest_day).count(),
        total_minutes: days.iter().map(|d| d.duration_minutes).sum(),
    }
}
