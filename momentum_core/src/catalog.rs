//! Default catalog of exercises, categories and pre-built programs.
//!
//! The catalog is immutable once built. Core code only queries it.

use crate::types::*;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for tests that need an owned,
/// modifiable catalog.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// Library browsing filter. `None` on any field means "all".
#[derive(Clone, Debug, Default)]
pub struct ExerciseFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub equipment: Option<String>,
}

impl Catalog {
    /// Look up an exercise by id
    pub fn get_exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// All exercises matching `predicate`, in catalog order
    pub fn filter_exercises<F>(&self, predicate: F) -> Vec<&Exercise>
    where
        F: Fn(&Exercise) -> bool,
    {
        self.exercises.iter().filter(|e| predicate(e)).collect()
    }

    /// Case-insensitive search over name, description and muscle groups
    pub fn search(&self, query: &str) -> Vec<&Exercise> {
        self.filter_exercises(|e| e.matches_query(query))
    }

    pub fn category(&self, id: &str) -> Option<&ExerciseCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Apply every set field of `filter`; an unknown category matches nothing
    pub fn browse(&self, filter: &ExerciseFilter) -> Vec<&Exercise> {
        let category = filter.category.as_deref().map(|id| self.category(id));

        self.filter_exercises(|e| {
            let matches_search = filter
                .query
                .as_deref()
                .map_or(true, |q| e.matches_query(q));
            let matches_category = match category {
                None => true,
                Some(Some(cat)) => cat.exercise_ids.iter().any(|id| id == &e.id),
                Some(None) => false,
            };
            let matches_difficulty = filter.difficulty.map_or(true, |d| e.difficulty == d);
            let matches_equipment = filter
                .equipment
                .as_deref()
                .map_or(true, |eq| e.equipment.eq_ignore_ascii_case(eq));

            matches_search && matches_category && matches_difficulty && matches_equipment
        })
    }

    /// Distinct equipment names in first-seen order
    pub fn equipment_list(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.exercises
            .iter()
            .map(|e| e.equipment.as_str())
            .filter(|eq| seen.insert(*eq))
            .collect()
    }

    pub fn program(&self, id: &str) -> Option<&WorkoutProgram> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn programs_by_difficulty(&self, difficulty: Difficulty) -> Vec<&WorkoutProgram> {
        self.programs
            .iter()
            .filter(|p| p.difficulty == difficulty)
            .collect()
    }

    /// Programs targeting `category` as a muscle group or requiring it as equipment
    pub fn programs_by_category(&self, category: &str) -> Vec<&WorkoutProgram> {
        self.programs
            .iter()
            .filter(|p| {
                p.target_muscle_groups.iter().any(|m| m == category)
                    || p.equipment.iter().any(|e| e == category)
            })
            .collect()
    }

    /// Validate the catalog for structural consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    /// References to exercises missing from the catalog are not errors here;
    /// see `dangling_references`.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut exercise_ids = HashSet::new();
        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if !exercise_ids.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if exercise.muscle_groups.is_empty() {
                errors.push(format!("Exercise '{}' has no muscle groups", exercise.id));
            }
        }

        let mut program_ids = HashSet::new();
        for program in &self.programs {
            if program.id.is_empty() {
                errors.push("Program has empty ID".to_string());
            }
            if !program_ids.insert(program.id.as_str()) {
                errors.push(format!("Duplicate program ID '{}'", program.id));
            }
            if program.exercises.is_empty() {
                errors.push(format!("Program '{}' has no exercises", program.id));
            }

            let mut orders = HashSet::new();
            for entry in &program.exercises {
                if !orders.insert(entry.order) {
                    errors.push(format!(
                        "Program '{}': duplicate order {}",
                        program.id, entry.order
                    ));
                }
                if entry.sets == 0 {
                    errors.push(format!(
                        "Program '{}': entry '{}' has zero sets",
                        program.id, entry.id
                    ));
                }
            }
        }

        errors
    }

    /// Category and program references to exercises the catalog lacks
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling = Vec::new();

        for category in &self.categories {
            for id in &category.exercise_ids {
                if self.get_exercise(id).is_none() {
                    dangling.push(format!("Category '{}' references '{}'", category.id, id));
                }
            }
        }

        for program in &self.programs {
            for entry in &program.exercises {
                if self.get_exercise(&entry.exercise_id).is_none() {
                    dangling.push(format!(
                        "Program '{}' references '{}'",
                        program.id, entry.exercise_id
                    ));
                }
            }
        }

        dangling
    }
}

// ============================================================================
// Builders
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn exercise(
    id: &str,
    name: &str,
    description: &str,
    photo: u32,
    muscle_groups: &[&str],
    equipment: &str,
    difficulty: Difficulty,
    instructions: &[&str],
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        image_url: Some(format!(
            "https://images.pexels.com/photos/{0}/pexels-photo-{0}.jpeg?auto=compress&cs=tinysrgb&w=800",
            photo
        )),
        muscle_groups: muscle_groups.iter().map(|m| m.to_string()).collect(),
        equipment: equipment.into(),
        difficulty,
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
    }
}

fn category(id: &str, name: &str, description: &str, exercise_ids: &[&str]) -> ExerciseCategory {
    ExerciseCategory {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        exercise_ids: exercise_ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn entry(order: u32, exercise_id: &str, sets: u32, reps: RepTarget, rest: u32, notes: &str) -> ProgramExercise {
    ProgramExercise {
        id: order.to_string(),
        exercise_id: exercise_id.into(),
        sets,
        reps,
        rest_seconds: rest,
        order,
        notes: Some(notes.into()),
    }
}

fn reps(n: u32) -> RepTarget {
    RepTarget::Count(n)
}

fn target(text: &str) -> RepTarget {
    RepTarget::Text(text.into())
}

#[allow(clippy::too_many_arguments)]
fn program(
    id: &str,
    name: &str,
    description: &str,
    difficulty: Difficulty,
    duration_minutes: u32,
    target_muscle_groups: &[&str],
    equipment: &[&str],
    exercises: Vec<ProgramExercise>,
) -> WorkoutProgram {
    // 2024-01-01T00:00:00Z
    let published = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default();
    WorkoutProgram {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        program_type: ProgramType::PreBuilt,
        difficulty,
        duration_minutes,
        exercises,
        target_muscle_groups: target_muscle_groups.iter().map(|s| s.to_string()).collect(),
        equipment: equipment.iter().map(|s| s.to_string()).collect(),
        created_by: "system".into(),
        created_at: published,
        updated_at: published,
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    use Difficulty::*;

    // ========================================================================
    // Exercises
    // ========================================================================

    let exercises = vec![
        exercise(
            "1",
            "Push-ups",
            "Classic bodyweight exercise for chest, shoulders, and triceps",
            4162492,
            &["Chest", "Shoulders", "Arms"],
            "Bodyweight",
            Beginner,
            &[
                "Start in a plank position with hands slightly wider than shoulders",
                "Lower your body until chest nearly touches the floor",
                "Push back up to starting position",
                "Keep your body in a straight line throughout",
            ],
        ),
        exercise(
            "2",
            "Squats",
            "Fundamental lower body exercise targeting quads, glutes, and hamstrings",
            4162438,
            &["Legs", "Glutes"],
            "Bodyweight",
            Beginner,
            &[
                "Stand with feet shoulder-width apart",
                "Lower down as if sitting back into a chair",
                "Keep chest up and knees behind toes",
                "Return to standing position",
            ],
        ),
        exercise(
            "3",
            "Deadlifts",
            "Compound movement working posterior chain muscles",
            4164761,
            &["Back", "Legs", "Glutes"],
            "Barbell",
            Intermediate,
            &[
                "Stand with feet hip-width apart, bar over mid-foot",
                "Hinge at hips, grab bar with mixed or double overhand grip",
                "Drive through heels, extend hips and knees simultaneously",
                "Stand tall, then lower bar with control",
            ],
        ),
        exercise(
            "4",
            "Pull-ups",
            "Upper body pulling exercise for back and biceps",
            4164744,
            &["Back", "Arms"],
            "Pull-up bar",
            Intermediate,
            &[
                "Hang from bar with palms facing away",
                "Pull body up until chin clears the bar",
                "Lower with control to full arm extension",
                "Engage core throughout movement",
            ],
        ),
        exercise(
            "5",
            "Bench Press",
            "Classic chest-building exercise with barbell",
            4162491,
            &["Chest", "Shoulders", "Arms"],
            "Barbell",
            Intermediate,
            &[
                "Lie on bench with feet firmly on floor",
                "Grip bar slightly wider than shoulders",
                "Lower bar to chest with control",
                "Press bar up until arms are fully extended",
            ],
        ),
        exercise(
            "6",
            "Planks",
            "Isometric core strengthening exercise",
            4162451,
            &["Abs"],
            "Bodyweight",
            Beginner,
            &[
                "Start in push-up position on forearms",
                "Keep body in straight line from head to heels",
                "Engage core muscles",
                "Hold position for specified time",
            ],
        ),
        exercise(
            "7",
            "Overhead Press",
            "Shoulder and core strengthening exercise",
            4164758,
            &["Shoulders", "Arms"],
            "Barbell",
            Intermediate,
            &[
                "Stand with feet shoulder-width apart",
                "Hold bar at shoulder level",
                "Press bar overhead until arms are fully extended",
                "Lower bar back to shoulders with control",
            ],
        ),
        exercise(
            "8",
            "Lunges",
            "Unilateral leg exercise for strength and stability",
            4162505,
            &["Legs", "Glutes"],
            "Bodyweight",
            Beginner,
            &[
                "Step forward with one leg",
                "Lower hips until both knees are at 90 degrees",
                "Push back to starting position",
                "Alternate legs or complete set on one side",
            ],
        ),
        exercise(
            "9",
            "Burpees",
            "Full-body cardio exercise combining squat, push-up, and jump",
            4162483,
            &["Cardio", "Full Body"],
            "Bodyweight",
            Intermediate,
            &[
                "Start in standing position",
                "Drop into squat and place hands on floor",
                "Jump feet back to plank position",
                "Do push-up, jump feet to squat, then jump up",
            ],
        ),
        exercise(
            "10",
            "Mountain Climbers",
            "Dynamic cardio exercise targeting core and legs",
            4162515,
            &["Cardio", "Abs", "Legs"],
            "Bodyweight",
            Beginner,
            &[
                "Start in plank position",
                "Bring right knee toward chest",
                "Quickly switch and bring left knee to chest",
                "Continue alternating at a rapid pace",
            ],
        ),
        exercise(
            "11",
            "Dumbbell Rows",
            "Back strengthening exercise with dumbbells",
            4164763,
            &["Back", "Arms"],
            "Dumbbells",
            Beginner,
            &[
                "Bend over with one knee on bench",
                "Hold dumbbell in opposite hand",
                "Pull dumbbell to hip, squeezing shoulder blade",
                "Lower with control and repeat",
            ],
        ),
        exercise(
            "12",
            "Hip Thrusts",
            "Glute-focused exercise for posterior chain development",
            4162440,
            &["Glutes", "Legs"],
            "Bodyweight",
            Beginner,
            &[
                "Lie on back with knees bent",
                "Squeeze glutes and lift hips up",
                "Create straight line from knees to shoulders",
                "Lower with control and repeat",
            ],
        ),
    ];

    // ========================================================================
    // Categories
    // ========================================================================

    let categories = vec![
        category(
            "strength",
            "Strength Training",
            "Build muscle and increase strength with resistance exercises",
            &["1", "3", "4", "5", "7", "11", "14", "15", "18", "21"],
        ),
        category(
            "yoga",
            "Yoga",
            "Improve flexibility, balance, and mindfulness",
            &["yoga-1", "yoga-2", "yoga-3", "yoga-4", "yoga-5", "yoga-6"],
        ),
        category(
            "pilates",
            "Pilates",
            "Core strength and body awareness exercises",
            &["pilates-1", "pilates-2", "pilates-3", "pilates-4", "pilates-5", "pilates-6"],
        ),
        category(
            "cardio",
            "Cardio",
            "Heart-pumping exercises for endurance and fat burning",
            &["9", "13", "19", "21", "23"],
        ),
        category(
            "core",
            "Core & Abs",
            "Strengthen your core and abdominal muscles",
            &["6", "16", "20", "22", "24"],
        ),
        category(
            "flexibility",
            "Flexibility",
            "Improve mobility and range of motion",
            &["flex-1", "flex-2", "flex-3", "flex-4", "flex-5"],
        ),
        category(
            "bodyweight",
            "Bodyweight",
            "No equipment needed - exercise anywhere",
            &[
                "1", "2", "6", "8", "9", "10", "12", "13", "14", "15", "16", "17", "18", "19",
                "20", "21", "22", "23", "24",
            ],
        ),
        category(
            "beginner",
            "Beginner Friendly",
            "Perfect for those new to fitness",
            &["1", "2", "6", "8", "10", "12", "13", "16", "17", "19", "22", "24"],
        ),
    ];

    // ========================================================================
    // Pre-built Programs
    // ========================================================================

    let programs = vec![
        program(
            "beginner-strength",
            "Beginner Strength",
            "Perfect introduction to strength training with basic movements",
            Beginner,
            30,
            &["Full Body"],
            &["Bodyweight"],
            vec![
                entry(1, "1", 3, reps(8), 60, "Modify on knees if needed"),
                entry(2, "2", 3, reps(10), 60, "Keep chest up"),
                entry(3, "6", 3, target("30 seconds"), 45, "Hold straight line"),
                entry(4, "8", 2, reps(8), 60, "Alternate legs"),
                entry(5, "12", 3, reps(12), 45, "Squeeze glutes at top"),
            ],
        ),
        program(
            "intro-yoga",
            "Intro to Yoga",
            "Gentle introduction to yoga with basic poses and breathing",
            Beginner,
            25,
            &["Full Body", "Flexibility"],
            &["Bodyweight"],
            vec![
                entry(1, "yoga-6", 1, target("2 minutes"), 0, "Focus on breathing"),
                entry(2, "yoga-5", 1, target("10 reps"), 0, "Move slowly"),
                entry(3, "yoga-1", 1, target("5 breaths"), 0, "Press hands down"),
                entry(4, "yoga-2", 1, target("5 breaths each side"), 0, "Strong foundation"),
                entry(5, "yoga-3", 1, target("30 seconds each side"), 0, "Find your balance"),
                entry(6, "yoga-4", 1, target("2 minutes"), 0, "Rest and breathe"),
            ],
        ),
        program(
            "pilates-basics",
            "Pilates Basics",
            "Core-focused Pilates routine for strength and stability",
            Beginner,
            20,
            &["Core", "Abs"],
            &["Bodyweight"],
            vec![
                entry(1, "pilates-1", 1, target("100 counts"), 30, "Breathe rhythmically"),
                entry(2, "pilates-5", 1, target("8 each side"), 30, "Keep core engaged"),
                entry(3, "pilates-3", 1, target("5 each direction"), 30, "Keep hips stable"),
                entry(4, "pilates-2", 1, reps(5), 45, "Roll slowly"),
                entry(5, "pilates-4", 1, reps(6), 0, "Control the movement"),
            ],
        ),
        program(
            "4-week-full-body",
            "4-Week Full Body",
            "Progressive full-body program that builds strength over 4 weeks",
            Intermediate,
            45,
            &["Full Body"],
            &["Bodyweight", "Dumbbells"],
            vec![
                entry(1, "1", 4, reps(12), 90, "Week 1: 8 reps, Week 4: 15 reps"),
                entry(2, "2", 4, reps(15), 90, "Add weight in weeks 3-4"),
                entry(3, "3", 3, reps(8), 120, "Focus on form"),
                entry(4, "4", 3, reps(6), 120, "Use assistance if needed"),
                entry(5, "5", 3, reps(10), 90, "Progressive overload"),
                entry(6, "6", 3, target("45 seconds"), 60, "Increase time weekly"),
            ],
        ),
        program(
            "cardio-blast",
            "Cardio Blast",
            "High-energy cardio workout for fat burning and endurance",
            Intermediate,
            25,
            &["Cardio", "Full Body"],
            &["Bodyweight"],
            vec![
                entry(1, "13", 1, target("1 minute"), 30, "Warm up pace"),
                entry(2, "9", 3, reps(8), 60, "Full range of motion"),
                entry(3, "19", 1, target("45 seconds"), 30, "High knees"),
                entry(4, "10", 1, target("30 seconds"), 30, "Fast pace"),
                entry(5, "21", 3, reps(10), 60, "Explosive movement"),
                entry(6, "23", 1, target("1 minute"), 0, "Cool down"),
            ],
        ),
        program(
            "core-crusher",
            "Core Crusher",
            "Intensive core workout for strong abs and stability",
            Intermediate,
            20,
            &["Abs", "Core"],
            &["Bodyweight"],
            vec![
                entry(1, "6", 3, target("45 seconds"), 30, "Hold straight line"),
                entry(2, "16", 3, reps(20), 30, "Control the twist"),
                entry(3, "20", 2, target("30 seconds each side"), 30, "Keep hips up"),
                entry(4, "22", 3, reps(20), 30, "Alternate sides"),
                entry(5, "24", 3, reps(15), 30, "Squeeze at top"),
                entry(6, "pilates-1", 1, target("50 counts"), 0, "Finish strong"),
            ],
        ),
        program(
            "flexibility-flow",
            "Flexibility Flow",
            "Gentle stretching routine to improve mobility and reduce tension",
            Beginner,
            30,
            &["Flexibility", "Full Body"],
            &["Bodyweight"],
            vec![
                entry(1, "yoga-6", 1, target("2 minutes"), 0, "Center yourself"),
                entry(2, "flex-1", 1, target("1 minute each side"), 0, "Breathe deeply"),
                entry(3, "flex-2", 1, target("1 minute each side"), 0, "Keep back straight"),
                entry(4, "flex-3", 1, target("30 seconds each side"), 0, "Gentle pull"),
                entry(5, "flex-4", 1, target("1 minute"), 0, "Open chest"),
                entry(6, "flex-5", 1, target("1 minute each side"), 0, "Twist gently"),
                entry(7, "yoga-4", 1, target("3 minutes"), 0, "Final relaxation"),
            ],
        ),
        program(
            "upper-body-blast",
            "Upper Body Blast",
            "Comprehensive upper body workout for chest, back, shoulders, and arms",
            Intermediate,
            40,
            &["Chest", "Back", "Shoulders", "Arms"],
            &["Bodyweight", "Dumbbells"],
            vec![
                entry(1, "1", 4, reps(12), 90, "Chest focus"),
                entry(2, "4", 3, reps(8), 120, "Back strength"),
                entry(3, "7", 3, reps(10), 90, "Shoulder power"),
                entry(4, "11", 3, reps(12), 90, "Back detail"),
                entry(5, "14", 3, reps(10), 90, "Tricep focus"),
                entry(6, "18", 3, reps(12), 90, "Arm strength"),
            ],
        ),
    ];

    Catalog {
        exercises,
        categories,
        programs,
    }
}
