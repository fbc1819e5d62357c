//! Program recommendations for the dashboard.

use crate::{Catalog, UserProfile, WorkoutProgram};

/// How many programs the dashboard shows
pub const DEFAULT_RECOMMENDATIONS: usize = 3;

/// Pre-built programs suited to `profile`, in catalog order.
///
/// Without a profile the first `limit` programs are returned. Otherwise a
/// program qualifies when its difficulty equals the profile's skill level,
/// or, for a profile with at least one fitness goal, when its name mentions
/// a goal or it targets one of the profile's muscle groups.
///
/// Goals match the lowercased program name with their first `-` read as a
/// space. Profile muscle groups are compared as stored against the
/// lowercased program muscle groups.
pub fn recommend_programs<'a>(
    catalog: &'a Catalog,
    profile: Option<&UserProfile>,
    limit: usize,
) -> Vec<&'a WorkoutProgram> {
    let Some(profile) = profile else {
        return catalog.programs.iter().take(limit).collect();
    };

    let goals: Vec<String> = profile
        .fitness_goals
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.replacen('-', " ", 1))
        .collect();

    let picks: Vec<&WorkoutProgram> = catalog
        .programs
        .iter()
        .filter(|program| {
            program.difficulty == profile.skill_level || matches_goal(program, profile, &goals)
        })
        .take(limit)
        .collect();

    tracing::debug!(
        "Recommended {} programs for skill level {}",
        picks.len(),
        profile.skill_level
    );
    picks
}

fn matches_goal(program: &WorkoutProgram, profile: &UserProfile, goals: &[String]) -> bool {
    let name = program.name.to_lowercase();
    goals.iter().any(|goal| {
        name.contains(goal.as_str())
            || program
                .target_muscle_groups
                .iter()
                .any(|m| profile.target_muscle_groups.contains(&m.to_lowercase()))
    })
}
