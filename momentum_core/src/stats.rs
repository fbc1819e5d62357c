//! Workout statistics and streaks.
//!
//! Days are calendar days in UTC. Several sessions on the same day count
//! once towards a streak but individually towards totals.

use crate::WorkoutSession;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    /// Consecutive workout days ending today or yesterday
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Sessions in the 7 calendar days ending today
    pub workouts_this_week: usize,
    /// Sessions in the 30 calendar days ending today
    pub workouts_this_month: usize,
    /// Mean session length in whole minutes, rounded
    pub average_workout_duration: u32,
    pub total_duration: u32,
    pub last_workout_date: Option<DateTime<Utc>>,
}

pub fn calculate_stats(sessions: &[WorkoutSession], today: NaiveDate) -> WorkoutStats {
    if sessions.is_empty() {
        return WorkoutStats::default();
    }

    let days: BTreeSet<NaiveDate> = sessions
        .iter()
        .map(|s| s.performed_at().date_naive())
        .collect();

    let within = |span: i64| {
        let first_day = today - Duration::days(span - 1);
        sessions
            .iter()
            .filter(|s| {
                let day = s.performed_at().date_naive();
                day >= first_day && day <= today
            })
            .count()
    };

    let total_duration: u32 = sessions.iter().map(|s| s.total_duration_minutes).sum();
    let average = (f64::from(total_duration) / sessions.len() as f64).round() as u32;

    WorkoutStats {
        total_workouts: sessions.len(),
        current_streak: current_streak(&days, today),
        longest_streak: longest_streak(&days),
        workouts_this_week: within(7),
        workouts_this_month: within(30),
        average_workout_duration: average,
        total_duration,
        last_workout_date: sessions.iter().map(|s| s.performed_at()).max(),
    }
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
