#![forbid(unsafe_code)]

//! Core domain model and business logic for Momentum.
//!
//! This crate provides:
//! - Domain types (exercises, programs, preferences, sessions)
//! - The built-in exercise catalog
//! - Weekly program generation
//! - The workout session controller
//! - Persistence (session log, CSV archive, user document)
//! - History, statistics and recommendations

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod clock;
pub mod generator;
pub mod session;
pub mod store;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod stats;
pub mod recommend;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseFilter};
pub use config::Config;
pub use clock::{Clock, ManualClock, SystemClock};
pub use generator::{generate_weekly_program, generate_weekly_program_seeded, GeneratorSettings};
pub use session::{SessionController, SessionEvent, SessionPhase};
pub use store::{DataPaths, StorageAvailability, UserStore};
pub use wal::{JsonlSink, SessionSink};
pub use history::{load_all_sessions, load_recent_sessions};
pub use stats::{calculate_stats, WorkoutStats};
pub use recommend::recommend_programs;
