use clap::{Parser, Subcommand};
use momentum_core::generator::summarize_week;
use momentum_core::recommend::DEFAULT_RECOMMENDATIONS;
use momentum_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "momentum")]
#[command(about = "Weekly workout planner and session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate this week's schedule (default)
    Plan {
        /// weight-loss, muscle-building, strength-training or cardio-endurance
        #[arg(long)]
        goal: Option<Goal>,

        /// beginner, intermediate or expert
        #[arg(long)]
        level: Option<Difficulty>,

        /// Body part to target; repeat for several, or use full-body
        #[arg(long = "body-part")]
        body_parts: Vec<String>,

        /// Seed for a reproducible schedule
        #[arg(long)]
        seed: Option<u64>,

        /// Don't store the given preferences
        #[arg(long)]
        no_save: bool,
    },

    /// Browse the exercise library
    Exercises {
        #[arg(long)]
        search: Option<String>,

        /// Category id (strength, yoga, cardio, ...)
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        difficulty: Option<Difficulty>,

        #[arg(long)]
        equipment: Option<String>,
    },

    /// List pre-built programs
    Programs {
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Only programs suited to the saved profile
        #[arg(long)]
        recommended: bool,
    },

    /// Run a workout session for a program
    Start {
        program_id: String,

        /// Complete every set without prompting (for testing)
        #[arg(long, conflicts_with = "auto_skip")]
        auto_complete: bool,

        /// Skip every set without prompting (for testing)
        #[arg(long, conflicts_with = "auto_complete")]
        auto_skip: bool,
    },

    /// Manage favorite exercises
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// Manage the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Show workout statistics and streaks
    Stats,

    /// Archive the session log into CSV
    Rollup {
        /// Remove archived logs afterwards
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    Add { exercise_id: String },
    Remove { exercise_id: String },
    List,
}

#[derive(Subcommand)]
enum ProfileAction {
    Set {
        #[arg(long)]
        name: String,

        #[arg(long)]
        age: u32,

        #[arg(long)]
        gender: Option<Gender>,

        #[arg(long)]
        level: Option<Difficulty>,

        /// Muscle group to focus on; repeatable
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Fitness goal; repeatable
        #[arg(long = "goal")]
        goals: Vec<String>,
    },
    Show,
}

/// Everything a command needs to reach storage
struct Context {
    config: Config,
    paths: DataPaths,
    availability: StorageAvailability,
}

impl Context {
    fn user_store(&self) -> UserStore {
        UserStore::new(&self.paths.user_file, self.availability)
    }
}

fn main() {
    momentum_core::logging::init_with_level("warn");

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let ctx = Context {
        paths: DataPaths::new(&data_dir),
        availability: StorageAvailability::from_config(&config),
        config,
    };

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    match cli.command {
        Some(Commands::Plan {
            goal,
            level,
            body_parts,
            seed,
            no_save,
        }) => cmd_plan(&ctx, catalog, goal, level, body_parts, seed, no_save),
        Some(Commands::Exercises {
            search,
            category,
            difficulty,
            equipment,
        }) => cmd_exercises(
            &ctx,
            catalog,
            ExerciseFilter {
                query: search,
                category,
                difficulty,
                equipment,
            },
        ),
        Some(Commands::Programs {
            difficulty,
            recommended,
        }) => cmd_programs(&ctx, catalog, difficulty, recommended),
        Some(Commands::Start {
            program_id,
            auto_complete,
            auto_skip,
        }) => cmd_start(&ctx, catalog, &program_id, auto_complete, auto_skip),
        Some(Commands::Favorite { action }) => cmd_favorite(&ctx, catalog, action),
        Some(Commands::Profile { action }) => cmd_profile(&ctx, action),
        Some(Commands::Stats) => cmd_stats(&ctx),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&ctx, cleanup),
        None => cmd_plan(&ctx, catalog, None, None, Vec::new(), None, true),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_plan(
    ctx: &Context,
    catalog: &Catalog,
    goal: Option<Goal>,
    level: Option<Difficulty>,
    body_parts: Vec<String>,
    seed: Option<u64>,
    no_save: bool,
) -> Result<()> {
    let store = ctx.user_store();
    let saved = store.load_preferences();
    let overridden = goal.is_some() || level.is_some() || !body_parts.is_empty();

    let preferences = match (overridden, saved) {
        (true, saved) => {
            let mut preferences = saved.unwrap_or_default();
            if let Some(goal) = goal {
                preferences.goal = goal;
            }
            if let Some(level) = level {
                preferences.skill_level = level;
            }
            if !body_parts.is_empty() {
                preferences.body_parts = body_parts;
            }
            preferences.validate()?;

            if !no_save {
                if let Err(e) = store.save_preferences(&preferences) {
                    tracing::debug!("Saving preferences to {:?} failed: {:?}", store.path(), e);
                    eprintln!("! Could not save preferences: {}", e);
                }
            }
            preferences
        }
        (false, Some(preferences)) => {
            preferences.validate()?;
            preferences
        }
        (false, None) => {
            println!("No saved preferences yet.");
            println!("Try: momentum plan --goal muscle-building --level beginner --body-part full-body");
            return Ok(());
        }
    };

    let settings = GeneratorSettings::from(&ctx.config.generator);
    let seed = seed.or(ctx.config.generator.seed);
    let week = generate_weekly_program_seeded(&preferences, catalog, &settings, seed);

    display_week(&preferences, &week);
    Ok(())
}

fn cmd_exercises(ctx: &Context, catalog: &Catalog, filter: ExerciseFilter) -> Result<()> {
    let favorites = ctx.user_store().favorites();
    let exercises = catalog.browse(&filter);

    if exercises.is_empty() {
        println!("No exercises match.");
        return Ok(());
    }

    for exercise in exercises {
        let star = if favorites.contains(&exercise.id) { "*" } else { " " };
        println!(
            "{} {:>3}  {:<20} {:<13} {:<12} {}",
            star,
            exercise.id,
            exercise.name,
            exercise.difficulty,
            exercise.equipment,
            exercise.muscle_groups.join(", ")
        );
    }
    Ok(())
}

fn cmd_programs(
    ctx: &Context,
    catalog: &Catalog,
    difficulty: Option<Difficulty>,
    recommended: bool,
) -> Result<()> {
    let programs: Vec<&WorkoutProgram> = if recommended {
        let profile = ctx.user_store().load_profile();
        if profile.is_none() {
            println!("No profile saved; showing the first programs.");
        }
        recommend_programs(catalog, profile.as_ref(), DEFAULT_RECOMMENDATIONS)
    } else {
        match difficulty {
            Some(d) => catalog.programs_by_difficulty(d),
            None => catalog.programs.iter().collect(),
        }
    };

    for program in programs {
        let missing = program
            .exercises
            .iter()
            .filter(|e| catalog.get_exercise(&e.exercise_id).is_none())
            .count();
        print!(
            "{:<18} {:<18} {:<13} {:>3} min  {} exercises",
            program.id,
            program.name,
            program.difficulty,
            program.duration_minutes,
            program.exercises.len()
        );
        if missing > 0 {
            print!("  ({} unavailable)", missing);
        }
        println!();
    }
    Ok(())
}

fn cmd_start(
    ctx: &Context,
    catalog: &Catalog,
    program_id: &str,
    auto_complete: bool,
    auto_skip: bool,
) -> Result<()> {
    let program = catalog
        .program(program_id)
        .ok_or_else(|| Error::Other(format!("No program with id '{}'", program_id)))?;

    let mut controller = SessionController::start(program, catalog, &ctx.config.user.id)?;
    println!("\n{} ({} exercises)", program.name, controller.total_exercises());

    let mut last_input = Instant::now();
    loop {
        // Wall time since the last prompt drives both timers
        let waited = last_input.elapsed().as_secs();
        controller.advance(u32::try_from(waited).unwrap_or(u32::MAX));
        last_input = Instant::now();

        let action = if auto_complete {
            SessionAction::Complete
        } else if auto_skip {
            SessionAction::Skip
        } else {
            display_position(&controller)?;
            match prompt_session_action(&controller)? {
                // Enter during rest only ends the rest
                SessionAction::Complete if controller.phase() == SessionPhase::Resting => {
                    SessionAction::SkipRest
                }
                action => action,
            }
        };

        let outcome = match action {
            SessionAction::Complete => controller.complete_set(),
            SessionAction::Skip => controller.skip(),
            SessionAction::SkipRest => {
                controller.skip_rest()?;
                continue;
            }
            SessionAction::TogglePlay => {
                let playing = controller.toggle_play_pause()?;
                println!("{}", if playing { "▶ Running" } else { "⏸ Paused" });
                continue;
            }
            SessionAction::Cancel => {
                controller.cancel();
                println!("\nWorkout cancelled. Nothing was recorded.");
                return Ok(());
            }
        };

        match outcome {
            Ok(SessionEvent::NextSet {
                set_number,
                rest_seconds,
            }) => {
                if !auto_complete && !auto_skip {
                    println!("  Set {} next, rest {}s", set_number, rest_seconds);
                }
            }
            Ok(SessionEvent::NextExercise { rest_seconds, .. }) => {
                if !auto_complete && !auto_skip {
                    println!("  Next exercise, rest {}s", rest_seconds);
                }
            }
            Ok(SessionEvent::Finished(session)) => {
                finish_session(ctx, &session);
                return Ok(());
            }
            Err(Error::ExerciseNotFound(id)) => {
                eprintln!(
                    "\nExercise '{}' is not in the catalog; the session was abandoned.",
                    id
                );
                controller.cancel();
                return Err(Error::ExerciseNotFound(id));
            }
            Err(e) => return Err(e),
        }

        if auto_complete || auto_skip {
            controller.skip_rest()?;
        }
    }
}

/// Hand the session to the log. Failure to save doesn't undo the workout.
fn finish_session(ctx: &Context, session: &WorkoutSession) {
    let mut sink =
        JsonlSink::new(&ctx.paths.session_log).with_availability(ctx.availability);
    match sink.append(session) {
        Ok(()) if ctx.availability.is_available() => {
            tracing::info!("Session {} logged to {:?}", session.id, sink.path());
            println!("\n✓ Workout complete and logged!");
        }
        Ok(()) => println!("\n✓ Workout complete (storage disabled, not logged)"),
        Err(e) => {
            tracing::debug!("Append of session {} to {:?} failed: {:?}", session.id, sink.path(), e);
            println!("\n✓ Workout complete");
            eprintln!("! Could not save session: {}", e);
        }
    }
    println!(
        "  {} exercises, {} sets, {} min",
        session.exercises.len(),
        session.sets_completed(),
        session.total_duration_minutes
    );
}

fn cmd_favorite(ctx: &Context, catalog: &Catalog, action: FavoriteAction) -> Result<()> {
    let store = ctx.user_store();
    match action {
        FavoriteAction::Add { exercise_id } => {
            let exercise = catalog
                .get_exercise(&exercise_id)
                .ok_or_else(|| Error::ExerciseNotFound(exercise_id.clone()))?;
            if store.add_favorite(&exercise.id)? {
                println!("✓ Added {} to favorites", exercise.name);
            } else {
                println!("{} is already a favorite", exercise.name);
            }
        }
        FavoriteAction::Remove { exercise_id } => {
            if store.remove_favorite(&exercise_id)? {
                println!("✓ Removed {} from favorites", exercise_id);
            } else {
                println!("{} was not a favorite", exercise_id);
            }
        }
        FavoriteAction::List => {
            let favorites = store.favorites();
            if favorites.is_empty() {
                println!("No favorite exercises yet.");
            }
            for id in favorites {
                match catalog.get_exercise(&id) {
                    Some(exercise) => println!("{:>3}  {}", exercise.id, exercise.name),
                    None => println!("{:>3}  (no longer in the catalog)", id),
                }
            }
        }
    }
    Ok(())
}

fn cmd_profile(ctx: &Context, action: ProfileAction) -> Result<()> {
    let store = ctx.user_store();
    match action {
        ProfileAction::Set {
            name,
            age,
            gender,
            level,
            targets,
            goals,
        } => {
            let now = chrono::Utc::now();
            let mut profile = store.load_profile().unwrap_or_else(|| UserProfile {
                id: ctx.config.user.id.clone(),
                created_at: now,
                ..Default::default()
            });
            profile.full_name = name;
            profile.age = age;
            profile.updated_at = now;
            if let Some(gender) = gender {
                profile.gender = gender;
            }
            if let Some(level) = level {
                profile.skill_level = level;
            }
            if !targets.is_empty() {
                profile.target_muscle_groups = targets;
            }
            if !goals.is_empty() {
                profile.fitness_goals = goals;
            }

            store.save_profile(&profile)?;
            println!("✓ Profile saved for {}", profile.full_name);
        }
        ProfileAction::Show => match store.load_profile() {
            Some(profile) => {
                println!("Name:    {}", profile.full_name);
                println!("Age:     {}", profile.age);
                println!("Level:   {}", profile.skill_level);
                if !profile.target_muscle_groups.is_empty() {
                    println!("Targets: {}", profile.target_muscle_groups.join(", "));
                }
                if !profile.fitness_goals.is_empty() {
                    println!("Goals:   {}", profile.fitness_goals.join(", "));
                }
            }
            None => println!("No profile saved."),
        },
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> Result<()> {
    let sessions = if ctx.availability.is_available() {
        load_all_sessions(&ctx.paths.session_log, &ctx.paths.session_csv)?
    } else {
        Vec::new()
    };
    let stats = calculate_stats(&sessions, chrono::Utc::now().date_naive());

    println!("Total workouts:   {}", stats.total_workouts);
    println!("Current streak:   {} days", stats.current_streak);
    println!("Longest streak:   {} days", stats.longest_streak);
    println!("This week:        {}", stats.workouts_this_week);
    println!("This month:       {}", stats.workouts_this_month);
    println!("Average duration: {} min", stats.average_workout_duration);
    println!("Total time:       {} min", stats.total_duration);
    match stats.last_workout_date {
        Some(date) => println!("Last workout:     {}", date.format("%Y-%m-%d")),
        None => println!("Last workout:     never"),
    }
    Ok(())
}

fn cmd_rollup(ctx: &Context, cleanup: bool) -> Result<()> {
    let log_path = &ctx.paths.session_log;
    let csv_path = &ctx.paths.session_csv;

    if !log_path.exists() {
        println!("No session log found - nothing to roll up.");
        return Ok(());
    }

    let count = momentum_core::csv_rollup::log_to_csv_and_archive(log_path, csv_path)?;
    tracing::info!("Rolled {} sessions from {:?} into {:?}", count, log_path, csv_path);

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = momentum_core::csv_rollup::cleanup_processed_logs(&ctx.paths.log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed logs", cleaned);
        }
    }

    Ok(())
}

fn display_week(preferences: &UserPreferences, week: &[WorkoutDay]) {
    println!(
        "\nYour week: {} / {} / {}",
        preferences.goal,
        preferences.skill_level,
        preferences.body_parts.join(", ")
    );
    println!("─────────────────────────────────────────");

    for day in week {
        if day.is_rest_day {
            println!("{:<10} {}", day.day_name, day.focus);
            continue;
        }

        println!("{:<10} {} (~{} min)", day.day_name, day.focus, day.duration_minutes);
        if day.exercises.is_empty() {
            println!("           no exercises available");
        }
        for exercise in &day.exercises {
            println!("           → {} ({})", exercise.name, exercise.equipment);
        }
    }

    let summary = summarize_week(week);
    println!("─────────────────────────────────────────");
    println!(
        "{} workout days, {} min total",
        summary.workout_days, summary.total_minutes
    );
}

fn display_position<C: Clock>(controller: &SessionController<'_, C>) -> Result<()> {
    if controller.phase() == SessionPhase::Resting {
        println!("\n  Resting: {}s left", controller.rest_seconds_remaining());
        return Ok(());
    }

    let exercise = controller.current_exercise()?;
    let Some(entry) = controller.current_entry() else {
        return Ok(());
    };
    println!(
        "\n[{}/{}] {}  set {}/{}  {}",
        controller.current_exercise_index() + 1,
        controller.total_exercises(),
        exercise.name,
        controller.current_set(),
        entry.sets,
        entry.reps
    );
    if controller.current_set() == 1 {
        for (i, step) in exercise.instructions.iter().enumerate() {
            println!("    {}. {}", i + 1, step);
        }
        if let Some(notes) = &entry.notes {
            println!("    Note: {}", notes);
        }
    }
    Ok(())
}

enum SessionAction {
    Complete,
    Skip,
    SkipRest,
    TogglePlay,
    Cancel,
}

fn prompt_session_action<C: Clock>(controller: &SessionController<'_, C>) -> Result<SessionAction> {
    println!("─────────────────────────────────────────");
    println!(
        "Enter: complete set  s: skip  r: skip rest  p: {}  q: quit",
        if controller.is_playing() { "pause" } else { "start" }
    );
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        // stdin closed
        return Ok(SessionAction::Cancel);
    }

    let action = match input.trim().to_lowercase().as_str() {
        "s" => SessionAction::Skip,
        "r" => SessionAction::SkipRest,
        "p" => SessionAction::TogglePlay,
        "q" => SessionAction::Cancel,
        _ => SessionAction::Complete,
    };

    Ok(action)
}
