use std::error::Error;
use std::path::PathBuf;

use chrono::SecondsFormat;
use clap::{ArgGroup, Parser, Subcommand};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use vimdrill::app_dirs::AppDirs;
use vimdrill::config::{Config, ConfigStore, FileConfigStore};
use vimdrill::motion::{self, Command as Keys};
use vimdrill::practice::PracticeSelector;
use vimdrill::stats::{self, ModuleProgress};
use vimdrill::validation::{self, format_solutions_hint};
use vimdrill::{Catalog, ExerciseKind, FileStatsStore, Position, StatsStore, UserStats};

/// headless vim motion trainer: simulate motions, judge answers, track practice
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Simulates vim motions against a buffer, judges answers to the built-in exercises, and keeps mastery-weighted practice statistics."
)]
pub struct Cli {
    /// directory holding stats.json (default: ~/.config/vimdrill)
    #[clap(long, global = true)]
    stats_dir: Option<PathBuf>,

    /// seed for practice draws, for repeatable selections
    #[clap(long, global = true)]
    seed: Option<u64>,

    /// read exercises from this directory instead of the built-in corpus
    #[clap(long, global = true)]
    catalog_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// print where the cursor lands after running a command string
    Simulate {
        /// starting line (zero-based)
        #[clap(long, default_value_t = 0)]
        line: usize,

        /// starting column (zero-based)
        #[clap(long, default_value_t = 0)]
        col: usize,

        /// one buffer line; repeat for more lines
        #[clap(long = "code", required = true)]
        code: Vec<String>,

        /// also print how the command string was tokenized
        #[clap(long)]
        tokens: bool,

        /// keystrokes, e.g. "2w" or "f=;"
        #[clap(allow_hyphen_values = true)]
        commands: String,
    },
    /// judge an answer to an exercise without recording it
    Validate {
        exercise: String,
        #[clap(allow_hyphen_values = true)]
        answer: String,
    },
    /// draw practice exercises for a module from the saved stats
    Practice {
        module: String,

        /// number of draws
        #[clap(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// record a practice result and save it
    #[clap(group(ArgGroup::new("verdict").required(true).args(["correct", "wrong"])))]
    Record {
        exercise: String,

        #[clap(long)]
        correct: bool,

        #[clap(long)]
        wrong: bool,
    },
    /// summary of saved stats
    Stats,
    /// modules in unlock order with their readiness
    Modules,
    /// delete saved stats
    Reset,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = FileConfigStore::new()
        .load()
        .merged(cli.stats_dir.clone(), cli.seed, cli.catalog_dir.clone());
    debug!(?config, "resolved configuration");
    run(cli.command, &config)
}

fn run(command: Command, config: &Config) -> Result<(), Box<dyn Error>> {
    let store = FileStatsStore::in_dir(AppDirs::stats_dir(config.stats_dir.as_deref()));
    match command {
        Command::Simulate {
            line,
            col,
            code,
            tokens,
            commands,
        } => simulate(Position::new(line, col), &code, &commands, tokens),
        Command::Validate { exercise, answer } => {
            let catalog = Catalog::open(config.catalog_dir.as_deref())?;
            validate(&catalog, &exercise, &answer)
        }
        Command::Practice { module, count } => {
            let catalog = Catalog::open(config.catalog_dir.as_deref())?;
            practice(&catalog, &store, &module, count, config.seed)
        }
        Command::Record {
            exercise, correct, ..
        } => {
            let catalog = Catalog::open(config.catalog_dir.as_deref())?;
            record(&catalog, &store, &exercise, correct)
        }
        Command::Stats => {
            print_stats(&store.load().unwrap_or_default());
            Ok(())
        }
        Command::Modules => {
            let catalog = Catalog::open(config.catalog_dir.as_deref())?;
            print_modules(&catalog, &store.load().unwrap_or_default());
            Ok(())
        }
        Command::Reset => {
            store.reset()?;
            println!("stats reset: {}", store.path().display());
            Ok(())
        }
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn simulate(
    start: Position,
    code: &[String],
    commands: &str,
    tokens: bool,
) -> Result<(), Box<dyn Error>> {
    let result = motion::simulate_with_selection(start, code, commands);
    println!("{}", result.position);
    if let Some(selection) = result.selection {
        println!("selection: {selection}");
    }
    if tokens {
        for token in motion::tokenize(commands) {
            match &token.command {
                Keys::Incomplete(keys) | Keys::Unknown(keys) => println!("skipped: {keys}"),
                command => match token.count {
                    Some(n) => println!("token: {n} x {command:?}"),
                    None => println!("token: {command:?}"),
                },
            }
        }
    }
    Ok(())
}

fn validate(catalog: &Catalog, exercise_id: &str, answer: &str) -> Result<(), Box<dyn Error>> {
    let exercise = catalog.require_exercise(exercise_id)?;
    let result = validation::validate(exercise, answer);
    println!("{}", if result.is_correct { "correct" } else { "incorrect" });
    println!("in solutions: {}", yes_no(result.is_in_solutions));
    println!("optimal: {}", yes_no(result.is_optimal));
    if validation::is_motion_validatable(exercise) {
        println!("target: {}", result.target_position);
        println!("actual: {}", result.actual_position);
        if let Some(selection) = result.target_selection {
            println!("target selection: {selection}");
        }
        if let Some(selection) = result.actual_selection {
            println!("actual selection: {selection}");
        }
    }
    println!("solutions: {}", format_solutions_hint(exercise));
    Ok(())
}

fn practice(
    catalog: &Catalog,
    store: &impl StatsStore,
    module: &str,
    count: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    catalog.require_module(module)?;
    let stats = store.load().unwrap_or_default();
    let fresh = ModuleProgress::default();
    let progress = stats.module(module).unwrap_or(&fresh);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let selector = PracticeSelector::new();
    let lessons = catalog.lessons(module);
    let summary = selector.practice_stats(lessons, progress);
    println!(
        "{module}: {} of {} mastered, accuracy {:.0}%",
        summary.mastered,
        summary.total,
        summary.overall_accuracy * 100.0
    );
    for _ in 0..count {
        match selector.select(lessons, progress, &mut rng) {
            Some(exercise) => println!("{}\t{}", exercise.id, exercise.mission),
            None => {
                println!("practice complete: every lesson is mastered");
                break;
            }
        }
    }
    Ok(())
}

fn record(
    catalog: &Catalog,
    store: &impl StatsStore,
    exercise_id: &str,
    correct: bool,
) -> Result<(), Box<dyn Error>> {
    let exercise = catalog.require_exercise(exercise_id)?;
    if exercise.kind != ExerciseKind::Lesson {
        return Err(format!("`{exercise_id}` is a boss step; only lessons are practiced").into());
    }
    let mut stats = store.load().unwrap_or_default();
    let progress = stats.module_mut(&exercise.module);
    progress.record_practice_result(&exercise.id, correct);
    let summary = progress.exercise(&exercise.id).cloned().unwrap_or_default();
    stats.last_played = Some(stats::now());
    store.save(&stats)?;
    println!(
        "{} {}: {} in a row, mastered: {}",
        if correct { "correct" } else { "wrong" },
        exercise.id,
        summary.consecutive_right,
        yes_no(summary.mastered)
    );
    Ok(())
}

fn print_stats(stats: &UserStats) {
    println!("score: {}", stats.total_score);
    println!("streak: {} (best {})", stats.current_streak, stats.best_streak);
    println!("time played: {}s", stats.total_time.as_secs());
    match stats.last_played {
        Some(at) => println!("last played: {}", at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => println!("last played: never"),
    }
    if stats.bosses_defeated.is_empty() {
        println!("bosses defeated: none");
    } else {
        println!("bosses defeated: {}", stats.bosses_defeated.iter().join(", "));
    }
    for (id, progress) in &stats.modules {
        println!(
            "{id}: lessons {}/{}, practice {}/{} ({:.0}%), boss {}{}",
            progress.lessons_completed,
            progress.lessons_total,
            progress.practice_correct,
            progress.practice_attempts,
            progress.practice_accuracy * 100.0,
            if progress.boss_conquered { "conquered" } else { "unbeaten" },
            if progress.boss_best_time.is_zero() {
                String::new()
            } else {
                format!(" in {}s", progress.boss_best_time.as_secs())
            }
        );
        if !progress.weak_exercises.is_empty() {
            println!("  weakest: {}", progress.weak_exercises.iter().join(", "));
        }
    }
}

fn print_modules(catalog: &Catalog, stats: &UserStats) {
    let order = catalog.module_order();
    for info in catalog.modules() {
        let state = if !stats.is_module_unlocked(&info.id, order) {
            "locked"
        } else if stats.is_boss_ready(&info.id, order) {
            "boss ready"
        } else if stats.is_practice_ready(&info.id, order) {
            "practice ready"
        } else {
            "lessons"
        };
        println!(
            "{:<14}{:<22}{:>3} lessons  {state}",
            info.id,
            info.name,
            catalog.lessons(&info.id).len()
        );
    }
}
