// Library surface for the binary and the integration tests.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod error;
pub mod exercise;
pub mod motion;
pub mod practice;
pub mod session;
pub mod stats;
pub mod store;
pub mod validation;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use exercise::{
    BossExercise, BossStep, Exercise, ExerciseKind, ModuleInfo, Position, ValidationStyle,
};
pub use motion::{simulate, simulate_with_selection, Selection, SimulationResult};
pub use practice::{select_practice_exercise, PracticeSelector};
pub use session::{GameState, SessionMode, SessionOutcome};
pub use stats::{ExerciseStats, ModuleProgress, UserStats};
pub use store::{FileStatsStore, StatsStore};
pub use validation::{calculate_points, validate, ValidationResult};
