//! One sitting of lessons, practice or a boss fight, writing results through
//! to the player's [`UserStats`] as they happen.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use strum_macros::Display;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::exercise::{BossExercise, Exercise};
use crate::practice::PracticeSelector;
use crate::stats::{self, ModuleProgress, UserStats};
use crate::validation::{self, ValidationResult};

/// Highest combo multiplier a boss run can build up.
pub const COMBO_CAP: u32 = 4;
/// Flat score for beating a boss.
pub const BOSS_VICTORY_BONUS: u64 = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Idle,
    Lesson,
    Practice,
    Boss,
}

/// How the current session stands. `PlayerDefeated` means the player ran out
/// of lives in this run; it says nothing about whether the boss was beaten
/// before (see [`crate::stats::ModuleProgress::boss_conquered`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum SessionOutcome {
    #[default]
    InProgress,
    Complete,
    PlayerDefeated,
    Victory,
}

/// Result of [`GameState::submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub validation: ValidationResult,
    pub points: u32,
}

pub struct GameState<'a> {
    catalog: &'a Catalog,
    stats: UserStats,
    selector: PracticeSelector,
    rng: Box<dyn RngCore>,

    mode: SessionMode,
    outcome: SessionOutcome,
    module: String,
    current: Option<Exercise>,
    lesson_index: usize,

    boss: Option<&'a BossExercise>,
    boss_step: usize,
    boss_lives: u32,
    victory_recorded: bool,

    streak: u32,
    combo: u32,
    session_score: u64,
    elapsed: Duration,
}

impl std::fmt::Debug for GameState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("mode", &self.mode)
            .field("outcome", &self.outcome)
            .field("module", &self.module)
            .field("current", &self.current.as_ref().map(|ex| &ex.id))
            .field("boss_step", &self.boss_step)
            .field("boss_lives", &self.boss_lives)
            .field("streak", &self.streak)
            .field("combo", &self.combo)
            .field("session_score", &self.session_score)
            .finish_non_exhaustive()
    }
}

impl<'a> GameState<'a> {
    /// A session over `stats` drawing practice with an entropy-seeded RNG.
    pub fn new(catalog: &'a Catalog, stats: UserStats) -> Self {
        Self::with_rng(catalog, stats, Box::new(StdRng::from_entropy()))
    }

    pub fn with_seed(catalog: &'a Catalog, stats: UserStats, seed: u64) -> Self {
        Self::with_rng(catalog, stats, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_rng(catalog: &'a Catalog, stats: UserStats, rng: Box<dyn RngCore>) -> Self {
        Self {
            catalog,
            stats,
            selector: PracticeSelector::new(),
            rng,
            mode: SessionMode::Idle,
            outcome: SessionOutcome::InProgress,
            module: String::new(),
            current: None,
            lesson_index: 0,
            boss: None,
            boss_step: 0,
            boss_lives: 0,
            victory_recorded: false,
            streak: 0,
            combo: 1,
            session_score: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn set_selector(&mut self, selector: PracticeSelector) {
        self.selector = selector;
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn into_stats(self) -> UserStats {
        self.stats
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.current.as_ref()
    }

    pub fn lesson_index(&self) -> usize {
        self.lesson_index
    }

    pub fn boss(&self) -> Option<&BossExercise> {
        self.boss
    }

    pub fn boss_step(&self) -> usize {
        self.boss_step
    }

    pub fn boss_lives(&self) -> u32 {
        self.boss_lives
    }

    /// Seconds allowed for the current boss step, if in a boss fight.
    pub fn step_time_limit(&self) -> Option<u32> {
        self.boss?.steps.get(self.boss_step).map(|s| s.time_limit)
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn session_score(&self) -> u64 {
        self.session_score
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn begin(&mut self, module: &str, mode: SessionMode) -> Result<()> {
        self.catalog.require_module(module)?;
        if !self.stats.is_module_unlocked(module, self.catalog.module_order()) {
            return Err(Error::Locked(module.to_string()));
        }
        self.reset_session();
        self.module = module.to_string();
        self.mode = mode;
        self.stats.last_played = Some(stats::now());
        info!(module, %mode, "session started");
        Ok(())
    }

    fn progress_mut(&mut self) -> &mut ModuleProgress {
        self.stats.module_mut(&self.module)
    }

    /// Walks the module's lessons in order from the first one.
    pub fn start_lesson(&mut self, module: &str) -> Result<()> {
        self.begin(module, SessionMode::Lesson)?;
        let catalog = self.catalog;
        let lessons = catalog.lessons(module);
        let total = u32::try_from(lessons.len()).unwrap_or(u32::MAX);
        let progress = self.progress_mut();
        progress.lessons_total = total;
        progress.set_lessons_completed(progress.lessons_completed);
        self.current = lessons.first().cloned();
        if self.current.is_none() {
            self.outcome = SessionOutcome::Complete;
        }
        Ok(())
    }

    /// Serves mastery-weighted practice until every lesson is mastered.
    pub fn start_practice(&mut self, module: &str) -> Result<()> {
        self.begin(module, SessionMode::Practice)?;
        self.next_practice_exercise();
        Ok(())
    }

    /// Starts a fresh run at the module's boss with full lives.
    pub fn start_boss(&mut self, module: &str) -> Result<()> {
        let catalog = self.catalog;
        let boss = catalog
            .boss(module)
            .ok_or_else(|| Error::NoBoss(module.to_string()))?;
        self.begin(module, SessionMode::Boss)?;
        self.boss = Some(boss);
        self.boss_lives = boss.lives;
        self.current = boss.steps.first().map(|s| s.exercise.clone());
        self.progress_mut().boss_attempts += 1;
        debug!(boss = %boss.name, lives = boss.lives, "boss fight started");
        Ok(())
    }

    /// Puts a specific exercise in front of the player in practice mode.
    pub fn set_practice_exercise(&mut self, exercise: Exercise) {
        if self.mode == SessionMode::Practice {
            self.current = Some(exercise);
            self.outcome = SessionOutcome::InProgress;
        }
    }

    /// Draws the next practice exercise. `false` once everything is mastered,
    /// which also completes the session.
    pub fn next_practice_exercise(&mut self) -> bool {
        if self.mode != SessionMode::Practice {
            return false;
        }
        let fresh = ModuleProgress::default();
        let progress = self.stats.module(&self.module).unwrap_or(&fresh);
        let next = self
            .selector
            .select(self.catalog.lessons(&self.module), progress, self.rng.as_mut());
        match next {
            Some(exercise) => {
                self.current = Some(exercise);
                true
            }
            None => {
                info!(module = %self.module, "practice complete");
                self.current = None;
                self.outcome = SessionOutcome::Complete;
                false
            }
        }
    }

    /// Judges `answer` against the current exercise without recording it.
    pub fn validate_current(&self, answer: &str) -> ValidationResult {
        match &self.current {
            Some(exercise) => validation::validate(exercise, answer),
            None => ValidationResult::neutral(None),
        }
    }

    /// Validates `answer` and records it as correct or incorrect.
    pub fn submit(&mut self, answer: &str, elapsed_secs: f64) -> Answer {
        let validation = self.validate_current(answer);
        let points = if validation.is_correct {
            self.record_correct_answer(elapsed_secs, validation.is_optimal)
        } else {
            self.record_incorrect_answer();
            0
        };
        Answer { validation, points }
    }

    /// Scores a correct answer on the current exercise and returns the
    /// points awarded. In a boss fight the combo grows after scoring.
    pub fn record_correct_answer(&mut self, elapsed_secs: f64, is_optimal: bool) -> u32 {
        if self.outcome != SessionOutcome::InProgress {
            return 0;
        }
        self.streak += 1;
        self.stats.record_streak(self.streak);

        let points = validation::calculate_points(
            self.current.as_ref(),
            elapsed_secs,
            is_optimal,
            self.combo,
        );
        self.session_score += u64::from(points);
        self.stats.total_score += u64::from(points);

        match self.mode {
            SessionMode::Lesson => {
                let done = u32::try_from(self.lesson_index + 1).unwrap_or(u32::MAX);
                let progress = self.progress_mut();
                if done > progress.lessons_completed {
                    progress.set_lessons_completed(done);
                }
            }
            SessionMode::Practice => self.record_practice(true),
            SessionMode::Boss => self.combo = (self.combo + 1).min(COMBO_CAP),
            SessionMode::Idle => {}
        }
        points
    }

    /// Breaks the streak and combo; costs a life in a boss fight.
    pub fn record_incorrect_answer(&mut self) {
        if self.outcome != SessionOutcome::InProgress {
            return;
        }
        self.streak = 0;
        self.stats.current_streak = 0;
        self.combo = 1;

        match self.mode {
            SessionMode::Practice => self.record_practice(false),
            SessionMode::Boss => {
                self.boss_lives = self.boss_lives.saturating_sub(1);
                if self.boss_lives == 0 {
                    info!(module = %self.module, "player defeated");
                    self.outcome = SessionOutcome::PlayerDefeated;
                }
            }
            SessionMode::Lesson | SessionMode::Idle => {}
        }
    }

    fn record_practice(&mut self, correct: bool) {
        let Some(id) = self.current.as_ref().map(|ex| ex.id.clone()) else {
            return;
        };
        self.progress_mut().record_practice_result(&id, correct);
    }

    /// Moves to the next exercise. `false` when the session has ended,
    /// either by running out of exercises or by the player being defeated.
    pub fn advance_exercise(&mut self) -> bool {
        if self.outcome != SessionOutcome::InProgress {
            return false;
        }
        match self.mode {
            SessionMode::Idle => false,
            SessionMode::Practice => self.next_practice_exercise(),
            SessionMode::Lesson => {
                self.lesson_index += 1;
                let catalog = self.catalog;
                match catalog.lessons(&self.module).get(self.lesson_index) {
                    Some(next) => {
                        self.current = Some(next.clone());
                        true
                    }
                    None => {
                        let progress = self.progress_mut();
                        progress.set_lessons_completed(progress.lessons_total);
                        info!(module = %self.module, "lessons complete");
                        self.current = None;
                        self.outcome = SessionOutcome::Complete;
                        false
                    }
                }
            }
            SessionMode::Boss => {
                self.boss_step += 1;
                let next = self.boss.and_then(|b| b.steps.get(self.boss_step));
                match next {
                    Some(step) => {
                        self.current = Some(step.exercise.clone());
                        true
                    }
                    None => {
                        self.current = None;
                        self.outcome = SessionOutcome::Victory;
                        false
                    }
                }
            }
        }
    }

    /// Credits a boss win once every step has been cleared: marks the boss
    /// conquered, keeps the best time and the lives left, and awards the
    /// victory bonus. Only the first call in a run has any effect.
    pub fn record_boss_victory(&mut self) -> bool {
        if self.mode != SessionMode::Boss
            || self.outcome != SessionOutcome::Victory
            || self.victory_recorded
        {
            return false;
        }
        self.victory_recorded = true;

        let first_win = self.stats.mark_boss_defeated(&self.module);
        let (elapsed, lives) = (self.elapsed, self.boss_lives);
        self.progress_mut().record_boss_win(elapsed, lives);
        self.session_score += BOSS_VICTORY_BONUS;
        self.stats.total_score += BOSS_VICTORY_BONUS;
        info!(module = %self.module, first_win, lives, secs = elapsed.as_secs(), "boss conquered");
        true
    }

    /// Adds time spent answering to this session and to lifetime play time.
    pub fn add_elapsed(&mut self, spent: Duration) {
        self.elapsed += spent;
        self.stats.total_time += spent;
    }

    /// Back to idle. Stats already recorded are kept.
    pub fn reset_session(&mut self) {
        self.mode = SessionMode::Idle;
        self.outcome = SessionOutcome::InProgress;
        self.module.clear();
        self.current = None;
        self.lesson_index = 0;
        self.boss = None;
        self.boss_step = 0;
        self.boss_lives = 0;
        self.victory_recorded = false;
        self.streak = 0;
        self.combo = 1;
        self.session_score = 0;
        self.elapsed = Duration::ZERO;
    }
}
