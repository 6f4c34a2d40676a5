//! Mastery-weighted practice: which lesson to serve next, and the
//! bookkeeping that feeds those weights.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::exercise::{Exercise, ExerciseKind};
use crate::stats::{self, ExerciseStats, ModuleProgress};

/// How many of the most-missed exercises are kept as "weak".
const WEAKEST_COUNT: usize = 3;

/// Turns an exercise's history into a selection weight. Zero removes the
/// exercise from the pool.
pub trait WeightStrategy {
    fn weight(&self, stats: &ExerciseStats) -> u32;
}

/// Untried exercises weigh 15, mastered ones 0, everything else
/// `10 + 5 x wrong - 2 x streak` with a floor of 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct MasteryWeights;

impl MasteryWeights {
    const BASE: i64 = 10;
    const PER_WRONG: i64 = 5;
    const PER_RIGHT: i64 = 2;
    const UNTRIED: u32 = 15;
}

impl WeightStrategy for MasteryWeights {
    fn weight(&self, stats: &ExerciseStats) -> u32 {
        if stats.mastered {
            return 0;
        }
        if stats.total_attempts == 0 {
            return Self::UNTRIED;
        }
        let w = Self::BASE + Self::PER_WRONG * i64::from(stats.total_wrong)
            - Self::PER_RIGHT * i64::from(stats.consecutive_right);
        u32::try_from(w.max(1)).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PracticeStats {
    pub total: usize,
    pub mastered: usize,
    pub remaining: usize,
    pub overall_accuracy: f64,
    /// Up to three exercise ids, most missed first.
    pub weakest: Vec<String>,
    pub complete: bool,
}

pub struct PracticeSelector {
    strategy: Box<dyn WeightStrategy>,
}

impl Default for PracticeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PracticeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeSelector").finish_non_exhaustive()
    }
}

impl PracticeSelector {
    pub fn new() -> Self {
        Self::with_strategy(Box::new(MasteryWeights))
    }

    pub fn with_strategy(strategy: Box<dyn WeightStrategy>) -> Self {
        Self { strategy }
    }

    pub fn weight(&self, progress: &ModuleProgress, exercise_id: &str) -> u32 {
        match progress.exercise(exercise_id) {
            Some(stats) => self.strategy.weight(stats),
            None => self.strategy.weight(&ExerciseStats::default()),
        }
    }

    fn pool(&self, lessons: &[Exercise], progress: &ModuleProgress) -> Vec<(usize, u32)> {
        lessons
            .iter()
            .enumerate()
            .map(|(i, ex)| (i, self.weight(progress, &ex.id)))
            .filter(|&(_, w)| w > 0)
            .collect()
    }

    /// Weighted draw over the module's lessons, returned as a practice copy.
    /// `None` means every lesson is mastered (or there are none).
    pub fn select<R: Rng + ?Sized>(
        &self,
        lessons: &[Exercise],
        progress: &ModuleProgress,
        rng: &mut R,
    ) -> Option<Exercise> {
        let pool = self.pool(lessons, progress);
        let total: u64 = pool.iter().map(|&(_, w)| u64::from(w)).sum();
        if total == 0 {
            debug!("practice pool is empty");
            return None;
        }
        let index = pick(&pool, rng.gen_range(0..total))?;
        Some(lessons[index].as_kind(ExerciseKind::Practice))
    }

    /// Unmastered lessons as practice copies, heaviest first.
    pub fn weighted_practice_exercises(
        &self,
        lessons: &[Exercise],
        progress: &ModuleProgress,
    ) -> Vec<Exercise> {
        let mut pool = self.pool(lessons, progress);
        pool.sort_by(|a, b| b.1.cmp(&a.1));
        pool.into_iter()
            .map(|(i, _)| lessons[i].as_kind(ExerciseKind::Practice))
            .collect()
    }

    pub fn practice_stats(&self, lessons: &[Exercise], progress: &ModuleProgress) -> PracticeStats {
        let mastered = lessons
            .iter()
            .filter(|ex| progress.exercise(&ex.id).is_some_and(|s| s.mastered))
            .count();
        let mut missed: Vec<(&str, u32)> = lessons
            .iter()
            .filter_map(|ex| {
                let wrong = progress.exercise(&ex.id)?.total_wrong;
                (wrong > 0).then_some((ex.id.as_str(), wrong))
            })
            .collect();
        missed.sort_by(|a, b| b.1.cmp(&a.1));
        PracticeStats {
            total: lessons.len(),
            mastered,
            remaining: lessons.len() - mastered,
            overall_accuracy: progress.practice_accuracy,
            weakest: missed
                .into_iter()
                .take(WEAKEST_COUNT)
                .map(|(id, _)| id.to_string())
                .collect(),
            complete: !lessons.is_empty() && mastered == lessons.len(),
        }
    }
}

/// Next practice exercise for `module` under the default weights, or `None`
/// when every lesson is mastered.
pub fn select_practice_exercise<R: Rng + ?Sized>(
    catalog: &Catalog,
    module: &str,
    progress: &ModuleProgress,
    rng: &mut R,
) -> Option<Exercise> {
    PracticeSelector::new().select(catalog.lessons(module), progress, rng)
}

/// Walks cumulative weights until `draw` falls inside one.
fn pick(pool: &[(usize, u32)], draw: u64) -> Option<usize> {
    let mut cumulative = 0u64;
    for &(index, weight) in pool {
        cumulative += u64::from(weight);
        if draw < cumulative {
            return Some(index);
        }
    }
    pool.first().map(|&(index, _)| index)
}

impl ModuleProgress {
    pub fn record_practice_result(&mut self, exercise_id: &str, correct: bool) {
        self.record_practice_result_at(exercise_id, correct, stats::now());
    }

    /// Updates the exercise's history and the module's lifetime practice
    /// counters. Accuracy is always `correct / attempts` over all time.
    pub fn record_practice_result_at(
        &mut self,
        exercise_id: &str,
        correct: bool,
        at: DateTime<Utc>,
    ) {
        let entry = self.exercise_stats.entry(exercise_id.to_string()).or_default();
        let was_mastered = entry.mastered;
        entry.record(correct, at);
        match (was_mastered, entry.mastered) {
            (false, true) => info!(exercise = exercise_id, "exercise mastered"),
            (true, false) => info!(exercise = exercise_id, "exercise lost mastery"),
            _ => {}
        }

        self.practice_attempts += 1;
        if correct {
            self.practice_correct += 1;
        }
        self.practice_accuracy =
            f64::from(self.practice_correct) / f64::from(self.practice_attempts);
        self.last_practiced = Some(at);
        self.refresh_weak_exercises();
    }

    fn refresh_weak_exercises(&mut self) {
        let mut missed: Vec<(&String, u32)> = self
            .exercise_stats
            .iter()
            .filter(|(_, s)| s.total_wrong > 0)
            .map(|(id, s)| (id, s.total_wrong))
            .collect();
        missed.sort_by(|a, b| b.1.cmp(&a.1));
        self.weak_exercises = missed
            .into_iter()
            .take(WEAKEST_COUNT)
            .map(|(id, _)| id.clone())
            .collect();
    }

    /// Forgets all practice history, the only way mastered exercises
    /// return to the pool.
    pub fn reset_practice(&mut self) {
        self.exercise_stats.clear();
        self.practice_attempts = 0;
        self.practice_correct = 0;
        self.practice_accuracy = 0.0;
        self.weak_exercises.clear();
        self.last_practiced = None;
    }

    /// True when the module has lessons and every one is mastered.
    pub fn is_practice_complete(&self, lessons: &[Exercise]) -> bool {
        !lessons.is_empty()
            && lessons
                .iter()
                .all(|ex| self.exercise(&ex.id).is_some_and(|s| s.mastered))
    }
}
