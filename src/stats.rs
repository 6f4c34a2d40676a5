//! Durable per-user statistics and the unlock rules evaluated against them.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive correct answers that master an exercise.
pub const MASTERY_THRESHOLD: u32 = 3;
/// Lifetime practice accuracy needed before a boss can be fought.
pub const BOSS_MIN_ACCURACY: f64 = 0.80;
/// Lifetime practice attempts needed before a boss can be fought.
pub const BOSS_MIN_ATTEMPTS: u32 = 10;

/// Current time truncated to whole seconds, the precision stats are stored at.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseStats {
    pub total_attempts: u32,
    pub total_correct: u32,
    pub total_wrong: u32,
    pub consecutive_right: u32,
    pub mastered: bool,
    /// Unix seconds, 0 when never attempted.
    pub last_attempted: i64,
}

impl ExerciseStats {
    /// Applies one practice answer. A wrong answer always clears mastery.
    pub fn record(&mut self, correct: bool, at: DateTime<Utc>) {
        self.total_attempts += 1;
        self.last_attempted = at.timestamp();
        if correct {
            self.total_correct += 1;
            self.consecutive_right += 1;
            if self.consecutive_right >= MASTERY_THRESHOLD {
                self.mastered = true;
            }
        } else {
            self.total_wrong += 1;
            self.consecutive_right = 0;
            self.mastered = false;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleProgress {
    pub lessons_completed: u32,
    pub lessons_total: u32,
    pub practice_accuracy: f64,
    pub practice_attempts: u32,
    pub practice_correct: u32,
    /// The module's boss has been beaten at least once.
    #[serde(rename = "bossDefeated")]
    pub boss_conquered: bool,
    /// Zero when no victory has been recorded.
    #[serde(rename = "bossBestTimeSeconds", with = "seconds")]
    pub boss_best_time: Duration,
    pub boss_attempts: u32,
    pub boss_lives_left: u32,
    pub exercise_stats: BTreeMap<String, ExerciseStats>,
    pub weak_exercises: Vec<String>,
    #[serde(with = "timestamp")]
    pub last_practiced: Option<DateTime<Utc>>,
}

impl ModuleProgress {
    pub fn lessons_complete(&self) -> bool {
        self.lessons_total > 0 && self.lessons_completed >= self.lessons_total
    }

    /// Records lesson progress, never past the lesson total.
    pub fn set_lessons_completed(&mut self, completed: u32) {
        self.lessons_completed = completed.min(self.lessons_total);
    }

    pub fn exercise(&self, id: &str) -> Option<&ExerciseStats> {
        self.exercise_stats.get(id)
    }

    /// Records a boss win; the best time only ever improves.
    pub fn record_boss_win(&mut self, elapsed: Duration, lives_left: u32) {
        let was_conquered = self.boss_conquered;
        self.boss_conquered = true;
        if !was_conquered || elapsed < self.boss_best_time {
            self.boss_best_time = elapsed;
        }
        self.boss_lives_left = lives_left;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_score: u64,
    pub current_streak: u32,
    pub best_streak: u32,
    #[serde(rename = "totalTimeSeconds", with = "seconds")]
    pub total_time: Duration,
    #[serde(with = "timestamp")]
    pub last_played: Option<DateTime<Utc>>,
    pub bosses_defeated: Vec<String>,
    pub modules: BTreeMap<String, ModuleProgress>,
}

impl UserStats {
    pub fn module(&self, module: &str) -> Option<&ModuleProgress> {
        self.modules.get(module)
    }

    pub fn module_mut(&mut self, module: &str) -> &mut ModuleProgress {
        self.modules.entry(module.to_string()).or_default()
    }

    pub fn is_boss_defeated(&self, module: &str) -> bool {
        self.bosses_defeated.iter().any(|m| m == module)
    }

    /// Adds `module` to the defeated list once. Returns whether it was new.
    pub fn mark_boss_defeated(&mut self, module: &str) -> bool {
        if self.is_boss_defeated(module) {
            return false;
        }
        self.bosses_defeated.push(module.to_string());
        true
    }

    pub fn record_streak(&mut self, streak: u32) {
        self.current_streak = streak;
        self.best_streak = self.best_streak.max(streak);
    }

    /// The first module in `order` is always open; every later one opens
    /// once the boss of the module before it is defeated. Modules missing
    /// from `order` are locked.
    pub fn is_module_unlocked(&self, module: &str, order: &[String]) -> bool {
        match order.iter().position(|m| m == module) {
            None => false,
            Some(0) => true,
            Some(i) => self.is_boss_defeated(&order[i - 1]),
        }
    }

    pub fn lessons_complete(&self, module: &str) -> bool {
        self.module(module).is_some_and(ModuleProgress::lessons_complete)
    }

    pub fn is_practice_ready(&self, module: &str, order: &[String]) -> bool {
        self.is_module_unlocked(module, order) && self.lessons_complete(module)
    }

    pub fn is_boss_ready(&self, module: &str, order: &[String]) -> bool {
        self.is_practice_ready(module, order)
            && self.module(module).is_some_and(|p| {
                p.practice_accuracy >= BOSS_MIN_ACCURACY && p.practice_attempts >= BOSS_MIN_ATTEMPTS
            })
    }
}

/// Durations as whole seconds.
mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(d)?;
        Ok(Duration::from_secs(secs.max(0).unsigned_abs()))
    }
}

/// Optional timestamps as RFC 3339 strings, `""` when unset.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}
