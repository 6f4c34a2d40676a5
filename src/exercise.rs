use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Zero-indexed cursor coordinates into a text buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExerciseKind {
    #[default]
    Lesson,
    Practice,
    Boss,
}

/// How answers for a module are judged.
///
/// `Motion` modules compare where the cursor (and any selection) ends up;
/// `Literal` modules mutate text or drive macros, so only the listed
/// solutions are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValidationStyle {
    #[default]
    Motion,
    Literal,
}

fn default_level() -> u8 {
    1
}

fn default_timeout() -> u32 {
    30
}

fn default_points() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub module: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub kind: ExerciseKind,
    pub code: Vec<String>,
    pub cursor: Position,
    pub mission: String,
    pub solutions: Vec<String>,
    pub optimal: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default)]
    pub validation: ValidationStyle,
}

impl Exercise {
    /// Copy of this exercise re-tagged with another kind. The id is kept so
    /// stats recorded against the copy land on the original exercise.
    pub fn as_kind(&self, kind: ExerciseKind) -> Exercise {
        Exercise {
            kind,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossStep {
    pub time_limit: u32,
    pub exercise: Exercise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossExercise {
    pub id: String,
    #[serde(default)]
    pub module: String,
    pub name: String,
    pub lives: u32,
    pub steps: Vec<BossStep>,
    #[serde(default)]
    pub bonus_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub boss_name: String,
    #[serde(default)]
    pub validation: ValidationStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_order_by_line_then_column() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(3, 4).to_string(), "3:4");
    }

    #[test]
    fn exercise_defaults_fill_missing_fields() {
        let json = r#"{
            "id": "x_001",
            "code": ["let a = 1;"],
            "cursor": {"line": 0, "col": 0},
            "mission": "go",
            "solutions": ["w"],
            "optimal": "w"
        }"#;
        let ex: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(ex.level, 1);
        assert_eq!(ex.kind, ExerciseKind::Lesson);
        assert_eq!(ex.timeout_secs, 30);
        assert_eq!(ex.points, 10);
        assert_eq!(ex.validation, ValidationStyle::Motion);
    }

    #[test]
    fn as_kind_keeps_id() {
        let json = r#"{"id":"x","code":[""],"cursor":{"line":0,"col":0},
            "mission":"m","solutions":["w"],"optimal":"w"}"#;
        let ex: Exercise = serde_json::from_str(json).unwrap();
        let practice = ex.as_kind(ExerciseKind::Practice);
        assert_eq!(practice.id, "x");
        assert_eq!(practice.kind, ExerciseKind::Practice);
        assert_eq!(practice.kind.to_string(), "practice");
    }
}
