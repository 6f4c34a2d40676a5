//! Judging answers against an exercise, and scoring correct ones.

use itertools::Itertools;
use tracing::debug;

use crate::exercise::{Exercise, Position, ValidationStyle};
use crate::motion::{self, Selection, SimulationResult};

const OPTIMAL_BONUS: f64 = 1.5;
const SPEED_BONUS: f64 = 1.25;
const FAST_ANSWER_SECS: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub is_correct: bool,
    pub is_in_solutions: bool,
    pub is_optimal: bool,
    pub target_position: Position,
    pub actual_position: Position,
    pub target_selection: Option<Selection>,
    pub actual_selection: Option<Selection>,
    pub optimal_solution: String,
    pub all_solutions: Vec<String>,
}

impl ValidationResult {
    /// "Not correct" with both positions at the exercise's starting cursor.
    pub fn neutral(exercise: Option<&Exercise>) -> Self {
        match exercise {
            None => Self::default(),
            Some(ex) => Self {
                target_position: ex.cursor,
                actual_position: ex.cursor,
                optimal_solution: ex.optimal.clone(),
                all_solutions: ex.solutions.clone(),
                ..Self::default()
            },
        }
    }
}

/// Whether answers can be judged by where they leave the cursor. Ex
/// commands, literal modules, and optimal solutions the simulator does not
/// fully understand are judged only against the listed solutions.
pub fn is_motion_validatable(exercise: &Exercise) -> bool {
    let optimal = exercise.optimal.trim();
    if optimal.is_empty() || optimal.starts_with([':', '/', '?']) {
        return false;
    }
    if exercise.validation == ValidationStyle::Literal {
        return false;
    }
    let tokens = motion::tokenize(optimal);
    !tokens.is_empty() && tokens.iter().all(|t| t.is_recognized())
}

pub fn validate(exercise: &Exercise, answer: &str) -> ValidationResult {
    let mut result = ValidationResult::neutral(Some(exercise));
    let answer = answer.trim();
    if answer.is_empty() {
        return result;
    }

    result.is_in_solutions = is_in_solutions(exercise, answer);
    result.is_optimal = is_optimal_answer(exercise, answer);

    if !is_motion_validatable(exercise) {
        result.is_correct = result.is_in_solutions;
        return result;
    }

    let target = run(exercise, &exercise.optimal);
    let actual = run(exercise, answer);
    result.target_position = target.position;
    result.actual_position = actual.position;
    result.target_selection = target.selection;
    result.actual_selection = actual.selection;

    let equivalent = target == actual;
    if !equivalent && result.is_in_solutions {
        debug!(exercise = %exercise.id, answer, "listed solution disagrees with the optimal one");
    }
    result.is_correct = result.is_in_solutions || equivalent;
    result
}

/// Boolean form of [`validate`].
pub fn is_correct(exercise: &Exercise, answer: &str) -> bool {
    validate(exercise, answer).is_correct
}

fn run(exercise: &Exercise, commands: &str) -> SimulationResult {
    motion::simulate_with_selection(exercise.cursor, &exercise.code, commands.trim())
}

pub fn is_optimal_answer(exercise: &Exercise, answer: &str) -> bool {
    answer.trim() == exercise.optimal.trim()
}

pub fn is_in_solutions(exercise: &Exercise, answer: &str) -> bool {
    let answer = answer.trim();
    exercise.solutions.iter().any(|s| s.trim() == answer)
}

/// Listed solutions other than the one the player used.
pub fn alternative_solutions(exercise: &Exercise, used: &str) -> Vec<String> {
    let used = used.trim();
    exercise
        .solutions
        .iter()
        .filter(|s| s.trim() != used)
        .cloned()
        .collect()
}

/// `"optimal (or alt1, alt2)"`, or just the optimal answer when there are
/// no alternatives.
pub fn format_solutions_hint(exercise: &Exercise) -> String {
    match exercise.solutions.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        solutions => {
            let alternatives = solutions.iter().filter(|s| **s != exercise.optimal).join(", ");
            if alternatives.is_empty() {
                exercise.optimal.clone()
            } else {
                format!("{} (or {})", exercise.optimal, alternatives)
            }
        }
    }
}

/// Base points, x1.5 when optimal, x1.25 when a timed exercise is answered
/// in under two seconds, times the combo multiplier (at least 1), truncated.
pub fn calculate_points(
    exercise: Option<&Exercise>,
    elapsed_secs: f64,
    is_optimal: bool,
    combo: u32,
) -> u32 {
    let Some(exercise) = exercise else {
        return 0;
    };
    let mut points = f64::from(exercise.points);
    if is_optimal {
        points *= OPTIMAL_BONUS;
    }
    if exercise.timeout_secs > 0 && elapsed_secs < FAST_ANSWER_SECS {
        points *= SPEED_BONUS;
    }
    points *= f64::from(combo.max(1));
    points as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{ExerciseKind, ValidationStyle};

    fn exercise(code: &[&str], cursor: Position, solutions: &[&str], optimal: &str) -> Exercise {
        Exercise {
            id: "t_001".into(),
            module: "horizontal".into(),
            level: 1,
            kind: ExerciseKind::Lesson,
            code: code.iter().map(|s| s.to_string()).collect(),
            cursor,
            mission: "move".into(),
            solutions: solutions.iter().map(|s| s.to_string()).collect(),
            optimal: optimal.into(),
            hint: String::new(),
            explanation: String::new(),
            timeout_secs: 30,
            points: 10,
            validation: ValidationStyle::Motion,
        }
    }

    fn decl() -> Exercise {
        exercise(
            &["const userName = 'value';"],
            Position::new(0, 0),
            &["w", "e"],
            "w",
        )
    }

    #[test]
    fn optimal_answer_is_correct_and_optimal() {
        let r = validate(&decl(), " w ");
        assert!(r.is_correct);
        assert!(r.is_in_solutions);
        assert!(r.is_optimal);
        assert_eq!(r.target_position, Position::new(0, 6));
    }

    #[test]
    fn unlisted_answer_reaching_target_is_correct() {
        let r = validate(&decl(), "fu");
        assert!(r.is_correct);
        assert!(!r.is_in_solutions);
        assert!(!r.is_optimal);
        assert_eq!(r.actual_position, Position::new(0, 6));
    }

    #[test]
    fn listed_solution_is_always_accepted() {
        let r = validate(&decl(), "e");
        assert!(r.is_correct);
        assert_ne!(r.actual_position, r.target_position);
    }

    #[test]
    fn wrong_position_is_incorrect() {
        let r = validate(&decl(), "ww");
        assert!(!r.is_correct);
        assert_eq!(r.actual_position, Position::new(0, 15));
    }

    #[test]
    fn empty_answer_is_neutral() {
        let r = validate(&decl(), "   ");
        assert!(!r.is_correct);
        assert_eq!(r.actual_position, Position::new(0, 0));
        assert_eq!(r.optimal_solution, "w");
    }

    #[test]
    fn ex_commands_need_listed_solutions() {
        let ex = exercise(&["foo bar"], Position::new(0, 0), &[":s/foo/baz/"], ":s/foo/baz/");
        assert!(!is_motion_validatable(&ex));
        assert!(is_correct(&ex, ":s/foo/baz/"));
        assert!(!is_correct(&ex, ""));
        assert!(!is_correct(&ex, "w"));
    }

    #[test]
    fn literal_modules_skip_simulation() {
        let mut ex = exercise(&["let x = 1;"], Position::new(0, 8), &["r2"], "r2");
        ex.validation = ValidationStyle::Literal;
        assert!(!is_correct(&ex, "l"));
        assert!(is_correct(&ex, "r2"));
    }

    #[test]
    fn unrecognized_optimal_falls_back_to_solutions() {
        let ex = exercise(&["abc"], Position::new(0, 0), &["x"], "x");
        assert!(!is_motion_validatable(&ex));
        assert!(!is_correct(&ex, "q"));
    }

    #[test]
    fn operator_answers_must_select_the_same_region() {
        let ex = exercise(
            &["print(\"hello world\")"],
            Position::new(0, 7),
            &["ci\""],
            "ci\"",
        );
        assert!(is_correct(&ex, "ci\""));
        assert!(is_correct(&ex, "c2e"));
        assert!(!is_correct(&ex, "di\""));
        assert!(!is_correct(&ex, "l"));
        assert!(!is_correct(&ex, "ciw"));
    }

    #[test]
    fn points_apply_bonuses() {
        let ex = decl();
        assert_eq!(calculate_points(None, 1.0, true, 4), 0);
        assert_eq!(calculate_points(Some(&ex), 5.0, false, 1), 10);
        assert_eq!(calculate_points(Some(&ex), 5.0, true, 1), 15);
        assert_eq!(calculate_points(Some(&ex), 1.0, false, 1), 12);
        assert_eq!(calculate_points(Some(&ex), 1.0, true, 2), 37);
        assert_eq!(calculate_points(Some(&ex), 5.0, false, 0), 10);

        let untimed = Exercise {
            timeout_secs: 0,
            ..ex.clone()
        };
        assert_eq!(calculate_points(Some(&untimed), 1.0, false, 1), 10);
        assert_eq!(calculate_points(Some(&untimed), 1.0, true, 2), 30);
    }

    #[test]
    fn hints_list_alternatives() {
        let mut ex = decl();
        assert_eq!(format_solutions_hint(&ex), "w (or e)");
        assert_eq!(alternative_solutions(&ex, "w"), vec!["e".to_string()]);
        ex.solutions = vec!["w".into()];
        assert_eq!(format_solutions_hint(&ex), "w");
        ex.solutions.clear();
        assert_eq!(format_solutions_hint(&ex), "");
    }
}
