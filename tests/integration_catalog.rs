use vimdrill::motion::simulate_with_selection;
use vimdrill::validation::{is_motion_validatable, validate};
use vimdrill::{Catalog, Exercise, ValidationStyle};

fn all_exercises(catalog: &Catalog) -> Vec<&Exercise> {
    catalog
        .module_order()
        .iter()
        .flat_map(|module| {
            let boss_steps = catalog
                .boss(module)
                .into_iter()
                .flat_map(|b| b.steps.iter().map(|s| &s.exercise));
            catalog.lessons(module).iter().chain(boss_steps)
        })
        .collect()
}

// Every listed alternative must reach exactly what the optimal answer
// reaches, or unlisted equivalents would be judged against a moving target.
#[test]
fn listed_solutions_agree_with_the_optimal_one() {
    let catalog = Catalog::builtin().unwrap();
    let mut checked = 0;
    for ex in all_exercises(&catalog) {
        if !is_motion_validatable(ex) {
            continue;
        }
        let target = simulate_with_selection(ex.cursor, &ex.code, &ex.optimal);
        for solution in &ex.solutions {
            let got = simulate_with_selection(ex.cursor, &ex.code, solution);
            assert_eq!(got, target, "{}: `{}` vs optimal `{}`", ex.id, solution, ex.optimal);
            checked += 1;
        }
    }
    assert!(checked > 50, "only {checked} solutions were simulated");
}

#[test]
fn every_listed_solution_validates() {
    let catalog = Catalog::builtin().unwrap();
    for ex in all_exercises(&catalog) {
        for solution in &ex.solutions {
            let result = validate(ex, solution);
            assert!(result.is_correct, "{} rejected `{}`", ex.id, solution);
            assert!(result.is_in_solutions);
        }
        assert!(validate(ex, &ex.optimal).is_optimal);
        assert!(!validate(ex, "   ").is_correct);
    }
}

#[test]
fn literal_modules_only_accept_listed_answers() {
    let catalog = Catalog::builtin().unwrap();
    for module in ["substitution", "regex", "macros"] {
        assert_eq!(catalog.module(module).unwrap().validation, ValidationStyle::Literal);
        for ex in catalog.lessons(module) {
            assert!(!is_motion_validatable(ex), "{}", ex.id);
            // `0` is a valid motion but no listed answer in these modules
            assert!(!ex.solutions.iter().any(|s| s == "0"));
            assert!(!validate(ex, "0").is_correct, "{}", ex.id);
        }
    }
}

#[test]
fn unlisted_equivalent_motion_is_accepted() {
    let catalog = Catalog::builtin().unwrap();
    let ex = catalog.exercise("horizontal_001").unwrap();
    assert_eq!(ex.optimal, "w");
    // `fu` reaches the same column as `w` on "const userName = ..."
    let result = validate(ex, "fu");
    assert!(result.is_correct);
    assert!(!result.is_in_solutions);
    assert!(!result.is_optimal);
    assert_eq!(result.actual_position, result.target_position);
}

#[test]
fn ids_are_unique_across_modules() {
    let catalog = Catalog::builtin().unwrap();
    let exercises = all_exercises(&catalog);
    let mut ids: Vec<&str> = exercises.iter().map(|e| e.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}
