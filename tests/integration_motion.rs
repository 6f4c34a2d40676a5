use vimdrill::motion::{
    is_valid_prefix, simulate, simulate_with_selection, tokenize, Operator, Selection,
};
use vimdrill::Position;

const DECL: &[&str] = &["const userName = 'value';"];
const PATH: &[&str] = &["name.first.middle.last"];

const FUNC: &[&str] = &[
    "fn main() {",
    "    let total = price * qty;",
    "",
    "    println!(\"{}\", total);",
    "}",
];

fn col(buffer: &[&str], start: usize, keys: &str) -> usize {
    simulate(Position::new(0, start), buffer, keys).col
}

fn at(line: usize, col: usize, keys: &str) -> Position {
    simulate(Position::new(line, col), FUNC, keys)
}

fn selection(line: usize, col: usize, keys: &str) -> Option<Selection> {
    simulate_with_selection(Position::new(line, col), FUNC, keys).selection
}

fn chars(operator: Operator, line: usize, start: usize, end: usize) -> Option<Selection> {
    Some(Selection {
        operator,
        start: Position::new(line, start),
        end: Position::new(line, end),
        linewise: false,
    })
}

#[test]
fn word_and_find_motions_on_a_declaration() {
    assert_eq!(col(DECL, 0, "w"), 6);
    assert_eq!(col(DECL, 0, "ww"), 15);
    assert_eq!(col(DECL, 0, "2w"), col(DECL, 0, "ww"));
    assert_eq!(col(DECL, 0, "f="), 15);
    assert_eq!(col(DECL, 0, "t="), 14);
    assert_eq!(col(DECL, 20, "F="), 15);
    assert_eq!(col(DECL, 15, "b"), 6);
    assert_eq!(col(DECL, 17, "bbb"), 0);
}

#[test]
fn repeated_finds_follow_the_last_search() {
    assert_eq!(col(PATH, 0, "f."), 4);
    assert_eq!(col(PATH, 0, "f.;"), 10);
    assert_eq!(col(PATH, 0, "f.;;"), 17);
    assert_eq!(col(PATH, 0, "f.;;,"), 10);
    // nothing to repeat yet
    assert_eq!(col(PATH, 3, ";"), 3);
}

#[test]
fn vertical_and_line_motions() {
    assert_eq!(at(0, 0, "j"), Position::new(1, 0));
    assert_eq!(at(1, 4, "}"), Position::new(2, 0));
    assert_eq!(at(3, 4, "{"), Position::new(2, 0));
    assert_eq!(at(0, 3, "G"), Position::new(4, 0));
    assert_eq!(at(4, 0, "gg"), Position::new(0, 0));
    assert_eq!(at(0, 0, "2G"), Position::new(1, 4));
    assert_eq!(at(0, 0, "+"), Position::new(1, 4));
    assert_eq!(at(1, 10, "_"), Position::new(1, 4));
    assert_eq!(at(1, 10, "^"), Position::new(1, 4));
    assert_eq!(at(1, 10, "0"), Position::new(1, 0));
    assert_eq!(at(1, 10, "$"), Position::new(1, 27));
}

#[test]
fn word_end_and_big_word_motions() {
    assert_eq!(at(1, 8, "e"), Position::new(1, 12));
    assert_eq!(at(1, 8, "E"), Position::new(1, 12));
    assert_eq!(at(1, 8, "W"), Position::new(1, 14));
    // an empty line stops a backward WORD motion
    assert_eq!(at(3, 4, "B"), Position::new(2, 0));
}

#[test]
fn operators_select_without_moving() {
    assert_eq!(at(1, 8, "dw"), Position::new(1, 8));
    assert_eq!(selection(1, 8, "dw"), chars(Operator::Delete, 1, 8, 13));
    assert_eq!(selection(1, 8, "daw"), selection(1, 8, "dw"));
    assert_eq!(selection(1, 8, "ciw"), chars(Operator::Change, 1, 8, 12));
    assert_eq!(selection(1, 8, "D"), chars(Operator::Delete, 1, 8, 27));
    assert_eq!(selection(1, 8, "dt;"), chars(Operator::Delete, 1, 8, 26));
    assert_eq!(selection(1, 8, "cf;"), chars(Operator::Change, 1, 8, 27));
    assert_eq!(selection(1, 20, "dT="), chars(Operator::Delete, 1, 15, 19));
    assert_eq!(selection(1, 8, "2d2w"), chars(Operator::Delete, 1, 8, 23));
    assert_eq!(selection(1, 8, "v3l"), chars(Operator::Visual, 1, 8, 11));
    assert_eq!(selection(1, 8, "gUiw"), chars(Operator::Uppercase, 1, 8, 12));
}

#[test]
fn delimited_text_objects() {
    assert_eq!(selection(3, 14, "di\""), chars(Operator::Delete, 3, 14, 15));
    assert_eq!(selection(3, 14, "yi("), chars(Operator::Yank, 3, 13, 23));
}

#[test]
fn linewise_operators_cover_whole_lines() {
    let dd = selection(1, 4, "dd").unwrap();
    assert!(dd.linewise);
    assert_eq!((dd.start, dd.end), (Position::new(1, 0), Position::new(1, 27)));

    let yy = selection(1, 4, "2yy").unwrap();
    assert_eq!((yy.start, yy.end), (Position::new(1, 0), Position::new(2, 0)));

    let guu = selection(1, 8, "guu").unwrap();
    assert_eq!(guu.operator, Operator::Lowercase);
    assert!(guu.linewise);
}

#[test]
fn junk_input_never_moves_or_panics() {
    assert_eq!(at(0, 0, "zzq"), Position::new(0, 0));
    for keys in ["", "f", "d", "di", "g", "9", "\u{1b}", "ü", "dq", "c3", "2", "gu", "t"] {
        let pos = at(1, 8, keys);
        assert_eq!(pos, Position::new(1, 8), "keys {keys:?}");
    }
}

#[test]
fn out_of_range_start_is_clamped() {
    assert_eq!(at(9, 99, ""), Position::new(4, 0));
    assert_eq!(simulate(Position::new(3, 3), &[] as &[&str], "jjw"), Position::new(0, 0));
}

#[test]
fn tokens_and_prefixes() {
    assert_eq!(tokenize("2w").len(), 1);
    assert!(tokenize("f.;,").iter().all(|t| t.is_recognized()));
    assert!(!tokenize("x").iter().all(|t| t.is_recognized()));
    assert!(is_valid_prefix(""));
    assert!(is_valid_prefix("12"));
    assert!(is_valid_prefix("d2"));
    assert!(!is_valid_prefix("x"));
}

#[test]
fn enormous_counts_finish_quickly() {
    let ab: &[&str] = &["ab"];
    assert_eq!(simulate(Position::new(0, 0), ab, "99999999999999tb"), Position::new(0, 0));
    assert_eq!(simulate(Position::new(0, 0), ab, "tb99999999999999;"), Position::new(0, 0));
    assert_eq!(simulate(Position::new(0, 0), ab, "99999999999999l"), Position::new(0, 1));
}
