//! Keystroke tokenizer: turns a command string into `(count, command)` tokens
//! without looking at any buffer.

/// Direction and inclusivity of a single-character search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    /// `f`
    To,
    /// `F`
    ToBack,
    /// `t`
    Till,
    /// `T`
    TillBack,
}

impl FindKind {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(FindKind::To),
            'F' => Some(FindKind::ToBack),
            't' => Some(FindKind::Till),
            'T' => Some(FindKind::TillBack),
            _ => None,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, FindKind::To | FindKind::Till)
    }

    /// `f`/`F` land on the match, `t`/`T` stop next to it.
    pub fn lands_on_match(self) -> bool {
        matches!(self, FindKind::To | FindKind::ToBack)
    }

    pub fn reversed(self) -> Self {
        match self {
            FindKind::To => FindKind::ToBack,
            FindKind::ToBack => FindKind::To,
            FindKind::Till => FindKind::TillBack,
            FindKind::TillBack => FindKind::Till,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    WordForward { big: bool },
    WordEnd { big: bool },
    WordBackward { big: bool },
    WordEndBackward { big: bool },
    LineStart,
    FirstNonBlank,
    LineEnd,
    Left,
    Right,
    Down,
    Up,
    /// `gg`, or line `count` when a count is given
    FirstLine,
    /// `G`, or line `count` when a count is given
    LastLine,
    ParagraphBackward,
    ParagraphForward,
    /// `+`
    NextLine,
    /// `-`
    PrevLine,
    /// `_`
    CurrentLine,
    Find { kind: FindKind, target: char },
    RepeatFind,
    RepeatFindReverse,
}

impl Motion {
    fn from_char(c: char) -> Option<Self> {
        let motion = match c {
            'w' => Motion::WordForward { big: false },
            'W' => Motion::WordForward { big: true },
            'e' => Motion::WordEnd { big: false },
            'E' => Motion::WordEnd { big: true },
            'b' => Motion::WordBackward { big: false },
            'B' => Motion::WordBackward { big: true },
            '0' => Motion::LineStart,
            '^' => Motion::FirstNonBlank,
            '$' => Motion::LineEnd,
            'h' => Motion::Left,
            'l' => Motion::Right,
            'j' => Motion::Down,
            'k' => Motion::Up,
            'G' => Motion::LastLine,
            '{' => Motion::ParagraphBackward,
            '}' => Motion::ParagraphForward,
            '+' => Motion::NextLine,
            '-' => Motion::PrevLine,
            '_' => Motion::CurrentLine,
            ';' => Motion::RepeatFind,
            ',' => Motion::RepeatFindReverse,
            _ => return None,
        };
        Some(motion)
    }

    /// Motions that act on whole lines when combined with an operator.
    pub fn is_linewise(self) -> bool {
        matches!(
            self,
            Motion::Down
                | Motion::Up
                | Motion::FirstLine
                | Motion::LastLine
                | Motion::NextLine
                | Motion::PrevLine
                | Motion::CurrentLine
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Visual,
    Delete,
    Change,
    Yank,
    Lowercase,
    Uppercase,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'v' => Some(Operator::Visual),
            'd' => Some(Operator::Delete),
            'c' => Some(Operator::Change),
            'y' => Some(Operator::Yank),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Word,
    BigWord,
    Sentence,
    Paragraph,
    Tag,
    Quote(char),
    Pair { open: char, close: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextObject {
    pub around: bool,
    pub kind: ObjectKind,
}

impl TextObject {
    fn parse(modifier: char, object: char) -> Option<Self> {
        let around = match modifier {
            'i' => false,
            'a' => true,
            _ => return None,
        };
        let kind = match object {
            'w' => ObjectKind::Word,
            'W' => ObjectKind::BigWord,
            's' => ObjectKind::Sentence,
            'p' => ObjectKind::Paragraph,
            't' => ObjectKind::Tag,
            '"' | '\'' | '`' => ObjectKind::Quote(object),
            '(' | ')' | 'b' => ObjectKind::Pair {
                open: '(',
                close: ')',
            },
            '[' | ']' => ObjectKind::Pair {
                open: '[',
                close: ']',
            },
            '{' | '}' | 'B' => ObjectKind::Pair {
                open: '{',
                close: '}',
            },
            '<' | '>' => ObjectKind::Pair {
                open: '<',
                close: '>',
            },
            _ => return None,
        };
        Some(TextObject { around, kind })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Motion(Motion),
    /// `iw`, `da(`, `ci"` ... ; a bare `iw` behaves like a visual selection.
    TextObject {
        operator: Option<Operator>,
        object: TextObject,
    },
    OperatorMotion {
        operator: Operator,
        motion: Motion,
    },
    /// `dd`, `cc`, `yy`, `vv`, `guu`, `gUU`
    Linewise(Operator),
    /// `D`, `C`
    ToLineEnd(Operator),
    /// Input ended before the command was complete (`f`, `d`, `3`, `gu`).
    Incomplete(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub count: Option<usize>,
    pub command: Command,
}

impl Token {
    pub fn repeat(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }

    /// False for fragments the evaluator skips.
    pub fn is_recognized(&self) -> bool {
        !matches!(
            self.command,
            Command::Incomplete(_) | Command::Unknown(_)
        )
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Scanner::new(input).collect()
}

/// Characters that can begin a command after an optional count.
const LEADING: &str = "wWeEbB0^$fFtThljkgG{}+-_;,dcyvDCia";

/// Whether `partial` could still grow into a recognized command: digits
/// alone, or digits followed by a character that starts a command.
pub fn is_valid_prefix(partial: &str) -> bool {
    let rest = partial.trim_start_matches(|c: char| c.is_ascii_digit());
    match rest.chars().next() {
        None => true,
        Some(c) => LEADING.contains(c),
    }
}

enum Step<T> {
    Done(T),
    Incomplete,
    /// Not recognized; the number of characters to skip.
    Unknown(usize),
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn text(&self, from: usize) -> String {
        self.chars[from..self.pos].iter().collect()
    }

    fn incomplete(&mut self, from: usize, count: Option<usize>) -> Token {
        self.pos = self.chars.len();
        Token {
            count,
            command: Command::Incomplete(self.text(from)),
        }
    }

    /// `[1-9][0-9]*`; a leading zero is never a count.
    fn count(&mut self) -> Option<usize> {
        match self.peek() {
            Some('1'..='9') => {}
            _ => return None,
        }
        let mut n: usize = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            n = n.saturating_mul(10).saturating_add(d as usize);
            self.pos += 1;
        }
        Some(n)
    }

    fn motion(&mut self) -> Step<Motion> {
        let Some(c) = self.peek() else {
            return Step::Incomplete;
        };
        if let Some(m) = Motion::from_char(c) {
            self.pos += 1;
            return Step::Done(m);
        }
        if let Some(kind) = FindKind::from_char(c) {
            return match self.peek_at(1) {
                None => Step::Incomplete,
                Some(target) => {
                    self.pos += 2;
                    Step::Done(Motion::Find { kind, target })
                }
            };
        }
        if c == 'g' {
            let m = match self.peek_at(1) {
                None => return Step::Incomplete,
                Some('g') => Motion::FirstLine,
                Some('e') => Motion::WordEndBackward { big: false },
                Some('E') => Motion::WordEndBackward { big: true },
                Some(_) => return Step::Unknown(2),
            };
            self.pos += 2;
            return Step::Done(m);
        }
        Step::Unknown(1)
    }

    /// Parses what follows an operator: its doubled form, a text object, or
    /// a counted motion. `op_end` is the index just past the operator keys.
    fn operand(
        &mut self,
        start: usize,
        op_end: usize,
        operator: Operator,
        double: char,
        count: Option<usize>,
    ) -> Token {
        let Some(c) = self.peek() else {
            return self.incomplete(start, count);
        };
        if c == double {
            self.pos += 1;
            return Token {
                count,
                command: Command::Linewise(operator),
            };
        }
        if c == 'i' || c == 'a' {
            let Some(object) = self.peek_at(1) else {
                return self.incomplete(start, count);
            };
            if let Some(object) = TextObject::parse(c, object) {
                self.pos += 2;
                return Token {
                    count,
                    command: Command::TextObject {
                        operator: Some(operator),
                        object,
                    },
                };
            }
            return self.reject(start, op_end);
        }
        let motion_count = self.count();
        match self.motion() {
            Step::Done(motion) => Token {
                count: combine_counts(count, motion_count),
                command: Command::OperatorMotion { operator, motion },
            },
            Step::Incomplete => self.incomplete(start, count),
            Step::Unknown(_) => self.reject(start, op_end),
        }
    }

    /// Skips only the operator keys; whatever followed is scanned again.
    fn reject(&mut self, start: usize, op_end: usize) -> Token {
        self.pos = op_end;
        Token {
            count: None,
            command: Command::Unknown(self.text(start)),
        }
    }
}

fn combine_counts(outer: Option<usize>, inner: Option<usize>) -> Option<usize> {
    match (outer, inner) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
    }
}

impl Iterator for Scanner {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let start = self.pos;
        if self.peek()? == '0' {
            self.pos += 1;
            return Some(Token {
                count: None,
                command: Command::Motion(Motion::LineStart),
            });
        }
        let count = self.count();
        let Some(c) = self.peek() else {
            return Some(self.incomplete(start, count));
        };

        if c == 'g' && matches!(self.peek_at(1), Some('u') | Some('U')) {
            let (operator, double) = if self.peek_at(1) == Some('u') {
                (Operator::Lowercase, 'u')
            } else {
                (Operator::Uppercase, 'U')
            };
            self.pos += 2;
            return Some(self.operand(start, self.pos, operator, double, count));
        }
        if let Some(operator) = Operator::from_char(c) {
            self.pos += 1;
            return Some(self.operand(start, self.pos, operator, c, count));
        }
        match c {
            'D' | 'C' => {
                self.pos += 1;
                let operator = if c == 'D' {
                    Operator::Delete
                } else {
                    Operator::Change
                };
                return Some(Token {
                    count,
                    command: Command::ToLineEnd(operator),
                });
            }
            'i' | 'a' => {
                let Some(object) = self.peek_at(1) else {
                    return Some(self.incomplete(start, count));
                };
                if let Some(object) = TextObject::parse(c, object) {
                    self.pos += 2;
                    return Some(Token {
                        count,
                        command: Command::TextObject {
                            operator: None,
                            object,
                        },
                    });
                }
                self.pos += 1;
                return Some(Token {
                    count: None,
                    command: Command::Unknown(self.text(start)),
                });
            }
            _ => {}
        }

        let token = match self.motion() {
            Step::Done(motion) => Token {
                count,
                command: Command::Motion(motion),
            },
            Step::Incomplete => self.incomplete(start, count),
            Step::Unknown(width) => {
                self.pos = (self.pos + width).min(self.chars.len());
                Token {
                    count: None,
                    command: Command::Unknown(self.text(start)),
                }
            }
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(input: &str) -> Vec<Command> {
        tokenize(input).into_iter().map(|t| t.command).collect()
    }

    #[test]
    fn counts_attach_to_the_following_command() {
        let tokens = tokenize("3w10j");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].count, Some(3));
        assert_eq!(
            tokens[0].command,
            Command::Motion(Motion::WordForward { big: false })
        );
        assert_eq!(tokens[1].count, Some(10));
        assert_eq!(tokens[1].command, Command::Motion(Motion::Down));
    }

    #[test]
    fn lone_zero_is_line_start() {
        assert_eq!(
            commands("0w"),
            vec![
                Command::Motion(Motion::LineStart),
                Command::Motion(Motion::WordForward { big: false })
            ]
        );
    }

    #[test]
    fn find_consumes_its_target() {
        assert_eq!(
            commands("f;;"),
            vec![
                Command::Motion(Motion::Find {
                    kind: FindKind::To,
                    target: ';'
                }),
                Command::Motion(Motion::RepeatFind)
            ]
        );
    }

    #[test]
    fn trailing_fragments_are_incomplete() {
        for input in ["f", "2", "g", "d", "di", "gu", "dt"] {
            let tokens = tokenize(input);
            assert_eq!(tokens.len(), 1, "{input}");
            assert!(
                matches!(tokens[0].command, Command::Incomplete(_)),
                "{input}"
            );
        }
    }

    #[test]
    fn g_prefixed_motions() {
        assert_eq!(
            commands("gggegEgx"),
            vec![
                Command::Motion(Motion::FirstLine),
                Command::Motion(Motion::WordEndBackward { big: false }),
                Command::Motion(Motion::WordEndBackward { big: true }),
                Command::Unknown("gx".into()),
            ]
        );
    }

    #[test]
    fn operators_take_text_objects_and_motions() {
        let tokens = tokenize("ci\"2d3w");
        assert_eq!(
            tokens[0].command,
            Command::TextObject {
                operator: Some(Operator::Change),
                object: TextObject {
                    around: false,
                    kind: ObjectKind::Quote('"')
                }
            }
        );
        assert_eq!(tokens[1].count, Some(6));
        assert_eq!(
            tokens[1].command,
            Command::OperatorMotion {
                operator: Operator::Delete,
                motion: Motion::WordForward { big: false }
            }
        );
    }

    #[test]
    fn doubled_operators_are_linewise() {
        assert_eq!(
            commands("ddyyguugUU"),
            vec![
                Command::Linewise(Operator::Delete),
                Command::Linewise(Operator::Yank),
                Command::Linewise(Operator::Lowercase),
                Command::Linewise(Operator::Uppercase),
            ]
        );
    }

    #[test]
    fn rejected_operator_rescans_the_rest() {
        let tokens = tokenize("dxw");
        assert_eq!(tokens[0].command, Command::Unknown("d".into()));
        assert_eq!(tokens[1].command, Command::Unknown("x".into()));
        assert_eq!(
            tokens[2].command,
            Command::Motion(Motion::WordForward { big: false })
        );
        assert!(!tokens[0].is_recognized());
        assert!(tokens[2].is_recognized());
    }

    #[test]
    fn bare_text_object() {
        assert_eq!(
            commands("aw"),
            vec![Command::TextObject {
                operator: None,
                object: TextObject {
                    around: true,
                    kind: ObjectKind::Word
                }
            }]
        );
    }

    #[test]
    fn find_kinds_reverse() {
        assert_eq!(FindKind::To.reversed(), FindKind::ToBack);
        assert_eq!(FindKind::TillBack.reversed(), FindKind::Till);
        assert!(FindKind::Till.is_forward());
        assert!(!FindKind::Till.lands_on_match());
    }

    #[test]
    fn valid_prefixes() {
        assert!(is_valid_prefix(""));
        assert!(is_valid_prefix("12"));
        assert!(is_valid_prefix("3w"));
        assert!(is_valid_prefix("f"));
        assert!(is_valid_prefix("di"));
        assert!(!is_valid_prefix("x"));
        assert!(!is_valid_prefix("2q"));
        assert!(!is_valid_prefix(":s"));
    }
}
