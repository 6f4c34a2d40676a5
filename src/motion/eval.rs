//! Applies motion tokens to a cursor over a read-only buffer.

use super::token::{FindKind, Motion};
use crate::exercise::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Blank,
    Word,
    Punct,
}

pub(crate) fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Character class used by word motions. For WORD motions every non-blank
/// character is `Word`.
pub(crate) fn classify(c: char, big: bool) -> Class {
    if is_blank(c) {
        Class::Blank
    } else if big || c.is_alphanumeric() || c == '_' {
        Class::Word
    } else {
        Class::Punct
    }
}

/// Lines of the buffer as characters, so columns are character indices.
#[derive(Debug, Clone)]
pub(crate) struct Buffer {
    lines: Vec<Vec<char>>,
}

impl Buffer {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut lines: Vec<Vec<char>> = lines
            .iter()
            .map(|l| l.as_ref().chars().collect())
            .collect();
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        Self { lines }
    }

    pub fn line(&self, n: usize) -> &[char] {
        self.lines.get(n).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn line_len(&self, n: usize) -> usize {
        self.line(n).len()
    }

    pub fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn last_col(&self, n: usize) -> usize {
        self.line_len(n).saturating_sub(1)
    }

    pub fn char_at(&self, p: Position) -> Option<char> {
        self.line(p.line).get(p.col).copied()
    }

    pub fn is_blank_line(&self, n: usize) -> bool {
        self.line(n).iter().all(|&c| is_blank(c))
    }

    /// Empty lines count as blank.
    fn class_at(&self, p: Position, big: bool) -> Class {
        self.char_at(p).map_or(Class::Blank, |c| classify(c, big))
    }

    pub fn clamp(&self, p: Position) -> Position {
        let line = p.line.min(self.last_line());
        Position::new(line, p.col.min(self.last_col(line)))
    }

    fn next_pos(&self, p: Position) -> Option<Position> {
        if p.col + 1 < self.line_len(p.line) {
            Some(Position::new(p.line, p.col + 1))
        } else if p.line < self.last_line() {
            Some(Position::new(p.line + 1, 0))
        } else {
            None
        }
    }

    fn prev_pos(&self, p: Position) -> Option<Position> {
        if p.col > 0 {
            Some(Position::new(p.line, p.col - 1))
        } else if p.line > 0 {
            Some(Position::new(p.line - 1, self.last_col(p.line - 1)))
        } else {
            None
        }
    }

    pub fn first_non_blank(&self, line: usize) -> Position {
        let col = self.line(line).iter().position(|&c| !is_blank(c)).unwrap_or(0);
        Position::new(line, col)
    }
}

/// Cursor state carried across tokens of one command string.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'b> {
    pub buf: &'b Buffer,
    pub pos: Position,
    last_find: Option<(FindKind, char)>,
}

impl<'b> Cursor<'b> {
    pub fn new(buf: &'b Buffer, start: Position) -> Self {
        Self {
            buf,
            pos: buf.clamp(start),
            last_find: None,
        }
    }

    /// Destination of `motion` from the current position, or `None` when a
    /// search finds nothing. Does not move the cursor but does record finds.
    pub fn target(&mut self, motion: Motion, count: Option<usize>) -> Option<Position> {
        let repeat = count.unwrap_or(1).max(1);
        let buf = self.buf;
        let p = self.pos;
        let dest = match motion {
            Motion::FirstLine => {
                let line = count.map_or(0, |n| n.saturating_sub(1));
                buf.first_non_blank(line.min(buf.last_line()))
            }
            Motion::LastLine => {
                let line = count.map_or(buf.last_line(), |n| n.saturating_sub(1));
                buf.first_non_blank(line.min(buf.last_line()))
            }
            Motion::CurrentLine => {
                let line = p.line.saturating_add(repeat - 1).min(buf.last_line());
                buf.first_non_blank(line)
            }
            Motion::Find { kind, target } => {
                self.last_find = Some((kind, target));
                return self.repeat_find(kind, target, repeat);
            }
            Motion::RepeatFind => {
                let (kind, target) = self.last_find?;
                return self.repeat_find(kind, target, repeat);
            }
            Motion::RepeatFindReverse => {
                let (kind, target) = self.last_find?;
                return self.repeat_find(kind.reversed(), target, repeat);
            }
            _ => {
                let mut p = p;
                for _ in 0..repeat {
                    let next = self.step(motion, p);
                    if next == p {
                        break;
                    }
                    p = next;
                }
                p
            }
        };
        Some(dest)
    }

    pub fn last_find(&self) -> Option<FindKind> {
        self.last_find.map(|(kind, _)| kind)
    }

    /// Moves the cursor; a failed search leaves it where it is.
    pub fn apply(&mut self, motion: Motion, count: Option<usize>) {
        if let Some(dest) = self.target(motion, count) {
            self.pos = self.buf.clamp(dest);
        }
    }

    fn repeat_find(&self, kind: FindKind, target: char, repeat: usize) -> Option<Position> {
        let mut p = self.pos;
        for _ in 0..repeat {
            let next = find_in_line(self.buf, p, kind, target)?;
            if next == p {
                break;
            }
            p = next;
        }
        Some(p)
    }

    fn step(&self, motion: Motion, p: Position) -> Position {
        let buf = self.buf;
        match motion {
            Motion::WordForward { big } => word_forward(buf, p, big),
            Motion::WordEnd { big } => word_end(buf, p, big),
            Motion::WordBackward { big } => word_backward(buf, p, big),
            Motion::WordEndBackward { big } => word_end_backward(buf, p, big),
            Motion::LineStart => Position::new(p.line, 0),
            Motion::FirstNonBlank => buf.first_non_blank(p.line),
            Motion::LineEnd => Position::new(p.line, buf.last_col(p.line)),
            Motion::Left => Position::new(p.line, p.col.saturating_sub(1)),
            Motion::Right => Position::new(p.line, (p.col + 1).min(buf.last_col(p.line))),
            Motion::Down if p.line < buf.last_line() => buf.clamp(Position::new(p.line + 1, p.col)),
            Motion::Up if p.line > 0 => buf.clamp(Position::new(p.line - 1, p.col)),
            Motion::NextLine if p.line < buf.last_line() => buf.first_non_blank(p.line + 1),
            Motion::PrevLine if p.line > 0 => buf.first_non_blank(p.line - 1),
            Motion::ParagraphForward => {
                let line = (p.line + 1..=buf.last_line())
                    .find(|&n| buf.is_blank_line(n))
                    .unwrap_or(buf.last_line());
                Position::new(line, 0)
            }
            Motion::ParagraphBackward => {
                let line = (0..p.line).rev().find(|&n| buf.is_blank_line(n)).unwrap_or(0);
                Position::new(line, 0)
            }
            _ => p,
        }
    }
}

/// Search on the current line only.
fn find_in_line(buf: &Buffer, p: Position, kind: FindKind, target: char) -> Option<Position> {
    let line = buf.line(p.line);
    let col = if kind.is_forward() {
        let hit = (p.col + 1..line.len()).find(|&i| line[i] == target)?;
        if kind.lands_on_match() {
            hit
        } else {
            hit - 1
        }
    } else {
        let hit = (0..p.col.min(line.len())).rev().find(|&i| line[i] == target)?;
        if kind.lands_on_match() {
            hit
        } else {
            hit + 1
        }
    };
    Some(Position::new(p.line, col))
}

/// `w`/`W`: leave the current run, then skip blanks. Empty lines stop the
/// motion; at the end of the buffer the cursor stays on the last character.
fn word_forward(buf: &Buffer, start: Position, big: bool) -> Position {
    let class = buf.class_at(start, big);
    let mut p = start;
    loop {
        let Some(next) = buf.next_pos(p) else {
            return p;
        };
        let crossed = next.line != p.line;
        p = next;
        if crossed || class == Class::Blank || buf.class_at(p, big) != class {
            break;
        }
    }
    while buf.class_at(p, big) == Class::Blank && buf.line_len(p.line) > 0 {
        match buf.next_pos(p) {
            Some(next) => p = next,
            None => return p,
        }
    }
    p
}

/// `e`/`E`: advance at least once, skip blanks, then run to the last
/// character of the same class.
fn word_end(buf: &Buffer, start: Position, big: bool) -> Position {
    let Some(mut p) = buf.next_pos(start) else {
        return start;
    };
    while buf.class_at(p, big) == Class::Blank {
        match buf.next_pos(p) {
            Some(next) => p = next,
            None => return start,
        }
    }
    let class = buf.class_at(p, big);
    while let Some(next) = buf.next_pos(p) {
        if next.line != p.line || buf.class_at(next, big) != class {
            break;
        }
        p = next;
    }
    p
}

/// `b`/`B`: step back, skip blanks, then run to the first character of the
/// same class. Punctuation runs and word runs are separate stops.
fn word_backward(buf: &Buffer, start: Position, big: bool) -> Position {
    let Some(mut p) = buf.prev_pos(start) else {
        return start;
    };
    while buf.class_at(p, big) == Class::Blank {
        if buf.line_len(p.line) == 0 {
            return p;
        }
        match buf.prev_pos(p) {
            Some(prev) => p = prev,
            None => return p,
        }
    }
    let class = buf.class_at(p, big);
    while let Some(prev) = buf.prev_pos(p) {
        if prev.line != p.line || buf.class_at(prev, big) != class {
            break;
        }
        p = prev;
    }
    p
}

/// `ge`/`gE`: leave the current run backwards, then skip blanks.
fn word_end_backward(buf: &Buffer, start: Position, big: bool) -> Position {
    let class = buf.class_at(start, big);
    let mut p = start;
    loop {
        let Some(prev) = buf.prev_pos(p) else {
            return p;
        };
        let crossed = prev.line != p.line;
        p = prev;
        if crossed || class == Class::Blank || buf.class_at(p, big) != class {
            break;
        }
    }
    while buf.class_at(p, big) == Class::Blank && buf.line_len(p.line) > 0 {
        match buf.prev_pos(p) {
            Some(prev) => p = prev,
            None => return p,
        }
    }
    p
}
