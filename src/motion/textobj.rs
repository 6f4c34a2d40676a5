//! Regions selected by operators and text objects.

use super::eval::{classify, is_blank, Buffer, Class, Cursor};
use super::token::{Motion, ObjectKind, Operator, TextObject};
use crate::exercise::Position;

/// Inclusive region an operator would act on, together with the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub operator: Operator,
    pub start: Position,
    pub end: Position,
    pub linewise: bool,
}

impl Selection {
    fn chars(operator: Operator, line: usize, (start, end): (usize, usize)) -> Self {
        Self {
            operator,
            start: Position::new(line, start),
            end: Position::new(line, end),
            linewise: false,
        }
    }

    pub(crate) fn lines(buf: &Buffer, operator: Operator, first: usize, last: usize) -> Self {
        Self {
            operator,
            start: Position::new(first, 0),
            end: Position::new(last, buf.last_col(last)),
            linewise: true,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {}-{}", self.operator, self.start, self.end)?;
        if self.linewise {
            write!(f, " (linewise)")?;
        }
        Ok(())
    }
}

pub(crate) fn object_selection(
    buf: &Buffer,
    pos: Position,
    operator: Operator,
    object: TextObject,
) -> Option<Selection> {
    if let ObjectKind::Paragraph = object.kind {
        let (first, last) = paragraph_object(buf, pos.line, object.around);
        return Some(Selection::lines(buf, operator, first, last));
    }
    let line = buf.line(pos.line);
    if line.is_empty() {
        return None;
    }
    let col = pos.col.min(line.len() - 1);
    let around = object.around;
    let bounds = match object.kind {
        ObjectKind::Word => Some(word_object(line, col, false, around)),
        ObjectKind::BigWord => Some(word_object(line, col, true, around)),
        ObjectKind::Sentence => Some(sentence_object(line, col, around)),
        ObjectKind::Quote(q) => quote_object(line, col, q, around),
        ObjectKind::Pair { open: '<', close: '>' } => {
            pair_object(line, col, '<', '>', around).or_else(|| tag_object(line, col, around))
        }
        ObjectKind::Pair { open, close } => pair_object(line, col, open, close, around),
        ObjectKind::Tag => tag_object(line, col, around),
        ObjectKind::Paragraph => None,
    }?;
    Some(Selection::chars(operator, pos.line, bounds))
}

/// Region covered by `operator` followed by `motion`. The cursor itself does
/// not move, but a search inside the motion is remembered for `;` and `,`.
pub(crate) fn motion_selection(
    cursor: &mut Cursor<'_>,
    operator: Operator,
    motion: Motion,
    count: Option<usize>,
) -> Option<Selection> {
    let buf = cursor.buf;
    let from = cursor.pos;

    // `cw` on a word behaves like `ce`.
    let motion = match motion {
        Motion::WordForward { big }
            if operator == Operator::Change && buf.char_at(from).is_some_and(|c| !is_blank(c)) =>
        {
            Motion::WordEnd { big }
        }
        m => m,
    };

    let to = buf.clamp(cursor.target(motion, count)?);
    if motion.is_linewise() {
        let (first, last) = (from.line.min(to.line), from.line.max(to.line));
        return Some(Selection::lines(buf, operator, first, last));
    }

    let inclusive = operator == Operator::Visual
        || match motion {
            Motion::WordEnd { .. } | Motion::WordEndBackward { .. } | Motion::LineEnd => true,
            Motion::Find { kind, .. } => kind.is_forward(),
            Motion::RepeatFind => cursor.last_find().is_some_and(|k| k.is_forward()),
            Motion::RepeatFindReverse => {
                cursor.last_find().is_some_and(|k| k.reversed().is_forward())
            }
            _ => false,
        };

    let (start, mut end) = if to < from { (to, from) } else { (from, to) };
    if !inclusive {
        if start == end {
            return None;
        }
        end = if matches!(motion, Motion::WordForward { .. }) && end.line > start.line {
            Position::new(start.line, buf.last_col(start.line))
        } else if end.col == 0 {
            Position::new(end.line - 1, buf.last_col(end.line - 1))
        } else {
            Position::new(end.line, end.col - 1)
        };
    }
    Some(Selection {
        operator,
        start,
        end,
        linewise: false,
    })
}

/// `D` / `C`: cursor through the end of its line.
pub(crate) fn to_line_end(buf: &Buffer, pos: Position, operator: Operator) -> Option<Selection> {
    let len = buf.line_len(pos.line);
    if len == 0 {
        return None;
    }
    Some(Selection::chars(operator, pos.line, (pos.col.min(len - 1), len - 1)))
}

fn word_object(line: &[char], col: usize, big: bool, around: bool) -> (usize, usize) {
    let class_at = |i: usize| classify(line[i], big);
    let class = class_at(col);
    let mut start = col;
    while start > 0 && class_at(start - 1) == class {
        start -= 1;
    }
    let mut end = col;
    while end + 1 < line.len() && class_at(end + 1) == class {
        end += 1;
    }
    if !around {
        return (start, end);
    }
    if class == Class::Blank {
        // blanks plus the word after them
        if end + 1 < line.len() {
            end += 1;
            let next = class_at(end);
            while end + 1 < line.len() && class_at(end + 1) == next {
                end += 1;
            }
        }
        return (start, end);
    }
    let mut trail = end;
    while trail + 1 < line.len() && is_blank(line[trail + 1]) {
        trail += 1;
    }
    if trail > end {
        end = trail;
    } else {
        while start > 0 && is_blank(line[start - 1]) {
            start -= 1;
        }
    }
    (start, end)
}

fn sentence_object(line: &[char], col: usize, around: bool) -> (usize, usize) {
    let is_end = |i: usize| {
        matches!(line[i], '.' | '!' | '?') && (i + 1 == line.len() || is_blank(line[i + 1]))
    };
    let mut start = (0..col).rev().find(|&i| is_end(i)).map_or(0, |e| e + 1);
    while start < col && is_blank(line[start]) {
        start += 1;
    }
    let mut end = (col..line.len()).find(|&i| is_end(i)).unwrap_or(line.len() - 1);
    if around {
        while end + 1 < line.len() && is_blank(line[end + 1]) {
            end += 1;
        }
    }
    (start, end)
}

/// Line range of the run of blank or non-blank lines around `line`; the
/// around form also takes the following run of the other kind.
fn paragraph_object(buf: &Buffer, line: usize, around: bool) -> (usize, usize) {
    let blank = buf.is_blank_line(line);
    let mut first = line;
    while first > 0 && buf.is_blank_line(first - 1) == blank {
        first -= 1;
    }
    let mut last = line;
    while last < buf.last_line() && buf.is_blank_line(last + 1) == blank {
        last += 1;
    }
    if around {
        while last < buf.last_line() && buf.is_blank_line(last + 1) != blank {
            last += 1;
        }
    }
    (first, last)
}

fn inner_or_around(open: usize, close: usize, around: bool) -> Option<(usize, usize)> {
    if around {
        Some((open, close))
    } else if close > open + 1 {
        Some((open + 1, close - 1))
    } else {
        None
    }
}

/// Quotes pair up left to right; a cursor outside every pair uses the next
/// two quotes after it.
fn quote_object(line: &[char], col: usize, quote: char, around: bool) -> Option<(usize, usize)> {
    let quotes: Vec<usize> = (0..line.len()).filter(|&i| line[i] == quote).collect();
    let enclosing = quotes
        .chunks_exact(2)
        .find(|pair| pair[0] <= col && col <= pair[1])
        .map(|pair| (pair[0], pair[1]));
    let (open, close) = match enclosing {
        Some(pair) => pair,
        None => {
            let mut after = quotes.iter().copied().filter(|&i| i > col);
            (after.next()?, after.next()?)
        }
    };
    inner_or_around(open, close, around)
}

/// Innermost `open`/`close` pair on the line that contains the cursor.
fn pair_object(
    line: &[char],
    col: usize,
    open: char,
    close: char,
    around: bool,
) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut open_idx = None;
    for i in (0..=col).rev() {
        let c = line[i];
        if c == close && i != col {
            depth += 1;
        } else if c == open {
            if depth == 0 {
                open_idx = Some(i);
                break;
            }
            depth -= 1;
        }
    }
    let open_idx = open_idx?;

    let mut depth = 0usize;
    let mut close_idx = None;
    for (i, &c) in line.iter().enumerate().skip(open_idx) {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                close_idx = Some(i);
                break;
            }
        }
    }
    let close_idx = close_idx?;
    if col > close_idx {
        return None;
    }
    inner_or_around(open_idx, close_idx, around)
}

#[derive(Debug)]
struct Tag {
    name: String,
    start: usize,
    end: usize,
    closing: bool,
}

fn scan_tags(line: &[char]) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut i = 0;
    while i < line.len() {
        if line[i] != '<' {
            i += 1;
            continue;
        }
        let Some(end) = (i + 1..line.len()).find(|&j| line[j] == '>') else {
            break;
        };
        let inner = &line[i + 1..end];
        let closing = inner.first() == Some(&'/');
        let name: String = inner
            .iter()
            .skip(usize::from(closing))
            .take_while(|&&c| !is_blank(c) && c != '/')
            .collect();
        let self_closing = inner.last() == Some(&'/');
        if !name.is_empty() && !self_closing {
            tags.push(Tag {
                name,
                start: i,
                end,
                closing,
            });
        }
        i = end + 1;
    }
    tags
}

/// Innermost `<name ...>...</name>` element containing the cursor.
fn tag_object(line: &[char], col: usize, around: bool) -> Option<(usize, usize)> {
    let mut open: Vec<Tag> = Vec::new();
    let mut best: Option<(usize, usize, usize, usize)> = None;
    for tag in scan_tags(line) {
        if !tag.closing {
            open.push(tag);
            continue;
        }
        let Some(idx) = open.iter().rposition(|t| t.name == tag.name) else {
            continue;
        };
        let opener = &open[idx];
        if opener.start <= col && col <= tag.end && best.map_or(true, |b| opener.start > b.0) {
            best = Some((opener.start, opener.end, tag.start, tag.end));
        }
        open.truncate(idx);
    }
    let (open_start, open_end, close_start, close_end) = best?;
    if around {
        Some((open_start, close_end))
    } else if close_start > open_end + 1 {
        Some((open_end + 1, close_start - 1))
    } else {
        None
    }
}
