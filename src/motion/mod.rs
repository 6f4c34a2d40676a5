//! Motion simulation: where the cursor lands, and what an operator would
//! act on, after a command string runs against a read-only buffer.
//!
//! The simulator never fails. Unrecognized or incomplete keystrokes are
//! skipped and every position is clamped into the buffer.

mod eval;
mod textobj;
pub mod token;

use tracing::trace;

use crate::exercise::Position;
use eval::{Buffer, Cursor};
pub use textobj::Selection;
pub use token::{
    is_valid_prefix, tokenize, Command, FindKind, Motion, ObjectKind, Operator, TextObject, Token,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    pub position: Position,
    /// Region chosen by the last operator or text object, if any.
    pub selection: Option<Selection>,
}

pub fn simulate<S: AsRef<str>>(start: Position, buffer: &[S], commands: &str) -> Position {
    simulate_with_selection(start, buffer, commands).position
}

pub fn simulate_with_selection<S: AsRef<str>>(
    start: Position,
    buffer: &[S],
    commands: &str,
) -> SimulationResult {
    let buf = Buffer::new(buffer);
    let mut cursor = Cursor::new(&buf, start);
    let mut selection = None;

    for token in tokenize(commands) {
        let count = token.count;
        let repeat = token.repeat();
        match token.command {
            Command::Motion(motion) => cursor.apply(motion, count),
            Command::TextObject { operator, object } => {
                let operator = operator.unwrap_or(Operator::Visual);
                selection = textobj::object_selection(&buf, cursor.pos, operator, object);
            }
            Command::OperatorMotion { operator, motion } => {
                selection = textobj::motion_selection(&mut cursor, operator, motion, count);
            }
            Command::Linewise(operator) => {
                let first = cursor.pos.line;
                let last = first.saturating_add(repeat - 1).min(buf.last_line());
                selection = Some(Selection::lines(&buf, operator, first, last));
            }
            Command::ToLineEnd(operator) => {
                selection = textobj::to_line_end(&buf, cursor.pos, operator);
            }
            Command::Incomplete(text) | Command::Unknown(text) => {
                trace!(skipped = %text, "ignoring keystrokes");
            }
        }
    }

    SimulationResult {
        position: buf.clamp(cursor.pos),
        selection,
    }
}
