// Removal of optional trailing-whitespace terminators.
//
// A terminator is a `$` that follows whitespace on its line. It and the
// rest of its line are dropped; the LF is kept. Stripping is idempotent:
// nothing left behind is preceded by whitespace on its line.

use std::io::{BufRead, Write};

use crate::charset::Charset;
use crate::error::Result;
use crate::reader::CodePointReader;

use super::TERMINATOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    AfterWhitespace,
    Skip,
}

/// Copy `input` to `output` without terminators. Returns how many
/// terminators were removed.
pub fn strip<R: BufRead, W: Write, C: Charset>(input: R, output: &mut W, charset: C) -> Result<u64> {
    let mut reader = CodePointReader::new(input, charset);
    let mut state = State::Text;
    let mut stripped = 0u64;

    while let Some(unit) = reader.next_code_point()? {
        if unit.ch == '\n' {
            state = State::Text;
        }
        state = match state {
            State::Skip => State::Skip,
            State::AfterWhitespace if unit.ch == char::from(TERMINATOR) => {
                stripped += 1;
                State::Skip
            }
            _ => {
                output.write_all(unit.raw)?;
                if unit.is_whitespace && unit.ch != '\n' {
                    State::AfterWhitespace
                } else {
                    State::Text
                }
            }
        };
    }
    output.flush()?;
    Ok(stripped)
}
