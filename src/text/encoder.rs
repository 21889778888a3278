// Text split encoder: one word (or character) per output line.
//
// Word lines start with `:` and carry the word plus the whitespace that
// follows it on the same source line. Runs of newlines become a single
// `n` line with one SPACE per extra newline. Whitespace that does not
// follow a word (start of input, or right after a newline run) gets a
// word line of its own.

use std::io::{self, BufRead, Write};

use crate::charset::Charset;
use crate::error::Result;
use crate::reader::{CodePoint, CodePointReader};

use super::escape::{self, Class};
use super::{Granularity, NEWLINE_MARKER, REPEAT_MARK, TERMINATOR, WORD_MARKER};

/// Encoder state between two code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing written yet.
    Initial,
    /// In a word line, last code point was part of a word.
    Word,
    /// In a word line, with this many SPACEs held back.
    Spaces(u64),
    /// In a word line, last code point was whitespace already written.
    Whitespace,
    /// In an unterminated newline-run line with this many repeat marks.
    Newlines(u64),
}

/// Streaming text split encoder.
pub struct TextEncoder<W: Write> {
    out: W,
    granularity: Granularity,
    terminate_trailing_ws: bool,
    state: State,
    lines: u64,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(out: W, granularity: Granularity, terminate_trailing_ws: bool) -> Self {
        Self {
            out,
            granularity,
            terminate_trailing_ws,
            state: State::Initial,
            lines: 0,
        }
    }

    /// Feed the next code point of the source text.
    pub fn push(&mut self, unit: &CodePoint<'_>) -> io::Result<()> {
        let class = Class::of(unit.ch, unit.is_whitespace);
        self.state = self.step(self.state, class, unit.raw)?;
        Ok(())
    }

    /// Terminate the last line and flush.
    ///
    /// Returns the writer and the number of lines written.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        self.close(self.state)?;
        self.out.flush()?;
        Ok((self.out, self.lines))
    }

    fn step(&mut self, state: State, class: Class, raw: &[u8]) -> io::Result<State> {
        use State::*;

        let next = match (state, class) {
            (Newlines(marks), Class::Newline) => {
                self.out.write_all(&[REPEAT_MARK])?;
                Newlines(marks + 1)
            }
            (_, Class::Newline) => {
                self.close(state)?;
                self.out.write_all(&[NEWLINE_MARKER])?;
                Newlines(0)
            }

            (Spaces(n), Class::Space) => Spaces(n + 1),
            (Word | Whitespace, Class::Space) => Spaces(1),
            (Initial | Newlines(_), Class::Space) => {
                self.open_word(state)?;
                Spaces(1)
            }

            // Held-back SPACEs right before an HT or an escape would read
            // back as part of it, so each one is escaped on its own.
            (Spaces(n), Class::Tab | Class::Escaped(_)) => {
                escape::write_escaped_spaces(&mut self.out, n)?;
                self.write_whitespace(class, raw)?;
                Whitespace
            }
            (Spaces(n), Class::OtherWhitespace) => {
                escape::write_spaces(&mut self.out, n)?;
                self.write_whitespace(class, raw)?;
                Whitespace
            }
            (Initial | Newlines(_), Class::Tab | Class::Escaped(_) | Class::OtherWhitespace) => {
                self.open_word(state)?;
                self.write_whitespace(class, raw)?;
                Whitespace
            }
            (Word | Whitespace, Class::Tab | Class::Escaped(_) | Class::OtherWhitespace) => {
                self.write_whitespace(class, raw)?;
                Whitespace
            }

            (Word, Class::Word) if self.granularity == Granularity::Words => {
                self.out.write_all(raw)?;
                Word
            }
            (_, Class::Word) => {
                self.open_word(state)?;
                self.out.write_all(raw)?;
                Word
            }
        };
        Ok(next)
    }

    fn write_whitespace(&mut self, class: Class, raw: &[u8]) -> io::Result<()> {
        match class {
            Class::Tab => self.out.write_all(&[escape::HT]),
            Class::Escaped(ordinal) => escape::write_escape(&mut self.out, ordinal),
            _ => self.out.write_all(raw),
        }
    }

    /// Close the current line, if any, and start a word line.
    fn open_word(&mut self, state: State) -> io::Result<()> {
        self.close(state)?;
        self.out.write_all(&[WORD_MARKER])
    }

    /// Terminate whatever line `state` has open. Held-back SPACEs end the
    /// line, where they cannot be mistaken for an escape.
    fn close(&mut self, state: State) -> io::Result<()> {
        match state {
            State::Initial => Ok(()),
            State::Word => self.end_line(false),
            State::Spaces(n) => {
                escape::write_spaces(&mut self.out, n)?;
                self.end_line(true)
            }
            State::Whitespace => self.end_line(true),
            State::Newlines(marks) => self.end_line(marks > 0),
        }
    }

    fn end_line(&mut self, trailing_ws: bool) -> io::Result<()> {
        if trailing_ws && self.terminate_trailing_ws {
            self.out.write_all(&[TERMINATOR, b'\n'])?;
        } else {
            self.out.write_all(b"\n")?;
        }
        self.lines += 1;
        Ok(())
    }
}

/// Encode a whole stream. Returns the number of lines written.
pub fn encode<R: BufRead, W: Write, C: Charset>(
    input: R,
    output: &mut W,
    charset: C,
    granularity: Granularity,
    terminate_trailing_ws: bool,
) -> Result<u64> {
    let mut reader = CodePointReader::new(input, charset);
    let mut encoder = TextEncoder::new(output, granularity, terminate_trailing_ws);
    while let Some(unit) = reader.next_code_point()? {
        encoder.push(&unit)?;
    }
    let (_, lines) = encoder.finish()?;
    Ok(lines)
}
