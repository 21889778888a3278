// Text split decoder: rebuilds the original text from word/newline lines.

use std::io::{self, BufRead, Write};

use crate::charset::Charset;
use crate::error::{Error, FormatError, Result};
use crate::reader::{CodePoint, CodePointReader};

use super::escape::{self, ESCAPED, MAX_ORDINAL};
use super::{NEWLINE_MARKER, REPEAT_MARK, TERMINATOR, WORD_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a line marker.
    LineStart,
    /// In a newline-run line, after this many repeat marks.
    Newlines(u64),
    /// In a word line, after the marker or a non-whitespace character.
    Literal,
    /// In a word line, holding back 1..=MAX_ORDINAL SPACEs that may turn
    /// out to be an escape.
    Spaces(u8),
    /// In a word line, after whitespace; a terminator may follow.
    Whitespace,
    /// After a terminator; the rest of the line is ignored.
    Skip,
}

/// Streaming text split decoder.
pub struct TextDecoder<W: Write> {
    out: W,
    state: State,
    bytes_out: u64,
}

impl<W: Write> TextDecoder<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: State::LineStart,
            bytes_out: 0,
        }
    }

    /// Feed the next code point of the intermediate representation.
    pub fn push(&mut self, unit: &CodePoint<'_>) -> Result<()> {
        self.state = self.step(self.state, unit)?;
        Ok(())
    }

    /// Flush held-back SPACEs and the writer.
    ///
    /// Returns the writer and the number of bytes reconstructed. A final
    /// line without its LF is accepted.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        if let State::Spaces(n) = self.state {
            self.write_spaces(n)?;
        }
        self.out.flush()?;
        Ok((self.out, self.bytes_out))
    }

    fn step(&mut self, state: State, unit: &CodePoint<'_>) -> Result<State> {
        use State::*;

        let byte = u8::try_from(unit.ch).ok();
        let next = match (state, byte) {
            (LineStart, Some(WORD_MARKER)) => Literal,
            (LineStart, Some(NEWLINE_MARKER)) => {
                self.write(b"\n")?;
                Newlines(0)
            }
            (LineStart, _) => {
                return Err(Error::format(
                    unit.position,
                    FormatError::UnknownLineOpener(unit.ch),
                ));
            }

            (Newlines(marks), Some(REPEAT_MARK)) => {
                self.write(b"\n")?;
                Newlines(marks + 1)
            }
            (Newlines(_), Some(b'\n')) => LineStart,
            (Newlines(marks), Some(TERMINATOR)) if marks > 0 => Skip,
            (Newlines(_), _) => {
                return Err(Error::format(
                    unit.position,
                    FormatError::InvalidRepeatMark(unit.ch),
                ));
            }

            (Skip, Some(b'\n')) => LineStart,
            (Skip, _) => Skip,

            // No escape is longer than MAX_ORDINAL, so the oldest held-back
            // SPACE must be a literal one.
            (Spaces(n), Some(escape::SPACE)) if n == MAX_ORDINAL => {
                self.write(&[escape::SPACE])?;
                Spaces(n)
            }
            (Spaces(n), Some(escape::SPACE)) => Spaces(n + 1),
            (Spaces(n), Some(escape::HT)) => {
                self.write(&[ESCAPED[usize::from(n) - 1]])?;
                Whitespace
            }
            (Spaces(n), _) => {
                self.write_spaces(n)?;
                return self.step(Whitespace, unit);
            }

            (Literal | Whitespace, Some(escape::SPACE)) => Spaces(1),
            (Literal | Whitespace, Some(b'\n')) => LineStart,
            (Whitespace, Some(TERMINATOR)) => Skip,
            (Literal | Whitespace, _) => {
                self.write(unit.raw)?;
                if unit.is_whitespace {
                    Whitespace
                } else {
                    Literal
                }
            }
        };
        Ok(next)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.bytes_out += bytes.len() as u64;
        Ok(())
    }

    fn write_spaces(&mut self, n: u8) -> io::Result<()> {
        escape::write_spaces(&mut self.out, u64::from(n))?;
        self.bytes_out += u64::from(n);
        Ok(())
    }
}

/// Decode a whole stream. Returns the number of bytes written.
pub fn decode<R: BufRead, W: Write, C: Charset>(input: R, output: &mut W, charset: C) -> Result<u64> {
    let mut reader = CodePointReader::new(input, charset);
    let mut decoder = TextDecoder::new(output);
    while let Some(unit) = reader.next_code_point()? {
        decoder.push(&unit)?;
    }
    let (_, bytes) = decoder.finish()?;
    Ok(bytes)
}
