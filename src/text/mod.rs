// Word- and character-split formats.
//
// The intermediate representation has two kinds of lines:
//
//   :<payload>[$]   a word (or single character) and the whitespace that
//                   follows it on the same source line
//   n<SPACE...>[$]  a run of newlines; one SPACE per newline after the first
//
// Inside a payload, LF/SPACE/CR/HT/FF/VT may be written as 1..=6 SPACEs
// followed by HT (see `escape`). `$` after trailing whitespace is an
// optional terminator that decoders ignore.
//
// # Modules
//
// - `escape`: Whitespace escape table and code point classification
// - `encoder`: Text to lines
// - `decoder`: Lines to text
// - `strip`: Terminator removal

pub mod decoder;
pub mod encoder;
pub mod escape;
pub mod strip;

use std::io::{BufRead, Write};

use crate::charset::Charset;
use crate::error::Result;

pub use decoder::TextDecoder;
pub use encoder::TextEncoder;

/// First character of a word/character line.
pub const WORD_MARKER: u8 = b':';
/// First character of a newline-run line.
pub const NEWLINE_MARKER: u8 = b'n';
/// One per additional newline in a newline-run line.
pub const REPEAT_MARK: u8 = b' ';
/// Optional marker after trailing whitespace.
pub const TERMINATOR: u8 = b'$';

/// How much text goes on one intermediate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One whitespace-delimited word per line.
    Words,
    /// One character per line.
    Chars,
}

/// Split text into one word per line. Returns the number of lines written.
pub fn encode_words<R: BufRead, W: Write, C: Charset>(
    input: R,
    output: &mut W,
    charset: C,
    terminate_trailing_ws: bool,
) -> Result<u64> {
    encoder::encode(input, output, charset, Granularity::Words, terminate_trailing_ws)
}

/// Split text into one character per line. Returns the number of lines
/// written.
pub fn encode_chars<R: BufRead, W: Write, C: Charset>(
    input: R,
    output: &mut W,
    charset: C,
    terminate_trailing_ws: bool,
) -> Result<u64> {
    encoder::encode(input, output, charset, Granularity::Chars, terminate_trailing_ws)
}

/// Join word lines back into text. Returns the number of bytes written.
pub fn decode_words<R: BufRead, W: Write, C: Charset>(
    input: R,
    output: &mut W,
    charset: C,
) -> Result<u64> {
    decoder::decode(input, output, charset)
}

/// Join character lines back into text. Returns the number of bytes
/// written.
///
/// Both granularities share one line format, so this accepts word lines
/// too.
pub fn decode_chars<R: BufRead, W: Write, C: Charset>(
    input: R,
    output: &mut W,
    charset: C,
) -> Result<u64> {
    decoder::decode(input, output, charset)
}

/// Remove optional terminators. Returns how many were removed.
pub fn strip_terminators<R: BufRead, W: Write, C: Charset>(
    input: R,
    output: &mut W,
    charset: C,
) -> Result<u64> {
    strip::strip(input, output, charset)
}
