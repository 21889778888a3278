// Whitespace escape scheme for the word/character formats.
//
// Six whitespace characters have an escape ordinal (1-based position in
// `ESCAPED`). An escape is written as `ordinal` SPACEs followed by one HT.
// SPACE and HT that do not form such a pattern stand for themselves.

use std::io::{self, Write};

/// Characters with an escape ordinal, in ordinal order.
pub const ESCAPED: [u8; 6] = [b'\n', b' ', b'\r', b'\t', 0x0C, 0x0B];

/// Longest escape run: an escape never has more SPACEs than this.
pub const MAX_ORDINAL: u8 = ESCAPED.len() as u8;

pub const SPACE: u8 = b' ';
pub const HT: u8 = b'\t';

/// Ordinal of SPACE itself, used when pending SPACEs have to be escaped.
pub const SPACE_ORDINAL: u8 = 2;

/// How the text encoder treats a code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// LF, the only newline-equivalent.
    Newline,
    Space,
    Tab,
    /// CR, FF or VT: always written as an escape with this ordinal.
    Escaped(u8),
    /// Any other whitespace; passes through literally.
    OtherWhitespace,
    /// Part of a word.
    Word,
}

impl Class {
    pub fn of(ch: char, is_whitespace: bool) -> Self {
        match ch {
            '\n' => Self::Newline,
            ' ' => Self::Space,
            '\t' => Self::Tab,
            _ => match ordinal(ch) {
                Some(ord) => Self::Escaped(ord),
                None if is_whitespace => Self::OtherWhitespace,
                None => Self::Word,
            },
        }
    }
}

/// Escape ordinal of `ch`, if it has one.
pub fn ordinal(ch: char) -> Option<u8> {
    let b = u8::try_from(ch).ok()?;
    ESCAPED
        .iter()
        .position(|&e| e == b)
        .map(|i| i as u8 + 1)
}

/// Character encoded by an escape run of `ordinal` SPACEs.
pub fn unescape(ordinal: u8) -> Option<u8> {
    let index = usize::from(ordinal).checked_sub(1)?;
    ESCAPED.get(index).copied()
}

/// Write the escape for `ordinal`.
pub fn write_escape<W: Write + ?Sized>(out: &mut W, ordinal: u8) -> io::Result<()> {
    debug_assert!((1..=MAX_ORDINAL).contains(&ordinal));
    let mut buf = [SPACE; MAX_ORDINAL as usize + 1];
    let n = usize::from(ordinal);
    buf[n] = HT;
    out.write_all(&buf[..=n])
}

/// Write `count` SPACEs, each escaped on its own.
///
/// Needed when pending SPACEs are followed by an HT or an escape, where a
/// literal run would read back as the start of an escape.
pub fn write_escaped_spaces<W: Write + ?Sized>(out: &mut W, count: u64) -> io::Result<()> {
    for _ in 0..count {
        write_escape(out, SPACE_ORDINAL)?;
    }
    Ok(())
}

/// Write `count` literal SPACEs.
pub fn write_spaces<W: Write + ?Sized>(out: &mut W, count: u64) -> io::Result<()> {
    const CHUNK: [u8; 32] = [SPACE; 32];
    let mut left = count;
    while left > 0 {
        let n = left.min(CHUNK.len() as u64);
        out.write_all(&CHUNK[..n as usize])?;
        left -= n;
    }
    Ok(())
}
