// Position-tracking input readers.
//
// `ByteReader` hands out single bytes from any `BufRead` and counts how
// many it has consumed, so errors can name the offending offset.
// `CodePointReader` layers a small sliding window on top and decodes one
// code point at a time through a `Charset`.

use std::io::{self, BufRead};

use crate::charset::{Charset, Decoded};
use crate::error::{Error, Result};

/// Upper bound on `Charset::max_len` honoured by the window.
const MAX_WINDOW: usize = 8;

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Byte-at-a-time reader that tracks the read position.
pub struct ByteReader<R> {
    inner: R,
    position: u64,
}

impl<R: BufRead> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Next byte, or `None` at end of input.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = loop {
            match self.inner.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if byte.is_some() {
            self.inner.consume(1);
            self.position += 1;
        }
        Ok(byte)
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

// ---------------------------------------------------------------------------
// CodePointReader
// ---------------------------------------------------------------------------

/// One decoded code point together with its raw encoding.
#[derive(Debug, Clone, Copy)]
pub struct CodePoint<'a> {
    pub ch: char,
    /// The exact input bytes, written back verbatim when passed through.
    pub raw: &'a [u8],
    pub is_whitespace: bool,
    /// Offset of the first byte in the input stream.
    pub position: u64,
}

/// Decodes a byte stream into code points, one at a time.
///
/// The window holds at most `max_len` bytes. After a code point of `len`
/// bytes is handed out, those bytes are shifted out on the next call and
/// the window is topped up again.
pub struct CodePointReader<R, C> {
    bytes: ByteReader<R>,
    charset: C,
    window: [u8; MAX_WINDOW],
    filled: usize,
    consumed: usize,
    eof: bool,
}

impl<R: BufRead, C: Charset> CodePointReader<R, C> {
    pub fn new(inner: R, charset: C) -> Self {
        Self {
            bytes: ByteReader::new(inner),
            charset,
            window: [0; MAX_WINDOW],
            filled: 0,
            consumed: 0,
            eof: false,
        }
    }

    /// Decode the next code point, or return `None` at end of input.
    ///
    /// A sequence cut short by the end of input is reported as
    /// `TruncatedSequence`, anything else undecodable as `IllegalSequence`.
    pub fn next_code_point(&mut self) -> Result<Option<CodePoint<'_>>> {
        self.window.copy_within(self.consumed..self.filled, 0);
        self.filled -= self.consumed;
        self.consumed = 0;

        let want = self.charset.max_len().clamp(1, MAX_WINDOW);
        while !self.eof && self.filled < want {
            match self.bytes.next_byte()? {
                Some(b) => {
                    self.window[self.filled] = b;
                    self.filled += 1;
                }
                None => self.eof = true,
            }
        }
        if self.filled == 0 {
            return Ok(None);
        }

        let position = self.bytes.position() - self.filled as u64;
        match self.charset.decode(&self.window[..self.filled]) {
            Decoded::Char { ch, len } => {
                let len = len.clamp(1, self.filled);
                self.consumed = len;
                Ok(Some(CodePoint {
                    ch,
                    raw: &self.window[..len],
                    is_whitespace: self.charset.is_whitespace(ch),
                    position,
                }))
            }
            Decoded::Incomplete if self.eof => Err(Error::TruncatedSequence { position }),
            Decoded::Incomplete | Decoded::Invalid => Err(Error::IllegalSequence { position }),
        }
    }
}
