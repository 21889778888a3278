// Dump decoder: hex or bit records back to bytes.
//
// Record boundaries carry no meaning here; values are read in order and
// bits accumulate across records. Separators, ghosts and annotations are
// skipped, but once a ghost has been seen no further value may follow.

use std::io::{self, BufRead, Write};

use crate::error::{Error, FormatError, Result};
use crate::reader::ByteReader;

use super::{ANNOTATION_SEP, DumpMode, GHOST, UNIT_SEP};

/// Streaming dump decoder.
pub struct DumpDecoder<W: Write> {
    out: W,
    mode: DumpMode,
    /// Partially assembled byte.
    acc: u8,
    /// Hex digits or bits held in `acc`.
    pending: u8,
    ghost_seen: bool,
    in_annotation: bool,
    bytes_out: u64,
}

impl<W: Write> DumpDecoder<W> {
    pub fn new(out: W, mode: DumpMode) -> Self {
        Self {
            out,
            mode,
            acc: 0,
            pending: 0,
            ghost_seen: false,
            in_annotation: false,
            bytes_out: 0,
        }
    }

    /// Feed one byte of the dump found at `position`.
    pub fn push(&mut self, byte: u8, position: u64) -> Result<()> {
        if self.in_annotation {
            if byte == b'\n' {
                self.in_annotation = false;
            }
            return Ok(());
        }
        match byte {
            b'\n' | UNIT_SEP | b'\t' | b'\r' => self.boundary(position),
            ANNOTATION_SEP => {
                self.boundary(position)?;
                self.in_annotation = true;
                Ok(())
            }
            GHOST => {
                self.boundary(position)?;
                self.ghost_seen = true;
                Ok(())
            }
            _ => {
                let value = self.value_of(byte, position)?;
                if self.ghost_seen {
                    return Err(Error::format(position, FormatError::ValueAfterGhost));
                }
                self.accumulate(value)?;
                Ok(())
            }
        }
    }

    /// Check that no byte is left half-read and flush.
    ///
    /// `position` is the end-of-input offset used in diagnostics. Returns
    /// the writer and the number of bytes written.
    pub fn finish(mut self, position: u64) -> Result<(W, u64)> {
        if self.pending > 0 {
            let kind = match self.mode {
                DumpMode::Hex => FormatError::IncompleteHexByte,
                DumpMode::Bits => FormatError::IncompleteOctet,
            };
            return Err(Error::format(position, kind));
        }
        self.out.flush()?;
        Ok((self.out, self.bytes_out))
    }

    fn value_of(&self, byte: u8, position: u64) -> Result<u8> {
        let ch = char::from(byte);
        match self.mode {
            DumpMode::Hex => ch
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| Error::format(position, FormatError::ExpectedHexDigit(ch))),
            DumpMode::Bits => match byte {
                b'0' => Ok(0),
                b'1' => Ok(1),
                _ => Err(Error::format(position, FormatError::ExpectedBit(ch))),
            },
        }
    }

    fn accumulate(&mut self, value: u8) -> io::Result<()> {
        let (shift, per_byte) = match self.mode {
            DumpMode::Hex => (4, 2),
            DumpMode::Bits => (1, 8),
        };
        self.acc = (self.acc << shift) | value;
        self.pending += 1;
        if self.pending == per_byte {
            self.out.write_all(&[self.acc])?;
            self.bytes_out += 1;
            self.acc = 0;
            self.pending = 0;
        }
        Ok(())
    }

    /// Hex digit pairs may not be split; bits may span anything.
    fn boundary(&self, position: u64) -> Result<()> {
        if self.mode == DumpMode::Hex && self.pending > 0 {
            return Err(Error::format(position, FormatError::IncompleteHexByte));
        }
        Ok(())
    }
}

/// Decode a whole dump. Returns the number of bytes written.
pub fn decode<R: BufRead, W: Write>(input: R, output: &mut W, mode: DumpMode) -> Result<u64> {
    let mut reader = ByteReader::new(input);
    let mut decoder = DumpDecoder::new(output, mode);
    while let Some(byte) = reader.next_byte()? {
        decoder.push(byte, reader.position() - 1)?;
    }
    let (_, bytes) = decoder.finish(reader.position())?;
    Ok(bytes)
}
