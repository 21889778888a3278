// Hex and bit dump formats for binary files.
//
// Every byte becomes a 2-digit uppercase hex token, or 8 `0`/`1` tokens
// (most significant bit first). Tokens are grouped into records of
// `units_per_line` tokens separated by SPACE, one record per line. Slots
// of the final record that no input reached hold ghost placeholders. An
// optional `|`-separated ASCII annotation follows each record; decoders
// skip it.
//
// # Modules
//
// - `encoder`: Bytes to dump records
// - `decoder`: Dump records to bytes

pub mod decoder;
pub mod encoder;

use std::io::{BufRead, Write};

use crate::error::{Error, Result};

pub use decoder::DumpDecoder;
pub use encoder::DumpEncoder;

/// Separates tokens within a record.
pub const UNIT_SEP: u8 = b' ';
/// Starts the ASCII annotation of a record.
pub const ANNOTATION_SEP: u8 = b'|';
/// Fills a slot for which no input existed.
pub const GHOST: u8 = b'-';

/// What one dump unit represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    /// One byte per unit, as two uppercase hex digits.
    Hex,
    /// One bit per unit, as `0` or `1`.
    Bits,
}

impl DumpMode {
    /// The placeholder written for one missing unit.
    pub fn ghost(self) -> &'static [u8] {
        match self {
            Self::Hex => b"--",
            Self::Bits => b"-",
        }
    }
}

/// Record layout for the dump encoder.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub mode: DumpMode,
    /// Units per record; must be at least 1.
    pub units_per_line: usize,
    /// Append an ASCII annotation to every record.
    pub ascii_dump: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            mode: DumpMode::Hex,
            units_per_line: 1,
            ascii_dump: false,
        }
    }
}

impl DumpOptions {
    pub fn validate(&self) -> Result<()> {
        if self.units_per_line == 0 {
            return Err(Error::Config("units per line must be at least 1".into()));
        }
        Ok(())
    }
}

/// Bytes the ASCII annotation buffer must hold for one record.
///
/// Hex records contribute exactly `units_per_line` whole bytes. A bit
/// record spans at most `ceil(units_per_line / 8)` bytes that start in it,
/// plus one byte carried over from the previous record whose first bits
/// were already written there but whose last bit lands in this one.
pub fn annotation_capacity(mode: DumpMode, units_per_line: usize) -> usize {
    match mode {
        DumpMode::Hex => units_per_line,
        DumpMode::Bits => units_per_line.div_ceil(8) + 1,
    }
}

/// Render `byte` for the ASCII annotation: visible ASCII as itself,
/// everything else (SPACE included) as `.`.
pub fn printable(byte: u8) -> u8 {
    if byte.is_ascii_graphic() { byte } else { b'.' }
}

/// Dump a whole byte stream. Returns the number of records written.
pub fn encode_dump<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    opts: &DumpOptions,
) -> Result<u64> {
    let mut encoder = DumpEncoder::new(output, opts)?;
    loop {
        let chunk = match input.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if chunk.is_empty() {
            break;
        }
        let n = chunk.len();
        encoder.write_bytes(chunk)?;
        input.consume(n);
    }
    let (_, records) = encoder.finish()?;
    Ok(records)
}

/// Rebuild bytes from a dump. Returns the number of bytes written.
pub fn decode_dump<R: BufRead, W: Write>(input: R, output: &mut W, mode: DumpMode) -> Result<u64> {
    decoder::decode(input, output, mode)
}
