// Dump encoder: bytes to fixed-width hex or bit records.

use std::io::{self, Write};

use crate::error::Result;

use super::{ANNOTATION_SEP, DumpMode, DumpOptions, UNIT_SEP, annotation_capacity, printable};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes waiting to be shown in a record's ASCII annotation.
///
/// A byte enters when its first unit is written and leaves with the
/// record that receives its last unit, so no byte is annotated across two
/// records. The buffer is reserved once and never grows.
struct Annotation {
    bytes: Vec<u8>,
    /// Units of `bytes` already written, counted in bits.
    bits: usize,
}

impl Annotation {
    fn with_capacity(capacity: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity)?;
        Ok(Self { bytes, bits: 0 })
    }

    fn begin(&mut self, byte: u8) {
        debug_assert!(self.bytes.len() < self.bytes.capacity());
        self.bytes.push(byte);
    }

    /// Number of bytes whose every bit has been written.
    fn whole(&self) -> usize {
        self.bits / 8
    }
}

/// Streaming dump encoder.
pub struct DumpEncoder<W: Write> {
    out: W,
    mode: DumpMode,
    units_per_line: usize,
    /// Units written to the current record.
    unit: usize,
    annotation: Option<Annotation>,
    records: u64,
}

impl<W: Write> DumpEncoder<W> {
    /// Create an encoder. Rejects `units_per_line == 0` and reports a
    /// failed annotation buffer allocation as `OutOfMemory`.
    pub fn new(out: W, opts: &DumpOptions) -> Result<Self> {
        opts.validate()?;
        let annotation = if opts.ascii_dump {
            Some(Annotation::with_capacity(annotation_capacity(
                opts.mode,
                opts.units_per_line,
            ))?)
        } else {
            None
        };
        Ok(Self {
            out,
            mode: opts.mode,
            units_per_line: opts.units_per_line,
            unit: 0,
            annotation,
            records: 0,
        })
    }

    /// Feed input bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        for &byte in data {
            match self.mode {
                DumpMode::Hex => {
                    if let Some(a) = self.annotation.as_mut() {
                        a.begin(byte);
                        a.bits += 8;
                    }
                    let token = [
                        HEX_DIGITS[usize::from(byte >> 4)],
                        HEX_DIGITS[usize::from(byte & 0x0F)],
                    ];
                    self.write_unit(&token)?;
                }
                DumpMode::Bits => {
                    for shift in (0..8).rev() {
                        if let Some(a) = self.annotation.as_mut() {
                            if shift == 7 {
                                a.begin(byte);
                            }
                            a.bits += 1;
                        }
                        self.write_unit(&[b'0' + ((byte >> shift) & 1)])?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Pad the last record with ghosts and flush.
    ///
    /// No record is started just for ghosts: input consisting of whole
    /// bytes always ends on a record boundary or inside a started record.
    /// Returns the writer and the number of records written.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        let ghost = self.mode.ghost();
        while self.unit > 0 {
            self.write_unit(ghost)?;
        }
        self.out.flush()?;
        Ok((self.out, self.records))
    }

    fn write_unit(&mut self, token: &[u8]) -> io::Result<()> {
        if self.unit > 0 {
            self.out.write_all(&[UNIT_SEP])?;
        }
        self.out.write_all(token)?;
        self.unit += 1;
        if self.unit == self.units_per_line {
            self.end_record()?;
        }
        Ok(())
    }

    fn end_record(&mut self) -> io::Result<()> {
        if let Some(a) = self.annotation.as_mut() {
            let whole = a.whole();
            if whole > 0 {
                for b in &mut a.bytes[..whole] {
                    *b = printable(*b);
                }
                self.out.write_all(&[ANNOTATION_SEP])?;
                self.out.write_all(&a.bytes[..whole])?;
                a.bytes.drain(..whole);
                a.bits -= whole * 8;
            }
        }
        self.out.write_all(b"\n")?;
        self.unit = 0;
        self.records += 1;
        Ok(())
    }
}
