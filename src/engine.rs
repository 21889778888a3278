// Transcoding sessions: ties mode selection to the text and dump codecs.
//
// A session validates its `Options` before touching any stream, runs one
// codec from start to end of input, and reports byte and line counts.

use std::io::{self, BufRead, Read, Write};

use log::debug;

use crate::charset::Encoding;
use crate::dump::{self, DumpMode, DumpOptions};
use crate::error::{Error, Result};
use crate::text;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which transformation a session applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One word per line.
    #[default]
    Words,
    /// One character per line.
    Chars,
    /// One or more hex bytes per line.
    Hex,
    /// One or more bits per line.
    Bits,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Chars => "chars",
            Self::Hex => "hex",
            Self::Bits => "bits",
        }
    }

    /// Whether the mode reads text through a character encoding.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Words | Self::Chars)
    }
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct Options {
    pub mode: Mode,
    /// Units per dump record (hex and bit modes).
    pub units_per_line: usize,
    /// ASCII annotation after each dump record (hex and bit modes).
    pub ascii_dump: bool,
    /// Mark lines ending in whitespace with `$` (word and char modes).
    pub terminate_trailing_ws: bool,
    /// Character encoding of text input (word and char modes).
    pub encoding: Encoding,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Words,
            units_per_line: 1,
            ascii_dump: false,
            terminate_trailing_ws: false,
            encoding: Encoding::Utf8,
        }
    }
}

impl Options {
    /// Reject configurations no session could run with.
    pub fn validate(&self) -> Result<()> {
        if self.units_per_line == 0 {
            return Err(Error::Config("units per line must be at least 1".into()));
        }
        Ok(())
    }

    fn dump_options(&self, mode: DumpMode) -> DumpOptions {
        DumpOptions {
            mode,
            units_per_line: self.units_per_line,
            ascii_dump: self.ascii_dump,
        }
    }

    fn log_ignored(&self) {
        if self.mode.is_text() {
            if self.ascii_dump || self.units_per_line != 1 {
                debug!("{}: dump layout options ignored", self.mode.name());
            }
        } else if self.terminate_trailing_ws || self.encoding != Encoding::Utf8 {
            debug!("{}: text options ignored", self.mode.name());
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters reported by a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Bytes consumed from the input.
    pub bytes_in: u64,
    /// Bytes written to the output.
    pub bytes_out: u64,
    /// Lines written to the output.
    pub lines_out: u64,
}

// ---------------------------------------------------------------------------
// Counting adapters
// ---------------------------------------------------------------------------

struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for CountingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.count += amt as u64;
        self.inner.consume(amt);
    }
}

struct CountingWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    bytes: u64,
    lines: u64,
}

impl<W: Write + ?Sized> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        self.lines += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn run<R, W, F>(input: R, output: &mut W, what: &str, opts: &Options, body: F) -> Result<Stats>
where
    R: BufRead,
    W: Write + ?Sized,
    F: FnOnce(&mut CountingReader<R>, &mut CountingWriter<'_, W>) -> Result<()>,
{
    opts.validate()?;
    opts.log_ignored();
    debug!("{what}: mode={} encoding={}", opts.mode.name(), opts.encoding.name());

    let mut reader = CountingReader {
        inner: input,
        count: 0,
    };
    let mut writer = CountingWriter {
        inner: output,
        bytes: 0,
        lines: 0,
    };
    body(&mut reader, &mut writer)?;

    let stats = Stats {
        bytes_in: reader.count,
        bytes_out: writer.bytes,
        lines_out: writer.lines,
    };
    debug!(
        "{what}: {} bytes in, {} bytes out, {} lines",
        stats.bytes_in, stats.bytes_out, stats.lines_out
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Transform `input` into the intermediate line format.
pub fn encode<R: BufRead, W: Write + ?Sized>(
    opts: &Options,
    input: R,
    output: &mut W,
) -> Result<Stats> {
    run(input, output, "encode", opts, |r, w| {
        match opts.mode {
            Mode::Words => {
                text::encode_words(r, w, opts.encoding, opts.terminate_trailing_ws)?;
            }
            Mode::Chars => {
                text::encode_chars(r, w, opts.encoding, opts.terminate_trailing_ws)?;
            }
            Mode::Hex => {
                dump::encode_dump(r, w, &opts.dump_options(DumpMode::Hex))?;
            }
            Mode::Bits => {
                dump::encode_dump(r, w, &opts.dump_options(DumpMode::Bits))?;
            }
        }
        Ok(())
    })
}

/// Transform the intermediate line format back into the original.
pub fn decode<R: BufRead, W: Write + ?Sized>(
    opts: &Options,
    input: R,
    output: &mut W,
) -> Result<Stats> {
    run(input, output, "decode", opts, |r, w| {
        match opts.mode {
            Mode::Words => {
                text::decode_words(r, w, opts.encoding)?;
            }
            Mode::Chars => {
                text::decode_chars(r, w, opts.encoding)?;
            }
            Mode::Hex => {
                dump::decode_dump(r, w, DumpMode::Hex)?;
            }
            Mode::Bits => {
                dump::decode_dump(r, w, DumpMode::Bits)?;
            }
        }
        Ok(())
    })
}

/// Remove optional terminators from word or char mode output.
pub fn strip<R: BufRead, W: Write + ?Sized>(
    opts: &Options,
    input: R,
    output: &mut W,
) -> Result<Stats> {
    run(input, output, "strip", opts, |r, w| {
        text::strip_terminators(r, w, opts.encoding)?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// In-memory convenience
// ---------------------------------------------------------------------------

/// Encode a buffer in memory.
pub fn encode_all(opts: &Options, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    encode(opts, data, &mut out)?;
    Ok(out)
}

/// Decode a buffer in memory.
pub fn decode_all(opts: &Options, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    decode(opts, data, &mut out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `limit` bytes, then fails every write.
    struct FailingWriter {
        limit: usize,
        written: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written >= self.limit {
                return Err(io::Error::other("disk full"));
            }
            let n = buf.len().min(self.limit - self.written);
            self.written += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn opts(mode: Mode) -> Options {
        Options {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn every_mode_roundtrips() {
        let data = "Grüße,\tWelt!\r\n\n  indented \x0B\x0C line\n".as_bytes();
        for mode in [Mode::Words, Mode::Chars, Mode::Hex, Mode::Bits] {
            let encoded = encode_all(&opts(mode), data).unwrap();
            let decoded = decode_all(&opts(mode), &encoded).unwrap();
            assert_eq!(decoded, data, "mode {}", mode.name());
        }
    }

    #[test]
    fn stats_count_bytes_and_lines() {
        let mut out = Vec::new();
        let stats = encode(&opts(Mode::Words), &b"a b\n"[..], &mut out).unwrap();
        assert_eq!(stats.bytes_in, 4);
        assert_eq!(stats.bytes_out, out.len() as u64);
        assert_eq!(stats.lines_out, 3);
    }

    #[test]
    fn zero_units_rejected_before_io() {
        let bad = Options {
            mode: Mode::Hex,
            units_per_line: 0,
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = encode(&bad, &b"abc"[..], &mut out).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn strip_session() {
        let terminated = Options {
            terminate_trailing_ws: true,
            ..Default::default()
        };
        let encoded = encode_all(&terminated, b"a b \n").unwrap();
        assert_eq!(encoded, b":a $\n:b $\nn\n");

        let mut out = Vec::new();
        strip(&terminated, &encoded[..], &mut out).unwrap();
        assert_eq!(out, b":a \n:b \nn\n");
    }

    #[test]
    fn text_options_ignored_by_dump_modes() {
        let o = Options {
            mode: Mode::Hex,
            terminate_trailing_ws: true,
            encoding: Encoding::SingleByte,
            ..Default::default()
        };
        assert_eq!(encode_all(&o, b"A").unwrap(), b"41\n");
    }

    #[test]
    fn write_failure_is_io_error() {
        let data = "one two\nthree\n".as_bytes();
        for mode in [Mode::Words, Mode::Chars, Mode::Hex, Mode::Bits] {
            let encoded = encode_all(&opts(mode), data).unwrap();
            for limit in [0, 5] {
                let mut sink = FailingWriter { limit, written: 0 };
                let err = encode(&opts(mode), data, &mut sink).unwrap_err();
                assert!(matches!(err, Error::Io(_)), "encode {}: {err}", mode.name());

                let mut sink = FailingWriter { limit, written: 0 };
                let err = decode(&opts(mode), &encoded[..], &mut sink).unwrap_err();
                assert!(matches!(err, Error::Io(_)), "decode {}: {err}", mode.name());
            }
        }
    }

    #[test]
    fn shift_jis_chars_stay_whole() {
        // "日本 語\n" in Shift_JIS; the trail byte of 本 is ASCII '{'.
        let data = b"\x93\xFA\x96\x7B \x8C\xEA\n";
        let o = Options {
            mode: Mode::Chars,
            encoding: Encoding::Legacy(encoding_rs::SHIFT_JIS),
            ..Default::default()
        };
        let encoded = encode_all(&o, data).unwrap();
        assert_eq!(encoded, b":\x93\xFA\n:\x96\x7B \n:\x8C\xEA\nn\n");
        assert_eq!(decode_all(&o, &encoded).unwrap(), data);
    }

    #[test]
    fn legacy_multibyte_roundtrips() {
        // Ideographic space (0x81 0x40) separates words in Shift_JIS.
        let sjis = Options {
            encoding: Encoding::from_label("shift_jis").unwrap(),
            ..Default::default()
        };
        let data = b"\x93\xFA\x81\x40\x96\x7B";
        let encoded = encode_all(&sjis, data).unwrap();
        assert_eq!(encoded, b":\x93\xFA\x81\x40\n:\x96\x7B\n");
        assert_eq!(decode_all(&sjis, &encoded).unwrap(), data);

        for (label, text) in [
            ("euc-jp", "日本語 テスト\tです\n\n"),
            ("gb18030", "Grüße 日本\tтекст\n"),
            ("big5", "中文 測試\r\n"),
            ("windows-1251", "Привет,  мир\n"),
        ] {
            let charset = encoding_rs::Encoding::for_label(label.as_bytes()).unwrap();
            let (bytes, _, lossy) = charset.encode(text);
            assert!(!lossy, "{label}");
            let o = Options {
                mode: Mode::Chars,
                encoding: Encoding::from_label(label).unwrap(),
                ..Default::default()
            };
            let encoded = encode_all(&o, &bytes).unwrap();
            assert_eq!(decode_all(&o, &encoded).unwrap(), &bytes[..], "{label}");
        }
    }

    #[test]
    fn legacy_invalid_sequence_is_reported() {
        let o = Options {
            encoding: Encoding::Legacy(encoding_rs::SHIFT_JIS),
            ..Default::default()
        };
        let err = encode_all(&o, b"ab\xA0").unwrap_err();
        assert!(matches!(err, Error::IllegalSequence { position: 2 }));
    }
}
