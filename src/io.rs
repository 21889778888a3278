// File-level helpers around the streaming sessions.
//
// `encode_file()` and `decode_file()` wrap `engine::encode`/`engine::decode`
// with buffered file I/O. With the `file-io` feature they also compute
// streaming SHA-256 checksums of what was read and written, and
// `verify_file()` checks that a file survives an encode/decode round trip.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::engine::{self, Options, Stats};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()` and `decode_file()`.
#[derive(Debug, Clone)]
pub struct FileStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes.
    pub output_size: u64,
    /// Lines written to the output.
    pub lines: u64,
    /// SHA-256 of the input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
    /// SHA-256 of the output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

/// Result of `verify_file()`.
#[cfg(feature = "file-io")]
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub input_size: u64,
    /// Size of the intermediate representation.
    pub encoded_size: u64,
    /// Lines in the intermediate representation.
    pub lines: u64,
    pub original_sha256: [u8; 32],
    pub roundtrip_sha256: [u8; 32],
}

#[cfg(feature = "file-io")]
impl VerifyReport {
    /// Whether decoding reproduced the original exactly.
    pub fn is_lossless(&self) -> bool {
        self.original_sha256 == self.roundtrip_sha256
    }
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file / decode_file
// ---------------------------------------------------------------------------

/// Encode `input_path` into the intermediate format at `output_path`.
pub fn encode_file(input_path: &Path, output_path: &Path, opts: &Options) -> Result<FileStats> {
    transcode_file(input_path, output_path, opts, |o, r, w| engine::encode(o, r, w))
}

/// Decode the intermediate format at `input_path` back into `output_path`.
pub fn decode_file(input_path: &Path, output_path: &Path, opts: &Options) -> Result<FileStats> {
    transcode_file(input_path, output_path, opts, |o, r, w| engine::decode(o, r, w))
}

type FileReader = BufReader<HashingReader<File>>;
type FileWriter = HashingWriter<BufWriter<File>>;

fn transcode_file<F>(
    input_path: &Path,
    output_path: &Path,
    opts: &Options,
    session: F,
) -> Result<FileStats>
where
    F: FnOnce(&Options, &mut FileReader, &mut FileWriter) -> Result<Stats>,
{
    // Options are checked before the output file is created.
    opts.validate()?;

    let input_file = File::open(input_path)?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, HashingReader::new(input_file));

    let output_file = File::create(output_path)?;
    let mut writer = HashingWriter::new(BufWriter::with_capacity(BUF_SIZE, output_file));

    let stats = session(opts, &mut reader, &mut writer)?;
    writer.flush()?;

    debug!(
        "{} -> {}: {} bytes in, {} bytes out",
        input_path.display(),
        output_path.display(),
        stats.bytes_in,
        stats.bytes_out
    );

    Ok(FileStats {
        input_size: stats.bytes_in,
        output_size: stats.bytes_out,
        lines: stats.lines_out,
        input_sha256: reader.into_inner().digest(),
        output_sha256: writer.digest(),
    })
}

// ---------------------------------------------------------------------------
// verify_file
// ---------------------------------------------------------------------------

/// Encode a file in memory, decode it again and compare checksums.
///
/// Format errors in either direction are returned as errors; a
/// reconstruction that decodes cleanly but differs is reported through
/// `VerifyReport::is_lossless`.
#[cfg(feature = "file-io")]
pub fn verify_file(input_path: &Path, opts: &Options) -> Result<VerifyReport> {
    opts.validate()?;

    let input_file = File::open(input_path)?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, HashingReader::new(input_file));
    let mut encoded = Vec::new();
    let stats = engine::encode(opts, &mut reader, &mut encoded)?;

    let mut roundtrip = HashingWriter::new(io::sink());
    engine::decode(opts, &encoded[..], &mut roundtrip)?;

    let report = VerifyReport {
        input_size: stats.bytes_in,
        encoded_size: stats.bytes_out,
        lines: stats.lines_out,
        original_sha256: reader.into_inner().hasher.finalize().into(),
        roundtrip_sha256: roundtrip.hasher.finalize().into(),
    };
    debug!(
        "verify {}: lossless={}",
        input_path.display(),
        report.is_lossless()
    );
    Ok(report)
}

/// Lowercase hex rendering of a digest.
pub fn hex_digest(digest: &[u8]) -> String {
    use std::fmt::Write as _;
    digest.iter().fold(String::with_capacity(digest.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

// ---------------------------------------------------------------------------
// Hashing adapters (hash only with file-io feature)
// ---------------------------------------------------------------------------

struct HashingReader<R> {
    inner: R,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

impl<R> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        }
    }

    fn digest(self) -> Option<[u8; 32]> {
        #[cfg(feature = "file-io")]
        {
            Some(self.hasher.finalize().into())
        }
        #[cfg(not(feature = "file-io"))]
        {
            None
        }
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        #[cfg(feature = "file-io")]
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

struct HashingWriter<W> {
    inner: W,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

impl<W> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        }
    }

    fn digest(self) -> Option<[u8; 32]> {
        #[cfg(feature = "file-io")]
        {
            Some(self.hasher.finalize().into())
        }
        #[cfg(not(feature = "file-io"))]
        {
            None
        }
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        #[cfg(feature = "file-io")]
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
