// Command-line front end for diffprep.
//
// One subcommand per direction (encode, decode, strip) plus a lossless
// round-trip check and a configuration dump. Input defaults to stdin and
// output to stdout; every failure prints a single diagnostic and exits 1.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::charset::Encoding;
use crate::dump::{ANNOTATION_SEP, GHOST, UNIT_SEP};
use crate::engine::{self, Mode, Options as SessionOptions, Stats};
use crate::text::{NEWLINE_MARKER, REPEAT_MARK, TERMINATOR, WORD_MARKER, escape};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Lossless line splitter for word-, character- and byte-level diffs.
#[derive(Parser, Debug)]
#[command(
    name = "diffprep",
    version,
    about = "Split files into diff-friendly lines and join them back",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Split an input stream into one unit per line.
    Encode(EncodeArgs),
    /// Join split lines back into the original stream.
    Decode(DecodeArgs),
    /// Remove optional `$` terminators from word or char output.
    Strip(StripArgs),
    /// Check that a file survives an encode/decode round trip.
    Verify(VerifyArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Words,
    Chars,
    Hex,
    Bits,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Words => Mode::Words,
            ModeArg::Chars => Mode::Chars,
            ModeArg::Hex => Mode::Hex,
            ModeArg::Bits => Mode::Bits,
        }
    }
}

/// `utf8`, `byte`, or an ASCII-compatible encoding label such as `shift_jis`.
fn parse_encoding(label: &str) -> Result<Encoding, String> {
    Encoding::from_label(label).map_err(|e| e.to_string())
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// What one output line holds.
    #[arg(long, short = 'm', value_enum, default_value_t = ModeArg::Words)]
    mode: ModeArg,

    /// Character encoding of text (words and chars modes): utf8, byte, or
    /// a label such as shift_jis, euc-jp, gb18030, windows-1251.
    #[arg(long, short = 'e', value_parser = parse_encoding, default_value = "utf8")]
    encoding: Encoding,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Bytes (hex) or bits (bits) per dump line.
    #[arg(long = "units-per-line", short = 'n', value_parser = clap::value_parser!(u64).range(1..), default_value_t = 1)]
    units_per_line: u64,

    /// Append an ASCII rendering to every dump line.
    #[arg(long = "ascii-dump", short = 'a')]
    ascii_dump: bool,

    /// Mark lines that end in whitespace with `$`.
    #[arg(long = "terminate", short = 't')]
    terminate_trailing_ws: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[command(flatten)]
    format: FormatArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    format: FormatArgs,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StripArgs {
    /// Character encoding of the split text.
    #[arg(long, short = 'e', value_parser = parse_encoding, default_value = "utf8")]
    encoding: Encoding,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[command(flatten)]
    format: FormatArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    /// File to check.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Strip,
    Verify,
    Config,
}

impl Command {
    fn name(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
            Self::Strip => "strip",
            Self::Verify => "verify",
            Self::Config => "config",
        }
    }
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    session: SessionOptions,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn session_options(format: &FormatArgs, layout: Option<&LayoutArgs>) -> SessionOptions {
    let mut session = SessionOptions {
        mode: format.mode.into(),
        encoding: format.encoding,
        ..Default::default()
    };
    if let Some(layout) = layout {
        session.units_per_line = usize::try_from(layout.units_per_line).unwrap_or(usize::MAX);
        session.ascii_dump = layout.ascii_dump;
        session.terminate_trailing_ws = layout.terminate_trailing_ws;
    }
    session
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        session: SessionOptions::default(),
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.use_stdout = args.stdout;
            opts.session = session_options(&args.format, Some(&args.layout));
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.use_stdout = args.stdout;
            opts.session = session_options(&args.format, None);
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Strip(args) => {
            opts.command = Command::Strip;
            opts.use_stdout = args.stdout;
            opts.session.encoding = args.encoding;
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Verify(args) => {
            opts.command = Command::Verify;
            opts.session = session_options(&args.format, Some(&args.layout));
            opts.input_file = Some(args.input);
        }
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("diffprep".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = opts.session.validate();
    }
}

fn log_filter(opts: &Options) -> &'static str {
    match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("diffprep version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let defaults = SessionOptions::default();

    eprintln!("FILE_IO={file_io}");
    eprintln!("DEFAULT_MODE={}", defaults.mode.name());
    eprintln!("DEFAULT_ENCODING={}", defaults.encoding.name());
    eprintln!("DEFAULT_UNITS_PER_LINE={}", defaults.units_per_line);
    eprintln!("WORD_MARKER={:?}", char::from(WORD_MARKER));
    eprintln!("NEWLINE_MARKER={:?}", char::from(NEWLINE_MARKER));
    eprintln!("REPEAT_MARK={:?}", char::from(REPEAT_MARK));
    eprintln!("TERMINATOR={:?}", char::from(TERMINATOR));
    eprintln!("ESCAPES={:?}", escape::ESCAPED.map(char::from));
    eprintln!("UNIT_SEP={:?}", char::from(UNIT_SEP));
    eprintln!("ANNOTATION_SEP={:?}", char::from(ANNOTATION_SEP));
    eprintln!("GHOST={:?}", char::from(GHOST));
    eprintln!("BUF_SIZE={BUF_SIZE}");

    0
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

fn open_input(opts: &Options) -> Result<Box<dyn BufRead>, i32> {
    match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Ok(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("diffprep: input file: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, i32> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "diffprep: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return Err(1);
            }
            match File::create(path) {
                Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("diffprep: output file: {}: {e}", path.display());
                    Err(1)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Encode / decode / strip commands
// ---------------------------------------------------------------------------

fn cmd_transcode(opts: &Options) -> i32 {
    let session = &opts.session;
    if let Err(e) = session.validate() {
        eprintln!("diffprep: {e}");
        return 1;
    }

    let input = match open_input(opts) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let mut output = match open_output(opts) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let result = match opts.command {
        Command::Encode => engine::encode(session, input, &mut output),
        Command::Decode => engine::decode(session, input, &mut output),
        _ => engine::strip(session, input, &mut output),
    };
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            // Whatever was written so far stays; it is unreliable.
            let _ = output.flush();
            eprintln!("diffprep: {} error: {e}", opts.command.name());
            return 1;
        }
    };

    if let Err(e) = output.flush() {
        eprintln!("diffprep: write flush error: {e}");
        return 1;
    }

    report(opts, &stats);
    0
}

fn report(opts: &Options, stats: &Stats) {
    let command = opts.command.name();
    let mode = match opts.command {
        Command::Strip => "strip",
        _ => opts.session.mode.name(),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "diffprep: {command}: mode: {mode}, input size: {}, output size: {}, lines: {}",
            stats.bytes_in, stats.bytes_out, stats.lines_out
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": command,
            "mode": mode,
            "input_size": stats.bytes_in,
            "output_size": stats.bytes_out,
            "lines": stats.lines_out,
        });
        eprintln!("{json:#}");
    }
}

// ---------------------------------------------------------------------------
// Verify command
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
fn cmd_verify(opts: &Options) -> i32 {
    use crate::io::{hex_digest, verify_file};

    let Some(path) = opts.input_file.as_deref() else {
        eprintln!("diffprep: verify: no input file");
        return 1;
    };
    let report = match verify_file(path, &opts.session) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("diffprep: verify error: {}: {e}", path.display());
            return 1;
        }
    };

    let lossless = report.is_lossless();
    if !opts.quiet {
        eprintln!(
            "diffprep: {}: {} ({} mode, {} bytes, {} lines)",
            path.display(),
            if lossless { "lossless" } else { "MISMATCH" },
            opts.session.mode.name(),
            report.input_size,
            report.lines
        );
    }
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "diffprep: sha256 original:  {}",
            hex_digest(&report.original_sha256)
        );
        eprintln!(
            "diffprep: sha256 roundtrip: {}",
            hex_digest(&report.roundtrip_sha256)
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "verify",
            "mode": opts.session.mode.name(),
            "input_size": report.input_size,
            "encoded_size": report.encoded_size,
            "lines": report.lines,
            "original_sha256": hex_digest(&report.original_sha256),
            "roundtrip_sha256": hex_digest(&report.roundtrip_sha256),
            "lossless": lossless,
        });
        eprintln!("{json:#}");
    }

    if lossless { 0 } else { 1 }
}

#[cfg(not(feature = "file-io"))]
fn cmd_verify(_opts: &Options) -> i32 {
    eprintln!("diffprep: verify needs the `file-io` feature");
    1
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout {
        if let Some(path) = opts.output_file.take() {
            if !opts.quiet {
                eprintln!(
                    "diffprep: warning: -c option overrides output filename: {}",
                    path.display()
                );
            }
        }
    }

    let exit_code = match opts.command {
        Command::Encode | Command::Decode | Command::Strip => cmd_transcode(&opts),
        Command::Verify => cmd_verify(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
