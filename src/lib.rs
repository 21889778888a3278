//! Diffprep: lossless preprocessing for line-oriented diff tools.
//!
//! Line-based `diff` and `patch` compare whole lines. This crate rewrites
//! a file so that every line holds one word, one character, or a few
//! bytes or bits, and rewrites it back without losing a single byte:
//!
//! - Word and character split formats for text (`text`)
//! - Hex and bit dumps for binary files (`dump`)
//! - Sessions that pick a format by `Mode` (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use diffprep::engine::{self, Mode, Options};
//!
//! let opts = Options { mode: Mode::Words, ..Default::default() };
//! let text = b"Hi, world!\n\nThis is a test.\n";
//!
//! let lines = engine::encode_all(&opts, text).unwrap();
//! assert!(lines.starts_with(b":Hi, \n:world!\nn \n"));
//! assert_eq!(engine::decode_all(&opts, &lines).unwrap(), text);
//! ```

pub mod charset;
pub mod dump;
pub mod engine;
pub mod error;
pub mod io;
pub mod reader;
pub mod text;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, FormatError, Result};
