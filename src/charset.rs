// Character encodings understood by the text codecs.
//
// The codecs never negotiate an encoding themselves. They only ask a
// `Charset` to decode one code point from the front of a small byte
// window and to classify a code point as whitespace or not.
//
// Besides UTF-8 and raw bytes, any ASCII-compatible WHATWG encoding known
// to `encoding_rs` (Shift_JIS, EUC-JP, GB18030, windows-125x, ...) can be
// selected by label.

use encoding_rs::DecoderResult;

use crate::error::{Error, Result};

/// Result of decoding the first code point of a byte window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A complete code point occupying the first `len` bytes.
    Char { ch: char, len: usize },
    /// The window holds a valid prefix of a longer sequence.
    Incomplete,
    /// The window does not start with a valid sequence.
    Invalid,
}

/// A byte-addressable character encoding.
pub trait Charset {
    /// Longest encoded length of a single code point, in bytes.
    fn max_len(&self) -> usize;

    /// Decode the first code point of `window`. `window` is never empty.
    fn decode(&self, window: &[u8]) -> Decoded;

    /// Whether `ch` separates words.
    fn is_whitespace(&self, ch: char) -> bool;
}

/// UTF-8 with Unicode whitespace classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl Charset for Utf8 {
    fn max_len(&self) -> usize {
        4
    }

    fn decode(&self, window: &[u8]) -> Decoded {
        let valid = match std::str::from_utf8(window) {
            Ok(s) => s,
            // Garbage after the first code point is the next call's problem.
            Err(e) if e.valid_up_to() > 0 => {
                std::str::from_utf8(&window[..e.valid_up_to()]).unwrap_or_default()
            }
            Err(e) => {
                return match e.error_len() {
                    None => Decoded::Incomplete,
                    Some(_) => Decoded::Invalid,
                };
            }
        };
        match valid.chars().next() {
            Some(ch) => Decoded::Char {
                ch,
                len: ch.len_utf8(),
            },
            None => Decoded::Incomplete,
        }
    }

    fn is_whitespace(&self, ch: char) -> bool {
        // No-break spaces glue words together rather than splitting them.
        ch.is_whitespace() && !matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
    }
}

/// One byte per code point, ASCII whitespace only.
///
/// Bytes map to the code points U+0000..=U+00FF, so any byte stream is
/// valid input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleByte;

impl Charset for SingleByte {
    fn max_len(&self) -> usize {
        1
    }

    fn decode(&self, window: &[u8]) -> Decoded {
        match window.first() {
            Some(&b) => Decoded::Char {
                ch: char::from(b),
                len: 1,
            },
            None => Decoded::Incomplete,
        }
    }

    fn is_whitespace(&self, ch: char) -> bool {
        matches!(ch, '\t'..='\r' | ' ')
    }
}

/// Any ASCII-compatible encoding from `encoding_rs`.
///
/// Each call decodes with a fresh decoder, feeding one byte at a time
/// until the first code point comes out. Whitespace follows the Unicode
/// rules used for UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct Legacy(pub &'static encoding_rs::Encoding);

impl Charset for Legacy {
    fn max_len(&self) -> usize {
        // GB18030 four-byte sequences are the longest.
        4
    }

    fn decode(&self, window: &[u8]) -> Decoded {
        let mut decoder = self.0.new_decoder_without_bom_handling();
        let mut utf8 = [0u8; 32];
        for len in 1..=window.len() {
            let (result, _, written) = decoder.decode_to_utf8_without_replacement(
                &window[len - 1..len],
                &mut utf8,
                false,
            );
            if let DecoderResult::Malformed(..) = result {
                return Decoded::Invalid;
            }
            if written > 0 {
                // Big5 can emit two code points for one sequence; the raw
                // bytes carry both, the first one decides the class.
                return match std::str::from_utf8(&utf8[..written])
                    .ok()
                    .and_then(|s| s.chars().next())
                {
                    Some(ch) => Decoded::Char { ch, len },
                    None => Decoded::Invalid,
                };
            }
        }
        Decoded::Incomplete
    }

    fn is_whitespace(&self, ch: char) -> bool {
        Utf8.is_whitespace(ch)
    }
}

/// Runtime-selectable encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    SingleByte,
    /// An ASCII-compatible encoding other than UTF-8.
    Legacy(&'static encoding_rs::Encoding),
}

impl Encoding {
    /// Look up an encoding by name.
    ///
    /// `utf8` and `byte` select the built-in charsets; anything else is
    /// resolved as a WHATWG label (`shift_jis`, `euc-jp`, `gb18030`,
    /// `windows-1251`, ...). Encodings that are not ASCII-compatible, such
    /// as UTF-16 or ISO-2022-JP, are rejected because the line format
    /// relies on ASCII markers.
    pub fn from_label(label: &str) -> Result<Self> {
        let label = label.trim();
        match label.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => return Ok(Self::Utf8),
            "byte" => return Ok(Self::SingleByte),
            _ => {}
        }
        match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) if enc == encoding_rs::UTF_8 => Ok(Self::Utf8),
            Some(enc) if enc.is_ascii_compatible() => Ok(Self::Legacy(enc)),
            Some(enc) => Err(Error::Config(format!(
                "encoding {} is not ASCII-compatible",
                enc.name()
            ))),
            None => Err(Error::Config(format!("unknown encoding: {label}"))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::SingleByte => "byte",
            Self::Legacy(enc) => enc.name(),
        }
    }
}

impl Charset for Encoding {
    fn max_len(&self) -> usize {
        match *self {
            Self::Utf8 => Utf8.max_len(),
            Self::SingleByte => SingleByte.max_len(),
            Self::Legacy(enc) => Legacy(enc).max_len(),
        }
    }

    fn decode(&self, window: &[u8]) -> Decoded {
        match *self {
            Self::Utf8 => Utf8.decode(window),
            Self::SingleByte => SingleByte.decode(window),
            Self::Legacy(enc) => Legacy(enc).decode(window),
        }
    }

    fn is_whitespace(&self, ch: char) -> bool {
        match *self {
            Self::Utf8 => Utf8.is_whitespace(ch),
            Self::SingleByte => SingleByte.is_whitespace(ch),
            Self::Legacy(enc) => Legacy(enc).is_whitespace(ch),
        }
    }
}
