use diffprep::charset::Encoding;
use diffprep::engine::{self, Mode, Options};
use proptest::prelude::*;

fn text_opts(mode: Mode, terminate: bool, encoding: Encoding) -> Options {
    Options {
        mode,
        terminate_trailing_ws: terminate,
        encoding,
        ..Default::default()
    }
}

fn dump_opts(mode: Mode, units_per_line: usize, ascii_dump: bool) -> Options {
    Options {
        mode,
        units_per_line,
        ascii_dump,
        ..Default::default()
    }
}

fn strip(opts: &Options, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    engine::strip(opts, data, &mut out).unwrap();
    out
}

/// Text dense in the characters the line format gives meaning to.
fn tricky_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just(' '),
            Just('\t'),
            Just('\n'),
            Just('\r'),
            Just('\x0B'),
            Just('\x0C'),
            Just('$'),
            Just(':'),
            Just('n'),
            Just('\u{3000}'),
            Just('\u{A0}'),
            any::<char>(),
        ],
        0..256,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_text_roundtrip(
        text in tricky_text(),
        chars in any::<bool>(),
        terminate in any::<bool>(),
    ) {
        let mode = if chars { Mode::Chars } else { Mode::Words };
        let opts = text_opts(mode, terminate, Encoding::Utf8);
        let encoded = engine::encode_all(&opts, text.as_bytes()).unwrap();
        let decoded = engine::decode_all(&opts, &encoded).unwrap();
        prop_assert_eq!(decoded, text.as_bytes());
    }

    #[test]
    fn prop_single_byte_roundtrip_accepts_any_bytes(
        data in proptest::collection::vec(any::<u8>(), 0..512),
        terminate in any::<bool>(),
    ) {
        let opts = text_opts(Mode::Words, terminate, Encoding::SingleByte);
        let encoded = engine::encode_all(&opts, &data).unwrap();
        let decoded = engine::decode_all(&opts, &encoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_every_line_has_a_marker(text in tricky_text(), chars in any::<bool>()) {
        let mode = if chars { Mode::Chars } else { Mode::Words };
        let opts = text_opts(mode, true, Encoding::Utf8);
        let encoded = engine::encode_all(&opts, text.as_bytes()).unwrap();
        if !encoded.is_empty() {
            prop_assert_eq!(encoded.last(), Some(&b'\n'));
        }
        for line in encoded.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            prop_assert!(matches!(line[0], b':' | b'n'), "line {:?}", line);
        }
    }

    #[test]
    fn prop_strip_is_idempotent(text in tricky_text(), chars in any::<bool>()) {
        let mode = if chars { Mode::Chars } else { Mode::Words };
        let opts = text_opts(mode, true, Encoding::Utf8);
        let encoded = engine::encode_all(&opts, text.as_bytes()).unwrap();
        let once = strip(&opts, &encoded);
        let twice = strip(&opts, &once);
        prop_assert_eq!(&twice, &once);
        // Stripping terminators never changes what decodes.
        prop_assert_eq!(engine::decode_all(&opts, &once).unwrap(), text.as_bytes());
    }

    #[test]
    fn prop_strip_undoes_terminate(text in tricky_text()) {
        let plain = engine::encode_all(&text_opts(Mode::Words, false, Encoding::Utf8), text.as_bytes()).unwrap();
        let opts = text_opts(Mode::Words, true, Encoding::Utf8);
        let terminated = engine::encode_all(&opts, text.as_bytes()).unwrap();
        prop_assert_eq!(strip(&opts, &terminated), plain);
    }

    #[test]
    fn prop_distinct_texts_encode_distinctly(a in tricky_text(), b in tricky_text()) {
        prop_assume!(a != b);
        let opts = Options::default();
        let ea = engine::encode_all(&opts, a.as_bytes()).unwrap();
        let eb = engine::encode_all(&opts, b.as_bytes()).unwrap();
        prop_assert_ne!(ea, eb);
    }

    #[test]
    fn prop_hex_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..1024),
        units in 1usize..40,
        ascii_dump in any::<bool>(),
    ) {
        let opts = dump_opts(Mode::Hex, units, ascii_dump);
        let encoded = engine::encode_all(&opts, &data).unwrap();
        prop_assert_eq!(engine::decode_all(&opts, &encoded).unwrap(), data);
    }

    #[test]
    fn prop_bits_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..256),
        units in 1usize..40,
        ascii_dump in any::<bool>(),
    ) {
        let opts = dump_opts(Mode::Bits, units, ascii_dump);
        let encoded = engine::encode_all(&opts, &data).unwrap();
        prop_assert_eq!(engine::decode_all(&opts, &encoded).unwrap(), data);
    }

    #[test]
    fn prop_dump_records_have_fixed_width(
        data in proptest::collection::vec(any::<u8>(), 1..256),
        units in 1usize..20,
        bits in any::<bool>(),
    ) {
        let mode = if bits { Mode::Bits } else { Mode::Hex };
        let token = if bits { 1 } else { 2 };
        let opts = dump_opts(mode, units, false);
        let encoded = engine::encode_all(&opts, &data).unwrap();
        let width = units * token + (units - 1);
        for line in encoded.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            prop_assert_eq!(line.len(), width);
        }
    }

    #[test]
    fn prop_decoders_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        for mode in [Mode::Words, Mode::Chars, Mode::Hex, Mode::Bits] {
            let _ = engine::decode_all(&dump_opts(mode, 1, false), &data);
        }
    }
}

#[test]
fn escape_disambiguation() {
    let opts = Options::default();
    let spaces_then_tab = engine::encode_all(&opts, b"a  \tb").unwrap();
    let two_tabs = engine::encode_all(&opts, b"a\t\tb").unwrap();
    assert_ne!(spaces_then_tab, two_tabs);
    assert_eq!(engine::decode_all(&opts, &spaces_then_tab).unwrap(), b"a  \tb");
    assert_eq!(engine::decode_all(&opts, &two_tabs).unwrap(), b"a\t\tb");
}
