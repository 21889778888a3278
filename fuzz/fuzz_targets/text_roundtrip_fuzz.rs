#![no_main]
use diffprep::charset::Encoding;
use diffprep::engine::{self, Mode, Options};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&flags, text)) = data.split_first() else {
        return;
    };

    let opts = Options {
        mode: if flags & 1 != 0 { Mode::Chars } else { Mode::Words },
        terminate_trailing_ws: flags & 2 != 0,
        encoding: if flags & 4 != 0 {
            Encoding::SingleByte
        } else {
            Encoding::Utf8
        },
        ..Default::default()
    };

    // Invalid UTF-8 is rejected on encode; everything accepted must
    // come back unchanged.
    let Ok(encoded) = engine::encode_all(&opts, text) else {
        assert!(opts.encoding == Encoding::Utf8 && std::str::from_utf8(text).is_err());
        return;
    };
    let decoded = engine::decode_all(&opts, &encoded).unwrap();
    assert_eq!(decoded, text);

    let mut stripped = Vec::new();
    engine::strip(&opts, &encoded[..], &mut stripped).unwrap();
    assert_eq!(engine::decode_all(&opts, &stripped).unwrap(), text);
});
