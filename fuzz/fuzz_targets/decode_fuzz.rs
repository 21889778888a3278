#![no_main]
use diffprep::charset::Encoding;
use diffprep::engine::{self, Mode, Options};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoders and strip must never panic on arbitrary input, only
    // return errors.
    let encodings = [
        Encoding::Utf8,
        Encoding::SingleByte,
        Encoding::Legacy(encoding_rs::SHIFT_JIS),
        Encoding::Legacy(encoding_rs::GB18030),
    ];
    for mode in [Mode::Words, Mode::Chars, Mode::Hex, Mode::Bits] {
        for encoding in encodings {
            let opts = Options {
                mode,
                encoding,
                ..Default::default()
            };
            let _ = engine::decode_all(&opts, data);
            if mode.is_text() {
                let mut out = Vec::new();
                let _ = engine::strip(&opts, data, &mut out);
            }
        }
    }
});
