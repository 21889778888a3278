#![no_main]
use diffprep::engine::{self, Mode, Options};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let opts = Options {
        mode: if data[0] & 1 != 0 { Mode::Bits } else { Mode::Hex },
        ascii_dump: data[0] & 2 != 0,
        units_per_line: 1 + usize::from(data[1]),
        ..Default::default()
    };
    let payload = &data[2..];

    let encoded = engine::encode_all(&opts, payload).unwrap();
    let decoded = engine::decode_all(&opts, &encoded).unwrap();
    assert_eq!(decoded, payload);
});
