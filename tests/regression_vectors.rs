use diffprep::engine::{self, Mode, Options};

#[derive(Debug)]
struct Vector {
    name: String,
    opts: Options,
    input: Vec<u8>,
    encoded: Vec<u8>,
}

fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }
    assert!(
        s.len().is_multiple_of(2),
        "hex string must have even length"
    );
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

/// `words`, `chars+t`, `hex:3`, `bits:12:a`, ...
fn parse_mode(field: &str) -> Options {
    let (layout, terminate) = match field.strip_suffix("+t") {
        Some(rest) => (rest, true),
        None => (field, false),
    };
    let mut parts = layout.split(':');
    let mode = match parts.next().unwrap() {
        "words" => Mode::Words,
        "chars" => Mode::Chars,
        "hex" => Mode::Hex,
        "bits" => Mode::Bits,
        other => panic!("unknown mode {other}"),
    };
    let units_per_line = parts.next().map_or(1, |n| n.parse().unwrap());
    let ascii_dump = parts.next() == Some("a");
    Options {
        mode,
        units_per_line,
        ascii_dump,
        terminate_trailing_ws: terminate,
        ..Default::default()
    }
}

fn load_vectors() -> Vec<Vector> {
    let manifest = include_str!("vectors/manifest.tsv");
    manifest
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            let parts: Vec<_> = line.split('|').collect();
            assert_eq!(parts.len(), 4, "invalid vector row: {line}");
            Vector {
                name: parts[0].to_string(),
                opts: parse_mode(parts[1]),
                input: hex_to_bytes(parts[2]),
                encoded: hex_to_bytes(parts[3]),
            }
        })
        .collect()
}

#[test]
fn vector_database_is_non_empty() {
    let vectors = load_vectors();
    assert!(!vectors.is_empty());
}

#[test]
fn encode_matches_all_vectors() {
    for v in load_vectors() {
        let encoded = engine::encode_all(&v.opts, &v.input).unwrap();
        assert_eq!(
            String::from_utf8_lossy(&encoded),
            String::from_utf8_lossy(&v.encoded),
            "vector {}",
            v.name
        );
    }
}

#[test]
fn decode_matches_all_vectors() {
    for v in load_vectors() {
        let decoded = engine::decode_all(&v.opts, &v.encoded)
            .unwrap_or_else(|e| panic!("vector {}: {e}", v.name));
        assert_eq!(decoded, v.input, "vector {}", v.name);
    }
}

#[test]
fn stripped_vectors_still_decode() {
    for v in load_vectors().into_iter().filter(|v| v.opts.mode.is_text()) {
        let mut stripped = Vec::new();
        engine::strip(&v.opts, &v.encoded[..], &mut stripped).unwrap();
        let mut again = Vec::new();
        engine::strip(&v.opts, &stripped[..], &mut again).unwrap();
        assert_eq!(again, stripped, "vector {}", v.name);
        let decoded = engine::decode_all(&v.opts, &stripped).unwrap();
        assert_eq!(decoded, v.input, "vector {}", v.name);
    }
}
