use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use diffprep::engine::{self, Mode, Options};
use std::fs;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// ASCII prose-like text: short words, mostly single spaces, some
/// indentation, tabs and blank lines.
fn gen_text(size: usize, seed: u64) -> Vec<u8> {
    const GAPS: &[&[u8]] = &[b" ", b" ", b" ", b" ", b"  ", b"\t", b"\n", b"\n\n    "];
    let raw = gen_data(size, seed);
    let mut out = Vec::with_capacity(size + size / 4);
    let mut i = 0;
    while out.len() < size {
        let len = 2 + usize::from(raw[i % raw.len()] % 8);
        for k in 0..len {
            out.push(b'a' + raw[(i + k + 1) % raw.len()] % 26);
        }
        out.extend_from_slice(GAPS[usize::from(raw[(i + len) % raw.len()]) % GAPS.len()]);
        i += len + 1;
    }
    out.truncate(size);
    out
}

fn input_for(mode: Mode, size: usize, seed: u64) -> Vec<u8> {
    if mode.is_text() {
        gen_text(size, seed)
    } else {
        gen_data(size, seed)
    }
}

fn opts(mode: Mode, units_per_line: usize, ascii_dump: bool) -> Options {
    Options {
        mode,
        units_per_line,
        ascii_dump,
        ..Default::default()
    }
}

const MODES: [Mode; 4] = [Mode::Words, Mode::Chars, Mode::Hex, Mode::Bits];

fn write_expansion_snapshot() {
    let size = 1024 * 1024;
    let mut csv = String::from("mode,units_per_line,ascii_dump,input_bytes,output_bytes,lines,ratio\n");
    for mode in MODES {
        let input = input_for(mode, size, 123);
        for (units, ascii) in [(1, false), (16, false), (16, true)] {
            let mut out = Vec::new();
            let stats = engine::encode(&opts(mode, units, ascii), &input[..], &mut out).unwrap();
            let ratio = stats.bytes_out as f64 / stats.bytes_in as f64;
            csv.push_str(&format!(
                "{},{units},{ascii},{},{},{},{ratio}\n",
                mode.name(),
                stats.bytes_in,
                stats.bytes_out,
                stats.lines_out
            ));
        }
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("expansion_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed_mb_s");
    for mode in MODES {
        for size in [64 * 1024usize, 1024 * 1024] {
            let input = input_for(mode, size, 1);
            let o = opts(mode, 16, false);
            g.throughput(Throughput::Bytes(size as u64));
            g.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    let out = engine::encode_all(&o, black_box(&input)).unwrap();
                    black_box(out);
                });
            });
        }
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mb_s");
    for mode in MODES {
        for size in [64 * 1024usize, 1024 * 1024] {
            let o = opts(mode, 16, false);
            let encoded = engine::encode_all(&o, &input_for(mode, size, 2)).unwrap();
            g.throughput(Throughput::Bytes(encoded.len() as u64));
            g.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    let out = engine::decode_all(&o, black_box(&encoded)).unwrap();
                    black_box(out);
                });
            });
        }
    }
    g.finish();
}

fn bench_ascii_dump_overhead(c: &mut Criterion) {
    write_expansion_snapshot();
    let mut g = c.benchmark_group("ascii_dump_vs_units_per_line");
    let input = gen_data(1024 * 1024, 3);
    g.throughput(Throughput::Bytes(input.len() as u64));
    for mode in [Mode::Hex, Mode::Bits] {
        for units in [1usize, 8, 13, 64] {
            let o = opts(mode, units, true);
            g.bench_with_input(BenchmarkId::new(mode.name(), units), &units, |b, _| {
                b.iter(|| {
                    let out = engine::encode_all(&o, black_box(&input)).unwrap();
                    black_box(out.len());
                });
            });
        }
    }
    g.finish();
}

fn bench_strip(c: &mut Criterion) {
    let mut g = c.benchmark_group("strip_terminators");
    let o = Options {
        terminate_trailing_ws: true,
        ..Default::default()
    };
    let encoded = engine::encode_all(&o, &gen_text(1024 * 1024, 4)).unwrap();
    g.throughput(Throughput::Bytes(encoded.len() as u64));
    g.bench_function("words", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(encoded.len());
            engine::strip(&o, black_box(&encoded[..]), &mut out).unwrap();
            black_box(out);
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_ascii_dump_overhead,
    bench_strip
);
criterion_main!(benches);
