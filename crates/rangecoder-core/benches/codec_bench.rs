use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rangecoder_core::{build_cum_probs, build_decode_table, decode, decode_scalar, encode, frequencies};

fn corpus(len: usize) -> Vec<u8> {
    // A mildly skewed byte distribution, closer to real text/log data than
    // either a uniform or single-symbol extreme.
    (0..len as u32)
        .map(|i| {
            let r = (i.wrapping_mul(2654435761) >> 24) % 100;
            if r < 40 {
                b'e'
            } else if r < 60 {
                b't'
            } else {
                (i % 256) as u8
            }
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for &size in &[4_096usize, 65_536, 1_048_576] {
        let data = corpus(size);
        let freq = frequencies(&data);
        let (cum, _) = build_cum_probs(freq).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| encode(black_box(data), black_box(&cum)).unwrap());
        });
    }
    group.finish();
}

fn bench_decode_simd(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_simd");
    for &size in &[4_096usize, 65_536, 1_048_576] {
        let data = corpus(size);
        let freq = frequencies(&data);
        let (cum, _) = build_cum_probs(freq).unwrap();
        let table = build_decode_table(&cum);
        let payload = encode(&data, &cum).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| decode(black_box(payload), black_box(&table), size).unwrap());
        });
    }
    group.finish();
}

fn bench_decode_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_scalar");
    for &size in &[4_096usize, 65_536, 1_048_576] {
        let data = corpus(size);
        let freq = frequencies(&data);
        let (cum, _) = build_cum_probs(freq).unwrap();
        let table = build_decode_table(&cum);
        let payload = encode(&data, &cum).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| decode_scalar(black_box(payload), black_box(&table), size).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode_simd, bench_decode_scalar);
criterion_main!(benches);
