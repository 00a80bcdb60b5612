use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use secure_transport::{RequestEnvelope, WireFormat};

fn bench_envelope_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_codec");
    let requests = vec![
        RequestEnvelope::new("ping"),
        RequestEnvelope::new("read").with_field("path", "docs/readme.md"),
        RequestEnvelope::new("update")
            .with_field("path", "docs/readme.md")
            .with_field("data", "a".repeat(1024)),
    ];

    for format in [WireFormat::Json, WireFormat::MessagePack] {
        group.bench_function(format!("encode_{}", format.name()), |b| {
            b.iter_batched(
                || requests.clone(),
                |reqs| {
                    for request in reqs {
                        let _ = format.encode(&request).unwrap();
                    }
                },
                BatchSize::SmallInput,
            )
        });

        let blob = format.encode(&requests[2]).unwrap();
        group.bench_function(format!("decode_{}", format.name()), |b| {
            b.iter(|| {
                let _: RequestEnvelope = format.decode(&blob).unwrap();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_envelope_formats);
criterion_main!(benches);
