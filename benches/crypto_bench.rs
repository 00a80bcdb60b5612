use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use secure_transport::utils::crypto::{MessageCipher, SymmetricKey};

fn bench_seal_open(c: &mut Criterion) {
    let cipher = MessageCipher::new(&SymmetricKey::from_bytes([0x42; 32]));
    let mut group = c.benchmark_group("seal_open");

    for size in [64usize, 1024, 65536] {
        let payload = vec![0xAB; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("seal_{size}"), |b| {
            b.iter(|| cipher.seal(&payload).unwrap())
        });

        let sealed = cipher.seal(&payload).unwrap();
        group.bench_function(format!("open_{size}"), |b| {
            b.iter(|| {
                cipher
                    .open(&sealed.nonce, &sealed.tag, &sealed.ciphertext)
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_seal_open);
criterion_main!(benches);
