use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pkcodec::{convert, convert_chain, empty, from_bytes, Creature, DestinationContext, Generation, Move, NoData, RecordMode, Species};

fn sample(generation: Generation) -> Vec<u8> {
    let mut pk = empty(generation, RecordMode::Party);
    pk.set_encryption_constant(0xA5A5_1234);
    pk.set_pid(0x1234_5678);
    pk.set_species(Species(25));
    pk.set_exp(125_000);
    pk.set_moves([Move(84), Move(85), Move(86), Move(87)]);
    pk.refresh_checksum();
    pk.encrypted_bytes()
}

fn bench_decrypt(c: &mut Criterion) {
    for generation in [Generation::III, Generation::IV, Generation::VI, Generation::VIII] {
        let bytes = sample(generation);
        c.bench_function(&format!("decrypt_{:?}", generation), |b| {
            b.iter(|| from_bytes(generation, black_box(&bytes), RecordMode::Party))
        });
    }
}

fn bench_encrypt(c: &mut Criterion) {
    for generation in [Generation::III, Generation::IV, Generation::VI, Generation::VIII] {
        let pk = from_bytes(generation, &sample(generation), RecordMode::Party).unwrap();
        c.bench_function(&format!("encrypt_{:?}", generation), |b| b.iter(|| black_box(&pk).encrypted_bytes()));
    }
}

fn bench_convert(c: &mut Criterion) {
    let ctx = DestinationContext { today: NaiveDate::from_ymd_opt(2020, 1, 1), ..Default::default() };
    let pk3 = from_bytes(Generation::III, &sample(Generation::III), RecordMode::Party).unwrap();
    let pk5 = from_bytes(Generation::V, &sample(Generation::V), RecordMode::Party).unwrap();

    c.bench_function("convert_iii_to_iv", |b| b.iter(|| convert(black_box(&*pk3), Generation::IV, &ctx, &NoData)));
    c.bench_function("convert_v_to_iv", |b| b.iter(|| convert(black_box(&*pk5), Generation::IV, &ctx, &NoData)));
    c.bench_function("chain_iii_to_viii", |b| {
        b.iter(|| convert_chain(black_box(&*pk3), Generation::VIII, &ctx, &NoData))
    });
}

criterion_group!(benches, bench_decrypt, bench_encrypt, bench_convert);
criterion_main!(benches);
