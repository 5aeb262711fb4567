use arcus::{AdversarialVae, Harmonizer, ImageVector, VaeConfig, INPUT_DIM};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_image(rng: &mut StdRng) -> ImageVector {
    let flat: Vec<f32> = (0..INPUT_DIM).map(|_| rng.gen_range(0.0..1.0)).collect();
    ImageVector::from_flat(flat, INPUT_DIM)
}

fn bench_model(c: &mut Criterion) {
    let vae = AdversarialVae::new(VaeConfig::default()).expect("default config is valid");
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let x = random_image(&mut rng);

    c.bench_function("vae_forward", |b| {
        b.iter(|| vae.forward(black_box(&x), &mut rng).expect("matching dims"))
    });

    c.bench_function("vae_discriminate", |b| {
        b.iter(|| vae.discriminate(black_box(&x)).expect("matching dims"))
    });

    let batch = DMatrix::from_fn(INPUT_DIM, 64, |_, _| rng.gen_range(0.0f32..1.0));
    c.bench_function("vae_forward_batch_64", |b| {
        b.iter(|| {
            vae.forward_batch(black_box(&batch), &mut rng)
                .expect("matching dims")
        })
    });
}

fn bench_harmonize(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let x = random_image(&mut rng);
    let h = Harmonizer::new();
    c.bench_function("harmonize_image", |b| {
        b.iter(|| h.harmonize_image(black_box(&x)))
    });
}

criterion_group!(benches, bench_model, bench_harmonize);
criterion_main!(benches);
