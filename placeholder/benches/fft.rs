use ark_std::test_rng;
use placeholder_algebra::{bn254::BN254Scalar, prelude::*};
use placeholder_plonk::math::EvaluationDomain;
use std::time::Instant;

fn main() {
    let mut prng = test_rng();
    let n = 65536;
    let iterations = 100;

    let domain = EvaluationDomain::<BN254Scalar>::new(n).unwrap();
    let coefs: Vec<BN254Scalar> = (0..n).map(|_| BN254Scalar::random(&mut prng)).collect();
    let offset = BN254Scalar::multiplicative_generator();

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = domain.fft(&coefs).unwrap();
    }
    println!(
        "fft total time: {} s",
        start.elapsed().as_secs_f32() / iterations as f32
    );

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = domain.coset_fft(&coefs, &offset).unwrap();
    }
    println!(
        "coset fft total time: {} s",
        start.elapsed().as_secs_f32() / iterations as f32
    );
}
