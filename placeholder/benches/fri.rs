use ark_std::test_rng;
use merlin::Transcript;
use placeholder_algebra::{bn254::BN254Scalar, prelude::*};
use placeholder_plonk::commitment::{fri, hash::Sha256Hash, FriParams};
use placeholder_plonk::math::FpPolynomial;
use std::time::Instant;

fn main() {
    let mut prng = test_rng();
    let log_n = 14;
    let iterations = 10;

    let params = FriParams::<BN254Scalar>::new(
        40,
        FriParams::<BN254Scalar>::default_step_list(log_n),
        3,
        0,
        log_n,
    )
    .unwrap();
    let q = FpPolynomial::<BN254Scalar>::random(&mut prng, (1 << log_n) - 1);

    let start = Instant::now();
    let mut proof = None;
    for _ in 0..iterations {
        let mut transcript = Transcript::new(b"FRI bench");
        proof = Some(fri::prove::<_, Sha256Hash>(&q, &params, &mut transcript).unwrap());
    }
    println!(
        "fri prove time: {} s",
        start.elapsed().as_secs_f32() / iterations as f32
    );

    let (proof, _) = proof.unwrap();
    let start = Instant::now();
    for _ in 0..iterations {
        let mut transcript = Transcript::new(b"FRI bench");
        fri::verify::<_, Sha256Hash>(&proof, &params, &mut transcript).unwrap();
    }
    println!(
        "fri verify time: {} s",
        start.elapsed().as_secs_f32() / iterations as f32
    );
}
