use ark_std::test_rng;
use merlin::Transcript;
use placeholder_algebra::{bn254::BN254Scalar, prelude::*};
use placeholder_plonk::arithmetization::{
    AssignmentTable, ColumnType, ConstraintSystem, CopyConstraint, Expression, Gate, Selector,
    TableDescription, Variable,
};
use placeholder_plonk::commitment::hash::Sha256Hash;
use placeholder_plonk::placeholder::{preprocess_public, prover, verifier, PlaceholderParams};
use std::time::Instant;

type F = BN254Scalar;

fn main() {
    let mut prng = test_rng();
    let usable = (1 << 12) - 1;

    // w_2 = w_0 · w_1 + w_0, each row reusing the output of the previous one
    let desc = TableDescription::with_usable_rows(3, 0, 0, 1, usable).unwrap();
    let gate: Expression<F> = Expression::from(Variable::witness(0, 0)) * Variable::witness(1, 0)
        + Variable::witness(0, 0)
        - Variable::witness(2, 0);
    let copies = (1..usable)
        .map(|row| {
            CopyConstraint::new(
                Variable::absolute(ColumnType::Witness, 2, row - 1),
                Variable::absolute(ColumnType::Witness, 0, row),
            )
        })
        .collect();
    let cs = ConstraintSystem::new(
        vec![Gate::new(Selector::Column(0), vec![gate])],
        copies,
        vec![],
        vec![],
    );

    let mut w0 = vec![F::from(3u32)];
    let w1: Vec<F> = (0..usable).map(|_| F::random(&mut prng)).collect();
    let mut w2 = vec![];
    for row in 0..usable {
        let out = w0[row].mul(&w1[row]).add(&w0[row]);
        w2.push(out);
        if row + 1 < usable {
            w0.push(out);
        }
    }
    let table = AssignmentTable::new(
        desc,
        vec![w0, w1, w2],
        vec![],
        vec![],
        vec![vec![F::one(); usable]],
    )
    .unwrap();

    let params = PlaceholderParams::for_table(&desc, 40, 3, 0).unwrap();
    let start = Instant::now();
    let public = preprocess_public::<F, Sha256Hash>(&cs, &table, &params).unwrap();
    println!("preprocess time: {} s", start.elapsed().as_secs_f32());

    let start = Instant::now();
    let mut transcript = Transcript::new(b"Prover bench");
    let proof = prover(&mut prng, &mut transcript, &cs, &public, &table, &params).unwrap();
    println!("prover time: {} s", start.elapsed().as_secs_f32());

    let start = Instant::now();
    let mut transcript = Transcript::new(b"Prover bench");
    verifier::<F, Sha256Hash>(&mut transcript, &cs, &public.common, &[], &proof, &params)
        .unwrap();
    println!("verifier time: {} s", start.elapsed().as_secs_f32());
}
