mod common;

use common::{byte_range, fibonacci, products, Circuit, F};
use merlin::Transcript;
use placeholder_algebra::prelude::*;
use placeholder_plonk::arithmetization::{
    AssignmentTable, ColumnType, ConstraintSystem, CopyConstraint, Expression, Gate, LookupGate,
    LookupInput, LookupTable, Selector, SpecialSelector, TableDescription, Variable,
};
use placeholder_plonk::commitment::hash::{Keccak256Hash, Sha256Hash};
use placeholder_plonk::errors::PlaceholderError;
use placeholder_plonk::placeholder::{
    encoding::{decode_proof, encode_initial_proofs, encode_proof},
    preprocess_public, prover, verifier, CommonData, PlaceholderParams, PlaceholderProof,
};

const LABEL: &[u8] = b"Placeholder test";

fn prove(circuit: &Circuit, params: &PlaceholderParams<F>, seed: u64) -> PlaceholderProof<F> {
    let mut prng = seeded_rng(seed);
    let public = preprocess_public::<F, Sha256Hash>(&circuit.cs, &circuit.table, params).unwrap();
    let mut transcript = Transcript::new(LABEL);
    prover(
        &mut prng,
        &mut transcript,
        &circuit.cs,
        &public,
        &circuit.table,
        params,
    )
    .unwrap()
}

fn verify(
    circuit: &Circuit,
    common: &CommonData<F>,
    public_inputs: &[Vec<F>],
    proof: &PlaceholderProof<F>,
    params: &PlaceholderParams<F>,
) -> Result<(), PlaceholderError> {
    let mut transcript = Transcript::new(LABEL);
    verifier::<F, Sha256Hash>(
        &mut transcript,
        &circuit.cs,
        common,
        public_inputs,
        proof,
        params,
    )
}

fn common_of(circuit: &Circuit, params: &PlaceholderParams<F>) -> CommonData<F> {
    preprocess_public::<F, Sha256Hash>(&circuit.cs, &circuit.table, params)
        .unwrap()
        .common
}

#[test]
fn test_fibonacci() {
    let circuit = fibonacci(1, 1);
    let fib_127: u128 = {
        let (mut a, mut b) = (1u128, 1u128);
        for _ in 2..127 {
            let c = a + b;
            a = b;
            b = c;
        }
        b
    };
    assert_eq!(circuit.table.witnesses()[0][126], F::from(fib_127));

    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    assert_eq!(common.quotient_degree_factor, 4);
    assert_eq!(common.quotient_chunks, 3);

    let proof = prove(&circuit, &params, 0);
    assert!(verify(&circuit, &common, &circuit.public_inputs, &proof, &params).is_ok());

    // the same seed gives the same proof
    assert_eq!(proof, prove(&circuit, &params, 0));
}

#[test]
fn test_wrong_public_input() {
    let circuit = fibonacci(1, 1);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 1);

    let wrong = vec![vec![F::one(), F::from(2u32)]];
    assert_eq!(
        verify(&circuit, &common, &wrong, &proof, &params),
        Err(PlaceholderError::IdentityMismatch)
    );

    // missing trailing inputs count as zero
    let short = vec![vec![F::one()]];
    assert_eq!(
        verify(&circuit, &common, &short, &proof, &params),
        Err(PlaceholderError::IdentityMismatch)
    );
}

#[test]
fn test_tampered_fri_root() {
    let circuit = fibonacci(1, 1);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let mut proof = prove(&circuit, &params, 2);
    proof.eval_proof.fri_proof.fri_roots[0][0] ^= 1;

    let res = verify(&circuit, &common, &circuit.public_inputs, &proof, &params);
    assert!(matches!(
        res,
        Err(PlaceholderError::MerklePathMismatch) | Err(PlaceholderError::FoldingInconsistency)
    ));
}

#[test]
fn test_tampered_evaluation() {
    let circuit = fibonacci(1, 1);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let mut proof = prove(&circuit, &params, 3);
    let evals = proof.eval_proof.z.values_mut().next().unwrap();
    evals[0][0].1.add_assign(&F::one());

    assert!(verify(&circuit, &common, &circuit.public_inputs, &proof, &params).is_err());
}

#[test]
fn test_missing_commitment() {
    let circuit = fibonacci(1, 1);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let mut proof = prove(&circuit, &params, 4);
    let first = *proof.commitments.keys().next().unwrap();
    proof.commitments.remove(&first);

    assert_eq!(
        verify(&circuit, &common, &circuit.public_inputs, &proof, &params),
        Err(PlaceholderError::ProofStructureError)
    );
}

#[test]
fn test_byte_range_lookup() {
    let circuit = byte_range(&[0x42, 0xff, 0], 256, 256);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    assert!(common.has_lookups());
    assert!(!common.has_permutation());

    let proof = prove(&circuit, &params, 5);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());
}

#[test]
fn test_lookup_with_repeated_table_rows() {
    let circuit = byte_range(&[7, 3, 250, 3, 3], 511, 256);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 6);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());
}

#[test]
fn test_value_outside_the_table() {
    let circuit = byte_range(&[0x42, 0x100], 256, 256);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let public = preprocess_public::<F, Sha256Hash>(&circuit.cs, &circuit.table, &params).unwrap();
    let mut prng = seeded_rng(7);
    let mut transcript = Transcript::new(LABEL);
    let res = prover(
        &mut prng,
        &mut transcript,
        &circuit.cs,
        &public,
        &circuit.table,
        &params,
    );
    assert_eq!(res.err(), Some(PlaceholderError::LookupTableMissing));
}

#[test]
fn test_gates_and_lookups_together() {
    // w1 = 2·w0 on every usable row, and w0 is a byte
    let desc = TableDescription::new(2, 0, 1, 1, 511, 512).unwrap();
    let double: Expression<F> = Expression::from(Variable::witness(1, 0))
        - Expression::constant(F::from(2u32)) * Variable::witness(0, 0);
    let sum: Expression<F> = Expression::from(Variable::witness(1, 0))
        - Variable::witness(0, 0)
        - Variable::witness(0, 0);
    let gate = Gate::new(
        Selector::Special(SpecialSelector::AllUsableRows),
        vec![double, sum],
    );
    let range = LookupTable::new(Selector::Column(0), vec![vec![Variable::constant(0, 0)]]);
    let lookup = LookupGate::new(
        Selector::Special(SpecialSelector::AllUsableRows),
        vec![LookupInput {
            table_id: 0,
            values: vec![Expression::from(Variable::witness(0, 0))],
        }],
    );
    let cs = ConstraintSystem::new(vec![gate], vec![], vec![lookup], vec![range]);

    let w0: Vec<F> = [9u64, 200, 255, 0, 9].iter().map(|v| F::from(*v)).collect();
    let w1 = w0.iter().map(|v| v.add(v)).collect();
    let constants = (0..256u64).map(|i| F::from(i)).collect();
    let table =
        AssignmentTable::new(desc, vec![w0, w1], vec![], vec![constants], vec![vec![F::one(); 256]])
            .unwrap();
    cs.verify_assignment(&table).unwrap();
    let circuit = Circuit {
        desc,
        cs,
        table,
        public_inputs: vec![],
    };

    let params = PlaceholderParams::for_table(&desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    assert!(common.has_lookups());
    let proof = prove(&circuit, &params, 18);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());
}

#[test]
fn test_unsatisfied_gate() {
    let mut circuit = fibonacci(1, 1);
    let mut w = circuit.table.witnesses()[0].clone();
    w[50].add_assign(&F::one());
    circuit.table = AssignmentTable::new(
        circuit.desc,
        vec![w],
        circuit.public_inputs.clone(),
        vec![],
        circuit.table.selectors().to_vec(),
    )
    .unwrap();

    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let public = preprocess_public::<F, Sha256Hash>(&circuit.cs, &circuit.table, &params).unwrap();
    let mut prng = seeded_rng(8);
    let mut transcript = Transcript::new(LABEL);
    let res = prover(
        &mut prng,
        &mut transcript,
        &circuit.cs,
        &public,
        &circuit.table,
        &params,
    );
    assert!(matches!(
        res,
        Err(PlaceholderError::QuotientNotDivisible)
            | Err(PlaceholderError::UnsatisfiedConstraint { .. })
    ));
}

#[test]
fn test_empty_circuit() {
    let desc = TableDescription::with_usable_rows(0, 0, 0, 0, 1).unwrap();
    assert_eq!(desc.rows_amount, 2);
    let circuit = Circuit {
        desc,
        cs: ConstraintSystem::new(vec![], vec![], vec![], vec![]),
        table: AssignmentTable::new(desc, vec![], vec![], vec![], vec![]).unwrap(),
        public_inputs: vec![],
    };
    let params = PlaceholderParams::for_table(&desc, 4, 1, 0).unwrap();
    let common = common_of(&circuit, &params);
    assert_eq!(common.quotient_chunks, 1);

    let proof = prove(&circuit, &params, 9);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());
}

#[test]
fn test_self_copy_is_trivial() {
    let mut circuit = products(6);
    let cell = Variable::absolute(ColumnType::Witness, 1, 2);
    circuit.cs = ConstraintSystem::new(
        circuit.cs.gates().to_vec(),
        vec![CopyConstraint::new(cell, cell)],
        vec![],
        vec![],
    );
    let params = PlaceholderParams::for_table(&circuit.desc, 8, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    assert!(!common.has_permutation());

    let proof = prove(&circuit, &params, 10);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());
}

#[test]
fn test_grinding() {
    let circuit = products(14);
    let params = PlaceholderParams::for_table(&circuit.desc, 8, 2, 16).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 11);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());

    // a nonce one off is checked before any query is drawn
    let mut tampered = proof.clone();
    tampered.eval_proof.fri_proof.proof_of_work ^= 1;
    assert_eq!(
        verify(&circuit, &common, &[], &tampered, &params),
        Err(PlaceholderError::GrindingInsufficient)
    );

    // the proof is bound to its parameters
    let other = PlaceholderParams::for_table(&circuit.desc, 8, 2, 0).unwrap();
    assert!(verify(&circuit, &common, &[], &proof, &other).is_err());
}

#[test]
fn test_grinding_disabled() {
    let circuit = products(14);
    let params = PlaceholderParams::for_table(&circuit.desc, 8, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 15);
    assert_eq!(proof.eval_proof.fri_proof.proof_of_work, 0);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());

    // the nonce is absorbed even without grinding
    let mut other_nonce = proof.clone();
    other_nonce.eval_proof.fri_proof.proof_of_work = 1;
    assert!(verify(&circuit, &common, &[], &other_nonce, &params).is_err());

    // the nonce closes the FRI section, right before the initial proofs
    let bytes = encode_proof::<F, Sha256Hash>(&proof);
    let initial = encode_initial_proofs::<F, Sha256Hash>(&proof.eval_proof.initial_proofs);
    let nonce_end = bytes.len() - (initial.len() - 3);
    assert_eq!(&bytes[nonce_end - 8..nonce_end], &[0u8; 8]);

    let mut without_nonce = bytes[..nonce_end - 8].to_vec();
    without_nonce.extend_from_slice(&bytes[nonce_end..]);
    assert!(decode_proof::<F, Sha256Hash>(&without_nonce).is_err());
    assert_eq!(
        decode_proof::<F, Sha256Hash>(&bytes[..nonce_end - 8]),
        Err(PlaceholderError::SerializationTruncated)
    );
}

#[test]
fn test_copy_on_the_last_usable_row() {
    let desc = TableDescription::new(2, 0, 0, 0, 127, 128).unwrap();
    let copy = |row: usize| {
        CopyConstraint::new(
            Variable::absolute(ColumnType::Witness, 0, row),
            Variable::absolute(ColumnType::Witness, 1, row),
        )
    };
    let cs = ConstraintSystem::<F>::new(vec![], vec![copy(0), copy(126)], vec![], vec![]);
    assert!(cs.validate(&desc).is_ok());

    let mut prng = seeded_rng(16);
    let w0: Vec<F> = (0..127).map(|_| F::random(&mut prng)).collect();
    let mut w1: Vec<F> = (0..127).map(|_| F::random(&mut prng)).collect();
    w1[0] = w0[0];
    w1[126] = w0[126];
    let table = AssignmentTable::new(desc, vec![w0.clone(), w1.clone()], vec![], vec![], vec![])
        .unwrap();
    cs.verify_assignment(&table).unwrap();
    let circuit = Circuit {
        desc,
        cs,
        table,
        public_inputs: vec![],
    };
    let params = PlaceholderParams::for_table(&desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    assert!(common.has_permutation());
    let proof = prove(&circuit, &params, 17);
    assert!(verify(&circuit, &common, &[], &proof, &params).is_ok());

    // breaking the copy on the last usable row breaks the permutation
    let mut broken = circuit;
    w1[126].add_assign(&F::one());
    broken.table = AssignmentTable::new(desc, vec![w0, w1], vec![], vec![], vec![]).unwrap();
    let public = preprocess_public::<F, Sha256Hash>(&broken.cs, &broken.table, &params).unwrap();
    let mut transcript = Transcript::new(LABEL);
    let res = prover(
        &mut prng,
        &mut transcript,
        &broken.cs,
        &public,
        &broken.table,
        &params,
    );
    assert!(matches!(
        res,
        Err(PlaceholderError::QuotientNotDivisible)
            | Err(PlaceholderError::UnsatisfiedCopyConstraint(1))
    ));
}

#[test]
fn test_transcript_label_binds_the_proof() {
    let circuit = products(6);
    let params = PlaceholderParams::for_table(&circuit.desc, 8, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 12);

    let mut transcript = Transcript::new(b"Another label");
    assert!(verifier::<F, Sha256Hash>(
        &mut transcript,
        &circuit.cs,
        &common,
        &[],
        &proof,
        &params
    )
    .is_err());
}

#[test]
fn test_hash_mismatch() {
    let circuit = products(6);
    let params = PlaceholderParams::for_table(&circuit.desc, 8, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 13);

    let mut transcript = Transcript::new(LABEL);
    assert_eq!(
        verifier::<F, Keccak256Hash>(&mut transcript, &circuit.cs, &common, &[], &proof, &params),
        Err(PlaceholderError::UnsupportedFieldOrHash)
    );
}

#[test]
fn test_proof_serialization() {
    let circuit = fibonacci(1, 1);
    let params = PlaceholderParams::for_table(&circuit.desc, 10, 2, 0).unwrap();
    let common = common_of(&circuit, &params);
    let proof = prove(&circuit, &params, 14);

    let bytes = encode_proof::<F, Sha256Hash>(&proof);
    let decoded = decode_proof::<F, Sha256Hash>(&bytes).unwrap();
    assert_eq!(decoded, proof);
    assert_eq!(encode_proof::<F, Sha256Hash>(&decoded), bytes);
    assert!(verify(&circuit, &common, &circuit.public_inputs, &decoded, &params).is_ok());

    let json = serde_json::to_string(&proof).unwrap();
    let from_json: PlaceholderProof<F> = serde_json::from_str(&json).unwrap();
    assert_eq!(from_json, proof);

    let common_bytes = bincode::serialize(&common).unwrap();
    let from_bincode: CommonData<F> = bincode::deserialize(&common_bytes).unwrap();
    assert_eq!(from_bincode, common);
    assert!(verify(
        &circuit,
        &from_bincode,
        &circuit.public_inputs,
        &proof,
        &params
    )
    .is_ok());
}
