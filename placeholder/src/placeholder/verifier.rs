use crate::arithmetization::{ConstraintSystem, Variable};
use crate::commitment::{
    hash::{Hash, HashOutput},
    lpc::{check_evaluation_shape, verify_eval, EvaluationMap, PointsMap},
    transcript::PlaceholderTranscript,
};
use crate::errors::{PlaceholderError, Result};
use crate::placeholder::{
    gates::evaluate_gates,
    lookup::LookupArgument,
    openings::{ClaimedValues, OpeningLayout},
    params::{PlaceholderField, PlaceholderParams},
    permutation::evaluate_permutation,
    preprocessor::CommonData,
    proof::PlaceholderProof,
    transcript::{
        transcript_get_challenge_field_elem, transcript_get_challenges,
        transcript_get_evaluation_point, transcript_init_placeholder, PlaceholderChallenges,
    },
    CONSTRAINT_POLYS, FIXED_VALUES_BATCH, LOOKUP_BATCH, PERMUTATION_BATCH, QUOTIENT_BATCH,
    VARIABLE_VALUES_BATCH,
};
use ark_std::{collections::BTreeMap, end_timer, start_timer, vec::Vec};
use merlin::Transcript;
use placeholder_algebra::prelude::*;

/// Check that the common data was derived from `cs`.
fn check_common<F: PlaceholderField, H: Hash>(
    cs: &ConstraintSystem<F>,
    common: &CommonData<F>,
) -> Result<()> {
    if common.hash_id != H::ID {
        return Err(PlaceholderError::UnsupportedFieldOrHash);
    }
    let desc = &common.desc;
    cs.validate(desc)?;
    let consistent = cs.digest::<H>()? == common.cs_digest
        && cs.columns_rotations(desc)? == common.columns_rotations
        && cs.permuted_columns() == common.permuted_columns
        && cs.public_input_sizes(desc) == common.public_input_sizes
        && cs.quotient_chunks() == common.quotient_chunks
        && cs.quotient_degree_factor() == common.quotient_degree_factor
        && cs.has_lookups() == common.has_lookups();
    if !consistent {
        return Err(PlaceholderError::ProofStructureError);
    }
    Ok(())
}

/// Replay the rounds of a proof, check the public inputs and the combined
/// constraint identity at the evaluation point.
///
/// Returns every batch root, the fixed one included, and the points the
/// evaluation proof must open. The transcript is left right before the
/// evaluations are absorbed.
pub(crate) fn verify_placeholder_identity<F: PlaceholderField, H: Hash>(
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    common: &CommonData<F>,
    public_inputs: &[Vec<F>],
    commitments: &BTreeMap<usize, HashOutput>,
    z: &EvaluationMap<F>,
    params: &PlaceholderParams<F>,
) -> Result<(BTreeMap<usize, HashOutput>, PointsMap<F>)> {
    check_common::<F, H>(cs, common)?;
    let desc = &common.desc;
    params.check(cs, desc)?;
    if public_inputs.len() != desc.public_input_columns {
        return Err(PlaceholderError::ProofStructureError);
    }
    let layout = OpeningLayout::new(common)?;
    if !commitments.keys().copied().eq(layout.proof_batches()) {
        return Err(PlaceholderError::ProofStructureError);
    }
    let root = |batch: usize| {
        commitments
            .get(&batch)
            .ok_or(PlaceholderError::BatchLabelNotCommitted(batch))
    };
    let n = desc.rows_amount;

    // 1. compute all challenges in the order of the prover.
    transcript_init_placeholder(transcript, common, &params.digest::<H>());
    let mut challenges = PlaceholderChallenges::new();
    if desc.witness_columns + desc.public_input_columns > 0 {
        transcript.absorb_commitment(root(VARIABLE_VALUES_BATCH)?);
    }
    if common.has_permutation() {
        challenges.beta = transcript_get_challenge_field_elem(transcript, n, b"beta");
        challenges.gamma = transcript_get_challenge_field_elem(transcript, n, b"gamma");
    }
    if common.has_lookups() {
        challenges.kappa = transcript_get_challenge_field_elem(transcript, n, b"kappa");
        transcript.absorb_commitment(root(LOOKUP_BATCH)?);
        challenges.lookup_beta = transcript_get_challenge_field_elem(transcript, n, b"lookup beta");
    }
    if common.has_permutation() || common.has_lookups() {
        transcript.absorb_commitment(root(PERMUTATION_BATCH)?);
    }
    challenges.theta = transcript_get_challenge_field_elem(transcript, n, b"theta");
    challenges.alphas = transcript_get_challenges(transcript, n, b"alpha", CONSTRAINT_POLYS);
    transcript.absorb_commitment(root(QUOTIENT_BATCH)?);
    challenges.y = transcript_get_evaluation_point(transcript, n, &params.fri);

    // 2. the claimed evaluations sit at the expected points.
    let points = layout.points(&challenges.y)?;
    check_evaluation_shape(z, &points)?;
    let values = ClaimedValues::new(&layout, z, challenges.y);

    // 3. the public input columns interpolate the public inputs.
    for (i, (inputs, size)) in public_inputs
        .iter()
        .zip(common.public_input_sizes.iter())
        .enumerate()
    {
        let expected = layout
            .domain
            .evaluate_interpolation(&inputs[..inputs.len().min(*size)], values.y())?;
        if values.variable(&Variable::public_input(i, 0))? != expected {
            return Err(PlaceholderError::IdentityMismatch);
        }
    }

    // 4. Σ α_i F_i(y) = Z(y) T(y).
    let mut constraints = [F::zero(); CONSTRAINT_POLYS];
    if common.has_permutation() {
        let fs = evaluate_permutation(&values, &challenges.beta, &challenges.gamma)?;
        constraints[..3].copy_from_slice(&fs);
    }
    let mut theta_power = F::one();
    constraints[7] = evaluate_gates(cs, &values, &challenges.theta, &mut theta_power)?;
    if common.has_lookups() {
        let fs = LookupArgument::new(cs).evaluate(
            &values,
            &challenges.kappa,
            &challenges.lookup_beta,
            &challenges.theta,
            &mut theta_power,
        )?;
        constraints[3..7].copy_from_slice(&fs);
    }
    let lhs = challenges
        .alphas
        .iter()
        .zip(constraints.iter())
        .fold(F::zero(), |acc, (alpha, f)| acc.add(&alpha.mul(f)));

    let y_n = challenges.y.pow(&[n as u64]);
    let mut t = F::zero();
    let mut power = F::one();
    for j in 0..common.quotient_chunks {
        t.add_assign(&values.get(QUOTIENT_BATCH, j, 0)?.mul(&power));
        power.mul_assign(&y_n);
    }
    let rhs = layout.domain.evaluate_vanishing(&challenges.y).mul(&t);
    if lhs != rhs {
        return Err(PlaceholderError::IdentityMismatch);
    }

    let mut all = commitments.clone();
    all.insert(FIXED_VALUES_BATCH, common.fixed_root);
    Ok((all, points))
}

/// Verify a Placeholder proof for the public input columns `public_inputs`.
///
/// Every public input column is compared on its first
/// `public_input_sizes[i]` rows; missing trailing values count as zero.
pub fn verifier<F: PlaceholderField, H: Hash>(
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    common: &CommonData<F>,
    public_inputs: &[Vec<F>],
    proof: &PlaceholderProof<F>,
    params: &PlaceholderParams<F>,
) -> Result<()> {
    let verifier_timer = start_timer!(|| "Placeholder::Verifier");
    let (commitments, points) = verify_placeholder_identity::<F, H>(
        transcript,
        cs,
        common,
        public_inputs,
        &proof.commitments,
        &proof.eval_proof.z,
        params,
    )?;
    verify_eval::<F, H>(
        &params.fri,
        &commitments,
        &points,
        &proof.eval_proof,
        transcript,
    )?;
    end_timer!(verifier_timer);
    Ok(())
}
