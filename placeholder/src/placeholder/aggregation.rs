//! Proving several instances under one FRI proof.
//!
//! Every instance runs the protocol up to its claimed evaluations and hands
//! the aggregator a challenge and the number of evaluations it claims. The
//! aggregator derives one combination challenge `θ` from all the instance
//! challenges, and every instance combines its quotients with the powers of
//! `θ` starting where the previous instance stopped. The aggregator proves
//! the sum with a single FRI, and every instance opens its batches at the
//! resulting query indices.

use crate::arithmetization::{AssignmentTable, ConstraintSystem};
use crate::commitment::{
    fri::{self, FriProof},
    hash::{Hash, HashOutput},
    lpc::{
        absorb_evaluations, check_first_round, combined_q_at_queries, EvaluationMap, LpcScheme,
        QueryInitialProofs,
    },
    transcript::PlaceholderTranscript,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::FpPolynomial;
use crate::placeholder::{
    params::{PlaceholderField, PlaceholderParams},
    preprocessor::{CommonData, PublicPreprocessedData},
    prover::{prove_until_openings, OpeningState},
    verifier::verify_placeholder_identity,
};
use ark_std::{collections::BTreeMap, end_timer, start_timer, vec::Vec};
use merlin::Transcript;
use placeholder_algebra::prelude::*;

/// The part of a proof an instance produces before aggregation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialProof<F> {
    /// The roots committed while proving, without the fixed one.
    pub commitments: BTreeMap<usize, HashOutput>,
    /// The claimed evaluations.
    pub z: EvaluationMap<F>,
}

/// The FRI proof shared by every aggregated instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedFriProof<F> {
    /// The proof for the sum of the combined polynomials.
    pub fri_proof: FriProof<F>,
}

/// Proofs of several instances sharing one FRI proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedProof<F> {
    /// The partial proof of every instance.
    pub partial_proofs: Vec<PartialProof<F>>,
    /// The shared FRI proof.
    pub fri_proof: FriProof<F>,
    /// The openings of every instance at the query indices.
    pub initial_proofs: Vec<Vec<QueryInitialProofs<F>>>,
}

/// The prover state of an instance kept between its partial proof and its
/// openings.
pub struct InstanceState<F: Domain, H> {
    lpc: LpcScheme<F, H>,
    z: EvaluationMap<F>,
    challenge: F,
    theta_power: usize,
}

impl<F: Domain, H: Hash> InstanceState<F, H> {
    /// The challenge handed to the aggregator.
    pub fn challenge(&self) -> F {
        self.challenge
    }

    /// The number of claimed evaluations, which is the number of powers of
    /// `θ` the instance uses.
    pub fn theta_power(&self) -> usize {
        self.theta_power
    }

    /// Combine the claimed evaluations with the powers of `theta` from
    /// `starting_power` on.
    pub fn combined_q(&self, theta: &F, starting_power: usize) -> Result<FpPolynomial<F>> {
        let start = start_timer!(|| "Combined Q");
        let (q, _) = self.lpc.combined_q(&self.z, theta, starting_power)?;
        end_timer!(start);
        Ok(q)
    }

    /// Open every batch of the instance at the query indices.
    pub fn initial_proofs(&self, indices: &[usize]) -> Result<Vec<QueryInitialProofs<F>>> {
        self.lpc.initial_proofs(indices)
    }
}

/// Run the protocol for one instance up to its claimed evaluations.
///
/// The transcript absorbs the evaluations and yields the challenge the
/// aggregator combines.
pub fn partial_prove<R: CryptoRng + RngCore, F: PlaceholderField, H: Hash>(
    prng: &mut R,
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    public: &PublicPreprocessedData<F, H>,
    table: &AssignmentTable<F>,
    params: &PlaceholderParams<F>,
) -> Result<(PartialProof<F>, InstanceState<F, H>)> {
    let OpeningState { lpc, commitments } =
        prove_until_openings(prng, transcript, cs, public, table, params)?;
    let z = lpc.evaluate_points()?;
    absorb_evaluations(transcript, &z);
    let challenge = transcript.squeeze_field(b"aggregation challenge");
    let theta_power = evaluations_count(&z);
    let partial = PartialProof {
        commitments,
        z: z.clone(),
    };
    let state = InstanceState {
        lpc,
        z,
        challenge,
        theta_power,
    };
    Ok((partial, state))
}

fn evaluations_count<F>(z: &EvaluationMap<F>) -> usize {
    z.values().flatten().map(|evals| evals.len()).sum()
}

fn aggregation_transcript<F: Scalar>(challenges: &[F]) -> (Transcript, F) {
    let mut transcript = Transcript::new(b"Placeholder aggregation");
    transcript.absorb_u64(b"instances", challenges.len() as u64);
    for c in challenges.iter() {
        transcript.absorb_field(c);
    }
    let theta = transcript.squeeze_field(b"aggregated theta");
    (transcript, theta)
}

/// Derive the combination challenge from the challenges of every instance,
/// in order.
pub fn aggregated_challenge<F: Scalar>(challenges: &[F]) -> F {
    aggregation_transcript(challenges).1
}

/// Return the power of `θ` every instance starts from.
pub fn starting_powers(theta_powers: &[usize]) -> Vec<usize> {
    theta_powers
        .iter()
        .scan(0, |acc, p| {
            let start = *acc;
            *acc += p;
            Some(start)
        })
        .collect()
}

/// Prove the sum of the combined polynomials of every instance and return
/// the query indices the instances must open.
pub fn aggregated_fri<F: Domain, H: Hash>(
    params: &PlaceholderParams<F>,
    challenges: &[F],
    combined_qs: &[FpPolynomial<F>],
) -> Result<(AggregatedFriProof<F>, Vec<usize>)> {
    if challenges.is_empty() || challenges.len() != combined_qs.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    let start = start_timer!(|| "Aggregated FRI");
    let mut q = FpPolynomial::zero();
    for p in combined_qs.iter() {
        q.add_assign(p);
    }
    let (mut transcript, _) = aggregation_transcript(challenges);
    let (fri_proof, indices) = fri::prove::<F, H>(&q, &params.fri, &mut transcript)?;
    end_timer!(start);
    Ok((AggregatedFriProof { fri_proof }, indices))
}

/// Assemble the aggregated proof.
pub fn merge_proofs<F>(
    partial_proofs: Vec<PartialProof<F>>,
    fri_proof: AggregatedFriProof<F>,
    initial_proofs: Vec<Vec<QueryInitialProofs<F>>>,
) -> Result<AggregatedProof<F>> {
    if partial_proofs.is_empty() || partial_proofs.len() != initial_proofs.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    Ok(AggregatedProof {
        partial_proofs,
        fri_proof: fri_proof.fri_proof,
        initial_proofs,
    })
}

/// Prove every instance and aggregate their evaluation proofs, in one process.
pub fn aggregated_prover<R: CryptoRng + RngCore, F: PlaceholderField, H: Hash>(
    prng: &mut R,
    instances: &[(
        &ConstraintSystem<F>,
        &PublicPreprocessedData<F, H>,
        &AssignmentTable<F>,
    )],
    transcripts: &mut [Transcript],
    params: &PlaceholderParams<F>,
) -> Result<AggregatedProof<F>> {
    if instances.len() != transcripts.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    let mut partial_proofs = Vec::with_capacity(instances.len());
    let mut states = Vec::with_capacity(instances.len());
    for ((cs, public, table), transcript) in instances.iter().zip(transcripts.iter_mut()) {
        let (partial, state) = partial_prove(prng, transcript, cs, public, table, params)?;
        partial_proofs.push(partial);
        states.push(state);
    }

    let challenges: Vec<F> = states.iter().map(|s| s.challenge()).collect();
    let theta = aggregated_challenge(&challenges);
    let powers: Vec<usize> = states.iter().map(|s| s.theta_power()).collect();
    let combined_qs = states
        .iter()
        .zip(starting_powers(&powers))
        .map(|(s, p)| s.combined_q(&theta, p))
        .collect::<Result<Vec<_>>>()?;
    let (fri_proof, indices) = aggregated_fri::<F, H>(params, &challenges, &combined_qs)?;
    let initial_proofs = states
        .iter()
        .map(|s| s.initial_proofs(&indices))
        .collect::<Result<Vec<_>>>()?;
    merge_proofs(partial_proofs, fri_proof, initial_proofs)
}

/// What the verifier knows about one aggregated instance.
pub struct VerifierInstance<'a, F> {
    /// The constraint system.
    pub cs: &'a ConstraintSystem<F>,
    /// The preprocessed common data.
    pub common: &'a CommonData<F>,
    /// The public input columns.
    pub public_inputs: &'a [Vec<F>],
    /// A transcript in the same state as the prover's for this instance.
    pub transcript: Transcript,
}

/// Verify an aggregated proof.
pub fn verify_aggregated<F: PlaceholderField, H: Hash>(
    instances: Vec<VerifierInstance<'_, F>>,
    proof: &AggregatedProof<F>,
    params: &PlaceholderParams<F>,
) -> Result<()> {
    let verifier_timer = start_timer!(|| "Placeholder::AggregatedVerifier");
    if instances.is_empty()
        || instances.len() != proof.partial_proofs.len()
        || instances.len() != proof.initial_proofs.len()
    {
        return Err(PlaceholderError::ProofStructureError);
    }

    let mut challenges = Vec::with_capacity(instances.len());
    let mut roots = Vec::with_capacity(instances.len());
    for (instance, partial) in instances.into_iter().zip(proof.partial_proofs.iter()) {
        let mut transcript = instance.transcript;
        let (commitments, points) = verify_placeholder_identity::<F, H>(
            &mut transcript,
            instance.cs,
            instance.common,
            instance.public_inputs,
            &partial.commitments,
            &partial.z,
            params,
        )?;
        if points
            .values()
            .flatten()
            .flatten()
            .any(|p| params.fri.is_in_commitment_domain(p))
        {
            return Err(PlaceholderError::InvalidOpeningPoint);
        }
        absorb_evaluations(&mut transcript, &partial.z);
        challenges.push(transcript.squeeze_field::<F>(b"aggregation challenge"));
        roots.push(commitments);
    }

    let (mut transcript, theta) = aggregation_transcript(&challenges);
    let indices = fri::verify::<F, H>(&proof.fri_proof, &params.fri, &mut transcript)?;

    let width = params.fri.leaf_width(0);
    let mut expected = vec![vec![F::zero(); width]; indices.len()];
    let mut power = 0;
    for ((commitments, partial), initial) in roots
        .iter()
        .zip(proof.partial_proofs.iter())
        .zip(proof.initial_proofs.iter())
    {
        let (values, count) = combined_q_at_queries::<F, H>(
            &params.fri,
            commitments,
            &partial.z,
            initial,
            &indices,
            &theta,
            power,
        )?;
        for (acc, row) in expected.iter_mut().zip(values.iter()) {
            for (a, v) in acc.iter_mut().zip(row.iter()) {
                a.add_assign(v);
            }
        }
        power += count;
    }
    check_first_round(&proof.fri_proof, &expected)?;
    end_timer!(verifier_timer);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::starting_powers;

    #[test]
    fn powers_accumulate() {
        assert_eq!(starting_powers(&[3, 5, 2]), vec![0, 3, 8]);
        assert!(starting_powers(&[]).is_empty());
    }
}
