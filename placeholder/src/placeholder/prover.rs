use crate::arithmetization::{AssignmentTable, ColumnCache, ConstraintSystem};
use crate::commitment::{
    hash::{Hash, HashOutput},
    lpc::LpcScheme,
    transcript::PlaceholderTranscript,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::{FpPolynomial, PolynomialDfs};
use crate::placeholder::{
    gates::gates_constraint,
    lookup::LookupArgument,
    openings::OpeningLayout,
    params::{PlaceholderField, PlaceholderParams},
    permutation::{permutation_constraints, permutation_product},
    preprocessor::{preprocess_private, PublicPreprocessedData},
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

/// The prover after the quotient is committed and every opening point is
/// registered, right before the evaluation proof.
pub(crate) struct OpeningState<F: Domain, H> {
    /// The commitment scheme, holding every batch of the proof.
    pub(crate) lpc: LpcScheme<F, H>,
    /// The roots committed while proving, without the fixed one.
    pub(crate) commitments: BTreeMap<usize, HashOutput>,
}

fn commit_batch<F: Domain, H: Hash>(
    lpc: &mut LpcScheme<F, H>,
    transcript: &mut Transcript,
    batch: usize,
    polys: Vec<FpPolynomial<F>>,
) -> Result<()> {
    lpc.append_to_batch(batch, polys)?;
    let root = lpc.commit(batch)?;
    transcript.absorb_commitment(&root);
    Ok(())
}

fn coefficients<'a, F: Domain + 'a>(
    polys: impl Iterator<Item = &'a PolynomialDfs<F>>,
) -> Result<Vec<FpPolynomial<F>>> {
    polys.map(|p| p.to_coefficients()).collect()
}

/// Run every round of the protocol up to the openings.
///
/// The padding rows of `table` are randomized on a copy, so the caller's
/// table is left untouched.
pub(crate) fn prove_until_openings<R: CryptoRng + RngCore, F: PlaceholderField, H: Hash>(
    prng: &mut R,
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    public: &PublicPreprocessedData<F, H>,
    table: &AssignmentTable<F>,
    params: &PlaceholderParams<F>,
) -> Result<OpeningState<F, H>> {
    let common = &public.common;
    let desc = *table.desc();
    if desc != common.desc || common.hash_id != H::ID {
        return Err(PlaceholderError::ProofStructureError);
    }
    if cs.digest::<H>()? != common.cs_digest {
        return Err(PlaceholderError::ProofStructureError);
    }
    params.check(cs, &desc)?;
    #[cfg(feature = "debug")]
    cs.verify_assignment(table)?;

    let n = desc.rows_amount;
    let layout = OpeningLayout::new(common)?;

    let padding_timer = start_timer!(|| "Randomize the padding rows");
    let mut table = table.clone();
    table.randomize_padding(prng);
    let private = preprocess_private(&table)?;
    let polys = public.polynomial_table(&private);
    end_timer!(padding_timer);

    transcript_init_placeholder(transcript, common, &params.digest::<H>());
    let mut lpc = LpcScheme::<F, H>::new(params.fri.clone());
    lpc.set_committed(FIXED_VALUES_BATCH, public.fixed_batch.clone())?;
    let mut challenges = PlaceholderChallenges::new();

    // 1. commit the witness and public input columns
    let variables_timer = start_timer!(|| "Commit the variable columns");
    if desc.witness_columns + desc.public_input_columns > 0 {
        let batch = coefficients(private.witnesses.iter().chain(private.public_inputs.iter()))?;
        commit_batch(&mut lpc, transcript, VARIABLE_VALUES_BATCH, batch)?;
    }
    end_timer!(variables_timer);

    // 2. the permutation product
    let v_p = if common.has_permutation() {
        challenges.beta = transcript_get_challenge_field_elem(transcript, n, b"beta");
        challenges.gamma = transcript_get_challenge_field_elem(transcript, n, b"gamma");
        Some(permutation_product(
            public,
            &polys,
            &challenges.beta,
            &challenges.gamma,
        )?)
    } else {
        None
    };

    // 3. the lookup multiplicities and auxiliary polynomials
    let lookup = LookupArgument::new(cs);
    let lookup_polys = if common.has_lookups() {
        challenges.kappa = transcript_get_challenge_field_elem(transcript, n, b"kappa");
        let counts = lookup.counts(&table)?;
        commit_batch(&mut lpc, transcript, LOOKUP_BATCH, coefficients(counts.iter())?)?;
        challenges.lookup_beta = transcript_get_challenge_field_elem(transcript, n, b"lookup beta");
        let mut cache = ColumnCache::new(polys, n);
        Some(lookup.auxiliary_polys(
            &mut cache,
            counts,
            desc.usable_rows,
            &challenges.kappa,
            &challenges.lookup_beta,
        )?)
    } else {
        None
    };

    if v_p.is_some() || lookup_polys.is_some() {
        let mut batch = Vec::new();
        if let Some(v) = &v_p {
            batch.push(v.to_coefficients()?);
        }
        if let Some(l) = &lookup_polys {
            batch.push(l.u.to_coefficients()?);
            batch.extend(coefficients(l.h.iter().chain(l.g.iter()))?);
        }
        commit_batch(&mut lpc, transcript, PERMUTATION_BATCH, batch)?;
    }
    challenges.theta = transcript_get_challenge_field_elem(transcript, n, b"theta");
    challenges.alphas = transcript_get_challenges(transcript, n, b"alpha", CONSTRAINT_POLYS);

    // 4. the quotient
    let quotient_timer = start_timer!(|| "Compute the quotient");
    let size = n * common.quotient_degree_factor.next_power_of_two();
    let mut cache = ColumnCache::new(polys, size);
    let mut constraints: Vec<Option<PolynomialDfs<F>>> = vec![None; CONSTRAINT_POLYS];
    if let Some(v) = &v_p {
        let fs = permutation_constraints(
            public,
            &mut cache,
            v,
            &challenges.beta,
            &challenges.gamma,
        )?;
        for (slot, f) in constraints.iter_mut().zip(fs) {
            *slot = Some(f);
        }
    }
    let mut theta_power = F::one();
    constraints[7] = Some(gates_constraint(
        cs,
        polys,
        &challenges.theta,
        &mut theta_power,
        size,
    )?);
    if let Some(l) = &lookup_polys {
        let fs = lookup.constraints(
            public,
            &mut cache,
            l,
            &challenges.kappa,
            &challenges.lookup_beta,
            &challenges.theta,
            &mut theta_power,
        )?;
        for (slot, f) in constraints[3..7].iter_mut().zip(fs) {
            *slot = Some(f);
        }
    }

    let mut combined = PolynomialDfs::zero(size)?;
    for (alpha, f) in challenges.alphas.iter().zip(constraints.iter()) {
        if let Some(f) = f {
            combined = combined.add(&f.mul_scalar(alpha))?;
        }
    }
    let quotient = combined
        .to_coefficients()?
        .divide_by_vanishing(n)?
        .split(n, common.quotient_chunks)?;
    commit_batch(&mut lpc, transcript, QUOTIENT_BATCH, quotient)?;
    end_timer!(quotient_timer);

    // 5. the evaluation point
    challenges.y = transcript_get_evaluation_point(transcript, n, &params.fri);
    lpc.set_eval_points(layout.points(&challenges.y)?)?;

    let mut commitments = lpc.commitments();
    commitments.remove(&FIXED_VALUES_BATCH);
    Ok(OpeningState { lpc, commitments })
}

/// Placeholder prover: it produces a proof that `table` satisfies the
/// constraint system `cs`.
/// The verifier must use a transcript in the same state as the prover's and
/// the same parameters. It returns [PlaceholderError] if the table or the
/// parameters do not match the preprocessed circuit, or if the quotient does
/// not divide, meaning the table does not satisfy `cs`.
/// # Example
/// ```
/// use placeholder_plonk::arithmetization::{
///     AssignmentTable, ConstraintSystem, Expression, Gate, Selector, TableDescription, Variable,
/// };
/// use placeholder_plonk::commitment::hash::Sha256Hash;
/// use placeholder_plonk::placeholder::{
///     preprocess_public, prover, verifier, PlaceholderParams,
/// };
/// use merlin::Transcript;
/// use placeholder_algebra::{bn254::BN254Scalar, prelude::*};
///
/// let mut prng = seeded_rng(0);
///
/// // circuit (w_0 + w_1 = w_2) on every row with the selector on
/// let desc = TableDescription::new(3, 0, 0, 1, 7, 8).unwrap();
/// let sum = Expression::from(Variable::witness(0, 0)) + Variable::witness(1, 0)
///     - Variable::witness(2, 0);
/// let cs = ConstraintSystem::<BN254Scalar>::new(
///     vec![Gate::new(Selector::Column(0), vec![sum])],
///     vec![],
///     vec![],
///     vec![],
/// );
///
/// let a: Vec<BN254Scalar> = (0..7u32).map(BN254Scalar::from).collect();
/// let b: Vec<BN254Scalar> = (7..14u32).map(BN254Scalar::from).collect();
/// let c: Vec<BN254Scalar> = a.iter().zip(b.iter()).map(|(x, y)| x.add(y)).collect();
/// let table = AssignmentTable::new(
///     desc,
///     vec![a, b, c],
///     vec![],
///     vec![],
///     vec![vec![BN254Scalar::one(); 7]],
/// )
/// .unwrap();
///
/// let params = PlaceholderParams::for_table(&desc, 8, 2, 0).unwrap();
/// let public = preprocess_public::<_, Sha256Hash>(&cs, &table, &params).unwrap();
///
/// let proof = {
///     let mut transcript = Transcript::new(b"Test");
///     prover(&mut prng, &mut transcript, &cs, &public, &table, &params).unwrap()
/// };
///
/// let mut transcript = Transcript::new(b"Test");
/// assert!(verifier::<_, Sha256Hash>(
///     &mut transcript,
///     &cs,
///     &public.common,
///     &[],
///     &proof,
///     &params
/// )
/// .is_ok())
/// ```
pub fn prover<R: CryptoRng + RngCore, F: PlaceholderField, H: Hash>(
    prng: &mut R,
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    public: &PublicPreprocessedData<F, H>,
    table: &AssignmentTable<F>,
    params: &PlaceholderParams<F>,
) -> Result<PlaceholderProof<F>> {
    let prover_timer = start_timer!(|| "Placeholder::Prover");
    let OpeningState { lpc, commitments } =
        prove_until_openings(prng, transcript, cs, public, table, params)?;
    let eval_proof = lpc.proof_eval(transcript)?;
    end_timer!(prover_timer);
    Ok(PlaceholderProof {
        commitments,
        eval_proof,
    })
}
