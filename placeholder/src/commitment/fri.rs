use crate::commitment::{
    hash::{Hash, HashOutput},
    merkle::{hash_field_leaf, MerklePath, MerkleTree},
    proof_of_work,
    transcript::PlaceholderTranscript,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::{EvaluationDomain, FpPolynomial};
use ark_std::vec::Vec;
use merlin::Transcript;
use placeholder_algebra::prelude::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The largest number of foldings done within one round.
pub const MAX_STEP: usize = 10;

/// The parameters of the FRI low-degree test and of the commitment domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriParams<F: Domain> {
    /// The number of queries.
    pub lambda: usize,
    /// The number of foldings done in each round.
    pub step_list: Vec<usize>,
    /// `log2` of the blow-up factor.
    pub expand_factor: usize,
    /// The number of leading zero bits required from the proof-of-work.
    pub grinding_bits: u32,
    /// `log2` of the largest committed polynomial length.
    pub max_degree_log: usize,
    domains: Vec<EvaluationDomain<F>>,
}

impl<F: Domain> FriParams<F> {
    /// Create and check the parameters.
    pub fn new(
        lambda: usize,
        step_list: Vec<usize>,
        expand_factor: usize,
        grinding_bits: u32,
        max_degree_log: usize,
    ) -> Result<Self> {
        if step_list.is_empty()
            || step_list.iter().any(|s| *s == 0 || *s > MAX_STEP)
            || step_list.iter().sum::<usize>() > max_degree_log
        {
            return Err(PlaceholderError::InvalidStepList);
        }
        if lambda == 0 {
            return Err(PlaceholderError::Message(
                "FRI needs at least one query".into(),
            ));
        }
        if grinding_bits > 64 {
            return Err(PlaceholderError::Message(
                "grinding is limited to 64 bits".into(),
            ));
        }
        if expand_factor == 0 || max_degree_log + expand_factor >= usize::BITS as usize - 1 {
            return Err(PlaceholderError::DomainTooSmall);
        }

        let mut log_size = max_degree_log + expand_factor;
        let mut domains = vec![EvaluationDomain::new(1 << log_size)?];
        for s in step_list.iter() {
            log_size -= s;
            domains.push(EvaluationDomain::new(1 << log_size)?);
        }
        Ok(Self {
            lambda,
            step_list,
            expand_factor,
            grinding_bits,
            max_degree_log,
            domains,
        })
    }

    /// Fold one step at a time down to one or two final coefficients.
    pub fn default_step_list(max_degree_log: usize) -> Vec<usize> {
        vec![1; 1.max(max_degree_log.saturating_sub(1))]
    }

    /// The number of rounds, which is also the number of FRI roots.
    pub fn rounds(&self) -> usize {
        self.step_list.len()
    }

    /// The subgroup behind the domain of round `i`; `i == rounds()` is the
    /// domain of the final polynomial.
    pub fn domain(&self, i: usize) -> &EvaluationDomain<F> {
        &self.domains[i]
    }

    /// The generators of all the domains.
    pub fn domain_generators(&self) -> Vec<F> {
        self.domains.iter().map(|d| d.generator()).collect()
    }

    /// The coset offset of round `i`.
    pub fn offset(&self, i: usize) -> F {
        let folds: usize = self.step_list.iter().take(i).sum();
        let mut offset = F::multiplicative_generator();
        for _ in 0..folds {
            offset = offset.square();
        }
        offset
    }

    /// The size of the commitment domain `D_0`.
    pub fn initial_domain_size(&self) -> usize {
        self.domains[0].size()
    }

    /// The number of leaves of the Merkle tree of round `i`.
    pub fn leaves(&self, i: usize) -> usize {
        self.domains[i].size() >> self.step_list[i]
    }

    /// The number of values in one leaf of round `i`.
    pub fn leaf_width(&self, i: usize) -> usize {
        1 << self.step_list[i]
    }

    /// The maximal number of coefficients of the final polynomial.
    pub fn final_poly_bound(&self) -> usize {
        let folds: usize = self.step_list.iter().sum();
        1 << (self.max_degree_log - folds)
    }

    /// Return the `index`-th point of the coset of round `i`.
    pub fn element(&self, i: usize, index: usize) -> F {
        self.offset(i).mul(&self.domains[i].element(index))
    }

    /// Whether `point` lies in the commitment coset.
    pub fn is_in_commitment_domain(&self, point: &F) -> bool {
        let n = [self.initial_domain_size() as u64];
        point.pow(&n) == self.offset(0).pow(&n)
    }
}

/// The values of one leaf of a folding round and their path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundProof<F> {
    /// The `2^s` values in the leaf.
    pub values: Vec<F>,
    /// The path to the round root.
    pub path: MerklePath,
}

/// A FRI proof of proximity, without the openings of the committed batches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriProof<F> {
    /// One root per round; the first one commits to the combined polynomial.
    pub fri_roots: Vec<HashOutput>,
    /// The coefficients of the final polynomial.
    pub final_polynomial: Vec<F>,
    /// The proof-of-work nonce.
    pub proof_of_work: u64,
    /// For every query, one proof per round.
    pub round_proofs: Vec<Vec<RoundProof<F>>>,
}

/// Gather the leaf at `index` from the columns of a layer: for every column,
/// the values at `index + k · leaves` for `k < width`.
pub(crate) fn leaf_values<F: Copy>(
    columns: &[Vec<F>],
    index: usize,
    leaves: usize,
    width: usize,
) -> Vec<F> {
    let mut values = Vec::with_capacity(columns.len() * width);
    for column in columns.iter() {
        for k in 0..width {
            values.push(column[index + k * leaves]);
        }
    }
    values
}

/// Build the tree of a layer laid out with `width` values per column in each leaf.
pub(crate) fn layer_tree<F: Scalar, H: Hash>(
    columns: &[Vec<F>],
    leaves: usize,
    width: usize,
) -> Result<MerkleTree<H>> {
    let hashes: Vec<HashOutput> = ark_std::cfg_into_iter!(0..leaves)
        .map(|j| hash_field_leaf::<H, F>(&leaf_values(columns, j, leaves, width)))
        .collect();
    MerkleTree::new(hashes)
}

#[inline]
fn fold_pair<F: Scalar>(f_x: &F, f_minus_x: &F, x_inv: &F, alpha: &F, two_inv: &F) -> F {
    let even = f_x.add(f_minus_x);
    let odd = f_x.sub(f_minus_x).mul(x_inv);
    even.add(&odd.mul(alpha)).mul(two_inv)
}

/// Fold the evaluations on `offset · <ω>` into evaluations on `offset² · <ω²>`.
fn fold_layer<F: Domain>(
    evals: &[F],
    offset: &F,
    generator_inv: &F,
    alpha: &F,
) -> Result<Vec<F>> {
    let half = evals.len() / 2;
    let two_inv = F::from(2u32).inv()?;
    let mut x_inv = Vec::with_capacity(half);
    let mut cur = offset.inv()?;
    for _ in 0..half {
        x_inv.push(cur);
        cur.mul_assign(generator_inv);
    }
    Ok(ark_std::cfg_into_iter!(0..half)
        .map(|a| fold_pair(&evals[a], &evals[a + half], &x_inv[a], alpha, &two_inv))
        .collect())
}

/// Fold the values of the `index`-th leaf of a layer on `offset · domain`.
fn fold_leaf<F: Domain>(
    values: &[F],
    index: usize,
    domain: &EvaluationDomain<F>,
    offset: &F,
    alphas: &[F],
) -> Result<F> {
    let two_inv = F::from(2u32).inv()?;
    let mut vals = values.to_vec();
    let mut size = domain.size();
    let mut offset = *offset;
    let mut generator = domain.generator();
    for alpha in alphas.iter() {
        let half = vals.len() / 2;
        let stride = size / vals.len();
        let mut next = Vec::with_capacity(half);
        for k in 0..half {
            let x = offset.mul(&generator.pow(&[(index + k * stride) as u64]));
            next.push(fold_pair(&vals[k], &vals[k + half], &x.inv()?, alpha, &two_inv));
        }
        vals = next;
        size /= 2;
        offset = offset.square();
        generator = generator.square();
    }
    vals.first().copied().ok_or(PlaceholderError::ProofStructureError)
}

fn absorb_final_polynomial<F: Scalar>(transcript: &mut Transcript, coefs: &[F]) {
    transcript.absorb_u64(b"final polynomial length", coefs.len() as u64);
    for c in coefs.iter() {
        transcript.absorb_field(c);
    }
}

fn squeeze_queries(transcript: &mut Transcript, lambda: usize, leaves: usize) -> Vec<usize> {
    (0..lambda)
        .map(|_| transcript.squeeze_index(b"fri query", leaves))
        .collect()
}

/// Prove that `q` has fewer than `2^max_degree_log` coefficients.
///
/// Returns the proof and the leaf indices of the queries in the commitment
/// domain, which the openings of the committed batches must use.
pub fn prove<F: Domain, H: Hash>(
    q: &FpPolynomial<F>,
    params: &FriParams<F>,
    transcript: &mut Transcript,
) -> Result<(FriProof<F>, Vec<usize>)> {
    if q.len() > 1 << params.max_degree_log {
        return Err(PlaceholderError::DomainTooSmall);
    }
    let start = ark_std::start_timer!(|| "FRI commit phase");

    let rounds = params.rounds();
    let mut layers = Vec::with_capacity(rounds);
    let mut trees = Vec::with_capacity(rounds);
    let mut fri_roots = Vec::with_capacity(rounds);
    let mut evals = q.coset_fft_with_domain(params.domain(0), &params.offset(0))?;

    for i in 0..rounds {
        let columns = vec![evals];
        let tree = layer_tree::<F, H>(&columns, params.leaves(i), params.leaf_width(i))?;
        transcript.absorb_commitment(&tree.root());
        fri_roots.push(tree.root());

        let mut cur = columns[0].clone();
        let mut offset = params.offset(i);
        let mut generator_inv = params.domain(i).generator_inv();
        for _ in 0..params.step_list[i] {
            let alpha: F = transcript.squeeze_field(b"fri alpha");
            cur = fold_layer(&cur, &offset, &generator_inv, &alpha)?;
            offset = offset.square();
            generator_inv = generator_inv.square();
        }
        layers.push(columns);
        trees.push(tree);
        evals = cur;
    }

    let final_coefs = params
        .domain(rounds)
        .coset_ifft(&evals, &params.offset(rounds))?;
    let bound = params.final_poly_bound();
    if final_coefs.iter().skip(bound).any(|c| !c.is_zero()) {
        return Err(PlaceholderError::FinalPolyDegreeExceeded);
    }
    let final_polynomial = FpPolynomial::from_coefs(final_coefs).coefs;
    absorb_final_polynomial(transcript, &final_polynomial);
    ark_std::end_timer!(start);

    let proof_of_work = proof_of_work::generate(transcript, params.grinding_bits)?;

    let query_time = ark_std::start_timer!(|| "FRI query phase");
    let indices = squeeze_queries(transcript, params.lambda, params.leaves(0));
    let round_proofs = indices
        .iter()
        .map(|j0| {
            let mut pos = *j0;
            (0..rounds)
                .map(|i| {
                    let leaf = pos % params.leaves(i);
                    pos = leaf;
                    Ok(RoundProof {
                        values: leaf_values(
                            &layers[i],
                            leaf,
                            params.leaves(i),
                            params.leaf_width(i),
                        ),
                        path: trees[i].path(leaf)?,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    ark_std::end_timer!(query_time);

    Ok((
        FriProof {
            fri_roots,
            final_polynomial,
            proof_of_work,
            round_proofs,
        },
        indices,
    ))
}

/// Check the folding rounds of a proof and return the query leaf indices,
/// whose first-round values the caller still has to bind to the committed batches.
pub fn verify<F: Domain, H: Hash>(
    proof: &FriProof<F>,
    params: &FriParams<F>,
    transcript: &mut Transcript,
) -> Result<Vec<usize>> {
    let rounds = params.rounds();
    if proof.fri_roots.len() != rounds {
        return Err(PlaceholderError::ProofStructureError);
    }
    let mut alphas = Vec::with_capacity(rounds);
    for (root, step) in proof.fri_roots.iter().zip(params.step_list.iter()) {
        transcript.absorb_commitment(root);
        let round_alphas: Vec<F> = (0..*step)
            .map(|_| transcript.squeeze_field(b"fri alpha"))
            .collect();
        alphas.push(round_alphas);
    }

    if proof.final_polynomial.len() > params.final_poly_bound() {
        return Err(PlaceholderError::FinalPolyDegreeExceeded);
    }
    if proof.final_polynomial.is_empty() {
        return Err(PlaceholderError::ProofStructureError);
    }
    absorb_final_polynomial(transcript, &proof.final_polynomial);
    proof_of_work::verify(transcript, proof.proof_of_work, params.grinding_bits)?;

    let indices = squeeze_queries(transcript, params.lambda, params.leaves(0));
    if proof.round_proofs.len() != indices.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    let final_polynomial = FpPolynomial::from_coefs(proof.final_polynomial.clone());

    for (j0, query) in indices.iter().zip(proof.round_proofs.iter()) {
        if query.len() != rounds {
            return Err(PlaceholderError::ProofStructureError);
        }
        let mut pos = *j0;
        let mut folded: Option<F> = None;
        for (i, round) in query.iter().enumerate() {
            let leaves = params.leaves(i);
            let leaf = pos % leaves;
            if round.values.len() != params.leaf_width(i) {
                return Err(PlaceholderError::ProofStructureError);
            }
            let hash = hash_field_leaf::<H, F>(&round.values);
            round
                .path
                .verify::<H>(&proof.fri_roots[i], leaf, leaves, &hash)?;
            if let Some(v) = folded {
                if round.values[pos / leaves] != v {
                    return Err(PlaceholderError::FoldingInconsistency);
                }
            }
            folded = Some(fold_leaf(
                &round.values,
                leaf,
                params.domain(i),
                &params.offset(i),
                &alphas[i],
            )?);
            pos = leaf;
        }
        let x = params.element(rounds, pos);
        if folded != Some(final_polynomial.eval(&x)) {
            return Err(PlaceholderError::FoldingInconsistency);
        }
    }
    Ok(indices)
}
