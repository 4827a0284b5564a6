use crate::commitment::{
    fri::{self, layer_tree, leaf_values, FriParams, FriProof},
    hash::{Hash, HashOutput},
    merkle::{hash_field_leaf, MerklePath, MerkleTree},
    transcript::PlaceholderTranscript,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::FpPolynomial;
use ark_std::{collections::BTreeMap, sync::Arc, vec::Vec};
use merlin::Transcript;
use placeholder_algebra::prelude::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The opening points of every polynomial of every batch, keyed by batch id.
pub type PointsMap<F> = BTreeMap<usize, Vec<Vec<F>>>;

/// The claimed `(point, value)` pairs of every polynomial of every batch,
/// keyed by batch id.
pub type EvaluationMap<F> = BTreeMap<usize, Vec<Vec<(F, F)>>>;

/// A batch of polynomials committed under one Merkle root.
pub struct CommittedBatch<F, H> {
    polys: Vec<FpPolynomial<F>>,
    lde: Vec<Vec<F>>,
    tree: MerkleTree<H>,
}

impl<F: Domain, H: Hash> CommittedBatch<F, H> {
    /// Evaluate the polynomials on the commitment coset and build the tree
    /// whose leaves follow the layout of the first FRI round.
    pub fn commit(polys: Vec<FpPolynomial<F>>, params: &FriParams<F>) -> Result<Self> {
        if polys.is_empty() {
            return Err(PlaceholderError::Message(
                "cannot commit to an empty batch".into(),
            ));
        }
        if polys.iter().any(|p| p.len() > 1 << params.max_degree_log) {
            return Err(PlaceholderError::DomainTooSmall);
        }
        let domain = params.domain(0);
        let offset = params.offset(0);
        let lde = ark_std::cfg_iter!(polys)
            .map(|p| p.coset_fft_with_domain(domain, &offset))
            .collect::<Result<Vec<_>>>()?;
        let tree = layer_tree::<F, H>(&lde, params.leaves(0), params.leaf_width(0))?;
        Ok(Self { polys, lde, tree })
    }

    /// Return the Merkle root.
    pub fn root(&self) -> HashOutput {
        self.tree.root()
    }

    /// Return the committed polynomials.
    pub fn polys(&self) -> &[FpPolynomial<F>] {
        &self.polys
    }

    /// Open the leaf at `index`.
    pub fn initial_proof(&self, index: usize, params: &FriParams<F>) -> Result<InitialProof<F>> {
        let leaves = params.leaves(0);
        let width = params.leaf_width(0);
        if index >= leaves {
            return Err(PlaceholderError::QueryIndexOutOfRange);
        }
        let values = self
            .lde
            .iter()
            .map(|column| (0..width).map(|k| column[index + k * leaves]).collect())
            .collect();
        Ok(InitialProof {
            values,
            path: self.tree.path(index)?,
        })
    }
}

/// The values of one committed batch at one query, with their path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialProof<F> {
    /// `values[poly][k]`, for the `2^s_0` points of the leaf.
    pub values: Vec<Vec<F>>,
    /// The path to the batch root.
    pub path: MerklePath,
}

/// The openings of every batch at one query.
pub type QueryInitialProofs<F> = BTreeMap<usize, InitialProof<F>>;

/// An evaluation proof of the list polynomial commitment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpcProof<F> {
    /// The claimed evaluations.
    pub z: EvaluationMap<F>,
    /// The FRI proof for the combined polynomial.
    pub fri_proof: FriProof<F>,
    /// The openings of the committed batches, one map per query.
    pub initial_proofs: Vec<QueryInitialProofs<F>>,
}

/// The state of a batch: appended polynomials may change until the batch is
/// committed, after which only openings are possible.
pub enum BatchState<F, H> {
    /// Polynomials appended so far.
    Uncommitted(Vec<FpPolynomial<F>>),
    /// The committed batch.
    Committed(Arc<CommittedBatch<F, H>>),
}

/// The list polynomial commitment scheme of one proof.
///
/// The scheme moves through committing batches and registering opening points,
/// and [`LpcScheme::proof_eval`] consumes it.
pub struct LpcScheme<F: Domain, H> {
    params: FriParams<F>,
    batches: BTreeMap<usize, BatchState<F, H>>,
    points: PointsMap<F>,
}

impl<F: Domain, H: Hash> LpcScheme<F, H> {
    /// Create a scheme with no batch.
    pub fn new(params: FriParams<F>) -> Self {
        Self {
            params,
            batches: BTreeMap::new(),
            points: BTreeMap::new(),
        }
    }

    /// Return the FRI parameters.
    pub fn params(&self) -> &FriParams<F> {
        &self.params
    }

    /// Append polynomials to a batch that is not committed yet.
    pub fn append_to_batch(&mut self, batch: usize, polys: Vec<FpPolynomial<F>>) -> Result<()> {
        match self
            .batches
            .entry(batch)
            .or_insert_with(|| BatchState::Uncommitted(Vec::new()))
        {
            BatchState::Uncommitted(v) => {
                v.extend(polys);
                Ok(())
            }
            BatchState::Committed(_) => Err(PlaceholderError::BatchAlreadyCommitted(batch)),
        }
    }

    /// Attach a batch committed ahead of time, such as the preprocessed one.
    pub fn set_committed(&mut self, batch: usize, committed: Arc<CommittedBatch<F, H>>) -> Result<()> {
        if self.batches.contains_key(&batch) {
            return Err(PlaceholderError::BatchAlreadyCommitted(batch));
        }
        self.batches.insert(batch, BatchState::Committed(committed));
        Ok(())
    }

    /// Commit a batch and return its root.
    pub fn commit(&mut self, batch: usize) -> Result<HashOutput> {
        let polys = match self.batches.remove(&batch) {
            Some(BatchState::Uncommitted(v)) => v,
            Some(committed) => {
                self.batches.insert(batch, committed);
                return Err(PlaceholderError::BatchAlreadyCommitted(batch));
            }
            None => return Err(PlaceholderError::UnknownBatch(batch)),
        };
        let committed = Arc::new(CommittedBatch::commit(polys, &self.params)?);
        let root = committed.root();
        self.batches.insert(batch, BatchState::Committed(committed));
        Ok(root)
    }

    /// Return the roots of the committed batches.
    pub fn commitments(&self) -> BTreeMap<usize, HashOutput> {
        self.batches
            .iter()
            .filter_map(|(id, state)| match state {
                BatchState::Committed(c) => Some((*id, c.root())),
                BatchState::Uncommitted(_) => None,
            })
            .collect()
    }

    fn committed(&self, batch: usize) -> Result<&CommittedBatch<F, H>> {
        match self.batches.get(&batch) {
            Some(BatchState::Committed(c)) => Ok(c.as_ref()),
            _ => Err(PlaceholderError::BatchLabelNotCommitted(batch)),
        }
    }

    /// Register an opening point for one polynomial of a committed batch.
    ///
    /// A point of the commitment coset is refused with
    /// [`PlaceholderError::InvalidOpeningPoint`] and the registered points are
    /// left as they were, so the caller may go on with another point.
    pub fn append_eval_point(&mut self, batch: usize, poly: usize, point: F) -> Result<()> {
        let count = self.committed(batch)?.polys.len();
        if poly >= count {
            return Err(PlaceholderError::ProofStructureError);
        }
        if self.params.is_in_commitment_domain(&point) {
            return Err(PlaceholderError::InvalidOpeningPoint);
        }
        let entry = self
            .points
            .entry(batch)
            .or_insert_with(|| vec![Vec::new(); count]);
        if !entry[poly].contains(&point) {
            entry[poly].push(point);
        }
        Ok(())
    }

    /// Register an opening point for every polynomial of a committed batch.
    pub fn append_eval_point_all(&mut self, batch: usize, point: F) -> Result<()> {
        let count = self.committed(batch)?.polys.len();
        for poly in 0..count {
            self.append_eval_point(batch, poly, point)?;
        }
        Ok(())
    }

    /// Replace the registered opening points by `points`, which must list
    /// the points of every polynomial of committed batches. Points are kept
    /// as given, duplicates included, so that both sides agree on the layout.
    pub fn set_eval_points(&mut self, points: PointsMap<F>) -> Result<()> {
        for (batch, polys) in points.iter() {
            if polys.len() != self.committed(*batch)?.polys.len() {
                return Err(PlaceholderError::ProofStructureError);
            }
            if polys
                .iter()
                .flatten()
                .any(|p| self.params.is_in_commitment_domain(p))
            {
                return Err(PlaceholderError::InvalidOpeningPoint);
            }
        }
        self.points = points;
        Ok(())
    }

    /// Return the registered opening points.
    pub fn points(&self) -> &PointsMap<F> {
        &self.points
    }

    /// Evaluate every polynomial at its registered points.
    pub fn evaluate_points(&self) -> Result<EvaluationMap<F>> {
        let mut z = BTreeMap::new();
        for (batch, points) in self.points.iter() {
            let polys = self.committed(*batch)?.polys();
            let evals = polys
                .iter()
                .zip(points.iter())
                .map(|(poly, pts)| pts.iter().map(|x| (*x, poly.eval(x))).collect())
                .collect();
            z.insert(*batch, evals);
        }
        Ok(z)
    }

    /// Build `Σ θ^k (p - z) / (x - ξ)` over every claimed evaluation, with `k`
    /// starting at `starting_power`, and return it with the number of terms.
    pub fn combined_q(
        &self,
        z: &EvaluationMap<F>,
        theta: &F,
        starting_power: usize,
    ) -> Result<(FpPolynomial<F>, usize)> {
        let mut distinct: Vec<F> = Vec::new();
        let mut numerators: Vec<FpPolynomial<F>> = Vec::new();
        let mut theta_acc = theta.pow(&[starting_power as u64]);
        let mut count = 0;

        for (batch, polys_z) in z.iter() {
            let polys = self.committed(*batch)?.polys();
            if polys_z.len() != polys.len() {
                return Err(PlaceholderError::ProofStructureError);
            }
            for (poly, evals) in polys.iter().zip(polys_z.iter()) {
                for (point, value) in evals.iter() {
                    let idx = match distinct.iter().position(|x| x == point) {
                        Some(idx) => idx,
                        None => {
                            distinct.push(*point);
                            numerators.push(FpPolynomial::zero());
                            distinct.len() - 1
                        }
                    };
                    let mut term = poly.mul_scalar(&theta_acc);
                    term.add_coef_assign(&value.mul(&theta_acc).neg(), 0);
                    numerators[idx].add_assign(&term);
                    theta_acc.mul_assign(theta);
                    count += 1;
                }
            }
        }

        let mut q = FpPolynomial::zero();
        for (point, numerator) in distinct.iter().zip(numerators.iter()) {
            let (quo, _) = numerator.divide_by_linear(point);
            q.add_assign(&quo);
        }
        Ok((q, count))
    }

    /// Open every committed batch at the given query leaf indices.
    pub fn initial_proofs(&self, indices: &[usize]) -> Result<Vec<QueryInitialProofs<F>>> {
        indices
            .iter()
            .map(|index| {
                self.batches
                    .iter()
                    .filter_map(|(id, state)| match state {
                        BatchState::Committed(c) => Some((*id, c)),
                        BatchState::Uncommitted(_) => None,
                    })
                    .filter(|(id, _)| self.points.contains_key(id))
                    .map(|(id, c)| Ok((id, c.initial_proof(*index, &self.params)?)))
                    .collect::<Result<QueryInitialProofs<F>>>()
            })
            .collect()
    }

    /// Produce the evaluation proof for every registered point.
    pub fn proof_eval(self, transcript: &mut Transcript) -> Result<LpcProof<F>> {
        let start = ark_std::start_timer!(|| "LPC opening");
        let z = self.evaluate_points()?;
        absorb_evaluations(transcript, &z);
        let theta: F = transcript.squeeze_field(b"lpc theta");
        let (q, _) = self.combined_q(&z, &theta, 0)?;

        let (fri_proof, indices) = fri::prove::<F, H>(&q, &self.params, transcript)?;
        let initial_proofs = self.initial_proofs(&indices)?;
        ark_std::end_timer!(start);
        Ok(LpcProof {
            z,
            fri_proof,
            initial_proofs,
        })
    }
}

/// Absorb every claimed evaluation in order.
pub fn absorb_evaluations<F: Scalar>(transcript: &mut Transcript, z: &EvaluationMap<F>) {
    for (batch, polys) in z.iter() {
        transcript.absorb_u64(b"lpc batch", *batch as u64);
        for evals in polys.iter() {
            for (point, value) in evals.iter() {
                transcript.absorb_field(point);
                transcript.absorb_field(value);
            }
        }
    }
}

/// Check that the claimed evaluations sit exactly at the expected points.
pub fn check_evaluation_shape<F: Scalar>(z: &EvaluationMap<F>, points: &PointsMap<F>) -> Result<()> {
    if z.len() != points.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    for ((zb, zs), (pb, ps)) in z.iter().zip(points.iter()) {
        if zb != pb || zs.len() != ps.len() {
            return Err(PlaceholderError::ProofStructureError);
        }
        for (evals, pts) in zs.iter().zip(ps.iter()) {
            if evals.len() != pts.len() || evals.iter().zip(pts.iter()).any(|((x, _), p)| x != p) {
                return Err(PlaceholderError::ProofStructureError);
            }
        }
    }
    Ok(())
}

/// Check the openings of the committed batches and compute the combined
/// polynomial on every point of every queried leaf.
///
/// Returns `values[query][k]` together with the number of terms.
pub fn combined_q_at_queries<F: Domain, H: Hash>(
    params: &FriParams<F>,
    commitments: &BTreeMap<usize, HashOutput>,
    z: &EvaluationMap<F>,
    initial_proofs: &[QueryInitialProofs<F>],
    indices: &[usize],
    theta: &F,
    starting_power: usize,
) -> Result<(Vec<Vec<F>>, usize)> {
    if initial_proofs.len() != indices.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    let leaves = params.leaves(0);
    let width = params.leaf_width(0);

    let mut distinct: Vec<F> = Vec::new();
    // (batch, poly, distinct point, claimed value, power of theta)
    let mut terms: Vec<(usize, usize, usize, F, F)> = Vec::new();
    let mut theta_acc = theta.pow(&[starting_power as u64]);
    for (batch, polys_z) in z.iter() {
        for (poly, evals) in polys_z.iter().enumerate() {
            for (point, value) in evals.iter() {
                let idx = match distinct.iter().position(|x| x == point) {
                    Some(idx) => idx,
                    None => {
                        distinct.push(*point);
                        distinct.len() - 1
                    }
                };
                terms.push((*batch, poly, idx, *value, theta_acc));
                theta_acc.mul_assign(theta);
            }
        }
    }

    let mut values = Vec::with_capacity(indices.len());
    for (index, proofs) in indices.iter().zip(initial_proofs.iter()) {
        if proofs.len() != z.len() || proofs.keys().zip(z.keys()).any(|(a, b)| a != b) {
            return Err(PlaceholderError::ProofStructureError);
        }
        for (batch, proof) in proofs.iter() {
            let root = commitments
                .get(batch)
                .ok_or(PlaceholderError::BatchLabelNotCommitted(*batch))?;
            if proof.values.len() != z[batch].len()
                || proof.values.iter().any(|v| v.len() != width)
            {
                return Err(PlaceholderError::ProofStructureError);
            }
            let hash = hash_field_leaf::<H, F>(&leaf_values(&proof.values, 0, 1, width));
            proof.path.verify::<H>(root, *index, leaves, &hash)?;
        }

        let mut row = Vec::with_capacity(width);
        for k in 0..width {
            let x = params.element(0, index + k * leaves);
            let mut numerators = vec![F::zero(); distinct.len()];
            for (batch, poly, idx, value, power) in terms.iter() {
                let opened = proofs[batch].values[*poly][k];
                numerators[*idx].add_assign(&opened.sub(value).mul(power));
            }
            let mut denominators: Vec<F> = distinct.iter().map(|p| x.sub(p)).collect();
            placeholder_algebra::traits::batch_inversion(&mut denominators)?;
            let sum = numerators
                .iter()
                .zip(denominators.iter())
                .fold(F::zero(), |acc, (n, d)| acc.add(&n.mul(d)));
            row.push(sum);
        }
        values.push(row);
    }
    Ok((values, terms.len()))
}

/// Verify an evaluation proof against the committed roots and the expected points.
pub fn verify_eval<F: Domain, H: Hash>(
    params: &FriParams<F>,
    commitments: &BTreeMap<usize, HashOutput>,
    points: &PointsMap<F>,
    proof: &LpcProof<F>,
    transcript: &mut Transcript,
) -> Result<()> {
    let start = ark_std::start_timer!(|| "LPC verification");
    check_evaluation_shape(&proof.z, points)?;
    for p in points.values().flatten().flatten() {
        if params.is_in_commitment_domain(p) {
            return Err(PlaceholderError::InvalidOpeningPoint);
        }
    }
    absorb_evaluations(transcript, &proof.z);
    let theta: F = transcript.squeeze_field(b"lpc theta");

    let indices = fri::verify::<F, H>(&proof.fri_proof, params, transcript)?;
    let (expected, _) = combined_q_at_queries::<F, H>(
        params,
        commitments,
        &proof.z,
        &proof.initial_proofs,
        &indices,
        &theta,
        0,
    )?;
    check_first_round(&proof.fri_proof, &expected)?;
    ark_std::end_timer!(start);
    Ok(())
}

/// Check that the first FRI round opens to the combined polynomial.
pub fn check_first_round<F: Scalar>(fri_proof: &FriProof<F>, expected: &[Vec<F>]) -> Result<()> {
    if fri_proof.round_proofs.len() != expected.len() {
        return Err(PlaceholderError::ProofStructureError);
    }
    for (rounds, values) in fri_proof.round_proofs.iter().zip(expected.iter()) {
        let first = rounds.first().ok_or(PlaceholderError::ProofStructureError)?;
        if first.values != *values {
            return Err(PlaceholderError::FoldingInconsistency);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{verify_eval, LpcScheme};
    use crate::commitment::{fri::FriParams, hash::Sha256Hash};
    use crate::errors::PlaceholderError;
    use crate::math::FpPolynomial;
    use merlin::Transcript;
    use placeholder_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    fn scheme() -> (LpcScheme<F, Sha256Hash>, F) {
        let mut prng = test_rng();
        let params = FriParams::<F>::new(6, vec![1, 1, 1], 2, 0, 4).unwrap();
        let mut lpc = LpcScheme::<F, Sha256Hash>::new(params);
        let a: Vec<_> = (0..3).map(|_| FpPolynomial::random(&mut prng, 15)).collect();
        let b: Vec<_> = (0..2).map(|_| FpPolynomial::random(&mut prng, 9)).collect();
        lpc.append_to_batch(0, a).unwrap();
        lpc.append_to_batch(3, b).unwrap();
        lpc.commit(0).unwrap();
        lpc.commit(3).unwrap();
        (lpc, F::random(&mut prng))
    }

    #[test]
    fn open_and_verify() {
        let (mut lpc, y) = scheme();
        let w = lpc.params().domain(0).generator();
        lpc.append_eval_point_all(0, y).unwrap();
        lpc.append_eval_point(0, 1, y.mul(&w)).unwrap();
        lpc.append_eval_point(3, 0, y).unwrap();
        lpc.append_eval_point(3, 1, y.add(&F::one())).unwrap();

        let params = lpc.params().clone();
        let commitments = lpc.commitments();
        let points = lpc.points().clone();
        let proof = lpc.proof_eval(&mut Transcript::new(b"lpc")).unwrap();
        assert_eq!(proof.initial_proofs.len(), 6);
        verify_eval::<F, Sha256Hash>(
            &params,
            &commitments,
            &points,
            &proof,
            &mut Transcript::new(b"lpc"),
        )
        .unwrap();

        let mut bad = proof.clone();
        bad.z.get_mut(&0).unwrap()[1][1].1.add_assign(&F::one());
        assert!(verify_eval::<F, Sha256Hash>(
            &params,
            &commitments,
            &points,
            &bad,
            &mut Transcript::new(b"lpc"),
        )
        .is_err());

        let mut wrong_points = points.clone();
        wrong_points.get_mut(&3).unwrap()[1][0] = y;
        assert_eq!(
            verify_eval::<F, Sha256Hash>(
                &params,
                &commitments,
                &wrong_points,
                &proof,
                &mut Transcript::new(b"lpc"),
            ),
            Err(PlaceholderError::ProofStructureError)
        );
    }

    #[test]
    fn state_transitions() {
        let (mut lpc, y) = scheme();
        assert_eq!(
            lpc.append_to_batch(0, vec![FpPolynomial::one()]),
            Err(PlaceholderError::BatchAlreadyCommitted(0))
        );
        assert_eq!(lpc.commit(3), Err(PlaceholderError::BatchAlreadyCommitted(3)));
        assert_eq!(lpc.commit(5), Err(PlaceholderError::UnknownBatch(5)));
        assert_eq!(
            lpc.append_eval_point(1, 0, y),
            Err(PlaceholderError::BatchLabelNotCommitted(1))
        );
        let offset = lpc.params().offset(0);
        assert_eq!(
            lpc.append_eval_point(0, 0, offset),
            Err(PlaceholderError::InvalidOpeningPoint)
        );
        assert_eq!(lpc.commitments().len(), 2);
    }

    #[test]
    fn point_on_the_commitment_coset_is_refused() {
        let (mut lpc, y) = scheme();
        lpc.append_eval_point_all(0, y).unwrap();
        lpc.append_eval_point_all(3, y).unwrap();
        let before = lpc.points().clone();

        let inside = lpc.params().element(0, 5);
        assert!(lpc.params().is_in_commitment_domain(&inside));
        assert_eq!(
            lpc.append_eval_point(0, 1, inside),
            Err(PlaceholderError::InvalidOpeningPoint)
        );
        assert_eq!(lpc.points(), &before);

        let mut with_inside = before.clone();
        with_inside.get_mut(&0).unwrap()[2].push(inside);
        assert_eq!(
            lpc.set_eval_points(with_inside),
            Err(PlaceholderError::InvalidOpeningPoint)
        );
        assert_eq!(lpc.points(), &before);

        // the caller goes on with a point off the coset and still gets a proof
        let outside = y.add(&F::one());
        lpc.append_eval_point(0, 1, outside).unwrap();
        let params = lpc.params().clone();
        let commitments = lpc.commitments();
        let points = lpc.points().clone();
        let proof = lpc.proof_eval(&mut Transcript::new(b"lpc")).unwrap();
        verify_eval::<F, Sha256Hash>(
            &params,
            &commitments,
            &points,
            &proof,
            &mut Transcript::new(b"lpc"),
        )
        .unwrap();
    }

    #[test]
    fn theta_power_counts_terms() {
        let (mut lpc, y) = scheme();
        lpc.append_eval_point_all(0, y).unwrap();
        lpc.append_eval_point(0, 2, y.add(&y)).unwrap();
        let z = lpc.evaluate_points().unwrap();
        let theta = F::from(3u32);
        let (_, count) = lpc.combined_q(&z, &theta, 5).unwrap();
        assert_eq!(count, 4);
    }
}
