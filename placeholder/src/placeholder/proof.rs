use crate::commitment::{hash::HashOutput, lpc::LpcProof};
use ark_std::collections::BTreeMap;

/// A Placeholder proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderProof<F> {
    /// The roots of the batches committed while proving, keyed by batch id.
    /// The fixed batch is part of the preprocessed data and is not repeated.
    pub commitments: BTreeMap<usize, HashOutput>,
    /// The evaluation proof of every committed polynomial.
    pub eval_proof: LpcProof<F>,
}
