//! The Placeholder proof system: preprocessing, the permutation, lookup and
//! gates arguments, the prover, the verifier and the aggregation of
//! evaluation proofs across instances.

/// Module for the aggregation of several proofs under one FRI proof.
pub mod aggregation;

/// Module for the binary encodings.
pub mod encoding;

/// Module for the gates argument.
pub(crate) mod gates;

/// Module for the lookup argument.
pub(crate) mod lookup;

/// Module for the layout of the openings.
pub(crate) mod openings;

/// Module for the parameters.
pub mod params;

/// Module for the permutation argument.
pub(crate) mod permutation;

/// Module for preprocessing.
pub mod preprocessor;

/// Module for the proof.
pub mod proof;

/// Module for prover.
pub mod prover;

/// Module for transcript.
pub(crate) mod transcript;

/// Module for verifier.
pub mod verifier;

/// The batch of the preprocessed polynomials.
pub const FIXED_VALUES_BATCH: usize = 0;
/// The batch of the witness and public input columns.
pub const VARIABLE_VALUES_BATCH: usize = 1;
/// The batch of the permutation product and the lookup auxiliary polynomials.
pub const PERMUTATION_BATCH: usize = 2;
/// The batch of the quotient chunks.
pub const QUOTIENT_BATCH: usize = 3;
/// The batch of the lookup multiplicities.
pub const LOOKUP_BATCH: usize = 4;

/// The number of constraint polynomials combined into the quotient:
/// three for the permutation, four for the lookup and one for the gates.
pub(crate) const CONSTRAINT_POLYS: usize = 8;

pub use params::{PlaceholderField, PlaceholderParams};
pub use preprocessor::{
    preprocess_private, preprocess_public, CommonData, PrivatePreprocessedData,
    PublicPreprocessedData,
};
pub use proof::PlaceholderProof;
pub use prover::prover;
pub use verifier::verifier;
