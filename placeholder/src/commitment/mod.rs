//! The FRI-based list polynomial commitment and its building blocks.

/// Module for FRI.
pub mod fri;

/// Module for hashes.
pub mod hash;

/// Module for the list polynomial commitment.
pub mod lpc;

/// Module for Merkle trees.
pub mod merkle;

/// Module for proof-of-work grinding.
pub mod proof_of_work;

/// Module for the transcript.
pub mod transcript;

pub use fri::{FriParams, FriProof, RoundProof};
pub use hash::{Hash, HashOutput, Keccak256Hash, Sha256Hash};
pub use lpc::{
    CommittedBatch, EvaluationMap, InitialProof, LpcProof, LpcScheme, PointsMap,
    QueryInitialProofs,
};
pub use merkle::{MerklePath, MerkleTree};
pub use transcript::PlaceholderTranscript;
