use crate::arithmetization::{ConstraintSystem, TableDescription};
use crate::commitment::{
    fri::FriParams,
    hash::{Hash, HashOutput},
};
use crate::errors::{PlaceholderError, Result};
use crate::placeholder::encoding::encode_commitment_params;
use placeholder_algebra::{bls12_381::BLSScalar, bn254::BN254Scalar, prelude::*};

/// The quotient may be split into this many chunks unless configured otherwise.
pub const DEFAULT_MAX_QUOTIENT_CHUNKS: usize = 16;

/// A field the proof system runs over, with the identifier written into
/// proof headers.
pub trait PlaceholderField: Domain {
    /// Identifier of the field in encodings.
    const FIELD_ID: u8;
}

impl PlaceholderField for BN254Scalar {
    const FIELD_ID: u8 = 1;
}

impl PlaceholderField for BLSScalar {
    const FIELD_ID: u8 = 2;
}

/// The parameters shared by the prover and the verifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderParams<F: Domain> {
    /// The commitment and FRI parameters.
    pub fri: FriParams<F>,
    /// The maximal number of quotient chunks.
    pub max_quotient_chunks: usize,
}

impl<F: Domain> PlaceholderParams<F> {
    /// Create the parameters.
    pub fn new(fri: FriParams<F>, max_quotient_chunks: usize) -> Self {
        Self {
            fri,
            max_quotient_chunks,
        }
    }

    /// Choose the parameters for a table, folding one step at a time.
    pub fn for_table(
        desc: &TableDescription,
        lambda: usize,
        expand_factor: usize,
        grinding_bits: u32,
    ) -> Result<Self> {
        desc.check()?;
        let log_max = log2_ceil(desc.rows_amount);
        let fri = FriParams::new(
            lambda,
            FriParams::<F>::default_step_list(log_max),
            expand_factor,
            grinding_bits,
            log_max,
        )?;
        Ok(Self::new(fri, DEFAULT_MAX_QUOTIENT_CHUNKS))
    }

    /// Check the parameters against a circuit.
    pub fn check(&self, cs: &ConstraintSystem<F>, desc: &TableDescription) -> Result<()> {
        if desc.rows_amount > 1 << self.fri.max_degree_log {
            return Err(PlaceholderError::DomainTooSmall);
        }
        if cs.quotient_chunks() > self.max_quotient_chunks {
            return Err(PlaceholderError::TooManyQuotientChunks);
        }
        Ok(())
    }

    /// A digest of the commitment parameters, bound into the transcript.
    pub fn digest<H: Hash>(&self) -> HashOutput {
        let mut bytes = encode_commitment_params(&self.fri);
        bytes.extend_from_slice(&(self.max_quotient_chunks as u64).to_be_bytes());
        H::digest(&bytes)
    }
}
