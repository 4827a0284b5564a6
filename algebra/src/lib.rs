//! Prime field abstractions shared by the Placeholder prover and verifier.
//!
//! The crate wraps the arkworks scalar fields of BN254 and BLS12-381 behind
//! the [`traits::Scalar`] and [`traits::Domain`] traits so that the proof
//! system can stay generic over the field.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![allow(clippy::upper_case_acronyms)]

#[macro_use]
mod field;

/// Module for the BLS12-381 scalar field.
pub mod bls12_381;

/// Module for the BN254 scalar field.
pub mod bn254;

/// Module for error handling.
pub mod errors;

/// Module for the prelude.
pub mod prelude;

/// Module for test rngs.
pub mod rand_helper;

/// Module for serialization of scalars.
pub mod serialization;

/// Module for traits.
pub mod traits;

/// Module for utils.
pub mod utils;

#[doc(hidden)]
pub use serde;

/// Re-export the standard library in a `no_std`-compatible way.
pub use ark_std::{fmt, iter, marker, ops, rand, string, vec, One, UniformRand, Zero};

/// Re-export the arkworks FFT field trait for downstream domains.
pub use ark_ff::FftField;
