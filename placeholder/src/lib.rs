//! Placeholder: a PLONK proof system over a FRI-based list polynomial
//! commitment.
#![forbid(unsafe_code)]
#![allow(clippy::needless_borrow)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate serde_derive;

/// Module for circuits.
pub mod arithmetization;

/// Module for the commitment scheme.
pub mod commitment;

/// Module for error handling.
pub mod errors;

/// Module for polynomials and evaluation domains.
pub mod math;

/// Module for the proof system.
pub mod placeholder;

/// Module for utils.
pub mod utils;
