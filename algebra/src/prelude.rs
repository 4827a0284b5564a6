pub use crate::errors::AlgebraError;
pub use crate::fmt::Formatter;
pub use crate::iter::Sum;
pub use crate::marker::PhantomData;
pub use crate::ops::*;
pub use crate::rand::{CryptoRng, Rng, RngCore, SeedableRng};
pub use crate::rand_helper::{seeded_rng, test_rng};
pub use crate::serialization::*;
pub use crate::traits::{Domain, Scalar};
pub use crate::utils::*;
pub use crate::{serialize_deserialize, One, UniformRand, Zero};
pub use ark_std::{string::String, vec, vec::Vec};

pub(crate) type Result<T> = core::result::Result<T, AlgebraError>;
