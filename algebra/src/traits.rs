use crate::prelude::*;
use ark_ff::FftField;
use ark_std::{fmt::Debug, hash::Hash, vec::Vec};
use serde::{Deserialize, Serialize};

/// The trait for scalars
pub trait Scalar:
    Copy
    + Default
    + Debug
    + PartialEq
    + Eq
    + Hash
    + Serialize
    + for<'de> Deserialize<'de>
    + Clone
    + One
    + Zero
    + Sized
    + Add<Self, Output = Self>
    + Mul<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Sum<Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> Sum<&'a Self>
    + From<u32>
    + From<u64>
    + Neg<Output = Self>
    + Sync
    + Send
{
    /// Return a random scalar
    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self;

    /// Return a generator of the multiplicative group, used as the coset
    /// offset of the commitment domains.
    fn multiplicative_generator() -> Self;

    /// Return the little-endian byte representation of the field size
    fn modulus_le_bytes() -> Vec<u8>;

    /// Return the len of the byte representation
    fn bytes_len() -> usize;

    /// Convert to bytes, little-endian and of length `bytes_len()`.
    fn to_bytes(&self) -> Vec<u8>;

    /// Convert from little-endian bytes, reducing modulo the field size.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Convert from little-endian bytes, rejecting values not below the field size.
    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::bytes_len() {
            return Err(AlgebraError::DeserializationError);
        }
        let value = Self::from_bytes(bytes)?;
        if value.to_bytes() != bytes {
            return Err(AlgebraError::DeserializationError);
        }
        Ok(value)
    }

    /// Return the modular inverse of the scalar if it exists
    fn inv(&self) -> Result<Self>;

    /// Return the square of the field element
    fn square(&self) -> Self;

    /// exponent form: least significant limb first, with u64 limbs
    fn pow(&self, exponent: &[u64]) -> Self;
}

/// A scalar field with large power-of-two subgroups, where FFTs run.
pub trait Domain: Scalar {
    /// The field that is able to be used in FFTs.
    type Field: FftField;

    /// Return fft field.
    fn get_field(&self) -> Self::Field;

    /// Sample a domain based on a fft field.
    fn from_field(field: Self::Field) -> Self;

    /// Return the 2-adicity of the multiplicative group.
    fn two_adicity() -> u32 {
        <Self::Field as FftField>::TWO_ADICITY
    }
}

/// Invert every element of `v` in place with one field inversion.
pub fn batch_inversion<S: Scalar>(v: &mut [S]) -> Result<()> {
    let mut prod = Vec::with_capacity(v.len());
    let mut acc = S::one();
    for f in v.iter() {
        if f.is_zero() {
            return Err(AlgebraError::InversionError);
        }
        acc.mul_assign(f);
        prod.push(acc);
    }
    let mut inv = acc.inv()?;
    for i in (0..v.len()).rev() {
        let prev = if i == 0 { S::one() } else { prod[i - 1] };
        let new = inv.mul(&prev);
        inv.mul_assign(&v[i]);
        v[i] = new;
    }
    Ok(())
}
