/// The number of bytes for a scalar value over BLS12-381.
pub const BLS12_381_SCALAR_LEN: usize = 32;

scalar_field!(
    /// The scalar field of BLS12-381, of 2-adicity 32.
    BLSScalar,
    ark_bls12_381::Fr,
    BLS12_381_SCALAR_LEN
);
