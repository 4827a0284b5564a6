/// The number of bytes for a scalar value over BN254.
pub const BN254_SCALAR_LEN: usize = 32;

scalar_field!(
    /// The scalar field of BN254, of 2-adicity 28.
    BN254Scalar,
    ark_bn254::Fr,
    BN254_SCALAR_LEN
);

#[cfg(test)]
mod bn254_scalar_test {
    use crate::{
        bn254::BN254Scalar,
        prelude::*,
        traits::scalar_tests::{
            test_batch_inversion, test_scalar_operations, test_scalar_serialization,
        },
    };
    use ark_std::str::FromStr;

    #[test]
    fn test_scalar_ops() {
        test_scalar_operations::<BN254Scalar>();
    }

    #[test]
    fn scalar_deser() {
        test_scalar_serialization::<BN254Scalar>();
    }

    #[test]
    fn scalar_batch_inversion() {
        test_batch_inversion::<BN254Scalar>();
    }

    #[test]
    fn scalar_from_to_bytes() {
        let small_value = BN254Scalar::from(165747u32);
        let small_value_bytes = small_value.to_bytes();
        let expected_small_value_bytes: [u8; 32] = [
            115, 135, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(small_value_bytes, expected_small_value_bytes);

        let small_value_from_bytes = BN254Scalar::from_bytes(&small_value_bytes).unwrap();
        assert_eq!(small_value_from_bytes, small_value);
        assert!(BN254Scalar::from_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn scalar_from_str() {
        let a = BN254Scalar::from_str("1234567890").unwrap();
        assert_eq!(a, BN254Scalar::from(1234567890u64));
        assert_eq!(format!("{:?}", a), "1234567890");
        assert!(BN254Scalar::from_str("twelve").is_err());
    }

    #[test]
    fn scalar_serde() {
        let mut prng = test_rng();
        let a = BN254Scalar::random(&mut prng);
        let json = serde_json::to_string(&a).unwrap();
        let b: BN254Scalar = serde_json::from_str(&json).unwrap();
        assert_eq!(a, b);

        let bytes = bincode::serialize(&a).unwrap();
        let c: BN254Scalar = bincode::deserialize(&bytes).unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn two_adicity() {
        use crate::traits::Domain;
        assert_eq!(BN254Scalar::two_adicity(), 28);
    }
}
