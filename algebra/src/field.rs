/// Wrap an arkworks prime field into a [`Scalar`](crate::traits::Scalar)
/// that is also an FFT [`Domain`](crate::traits::Domain).
///
/// Scalars are encoded as `$len` little-endian bytes.
macro_rules! scalar_field {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $len:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) $inner);

        impl ark_std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ark_std::fmt::Formatter<'_>) -> ark_std::fmt::Result {
                use ark_ff::PrimeField;
                write!(f, "{}", self.0.into_bigint())
            }
        }

        impl ark_std::str::FromStr for $name {
            type Err = $crate::errors::AlgebraError;

            fn from_str(string: &str) -> core::result::Result<Self, Self::Err> {
                <$inner as ark_std::str::FromStr>::from_str(string)
                    .map(Self)
                    .map_err(|_| $crate::errors::AlgebraError::DeserializationError)
            }
        }

        impl $crate::One for $name {
            #[inline]
            fn one() -> Self {
                Self(<$inner as $crate::One>::one())
            }
        }

        impl $crate::Zero for $name {
            #[inline]
            fn zero() -> Self {
                Self(<$inner as $crate::Zero>::zero())
            }

            #[inline]
            fn is_zero(&self) -> bool {
                $crate::Zero::is_zero(&self.0)
            }
        }

        scalar_field!(@binary $name, Add, add, AddAssign, add_assign);
        scalar_field!(@binary $name, Sub, sub, SubAssign, sub_assign);
        scalar_field!(@binary $name, Mul, mul, MulAssign, mul_assign);

        impl core::ops::Neg for $name {
            type Output = $name;

            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl core::iter::Sum<$name> for $name {
            #[inline]
            fn sum<I: Iterator<Item = $name>>(iter: I) -> Self {
                iter.fold(<Self as $crate::Zero>::zero(), core::ops::Add::add)
            }
        }

        impl<'a> core::iter::Sum<&'a $name> for $name {
            #[inline]
            fn sum<I: Iterator<Item = &'a $name>>(iter: I) -> Self {
                iter.fold(<Self as $crate::Zero>::zero(), core::ops::Add::add)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(value: u32) -> Self {
                Self(<$inner>::from(value as u64))
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(value: u64) -> Self {
                Self(<$inner>::from(value))
            }
        }

        impl From<u128> for $name {
            #[inline]
            fn from(value: u128) -> Self {
                Self(<$inner>::from(value))
            }
        }

        impl $crate::traits::Scalar for $name {
            #[inline]
            fn random<R: $crate::rand::CryptoRng + $crate::rand::RngCore>(rng: &mut R) -> Self {
                Self(<$inner as $crate::UniformRand>::rand(rng))
            }

            #[inline]
            fn multiplicative_generator() -> Self {
                Self(<$inner as ark_ff::FftField>::GENERATOR)
            }

            #[inline]
            fn modulus_le_bytes() -> ark_std::vec::Vec<u8> {
                use ark_ff::BigInteger;
                <$inner as ark_ff::PrimeField>::MODULUS.to_bytes_le()
            }

            #[inline]
            fn bytes_len() -> usize {
                $len
            }

            #[inline]
            fn to_bytes(&self) -> ark_std::vec::Vec<u8> {
                use ark_ff::{BigInteger, PrimeField};
                self.0.into_bigint().to_bytes_le()
            }

            #[inline]
            fn from_bytes(bytes: &[u8]) -> $crate::prelude::Result<Self> {
                if bytes.len() > $len {
                    return Err($crate::errors::AlgebraError::DeserializationError);
                }
                Ok(Self(<$inner as ark_ff::PrimeField>::from_le_bytes_mod_order(bytes)))
            }

            #[inline]
            fn inv(&self) -> $crate::prelude::Result<Self> {
                ark_ff::Field::inverse(&self.0)
                    .map(Self)
                    .ok_or($crate::errors::AlgebraError::InversionError)
            }

            #[inline]
            fn square(&self) -> Self {
                Self(ark_ff::Field::square(&self.0))
            }

            #[inline]
            fn pow(&self, exponent: &[u64]) -> Self {
                Self(ark_ff::Field::pow(&self.0, exponent))
            }
        }

        impl $crate::traits::Domain for $name {
            type Field = $inner;

            #[inline]
            fn get_field(&self) -> Self::Field {
                self.0
            }

            #[inline]
            fn from_field(field: Self::Field) -> Self {
                Self(field)
            }
        }

        $crate::serialize_deserialize!($name);
    };

    (@binary $name:ident, $op:ident, $method:ident, $op_assign:ident, $method_assign:ident) => {
        impl core::ops::$op for $name {
            type Output = $name;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                Self(core::ops::$op::$method(self.0, rhs.0))
            }
        }

        impl<'a> core::ops::$op<&'a $name> for $name {
            type Output = $name;

            #[inline]
            fn $method(self, rhs: &Self) -> Self::Output {
                Self(core::ops::$op::$method(self.0, &rhs.0))
            }
        }

        impl<'a> core::ops::$op_assign<&'a $name> for $name {
            #[inline]
            fn $method_assign(&mut self, rhs: &Self) {
                core::ops::$op_assign::$method_assign(&mut self.0, &rhs.0);
            }
        }
    };
}
