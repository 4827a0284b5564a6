use crate::prelude::*;
use ark_std::fmt;
use serde::de::{Error, Visitor};

/// Visitor that accepts either raw bytes or a base64 string.
pub struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a valid scalar encoding")
    }

    fn visit_bytes<E: Error>(self, v: &[u8]) -> core::result::Result<Vec<u8>, E> {
        Ok(v.to_vec())
    }

    fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> core::result::Result<Vec<u8>, E> {
        Ok(v)
    }

    fn visit_str<E: Error>(self, v: &str) -> core::result::Result<Vec<u8>, E> {
        b64dec(v).map_err(Error::custom)
    }

    fn visit_seq<A>(self, mut seq: A) -> core::result::Result<Vec<u8>, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut v = vec![];
        while let Some(b) = seq.next_element::<u8>()? {
            v.push(b);
        }
        Ok(v)
    }
}

/// Implement serde for a scalar wrapper through its canonical byte encoding.
#[macro_export]
macro_rules! serialize_deserialize {
    ($t:ident) => {
        impl $crate::serde::Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where
                S: $crate::serde::Serializer,
            {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&$crate::utils::b64enc(
                        &$crate::traits::Scalar::to_bytes(self),
                    ))
                } else {
                    serializer.serialize_bytes(&$crate::traits::Scalar::to_bytes(self))
                }
            }
        }

        impl<'de> $crate::serde::Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where
                D: $crate::serde::Deserializer<'de>,
            {
                let bytes = if deserializer.is_human_readable() {
                    deserializer.deserialize_str($crate::serialization::BytesVisitor)?
                } else {
                    deserializer.deserialize_bytes($crate::serialization::BytesVisitor)?
                };
                <$t as $crate::traits::Scalar>::from_canonical_bytes(bytes.as_slice())
                    .map_err($crate::serde::de::Error::custom)
            }
        }
    };
}
