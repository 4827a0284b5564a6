use crate::prelude::*;
use ark_std::{string::String, vec::Vec};
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

const BASE64_PADDING_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const BASE64_ENGINE: GeneralPurpose = GeneralPurpose::new(&URL_SAFE, BASE64_PADDING_CONFIG);

/// Return `log2(n)` rounded up.
pub fn log2_ceil(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// Convert the input into the base64 encoding
pub fn b64enc<T: ?Sized + AsRef<[u8]>>(input: &T) -> String {
    BASE64_ENGINE.encode(input)
}

/// Reconstruct from the base64 encoding
pub fn b64dec<T: ?Sized + AsRef<[u8]>>(input: &T) -> Result<Vec<u8>> {
    BASE64_ENGINE
        .decode(input)
        .map_err(|_| AlgebraError::DeserializationError)
}

#[cfg(test)]
mod test {
    use ark_std::vec;

    #[test]
    fn log2_ceil() {
        assert_eq!(super::log2_ceil(0), 0);
        assert_eq!(super::log2_ceil(1), 0);
        assert_eq!(super::log2_ceil(2), 1);
        assert_eq!(super::log2_ceil(3), 2);
        assert_eq!(super::log2_ceil(1024), 10);
        assert_eq!(super::log2_ceil(1025), 11);
    }

    #[test]
    fn b64_round_trip() {
        let bytes = vec![0u8, 1, 2, 250, 251, 255];
        let s = super::b64enc(&bytes);
        assert_eq!(super::b64dec(&s).unwrap(), bytes);
        assert_eq!(super::b64dec(&s.trim_end_matches('=')).unwrap(), bytes);
        assert!(super::b64dec("*not base64*").is_err());
    }
}
