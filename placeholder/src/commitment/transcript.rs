use crate::commitment::hash::HashOutput;
use merlin::Transcript;
use placeholder_algebra::prelude::*;
use rand_chacha::ChaChaRng;

/// The trait for the Fiat-Shamir transcript shared by the commitment scheme
/// and the Placeholder prover and verifier.
pub trait PlaceholderTranscript {
    /// Append raw bytes.
    fn absorb_bytes(&mut self, label: &'static [u8], bytes: &[u8]);

    /// Append a Merkle root.
    fn absorb_commitment(&mut self, root: &HashOutput);

    /// Append a field element.
    fn absorb_field<F: Scalar>(&mut self, elem: &F);

    /// Append a u64.
    fn absorb_u64(&mut self, label: &'static [u8], x: u64);

    /// Get a field challenge.
    fn squeeze_field<F: Scalar>(&mut self, label: &'static [u8]) -> F;

    /// Get a u64 challenge.
    fn squeeze_u64(&mut self, label: &'static [u8]) -> u64;

    /// Get an index challenge in `0..bound`.
    fn squeeze_index(&mut self, label: &'static [u8], bound: usize) -> usize {
        (self.squeeze_u64(label) % bound.max(1) as u64) as usize
    }
}

impl PlaceholderTranscript for Transcript {
    fn absorb_bytes(&mut self, label: &'static [u8], bytes: &[u8]) {
        self.append_message(label, bytes);
    }

    fn absorb_commitment(&mut self, root: &HashOutput) {
        self.append_message(b"append commitment", &root[..]);
    }

    fn absorb_field<F: Scalar>(&mut self, elem: &F) {
        self.append_message(b"append field point", &elem.to_bytes());
    }

    fn absorb_u64(&mut self, label: &'static [u8], x: u64) {
        self.append_u64(label, x);
    }

    fn squeeze_field<F: Scalar>(&mut self, label: &'static [u8]) -> F {
        let mut buff = [0u8; 32];
        self.challenge_bytes(label, &mut buff[..]);
        F::random(&mut ChaChaRng::from_seed(buff))
    }

    fn squeeze_u64(&mut self, label: &'static [u8]) -> u64 {
        let mut buff = [0u8; 8];
        self.challenge_bytes(label, &mut buff[..]);
        u64::from_be_bytes(buff)
    }
}
