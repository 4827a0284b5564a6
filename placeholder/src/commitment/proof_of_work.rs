use crate::commitment::transcript::PlaceholderTranscript;
use crate::errors::{PlaceholderError, Result};
use merlin::Transcript;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "parallel")]
const SEARCH_CHUNK: u64 = 1 << 12;

fn nonce_hash(transcript: &mut Transcript, nonce: u64) -> u64 {
    transcript.absorb_u64(b"grinding nonce", nonce);
    transcript.squeeze_u64(b"grinding")
}

fn is_valid(transcript: &Transcript, nonce: u64, bits: u32) -> bool {
    let mut t = transcript.clone();
    nonce_hash(&mut t, nonce).leading_zeros() >= bits
}

/// Search the first nonce whose hash has `bits` leading zero bits, and absorb it.
pub fn generate(transcript: &mut Transcript, bits: u32) -> Result<u64> {
    if bits > 64 {
        return Err(PlaceholderError::GrindingInsufficient);
    }
    let start_time = ark_std::start_timer!(|| format!("Grinding {} bits", bits));

    #[cfg(not(feature = "parallel"))]
    let nonce = (0..=u64::MAX)
        .find(|n| is_valid(transcript, *n, bits))
        .ok_or(PlaceholderError::GrindingInsufficient)?;

    #[cfg(feature = "parallel")]
    let nonce = {
        let snapshot: &Transcript = transcript;
        let mut start = 0u64;
        loop {
            let end = start.saturating_add(SEARCH_CHUNK);
            if let Some(n) = (start..end)
                .into_par_iter()
                .find_first(|n| is_valid(snapshot, *n, bits))
            {
                break n;
            }
            if end == u64::MAX {
                return Err(PlaceholderError::GrindingInsufficient);
            }
            start = end;
        }
    };

    nonce_hash(transcript, nonce);
    ark_std::end_timer!(start_time);
    Ok(nonce)
}

/// Check the nonce against the transcript and absorb it.
pub fn verify(transcript: &mut Transcript, nonce: u64, bits: u32) -> Result<()> {
    if bits > 64 || nonce_hash(transcript, nonce).leading_zeros() < bits {
        return Err(PlaceholderError::GrindingInsufficient);
    }
    Ok(())
}
