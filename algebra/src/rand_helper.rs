use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

/// Environment variable fixing the seed of [`test_rng`].
pub const TEST_SEED_VAR: &str = "PLACEHOLDER_TEST_SEED";

#[cfg(not(feature = "std"))]
const DEFAULT_TEST_SEED: u64 = 0x1e_c8_d2;

/// A reproducible rng. Two provers fed the same seed draw the same blinding
/// values and produce the same proof.
pub fn seeded_rng(seed: u64) -> ChaChaRng {
    ChaChaRng::seed_from_u64(seed)
}

/// The seed of [`TEST_SEED_VAR`], if it is set to a decimal `u64`.
#[cfg(feature = "std")]
fn test_seed() -> Option<u64> {
    std::env::var(TEST_SEED_VAR).ok()?.trim().parse().ok()
}

/// Rng for tests and benches only.
///
/// Draws from fresh entropy unless `PLACEHOLDER_TEST_SEED` holds a seed, which
/// makes a failing run repeatable.
#[cfg(feature = "std")]
pub fn test_rng() -> ChaChaRng {
    match test_seed() {
        Some(seed) => seeded_rng(seed),
        None => ChaChaRng::from_entropy(),
    }
}

/// Rng for tests and benches only. Without `std` it is always seeded.
#[cfg(not(feature = "std"))]
pub fn test_rng() -> ChaChaRng {
    seeded_rng(DEFAULT_TEST_SEED)
}
