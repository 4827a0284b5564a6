use ark_std::fmt::Debug;
use digest::Digest;

/// The output of every hash used for commitments.
pub type HashOutput = [u8; 32];

/// Leaf domain separator.
const LEAF_PREFIX: u8 = 0x00;
/// Internal node domain separator.
const NODE_PREFIX: u8 = 0x01;

/// The trait for the hash behind Merkle trees and the transcript binding.
pub trait Hash: Clone + Debug + Default + Send + Sync + 'static {
    /// Identifier written into proof headers.
    const ID: u8;
    /// Human-readable name.
    const NAME: &'static str;

    /// Hash a byte string.
    fn digest(data: &[u8]) -> HashOutput;

    /// Hash the concatenation of the parts of a leaf.
    fn hash_leaf(parts: &[&[u8]]) -> HashOutput;

    /// Hash two children into their parent.
    fn hash_node(left: &HashOutput, right: &HashOutput) -> HashOutput;
}

fn finalize_with<D: Digest>(prefix: Option<u8>, parts: &[&[u8]]) -> HashOutput {
    let mut hasher = D::new();
    if let Some(p) = prefix {
        hasher.update([p]);
    }
    for part in parts {
        hasher.update(part);
    }
    let out = hasher.finalize();
    let mut res = [0u8; 32];
    res.copy_from_slice(&out[..32]);
    res
}

macro_rules! impl_hash {
    ($name:ident, $digest:ty, $id:expr, $label:expr) => {
        #[doc = concat!("The ", $label, " hash.")]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl Hash for $name {
            const ID: u8 = $id;
            const NAME: &'static str = $label;

            fn digest(data: &[u8]) -> HashOutput {
                finalize_with::<$digest>(None, &[data])
            }

            fn hash_leaf(parts: &[&[u8]]) -> HashOutput {
                finalize_with::<$digest>(Some(LEAF_PREFIX), parts)
            }

            fn hash_node(left: &HashOutput, right: &HashOutput) -> HashOutput {
                finalize_with::<$digest>(Some(NODE_PREFIX), &[&left[..], &right[..]])
            }
        }
    };
}

impl_hash!(Sha256Hash, sha2::Sha256, 1, "SHA-256");
impl_hash!(Keccak256Hash, sha3::Keccak256, 2, "Keccak-256");
