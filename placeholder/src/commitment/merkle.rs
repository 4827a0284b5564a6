use crate::commitment::hash::{Hash, HashOutput};
use crate::errors::{PlaceholderError, Result};
use ark_std::{marker::PhantomData, vec::Vec};
use placeholder_algebra::prelude::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The leaf standing in for missing leaves on the right.
pub const EMPTY_LEAF: HashOutput = [0u8; 32];

/// Hash the values of one leaf, each in its fixed-width encoding.
pub fn hash_field_leaf<H: Hash, F: Scalar>(values: &[F]) -> HashOutput {
    let bytes: Vec<Vec<u8>> = values.iter().map(|v| v.to_bytes()).collect();
    let parts: Vec<&[u8]> = bytes.iter().map(|b| b.as_slice()).collect();
    H::hash_leaf(&parts)
}

/// A complete binary Merkle tree over leaf hashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree<H> {
    /// `layers[0]` are the (padded) leaves, the last layer is the root.
    layers: Vec<Vec<HashOutput>>,
    leaves: usize,
    _hash: PhantomData<H>,
}

/// The siblings from a leaf up to the root; the leaf index is supplied by the
/// verifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// Sibling hashes, bottom-up.
    pub siblings: Vec<HashOutput>,
}

impl<H: Hash> MerkleTree<H> {
    /// Build the tree from hashed leaves.
    pub fn new(mut leaves: Vec<HashOutput>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(PlaceholderError::LeafIndexOutOfRange);
        }
        let count = leaves.len();
        leaves.resize(count.next_power_of_two(), EMPTY_LEAF);

        let mut layers = vec![leaves];
        while let Some(last) = layers.last() {
            if last.len() == 1 {
                break;
            }
            let next: Vec<HashOutput> = ark_std::cfg_chunks!(last, 2)
                .map(|pair| H::hash_node(&pair[0], &pair[1]))
                .collect();
            layers.push(next);
        }
        Ok(Self {
            layers,
            leaves: count,
            _hash: PhantomData,
        })
    }

    /// Build the tree whose `i`-th leaf holds `rows[i]`.
    pub fn from_rows<F: Scalar>(rows: &[Vec<F>]) -> Result<Self> {
        let leaves = ark_std::cfg_iter!(rows)
            .map(|r| hash_field_leaf::<H, F>(r))
            .collect();
        Self::new(leaves)
    }

    /// Return the root.
    pub fn root(&self) -> HashOutput {
        self.layers
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or(EMPTY_LEAF)
    }

    /// The number of leaves before padding.
    pub fn leaves_count(&self) -> usize {
        self.leaves
    }

    /// Return the authentication path of the `index`-th leaf.
    pub fn path(&self, index: usize) -> Result<MerklePath> {
        if index >= self.leaves {
            return Err(PlaceholderError::LeafIndexOutOfRange);
        }
        let mut siblings = Vec::with_capacity(self.layers.len() - 1);
        let mut i = index;
        for layer in self.layers.iter().take(self.layers.len() - 1) {
            siblings.push(layer[i ^ 1]);
            i >>= 1;
        }
        Ok(MerklePath { siblings })
    }
}

impl MerklePath {
    /// Recompute the root from the leaf hash at `index`.
    pub fn compute_root<H: Hash>(&self, index: usize, leaf: &HashOutput) -> Result<HashOutput> {
        if self.siblings.len() < usize::BITS as usize && index >> self.siblings.len() != 0 {
            return Err(PlaceholderError::LeafIndexOutOfRange);
        }
        let mut cur = *leaf;
        let mut i = index;
        for sibling in self.siblings.iter() {
            cur = if i & 1 == 0 {
                H::hash_node(&cur, sibling)
            } else {
                H::hash_node(sibling, &cur)
            };
            i >>= 1;
        }
        Ok(cur)
    }

    /// Check that the leaf hash sits at `index` below `root` in a tree with
    /// `leaves` leaves.
    pub fn verify<H: Hash>(
        &self,
        root: &HashOutput,
        index: usize,
        leaves: usize,
        leaf: &HashOutput,
    ) -> Result<()> {
        if index >= leaves {
            return Err(PlaceholderError::LeafIndexOutOfRange);
        }
        if self.siblings.len() != log2_ceil(leaves) {
            return Err(PlaceholderError::MerklePathMismatch);
        }
        if self.compute_root::<H>(index, leaf)? != *root {
            return Err(PlaceholderError::MerklePathMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{hash_field_leaf, MerkleTree};
    use crate::commitment::hash::{Keccak256Hash, Sha256Hash};
    use crate::errors::PlaceholderError;
    use placeholder_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    #[test]
    fn paths_verify() {
        let mut prng = test_rng();
        for count in [1usize, 2, 5, 8, 13] {
            let rows: Vec<Vec<F>> = (0..count)
                .map(|_| (0..3).map(|_| F::random(&mut prng)).collect())
                .collect();
            let tree = MerkleTree::<Sha256Hash>::from_rows(&rows).unwrap();
            let root = tree.root();
            for (i, row) in rows.iter().enumerate() {
                let leaf = hash_field_leaf::<Sha256Hash, F>(row);
                let path = tree.path(i).unwrap();
                path.verify::<Sha256Hash>(&root, i, count, &leaf).unwrap();
            }
            assert_eq!(
                tree.path(count).unwrap_err(),
                PlaceholderError::LeafIndexOutOfRange
            );
        }
    }

    #[test]
    fn tampering_is_detected() {
        let mut prng = test_rng();
        let rows: Vec<Vec<F>> = (0..8).map(|_| vec![F::random(&mut prng)]).collect();
        let tree = MerkleTree::<Keccak256Hash>::from_rows(&rows).unwrap();
        let root = tree.root();
        let leaf = hash_field_leaf::<Keccak256Hash, F>(&rows[3]);
        let path = tree.path(3).unwrap();

        let wrong_leaf = hash_field_leaf::<Keccak256Hash, F>(&rows[4]);
        assert_eq!(
            path.verify::<Keccak256Hash>(&root, 3, 8, &wrong_leaf),
            Err(PlaceholderError::MerklePathMismatch)
        );
        assert_eq!(
            path.verify::<Keccak256Hash>(&root, 2, 8, &leaf),
            Err(PlaceholderError::MerklePathMismatch)
        );

        let mut bad = path.clone();
        bad.siblings[1][0] ^= 1;
        assert_eq!(
            bad.verify::<Keccak256Hash>(&root, 3, 8, &leaf),
            Err(PlaceholderError::MerklePathMismatch)
        );
        assert_eq!(
            path.verify::<Keccak256Hash>(&root, 9, 8, &leaf),
            Err(PlaceholderError::LeafIndexOutOfRange)
        );
    }
}
