//! Big-endian binary encodings of proofs, parameters and the artifacts
//! exchanged between the instances and the aggregator.
//!
//! Every self-standing encoding starts with the header
//! `(version, field id, hash id)`. Field elements take `F::bytes_len()`
//! bytes in canonical big-endian form; lengths are `u64`.

use crate::commitment::{
    fri::{FriParams, FriProof, RoundProof},
    hash::{Hash, HashOutput},
    lpc::{EvaluationMap, InitialProof, LpcProof, QueryInitialProofs},
    merkle::MerklePath,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::FpPolynomial;
use crate::placeholder::{
    aggregation::{AggregatedFriProof, AggregatedProof, PartialProof},
    params::PlaceholderField,
    proof::PlaceholderProof,
};
use ark_std::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use byteorder::{BigEndian, ByteOrder};
use placeholder_algebra::prelude::*;

/// The version written into every header.
pub const ENCODING_VERSION: u8 = 1;

/// The arity of the Merkle trees, as recorded in the parameters encoding.
const MERKLE_ARITY: u64 = 2;

struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    fn with_header<F: PlaceholderField, H: Hash>() -> Self {
        let mut w = Self::new();
        w.u8(ENCODING_VERSION);
        w.u8(F::FIELD_ID);
        w.u8(H::ID);
        w
    }

    fn u8(&mut self, x: u8) {
        self.bytes.push(x);
    }

    fn u64(&mut self, x: u64) {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, x);
        self.bytes.extend_from_slice(&buf);
    }

    fn len(&mut self, len: usize) {
        self.u64(len as u64);
    }

    fn field<F: Scalar>(&mut self, x: &F) {
        let mut b = x.to_bytes();
        b.reverse();
        self.bytes.extend_from_slice(&b);
    }

    fn fields<F: Scalar>(&mut self, xs: &[F]) {
        self.len(xs.len());
        for x in xs.iter() {
            self.field(x);
        }
    }

    fn hash(&mut self, h: &HashOutput) {
        self.bytes.extend_from_slice(h);
    }

    fn path(&mut self, path: &MerklePath) {
        self.len(path.siblings.len());
        for s in path.siblings.iter() {
            self.hash(s);
        }
    }

    fn commitments(&mut self, commitments: &BTreeMap<usize, HashOutput>) {
        self.u8(commitments.len() as u8);
        for (batch, root) in commitments.iter() {
            self.u8(*batch as u8);
            self.hash(root);
        }
    }

    fn evaluations<F: Scalar>(&mut self, z: &EvaluationMap<F>) {
        self.u8(z.len() as u8);
        for (batch, polys) in z.iter() {
            self.u8(*batch as u8);
            self.len(polys.len());
            for evals in polys.iter() {
                self.len(evals.len());
                for (point, value) in evals.iter() {
                    self.field(point);
                    self.field(value);
                }
            }
        }
    }

    /// The FRI roots, the rounds of every query, the final polynomial and
    /// the grinding nonce last.
    fn fri_proof<F: Scalar>(&mut self, proof: &FriProof<F>) {
        self.len(proof.fri_roots.len());
        for root in proof.fri_roots.iter() {
            self.hash(root);
        }
        self.len(proof.round_proofs.len());
        for rounds in proof.round_proofs.iter() {
            self.len(rounds.len());
            for round in rounds.iter() {
                self.fields(&round.values);
                self.path(&round.path);
            }
        }
        self.fields(&proof.final_polynomial);
        self.u64(proof.proof_of_work);
    }

    fn initial_proofs<F: Scalar>(&mut self, proofs: &[QueryInitialProofs<F>]) {
        self.len(proofs.len());
        for query in proofs.iter() {
            self.u8(query.len() as u8);
            for (batch, proof) in query.iter() {
                self.u8(*batch as u8);
                self.len(proof.values.len());
                for values in proof.values.iter() {
                    self.fields(values);
                }
                self.path(&proof.path);
            }
        }
    }

    fn partial_proof<F: Scalar>(&mut self, proof: &PartialProof<F>) {
        self.commitments(&proof.commitments);
        self.evaluations(&proof.z);
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn with_header<F: PlaceholderField, H: Hash>(bytes: &'a [u8]) -> Result<Self> {
        let mut r = Self::new(bytes);
        if r.u8()? != ENCODING_VERSION {
            return Err(PlaceholderError::SerializationVersionMismatch);
        }
        if r.u8()? != F::FIELD_ID || r.u8()? != H::ID {
            return Err(PlaceholderError::UnsupportedFieldOrHash);
        }
        Ok(r)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(PlaceholderError::SerializationTruncated)?;
        let res = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(res)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn finish(self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(PlaceholderError::SerializationMalformed);
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Read a length of items taking at least `item_size` bytes each.
    fn len(&mut self, item_size: usize) -> Result<usize> {
        let len = self.u64()?;
        if len > (self.remaining() / item_size.max(1)) as u64 {
            return Err(PlaceholderError::SerializationTruncated);
        }
        Ok(len as usize)
    }

    fn field<F: Scalar>(&mut self) -> Result<F> {
        let mut b = self.take(F::bytes_len())?.to_vec();
        b.reverse();
        F::from_canonical_bytes(&b).map_err(|_| PlaceholderError::SerializationMalformed)
    }

    fn fields<F: Scalar>(&mut self) -> Result<Vec<F>> {
        let len = self.len(F::bytes_len())?;
        (0..len).map(|_| self.field()).collect()
    }

    fn hash(&mut self) -> Result<HashOutput> {
        let mut h = [0u8; 32];
        h.copy_from_slice(self.take(32)?);
        Ok(h)
    }

    fn path(&mut self) -> Result<MerklePath> {
        let len = self.len(32)?;
        let siblings = (0..len).map(|_| self.hash()).collect::<Result<Vec<_>>>()?;
        Ok(MerklePath { siblings })
    }

    /// Read a batch id, which must exceed the previous one.
    fn batch(&mut self, previous: Option<usize>) -> Result<usize> {
        let batch = self.u8()? as usize;
        if previous.map_or(false, |p| batch <= p) {
            return Err(PlaceholderError::SerializationMalformed);
        }
        Ok(batch)
    }

    fn commitments(&mut self) -> Result<BTreeMap<usize, HashOutput>> {
        let count = self.u8()?;
        let mut res = BTreeMap::new();
        let mut previous = None;
        for _ in 0..count {
            let batch = self.batch(previous)?;
            res.insert(batch, self.hash()?);
            previous = Some(batch);
        }
        Ok(res)
    }

    fn evaluations<F: Scalar>(&mut self) -> Result<EvaluationMap<F>> {
        let count = self.u8()?;
        let mut z = BTreeMap::new();
        let mut previous = None;
        for _ in 0..count {
            let batch = self.batch(previous)?;
            let polys_count = self.len(8)?;
            let mut polys = Vec::with_capacity(polys_count);
            for _ in 0..polys_count {
                let len = self.len(2 * F::bytes_len())?;
                let evals = (0..len)
                    .map(|_| Ok((self.field()?, self.field()?)))
                    .collect::<Result<Vec<_>>>()?;
                polys.push(evals);
            }
            z.insert(batch, polys);
            previous = Some(batch);
        }
        Ok(z)
    }

    fn fri_proof<F: Scalar>(&mut self) -> Result<FriProof<F>> {
        let roots_count = self.len(32)?;
        let fri_roots = (0..roots_count)
            .map(|_| self.hash())
            .collect::<Result<Vec<_>>>()?;
        let queries = self.len(8)?;
        let mut round_proofs = Vec::with_capacity(queries);
        for _ in 0..queries {
            let rounds = self.len(16)?;
            let mut query = Vec::with_capacity(rounds);
            for _ in 0..rounds {
                let values = self.fields()?;
                let path = self.path()?;
                query.push(RoundProof { values, path });
            }
            round_proofs.push(query);
        }
        let final_polynomial = self.fields()?;
        let proof_of_work = self.u64()?;
        Ok(FriProof {
            fri_roots,
            final_polynomial,
            proof_of_work,
            round_proofs,
        })
    }

    fn initial_proofs<F: Scalar>(&mut self) -> Result<Vec<QueryInitialProofs<F>>> {
        let queries = self.len(1)?;
        let mut res = Vec::with_capacity(queries);
        for _ in 0..queries {
            let count = self.u8()?;
            let mut query = BTreeMap::new();
            let mut previous = None;
            for _ in 0..count {
                let batch = self.batch(previous)?;
                let polys = self.len(8)?;
                let values = (0..polys)
                    .map(|_| self.fields())
                    .collect::<Result<Vec<_>>>()?;
                let path = self.path()?;
                query.insert(batch, InitialProof { values, path });
                previous = Some(batch);
            }
            res.push(query);
        }
        Ok(res)
    }

    fn partial_proof<F: Scalar>(&mut self) -> Result<PartialProof<F>> {
        Ok(PartialProof {
            commitments: self.commitments()?,
            z: self.evaluations()?,
        })
    }
}

/// Encode a Placeholder proof.
pub fn encode_proof<F: PlaceholderField, H: Hash>(proof: &PlaceholderProof<F>) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.commitments(&proof.commitments);
    w.evaluations(&proof.eval_proof.z);
    w.fri_proof(&proof.eval_proof.fri_proof);
    w.initial_proofs(&proof.eval_proof.initial_proofs);
    w.bytes
}

/// Decode a Placeholder proof.
pub fn decode_proof<F: PlaceholderField, H: Hash>(bytes: &[u8]) -> Result<PlaceholderProof<F>> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let commitments = r.commitments()?;
    let z = r.evaluations()?;
    let fri_proof = r.fri_proof()?;
    let initial_proofs = r.initial_proofs()?;
    r.finish()?;
    Ok(PlaceholderProof {
        commitments,
        eval_proof: LpcProof {
            z,
            fri_proof,
            initial_proofs,
        },
    })
}

/// Encode the commitment parameters: `λ`, the Merkle arity, the grinding
/// bits, `log2` of the largest polynomial, the domain generators, the step
/// list and the blow-up.
pub fn encode_commitment_params<F: Domain>(params: &FriParams<F>) -> Vec<u8> {
    let mut w = Writer::new();
    w.u64(params.lambda as u64);
    w.u64(MERKLE_ARITY);
    w.u64(params.grinding_bits as u64);
    w.u64(params.max_degree_log as u64);
    w.fields(&params.domain_generators());
    w.len(params.step_list.len());
    for s in params.step_list.iter() {
        w.u64(*s as u64);
    }
    w.u64(params.expand_factor as u64);
    w.bytes
}

/// Decode commitment parameters, checking the domain generators.
pub fn decode_commitment_params<F: Domain>(bytes: &[u8]) -> Result<FriParams<F>> {
    let mut r = Reader::new(bytes);
    let lambda = r.u64()? as usize;
    if r.u64()? != MERKLE_ARITY {
        return Err(PlaceholderError::SerializationMalformed);
    }
    let grinding_bits =
        u32::try_from(r.u64()?).map_err(|_| PlaceholderError::SerializationMalformed)?;
    let max_degree_log = r.u64()? as usize;
    let generators: Vec<F> = r.fields()?;
    let steps = r.len(8)?;
    let step_list = (0..steps)
        .map(|_| Ok(r.u64()? as usize))
        .collect::<Result<Vec<_>>>()?;
    let expand_factor = r.u64()? as usize;
    r.finish()?;

    let params = FriParams::new(
        lambda,
        step_list,
        expand_factor,
        grinding_bits,
        max_degree_log,
    )?;
    if params.domain_generators() != generators {
        return Err(PlaceholderError::SerializationMalformed);
    }
    Ok(params)
}

/// Encode the partial proof of one instance.
pub fn encode_partial_proof<F: PlaceholderField, H: Hash>(proof: &PartialProof<F>) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.partial_proof(proof);
    w.bytes
}

/// Decode the partial proof of one instance.
pub fn decode_partial_proof<F: PlaceholderField, H: Hash>(bytes: &[u8]) -> Result<PartialProof<F>> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let proof = r.partial_proof()?;
    r.finish()?;
    Ok(proof)
}

/// Encode the challenge an instance hands to the aggregator.
pub fn encode_challenge<F: PlaceholderField, H: Hash>(challenge: &F) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.field(challenge);
    w.bytes
}

/// Decode the challenge of an instance.
pub fn decode_challenge<F: PlaceholderField, H: Hash>(bytes: &[u8]) -> Result<F> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let challenge = r.field()?;
    r.finish()?;
    Ok(challenge)
}

/// Encode the next free power of the combination challenge, in decimal.
pub fn encode_theta_power(theta_power: usize) -> String {
    theta_power.to_string()
}

/// Decode a power of the combination challenge written in decimal.
pub fn decode_theta_power(text: &str) -> Result<usize> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlaceholderError::SerializationMalformed);
    }
    text.parse()
        .map_err(|_| PlaceholderError::SerializationMalformed)
}

/// Encode a polynomial in coefficient form.
pub fn encode_polynomial<F: PlaceholderField, H: Hash>(poly: &FpPolynomial<F>) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.fields(&poly.coefs);
    w.bytes
}

/// Decode a polynomial in coefficient form, keeping its length.
pub fn decode_polynomial<F: PlaceholderField, H: Hash>(bytes: &[u8]) -> Result<FpPolynomial<F>> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let coefs = r.fields()?;
    r.finish()?;
    Ok(FpPolynomial { coefs })
}

/// Encode the FRI proof shared by aggregated instances.
pub fn encode_aggregated_fri_proof<F: PlaceholderField, H: Hash>(
    proof: &AggregatedFriProof<F>,
) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.fri_proof(&proof.fri_proof);
    w.bytes
}

/// Decode the FRI proof shared by aggregated instances.
pub fn decode_aggregated_fri_proof<F: PlaceholderField, H: Hash>(
    bytes: &[u8],
) -> Result<AggregatedFriProof<F>> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let fri_proof = r.fri_proof()?;
    r.finish()?;
    Ok(AggregatedFriProof { fri_proof })
}

/// Encode the query indices as consecutive big-endian `u64`.
pub fn encode_query_indices(indices: &[usize]) -> Vec<u8> {
    let mut w = Writer::new();
    for i in indices.iter() {
        w.u64(*i as u64);
    }
    w.bytes
}

/// Decode query indices written by [`encode_query_indices`].
pub fn decode_query_indices(bytes: &[u8]) -> Result<Vec<usize>> {
    if bytes.len() % 8 != 0 {
        return Err(PlaceholderError::SerializationTruncated);
    }
    Ok(bytes
        .chunks(8)
        .map(|c| BigEndian::read_u64(c) as usize)
        .collect())
}

/// Encode the openings of one instance at the query indices.
pub fn encode_initial_proofs<F: PlaceholderField, H: Hash>(
    proofs: &[QueryInitialProofs<F>],
) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.initial_proofs(proofs);
    w.bytes
}

/// Decode the openings of one instance.
pub fn decode_initial_proofs<F: PlaceholderField, H: Hash>(
    bytes: &[u8],
) -> Result<Vec<QueryInitialProofs<F>>> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let proofs = r.initial_proofs()?;
    r.finish()?;
    Ok(proofs)
}

/// Encode an aggregated proof.
pub fn encode_aggregated_proof<F: PlaceholderField, H: Hash>(proof: &AggregatedProof<F>) -> Vec<u8> {
    let mut w = Writer::with_header::<F, H>();
    w.len(proof.partial_proofs.len());
    for partial in proof.partial_proofs.iter() {
        w.partial_proof(partial);
    }
    w.fri_proof(&proof.fri_proof);
    w.len(proof.initial_proofs.len());
    for instance in proof.initial_proofs.iter() {
        w.initial_proofs(instance);
    }
    w.bytes
}

/// Decode an aggregated proof.
pub fn decode_aggregated_proof<F: PlaceholderField, H: Hash>(
    bytes: &[u8],
) -> Result<AggregatedProof<F>> {
    let mut r = Reader::with_header::<F, H>(bytes)?;
    let count = r.len(2)?;
    let partial_proofs = (0..count)
        .map(|_| r.partial_proof())
        .collect::<Result<Vec<_>>>()?;
    let fri_proof = r.fri_proof()?;
    let count = r.len(8)?;
    let initial_proofs = (0..count)
        .map(|_| r.initial_proofs())
        .collect::<Result<Vec<_>>>()?;
    r.finish()?;
    Ok(AggregatedProof {
        partial_proofs,
        fri_proof,
        initial_proofs,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commitment::hash::{Keccak256Hash, Sha256Hash};
    use placeholder_algebra::bn254::BN254Scalar;

    type F = BN254Scalar;

    fn sample_proof() -> PlaceholderProof<F> {
        let mut prng = seeded_rng(11);
        let mut commitments = BTreeMap::new();
        commitments.insert(1, [1u8; 32]);
        commitments.insert(3, [3u8; 32]);
        let mut z = BTreeMap::new();
        let y = F::random(&mut prng);
        z.insert(1, vec![vec![(y, F::random(&mut prng))], vec![]]);
        z.insert(3, vec![vec![(y, F::one()), (y.add(&y), F::zero())]]);
        let path = MerklePath {
            siblings: vec![[7u8; 32], [8u8; 32]],
        };
        let fri_proof = FriProof {
            fri_roots: vec![[9u8; 32]],
            final_polynomial: vec![F::from(4u32), F::from(5u32)],
            proof_of_work: 17,
            round_proofs: vec![vec![RoundProof {
                values: vec![F::one(), F::zero()],
                path: path.clone(),
            }]],
        };
        let mut query = BTreeMap::new();
        query.insert(
            1,
            InitialProof {
                values: vec![vec![F::one(), F::one()], vec![F::zero(), y]],
                path,
            },
        );
        PlaceholderProof {
            commitments,
            eval_proof: LpcProof {
                z,
                fri_proof,
                initial_proofs: vec![query],
            },
        }
    }

    #[test]
    fn proof_bytes_are_canonical() {
        let proof = sample_proof();
        let bytes = encode_proof::<F, Sha256Hash>(&proof);
        assert_eq!(&bytes[..3], &[ENCODING_VERSION, 1, Sha256Hash::ID]);
        let decoded = decode_proof::<F, Sha256Hash>(&bytes).unwrap();
        assert_eq!(decoded, proof);
        assert_eq!(encode_proof::<F, Sha256Hash>(&decoded), bytes);
    }

    #[test]
    fn malformed_inputs() {
        let bytes = encode_proof::<F, Sha256Hash>(&sample_proof());
        assert_eq!(
            decode_proof::<F, Sha256Hash>(&bytes[..bytes.len() - 1]),
            Err(PlaceholderError::SerializationTruncated)
        );

        let mut longer = bytes.clone();
        longer.push(0);
        assert_eq!(
            decode_proof::<F, Sha256Hash>(&longer),
            Err(PlaceholderError::SerializationMalformed)
        );

        let mut version = bytes.clone();
        version[0] = 2;
        assert_eq!(
            decode_proof::<F, Sha256Hash>(&version),
            Err(PlaceholderError::SerializationVersionMismatch)
        );

        assert_eq!(
            decode_proof::<F, Keccak256Hash>(&bytes),
            Err(PlaceholderError::UnsupportedFieldOrHash)
        );

        // batch ids must increase
        let mut unordered = bytes.clone();
        unordered[4] = 3;
        assert_eq!(
            decode_proof::<F, Sha256Hash>(&unordered[..]).err(),
            Some(PlaceholderError::SerializationMalformed)
        );
    }

    #[test]
    fn missing_nonce_is_rejected() {
        let proof = sample_proof();
        let fri = AggregatedFriProof {
            fri_proof: proof.eval_proof.fri_proof.clone(),
        };
        let bytes = encode_aggregated_fri_proof::<F, Sha256Hash>(&fri);
        // the nonce closes the FRI section
        assert_eq!(&bytes[bytes.len() - 8..], &17u64.to_be_bytes());
        assert_eq!(
            decode_aggregated_fri_proof::<F, Sha256Hash>(&bytes[..bytes.len() - 8]),
            Err(PlaceholderError::SerializationTruncated)
        );

        // a nonce of zero is still written and read back
        let mut zero = fri.clone();
        zero.fri_proof.proof_of_work = 0;
        let bytes = encode_aggregated_fri_proof::<F, Sha256Hash>(&zero);
        assert_eq!(&bytes[bytes.len() - 8..], &[0u8; 8]);
        assert_eq!(
            decode_aggregated_fri_proof::<F, Sha256Hash>(&bytes).unwrap(),
            zero
        );
    }

    #[test]
    fn non_canonical_field_is_rejected() {
        let mut bytes = encode_challenge::<F, Sha256Hash>(&F::one());
        for b in bytes[3..].iter_mut() {
            *b = 0xff;
        }
        assert_eq!(
            decode_challenge::<F, Sha256Hash>(&bytes),
            Err(PlaceholderError::SerializationMalformed)
        );
    }

    #[test]
    fn commitment_params_bytes() {
        let params = FriParams::<F>::new(12, vec![2, 1, 1], 3, 8, 6).unwrap();
        let bytes = encode_commitment_params(&params);
        assert_eq!(&bytes[..8], &12u64.to_be_bytes());
        assert_eq!(&bytes[8..16], &2u64.to_be_bytes());
        assert_eq!(decode_commitment_params::<F>(&bytes).unwrap(), params);
    }

    #[test]
    fn artifacts() {
        assert_eq!(encode_theta_power(42), "42");
        assert_eq!(decode_theta_power("42\n").unwrap(), 42);
        assert!(decode_theta_power("-1").is_err());
        assert!(decode_theta_power("").is_err());

        let indices = vec![0, 5, 1 << 40];
        let bytes = encode_query_indices(&indices);
        assert_eq!(bytes.len(), 24);
        assert_eq!(decode_query_indices(&bytes).unwrap(), indices);
        assert_eq!(
            decode_query_indices(&bytes[..23]),
            Err(PlaceholderError::SerializationTruncated)
        );

        let poly = FpPolynomial {
            coefs: vec![F::one(), F::zero(), F::zero()],
        };
        let bytes = encode_polynomial::<F, Sha256Hash>(&poly);
        assert_eq!(decode_polynomial::<F, Sha256Hash>(&bytes).unwrap(), poly);
    }
}
