use crate::commitment::{fri::FriParams, hash::HashOutput, transcript::PlaceholderTranscript};
use crate::placeholder::preprocessor::CommonData;
use merlin::Transcript;
use placeholder_algebra::prelude::*;
use rand_chacha::ChaChaRng;

/// Initialize the transcript when computing or checking a Placeholder proof.
pub(crate) fn transcript_init_placeholder<F: Scalar>(
    transcript: &mut Transcript,
    common: &CommonData<F>,
    params_digest: &HashOutput,
) {
    transcript.append_message(b"New Domain", b"Placeholder");

    transcript.absorb_bytes(b"constraint system", &common.cs_digest);
    transcript.absorb_commitment(&common.fixed_root);

    let desc = &common.desc;
    transcript.append_u64(b"witness columns", desc.witness_columns as u64);
    transcript.append_u64(b"public input columns", desc.public_input_columns as u64);
    transcript.append_u64(b"constant columns", desc.constant_columns as u64);
    transcript.append_u64(b"selector columns", desc.selector_columns as u64);
    transcript.append_u64(b"usable rows", desc.usable_rows as u64);
    transcript.append_u64(b"rows amount", desc.rows_amount as u64);

    transcript.absorb_bytes(b"commitment params", params_digest);
}

/// Squeeze a challenge under `label`, drawing again from the same stream
/// while `avoid` holds for the drawn element.
fn challenge_avoiding<F: Scalar, A: Fn(&F) -> bool>(
    transcript: &mut Transcript,
    label: &'static [u8],
    avoid: A,
) -> F {
    let mut buff = [0u8; 32];
    transcript.challenge_bytes(label, &mut buff);
    let mut prng = ChaChaRng::from_seed(buff);
    loop {
        let elem = F::random(&mut prng);
        if !avoid(&elem) {
            return elem;
        }
    }
}

/// Return a challenge that is not a root of unity of order `group_order`.
pub(crate) fn transcript_get_challenge_field_elem<F: Scalar>(
    transcript: &mut Transcript,
    group_order: usize,
    label: &'static [u8],
) -> F {
    challenge_avoiding(transcript, label, |x: &F| {
        x.pow(&[group_order as u64]) == F::one()
    })
}

/// Return the evaluation point, which is neither on the basic domain nor on
/// the commitment coset. A draw hitting either one is replaced by the next
/// draw of the same stream, so prover and verifier agree on the point.
pub(crate) fn transcript_get_evaluation_point<F: Domain>(
    transcript: &mut Transcript,
    group_order: usize,
    params: &FriParams<F>,
) -> F {
    challenge_avoiding(transcript, b"evaluation point", |x: &F| {
        x.pow(&[group_order as u64]) == F::one() || params.is_in_commitment_domain(x)
    })
}

/// Return `count` independent challenges under the same label.
pub(crate) fn transcript_get_challenges<F: Scalar>(
    transcript: &mut Transcript,
    group_order: usize,
    label: &'static [u8],
    count: usize,
) -> Vec<F> {
    (0..count)
        .map(|_| transcript_get_challenge_field_elem(transcript, group_order, label))
        .collect()
}

/// The challenges of a Placeholder proof, in the order they are drawn.
///
/// Challenges of an absent argument stay zero.
pub(crate) struct PlaceholderChallenges<F> {
    pub(crate) beta: F,
    pub(crate) gamma: F,
    pub(crate) kappa: F,
    pub(crate) lookup_beta: F,
    pub(crate) theta: F,
    pub(crate) alphas: Vec<F>,
    pub(crate) y: F,
}

impl<F: Scalar> PlaceholderChallenges<F> {
    pub(crate) fn new() -> Self {
        Self {
            beta: F::zero(),
            gamma: F::zero(),
            kappa: F::zero(),
            lookup_beta: F::zero(),
            theta: F::zero(),
            alphas: Vec::new(),
            y: F::zero(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{challenge_avoiding, transcript_get_evaluation_point};
    use crate::commitment::{fri::FriParams, transcript::PlaceholderTranscript};
    use merlin::Transcript;
    use placeholder_algebra::{bn254::BN254Scalar, prelude::*};
    use rand_chacha::ChaChaRng;

    type F = BN254Scalar;

    #[test]
    fn colliding_draw_is_replaced_by_the_next_one() {
        let mut transcript = Transcript::new(b"resample");
        transcript.absorb_commitment(&[7u8; 32]);

        let mut buff = [0u8; 32];
        transcript.clone().challenge_bytes(b"point", &mut buff);
        let mut prng = ChaChaRng::from_seed(buff);
        let first = F::random(&mut prng);
        let second = F::random(&mut prng);

        let mut plain = transcript.clone();
        assert_eq!(challenge_avoiding(&mut plain, b"point", |_: &F| false), first);
        let mut avoiding = transcript.clone();
        let x = challenge_avoiding(&mut avoiding, b"point", |x: &F| *x == first);
        assert_eq!(x, second);

        // resampling does not touch the transcript beyond the squeeze
        let a: F = plain.squeeze_field(b"next");
        let b: F = avoiding.squeeze_field(b"next");
        assert_eq!(a, b);
    }

    #[test]
    fn evaluation_point_avoids_both_domains() {
        let params = FriParams::<F>::new(4, vec![1, 1], 2, 0, 3).unwrap();
        for i in 0..32u8 {
            let mut transcript = Transcript::new(b"evaluation");
            transcript.absorb_commitment(&[i; 32]);
            let y = transcript_get_evaluation_point(&mut transcript, 8, &params);
            assert_ne!(y.pow(&[8]), F::one());
            assert!(!params.is_in_commitment_domain(&y));
        }
    }
}
