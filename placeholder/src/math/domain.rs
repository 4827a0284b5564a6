use crate::errors::{PlaceholderError, Result};
use ark_poly::{EvaluationDomain as _, Radix2EvaluationDomain};
use ark_std::vec::Vec;
use placeholder_algebra::prelude::*;

/// A multiplicative subgroup `<ω>` of size `2^k` with the NTT over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationDomain<F: Domain> {
    inner: Radix2EvaluationDomain<F::Field>,
}

impl<F: Domain> EvaluationDomain<F> {
    /// Create the domain of the given size, which must be a power of two
    /// supported by the field.
    pub fn new(size: usize) -> Result<Self> {
        if !size.is_power_of_two() {
            return Err(PlaceholderError::DomainTooSmall);
        }
        let inner =
            Radix2EvaluationDomain::<F::Field>::new(size).ok_or(PlaceholderError::DomainTooSmall)?;
        if inner.size() != size {
            return Err(PlaceholderError::DomainTooSmall);
        }
        Ok(Self { inner })
    }

    /// Return the number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Return `log2` of the size.
    #[inline]
    pub fn log_size(&self) -> usize {
        self.inner.log_size_of_group() as usize
    }

    /// Return the generator `ω`.
    #[inline]
    pub fn generator(&self) -> F {
        F::from_field(self.inner.group_gen())
    }

    /// Return `ω^{-1}`.
    #[inline]
    pub fn generator_inv(&self) -> F {
        F::from_field(self.inner.group_gen_inv())
    }

    /// Return `1 / n`.
    #[inline]
    pub fn size_inv(&self) -> F {
        F::from_field(self.inner.size_inv())
    }

    /// Return `ω^i`, the reduction of `i` modulo the size is implicit.
    pub fn element(&self, i: usize) -> F {
        F::from_field(self.inner.element(i % self.size()))
    }

    /// Return `ω^r` for a possibly negative rotation `r`.
    pub fn rotation(&self, r: i32) -> F {
        let n = self.size() as i64;
        let i = (r as i64).rem_euclid(n);
        self.element(i as usize)
    }

    /// Return all the elements in order `1, ω, ω^2, ...`.
    pub fn elements(&self) -> Vec<F> {
        self.inner.elements().map(F::from_field).collect()
    }

    /// Evaluate `x^n - 1` at `point` in `O(log n)`.
    pub fn evaluate_vanishing(&self, point: &F) -> F {
        point.pow(&[self.size() as u64]).sub(&F::one())
    }

    /// Evaluate the `i`-th Lagrange basis polynomial of the domain at `point`.
    pub fn evaluate_lagrange(&self, i: usize, point: &F) -> Result<F> {
        let w_i = self.element(i);
        let z = self.evaluate_vanishing(point);
        if z.is_zero() {
            return Ok(if *point == w_i { F::one() } else { F::zero() });
        }
        // L_i(y) = ω^i (y^n - 1) / (n (y - ω^i))
        let denominator = point.sub(&w_i).mul(&F::from(self.size() as u64));
        Ok(w_i.mul(&z).mul(&denominator.inv()?))
    }

    /// Evaluate `Σ_j values[j] L_j(point)` with one inversion per term.
    pub fn evaluate_interpolation(&self, values: &[F], point: &F) -> Result<F> {
        if values.len() > self.size() {
            return Err(PlaceholderError::DomainTooSmall);
        }
        let z = self.evaluate_vanishing(point);
        if z.is_zero() {
            let mut res = F::zero();
            for (j, v) in values.iter().enumerate() {
                if self.element(j) == *point {
                    res = *v;
                }
            }
            return Ok(res);
        }
        let mut denominators = Vec::with_capacity(values.len());
        let mut w = F::one();
        let generator = self.generator();
        for _ in 0..values.len() {
            denominators.push(point.sub(&w));
            w.mul_assign(&generator);
        }
        placeholder_algebra::traits::batch_inversion(&mut denominators)?;

        let mut res = F::zero();
        let mut w = F::one();
        for (v, d) in values.iter().zip(denominators.iter()) {
            res.add_assign(&v.mul(&w).mul(d));
            w.mul_assign(&generator);
        }
        Ok(res.mul(&z).mul(&self.size_inv()))
    }

    /// Forward NTT of at most `n` coefficients.
    pub fn fft(&self, coefs: &[F]) -> Result<Vec<F>> {
        if coefs.len() > self.size() {
            return Err(PlaceholderError::DomainTooSmall);
        }
        let mut v: Vec<F::Field> = coefs.iter().map(|c| c.get_field()).collect();
        v.resize(self.size(), F::zero().get_field());
        self.inner.fft_in_place(&mut v);
        Ok(v.into_iter().map(F::from_field).collect())
    }

    /// Inverse NTT of exactly `n` evaluations.
    pub fn ifft(&self, evals: &[F]) -> Result<Vec<F>> {
        if evals.len() != self.size() {
            return Err(PlaceholderError::DomainTooSmall);
        }
        let mut v: Vec<F::Field> = evals.iter().map(|c| c.get_field()).collect();
        self.inner.ifft_in_place(&mut v);
        Ok(v.into_iter().map(F::from_field).collect())
    }

    /// Evaluate the polynomial on the coset `offset · <ω>`.
    pub fn coset_fft(&self, coefs: &[F], offset: &F) -> Result<Vec<F>> {
        let mut scaled = Vec::with_capacity(coefs.len());
        let mut pow = F::one();
        for c in coefs {
            scaled.push(c.mul(&pow));
            pow.mul_assign(offset);
        }
        self.fft(&scaled)
    }

    /// Interpolate evaluations on the coset `offset · <ω>`.
    pub fn coset_ifft(&self, evals: &[F], offset: &F) -> Result<Vec<F>> {
        let mut coefs = self.ifft(evals)?;
        let offset_inv = offset.inv()?;
        let mut pow = F::one();
        for c in coefs.iter_mut() {
            c.mul_assign(&pow);
            pow.mul_assign(&offset_inv);
        }
        Ok(coefs)
    }
}
