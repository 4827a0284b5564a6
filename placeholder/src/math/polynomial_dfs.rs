use crate::errors::{PlaceholderError, Result};
use crate::math::{domain::EvaluationDomain, polynomial::FpPolynomial};
use ark_std::{cfg_iter, cfg_iter_mut, vec::Vec};
use placeholder_algebra::{prelude::*, traits::batch_inversion};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A polynomial given by its evaluations `p(ω^i)` on a domain of size `2^k`.
///
/// Binary operations on two polynomials of different sizes first extend the
/// smaller one to the larger domain; the caller is responsible for choosing a
/// domain large enough to hold the degree of a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialDfs<F> {
    evals: Vec<F>,
}

impl<F: Domain> PolynomialDfs<F> {
    /// Wrap a vector of evaluations whose length is a power of two.
    pub fn new(evals: Vec<F>) -> Result<Self> {
        if !evals.len().is_power_of_two() {
            return Err(PlaceholderError::DomainTooSmall);
        }
        Ok(Self { evals })
    }

    /// Return the constant polynomial `c` sampled on `size` points.
    pub fn constant(c: F, size: usize) -> Result<Self> {
        Self::new(vec![c; size])
    }

    /// Return the zero polynomial sampled on `size` points.
    pub fn zero(size: usize) -> Result<Self> {
        Self::constant(F::zero(), size)
    }

    /// Evaluate a coefficient-form polynomial on a domain of `size` points.
    pub fn from_coefficients(poly: &FpPolynomial<F>, size: usize) -> Result<Self> {
        let domain = EvaluationDomain::new(size)?;
        Self::new(poly.fft_with_domain(&domain)?)
    }

    /// Interpolate into coefficient form.
    pub fn to_coefficients(&self) -> Result<FpPolynomial<F>> {
        let domain = EvaluationDomain::new(self.size())?;
        FpPolynomial::ifft_with_domain(&domain, &self.evals)
    }

    /// Return the domain size.
    #[inline]
    pub fn size(&self) -> usize {
        self.evals.len()
    }

    /// Return the evaluations.
    #[inline]
    pub fn evals(&self) -> &[F] {
        &self.evals
    }

    /// Consume and return the evaluations.
    pub fn into_evals(self) -> Vec<F> {
        self.evals
    }

    /// Return the evaluation at `ω^i`.
    #[inline]
    pub fn get(&self, i: usize) -> F {
        self.evals[i]
    }

    /// Evaluate at an arbitrary point.
    pub fn evaluate(&self, point: &F) -> Result<F> {
        let domain = EvaluationDomain::new(self.size())?;
        domain.evaluate_interpolation(&self.evals, point)
    }

    /// Sample the same polynomial on a domain of `new_size` points.
    ///
    /// Growing goes through the coefficient form; shrinking keeps every
    /// `size / new_size`-th evaluation and is only meaningful when the degree
    /// fits in the smaller domain.
    pub fn resize(&self, new_size: usize) -> Result<Self> {
        if !new_size.is_power_of_two() {
            return Err(PlaceholderError::DomainTooSmall);
        }
        let size = self.size();
        if new_size == size {
            return Ok(self.clone());
        }
        if new_size < size {
            let step = size / new_size;
            return Self::new(self.evals.iter().step_by(step).copied().collect());
        }
        let coefs = EvaluationDomain::<F>::new(size)?.ifft(&self.evals)?;
        Self::new(EvaluationDomain::<F>::new(new_size)?.fft(&coefs)?)
    }

    /// Return the polynomial `p(ω_n^k · x)` where `ω_n` generates the domain of
    /// size `base_size`.
    pub fn shift(&self, k: i32, base_size: usize) -> Result<Self> {
        if k == 0 {
            return Ok(self.clone());
        }
        let size = self.size();
        if size >= base_size && size % base_size == 0 {
            let ratio = (size / base_size) as i64;
            let offset = ((k as i64) * ratio).rem_euclid(size as i64) as usize;
            let mut evals = self.evals.clone();
            evals.rotate_left(offset);
            return Self::new(evals);
        }
        let base = EvaluationDomain::<F>::new(base_size)?;
        let coefs = self.to_coefficients()?.mul_var(&base.rotation(k));
        Self::from_coefficients(&coefs, size)
    }

    fn aligned(&self, other: &Self) -> Result<(Self, Self)> {
        let size = self.size().max(other.size());
        Ok((self.resize(size)?, other.resize(size)?))
    }

    /// Pointwise sum.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let (mut a, b) = self.aligned(other)?;
        cfg_iter_mut!(a.evals)
            .zip(cfg_iter!(b.evals))
            .for_each(|(x, y)| x.add_assign(y));
        Ok(a)
    }

    /// Pointwise difference.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        let (mut a, b) = self.aligned(other)?;
        cfg_iter_mut!(a.evals)
            .zip(cfg_iter!(b.evals))
            .for_each(|(x, y)| x.sub_assign(y));
        Ok(a)
    }

    /// Pointwise product.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        let (mut a, b) = self.aligned(other)?;
        cfg_iter_mut!(a.evals)
            .zip(cfg_iter!(b.evals))
            .for_each(|(x, y)| x.mul_assign(y));
        Ok(a)
    }

    /// Multiply every evaluation by `scalar`.
    pub fn mul_scalar(&self, scalar: &F) -> Self {
        let mut a = self.clone();
        cfg_iter_mut!(a.evals).for_each(|x| x.mul_assign(scalar));
        a
    }

    /// Add `c` to every evaluation.
    pub fn add_constant(&self, c: &F) -> Self {
        let mut a = self.clone();
        cfg_iter_mut!(a.evals).for_each(|x| x.add_assign(c));
        a
    }

    /// Invert every evaluation, failing when one of them is zero.
    pub fn element_wise_inverse(&self) -> Result<Self> {
        let mut a = self.clone();
        batch_inversion(&mut a.evals)?;
        Ok(a)
    }
}

#[cfg(test)]
mod test {
    use super::PolynomialDfs;
    use crate::math::{EvaluationDomain, FpPolynomial};
    use placeholder_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    fn random_dfs(size: usize, degree: usize) -> (FpPolynomial<F>, PolynomialDfs<F>) {
        let mut prng = test_rng();
        let poly = FpPolynomial::random(&mut prng, degree);
        let dfs = PolynomialDfs::from_coefficients(&poly, size).unwrap();
        (poly, dfs)
    }

    #[test]
    fn resize_is_idempotent() {
        let (poly, p) = random_dfs(8, 7);
        let q = p.resize(32).unwrap();
        assert_eq!(q.resize(32).unwrap(), q);
        assert_eq!(q.resize(8).unwrap(), p);
        assert_eq!(q.to_coefficients().unwrap(), poly);
        assert!(p.resize(12).is_err());
    }

    #[test]
    fn shift_rotates() {
        let (poly, p) = random_dfs(8, 7);
        let domain = EvaluationDomain::<F>::new(8).unwrap();
        for k in [-3i32, -1, 1, 2, 9] {
            let s = p.shift(k, 8).unwrap();
            for i in 0..8 {
                let x = domain.element(i).mul(&domain.rotation(k));
                assert_eq!(s.get(i), poly.eval(&x));
            }
            let big = p.resize(32).unwrap().shift(k, 8).unwrap();
            assert_eq!(big, s.resize(32).unwrap());
        }
        assert_eq!(p.shift(0, 8).unwrap(), p);
    }

    #[test]
    fn arithmetic_extends_the_smaller_operand() {
        let mut prng = test_rng();
        let (a_poly, a) = random_dfs(8, 7);
        let b_poly = FpPolynomial::<F>::random(&mut prng, 7);
        let b = PolynomialDfs::from_coefficients(&b_poly, 8).unwrap();

        let prod = a.resize(16).unwrap().mul(&b).unwrap();
        assert_eq!(prod.size(), 16);
        let x = F::random(&mut prng);
        assert_eq!(
            prod.evaluate(&x).unwrap(),
            a_poly.eval(&x).mul(&b_poly.eval(&x))
        );

        let sum = a.add(&b).unwrap();
        assert_eq!(sum.evaluate(&x).unwrap(), a_poly.add(&b_poly).eval(&x));
        let diff = a.sub(&b).unwrap();
        assert_eq!(diff.evaluate(&x).unwrap(), a_poly.sub(&b_poly).eval(&x));

        let two = F::from(2u32);
        assert_eq!(
            a.mul_scalar(&two).add_constant(&F::one()).get(3),
            a.get(3).mul(&two).add(&F::one())
        );

        let inv = a.element_wise_inverse().unwrap();
        assert_eq!(inv.get(5).mul(&a.get(5)), F::one());
        assert!(PolynomialDfs::<F>::zero(4)
            .unwrap()
            .element_wise_inverse()
            .is_err());
    }
}
