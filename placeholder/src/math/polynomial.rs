use crate::errors::{PlaceholderError, Result};
use crate::math::domain::EvaluationDomain;
use ark_std::vec::Vec;
use placeholder_algebra::prelude::*;

/// Field polynomial in coefficient form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpPolynomial<F> {
    /// Coefficients of the polynomial, low-order coefficient first.
    pub coefs: Vec<F>,
}

impl<F: Scalar> FpPolynomial<F> {
    /// Return the polynomial coefs reference.
    pub fn get_coefs_ref(&self) -> &[F] {
        self.coefs.as_slice()
    }

    /// Return the constant zero polynomial
    /// # Example
    /// ```
    /// use placeholder_plonk::math::FpPolynomial;
    /// use placeholder_algebra::{bn254::BN254Scalar, Zero, One};
    /// let poly = FpPolynomial::<BN254Scalar>::zero();
    /// let zero = BN254Scalar::zero();
    /// assert_eq!(poly.degree(), 0);
    /// assert_eq!(poly.eval(&zero), zero);
    /// assert_eq!(poly.eval(&BN254Scalar::one()), zero);
    /// ```
    pub fn zero() -> Self {
        Self::from_coefs(vec![F::zero()])
    }

    /// Return the constant one polynomial
    pub fn one() -> Self {
        Self::from_coefs(vec![F::one()])
    }

    /// Build a polynomial from the coefficient vector, low-order coefficient first.
    /// High-order zero coefficient are trimmed.
    /// # Example
    /// ```
    /// use placeholder_plonk::math::FpPolynomial;
    /// use placeholder_algebra::{bn254::BN254Scalar, Zero, One, ops::*};
    /// let zero = BN254Scalar::zero();
    /// let one = BN254Scalar::one();
    /// let two = one.add(&one);
    /// let five = two.add(&two).add(&one);
    /// let poly = FpPolynomial::from_coefs(vec![one, zero, one]);
    /// assert_eq!(poly.degree(), 2);
    /// assert_eq!(poly.eval(&two), five);
    /// let poly2 = FpPolynomial::from_coefs(vec![one, zero, one, zero, zero]);
    /// assert_eq!(poly, poly2);
    /// ```
    pub fn from_coefs(coefs: Vec<F>) -> Self {
        let mut p = FpPolynomial { coefs };
        p.trim_coefs();
        p
    }

    /// Build a polynomial from its zeroes/roots.
    pub fn from_zeroes(zeroes: &[F]) -> Self {
        let mut r = Self::one();
        for root in zeroes.iter() {
            let mut p = r.clone();
            r.coefs.insert(0, F::zero()); // multiply by X
            p.mul_scalar_assign(root); // x_0 * r
            r.sub_assign(&p); // r = r * (X - x_0)
        }
        r.trim_coefs();
        r
    }

    /// Return a polynomial of `degree` + 1 uniformly random coefficients.
    pub fn random<R: CryptoRng + RngCore>(prng: &mut R, degree: usize) -> FpPolynomial<F> {
        let coefs = (0..degree + 1).map(|_| F::random(prng)).collect();
        Self::from_coefs(coefs)
    }

    /// Remove high degree zero-coefficients
    fn trim_coefs(&mut self) {
        while self.coefs.len() > 1 && self.coefs.last().map_or(false, |c| c.is_zero()) {
            self.coefs.pop();
        }
        if self.coefs.is_empty() {
            self.coefs.push(F::zero());
        }
    }

    /// Return degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefs.len().saturating_sub(1)
    }

    /// Return the number of stored coefficients, i.e. `degree + 1`.
    pub fn len(&self) -> usize {
        self.coefs.len()
    }

    /// Test if polynomial is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.degree() == 0 && self.coefs[0].is_zero()
    }

    /// Evaluate a polynomial on a point.
    pub fn eval(&self, point: &F) -> F {
        let mut result = F::zero();
        for coef in self.coefs.iter().rev() {
            result.mul_assign(point);
            result.add_assign(coef);
        }
        result
    }

    /// Add another polynomial to self.
    pub fn add_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            self_coef.add_assign(other_coef);
        }
        self.trim_coefs();
    }

    /// Add with another polynomial, producing a new polynomial.
    pub fn add(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.add_assign(other);
        new
    }

    /// Subtract another polynomial from self.
    pub fn sub_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            self_coef.sub_assign(other_coef);
        }
        self.trim_coefs();
    }

    /// Subtract another polynomial, producing a new polynomial.
    pub fn sub(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.sub_assign(other);
        new
    }

    /// Add `coef` to the coefficient of `x^order`.
    pub fn add_coef_assign(&mut self, coef: &F, order: usize) {
        if self.coefs.len() <= order {
            self.coefs.resize(order + 1, F::zero());
        }
        self.coefs[order].add_assign(coef);
        self.trim_coefs();
    }

    /// Multiply self by a scalar.
    pub fn mul_scalar_assign(&mut self, scalar: &F) {
        for coef in self.coefs.iter_mut() {
            coef.mul_assign(scalar);
        }
        self.trim_coefs();
    }

    /// Multiply by a scalar, producing a new polynomial.
    pub fn mul_scalar(&self, scalar: &F) -> Self {
        let mut new = self.clone();
        new.mul_scalar_assign(scalar);
        new
    }

    /// Replace `p(x)` by `p(k·x)`.
    pub fn mul_var_assign(&mut self, k: &F) {
        let mut pow = F::one();
        for coef in self.coefs.iter_mut() {
            coef.mul_assign(&pow);
            pow.mul_assign(k);
        }
    }

    /// Return `p(k·x)`.
    pub fn mul_var(&self, k: &F) -> Self {
        let mut new = self.clone();
        new.mul_var_assign(k);
        new
    }

    /// Divide by `x - point`, returning the quotient and the remainder `p(point)`.
    pub fn divide_by_linear(&self, point: &F) -> (Self, F) {
        let n = self.coefs.len();
        if n == 1 {
            return (Self::zero(), self.coefs[0]);
        }
        let mut quo = vec![F::zero(); n - 1];
        let mut acc = F::zero();
        for i in (0..n).rev() {
            acc = acc.mul(point).add(&self.coefs[i]);
            if i > 0 {
                quo[i - 1] = acc;
            }
        }
        (Self::from_coefs(quo), acc)
    }

    /// Divide by `x^n - 1`, failing when the division leaves a remainder.
    pub fn divide_by_vanishing(&self, n: usize) -> Result<Self> {
        let len = self.coefs.len();
        if len <= n {
            return if self.is_zero() {
                Ok(Self::zero())
            } else {
                Err(PlaceholderError::QuotientNotDivisible)
            };
        }
        // p = q·(x^n - 1) means q_i = p_{i+n} + q_{i+n}, and p_i = -q_i for i < n
        let mut quo = vec![F::zero(); len - n];
        for i in (0..len - n).rev() {
            let mut q = self.coefs[i + n];
            if i + n < quo.len() {
                q.add_assign(&quo[i + n]);
            }
            quo[i] = q;
        }
        for i in 0..n {
            let q = if i < quo.len() { quo[i] } else { F::zero() };
            if self.coefs[i].add(&q) != F::zero() {
                return Err(PlaceholderError::QuotientNotDivisible);
            }
        }
        Ok(Self::from_coefs(quo))
    }

    /// Split into chunks of `chunk_size` coefficients, padding with zero polynomials
    /// so that exactly `count` chunks are returned.
    pub fn split(&self, chunk_size: usize, count: usize) -> Result<Vec<Self>> {
        if chunk_size == 0 || self.coefs.len() > chunk_size * count.max(1) && !self.is_zero() {
            return Err(PlaceholderError::TooManyQuotientChunks);
        }
        let mut chunks: Vec<Self> = self
            .coefs
            .chunks(chunk_size)
            .map(|c| Self::from_coefs(c.to_vec()))
            .collect();
        chunks.resize(count, Self::zero());
        Ok(chunks)
    }

    /// Compute the evaluations on `domain`.
    pub fn fft_with_domain(&self, domain: &EvaluationDomain<F>) -> Result<Vec<F>>
    where
        F: Domain,
    {
        domain.fft(&self.coefs)
    }

    /// Compute the evaluations on the coset `offset · domain`.
    pub fn coset_fft_with_domain(&self, domain: &EvaluationDomain<F>, offset: &F) -> Result<Vec<F>>
    where
        F: Domain,
    {
        domain.coset_fft(&self.coefs, offset)
    }

    /// Interpolate the evaluations on `domain`.
    pub fn ifft_with_domain(domain: &EvaluationDomain<F>, values: &[F]) -> Result<Self>
    where
        F: Domain,
    {
        Ok(Self::from_coefs(domain.ifft(values)?))
    }
}
