use crate::arithmetization::{
    ColumnCache, ConstraintSystem, Expression, Gate, PolynomialTable, Selector, SpecialSelector,
    Variable,
};
use crate::errors::Result;
use crate::math::PolynomialDfs;
use crate::placeholder::openings::ClaimedValues;
use ark_std::vec::Vec;
use placeholder_algebra::prelude::*;

/// Gates of degree at most this bound are evaluated on the doubled domain.
const LOW_DEGREE_BOUND: usize = 2;

/// `selector · Σ_c θ^k c`, where `theta_power` holds `θ^k` for the first
/// constraint and is advanced past the last one.
fn gate_expression<F: Scalar>(gate: &Gate<F>, theta: &F, theta_power: &mut F) -> Expression<F> {
    let mut sum = Expression::Constant(F::zero());
    for c in gate.constraints.iter() {
        sum = sum + Expression::Constant(*theta_power) * c.clone();
        theta_power.mul_assign(theta);
    }
    match gate.selector {
        Selector::Special(SpecialSelector::AllRows) => sum,
        s => Expression::from(s.variable()) * sum,
    }
}

/// Split the gates into a low-degree and a high-degree combined expression,
/// returned with the domain factor each one is evaluated on.
///
/// The constraints take the powers of `θ` from `theta_power` on, and
/// `theta_power` is left at the first power the lookup argument uses.
fn gates_buckets<F: Scalar>(
    cs: &ConstraintSystem<F>,
    theta: &F,
    theta_power: &mut F,
) -> Vec<(Expression<F>, usize)> {
    let mut low: Option<Expression<F>> = None;
    let mut high: Option<Expression<F>> = None;
    let mut high_degree = 0;
    for gate in cs.gates().iter() {
        let e = gate_expression(gate, theta, theta_power);
        let (bucket, degree) = if gate.degree() <= LOW_DEGREE_BOUND {
            (&mut low, 0)
        } else {
            (&mut high, gate.degree())
        };
        high_degree = high_degree.max(degree);
        *bucket = Some(match bucket.take() {
            Some(acc) => acc + e,
            None => e,
        });
    }
    let mut buckets = Vec::new();
    if let Some(e) = low {
        buckets.push((e, LOW_DEGREE_BOUND));
    }
    if let Some(e) = high {
        buckets.push((e, high_degree.next_power_of_two()));
    }
    buckets
}

/// Evaluate the combined gates constraint on a domain of `size` points.
pub(crate) fn gates_constraint<F: Domain>(
    cs: &ConstraintSystem<F>,
    table: PolynomialTable<'_, F>,
    theta: &F,
    theta_power: &mut F,
    size: usize,
) -> Result<PolynomialDfs<F>> {
    let start = ark_std::start_timer!(|| "Gates constraint");
    let n = table.rows_amount();
    let mut res = PolynomialDfs::zero(size)?;
    for (expr, factor) in gates_buckets(cs, theta, theta_power) {
        let mut cache = ColumnCache::new(table, n * factor);
        let bucket = cache.evaluate(&expr)?;
        res = res.add(&bucket.resize(size)?)?;
    }
    ark_std::end_timer!(start);
    Ok(res)
}

/// Evaluate the combined gates constraint at the evaluation point.
pub(crate) fn evaluate_gates<F: Domain>(
    cs: &ConstraintSystem<F>,
    values: &ClaimedValues<'_, F>,
    theta: &F,
    theta_power: &mut F,
) -> Result<F> {
    let env = |v: &Variable| values.variable(v);
    let mut res = F::zero();
    for (expr, _) in gates_buckets(cs, theta, theta_power) {
        res.add_assign(&expr.evaluate(&env)?);
    }
    Ok(res)
}
