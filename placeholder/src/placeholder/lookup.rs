use crate::arithmetization::{
    AssignmentTable, ColumnCache, ConstraintSystem, Expression, Selector, Variable,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::PolynomialDfs;
use crate::placeholder::{
    openings::ClaimedValues, preprocessor::PublicPreprocessedData, LOOKUP_BATCH,
    PERMUTATION_BATCH,
};
use ark_std::{cfg_into_iter, collections::HashMap, vec::Vec};
use placeholder_algebra::{prelude::*, traits::batch_inversion};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A looked-up tuple together with the selector of its lookup gate.
struct Input<'a, F> {
    selector: Selector,
    table_id: usize,
    values: &'a [Expression<F>],
}

/// One option of a lookup table together with the selector of the table.
struct TableOption<'a> {
    selector: Selector,
    table_id: usize,
    columns: &'a [Variable],
}

/// The polynomials the prover commits to for the lookup argument.
pub(crate) struct LookupPolys<F> {
    /// The multiplicity of every option, row by row.
    pub(crate) counts: Vec<PolynomialDfs<F>>,
    /// `h_i = s_i / (β + c_i)` for every input.
    pub(crate) h: Vec<PolynomialDfs<F>>,
    /// `g_t = m_t sel_t / (β + c_t)` for every option.
    pub(crate) g: Vec<PolynomialDfs<F>>,
    /// The running sum of `Σ h - Σ g`: `U(ω^0) = 0` and row `i + 1` adds
    /// row `i`, so the sum over every usable row sits on the `q_last` row.
    pub(crate) u: PolynomialDfs<F>,
}

/// The logarithmic derivative lookup argument.
///
/// For the challenge `β`, the argument shows that on the usable rows
/// `Σ_i s_i / (β + c_i) = Σ_t m_t sel_t / (β + c_t)`, where `c` compresses a
/// tuple and its table index with the challenge `κ`.
pub(crate) struct LookupArgument<'a, F> {
    inputs: Vec<Input<'a, F>>,
    options: Vec<TableOption<'a>>,
}

/// Compress a tuple of the table `table_id` into one field element.
pub(crate) fn compress<F: Scalar>(values: &[F], table_id: usize, kappa: &F) -> F {
    let mut acc = F::zero();
    let mut power = F::one();
    for v in values.iter() {
        acc.add_assign(&v.mul(&power));
        power.mul_assign(kappa);
    }
    acc.add(&power.mul(&F::from(table_id as u64 + 1)))
}

fn column<F: Domain>(cache: &mut ColumnCache<'_, F>, var: &Variable) -> Result<PolynomialDfs<F>> {
    cache.ensure(var)?;
    Ok(cache.get(var)?.clone())
}

fn compress_columns<F: Domain>(
    columns: &[PolynomialDfs<F>],
    table_id: usize,
    kappa: &F,
    size: usize,
) -> Result<PolynomialDfs<F>> {
    let evals = cfg_into_iter!(0..size)
        .map(|i| {
            let row: Vec<F> = columns.iter().map(|c| c.get(i)).collect();
            compress(&row, table_id, kappa)
        })
        .collect();
    PolynomialDfs::new(evals)
}

impl<'a, F: Domain> LookupArgument<'a, F> {
    pub(crate) fn new(cs: &'a ConstraintSystem<F>) -> Self {
        let inputs = cs
            .lookup_gates()
            .iter()
            .flat_map(|g| {
                g.inputs.iter().map(move |i| Input {
                    selector: g.selector,
                    table_id: i.table_id,
                    values: &i.values,
                })
            })
            .collect();
        let options = cs
            .lookup_tables()
            .iter()
            .enumerate()
            .flat_map(|(table_id, t)| {
                t.options.iter().map(move |o| TableOption {
                    selector: t.selector,
                    table_id,
                    columns: o,
                })
            })
            .collect();
        Self { inputs, options }
    }

    /// Count how many times every table row is looked up.
    ///
    /// Equal rows of a table are told apart by taking the first option and
    /// the first row holding the tuple.
    pub(crate) fn counts(&self, table: &AssignmentTable<F>) -> Result<Vec<PolynomialDfs<F>>> {
        let start = ark_std::start_timer!(|| "Lookup multiplicities");
        let desc = table.desc();
        let usable = desc.usable_rows;

        let mut positions: HashMap<(usize, Vec<Vec<u8>>), (usize, usize)> = HashMap::new();
        for (o, option) in self.options.iter().enumerate() {
            let selector = option.selector.variable();
            for row in 0..usable {
                if table.value(&selector, row)?.is_zero() {
                    continue;
                }
                let tuple = option
                    .columns
                    .iter()
                    .map(|v| table.value(v, row).map(|x| x.to_bytes()))
                    .collect::<Result<Vec<_>>>()?;
                positions.entry((option.table_id, tuple)).or_insert((o, row));
            }
        }

        let mut counts = vec![vec![F::zero(); desc.rows_amount]; self.options.len()];
        for input in self.inputs.iter() {
            let selector = input.selector.variable();
            for row in 0..usable {
                let s = table.value(&selector, row)?;
                if s.is_zero() {
                    continue;
                }
                let env = |v: &Variable| table.value(v, row);
                let tuple = input
                    .values
                    .iter()
                    .map(|e| e.evaluate(&env).map(|x| x.to_bytes()))
                    .collect::<Result<Vec<_>>>()?;
                let (o, r) = *positions
                    .get(&(input.table_id, tuple))
                    .ok_or(PlaceholderError::LookupTableMissing)?;
                let enabled = table.value(&self.options[o].selector.variable(), r)?;
                counts[o][r].add_assign(&s.mul(&enabled.inv()?));
            }
        }
        ark_std::end_timer!(start);
        counts.into_iter().map(PolynomialDfs::new).collect()
    }

    /// Build `h`, `g` and the running sum `U` on the basic domain.
    pub(crate) fn auxiliary_polys(
        &self,
        cache: &mut ColumnCache<'_, F>,
        counts: Vec<PolynomialDfs<F>>,
        usable_rows: usize,
        kappa: &F,
        beta: &F,
    ) -> Result<LookupPolys<F>> {
        let start = ark_std::start_timer!(|| "Lookup auxiliary polynomials");
        let n = cache.size();

        let mut h = Vec::with_capacity(self.inputs.len());
        for input in self.inputs.iter() {
            let values = input
                .values
                .iter()
                .map(|e| cache.evaluate(e))
                .collect::<Result<Vec<_>>>()?;
            let mut denominators = compress_columns(&values, input.table_id, kappa, n)?
                .add_constant(beta)
                .into_evals();
            batch_inversion(&mut denominators)?;
            let s = column(cache, &input.selector.variable())?;
            h.push(PolynomialDfs::new(denominators)?.mul(&s)?);
        }

        let mut g = Vec::with_capacity(self.options.len());
        for (option, m) in self.options.iter().zip(counts.iter()) {
            let columns = option
                .columns
                .iter()
                .map(|v| column(cache, v))
                .collect::<Result<Vec<_>>>()?;
            let mut denominators = compress_columns(&columns, option.table_id, kappa, n)?
                .add_constant(beta)
                .into_evals();
            batch_inversion(&mut denominators)?;
            let sel = column(cache, &option.selector.variable())?;
            g.push(PolynomialDfs::new(denominators)?.mul(&sel)?.mul(m)?);
        }

        let sum = self.sum(&h, &g, n)?;
        let mut u = vec![F::zero(); n];
        for i in 0..usable_rows.min(n - 1) {
            u[i + 1] = u[i].add(&sum.get(i));
        }
        ark_std::end_timer!(start);
        Ok(LookupPolys {
            counts,
            h,
            g,
            u: PolynomialDfs::new(u)?,
        })
    }

    fn sum(
        &self,
        h: &[PolynomialDfs<F>],
        g: &[PolynomialDfs<F>],
        size: usize,
    ) -> Result<PolynomialDfs<F>> {
        let mut sum = PolynomialDfs::zero(size)?;
        for p in h.iter() {
            sum = sum.add(&p.resize(size)?)?;
        }
        for p in g.iter() {
            sum = sum.sub(&p.resize(size)?)?;
        }
        Ok(sum)
    }

    /// Compute the four lookup constraints on the domain of `cache`:
    /// the combined fraction checks, `L_0 U`, `q_last U` and
    /// `(1 - q_last - q_blind)(U(ωx) - U - S)` with `S = Σ h - Σ g`.
    ///
    /// The fraction checks are combined with the powers of `θ` from
    /// `theta_power` on, continuing where the gates stopped.
    pub(crate) fn constraints<H>(
        &self,
        public: &PublicPreprocessedData<F, H>,
        cache: &mut ColumnCache<'_, F>,
        polys: &LookupPolys<F>,
        kappa: &F,
        beta: &F,
        theta: &F,
        theta_power: &mut F,
    ) -> Result<Vec<PolynomialDfs<F>>> {
        let start = ark_std::start_timer!(|| "Lookup constraints");
        let size = cache.size();
        let n = public.common.desc.rows_amount;

        let mut fractions = PolynomialDfs::zero(size)?;
        for (input, h) in self.inputs.iter().zip(polys.h.iter()) {
            let values = input
                .values
                .iter()
                .map(|e| cache.evaluate(e))
                .collect::<Result<Vec<_>>>()?;
            let c = compress_columns(&values, input.table_id, kappa, size)?;
            let s = column(cache, &input.selector.variable())?;
            let term = h.resize(size)?.mul(&c.add_constant(beta))?.sub(&s)?;
            fractions = fractions.add(&term.mul_scalar(theta_power))?;
            theta_power.mul_assign(theta);
        }
        for ((option, g), m) in self
            .options
            .iter()
            .zip(polys.g.iter())
            .zip(polys.counts.iter())
        {
            let columns = option
                .columns
                .iter()
                .map(|v| column(cache, v))
                .collect::<Result<Vec<_>>>()?;
            let c = compress_columns(&columns, option.table_id, kappa, size)?;
            let sel = column(cache, &option.selector.variable())?;
            let term = g
                .resize(size)?
                .mul(&c.add_constant(beta))?
                .sub(&m.resize(size)?.mul(&sel)?)?;
            fractions = fractions.add(&term.mul_scalar(theta_power))?;
            theta_power.mul_assign(theta);
        }

        let sum = self.sum(&polys.h, &polys.g, size)?;
        let u = polys.u.resize(size)?;
        let u_shifted = u.shift(1, n)?;
        let q_last = public.q_last.resize(size)?;
        let q_blind = public.q_blind.resize(size)?;
        let lagrange_0 = public.lagrange_0.resize(size)?;

        let first = lagrange_0.mul(&u)?;
        let last = q_last.mul(&u)?;
        let active = PolynomialDfs::constant(F::one(), size)?
            .sub(&q_last)?
            .sub(&q_blind)?;
        let step = active.mul(&u_shifted.sub(&u)?.sub(&sum)?)?;
        ark_std::end_timer!(start);
        Ok(vec![fractions, first, last, step])
    }

    /// Evaluate the four lookup constraints at the evaluation point.
    pub(crate) fn evaluate(
        &self,
        values: &ClaimedValues<'_, F>,
        kappa: &F,
        beta: &F,
        theta: &F,
        theta_power: &mut F,
    ) -> Result<[F; 4]> {
        let layout = values.layout();
        let env = |v: &Variable| values.variable(v);

        let mut fractions = F::zero();
        let mut sum = F::zero();
        for (i, input) in self.inputs.iter().enumerate() {
            let h = values.get(PERMUTATION_BATCH, layout.lookup_input(i), 0)?;
            let tuple = input
                .values
                .iter()
                .map(|e| e.evaluate(&env))
                .collect::<Result<Vec<_>>>()?;
            let c = compress(&tuple, input.table_id, kappa);
            let s = values.selector(&input.selector)?;
            fractions.add_assign(&h.mul(&beta.add(&c)).sub(&s).mul(&*theta_power));
            sum.add_assign(&h);
            theta_power.mul_assign(theta);
        }
        for (t, option) in self.options.iter().enumerate() {
            let g = values.get(PERMUTATION_BATCH, layout.lookup_option(t), 0)?;
            let m = values.get(LOOKUP_BATCH, t, 0)?;
            let tuple = option
                .columns
                .iter()
                .map(|v| values.variable(v))
                .collect::<Result<Vec<_>>>()?;
            let c = compress(&tuple, option.table_id, kappa);
            let sel = values.selector(&option.selector)?;
            fractions.add_assign(&g.mul(&beta.add(&c)).sub(&m.mul(&sel)).mul(&*theta_power));
            sum.sub_assign(&g);
            theta_power.mul_assign(theta);
        }

        let u = values.get(PERMUTATION_BATCH, layout.lookup_sum(), 0)?;
        let u_shifted = values.get(PERMUTATION_BATCH, layout.lookup_sum(), 1)?;
        let q_last = values.q_last()?;
        let q_blind = values.q_blind()?;
        let lagrange_0 = values.lagrange_0_at(0)?;
        Ok([
            fractions,
            lagrange_0.mul(&u),
            q_last.mul(&u),
            F::one()
                .sub(&q_last)
                .sub(&q_blind)
                .mul(&u_shifted.sub(&u).sub(&sum)),
        ])
    }
}
