use crate::arithmetization::{ColumnCache, PolynomialTable, Variable};
use crate::errors::Result;
use crate::math::PolynomialDfs;
use crate::placeholder::{
    openings::ClaimedValues, preprocessor::PublicPreprocessedData, PERMUTATION_BATCH,
};
use ark_std::{cfg_into_iter, vec::Vec};
use placeholder_algebra::{prelude::*, traits::batch_inversion};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compute the products `Π (c + β·s + γ)` row by row.
fn factors<F: Domain>(
    columns: &[&PolynomialDfs<F>],
    labels: &[PolynomialDfs<F>],
    beta: &F,
    gamma: &F,
    size: usize,
) -> Vec<F> {
    cfg_into_iter!(0..size)
        .map(|i| {
            columns
                .iter()
                .zip(labels.iter())
                .fold(F::one(), |acc, (c, s)| {
                    acc.mul(&c.get(i).add(&beta.mul(&s.get(i))).add(gamma))
                })
        })
        .collect()
}

/// Build the grand product `V_P` on the basic domain.
///
/// `V_P(ω^0) = 1` and every next value multiplies by the identity side over
/// the permutation side of the previous row.
pub(crate) fn permutation_product<F: Domain, H>(
    public: &PublicPreprocessedData<F, H>,
    table: &PolynomialTable<'_, F>,
    beta: &F,
    gamma: &F,
) -> Result<PolynomialDfs<F>> {
    let start = ark_std::start_timer!(|| "Permutation product");
    let n = public.common.desc.rows_amount;
    let columns = public
        .common
        .permuted_columns
        .iter()
        .map(|(t, i)| table.column(*t, *i))
        .collect::<Result<Vec<_>>>()?;

    let g = factors(&columns, public.identity(), beta, gamma, n);
    let mut h = factors(&columns, public.sigma(), beta, gamma, n);
    batch_inversion(&mut h)?;

    let mut v = Vec::with_capacity(n);
    let mut acc = F::one();
    v.push(acc);
    for i in 0..n - 1 {
        acc = acc.mul(&g[i]).mul(&h[i]);
        v.push(acc);
    }
    ark_std::end_timer!(start);
    PolynomialDfs::new(v)
}

/// Compute `F_0 = L_0 (1 - V_P)`, `F_1 = (1 - q_last - q_blind)(V_P(ωx) h - V_P g)`
/// and `F_2 = q_last (V_P^2 - V_P)` on the domain of `cache`.
pub(crate) fn permutation_constraints<F: Domain, H>(
    public: &PublicPreprocessedData<F, H>,
    cache: &mut ColumnCache<'_, F>,
    v_p: &PolynomialDfs<F>,
    beta: &F,
    gamma: &F,
) -> Result<Vec<PolynomialDfs<F>>> {
    let start = ark_std::start_timer!(|| "Permutation constraints");
    let size = cache.size();
    let n = public.common.desc.rows_amount;

    let variables: Vec<Variable> = public
        .common
        .permuted_columns
        .iter()
        .map(|(t, i)| Variable::new(*t, *i, 0))
        .collect();
    for v in variables.iter() {
        cache.ensure(v)?;
    }
    let columns = variables
        .iter()
        .map(|v| cache.get(v))
        .collect::<Result<Vec<_>>>()?;
    let identity = public
        .identity()
        .iter()
        .map(|p| p.resize(size))
        .collect::<Result<Vec<_>>>()?;
    let sigma = public
        .sigma()
        .iter()
        .map(|p| p.resize(size))
        .collect::<Result<Vec<_>>>()?;
    let g = factors(&columns, &identity, beta, gamma, size);
    let h = factors(&columns, &sigma, beta, gamma, size);

    let v = v_p.resize(size)?;
    let v_shifted = v.shift(1, n)?;
    let q_last = public.q_last.resize(size)?;
    let q_blind = public.q_blind.resize(size)?;
    let lagrange_0 = public.lagrange_0.resize(size)?;

    let one = F::one();
    let f0 = cfg_into_iter!(0..size)
        .map(|i| lagrange_0.get(i).mul(&one.sub(&v.get(i))))
        .collect();
    let f1 = cfg_into_iter!(0..size)
        .map(|i| {
            let active = one.sub(&q_last.get(i)).sub(&q_blind.get(i));
            let diff = v_shifted.get(i).mul(&h[i]).sub(&v.get(i).mul(&g[i]));
            active.mul(&diff)
        })
        .collect();
    let f2 = cfg_into_iter!(0..size)
        .map(|i| q_last.get(i).mul(&v.get(i).square().sub(&v.get(i))))
        .collect();
    ark_std::end_timer!(start);
    Ok(vec![
        PolynomialDfs::new(f0)?,
        PolynomialDfs::new(f1)?,
        PolynomialDfs::new(f2)?,
    ])
}

/// Evaluate the three permutation constraints at the evaluation point.
pub(crate) fn evaluate_permutation<F: Domain>(
    values: &ClaimedValues<'_, F>,
    beta: &F,
    gamma: &F,
) -> Result<[F; 3]> {
    let layout = values.layout();
    let common = layout.common;
    let mut g = F::one();
    let mut h = F::one();
    for (j, (t, i)) in common.permuted_columns.iter().enumerate() {
        let c = values.variable(&Variable::new(*t, *i, 0))?;
        let id = values.fixed(layout.identity(j))?;
        let sigma = values.fixed(layout.sigma(j))?;
        g.mul_assign(&c.add(&beta.mul(&id)).add(gamma));
        h.mul_assign(&c.add(&beta.mul(&sigma)).add(gamma));
    }

    let v = values.get(PERMUTATION_BATCH, layout.v_p(), 0)?;
    let v_shifted = values.get(PERMUTATION_BATCH, layout.v_p(), 1)?;
    let q_last = values.q_last()?;
    let q_blind = values.q_blind()?;
    let lagrange_0 = values.lagrange_0_at(0)?;

    let one = F::one();
    Ok([
        lagrange_0.mul(&one.sub(&v)),
        one.sub(&q_last)
            .sub(&q_blind)
            .mul(&v_shifted.mul(&h).sub(&v.mul(&g))),
        q_last.mul(&v.square().sub(&v)),
    ])
}

#[cfg(test)]
mod test {
    use super::{permutation_constraints, permutation_product};
    use crate::arithmetization::{
        AssignmentTable, ColumnCache, ColumnType, ConstraintSystem, CopyConstraint,
        TableDescription, Variable,
    };
    use crate::commitment::hash::Sha256Hash;
    use crate::placeholder::{
        params::PlaceholderParams,
        preprocessor::{preprocess_private, preprocess_public},
    };
    use placeholder_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    #[test]
    fn product_closes_on_satisfied_copies() {
        let desc = TableDescription::new(2, 0, 0, 0, 7, 8).unwrap();
        let cs = ConstraintSystem::<F>::new(
            vec![],
            vec![
                CopyConstraint::new(
                    Variable::absolute(ColumnType::Witness, 0, 1),
                    Variable::absolute(ColumnType::Witness, 1, 4),
                ),
                CopyConstraint::new(
                    Variable::absolute(ColumnType::Witness, 0, 2),
                    Variable::absolute(ColumnType::Witness, 0, 5),
                ),
            ],
            vec![],
            vec![],
        );
        let mut prng = seeded_rng(3);
        let mut w0: Vec<F> = (0..7).map(|_| F::random(&mut prng)).collect();
        let mut w1: Vec<F> = (0..7).map(|_| F::random(&mut prng)).collect();
        w1[4] = w0[1];
        w0[5] = w0[2];
        let mut table =
            AssignmentTable::new(desc, vec![w0, w1], vec![], vec![], vec![]).unwrap();
        cs.verify_assignment(&table).unwrap();
        table.randomize_padding(&mut prng);

        let params = PlaceholderParams::for_table(&desc, 4, 2, 0).unwrap();
        let public = preprocess_public::<F, Sha256Hash>(&cs, &table, &params).unwrap();
        let private = preprocess_private(&table).unwrap();
        let polys = public.polynomial_table(&private);

        let beta = F::random(&mut prng);
        let gamma = F::random(&mut prng);
        let v = permutation_product(&public, &polys, &beta, &gamma).unwrap();
        assert_eq!(v.get(0), F::one());
        assert_eq!(v.get(6), F::one());

        let mut cache = ColumnCache::new(polys, 32);
        let constraints = permutation_constraints(&public, &mut cache, &v, &beta, &gamma).unwrap();
        for f in constraints.iter() {
            let base = f.resize(8).unwrap();
            assert!(base.evals().iter().all(|x| x.is_zero()));
        }
    }
}
