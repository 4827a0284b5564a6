use crate::arithmetization::{
    AssignmentTable, ColumnType, ColumnsRotations, ConstraintSystem, PolynomialTable,
    SpecialSelector, TableDescription,
};
use crate::commitment::{
    hash::{Hash, HashOutput},
    lpc::CommittedBatch,
};
use crate::errors::{PlaceholderError, Result};
use crate::math::{EvaluationDomain, FpPolynomial, PolynomialDfs};
use crate::placeholder::params::{PlaceholderField, PlaceholderParams};
use crate::utils::DisjointSet;
use ark_std::{sync::Arc, vec::Vec};
use placeholder_algebra::prelude::*;

/// The preprocessed data a verifier needs, shared by every proof of a circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonData<F> {
    /// The shape of the table.
    pub desc: TableDescription,
    /// The root of the fixed batch.
    pub fixed_root: HashOutput,
    /// The digest of the constraint system.
    pub cs_digest: HashOutput,
    /// The rotations used on every column.
    pub columns_rotations: ColumnsRotations,
    /// The columns bound by copy constraints.
    pub permuted_columns: Vec<(ColumnType, usize)>,
    /// The number of checked rows of every public input column.
    pub public_input_sizes: Vec<usize>,
    /// The number of lookup inputs, over all lookup gates.
    pub lookup_inputs: usize,
    /// The number of lookup table options, over all lookup tables.
    pub lookup_options: usize,
    /// The number of quotient chunks.
    pub quotient_chunks: usize,
    /// The factor `D` bounding the degree of the constraints by `D · n`.
    pub quotient_degree_factor: usize,
    /// The identifier of the hash the fixed batch is committed with.
    pub hash_id: u8,
    /// The generator of the basic domain.
    pub omega: F,
}

impl<F: Scalar> CommonData<F> {
    /// Whether the proof carries a permutation argument.
    pub fn has_permutation(&self) -> bool {
        !self.permuted_columns.is_empty()
    }

    /// Whether the proof carries a lookup argument.
    pub fn has_lookups(&self) -> bool {
        self.lookup_inputs > 0
    }
}

/// The preprocessed data of a circuit, as used by the prover.
pub struct PublicPreprocessedData<F, H> {
    /// The data shared with the verifier.
    pub common: CommonData<F>,
    pub(crate) identity: Vec<PolynomialDfs<F>>,
    pub(crate) sigma: Vec<PolynomialDfs<F>>,
    pub(crate) q_last: PolynomialDfs<F>,
    pub(crate) q_blind: PolynomialDfs<F>,
    pub(crate) lagrange_0: PolynomialDfs<F>,
    pub(crate) constants: Vec<PolynomialDfs<F>>,
    pub(crate) selectors: Vec<PolynomialDfs<F>>,
    pub(crate) special_selectors: Vec<PolynomialDfs<F>>,
    pub(crate) fixed_batch: Arc<CommittedBatch<F, H>>,
}

/// The witness and public input columns of one assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivatePreprocessedData<F> {
    /// The witness columns.
    pub witnesses: Vec<PolynomialDfs<F>>,
    /// The public input columns.
    pub public_inputs: Vec<PolynomialDfs<F>>,
}

impl<F: Domain, H> PublicPreprocessedData<F, H> {
    /// The columns of the table, with the private columns of `private`.
    pub fn polynomial_table<'a>(
        &'a self,
        private: &'a PrivatePreprocessedData<F>,
    ) -> PolynomialTable<'a, F> {
        PolynomialTable {
            witnesses: &private.witnesses,
            public_inputs: &private.public_inputs,
            constants: &self.constants,
            selectors: &self.selectors,
            special_selectors: &self.special_selectors,
        }
    }

    /// The identity labels of the permuted columns.
    pub fn identity(&self) -> &[PolynomialDfs<F>] {
        &self.identity
    }

    /// The permutation labels of the permuted columns.
    pub fn sigma(&self) -> &[PolynomialDfs<F>] {
        &self.sigma
    }
}

fn indicator<F: Domain>(size: usize, rows: impl Iterator<Item = usize>) -> Result<PolynomialDfs<F>> {
    let mut evals = vec![F::zero(); size];
    for row in rows {
        evals[row] = F::one();
    }
    PolynomialDfs::new(evals)
}

fn fixed_column<F: Domain>(column: &[F], usable_rows: usize) -> Result<PolynomialDfs<F>> {
    let mut evals = column.to_vec();
    for cell in evals.iter_mut().skip(usable_rows) {
        *cell = F::zero();
    }
    PolynomialDfs::new(evals)
}

/// Return `(S_id, S_σ)` for the permuted columns, in the order of
/// [`ConstraintSystem::permuted_columns`].
///
/// The cell on row `i` of the `j`-th permuted column is labelled `j · n + i`;
/// `S_σ` sends every cell to the label of the next cell of its copy orbit.
pub(crate) fn permutation_polynomials<F: Domain>(
    cs: &ConstraintSystem<F>,
    desc: &TableDescription,
) -> Result<(Vec<PolynomialDfs<F>>, Vec<PolynomialDfs<F>>)> {
    let n = desc.rows_amount;
    let permuted = cs.permuted_columns();
    let m = permuted.len();
    let position = |t: ColumnType, index: usize| -> Result<usize> {
        permuted
            .binary_search(&(t, index))
            .map_err(|_| PlaceholderError::ColumnOutOfRange)
    };

    let mut cells = DisjointSet::new(n * m);
    for c in cs.copy_constraints().iter().filter(|c| c.first != c.second) {
        let a_row = c.first.row().ok_or(PlaceholderError::ColumnOutOfRange)?;
        let b_row = c.second.row().ok_or(PlaceholderError::ColumnOutOfRange)?;
        let a = a_row * m + position(c.first.column_type, c.first.index)?;
        let b = b_row * m + position(c.second.column_type, c.second.index)?;
        cells.union(a, b);
    }
    let next = cells.cycles();

    let label = |flat: usize| F::from(((flat % m) * n + flat / m) as u64);
    let mut identity = Vec::with_capacity(m);
    let mut sigma = Vec::with_capacity(m);
    for j in 0..m {
        identity.push(PolynomialDfs::new(
            (0..n).map(|i| F::from((j * n + i) as u64)).collect(),
        )?);
        sigma.push(PolynomialDfs::new(
            (0..n).map(|i| label(next[i * m + j])).collect(),
        )?);
    }
    Ok((identity, sigma))
}

/// Preprocess the fixed part of a circuit: the permutation, the boundary
/// selectors and the constant and selector columns of `table`, committed
/// into the fixed batch.
///
/// Only the constant and selector columns of `table` are read; they are
/// cleared on the padding rows.
pub fn preprocess_public<F: PlaceholderField, H: Hash>(
    cs: &ConstraintSystem<F>,
    table: &AssignmentTable<F>,
    params: &PlaceholderParams<F>,
) -> Result<PublicPreprocessedData<F, H>> {
    let start = ark_std::start_timer!(|| "Placeholder public preprocessing");
    let desc = *table.desc();
    cs.validate(&desc)?;
    params.check(cs, &desc)?;
    let n = desc.rows_amount;
    let usable = desc.usable_rows;
    let domain = EvaluationDomain::<F>::new(n)?;

    let (identity, sigma) = permutation_polynomials(cs, &desc)?;

    let q_last = indicator(n, ark_std::iter::once(usable))?;
    let q_blind = indicator(n, usable + 1..n)?;
    let lagrange_0 = indicator(n, ark_std::iter::once(0))?;
    let special_selectors = SpecialSelector::ALL
        .iter()
        .map(|s| match s {
            SpecialSelector::AllUsableRows => indicator(n, 0..usable),
            SpecialSelector::AllNonFirstUsableRows => indicator(n, 1..usable),
            SpecialSelector::AllRows => PolynomialDfs::constant(F::one(), n),
        })
        .collect::<Result<Vec<_>>>()?;

    let constants = table
        .constants()
        .iter()
        .map(|c| fixed_column(c, usable))
        .collect::<Result<Vec<_>>>()?;
    let selectors = table
        .selectors()
        .iter()
        .map(|c| fixed_column(c, usable))
        .collect::<Result<Vec<_>>>()?;

    let fixed_polys = identity
        .iter()
        .chain(sigma.iter())
        .chain([&q_last, &q_blind])
        .chain(constants.iter())
        .chain(selectors.iter())
        .map(|p| p.to_coefficients())
        .collect::<Result<Vec<FpPolynomial<F>>>>()?;
    let fixed_batch = Arc::new(CommittedBatch::<F, H>::commit(fixed_polys, &params.fri)?);

    let (lookup_inputs, lookup_options) = if cs.has_lookups() {
        (
            cs.lookup_gates().iter().map(|g| g.inputs.len()).sum(),
            cs.lookup_tables().iter().map(|t| t.options.len()).sum(),
        )
    } else {
        (0, 0)
    };

    let common = CommonData {
        desc,
        fixed_root: fixed_batch.root(),
        cs_digest: cs.digest::<H>()?,
        columns_rotations: cs.columns_rotations(&desc)?,
        permuted_columns: cs.permuted_columns(),
        public_input_sizes: cs.public_input_sizes(&desc),
        lookup_inputs,
        lookup_options,
        quotient_chunks: cs.quotient_chunks(),
        quotient_degree_factor: cs.quotient_degree_factor(),
        hash_id: H::ID,
        omega: domain.generator(),
    };
    ark_std::end_timer!(start);

    Ok(PublicPreprocessedData {
        common,
        identity,
        sigma,
        q_last,
        q_blind,
        lagrange_0,
        constants,
        selectors,
        special_selectors,
        fixed_batch,
    })
}

/// Turn the witness and public input columns of an assignment into polynomials.
pub fn preprocess_private<F: Domain>(table: &AssignmentTable<F>) -> Result<PrivatePreprocessedData<F>> {
    let to_dfs = |columns: &[Vec<F>]| {
        columns
            .iter()
            .map(|c| PolynomialDfs::new(c.clone()))
            .collect::<Result<Vec<_>>>()
    };
    Ok(PrivatePreprocessedData {
        witnesses: to_dfs(table.witnesses())?,
        public_inputs: to_dfs(table.public_inputs())?,
    })
}

#[cfg(test)]
mod test {
    use super::{permutation_polynomials, preprocess_private, preprocess_public};
    use crate::arithmetization::{
        AssignmentTable, ColumnType, ConstraintSystem, CopyConstraint, TableDescription, Variable,
    };
    use crate::commitment::hash::{Keccak256Hash, Sha256Hash};
    use crate::errors::PlaceholderError;
    use crate::placeholder::params::PlaceholderParams;
    use placeholder_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    fn cell(t: ColumnType, index: usize, row: usize) -> Variable {
        Variable::absolute(t, index, row)
    }

    fn copies() -> Vec<CopyConstraint> {
        vec![
            CopyConstraint::new(
                cell(ColumnType::Witness, 0, 0),
                cell(ColumnType::Witness, 1, 2),
            ),
            CopyConstraint::new(
                cell(ColumnType::Witness, 1, 2),
                cell(ColumnType::PublicInput, 0, 1),
            ),
            CopyConstraint::new(
                cell(ColumnType::Witness, 0, 3),
                cell(ColumnType::Witness, 0, 4),
            ),
            CopyConstraint::new(
                cell(ColumnType::Witness, 1, 5),
                cell(ColumnType::Witness, 1, 5),
            ),
        ]
    }

    #[test]
    fn sigma_is_a_permutation_along_copy_orbits() {
        let desc = TableDescription::new(2, 1, 0, 0, 7, 8).unwrap();
        let cs = ConstraintSystem::<F>::new(vec![], copies(), vec![], vec![]);
        let (identity, sigma) = permutation_polynomials(&cs, &desc).unwrap();
        assert_eq!(identity.len(), 3);
        assert_eq!(sigma.len(), 3);

        let label = |col: usize, row: usize| F::from((col * 8 + row) as u64);
        let mut images: Vec<Vec<u8>> = sigma
            .iter()
            .flat_map(|s| s.evals().iter().map(|x| x.to_bytes()))
            .collect();
        let mut labels: Vec<Vec<u8>> = identity
            .iter()
            .flat_map(|s| s.evals().iter().map(|x| x.to_bytes()))
            .collect();
        images.sort();
        labels.sort();
        assert_eq!(images, labels);

        // columns are w0, w1, p0; the orbit {w0@0, w1@2, p0@1} is a 3-cycle
        assert_eq!(sigma[0].get(0), label(2, 1));
        assert_eq!(sigma[2].get(1), label(1, 2));
        assert_eq!(sigma[1].get(2), label(0, 0));
        assert_eq!(sigma[0].get(3), label(0, 4));
        assert_eq!(sigma[0].get(4), label(0, 3));
        // self copies and untouched cells are fixed points
        assert_eq!(sigma[1].get(5), label(1, 5));
        assert_eq!(sigma[2].get(6), label(2, 6));
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let desc = TableDescription::new(2, 1, 1, 1, 6, 8).unwrap();
        let cs = ConstraintSystem::<F>::new(vec![], copies(), vec![], vec![]);
        let table = AssignmentTable::new(
            desc,
            vec![vec![], vec![]],
            vec![vec![]],
            vec![vec![F::from(3u32); 8]],
            vec![vec![F::one(); 8]],
        )
        .unwrap();
        let params = PlaceholderParams::for_table(&desc, 4, 2, 0).unwrap();

        let a = preprocess_public::<F, Sha256Hash>(&cs, &table, &params).unwrap();
        let b = preprocess_public::<F, Sha256Hash>(&cs, &table, &params).unwrap();
        assert_eq!(a.common, b.common);
        assert_eq!(
            bincode::serialize(&a.common).unwrap(),
            bincode::serialize(&b.common).unwrap()
        );
        assert_eq!(a.common.permuted_columns.len(), 3);
        assert!(a.common.has_permutation());
        assert!(!a.common.has_lookups());
        // fixed columns are cleared on the padding rows
        assert_eq!(a.constants[0].get(7), F::zero());
        assert_eq!(a.selectors[0].get(5), F::one());
        assert_eq!(a.selectors[0].get(6), F::zero());
        // q_last marks the first row past the usable ones, q_blind the rest
        assert_eq!(a.q_last.get(5), F::zero());
        assert_eq!(a.q_last.get(6), F::one());
        assert_eq!(a.q_blind.get(6), F::zero());
        assert_eq!(a.q_blind.get(7), F::one());

        let c = preprocess_public::<F, Keccak256Hash>(&cs, &table, &params).unwrap();
        assert_ne!(a.common.fixed_root, c.common.fixed_root);

        let private = preprocess_private(&table).unwrap();
        assert_eq!(private.witnesses.len(), 2);
        assert_eq!(private.public_inputs[0].size(), 8);

        let bad = ConstraintSystem::<F>::new(
            vec![],
            vec![CopyConstraint::new(
                cell(ColumnType::Witness, 0, 6),
                cell(ColumnType::Witness, 1, 0),
            )],
            vec![],
            vec![],
        );
        assert_eq!(
            preprocess_public::<F, Sha256Hash>(&bad, &table, &params).err(),
            Some(PlaceholderError::CopyConstraintReferencesPadding)
        );
    }
}
