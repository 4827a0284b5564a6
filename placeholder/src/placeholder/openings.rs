use crate::arithmetization::{ColumnType, Selector, SpecialSelector, Variable};
use crate::commitment::lpc::{EvaluationMap, PointsMap};
use crate::errors::{PlaceholderError, Result};
use crate::math::EvaluationDomain;
use crate::placeholder::{
    preprocessor::CommonData, FIXED_VALUES_BATCH, LOOKUP_BATCH, PERMUTATION_BATCH,
    QUOTIENT_BATCH, VARIABLE_VALUES_BATCH,
};
use ark_std::{collections::BTreeSet, vec::Vec};
use placeholder_algebra::prelude::*;

/// Where every committed polynomial sits in its batch, and where it is opened.
///
/// The fixed batch holds `S_id`, `S_σ`, `q_last`, `q_blind`, the constant
/// columns and the selector columns. The variable batch holds the witness
/// columns and then the public input columns. The permutation batch holds
/// `V_P`, `U`, the `h` polynomials and the `g` polynomials, each present only
/// when its argument is.
pub(crate) struct OpeningLayout<'a, F: Domain> {
    pub(crate) common: &'a CommonData<F>,
    pub(crate) domain: EvaluationDomain<F>,
    blind_rotations: Vec<i32>,
}

impl<'a, F: Domain> OpeningLayout<'a, F> {
    pub(crate) fn new(common: &'a CommonData<F>) -> Result<Self> {
        let domain = EvaluationDomain::new(common.desc.rows_amount)?;
        if domain.generator() != common.omega {
            return Err(PlaceholderError::ProofStructureError);
        }
        let total = common.desc.total_columns();
        let mut blind = BTreeSet::from([0i32]);
        for s in [
            SpecialSelector::AllUsableRows,
            SpecialSelector::AllNonFirstUsableRows,
        ] {
            let rotations = common
                .columns_rotations
                .get(total + s.code())
                .ok_or(PlaceholderError::ProofStructureError)?;
            blind.extend(rotations.iter().copied());
        }
        Ok(Self {
            common,
            domain,
            blind_rotations: blind.into_iter().collect(),
        })
    }

    fn permuted(&self) -> usize {
        self.common.permuted_columns.len()
    }

    pub(crate) fn identity(&self, j: usize) -> usize {
        j
    }

    pub(crate) fn sigma(&self, j: usize) -> usize {
        self.permuted() + j
    }

    pub(crate) fn q_last(&self) -> usize {
        2 * self.permuted()
    }

    pub(crate) fn q_blind(&self) -> usize {
        2 * self.permuted() + 1
    }

    pub(crate) fn constant(&self, c: usize) -> usize {
        2 * self.permuted() + 2 + c
    }

    pub(crate) fn selector(&self, s: usize) -> usize {
        2 * self.permuted() + 2 + self.common.desc.constant_columns + s
    }

    pub(crate) fn v_p(&self) -> usize {
        0
    }

    pub(crate) fn lookup_sum(&self) -> usize {
        self.common.has_permutation() as usize
    }

    pub(crate) fn lookup_input(&self, i: usize) -> usize {
        self.lookup_sum() + 1 + i
    }

    pub(crate) fn lookup_option(&self, t: usize) -> usize {
        self.lookup_input(self.common.lookup_inputs) + t
    }

    /// The batches a proof commits to besides the fixed one.
    pub(crate) fn proof_batches(&self) -> Vec<usize> {
        let mut batches = Vec::new();
        if self.common.desc.witness_columns + self.common.desc.public_input_columns > 0 {
            batches.push(VARIABLE_VALUES_BATCH);
        }
        if self.common.has_permutation() || self.common.has_lookups() {
            batches.push(PERMUTATION_BATCH);
        }
        batches.push(QUOTIENT_BATCH);
        if self.common.has_lookups() {
            batches.push(LOOKUP_BATCH);
        }
        batches
    }

    fn rotations(&self, column_type: ColumnType, index: usize) -> Result<&[i32]> {
        let global = self.common.desc.global_index(column_type, index)?;
        self.common
            .columns_rotations
            .get(global)
            .map(|r| r.as_slice())
            .ok_or(PlaceholderError::ProofStructureError)
    }

    fn rotated(&self, y: &F, rotations: &[i32]) -> Vec<F> {
        rotations
            .iter()
            .map(|r| y.mul(&self.domain.rotation(*r)))
            .collect()
    }

    fn columns_points(&self, y: &F, column_type: ColumnType, count: usize) -> Result<Vec<Vec<F>>> {
        (0..count)
            .map(|i| Ok(self.rotated(y, self.rotations(column_type, i)?)))
            .collect()
    }

    /// The opening points of every polynomial, for the evaluation point `y`.
    pub(crate) fn points(&self, y: &F) -> Result<PointsMap<F>> {
        let desc = &self.common.desc;
        let m = self.permuted();
        let y_omega = y.mul(&self.common.omega);
        let mut points = PointsMap::new();

        let mut fixed = vec![vec![*y]; 2 * m];
        fixed.push(self.rotated(y, &self.blind_rotations));
        fixed.push(self.rotated(y, &self.blind_rotations));
        fixed.extend(self.columns_points(y, ColumnType::Constant, desc.constant_columns)?);
        fixed.extend(self.columns_points(y, ColumnType::Selector, desc.selector_columns)?);
        points.insert(FIXED_VALUES_BATCH, fixed);

        if desc.witness_columns + desc.public_input_columns > 0 {
            let mut variable = self.columns_points(y, ColumnType::Witness, desc.witness_columns)?;
            variable.extend(self.columns_points(
                y,
                ColumnType::PublicInput,
                desc.public_input_columns,
            )?);
            points.insert(VARIABLE_VALUES_BATCH, variable);
        }

        if self.common.has_permutation() || self.common.has_lookups() {
            let mut permutation = Vec::new();
            if self.common.has_permutation() {
                permutation.push(vec![*y, y_omega]);
            }
            if self.common.has_lookups() {
                permutation.push(vec![*y, y_omega]);
                permutation.extend(vec![vec![*y]; self.common.lookup_inputs]);
                permutation.extend(vec![vec![*y]; self.common.lookup_options]);
            }
            points.insert(PERMUTATION_BATCH, permutation);
        }

        points.insert(QUOTIENT_BATCH, vec![vec![*y]; self.common.quotient_chunks]);

        if self.common.has_lookups() {
            points.insert(LOOKUP_BATCH, vec![vec![*y]; self.common.lookup_options]);
        }
        Ok(points)
    }
}

/// The claimed evaluations of a proof, read through the opening layout.
pub(crate) struct ClaimedValues<'a, F: Domain> {
    layout: &'a OpeningLayout<'a, F>,
    z: &'a EvaluationMap<F>,
    y: F,
}

impl<'a, F: Domain> ClaimedValues<'a, F> {
    pub(crate) fn new(layout: &'a OpeningLayout<'a, F>, z: &'a EvaluationMap<F>, y: F) -> Self {
        Self { layout, z, y }
    }

    pub(crate) fn y(&self) -> &F {
        &self.y
    }

    /// The `k`-th claimed value of the given polynomial.
    pub(crate) fn get(&self, batch: usize, poly: usize, k: usize) -> Result<F> {
        self.z
            .get(&batch)
            .and_then(|polys| polys.get(poly))
            .and_then(|evals| evals.get(k))
            .map(|(_, v)| *v)
            .ok_or(PlaceholderError::MissingEvaluation)
    }

    fn position(rotations: &[i32], rotation: i32) -> Result<usize> {
        rotations
            .binary_search(&rotation)
            .map_err(|_| PlaceholderError::MissingEvaluation)
    }

    /// The value of `q_last` at `y · ω^rotation`.
    fn q_last_at(&self, rotation: i32) -> Result<F> {
        let k = Self::position(&self.layout.blind_rotations, rotation)?;
        self.get(FIXED_VALUES_BATCH, self.layout.q_last(), k)
    }

    /// The value of `q_blind` at `y · ω^rotation`.
    fn q_blind_at(&self, rotation: i32) -> Result<F> {
        let k = Self::position(&self.layout.blind_rotations, rotation)?;
        self.get(FIXED_VALUES_BATCH, self.layout.q_blind(), k)
    }

    /// `1 - q_last - q_blind` at `y · ω^rotation`, which is one exactly on
    /// the usable rows.
    fn usable_at(&self, rotation: i32) -> Result<F> {
        Ok(F::one()
            .sub(&self.q_last_at(rotation)?)
            .sub(&self.q_blind_at(rotation)?))
    }

    /// The value of `L_0` at `y · ω^rotation`.
    pub(crate) fn lagrange_0_at(&self, rotation: i32) -> Result<F> {
        let point = self.y.mul(&self.layout.domain.rotation(rotation));
        self.layout.domain.evaluate_lagrange(0, &point)
    }

    /// The value of a relative variable at the evaluation point.
    pub(crate) fn variable(&self, var: &Variable) -> Result<F> {
        if !var.relative {
            return Err(PlaceholderError::ExpressionRelativityMixed);
        }
        let layout = self.layout;
        let desc = &layout.common.desc;
        let (batch, poly) = match var.column_type {
            ColumnType::Witness | ColumnType::PublicInput => (
                VARIABLE_VALUES_BATCH,
                desc.global_index(var.column_type, var.index)?,
            ),
            ColumnType::Constant => {
                desc.global_index(var.column_type, var.index)?;
                (FIXED_VALUES_BATCH, layout.constant(var.index))
            }
            ColumnType::Selector => {
                desc.global_index(var.column_type, var.index)?;
                (FIXED_VALUES_BATCH, layout.selector(var.index))
            }
            ColumnType::Special => {
                let s = SpecialSelector::from_code(var.index)
                    .ok_or(PlaceholderError::SelectorOutOfRange)?;
                return match s {
                    SpecialSelector::AllRows => Ok(F::one()),
                    SpecialSelector::AllUsableRows => self.usable_at(var.rotation),
                    SpecialSelector::AllNonFirstUsableRows => Ok(self
                        .usable_at(var.rotation)?
                        .sub(&self.lagrange_0_at(var.rotation)?)),
                };
            }
        };
        let k = Self::position(layout.rotations(var.column_type, var.index)?, var.rotation)?;
        self.get(batch, poly, k)
    }

    /// The value of a selector at the evaluation point.
    pub(crate) fn selector(&self, selector: &Selector) -> Result<F> {
        self.variable(&selector.variable())
    }

    /// The value of a fixed polynomial at `y`.
    pub(crate) fn fixed(&self, poly: usize) -> Result<F> {
        self.get(FIXED_VALUES_BATCH, poly, 0)
    }

    /// The value of `q_last` at `y`.
    pub(crate) fn q_last(&self) -> Result<F> {
        self.q_last_at(0)
    }

    /// The value of `q_blind` at `y`.
    pub(crate) fn q_blind(&self) -> Result<F> {
        self.q_blind_at(0)
    }

    pub(crate) fn layout(&self) -> &OpeningLayout<'a, F> {
        self.layout
    }
}
