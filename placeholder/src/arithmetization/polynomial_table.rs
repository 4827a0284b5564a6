use crate::arithmetization::{
    expression::Expression,
    variable::{ColumnType, SpecialSelector, Variable},
};
use crate::errors::{PlaceholderError, Result};
use crate::math::PolynomialDfs;
use ark_std::{collections::HashMap, vec::Vec};
use placeholder_algebra::prelude::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Every column of a table as a DFS polynomial over the basic domain, together
/// with the masks standing for the special selectors.
#[derive(Clone, Copy, Debug)]
pub struct PolynomialTable<'a, F> {
    /// Witness columns.
    pub witnesses: &'a [PolynomialDfs<F>],
    /// Public input columns.
    pub public_inputs: &'a [PolynomialDfs<F>],
    /// Constant columns.
    pub constants: &'a [PolynomialDfs<F>],
    /// Selector columns.
    pub selectors: &'a [PolynomialDfs<F>],
    /// Masks in [`SpecialSelector`] code order.
    pub special_selectors: &'a [PolynomialDfs<F>],
}

impl<'a, F: Domain> PolynomialTable<'a, F> {
    /// The size of the basic domain.
    pub fn rows_amount(&self) -> usize {
        self.special_selectors
            .first()
            .map(|p| p.size())
            .unwrap_or(0)
    }

    /// Return the column polynomial.
    pub fn column(&self, column_type: ColumnType, index: usize) -> Result<&'a PolynomialDfs<F>> {
        let columns = match column_type {
            ColumnType::Witness => self.witnesses,
            ColumnType::PublicInput => self.public_inputs,
            ColumnType::Constant => self.constants,
            ColumnType::Selector => self.selectors,
            ColumnType::Special => {
                return SpecialSelector::from_code(index)
                    .and_then(|s| self.special_selectors.get(s.code()))
                    .ok_or(PlaceholderError::SelectorOutOfRange)
            }
        };
        columns.get(index).ok_or(match column_type {
            ColumnType::Selector => PlaceholderError::SelectorOutOfRange,
            _ => PlaceholderError::ColumnOutOfRange,
        })
    }

    /// Return the polynomial of `var` sampled on `size` points.
    pub fn value_of(&self, var: &Variable, size: usize) -> Result<PolynomialDfs<F>> {
        let column = self.column(var.column_type, var.index)?.resize(size)?;
        column.shift(var.rotation, self.rows_amount())
    }
}

/// The polynomials of a set of variables on one extended domain, each column
/// extended once and each rotation computed once.
pub struct ColumnCache<'a, F> {
    table: PolynomialTable<'a, F>,
    size: usize,
    columns: HashMap<(ColumnType, usize), PolynomialDfs<F>>,
    rotated: HashMap<(ColumnType, usize, i32), PolynomialDfs<F>>,
}

impl<'a, F: Domain> ColumnCache<'a, F> {
    /// Create an empty cache over a domain of `size` points.
    pub fn new(table: PolynomialTable<'a, F>, size: usize) -> Self {
        Self {
            table,
            size,
            columns: HashMap::new(),
            rotated: HashMap::new(),
        }
    }

    /// The domain size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Make sure that `var` can be read from the cache.
    pub fn ensure(&mut self, var: &Variable) -> Result<()> {
        let key = (var.column_type, var.index, var.rotation);
        if self.rotated.contains_key(&key) {
            return Ok(());
        }
        let column_key = (var.column_type, var.index);
        if !self.columns.contains_key(&column_key) {
            let column = self
                .table
                .column(var.column_type, var.index)?
                .resize(self.size)?;
            self.columns.insert(column_key, column);
        }
        let column = self
            .columns
            .get(&column_key)
            .ok_or(PlaceholderError::MissingEvaluation)?;
        let shifted = column.shift(var.rotation, self.table.rows_amount())?;
        self.rotated.insert(key, shifted);
        Ok(())
    }

    /// Make sure that every variable of `expr` can be read from the cache.
    pub fn ensure_expression(&mut self, expr: &Expression<F>) -> Result<()> {
        for v in expr.variables() {
            self.ensure(&v)?;
        }
        Ok(())
    }

    /// Read the polynomial of `var`.
    pub fn get(&self, var: &Variable) -> Result<&PolynomialDfs<F>> {
        self.rotated
            .get(&(var.column_type, var.index, var.rotation))
            .ok_or(PlaceholderError::MissingEvaluation)
    }

    /// Evaluate `expr` at every point of the domain.
    pub fn evaluate(&mut self, expr: &Expression<F>) -> Result<PolynomialDfs<F>> {
        self.ensure_expression(expr)?;
        let this = &*self;
        let evals = ark_std::cfg_into_iter!(0..self.size)
            .map(|i| expr.evaluate(&|v: &Variable| Ok(this.get(v)?.get(i))))
            .collect::<Result<Vec<F>>>()?;
        PolynomialDfs::new(evals)
    }
}
