use crate::arithmetization::{
    expression::Expression,
    variable::{Selector, SpecialSelector, Variable},
};
use ark_std::vec::Vec;
use placeholder_algebra::prelude::*;

/// A gate: constraints that must vanish on every row where the selector is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate<F> {
    /// The selector switching the gate on.
    pub selector: Selector,
    /// The constraints, over relative variables.
    pub constraints: Vec<Expression<F>>,
}

impl<F: Scalar> Gate<F> {
    /// Create a gate.
    pub fn new(selector: Selector, constraints: Vec<Expression<F>>) -> Self {
        Self {
            selector,
            constraints,
        }
    }

    /// The degree of the gate, its selector included.
    pub fn degree(&self) -> usize {
        let d = self
            .constraints
            .iter()
            .map(|c| c.max_degree())
            .max()
            .unwrap_or(0);
        match self.selector {
            Selector::Special(SpecialSelector::AllRows) => d,
            _ => d + 1,
        }
    }
}

/// Two cells that must hold the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CopyConstraint {
    /// First cell, an absolute variable.
    pub first: Variable,
    /// Second cell, an absolute variable.
    pub second: Variable,
}

impl CopyConstraint {
    /// Create a copy constraint between two absolute variables.
    pub fn new(first: Variable, second: Variable) -> Self {
        Self { first, second }
    }
}

/// A tuple of expressions that must appear in the table `table_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupInput<F> {
    /// The index of the lookup table.
    pub table_id: usize,
    /// The looked-up tuple.
    pub values: Vec<Expression<F>>,
}

/// A lookup gate: on every row where the selector is set, each input tuple
/// must be a row of its table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupGate<F> {
    /// The selector switching the lookup on.
    pub selector: Selector,
    /// The looked-up tuples.
    pub inputs: Vec<LookupInput<F>>,
}

impl<F: Scalar> LookupGate<F> {
    /// Create a lookup gate.
    pub fn new(selector: Selector, inputs: Vec<LookupInput<F>>) -> Self {
        Self { selector, inputs }
    }
}

/// A lookup table made of one or several options, each a list of columns of
/// the same width, enabled on rows where the selector is set.
///
/// A table over constant columns is fixed at preprocessing time; a table over
/// witness columns is dynamic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    /// The selector marking the rows of the table.
    pub selector: Selector,
    /// The options, each a list of relative variables at rotation 0.
    pub options: Vec<Vec<Variable>>,
}

impl LookupTable {
    /// Create a lookup table.
    pub fn new(selector: Selector, options: Vec<Vec<Variable>>) -> Self {
        Self { selector, options }
    }

    /// The width of the table, if all options agree on it.
    pub fn width(&self) -> Option<usize> {
        let w = self.options.first()?.len();
        if self.options.iter().all(|o| o.len() == w) {
            Some(w)
        } else {
            None
        }
    }
}
