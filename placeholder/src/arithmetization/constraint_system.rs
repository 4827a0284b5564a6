use crate::arithmetization::{
    expression::Expression,
    gate::{CopyConstraint, Gate, LookupGate, LookupTable},
    table::{AssignmentTable, TableDescription},
    variable::{ColumnType, Selector, SpecialSelector, Variable},
};
use crate::commitment::hash::{Hash, HashOutput};
use crate::errors::{PlaceholderError, Result};
use ark_std::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
use placeholder_algebra::prelude::*;

/// The rotations used on every column, indexed by the global column index of
/// [`TableDescription::global_index`]. Every column is used at rotation 0.
pub type ColumnsRotations = Vec<Vec<i32>>;

/// An immutable set of gates, copy constraints, lookup gates and lookup tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSystem<F> {
    gates: Vec<Gate<F>>,
    copy_constraints: Vec<CopyConstraint>,
    lookup_gates: Vec<LookupGate<F>>,
    lookup_tables: Vec<LookupTable>,
    public_input_sizes: Option<Vec<usize>>,
}

impl<F: Scalar> ConstraintSystem<F> {
    /// Create a constraint system.
    pub fn new(
        gates: Vec<Gate<F>>,
        copy_constraints: Vec<CopyConstraint>,
        lookup_gates: Vec<LookupGate<F>>,
        lookup_tables: Vec<LookupTable>,
    ) -> Self {
        Self {
            gates,
            copy_constraints,
            lookup_gates,
            lookup_tables,
            public_input_sizes: None,
        }
    }

    /// Restrict the number of rows of each public input column that the
    /// verifier checks.
    pub fn with_public_input_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.public_input_sizes = Some(sizes);
        self
    }

    /// The gates.
    pub fn gates(&self) -> &[Gate<F>] {
        &self.gates
    }

    /// The copy constraints.
    pub fn copy_constraints(&self) -> &[CopyConstraint] {
        &self.copy_constraints
    }

    /// The lookup gates.
    pub fn lookup_gates(&self) -> &[LookupGate<F>] {
        &self.lookup_gates
    }

    /// The lookup tables.
    pub fn lookup_tables(&self) -> &[LookupTable] {
        &self.lookup_tables
    }

    /// The number of rows of each public input column checked by the verifier;
    /// all usable rows unless restricted.
    pub fn public_input_sizes(&self, desc: &TableDescription) -> Vec<usize> {
        match &self.public_input_sizes {
            Some(sizes) => (0..desc.public_input_columns)
                .map(|i| sizes.get(i).copied().unwrap_or(0).min(desc.usable_rows))
                .collect(),
            None => vec![desc.usable_rows; desc.public_input_columns],
        }
    }

    /// Whether any lookup gate is present.
    pub fn has_lookups(&self) -> bool {
        self.lookup_gates.iter().any(|g| !g.inputs.is_empty())
    }

    /// The maximal degree of a gate constraint.
    pub fn max_gates_degree(&self) -> usize {
        self.gates
            .iter()
            .flat_map(|g| g.constraints.iter().map(|c| c.max_degree()))
            .max()
            .unwrap_or(0)
    }

    /// The degree of the lookup identities, in multiples of the table size.
    pub fn lookup_poly_degree_bound(&self) -> usize {
        if !self.has_lookups() {
            return 0;
        }
        let values_degree = self
            .lookup_gates
            .iter()
            .flat_map(|g| g.inputs.iter())
            .flat_map(|i| i.values.iter().map(|v| v.max_degree()))
            .max()
            .unwrap_or(0);
        2.max(1 + values_degree)
    }

    /// The columns that take part in at least one non-trivial copy constraint,
    /// sorted by type and index.
    pub fn permuted_columns(&self) -> Vec<(ColumnType, usize)> {
        let mut columns = BTreeSet::new();
        for c in self.copy_constraints.iter().filter(|c| c.first != c.second) {
            columns.insert((c.first.column_type, c.first.index));
            columns.insert((c.second.column_type, c.second.index));
        }
        columns.into_iter().collect()
    }

    /// The degree of the permutation identities, in multiples of the table size.
    pub fn permutation_degree_bound(&self) -> usize {
        let m = self.permuted_columns().len();
        if m == 0 {
            0
        } else {
            3.max(m + 2)
        }
    }

    /// The factor `D` such that every identity has degree below `D · n`.
    pub fn quotient_degree_factor(&self) -> usize {
        let gates = self.gates.iter().map(|g| g.degree()).max().unwrap_or(0);
        1.max(gates)
            .max(self.permutation_degree_bound())
            .max(self.lookup_poly_degree_bound())
    }

    /// The number of quotient chunks of `n` coefficients each.
    pub fn quotient_chunks(&self) -> usize {
        1.max(self.quotient_degree_factor() - 1)
    }

    fn check_variable(&self, desc: &TableDescription, v: &Variable) -> Result<()> {
        if !v.relative {
            return Err(PlaceholderError::ExpressionRelativityMixed);
        }
        desc.global_index(v.column_type, v.index).map(|_| ())
    }

    fn check_selector(&self, desc: &TableDescription, s: &Selector) -> Result<()> {
        match s {
            Selector::Column(i) if *i >= desc.selector_columns => {
                Err(PlaceholderError::SelectorOutOfRange)
            }
            _ => Ok(()),
        }
    }

    fn check_expression(&self, desc: &TableDescription, e: &Expression<F>) -> Result<()> {
        e.relativity()?;
        for v in e.variables() {
            self.check_variable(desc, &v)?;
        }
        Ok(())
    }

    /// Check that every gate, copy constraint and lookup refers to existing
    /// columns in the right way.
    pub fn validate(&self, desc: &TableDescription) -> Result<()> {
        desc.check()?;
        for gate in self.gates.iter() {
            self.check_selector(desc, &gate.selector)?;
            for c in gate.constraints.iter() {
                self.check_expression(desc, c)?;
            }
        }

        for c in self.copy_constraints.iter() {
            for v in [&c.first, &c.second] {
                if v.relative {
                    return Err(PlaceholderError::ExpressionRelativityMixed);
                }
                if matches!(v.column_type, ColumnType::Selector | ColumnType::Special) {
                    return Err(PlaceholderError::ColumnOutOfRange);
                }
                desc.global_index(v.column_type, v.index)?;
                let row = v.row().ok_or(PlaceholderError::ColumnOutOfRange)?;
                if row >= desc.usable_rows {
                    return Err(PlaceholderError::CopyConstraintReferencesPadding);
                }
            }
        }

        for table in self.lookup_tables.iter() {
            self.check_selector(desc, &table.selector)?;
            table.width().ok_or(PlaceholderError::LookupTableMismatch)?;
            for v in table.options.iter().flatten() {
                self.check_variable(desc, v)?;
                if v.rotation != 0 || v.column_type == ColumnType::Special {
                    return Err(PlaceholderError::LookupTableMismatch);
                }
            }
        }

        for gate in self.lookup_gates.iter() {
            self.check_selector(desc, &gate.selector)?;
            for input in gate.inputs.iter() {
                let table = self
                    .lookup_tables
                    .get(input.table_id)
                    .ok_or(PlaceholderError::LookupTableMissing)?;
                if table.width() != Some(input.values.len()) {
                    return Err(PlaceholderError::LookupTableMismatch);
                }
                for e in input.values.iter() {
                    self.check_expression(desc, e)?;
                }
            }
        }
        Ok(())
    }

    /// Collect the rotations used on every column.
    pub fn columns_rotations(&self, desc: &TableDescription) -> Result<ColumnsRotations> {
        let total = desc.total_columns() + SpecialSelector::ALL.len();
        let mut sets = vec![BTreeSet::from([0i32]); total];
        let mut add = |v: &Variable| -> Result<()> {
            let i = desc.global_index(v.column_type, v.index)?;
            sets[i].insert(v.rotation);
            Ok(())
        };
        for gate in self.gates.iter() {
            add(&gate.selector.variable())?;
            for c in gate.constraints.iter() {
                for v in c.variables() {
                    add(&v)?;
                }
            }
        }
        for gate in self.lookup_gates.iter() {
            add(&gate.selector.variable())?;
            for input in gate.inputs.iter() {
                for v in input.values.iter().flat_map(|e| e.variables()) {
                    add(&v)?;
                }
            }
        }
        for table in self.lookup_tables.iter() {
            add(&table.selector.variable())?;
        }
        Ok(sets.into_iter().map(|s| s.into_iter().collect()).collect())
    }

    /// Check the assignment against every constraint, row by row.
    pub fn verify_assignment(&self, table: &AssignmentTable<F>) -> Result<()> {
        let desc = table.desc();
        self.validate(desc)?;
        let usable = desc.usable_rows;

        for (gate_index, gate) in self.gates.iter().enumerate() {
            let selector = gate.selector.variable();
            for row in 0..usable {
                if table.value(&selector, row)?.is_zero() {
                    continue;
                }
                let env = |v: &Variable| table.value(v, row);
                for c in gate.constraints.iter() {
                    if !c.evaluate(&env)?.is_zero() {
                        return Err(PlaceholderError::UnsatisfiedConstraint {
                            gate: gate_index,
                            row,
                        });
                    }
                }
            }
        }

        for (i, c) in self.copy_constraints.iter().enumerate() {
            if table.value(&c.first, 0)? != table.value(&c.second, 0)? {
                return Err(PlaceholderError::UnsatisfiedCopyConstraint(i));
            }
        }

        let mut contents: BTreeMap<usize, BTreeSet<Vec<Vec<u8>>>> = BTreeMap::new();
        for (table_id, lookup_table) in self.lookup_tables.iter().enumerate() {
            let selector = lookup_table.selector.variable();
            let rows = contents.entry(table_id).or_default();
            for row in 0..usable {
                if table.value(&selector, row)?.is_zero() {
                    continue;
                }
                for option in lookup_table.options.iter() {
                    let tuple = option
                        .iter()
                        .map(|v| table.value(v, row).map(|x| x.to_bytes()))
                        .collect::<Result<Vec<_>>>()?;
                    rows.insert(tuple);
                }
            }
        }
        for gate in self.lookup_gates.iter() {
            let selector = gate.selector.variable();
            for row in 0..usable {
                if table.value(&selector, row)?.is_zero() {
                    continue;
                }
                let env = |v: &Variable| table.value(v, row);
                for input in gate.inputs.iter() {
                    let tuple = input
                        .values
                        .iter()
                        .map(|e| e.evaluate(&env).map(|x| x.to_bytes()))
                        .collect::<Result<Vec<_>>>()?;
                    let found = contents
                        .get(&input.table_id)
                        .map_or(false, |rows| rows.contains(&tuple));
                    if !found {
                        return Err(PlaceholderError::LookupTableMissing);
                    }
                }
            }
        }
        Ok(())
    }

    /// A digest binding the transcript to this constraint system.
    pub fn digest<H: Hash>(&self) -> Result<HashOutput> {
        let bytes = bincode::serialize(self)
            .map_err(|_| PlaceholderError::Algebra(AlgebraError::SerializationError))?;
        Ok(H::digest(&bytes))
    }
}
