use crate::arithmetization::variable::{ColumnType, SpecialSelector, Variable};
use crate::errors::{PlaceholderError, Result};
use ark_std::vec::Vec;
use placeholder_algebra::prelude::*;

/// The number of rows reserved after the usable rows for zero-knowledge padding.
pub const PADDING_ROWS: usize = 1;

/// The shape of an assignment table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDescription {
    /// Number of witness columns.
    pub witness_columns: usize,
    /// Number of public input columns.
    pub public_input_columns: usize,
    /// Number of constant columns.
    pub constant_columns: usize,
    /// Number of selector columns.
    pub selector_columns: usize,
    /// Number of rows carrying the circuit.
    pub usable_rows: usize,
    /// Total number of rows, a power of two.
    pub rows_amount: usize,
}

impl TableDescription {
    /// Create a table description, checking that `rows_amount` is a power of two
    /// that leaves room for the padding rows.
    pub fn new(
        witness_columns: usize,
        public_input_columns: usize,
        constant_columns: usize,
        selector_columns: usize,
        usable_rows: usize,
        rows_amount: usize,
    ) -> Result<Self> {
        let desc = Self {
            witness_columns,
            public_input_columns,
            constant_columns,
            selector_columns,
            usable_rows,
            rows_amount,
        };
        desc.check()?;
        Ok(desc)
    }

    /// Create a table description with the smallest power-of-two size.
    pub fn with_usable_rows(
        witness_columns: usize,
        public_input_columns: usize,
        constant_columns: usize,
        selector_columns: usize,
        usable_rows: usize,
    ) -> Result<Self> {
        let rows_amount = (usable_rows + PADDING_ROWS).next_power_of_two().max(2);
        Self::new(
            witness_columns,
            public_input_columns,
            constant_columns,
            selector_columns,
            usable_rows,
            rows_amount,
        )
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.usable_rows == 0
            || !self.rows_amount.is_power_of_two()
            || self.rows_amount < self.usable_rows + PADDING_ROWS
        {
            return Err(PlaceholderError::InvalidTableDescription);
        }
        Ok(())
    }

    /// The number of columns of the given type.
    pub fn columns(&self, column_type: ColumnType) -> usize {
        match column_type {
            ColumnType::Witness => self.witness_columns,
            ColumnType::PublicInput => self.public_input_columns,
            ColumnType::Constant => self.constant_columns,
            ColumnType::Selector => self.selector_columns,
            ColumnType::Special => SpecialSelector::ALL.len(),
        }
    }

    /// The total number of stored columns.
    pub fn total_columns(&self) -> usize {
        self.witness_columns
            + self.public_input_columns
            + self.constant_columns
            + self.selector_columns
    }

    /// The position of a column among all stored columns, in the order
    /// witness, public input, constant, selector.
    pub fn global_index(&self, column_type: ColumnType, index: usize) -> Result<usize> {
        if index >= self.columns(column_type) {
            return Err(match column_type {
                ColumnType::Selector | ColumnType::Special => PlaceholderError::SelectorOutOfRange,
                _ => PlaceholderError::ColumnOutOfRange,
            });
        }
        Ok(match column_type {
            ColumnType::Witness => index,
            ColumnType::PublicInput => self.witness_columns + index,
            ColumnType::Constant => self.witness_columns + self.public_input_columns + index,
            ColumnType::Selector => {
                self.witness_columns + self.public_input_columns + self.constant_columns + index
            }
            ColumnType::Special => self.total_columns() + index,
        })
    }
}

/// The values of every cell of a table.
///
/// Columns shorter than `rows_amount` are padded with zeros; the prover later
/// replaces the padding rows of the witness columns by random values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable<F> {
    desc: TableDescription,
    witnesses: Vec<Vec<F>>,
    public_inputs: Vec<Vec<F>>,
    constants: Vec<Vec<F>>,
    selectors: Vec<Vec<F>>,
}

fn pad_columns<F: Scalar>(
    columns: Vec<Vec<F>>,
    expected: usize,
    rows: usize,
) -> Result<Vec<Vec<F>>> {
    if columns.len() != expected {
        return Err(PlaceholderError::ColumnOutOfRange);
    }
    columns
        .into_iter()
        .map(|mut c| {
            if c.len() > rows {
                return Err(PlaceholderError::InvalidTableDescription);
            }
            c.resize(rows, F::zero());
            Ok(c)
        })
        .collect()
}

impl<F: Scalar> AssignmentTable<F> {
    /// Create an assignment table.
    pub fn new(
        desc: TableDescription,
        witnesses: Vec<Vec<F>>,
        public_inputs: Vec<Vec<F>>,
        constants: Vec<Vec<F>>,
        selectors: Vec<Vec<F>>,
    ) -> Result<Self> {
        desc.check()?;
        let rows = desc.rows_amount;
        Ok(Self {
            witnesses: pad_columns(witnesses, desc.witness_columns, rows)?,
            public_inputs: pad_columns(public_inputs, desc.public_input_columns, rows)?,
            constants: pad_columns(constants, desc.constant_columns, rows)?,
            selectors: pad_columns(selectors, desc.selector_columns, rows)?,
            desc,
        })
    }

    /// The table description.
    pub fn desc(&self) -> &TableDescription {
        &self.desc
    }

    /// The witness columns.
    pub fn witnesses(&self) -> &[Vec<F>] {
        &self.witnesses
    }

    /// The public input columns.
    pub fn public_inputs(&self) -> &[Vec<F>] {
        &self.public_inputs
    }

    /// The constant columns.
    pub fn constants(&self) -> &[Vec<F>] {
        &self.constants
    }

    /// The selector columns.
    pub fn selectors(&self) -> &[Vec<F>] {
        &self.selectors
    }

    /// Return the column of the given type.
    pub fn column(&self, column_type: ColumnType, index: usize) -> Result<&[F]> {
        let columns = match column_type {
            ColumnType::Witness => &self.witnesses,
            ColumnType::PublicInput => &self.public_inputs,
            ColumnType::Constant => &self.constants,
            ColumnType::Selector => &self.selectors,
            ColumnType::Special => return Err(PlaceholderError::SelectorOutOfRange),
        };
        columns
            .get(index)
            .map(|c| c.as_slice())
            .ok_or(match column_type {
                ColumnType::Selector => PlaceholderError::SelectorOutOfRange,
                _ => PlaceholderError::ColumnOutOfRange,
            })
    }

    /// Return the value of a special selector on `row`.
    pub fn special_value(&self, selector: SpecialSelector, row: usize) -> F {
        let usable = row < self.desc.usable_rows;
        let on = match selector {
            SpecialSelector::AllUsableRows => usable,
            SpecialSelector::AllNonFirstUsableRows => usable && row != 0,
            SpecialSelector::AllRows => true,
        };
        if on {
            F::one()
        } else {
            F::zero()
        }
    }

    /// Return the value of `var` when the current row is `row`; rotations wrap
    /// around the table.
    pub fn value(&self, var: &Variable, row: usize) -> Result<F> {
        let rows = self.desc.rows_amount as i64;
        let r = if var.relative {
            (row as i64 + var.rotation as i64).rem_euclid(rows) as usize
        } else {
            let r = var.rotation as i64;
            if r < 0 || r >= rows {
                return Err(PlaceholderError::ColumnOutOfRange);
            }
            r as usize
        };
        if var.column_type == ColumnType::Special {
            let s = SpecialSelector::from_code(var.index)
                .ok_or(PlaceholderError::SelectorOutOfRange)?;
            return Ok(self.special_value(s, r));
        }
        Ok(self.column(var.column_type, var.index)?[r])
    }

    /// Replace the padding rows of every witness column by random values.
    pub fn randomize_padding<R: CryptoRng + RngCore>(&mut self, prng: &mut R) {
        let usable = self.desc.usable_rows;
        for column in self.witnesses.iter_mut() {
            for cell in column.iter_mut().skip(usable) {
                *cell = F::random(prng);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use placeholder_algebra::bn254::BN254Scalar;

    type F = BN254Scalar;

    #[test]
    fn table_description_checks() {
        assert!(TableDescription::new(1, 1, 0, 1, 127, 128).is_ok());
        assert_eq!(
            TableDescription::new(1, 1, 0, 1, 128, 128),
            Err(PlaceholderError::InvalidTableDescription)
        );
        assert!(TableDescription::new(1, 1, 0, 1, 100, 120).is_err());
        assert!(TableDescription::new(1, 1, 0, 1, 0, 4).is_err());
        let desc = TableDescription::with_usable_rows(1, 0, 0, 0, 1).unwrap();
        assert_eq!(desc.rows_amount, 2);
        let desc = TableDescription::with_usable_rows(1, 0, 0, 0, 127).unwrap();
        assert_eq!(desc.rows_amount, 128);

        let desc = TableDescription::new(2, 1, 3, 1, 3, 4).unwrap();
        assert_eq!(desc.global_index(ColumnType::Constant, 2).unwrap(), 5);
        assert_eq!(desc.global_index(ColumnType::Selector, 0).unwrap(), 6);
        assert_eq!(
            desc.global_index(ColumnType::Selector, 1),
            Err(PlaceholderError::SelectorOutOfRange)
        );
    }

    #[test]
    fn assignment_values() {
        let desc = TableDescription::new(1, 0, 0, 1, 3, 4).unwrap();
        let table = AssignmentTable::new(
            desc,
            vec![vec![F::from(1u32), F::from(2u32), F::from(3u32)]],
            vec![],
            vec![],
            vec![vec![F::one()]],
        )
        .unwrap();
        assert_eq!(table.witnesses()[0].len(), 4);
        assert_eq!(
            table.value(&Variable::witness(0, -1), 0).unwrap(),
            F::zero()
        );
        assert_eq!(
            table.value(&Variable::witness(0, 1), 1).unwrap(),
            F::from(3u32)
        );
        assert_eq!(
            table
                .value(&Variable::absolute(ColumnType::Witness, 0, 1), 3)
                .unwrap(),
            F::from(2u32)
        );
        assert_eq!(
            table
                .value(&Variable::special(SpecialSelector::AllNonFirstUsableRows, 0), 0)
                .unwrap(),
            F::zero()
        );
        assert_eq!(
            table
                .value(&Variable::special(SpecialSelector::AllUsableRows, 0), 3)
                .unwrap(),
            F::zero()
        );
        assert!(table.value(&Variable::selector(1, 0), 0).is_err());

        let mut padded = table.clone();
        padded.randomize_padding(&mut test_rng());
        assert_eq!(&padded.witnesses()[0][..3], &table.witnesses()[0][..3]);
    }
}
