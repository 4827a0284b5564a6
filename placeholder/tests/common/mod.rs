#![allow(dead_code)]

use placeholder_algebra::{bn254::BN254Scalar, prelude::*};
use placeholder_plonk::arithmetization::{
    AssignmentTable, ColumnType, ConstraintSystem, CopyConstraint, Expression, Gate, LookupGate,
    LookupInput, LookupTable, Selector, SpecialSelector, TableDescription, Variable,
};

pub type F = BN254Scalar;

/// A circuit together with a table satisfying it.
pub struct Circuit {
    pub desc: TableDescription,
    pub cs: ConstraintSystem<F>,
    pub table: AssignmentTable<F>,
    pub public_inputs: Vec<Vec<F>>,
}

/// `w(i+1) = w(i-1) + w(i)` on 127 usable rows, the first two values bound
/// to the public inputs.
pub fn fibonacci(first: u64, second: u64) -> Circuit {
    let desc = TableDescription::new(1, 1, 0, 1, 127, 128).unwrap();
    let step: Expression<F> = Expression::from(Variable::witness(0, -1)) + Variable::witness(0, 0)
        - Variable::witness(0, 1);
    let copies = (0..2)
        .map(|row| {
            CopyConstraint::new(
                Variable::absolute(ColumnType::Witness, 0, row),
                Variable::absolute(ColumnType::PublicInput, 0, row),
            )
        })
        .collect();
    let cs = ConstraintSystem::new(
        vec![Gate::new(Selector::Column(0), vec![step])],
        copies,
        vec![],
        vec![],
    );

    let mut w = vec![F::from(first), F::from(second)];
    for i in 2..127 {
        let next = w[i - 2].add(&w[i - 1]);
        w.push(next);
    }
    let mut selector = vec![F::zero(); 127];
    for s in selector.iter_mut().take(126).skip(1) {
        *s = F::one();
    }
    let public_inputs = vec![vec![F::from(first), F::from(second)]];
    let table = AssignmentTable::new(
        desc,
        vec![w],
        public_inputs.clone(),
        vec![],
        vec![selector],
    )
    .unwrap();
    Circuit {
        desc,
        cs,
        table,
        public_inputs,
    }
}

/// Every usable witness cell is a byte, looked up in a constant column.
///
/// The table column holds `i mod period` on its first `table_rows` rows, so a
/// period below `table_rows` repeats table entries.
pub fn byte_range(values: &[u64], table_rows: usize, period: u64) -> Circuit {
    let desc = TableDescription::new(1, 0, 1, 1, 511, 512).unwrap();
    let range = LookupTable::new(Selector::Column(0), vec![vec![Variable::constant(0, 0)]]);
    let lookup = LookupGate::new(
        Selector::Special(SpecialSelector::AllUsableRows),
        vec![LookupInput {
            table_id: 0,
            values: vec![Expression::from(Variable::witness(0, 0))],
        }],
    );
    let cs = ConstraintSystem::new(vec![], vec![], vec![lookup], vec![range]);

    let witness = values.iter().map(|v| F::from(*v)).collect();
    let constants = (0..table_rows as u64).map(|i| F::from(i % period)).collect();
    let selector = vec![F::one(); table_rows];
    let table = AssignmentTable::new(
        desc,
        vec![witness],
        vec![],
        vec![constants],
        vec![selector],
    )
    .unwrap();
    Circuit {
        desc,
        cs,
        table,
        public_inputs: vec![],
    }
}

/// `a · b = c` on every usable row.
pub fn products(rows: usize) -> Circuit {
    let desc = TableDescription::with_usable_rows(3, 0, 0, 1, rows).unwrap();
    let mul: Expression<F> = Expression::from(Variable::witness(0, 0)) * Variable::witness(1, 0)
        - Variable::witness(2, 0);
    let cs = ConstraintSystem::new(
        vec![Gate::new(Selector::Column(0), vec![mul])],
        vec![],
        vec![],
        vec![],
    );
    let a: Vec<F> = (0..rows as u64).map(|i| F::from(i + 3)).collect();
    let b: Vec<F> = (0..rows as u64).map(|i| F::from(2 * i + 1)).collect();
    let c = a.iter().zip(b.iter()).map(|(x, y)| x.mul(y)).collect();
    let selector = vec![F::one(); rows];
    let table = AssignmentTable::new(desc, vec![a, b, c], vec![], vec![], vec![selector]).unwrap();
    Circuit {
        desc,
        cs,
        table,
        public_inputs: vec![],
    }
}
