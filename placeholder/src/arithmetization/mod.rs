//! Circuits: variables, expressions, gates, tables and their polynomials.

/// Module for the constraint system.
pub mod constraint_system;

/// Module for expressions over table cells.
pub mod expression;

/// Module for gates, copy constraints and lookups.
pub mod gate;

/// Module for the polynomial form of a table.
pub mod polynomial_table;

/// Module for table descriptions and assignments.
pub mod table;

/// Module for variables.
pub mod variable;

pub use constraint_system::{ColumnsRotations, ConstraintSystem};
pub use expression::Expression;
pub use gate::{CopyConstraint, Gate, LookupGate, LookupInput, LookupTable};
pub use polynomial_table::{ColumnCache, PolynomialTable};
pub use table::{AssignmentTable, TableDescription, PADDING_ROWS};
pub use variable::{ColumnType, Selector, SpecialSelector, Variable};
