use ark_std::fmt;

/// The four kinds of columns of an assignment table, plus the special
/// selectors that are not stored as columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnType {
    /// Private witness column.
    Witness,
    /// Public input column.
    PublicInput,
    /// Fixed constant column.
    Constant,
    /// Fixed selector column.
    Selector,
    /// One of the [`SpecialSelector`] masks; the index is its code.
    Special,
}

/// Masks that gates and lookups may use in place of a selector column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialSelector {
    /// One on every usable row.
    AllUsableRows,
    /// One on every usable row except row 0.
    AllNonFirstUsableRows,
    /// One on every row, padding included.
    AllRows,
}

impl SpecialSelector {
    /// All special selectors in code order.
    pub const ALL: [SpecialSelector; 3] = [
        SpecialSelector::AllUsableRows,
        SpecialSelector::AllNonFirstUsableRows,
        SpecialSelector::AllRows,
    ];

    /// Return the code used as the column index.
    pub fn code(&self) -> usize {
        match self {
            SpecialSelector::AllUsableRows => 0,
            SpecialSelector::AllNonFirstUsableRows => 1,
            SpecialSelector::AllRows => 2,
        }
    }

    /// Recover the selector from its code.
    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.get(code).copied()
    }
}

/// The selector that switches a gate or a lookup on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// A selector column of the table.
    Column(usize),
    /// A precomputed mask.
    Special(SpecialSelector),
}

impl Selector {
    /// The selector as a relative variable at rotation 0.
    pub fn variable(&self) -> Variable {
        match self {
            Selector::Column(i) => Variable::selector(*i, 0),
            Selector::Special(s) => Variable::special(*s, 0),
        }
    }
}

/// A reference to a cell.
///
/// A relative variable points to `rotation` rows away from the row the
/// constraint is evaluated on. An absolute variable points to the row stored
/// in `rotation`, and is used by copy constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable {
    /// The type of the column.
    pub column_type: ColumnType,
    /// The index of the column among the columns of the same type.
    pub index: usize,
    /// The rotation, or the row for an absolute variable.
    pub rotation: i32,
    /// Whether the rotation is relative to the current row.
    pub relative: bool,
}

impl Variable {
    /// Create a relative variable.
    pub fn new(column_type: ColumnType, index: usize, rotation: i32) -> Self {
        Self {
            column_type,
            index,
            rotation,
            relative: true,
        }
    }

    /// Create an absolute variable pointing to `row`.
    pub fn absolute(column_type: ColumnType, index: usize, row: usize) -> Self {
        Self {
            column_type,
            index,
            rotation: row as i32,
            relative: false,
        }
    }

    /// Relative witness variable.
    pub fn witness(index: usize, rotation: i32) -> Self {
        Self::new(ColumnType::Witness, index, rotation)
    }

    /// Relative public input variable.
    pub fn public_input(index: usize, rotation: i32) -> Self {
        Self::new(ColumnType::PublicInput, index, rotation)
    }

    /// Relative constant variable.
    pub fn constant(index: usize, rotation: i32) -> Self {
        Self::new(ColumnType::Constant, index, rotation)
    }

    /// Relative selector variable.
    pub fn selector(index: usize, rotation: i32) -> Self {
        Self::new(ColumnType::Selector, index, rotation)
    }

    /// Relative special selector variable.
    pub fn special(selector: SpecialSelector, rotation: i32) -> Self {
        Self::new(ColumnType::Special, selector.code(), rotation)
    }

    /// The same column with another rotation.
    pub fn with_rotation(&self, rotation: i32) -> Self {
        Self { rotation, ..*self }
    }

    /// Return the row of an absolute variable.
    pub fn row(&self) -> Option<usize> {
        if self.relative || self.rotation < 0 {
            None
        } else {
            Some(self.rotation as usize)
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = match self.column_type {
            ColumnType::Witness => "w",
            ColumnType::PublicInput => "p",
            ColumnType::Constant => "c",
            ColumnType::Selector => "s",
            ColumnType::Special => "special",
        };
        if self.relative {
            write!(f, "{}{}[{:+}]", t, self.index, self.rotation)
        } else {
            write!(f, "{}{}@{}", t, self.index, self.rotation)
        }
    }
}
