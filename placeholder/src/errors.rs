use ark_std::{error, fmt, string::String};
use placeholder_algebra::prelude::AlgebraError;

pub(crate) type Result<T> = core::result::Result<T, PlaceholderError>;

/// Errors raised while preprocessing, proving, verifying or decoding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PlaceholderError {
    /// Algebra error
    Algebra(AlgebraError),
    /// Error with message
    Message(String),

    /// The encoded field or hash identifier is not supported.
    UnsupportedFieldOrHash,
    /// The field has no multiplicative subgroup large enough, or a polynomial
    /// is too large for the commitment domain.
    DomainTooSmall,
    /// The FRI step list is empty, contains a step out of range, or folds
    /// below the final polynomial.
    InvalidStepList,
    /// The table description is not a power of two or leaves no padding rows.
    InvalidTableDescription,

    /// A gate or lookup refers to a selector column that does not exist.
    SelectorOutOfRange,
    /// A variable refers to a column that does not exist.
    ColumnOutOfRange,
    /// An expression mixes relative and absolute variables.
    ExpressionRelativityMixed,
    /// A rotation cannot be expressed within the allowed window.
    NotLocallyRelativizable,
    /// A copy constraint touches the padding rows.
    CopyConstraintReferencesPadding,
    /// A lookup input has no matching row in its table.
    LookupTableMissing,
    /// A lookup input and its table do not have the same width.
    LookupTableMismatch,
    /// The assignment does not satisfy the given gate on the given row.
    UnsatisfiedConstraint {
        /// The index of the gate.
        gate: usize,
        /// The row on which the constraint fails.
        row: usize,
    },
    /// A copy constraint does not hold in the assignment.
    UnsatisfiedCopyConstraint(usize),

    /// A Merkle path does not lead to the committed root.
    MerklePathMismatch,
    /// The leaf index is outside the tree.
    LeafIndexOutOfRange,
    /// The batch has not been committed yet.
    BatchLabelNotCommitted(usize),
    /// The batch has already been committed and cannot be modified.
    BatchAlreadyCommitted(usize),
    /// No polynomial was ever appended to the batch.
    UnknownBatch(usize),
    /// An evaluation point lies inside the commitment domain.
    InvalidOpeningPoint,

    /// Folding a query does not match the next layer.
    FoldingInconsistency,
    /// The final polynomial exceeds its degree bound.
    FinalPolyDegreeExceeded,
    /// The proof-of-work nonce does not have enough leading zero bits.
    GrindingInsufficient,
    /// A query index does not fit in the evaluation domain.
    QueryIndexOutOfRange,

    /// The combined identity does not hold at the evaluation point.
    IdentityMismatch,
    /// A required evaluation is not present.
    MissingEvaluation,
    /// The shape of the proof does not match the circuit.
    ProofStructureError,
    /// The numerator is not divisible by the vanishing polynomial.
    QuotientNotDivisible,
    /// The quotient needs more chunks than the parameters allow.
    TooManyQuotientChunks,

    /// The input ended before the structure was complete.
    SerializationTruncated,
    /// The encoding version is not supported.
    SerializationVersionMismatch,
    /// The input is not a canonical encoding.
    SerializationMalformed,
}

impl fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PlaceholderError::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            Message(e) => f.write_str(e),
            UnsatisfiedConstraint { gate, row } => {
                write!(f, "Gate {} is not satisfied on row {}.", gate, row)
            }
            UnsatisfiedCopyConstraint(i) => write!(f, "Copy constraint {} is not satisfied.", i),
            BatchLabelNotCommitted(b) => write!(f, "Batch {} is not committed.", b),
            BatchAlreadyCommitted(b) => write!(f, "Batch {} is already committed.", b),
            UnknownBatch(b) => write!(f, "Batch {} has no polynomials.", b),
            other => f.write_str(match other {
                UnsupportedFieldOrHash => "Unsupported field or hash.",
                DomainTooSmall => "The evaluation domain is too small.",
                InvalidStepList => "Invalid FRI step list.",
                InvalidTableDescription => "Invalid table description.",
                SelectorOutOfRange => "Selector out of range.",
                ColumnOutOfRange => "Column out of range.",
                ExpressionRelativityMixed => "Expression mixes relative and absolute variables.",
                NotLocallyRelativizable => "Expression is not locally relativizable.",
                CopyConstraintReferencesPadding => "Copy constraint references padding rows.",
                LookupTableMissing => "Lookup value is missing from its table.",
                LookupTableMismatch => "Lookup input and table widths differ.",
                MerklePathMismatch => "Merkle path mismatch.",
                LeafIndexOutOfRange => "Leaf index out of range.",
                InvalidOpeningPoint => "Opening point lies in the commitment domain.",
                FoldingInconsistency => "FRI folding inconsistency.",
                FinalPolyDegreeExceeded => "Final polynomial degree exceeded.",
                GrindingInsufficient => "Proof-of-work is insufficient.",
                QueryIndexOutOfRange => "Query index out of range.",
                IdentityMismatch => "Placeholder identity mismatch.",
                MissingEvaluation => "Missing evaluation.",
                ProofStructureError => "Proof structure error.",
                QuotientNotDivisible => "Quotient is not divisible by the vanishing polynomial.",
                TooManyQuotientChunks => "Too many quotient chunks.",
                SerializationTruncated => "Serialized data is truncated.",
                SerializationVersionMismatch => "Serialized data has an unsupported version.",
                SerializationMalformed => "Serialized data is malformed.",
                _ => "Placeholder error.",
            }),
        }
    }
}

impl error::Error for PlaceholderError {}

impl From<AlgebraError> for PlaceholderError {
    fn from(e: AlgebraError) -> PlaceholderError {
        PlaceholderError::Algebra(e)
    }
}
