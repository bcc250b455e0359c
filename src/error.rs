use thiserror::Error;

use crate::node::OpKind;
use crate::reference::Ref;
use crate::sign::Sign;

/// Construction-time failures.
///
/// None of these leave a partially built node behind: the arena is only
/// appended to after every check has passed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("dimension mismatch in {op}: {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{op} takes {expected} operand(s), got {found}")]
    Arity {
        op: OpKind,
        expected: usize,
        found: usize,
    },

    #[error("no monotonic composition for {op} with operand signs {signs:?}")]
    UnsupportedSignCombination { op: OpKind, signs: Vec<Sign> },

    #[error("{op} requires non-negative operands, got sign {sign}")]
    InvalidOperandSign { op: OpKind, sign: Sign },

    #[error("invalid bounds at coordinate {index}: upper {upper} < lower {lower}")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },

    #[error("{op} has no operands")]
    EmptyOperand { op: &'static str },

    #[error("non-finite value {value}")]
    NonFiniteConstant { value: f64 },

    #[error("index {index} out of range for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    #[error("matrix operand not allowed in {op}")]
    MatrixOperand { op: &'static str },

    #[error("node {node} is not a matrix")]
    NotAMatrix { node: Ref },

    #[error("node {node} does not belong to this session")]
    UnknownNode { node: Ref },

    #[error("node {node} is not a variable")]
    NotAVariable { node: Ref },

    #[error("expression depends on variable {node}, which is not the optimization variable")]
    ForeignVariable { node: Ref },

    #[error("objective must be scalar, got dimension {dim}")]
    NonScalarObjective { dim: usize },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("evaluation failed")]
    Eval(#[from] EvalError),
}

/// Evaluation-time failures.
///
/// Inside the solver these only degrade the box being bounded.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EvalError {
    #[error("division by zero at coordinate {index} of {node}")]
    DivisionByZero { node: Ref, index: usize },

    #[error("logarithm of non-positive value {value} at coordinate {index} of {node}")]
    DomainError { node: Ref, index: usize, value: f64 },

    #[error("argument has dimension {found}, expected {expected}")]
    ArgumentDimension { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = Error::DimensionMismatch {
            op: "add",
            left: 2,
            right: 3,
        };
        assert_eq!(e.to_string(), "dimension mismatch in add: 2 vs 3");

        let e = EvalError::DivisionByZero {
            node: Ref::new(4),
            index: 1,
        };
        assert_eq!(e.to_string(), "division by zero at coordinate 1 of @4");
    }

    #[test]
    fn test_eval_error_converts() {
        let e: Error = EvalError::ArgumentDimension {
            expected: 3,
            found: 2,
        }
        .into();
        assert!(matches!(e, Error::Eval(EvalError::ArgumentDimension { .. })));
    }
}
