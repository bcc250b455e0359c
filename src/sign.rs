//! Monotonicity signs and their closure table.
//!
//! Every expression carries a [`Sign`] computed once, at construction time, from
//! its operator and the signs of its operands. The sign tells which orientation
//! of each operand the evaluator must read to keep the result increasing in the
//! increasing argument and decreasing in the decreasing argument.
//!
//! The table here is the only place where operand signs are combined. Builders in
//! [`Session`][crate::session::Session] consult it before a node is created.

use std::fmt::{Display, Formatter};

use crate::error::Error;
use crate::node::OpKind;

/// Monotonicity class of an expression.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Sign {
    /// Non-negative everywhere on the domain.
    NonNeg,
    /// Non-positive everywhere on the domain.
    NonPos,
    /// Sign not known; evaluation splits values into positive and negative parts.
    Unknown,
}

impl Sign {
    /// Sign of a constant vector.
    ///
    /// All-zero vectors are classified as [`Sign::NonNeg`].
    pub fn of_values(values: &[f64]) -> Self {
        if values.iter().all(|&v| v >= 0.0) {
            Sign::NonNeg
        } else if values.iter().all(|&v| v <= 0.0) {
            Sign::NonPos
        } else {
            Sign::Unknown
        }
    }

    /// Sign of a variable confined to `[lower, upper]`.
    pub fn of_bounds(lower: &[f64], upper: &[f64]) -> Self {
        if lower.iter().all(|&v| v >= 0.0) {
            Sign::NonNeg
        } else if upper.iter().all(|&v| v <= 0.0) {
            Sign::NonPos
        } else {
            Sign::Unknown
        }
    }

    pub fn is_known(self) -> bool {
        self != Sign::Unknown
    }

    /// Sign after negation.
    pub fn flip(self) -> Self {
        match self {
            Sign::NonNeg => Sign::NonPos,
            Sign::NonPos => Sign::NonNeg,
            Sign::Unknown => Sign::Unknown,
        }
    }

    /// Sign of `a + b`.
    pub fn add(a: Sign, b: Sign) -> Self {
        match (a, b) {
            (Sign::NonNeg, Sign::NonNeg) => Sign::NonNeg,
            (Sign::NonPos, Sign::NonPos) => Sign::NonPos,
            _ => Sign::Unknown,
        }
    }

    /// Sign of an elementwise product.
    ///
    /// Shared by `mult`, `div` (the inverse keeps the divisor's sign) and `dot`.
    pub fn mult(a: Sign, b: Sign) -> Self {
        match (a, b) {
            (Sign::NonNeg, Sign::NonNeg) | (Sign::NonPos, Sign::NonPos) => Sign::NonNeg,
            (Sign::NonNeg, Sign::NonPos) | (Sign::NonPos, Sign::NonNeg) => Sign::NonPos,
            (Sign::Unknown, _) | (_, Sign::Unknown) => Sign::Unknown,
        }
    }

    /// Sign of a stacked vector built from scalars of the given signs.
    pub fn stack(signs: impl IntoIterator<Item = Sign>) -> Self {
        signs
            .into_iter()
            .reduce(|acc, s| if acc == s { acc } else { Sign::Unknown })
            .unwrap_or(Sign::Unknown)
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Sign::NonNeg => write!(f, "NN"),
            Sign::NonPos => write!(f, "NP"),
            Sign::Unknown => write!(f, "U"),
        }
    }
}

/// Result sign of a unary operator.
pub fn unary(op: OpKind, a: Sign) -> Result<Sign, Error> {
    match op {
        OpKind::Neg => Ok(a.flip()),
        OpKind::Inv => Ok(a),
        OpKind::Log2 | OpKind::Ln => match a {
            Sign::NonPos => Err(Error::UnsupportedSignCombination {
                op,
                signs: vec![a],
            }),
            _ => Ok(Sign::Unknown),
        },
        OpKind::Sum | OpKind::Index(_) => Ok(a),
        OpKind::Prod => match a {
            Sign::NonNeg => Ok(Sign::NonNeg),
            _ => Err(Error::InvalidOperandSign { op, sign: a }),
        },
        _ => Err(Error::UnsupportedSignCombination {
            op,
            signs: vec![a],
        }),
    }
}

/// Result sign of a binary operator.
pub fn binary(op: OpKind, a: Sign, b: Sign) -> Result<Sign, Error> {
    match op {
        OpKind::Add => Ok(Sign::add(a, b)),
        OpKind::Mult | OpKind::Div | OpKind::Dot => Ok(Sign::mult(a, b)),
        _ => Err(Error::UnsupportedSignCombination {
            op,
            signs: vec![a, b],
        }),
    }
}

/// Result sign of a constant matrix applied to an operand of sign `v`.
pub fn matvec(m: Sign, v: Sign) -> Sign {
    match m {
        Sign::NonNeg if v.is_known() => v,
        Sign::NonPos if v.is_known() => v.flip(),
        _ => Sign::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const ALL: [Sign; 3] = [Sign::NonNeg, Sign::NonPos, Sign::Unknown];

    #[test]
    fn test_of_values() {
        assert_eq!(Sign::of_values(&[0.0, 1.0]), Sign::NonNeg);
        assert_eq!(Sign::of_values(&[0.0, 0.0]), Sign::NonNeg);
        assert_eq!(Sign::of_values(&[-1.0, 0.0]), Sign::NonPos);
        assert_eq!(Sign::of_values(&[-1.0, 2.0]), Sign::Unknown);
    }

    #[test]
    fn test_of_bounds() {
        assert_eq!(Sign::of_bounds(&[0.0], &[1.0]), Sign::NonNeg);
        assert_eq!(Sign::of_bounds(&[-2.0], &[0.0]), Sign::NonPos);
        assert_eq!(Sign::of_bounds(&[-1.0, 0.0], &[1.0, 1.0]), Sign::Unknown);
    }

    #[test]
    fn test_add_table() {
        for a in ALL {
            for b in ALL {
                let expected = match (a, b) {
                    (Sign::NonNeg, Sign::NonNeg) => Sign::NonNeg,
                    (Sign::NonPos, Sign::NonPos) => Sign::NonPos,
                    _ => Sign::Unknown,
                };
                assert_eq!(binary(OpKind::Add, a, b).unwrap(), expected, "add({a}, {b})");
            }
        }
    }

    #[test]
    fn test_mult_table() {
        use Sign::*;
        let table = [
            (NonNeg, NonNeg, NonNeg),
            (NonPos, NonPos, NonNeg),
            (NonNeg, NonPos, NonPos),
            (NonPos, NonNeg, NonPos),
            (Unknown, NonNeg, Unknown),
            (NonNeg, Unknown, Unknown),
            (Unknown, NonPos, Unknown),
            (NonPos, Unknown, Unknown),
            (Unknown, Unknown, Unknown),
        ];
        for (a, b, expected) in table {
            for op in [OpKind::Mult, OpKind::Div, OpKind::Dot] {
                assert_eq!(binary(op, a, b).unwrap(), expected, "{op}({a}, {b})");
            }
        }
    }

    #[test]
    fn test_mult_is_symmetric() {
        for a in ALL {
            for b in ALL {
                assert_eq!(Sign::mult(a, b), Sign::mult(b, a));
            }
        }
    }

    #[test]
    fn test_unary_rules() {
        assert_eq!(unary(OpKind::Neg, Sign::NonNeg).unwrap(), Sign::NonPos);
        assert_eq!(unary(OpKind::Neg, Sign::NonPos).unwrap(), Sign::NonNeg);
        assert_eq!(unary(OpKind::Neg, Sign::Unknown).unwrap(), Sign::Unknown);
        assert_eq!(unary(OpKind::Inv, Sign::NonPos).unwrap(), Sign::NonPos);
        assert_eq!(unary(OpKind::Ln, Sign::NonNeg).unwrap(), Sign::Unknown);
        assert_eq!(unary(OpKind::Log2, Sign::Unknown).unwrap(), Sign::Unknown);
        assert_eq!(unary(OpKind::Sum, Sign::NonPos).unwrap(), Sign::NonPos);
        assert_eq!(unary(OpKind::Prod, Sign::NonNeg).unwrap(), Sign::NonNeg);
    }

    #[test]
    fn test_log_of_nonpositive_is_rejected() {
        assert!(matches!(
            unary(OpKind::Ln, Sign::NonPos),
            Err(Error::UnsupportedSignCombination { .. })
        ));
    }

    #[test]
    fn test_prod_requires_nonneg() {
        for sign in [Sign::NonPos, Sign::Unknown] {
            assert!(matches!(
                unary(OpKind::Prod, sign),
                Err(Error::InvalidOperandSign { .. })
            ));
        }
    }

    #[test]
    fn test_stack() {
        assert_eq!(Sign::stack([Sign::NonNeg, Sign::NonNeg]), Sign::NonNeg);
        assert_eq!(Sign::stack([Sign::NonPos]), Sign::NonPos);
        assert_eq!(Sign::stack([Sign::NonNeg, Sign::NonPos]), Sign::Unknown);
        assert_eq!(Sign::stack([]), Sign::Unknown);
    }

    #[test]
    fn test_matvec() {
        assert_eq!(matvec(Sign::NonNeg, Sign::NonPos), Sign::NonPos);
        assert_eq!(matvec(Sign::NonPos, Sign::NonNeg), Sign::NonPos);
        assert_eq!(matvec(Sign::NonPos, Sign::NonPos), Sign::NonNeg);
        assert_eq!(matvec(Sign::Unknown, Sign::NonNeg), Sign::Unknown);
        assert_eq!(matvec(Sign::NonNeg, Sign::Unknown), Sign::Unknown);
    }
}
