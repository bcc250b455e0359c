use std::fmt::{Display, Formatter};

use crate::reference::Ref;

/// Relation between the two sides of a constraint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Relation {
    /// `left >= right`
    Ge,
    /// `left <= right`
    Le,
    /// `left != right`
    Ne,
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Ge => write!(f, ">="),
            Relation::Le => write!(f, "<="),
            Relation::Ne => write!(f, "!="),
        }
    }
}

/// An elementwise relation between two expressions of equal dimension.
///
/// Internally the constraint is a single expression, the residual
/// `right - left`: `>=` holds where the residual is non-positive, `<=` where it
/// is non-negative, and `!=` where it is non-zero. Build one with
/// [`Session::constraint`][crate::session::Session::constraint].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Constraint {
    relation: Relation,
    left: Ref,
    right: Ref,
    residual: Ref,
}

impl Constraint {
    pub(crate) fn new(relation: Relation, left: Ref, right: Ref, residual: Ref) -> Self {
        Self {
            relation,
            left,
            right,
            residual,
        }
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn left(&self) -> Ref {
        self.left
    }

    pub fn right(&self) -> Ref {
        self.right
    }

    pub fn residual(&self) -> Ref {
        self.residual
    }

    /// Whether the relation holds at every coordinate of the residual values `r`.
    pub fn holds(&self, r: &[f64]) -> bool {
        match self.relation {
            Relation::Ge => r.iter().all(|&v| v <= 0.0),
            Relation::Le => r.iter().all(|&v| v >= 0.0),
            Relation::Ne => r.iter().all(|&v| v != 0.0),
        }
    }

    /// Whether the relation is violated everywhere on a box, given the lower
    /// (`lo`) and upper (`hi`) bounds of the residual over that box.
    pub fn excludes(&self, lo: &[f64], hi: &[f64]) -> bool {
        match self.relation {
            Relation::Ge => lo.iter().any(|&v| v > 0.0),
            Relation::Le => hi.iter().any(|&v| v < 0.0),
            Relation::Ne => lo.iter().zip(hi).any(|(&a, &b)| a == 0.0 && b == 0.0),
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}
