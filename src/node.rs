use std::fmt::{Display, Formatter};

use crate::reference::Ref;
use crate::sign::Sign;

/// Operator of an interior node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKind {
    Add,
    Mult,
    Div,
    Dot,
    Neg,
    Inv,
    Log2,
    Ln,
    Sum,
    Prod,
    /// Scalar view of one coordinate.
    Index(usize),
    /// Vector assembled from scalar operands.
    Stack,
    /// Constant matrix times vector.
    MatVec,
}

impl OpKind {
    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Mult => "mult",
            OpKind::Div => "div",
            OpKind::Dot => "dot",
            OpKind::Neg => "neg",
            OpKind::Inv => "inv",
            OpKind::Log2 => "log2",
            OpKind::Ln => "ln",
            OpKind::Sum => "sum",
            OpKind::Prod => "prod",
            OpKind::Index(_) => "index",
            OpKind::Stack => "stack",
            OpKind::MatVec => "matvec",
        }
    }

    /// Number of operands, or `None` for variadic operators.
    pub const fn arity(self) -> Option<usize> {
        match self {
            OpKind::Add | OpKind::Mult | OpKind::Div | OpKind::Dot | OpKind::MatVec => Some(2),
            OpKind::Stack => None,
            _ => Some(1),
        }
    }
}

impl Display for OpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Index(i) => write!(f, "index[{}]", i),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// A node of the expression DAG.
///
/// Nodes are immutable once stored in the arena. Operator nodes refer to their
/// operands by [`Ref`], never by pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Variable {
        lower: Vec<f64>,
        upper: Vec<f64>,
        sign: Sign,
    },
    Constant {
        values: Vec<f64>,
        sign: Sign,
    },
    /// Row-major constant matrix.
    Matrix {
        rows: usize,
        cols: usize,
        values: Vec<f64>,
        sign: Sign,
    },
    Op {
        kind: OpKind,
        args: Vec<Ref>,
        dim: usize,
        sign: Sign,
    },
}

impl Node {
    /// Length of the value vector this node produces.
    ///
    /// For a matrix this is the number of rows.
    pub fn dim(&self) -> usize {
        match self {
            Node::Variable { lower, .. } => lower.len(),
            Node::Constant { values, .. } => values.len(),
            Node::Matrix { rows, .. } => *rows,
            Node::Op { dim, .. } => *dim,
        }
    }

    pub fn sign(&self) -> Sign {
        match self {
            Node::Variable { sign, .. }
            | Node::Constant { sign, .. }
            | Node::Matrix { sign, .. }
            | Node::Op { sign, .. } => *sign,
        }
    }

    /// Operands of an operator node (empty for leaves).
    pub fn args(&self) -> &[Ref] {
        match self {
            Node::Op { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable { .. })
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Node::Matrix { .. })
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Node::Op { .. })
    }

    /// Copy of this node with its operands remapped through `f`.
    pub(crate) fn remap(&self, f: impl Fn(Ref) -> Ref) -> Node {
        match self {
            Node::Op {
                kind,
                args,
                dim,
                sign,
            } => Node::Op {
                kind: *kind,
                args: args.iter().map(|&a| f(a)).collect(),
                dim: *dim,
                sign: *sign,
            },
            other => other.clone(),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Variable { lower, sign, .. } => write!(f, "var(dim={}, sign={})", lower.len(), sign),
            Node::Constant { values, sign } => write!(f, "const({:?}, sign={})", values, sign),
            Node::Matrix {
                rows, cols, sign, ..
            } => write!(f, "matrix({}x{}, sign={})", rows, cols, sign),
            Node::Op {
                kind, args, dim, sign,
            } => {
                write!(f, "{}(", kind)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, "; dim={}, sign={})", dim, sign)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_accessors() {
        let node = Node::Op {
            kind: OpKind::Add,
            args: vec![Ref::new(1), Ref::new(2)],
            dim: 3,
            sign: Sign::NonNeg,
        };
        assert_eq!(node.dim(), 3);
        assert_eq!(node.sign(), Sign::NonNeg);
        assert_eq!(node.args(), &[Ref::new(1), Ref::new(2)]);
        assert!(!node.is_leaf());
        assert_eq!(node.to_string(), "add(@1, @2; dim=3, sign=NN)");
    }

    #[test]
    fn test_remap() {
        let node = Node::Op {
            kind: OpKind::Neg,
            args: vec![Ref::new(5)],
            dim: 1,
            sign: Sign::NonPos,
        };
        let moved = node.remap(|r| Ref::new(r.get() - 5));
        assert_eq!(moved.args(), &[Ref::new(0)]);
    }

    #[test]
    fn test_leaf_dims() {
        let m = Node::Matrix {
            rows: 2,
            cols: 3,
            values: vec![0.0; 6],
            sign: Sign::NonNeg,
        };
        assert_eq!(m.dim(), 2);
        assert!(m.is_matrix());
        assert!(m.args().is_empty());
    }
}
