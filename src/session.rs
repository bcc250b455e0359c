use std::cell::RefCell;
use std::fmt::Debug;

use log::debug;

use crate::cache::{ConstKey, ParamCache};
use crate::constraint::{Constraint, Relation};
use crate::error::Error;
use crate::eval::{Demand, Program};
use crate::node::{Node, OpKind};
use crate::reference::Ref;
use crate::sign::{self, Sign};

/// Build session: the node arena plus its constant cache.
///
/// All expressions are created through a session and addressed by [`Ref`].
/// Nodes are never modified or removed, so a handle stays valid for the
/// lifetime of the session. Independent problems should use independent
/// sessions.
pub struct Session {
    nodes: RefCell<Vec<Node>>,
    cache: RefCell<ParamCache>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
            cache: RefCell::new(ParamCache::new()),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("Session")
            .field("size", &self.nodes.borrow().len())
            .field("constants", &cache.len())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Session {
    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Number of distinct constant leaves registered so far.
    pub fn num_constants(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn node(&self, node: Ref) -> Node {
        self.nodes.borrow()[node.index()].clone()
    }

    pub fn dim(&self, node: Ref) -> usize {
        self.nodes.borrow()[node.index()].dim()
    }

    pub fn sign(&self, node: Ref) -> Sign {
        self.nodes.borrow()[node.index()].sign()
    }

    pub(crate) fn check(&self, node: Ref) -> Result<(), Error> {
        if node.index() < self.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode { node })
        }
    }

    /// Compile the sub-DAG below `root`.
    pub(crate) fn compile(&self, root: Ref, demand: Demand) -> Program {
        Program::compile(&self.nodes.borrow(), root, demand)
    }

    fn push(&self, node: Node) -> Ref {
        let mut nodes = self.nodes.borrow_mut();
        let r = Ref::new(nodes.len() as u32);
        nodes.push(node);
        r
    }
}

impl Session {
    /// Create a decision variable of dimension `dim` confined to `[lower, upper]`.
    ///
    /// Each bound is either a single value, broadcast to every coordinate, or a
    /// vector of length `dim`. The variable's sign is fixed here from its bounds.
    pub fn mk_var(&self, dim: usize, lower: &[f64], upper: &[f64]) -> Result<Ref, Error> {
        debug!("mk_var(dim = {}, lower = {:?}, upper = {:?})", dim, lower, upper);

        if dim == 0 {
            return Err(Error::EmptyOperand { op: "variable" });
        }
        let broadcast = |b: &[f64]| -> Result<Vec<f64>, Error> {
            match b.len() {
                1 => Ok(vec![b[0]; dim]),
                n if n == dim => Ok(b.to_vec()),
                n => Err(Error::DimensionMismatch {
                    op: "variable",
                    left: dim,
                    right: n,
                }),
            }
        };
        let lower = broadcast(lower)?;
        let upper = broadcast(upper)?;
        for (index, (&l, &u)) in lower.iter().zip(&upper).enumerate() {
            if !l.is_finite() || !u.is_finite() {
                return Err(Error::NonFiniteConstant {
                    value: if l.is_finite() { u } else { l },
                });
            }
            if u < l {
                return Err(Error::InvalidBounds {
                    index,
                    lower: l,
                    upper: u,
                });
            }
        }

        let sign = Sign::of_bounds(&lower, &upper);
        Ok(self.push(Node::Variable { lower, upper, sign }))
    }

    /// Constant vector leaf. Equal constants share one node.
    pub fn constant(&self, values: &[f64]) -> Result<Ref, Error> {
        if values.is_empty() {
            return Err(Error::EmptyOperand { op: "constant" });
        }
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::NonFiniteConstant { value });
        }

        let key = ConstKey::vector(values);
        if let Some(r) = self.cache.borrow_mut().get(&key) {
            return Ok(r);
        }

        let r = self.push(Node::Constant {
            values: values.to_vec(),
            sign: Sign::of_values(values),
        });
        debug!("constant({:?}) -> {}", values, r);
        self.cache.borrow_mut().insert(key, r);
        Ok(r)
    }

    pub fn scalar(&self, value: f64) -> Result<Ref, Error> {
        self.constant(&[value])
    }

    /// Constant `rows x cols` matrix, given row-major. Only usable as the
    /// first operand of [`Session::apply_matvec`].
    pub fn matrix(&self, rows: usize, cols: usize, values: &[f64]) -> Result<Ref, Error> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyOperand { op: "matrix" });
        }
        if values.len() != rows * cols {
            return Err(Error::DimensionMismatch {
                op: "matrix",
                left: rows * cols,
                right: values.len(),
            });
        }
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::NonFiniteConstant { value });
        }

        let key = ConstKey::matrix(rows, cols, values);
        if let Some(r) = self.cache.borrow_mut().get(&key) {
            return Ok(r);
        }

        let r = self.push(Node::Matrix {
            rows,
            cols,
            values: values.to_vec(),
            sign: Sign::of_values(values),
        });
        debug!("matrix({}x{}) -> {}", rows, cols, r);
        self.cache.borrow_mut().insert(key, r);
        Ok(r)
    }
}

/// Result dimension of an elementwise binary operator.
fn broadcast(op: OpKind, a: usize, b: usize) -> Result<usize, Error> {
    if a == b || b == 1 {
        Ok(a)
    } else if a == 1 {
        Ok(b)
    } else {
        Err(Error::DimensionMismatch {
            op: op.name(),
            left: a,
            right: b,
        })
    }
}

impl Session {
    /// Build an operator node.
    ///
    /// Operand shapes and signs are validated before anything is added to the
    /// arena; on error the session is unchanged.
    pub fn apply(&self, kind: OpKind, args: &[Ref]) -> Result<Ref, Error> {
        for &a in args {
            self.check(a)?;
        }
        match kind.arity() {
            Some(n) if n != args.len() => {
                return Err(Error::Arity {
                    op: kind,
                    expected: n,
                    found: args.len(),
                })
            }
            None if args.is_empty() => return Err(Error::EmptyOperand { op: kind.name() }),
            _ => {}
        }

        let (dim, sign) = {
            let nodes = self.nodes.borrow();
            let node = |r: Ref| &nodes[r.index()];

            for (i, &a) in args.iter().enumerate() {
                let matrix_slot = kind == OpKind::MatVec && i == 0;
                if node(a).is_matrix() != matrix_slot {
                    return Err(if matrix_slot {
                        Error::NotAMatrix { node: a }
                    } else {
                        Error::MatrixOperand { op: kind.name() }
                    });
                }
            }

            match kind {
                OpKind::Add | OpKind::Mult | OpKind::Div => {
                    let (a, b) = (node(args[0]), node(args[1]));
                    let dim = broadcast(kind, a.dim(), b.dim())?;
                    (dim, sign::binary(kind, a.sign(), b.sign())?)
                }
                OpKind::Dot => {
                    let (a, b) = (node(args[0]), node(args[1]));
                    if a.dim() != b.dim() {
                        return Err(Error::DimensionMismatch {
                            op: kind.name(),
                            left: a.dim(),
                            right: b.dim(),
                        });
                    }
                    (1, sign::binary(kind, a.sign(), b.sign())?)
                }
                OpKind::Neg | OpKind::Inv | OpKind::Log2 | OpKind::Ln => {
                    let a = node(args[0]);
                    (a.dim(), sign::unary(kind, a.sign())?)
                }
                OpKind::Sum | OpKind::Prod => {
                    let a = node(args[0]);
                    (1, sign::unary(kind, a.sign())?)
                }
                OpKind::Index(index) => {
                    let a = node(args[0]);
                    if index >= a.dim() {
                        return Err(Error::IndexOutOfRange {
                            index,
                            dim: a.dim(),
                        });
                    }
                    (1, sign::unary(kind, a.sign())?)
                }
                OpKind::Stack => {
                    if let Some(a) = args.iter().map(|&a| node(a)).find(|a| a.dim() != 1) {
                        return Err(Error::DimensionMismatch {
                            op: kind.name(),
                            left: 1,
                            right: a.dim(),
                        });
                    }
                    (args.len(), Sign::stack(args.iter().map(|&a| node(a).sign())))
                }
                OpKind::MatVec => {
                    let (m, v) = (node(args[0]), node(args[1]));
                    let (rows, cols) = match m {
                        Node::Matrix { rows, cols, .. } => (*rows, *cols),
                        _ => return Err(Error::NotAMatrix { node: args[0] }),
                    };
                    if v.dim() != cols {
                        return Err(Error::DimensionMismatch {
                            op: kind.name(),
                            left: cols,
                            right: v.dim(),
                        });
                    }
                    (rows, sign::matvec(m.sign(), v.sign()))
                }
            }
        };

        Ok(self.push(Node::Op {
            kind,
            args: args.to_vec(),
            dim,
            sign,
        }))
    }

    pub fn apply_add(&self, a: Ref, b: Ref) -> Result<Ref, Error> {
        debug!("apply_add(a = {}, b = {})", a, b);
        self.apply(OpKind::Add, &[a, b])
    }

    /// `a - b`, built as `a + (-b)`.
    pub fn apply_sub(&self, a: Ref, b: Ref) -> Result<Ref, Error> {
        debug!("apply_sub(a = {}, b = {})", a, b);
        let nb = self.apply_neg(b)?;
        self.apply_add(a, nb)
    }

    pub fn apply_mult(&self, a: Ref, b: Ref) -> Result<Ref, Error> {
        debug!("apply_mult(a = {}, b = {})", a, b);
        self.apply(OpKind::Mult, &[a, b])
    }

    pub fn apply_div(&self, a: Ref, b: Ref) -> Result<Ref, Error> {
        debug!("apply_div(a = {}, b = {})", a, b);
        self.apply(OpKind::Div, &[a, b])
    }

    pub fn apply_dot(&self, a: Ref, b: Ref) -> Result<Ref, Error> {
        debug!("apply_dot(a = {}, b = {})", a, b);
        self.apply(OpKind::Dot, &[a, b])
    }

    pub fn apply_neg(&self, a: Ref) -> Result<Ref, Error> {
        debug!("apply_neg(a = {})", a);
        self.apply(OpKind::Neg, &[a])
    }

    pub fn apply_inv(&self, a: Ref) -> Result<Ref, Error> {
        debug!("apply_inv(a = {})", a);
        self.apply(OpKind::Inv, &[a])
    }

    pub fn apply_log2(&self, a: Ref) -> Result<Ref, Error> {
        debug!("apply_log2(a = {})", a);
        self.apply(OpKind::Log2, &[a])
    }

    pub fn apply_ln(&self, a: Ref) -> Result<Ref, Error> {
        debug!("apply_ln(a = {})", a);
        self.apply(OpKind::Ln, &[a])
    }

    pub fn apply_sum(&self, a: Ref) -> Result<Ref, Error> {
        debug!("apply_sum(a = {})", a);
        self.apply(OpKind::Sum, &[a])
    }

    pub fn apply_prod(&self, a: Ref) -> Result<Ref, Error> {
        debug!("apply_prod(a = {})", a);
        self.apply(OpKind::Prod, &[a])
    }

    pub fn apply_index(&self, a: Ref, index: usize) -> Result<Ref, Error> {
        debug!("apply_index(a = {}, index = {})", a, index);
        self.apply(OpKind::Index(index), &[a])
    }

    pub fn apply_stack(&self, items: &[Ref]) -> Result<Ref, Error> {
        debug!("apply_stack(items = {:?})", items);
        self.apply(OpKind::Stack, items)
    }

    pub fn apply_matvec(&self, m: Ref, v: Ref) -> Result<Ref, Error> {
        debug!("apply_matvec(m = {}, v = {})", m, v);
        self.apply(OpKind::MatVec, &[m, v])
    }
}

impl Session {
    /// Relate two expressions of equal dimension.
    pub fn constraint(&self, relation: Relation, left: Ref, right: Ref) -> Result<Constraint, Error> {
        debug!("constraint({} {} {})", left, relation, right);
        self.check(left)?;
        self.check(right)?;
        let (dl, dr) = (self.dim(left), self.dim(right));
        if dl != dr {
            return Err(Error::DimensionMismatch {
                op: "constraint",
                left: dl,
                right: dr,
            });
        }
        let residual = self.apply_sub(right, left)?;
        Ok(Constraint::new(relation, left, right, residual))
    }

    /// Evaluate `f` at increasing argument `x` and decreasing argument `y`.
    ///
    /// With `x == y` this is the plain value of the expression at that point.
    pub fn evaluate(&self, f: Ref, x: &[f64], y: &[f64]) -> Result<Vec<f64>, Error> {
        self.check(f)?;
        if self.nodes.borrow()[f.index()].is_matrix() {
            return Err(Error::MatrixOperand { op: "evaluate" });
        }
        let program = self.compile(f, Demand::SAME);
        Ok(program.evaluate(x, y)?)
    }

    /// Whether `c` holds when its residual is evaluated at `(x, y)`.
    pub fn is_feasible(&self, c: &Constraint, x: &[f64], y: &[f64]) -> Result<bool, Error> {
        let r = self.evaluate(c.residual(), x, y)?;
        Ok(c.holds(&r))
    }

    /// Render `f` in infix notation.
    pub fn to_expr_string(&self, f: Ref) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        render(&nodes, f, &mut out);
        out
    }
}

fn render(nodes: &[Node], r: Ref, out: &mut String) {
    use std::fmt::Write;

    let list = |vs: &[f64], out: &mut String| {
        if let [v] = vs {
            let _ = write!(out, "{}", v);
        } else {
            let _ = write!(out, "{:?}", vs);
        }
    };

    match &nodes[r.index()] {
        Node::Variable { .. } => {
            let _ = write!(out, "x{}", r);
        }
        Node::Constant { values, .. } => list(values, out),
        Node::Matrix { rows, cols, .. } => {
            let _ = write!(out, "M{}[{}x{}]", r, rows, cols);
        }
        Node::Op { kind, args, .. } => {
            let infix = match kind {
                OpKind::Add => Some(" + "),
                OpKind::Mult => Some(" * "),
                OpKind::Div => Some(" / "),
                OpKind::MatVec => Some(" @ "),
                _ => None,
            };
            match (kind, infix) {
                (_, Some(symbol)) => {
                    out.push('(');
                    render(nodes, args[0], out);
                    out.push_str(symbol);
                    render(nodes, args[1], out);
                    out.push(')');
                }
                (OpKind::Neg, _) => {
                    out.push('-');
                    render(nodes, args[0], out);
                }
                (OpKind::Index(i), _) => {
                    render(nodes, args[0], out);
                    let _ = write!(out, "[{}]", i);
                }
                (OpKind::Stack, _) => {
                    out.push('[');
                    for (i, &a) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        render(nodes, a, out);
                    }
                    out.push(']');
                }
                _ => {
                    out.push_str(kind.name());
                    out.push('(');
                    for (i, &a) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        render(nodes, a, out);
                    }
                    out.push(')');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use test_log::test;

    #[test]
    fn test_mk_var_broadcasts_bounds() {
        let s = Session::new();
        let x = s.mk_var(3, &[0.0], &[1.0, 2.0, 3.0]).unwrap();
        match s.node(x) {
            Node::Variable { lower, upper, sign } => {
                assert_eq!(lower, vec![0.0; 3]);
                assert_eq!(upper, vec![1.0, 2.0, 3.0]);
                assert_eq!(sign, Sign::NonNeg);
            }
            other => panic!("unexpected node {}", other),
        }
        assert_eq!(s.dim(x), 3);
    }

    #[test]
    fn test_mk_var_rejects_bad_bounds() {
        let s = Session::new();
        assert_eq!(
            s.mk_var(2, &[0.0, 1.0], &[1.0, 0.5]),
            Err(Error::InvalidBounds {
                index: 1,
                lower: 1.0,
                upper: 0.5
            })
        );
        assert!(matches!(
            s.mk_var(3, &[0.0, 0.0], &[1.0]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn test_variable_sign_from_bounds() {
        let s = Session::new();
        let a = s.mk_var(1, &[-2.0], &[-1.0]).unwrap();
        let b = s.mk_var(1, &[-2.0], &[1.0]).unwrap();
        assert_eq!(s.sign(a), Sign::NonPos);
        assert_eq!(s.sign(b), Sign::Unknown);
    }

    #[test]
    fn test_constant_dedup() {
        let s = Session::new();
        let a = s.constant(&[1.0, 2.0]).unwrap();
        let b = s.constant(&[1.0, 2.0]).unwrap();
        let c = s.constant(&[2.0, 1.0]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(s.len(), 2);
        assert_eq!(s.num_constants(), 2);
    }

    #[test]
    fn test_constant_rejects_nan() {
        let s = Session::new();
        assert!(matches!(
            s.constant(&[1.0, f64::NAN]),
            Err(Error::NonFiniteConstant { .. })
        ));
        assert_eq!(s.constant(&[]), Err(Error::EmptyOperand { op: "constant" }));
    }

    #[test]
    fn test_broadcast_dims() {
        let s = Session::new();
        let x = s.mk_var(3, &[0.0], &[1.0]).unwrap();
        let c = s.scalar(2.0).unwrap();
        let f = s.apply_mult(c, x).unwrap();
        assert_eq!(s.dim(f), 3);
        let y = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        assert_eq!(
            s.apply_add(x, y),
            Err(Error::DimensionMismatch {
                op: "add",
                left: 3,
                right: 2
            })
        );
    }

    #[test]
    fn test_failed_build_leaves_arena_unchanged() {
        let s = Session::new();
        let x = s.mk_var(2, &[-1.0], &[0.0]).unwrap();
        let before = s.len();
        assert!(matches!(
            s.apply_ln(x),
            Err(Error::UnsupportedSignCombination { .. })
        ));
        assert!(matches!(
            s.apply_prod(x),
            Err(Error::InvalidOperandSign { .. })
        ));
        assert_eq!(s.len(), before);
    }

    #[test]
    fn test_signs_propagate() {
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let nx = s.apply_neg(x).unwrap();
        assert_eq!(s.sign(nx), Sign::NonPos);
        let p = s.apply_mult(nx, nx).unwrap();
        assert_eq!(s.sign(p), Sign::NonNeg);
        let q = s.apply_div(x, nx).unwrap();
        assert_eq!(s.sign(q), Sign::NonPos);
        let l = s.apply_ln(x).unwrap();
        assert_eq!(s.sign(l), Sign::Unknown);
        let d = s.apply_dot(x, nx).unwrap();
        assert_eq!((s.dim(d), s.sign(d)), (1, Sign::NonPos));
    }

    #[test]
    fn test_index_and_stack() {
        let s = Session::new();
        let x = s.mk_var(3, &[0.0], &[1.0]).unwrap();
        assert_eq!(
            s.apply_index(x, 3),
            Err(Error::IndexOutOfRange { index: 3, dim: 3 })
        );
        let x0 = s.apply_index(x, 0).unwrap();
        let nx2 = s.apply_neg(s.apply_index(x, 2).unwrap()).unwrap();
        let v = s.apply_stack(&[x0, nx2]).unwrap();
        assert_eq!((s.dim(v), s.sign(v)), (2, Sign::Unknown));
        assert!(matches!(
            s.apply_stack(&[x0, x]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert_eq!(s.apply_stack(&[]), Err(Error::EmptyOperand { op: "stack" }));
        let r = s.evaluate(v, &[0.1, 0.2, 0.3], &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(r, vec![0.1, -0.3]);
    }

    #[test]
    fn test_matrix_operands() {
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let m = s.matrix(2, 2, &[1.0, 2.0, 0.0, 3.0]).unwrap();
        assert_eq!(s.apply_add(m, x), Err(Error::MatrixOperand { op: "add" }));
        assert_eq!(s.apply_matvec(x, x), Err(Error::NotAMatrix { node: x }));

        let y = s.apply_matvec(m, x).unwrap();
        assert_eq!((s.dim(y), s.sign(y)), (2, Sign::NonNeg));
        let r = s.evaluate(y, &[1.0, 2.0], &[1.0, 2.0]).unwrap();
        assert_eq!(r, vec![5.0, 6.0]);

        let wide = s.mk_var(3, &[0.0], &[1.0]).unwrap();
        assert!(matches!(
            s.apply_matvec(m, wide),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_add_neg_is_zero() {
        let s = Session::new();
        let x = s.mk_var(3, &[-1.0], &[2.0]).unwrap();
        let c = s.constant(&[0.5, -1.5, 2.0]).unwrap();
        let a = s.apply_mult(x, c).unwrap();
        let z = s.apply_add(a, s.apply_neg(a).unwrap()).unwrap();
        for p in [[0.0, 0.0, 0.0], [-1.0, 0.5, 2.0], [1.7, -0.3, 0.9]] {
            let r = s.evaluate(z, &p, &p).unwrap();
            for v in r {
                assert_relative_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        let s = Session::new();
        let x = s.mk_var(1, &[0.0], &[1.0]).unwrap();
        let f = s.apply_inv(x).unwrap();
        assert!(matches!(
            s.evaluate(f, &[0.0], &[0.0]),
            Err(Error::Eval(crate::error::EvalError::DivisionByZero { .. }))
        ));
        assert_eq!(s.evaluate(f, &[0.5], &[0.5]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_constraint() {
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let half = s.scalar(0.5).unwrap();
        let halves = s.constant(&[0.5, 0.5]).unwrap();
        assert!(matches!(
            s.constraint(Relation::Ge, x, half),
            Err(Error::DimensionMismatch { .. })
        ));

        let c = s.constraint(Relation::Ge, x, halves).unwrap();
        assert!(s.is_feasible(&c, &[0.6, 0.5], &[0.6, 0.5]).unwrap());
        assert!(!s.is_feasible(&c, &[0.6, 0.4], &[0.6, 0.4]).unwrap());

        let c = s.constraint(Relation::Le, x, halves).unwrap();
        assert!(s.is_feasible(&c, &[0.1, 0.5], &[0.1, 0.5]).unwrap());

        let c = s.constraint(Relation::Ne, x, halves).unwrap();
        assert!(!s.is_feasible(&c, &[0.1, 0.5], &[0.1, 0.5]).unwrap());
    }

    #[test]
    fn test_unknown_node() {
        let s = Session::new();
        let other = Session::new();
        let x = other.mk_var(1, &[0.0], &[1.0]).unwrap();
        let y = other.mk_var(1, &[0.0], &[1.0]).unwrap();
        assert_eq!(s.apply_neg(y), Err(Error::UnknownNode { node: y }));
        assert!(s.evaluate(x, &[0.0], &[0.0]).is_err());
    }

    #[test]
    fn test_to_expr_string() {
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let c = s.scalar(3.0).unwrap();
        let f = s.apply_mult(c, x).unwrap();
        let g = s.apply_ln(s.apply_sum(f).unwrap()).unwrap();
        let h = s.apply_neg(g).unwrap();
        assert_eq!(s.to_expr_string(h), "-ln(sum((3 * x@0)))");
    }
}
