//! Compiled evaluation of mixed monotonic expressions.
//!
//! Every node denotes a function `F(x, y)` that is non-decreasing in `x` (the
//! increasing argument) and non-increasing in `y` (the decreasing argument),
//! with `F(z, z) = f(z)`. To build such a function an operator sometimes needs a
//! child evaluated with its arguments swapped, `F'(x, y) = F(y, x)`.
//!
//! A [`Program`] is the reachable part of the arena below one root, copied in
//! topological order. For each node it records which orientations (same or
//! swapped) some parent actually reads, so orientations nobody needs are never
//! computed. Values live in two flat buffers, one per orientation, which also
//! serve as the per-call memo: each shared subexpression is computed once.

use std::ops::BitOr;

use log::trace;

use crate::error::EvalError;
use crate::node::{Node, OpKind};
use crate::reference::Ref;
use crate::sign::Sign;

/// Set of orientations in which a node must be evaluated.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Demand(u8);

impl Demand {
    pub const NONE: Demand = Demand(0);
    /// `F(x, y)`.
    pub const SAME: Demand = Demand(1);
    /// `F(y, x)`.
    pub const SWAP: Demand = Demand(2);
    pub const BOTH: Demand = Demand(3);

    pub fn contains(self, other: Demand) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Exchange the two orientations.
    pub fn flip(self) -> Demand {
        Demand(((self.0 & 1) << 1) | ((self.0 & 2) >> 1))
    }

    /// Absolute demand on a child that this node reads in the relative
    /// orientations `reads`.
    fn compose(self, reads: Demand) -> Demand {
        let mut d = Demand::NONE;
        if self.contains(Demand::SAME) {
            d = d | reads;
        }
        if self.contains(Demand::SWAP) {
            d = d | reads.flip();
        }
        d
    }
}

impl BitOr for Demand {
    type Output = Demand;

    fn bitor(self, rhs: Self) -> Self::Output {
        Demand(self.0 | rhs.0)
    }
}

/// Orientations of the two operands read by an elementwise product with the
/// given operand signs.
fn mult_reads(a: Sign, b: Sign) -> (Demand, Demand) {
    use Sign::*;
    let (s, w, both) = (Demand::SAME, Demand::SWAP, Demand::BOTH);
    match (a, b) {
        (NonNeg, NonNeg) => (s, s),
        (NonPos, NonPos) => (w, w),
        (NonNeg, NonPos) => (w, s),
        (NonPos, NonNeg) => (s, w),
        (Unknown, NonNeg) => (s, both),
        (NonNeg, Unknown) => (both, s),
        (Unknown, NonPos) => (w, both),
        (NonPos, Unknown) => (both, w),
        (Unknown, Unknown) => (both, both),
    }
}

fn pos(t: f64) -> f64 {
    t.max(0.0)
}

fn neg(t: f64) -> f64 {
    t.min(0.0)
}

/// Mixed monotonic product. `a`/`b` are the operands in the current
/// orientation, `a_`/`b_` the swapped ones.
fn mult_value(sa: Sign, sb: Sign, a: f64, a_: f64, b: f64, b_: f64) -> f64 {
    use Sign::*;
    match (sa, sb) {
        (NonNeg, NonNeg) => a * b,
        (NonPos, NonPos) => a_ * b_,
        (NonNeg, NonPos) => a_ * b,
        (NonPos, NonNeg) => a * b_,
        (Unknown, NonNeg) => pos(a) * b + neg(a) * b_,
        (NonNeg, Unknown) => a * pos(b) + a_ * neg(b),
        (Unknown, NonPos) => pos(a_) * b + neg(a_) * b_,
        (NonPos, Unknown) => a * pos(b_) + a_ * neg(b_),
        (Unknown, Unknown) => {
            pos(a) * pos(b) + pos(a_) * neg(b) + neg(a) * pos(b_) + neg(a_) * neg(b_)
        }
    }
}

/// Value at coordinate `k`, broadcasting scalars.
fn at(v: &[f64], k: usize) -> f64 {
    if v.len() == 1 {
        v[0]
    } else {
        v[k]
    }
}

/// Per-operand relative reads of an operator node.
fn reads(nodes: &[Node], kind: OpKind, args: &[Ref]) -> Vec<Demand> {
    let sign = |r: Ref| nodes[r.index()].sign();
    match kind {
        OpKind::Add
        | OpKind::Log2
        | OpKind::Ln
        | OpKind::Sum
        | OpKind::Prod
        | OpKind::Index(_)
        | OpKind::Stack => vec![Demand::SAME; args.len()],
        OpKind::Neg => vec![Demand::SWAP],
        OpKind::Inv => match sign(args[0]) {
            Sign::Unknown => vec![Demand::BOTH],
            _ => vec![Demand::SWAP],
        },
        OpKind::Mult | OpKind::Dot => {
            let (da, db) = mult_reads(sign(args[0]), sign(args[1]));
            vec![da, db]
        }
        OpKind::Div => {
            let sb = sign(args[1]);
            let (da, dc) = mult_reads(sign(args[0]), sb);
            let db = match sb {
                Sign::Unknown => Demand::BOTH,
                _ => dc.flip(),
            };
            vec![da, db]
        }
        OpKind::MatVec => {
            let mut dv = Demand::NONE;
            if let Node::Matrix { values, .. } = &nodes[args[0].index()] {
                if values.iter().any(|&m| m >= 0.0) {
                    dv = dv | Demand::SAME;
                }
                if values.iter().any(|&m| m < 0.0) {
                    dv = dv | Demand::SWAP;
                }
            }
            vec![Demand::NONE, dv]
        }
    }
}

/// Reusable value buffers for one [`Program`].
#[derive(Debug, Clone)]
pub struct Workspace {
    same: Vec<f64>,
    swap: Vec<f64>,
}

/// The compiled sub-DAG below a single root.
#[derive(Debug, Clone)]
pub struct Program {
    /// Nodes with operands renumbered into this program.
    nodes: Vec<Node>,
    /// Arena handle of each node, for error reports.
    origin: Vec<Ref>,
    demand: Vec<Demand>,
    offset: Vec<usize>,
    width: usize,
}

impl Program {
    /// Compile the nodes reachable from `root`, which will be evaluated in the
    /// orientations `root_demand`.
    pub fn compile(arena: &[Node], root: Ref, root_demand: Demand) -> Self {
        let mut seen = vec![false; root.index() + 1];
        let mut stack = vec![root];
        seen[root.index()] = true;
        while let Some(r) = stack.pop() {
            for &a in arena[r.index()].args() {
                if !seen[a.index()] {
                    seen[a.index()] = true;
                    stack.push(a);
                }
            }
        }

        // The arena is append-only, so index order is a topological order.
        let origin: Vec<Ref> = (0..seen.len())
            .filter(|&i| seen[i])
            .map(|i| Ref::new(i as u32))
            .collect();
        let mut local = vec![0u32; seen.len()];
        for (i, r) in origin.iter().enumerate() {
            local[r.index()] = i as u32;
        }

        let n = origin.len();
        let mut demand = vec![Demand::NONE; n];
        demand[n - 1] = root_demand;
        for i in (0..n).rev() {
            if demand[i].is_empty() {
                continue;
            }
            if let Node::Op { kind, args, .. } = &arena[origin[i].index()] {
                for (&a, rel) in args.iter().zip(reads(arena, *kind, args)) {
                    let j = local[a.index()] as usize;
                    demand[j] = demand[j] | demand[i].compose(rel);
                }
            }
        }

        let nodes: Vec<Node> = origin
            .iter()
            .map(|r| arena[r.index()].remap(|a| Ref::new(local[a.index()])))
            .collect();

        let mut offset = Vec::with_capacity(n);
        let mut width = 0;
        for node in &nodes {
            offset.push(width);
            if !node.is_matrix() {
                width += node.dim();
            }
        }

        trace!("compiled {} nodes below {} into {} slots", n, root, width);

        Self {
            nodes,
            origin,
            demand,
            offset,
            width,
        }
    }

    /// Number of nodes in the program.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimension of the root.
    pub fn dim(&self) -> usize {
        self.nodes.last().map_or(0, Node::dim)
    }

    /// Arena handles of the variable leaves the root depends on.
    pub fn variables(&self) -> impl Iterator<Item = Ref> + '_ {
        self.nodes
            .iter()
            .zip(&self.origin)
            .filter(|(node, _)| node.is_variable())
            .map(|(_, &r)| r)
    }

    /// Orientations in which the node with arena handle `r` is evaluated.
    pub fn demand_of(&self, r: Ref) -> Demand {
        match self.origin.binary_search(&r) {
            Ok(i) => self.demand[i],
            Err(_) => Demand::NONE,
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace {
            same: vec![0.0; self.width],
            swap: vec![0.0; self.width],
        }
    }

    /// Evaluate the whole program at increasing argument `x` and decreasing
    /// argument `y`.
    pub fn run(&self, ws: &mut Workspace, x: &[f64], y: &[f64]) -> Result<(), EvalError> {
        if x.len() != y.len() {
            return Err(EvalError::ArgumentDimension {
                expected: x.len(),
                found: y.len(),
            });
        }
        for i in 0..self.nodes.len() {
            let d = self.demand[i];
            let lo = self.offset[i];
            let hi = lo + if self.nodes[i].is_matrix() { 0 } else { self.nodes[i].dim() };
            if d.contains(Demand::SAME) {
                let (prev, rest) = ws.same.split_at_mut(lo);
                self.compute(i, prev, &ws.swap, &mut rest[..hi - lo], x, y)?;
            }
            if d.contains(Demand::SWAP) {
                let (prev, rest) = ws.swap.split_at_mut(lo);
                self.compute(i, prev, &ws.same, &mut rest[..hi - lo], y, x)?;
            }
        }
        Ok(())
    }

    /// Root value `F(x, y)` after [`Program::run`].
    pub fn output<'a>(&self, ws: &'a Workspace) -> &'a [f64] {
        self.root_slice(&ws.same)
    }

    /// Root value `F(y, x)` after [`Program::run`], if the root was compiled
    /// with [`Demand::SWAP`].
    pub fn output_swapped<'a>(&self, ws: &'a Workspace) -> &'a [f64] {
        self.root_slice(&ws.swap)
    }

    fn root_slice<'a>(&self, buf: &'a [f64]) -> &'a [f64] {
        match self.nodes.len() {
            0 => &[],
            n => &buf[self.offset[n - 1]..self.offset[n - 1] + self.nodes[n - 1].dim()],
        }
    }

    /// One-shot evaluation of the root at `(x, y)`.
    pub fn evaluate(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>, EvalError> {
        let mut ws = self.workspace();
        self.run(&mut ws, x, y)?;
        Ok(self.output(&ws).to_vec())
    }

    /// Compute node `i` in one orientation.
    ///
    /// `cur` holds the already computed prefix of the current orientation,
    /// `other` the whole buffer of the opposite one. `inc`/`dec` are the
    /// arguments as seen from this orientation.
    fn compute(
        &self,
        i: usize,
        cur: &[f64],
        other: &[f64],
        out: &mut [f64],
        inc: &[f64],
        dec: &[f64],
    ) -> Result<(), EvalError> {
        let slot = |r: Ref| {
            let j = r.index();
            self.offset[j]..self.offset[j] + self.nodes[j].dim()
        };
        let same = move |r: Ref| &cur[slot(r)];
        let swap = move |r: Ref| &other[slot(r)];
        let sign = |r: Ref| self.nodes[r.index()].sign();
        let node_ref = self.origin[i];

        match &self.nodes[i] {
            Node::Variable { lower, .. } => {
                if inc.len() != lower.len() {
                    return Err(EvalError::ArgumentDimension {
                        expected: lower.len(),
                        found: inc.len(),
                    });
                }
                out.copy_from_slice(inc);
            }
            Node::Constant { values, .. } => out.copy_from_slice(values),
            Node::Matrix { .. } => {}
            Node::Op { kind, args, .. } => match kind {
                OpKind::Add => {
                    let (a, b) = (same(args[0]), same(args[1]));
                    for (k, o) in out.iter_mut().enumerate() {
                        *o = at(a, k) + at(b, k);
                    }
                }
                OpKind::Neg => {
                    for (o, &v) in out.iter_mut().zip(swap(args[0])) {
                        *o = -v;
                    }
                }
                OpKind::Mult => {
                    let (sa, sb) = (sign(args[0]), sign(args[1]));
                    let (a, a_) = (same(args[0]), swap(args[0]));
                    let (b, b_) = (same(args[1]), swap(args[1]));
                    for (k, o) in out.iter_mut().enumerate() {
                        *o = mult_value(sa, sb, at(a, k), at(a_, k), at(b, k), at(b_, k));
                    }
                }
                OpKind::Dot => {
                    let (sa, sb) = (sign(args[0]), sign(args[1]));
                    let (a, a_) = (same(args[0]), swap(args[0]));
                    let (b, b_) = (same(args[1]), swap(args[1]));
                    out[0] = (0..a.len())
                        .map(|k| mult_value(sa, sb, a[k], a_[k], b[k], b_[k]))
                        .sum();
                }
                OpKind::Div => {
                    let (sa, sb) = (sign(args[0]), sign(args[1]));
                    let (_, dc) = mult_reads(sa, sb);
                    let (a, a_) = (same(args[0]), swap(args[0]));
                    let (b, b_) = (same(args[1]), swap(args[1]));
                    for (k, o) in out.iter_mut().enumerate() {
                        let (bk, bk_) = (at(b, k), at(b_, k));
                        let err = EvalError::DivisionByZero {
                            node: node_ref,
                            index: k,
                        };
                        // The divisor's inverse C = 1/B' and its swap C' = 1/B.
                        let c = if dc.contains(Demand::SAME) {
                            invert(bk_, bk, sb).ok_or(err)?
                        } else {
                            0.0
                        };
                        let c_ = if dc.contains(Demand::SWAP) {
                            invert(bk, bk_, sb).ok_or(err)?
                        } else {
                            0.0
                        };
                        *o = mult_value(sa, sb, at(a, k), at(a_, k), c, c_);
                    }
                }
                OpKind::Inv => {
                    let sa = sign(args[0]);
                    let a = same(args[0]);
                    let a_ = swap(args[0]);
                    for (k, o) in out.iter_mut().enumerate() {
                        *o = invert(a_[k], a[k], sa).ok_or(EvalError::DivisionByZero {
                            node: node_ref,
                            index: k,
                        })?;
                    }
                }
                OpKind::Log2 | OpKind::Ln => {
                    for (k, (o, &v)) in out.iter_mut().zip(same(args[0])).enumerate() {
                        if !(v > 0.0) {
                            return Err(EvalError::DomainError {
                                node: node_ref,
                                index: k,
                                value: v,
                            });
                        }
                        *o = if *kind == OpKind::Ln { v.ln() } else { v.log2() };
                    }
                }
                OpKind::Sum => out[0] = same(args[0]).iter().sum(),
                OpKind::Prod => out[0] = same(args[0]).iter().product(),
                OpKind::Index(j) => out[0] = same(args[0])[*j],
                OpKind::Stack => {
                    for (o, &a) in out.iter_mut().zip(args) {
                        *o = same(a)[0];
                    }
                }
                OpKind::MatVec => {
                    if let Node::Matrix { cols, values, .. } = &self.nodes[args[0].index()] {
                        let (v, v_) = (same(args[1]), swap(args[1]));
                        for (r, o) in out.iter_mut().enumerate() {
                            *o = values[r * cols..(r + 1) * cols]
                                .iter()
                                .enumerate()
                                .map(|(j, &m)| if m >= 0.0 { m * v[j] } else { m * v_[j] })
                                .sum();
                        }
                    }
                }
            },
        }
        Ok(())
    }
}

/// `1 / v`, where `partner` is the same operand in the opposite orientation.
///
/// An operand of unknown sign is only invertible when both orientations have
/// the same strict sign, i.e. the operand does not cross zero.
fn invert(v: f64, partner: f64, sign: Sign) -> Option<f64> {
    if v == 0.0 {
        return None;
    }
    if sign == Sign::Unknown && !((v > 0.0 && partner > 0.0) || (v < 0.0 && partner < 0.0)) {
        return None;
    }
    Some(1.0 / v)
}
