//! Expression DAG to DOT (Graphviz) conversion.
//!
//! The generated output follows these conventions:
//! - **Variables** are rendered as double circles, **constants** and
//!   **matrices** as boxes, both at the bottom (sink rank)
//! - **Operators** are rendered as ellipses labeled with the operator and the
//!   node's sign
//! - **Edges** point from an operator to its operands; for non-commutative
//!   operators the edge is labeled with the operand position
//! - **Root nodes** are rendered as rectangles at the top (source rank)
//!
//! # Examples
//!
//! ```
//! use mmp_rs::session::Session;
//!
//! let s = Session::new();
//! let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
//! let f = s.apply_ln(s.apply_sum(x).unwrap()).unwrap();
//!
//! let dot = s.to_dot(&[f]).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeSet;

use crate::node::{Node, OpKind};
use crate::reference::Ref;
use crate::session::Session;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for operator nodes (default: "ellipse")
    pub op_shape: &'static str,
    /// Shape for variable nodes (default: "doublecircle")
    pub variable_shape: &'static str,
    /// Shape for constant and matrix nodes (default: "box")
    pub constant_shape: &'static str,
    /// Shape for root nodes (default: "rect")
    pub root_shape: &'static str,
    /// Whether to show the sign in node labels (default: true)
    pub show_signs: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            op_shape: "ellipse",
            variable_shape: "doublecircle",
            constant_shape: "box",
            root_shape: "rect",
            show_signs: true,
        }
    }
}

impl Session {
    /// All nodes reachable from `roots`, in arena order.
    pub fn descendants(&self, roots: impl IntoIterator<Item = Ref>) -> BTreeSet<Ref> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<Ref> = roots.into_iter().collect();
        while let Some(r) = stack.pop() {
            if r.index() >= self.len() || !visited.insert(r) {
                continue;
            }
            stack.extend(self.node(r).args().iter().copied());
        }
        visited
    }

    /// Converts the expressions rooted at `roots` to DOT format.
    ///
    /// Shared subexpressions are displayed once.
    pub fn to_dot(&self, roots: &[Ref]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[Ref], config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.op_shape)?;

        let all_nodes = self.descendants(roots.iter().copied());

        let sign = |node: &Node| {
            if config.show_signs {
                format!(" ({})", node.sign())
            } else {
                String::new()
            }
        };

        writeln!(dot, "{{ rank=sink")?;
        for &id in all_nodes.iter() {
            let node = self.node(id);
            match &node {
                Node::Variable { lower, .. } => writeln!(
                    dot,
                    "{} [shape={}, label=\"x[{}]{}\"];",
                    id.get(),
                    config.variable_shape,
                    lower.len(),
                    sign(&node)
                )?,
                Node::Constant { values, .. } => {
                    let label = match values.as_slice() {
                        [v] => format!("{}", v),
                        vs => format!("const[{}]", vs.len()),
                    };
                    writeln!(
                        dot,
                        "{} [shape={}, label=\"{}{}\"];",
                        id.get(),
                        config.constant_shape,
                        label,
                        sign(&node)
                    )?
                }
                Node::Matrix { rows, cols, .. } => writeln!(
                    dot,
                    "{} [shape={}, label=\"M[{}x{}]{}\"];",
                    id.get(),
                    config.constant_shape,
                    rows,
                    cols,
                    sign(&node)
                )?,
                Node::Op { .. } => {}
            }
        }
        writeln!(dot, "}}")?;

        for &id in all_nodes.iter() {
            let node = self.node(id);
            if let Node::Op { kind, args, .. } = &node {
                writeln!(dot, "{} [label=\"{}{}\"];", id.get(), kind, sign(&node))?;
                let ordered = matches!(kind, OpKind::Div | OpKind::MatVec | OpKind::Stack);
                for (i, a) in args.iter().enumerate() {
                    if ordered {
                        writeln!(dot, "{} -> {} [label=\"{}\"];", id.get(), a.get(), i)?;
                    } else {
                        writeln!(dot, "{} -> {};", id.get(), a.get())?;
                    }
                }
            }
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, root)?;
        }
        writeln!(dot, "}}")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} -> {};", i, root.get())?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
