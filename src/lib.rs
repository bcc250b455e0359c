//! # mmp-rs: Mixed Monotonic Programming in Rust
//!
//! **`mmp-rs`** builds optimization problems out of sign-typed expressions and solves them
//! to global optimality with a branch-and-bound search over boxes.
//!
//! ## What is a mixed monotonic function?
//!
//! A function `f(z)` is *mixed monotonic* if there is a function `F(x, y)` that is non-decreasing
//! in `x`, non-increasing in `y`, and agrees with `f` on the diagonal: `F(z, z) = f(z)`.
//! On a box `[l, u]` the value `F(u, l)` is then an upper bound of `f`, and that is all a
//! branch-and-bound search needs.
//!
//! Every expression built here carries such an `F`. Each node is tagged with a [`Sign`][crate::sign::Sign]
//! (non-negative, non-positive, or unknown), and the operator rules use these signs to pick,
//! per operand, whether to read it as `F(x, y)` or as `F(y, x)`. The sign table is checked
//! once, when a node is built; expressions with no monotone form are rejected at that point.
//!
//! ## Key Features
//!
//! - **Session-Centric Architecture**: All construction goes through a [`Session`][crate::session::Session], which owns the node arena and deduplicates constants.
//! - **Lightweight Handles**: Expressions are addressed by [`Ref`][crate::reference::Ref] indices, shared freely between expressions.
//! - **Compiled Evaluation**: Objectives and constraints are compiled into flat programs that only compute the orientations they need.
//! - **Certified Global Optimum**: The solver either proves the incumbent is within tolerance of the optimum, or proves infeasibility.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mmp_rs::config::Config;
//! use mmp_rs::constraint::Relation;
//! use mmp_rs::problem::Problem;
//! use mmp_rs::session::Session;
//! use mmp_rs::solver::Status;
//!
//! // 1. Initialize the session
//! let s = Session::new();
//!
//! // 2. Create the decision variable x in [0, 1]^2
//! let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
//!
//! // 3. Objective: x0 * (1 - x1) + x1 * (1 - x0)
//! let one = s.scalar(1.0).unwrap();
//! let x0 = s.apply_index(x, 0).unwrap();
//! let x1 = s.apply_index(x, 1).unwrap();
//! let a = s.build(x0 * s.build(one - x1).unwrap()).unwrap();
//! let b = s.build(x1 * s.build(one - x0).unwrap()).unwrap();
//! let f = s.apply_add(a, b).unwrap();
//!
//! // 4. Constraint: x0 <= 0.5
//! let half = s.scalar(0.5).unwrap();
//! let c = s.constraint(Relation::Le, x0, half).unwrap();
//!
//! // 5. Solve
//! let problem = Problem::new(&s, f, x, &[c], Config::default()).unwrap();
//! let solution = problem.optimize();
//! assert!(matches!(solution.status, Status::Optimal | Status::ToleranceReached));
//! assert!((solution.value - 1.0).abs() < 2e-2);
//! ```
//!
//! ## Core Components
//!
//! - **[`session`]**: The [`Session`][crate::session::Session] and all expression builders.
//! - **[`sign`]**: The sign closure table.
//! - **[`eval`]**: Compiled evaluation of `F(x, y)`.
//! - **[`problem`]** and **[`solver`]**: Problem definition and the branch-and-bound search.
//! - **[`dot`]**: Utilities for visualizing expressions using Graphviz.

pub mod cache;
pub mod config;
pub mod constraint;
pub mod dot;
pub mod error;
pub mod eval;
pub mod node;
pub mod ops;
pub mod problem;
pub mod reduce;
pub mod reference;
pub mod region;
pub mod session;
pub mod sign;
pub mod solver;
