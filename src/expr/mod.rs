//! Expression DAG.
//!
//! This module provides the symbolic side of concolic values: a DAG of
//! [`Expr`] nodes whose children are shared through [`SharedExpr`] and never
//! mutated once shared.
//!
//! # Node kinds
//!
//! - [`Expr::Any`]: free variable, printed `[name]`
//! - [`Expr::Value`]: literal, printed `value` or `[name:value]`
//! - [`Expr::Cast`]: type conversion, printed `((type)(e))`
//! - [`Expr::Unary`]: negation, printed `(!e)`
//! - [`Expr::Ite`]: join of two values, printed `(c?t:e)`
//! - [`Expr::Nary`]: operator over any number of operands, printed `(a+b+c)`
//!
//! # Ownership
//!
//! N-ary nodes are assembled through an exclusively owned [`NaryBuilder`].
//! Sealing produces a shared node; [`NaryBuilder::reopen`] only succeeds while
//! that node has no other owner, so a node referenced from anywhere else can
//! never change under its readers.
//!
//! # Traversal
//!
//! [`Expr::walk`] dispatches to a [`Visitor`]. Printing and solver encoding
//! ([`ExprEncoder`]) are both visitors.

mod encode;
mod node;
mod ops;
mod types;
mod visitor;

pub use encode::ExprEncoder;
pub use node::{Expr, NaryBuilder, NaryExpr, SharedExpr};
pub use ops::{Operator, OperatorAttr};
pub use types::{Scalar, Type};
pub use visitor::Visitor;
