//! Double-dispatch traversal of the expression DAG.
//!
//! [`Expr::walk`] matches on the node kind and hands its parts to the matching
//! [`Visitor`] method. The visitor decides whether and how to descend. The
//! printer, the free-variable collector and the solver encoder are all
//! visitors, so a new node kind has to be handled by each of them.

use std::{collections::BTreeMap, fmt};

use crate::expr::{
    node::{Expr, NaryExpr, SharedExpr},
    ops::Operator,
    types::{Scalar, Type},
};

/// A traversal over expression nodes.
pub trait Visitor {
    /// Result of visiting one node.
    type Output;

    /// Visits a free variable.
    fn visit_any(&mut self, name: &str, ty: Type) -> Self::Output;

    /// Visits a literal, optionally carrying a name.
    fn visit_value(&mut self, value: Scalar, name: Option<&str>) -> Self::Output;

    /// Visits a cast to `ty`.
    fn visit_cast(&mut self, ty: Type, operand: &SharedExpr) -> Self::Output;

    /// Visits a unary operator application.
    fn visit_unary(&mut self, op: Operator, operand: &SharedExpr) -> Self::Output;

    /// Visits an if-then-else.
    fn visit_ite(
        &mut self,
        cond: &SharedExpr,
        then: &SharedExpr,
        otherwise: &SharedExpr,
    ) -> Self::Output;

    /// Visits a sealed n-ary application.
    fn visit_nary(&mut self, nary: &NaryExpr) -> Self::Output;
}

impl Expr {
    /// Dispatches this node to `visitor`.
    pub fn walk<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Any { name, ty } => visitor.visit_any(name, *ty),
            Expr::Value { value, name } => visitor.visit_value(*value, name.as_deref()),
            Expr::Cast { ty, operand } => visitor.visit_cast(*ty, operand),
            Expr::Unary { op, operand } => visitor.visit_unary(*op, operand),
            Expr::Ite {
                cond,
                then,
                otherwise,
            } => visitor.visit_ite(cond, then, otherwise),
            Expr::Nary(nary) => visitor.visit_nary(nary),
        }
    }

    /// Collects every free variable reachable from this node.
    ///
    /// # Returns
    ///
    /// Variable names mapped to their types, in name order.
    #[must_use]
    pub fn free_variables(&self) -> BTreeMap<String, Type> {
        let mut collector = FreeVariables::default();
        self.walk(&mut collector);
        collector.vars
    }
}

/// Writes the canonical fully parenthesized infix form.
pub(crate) struct Printer<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl<'a, 'b> Printer<'a, 'b> {
    pub(crate) fn new(f: &'a mut fmt::Formatter<'b>) -> Self {
        Self { f }
    }
}

impl Visitor for Printer<'_, '_> {
    type Output = fmt::Result;

    fn visit_any(&mut self, name: &str, _ty: Type) -> fmt::Result {
        write!(self.f, "[{name}]")
    }

    fn visit_value(&mut self, value: Scalar, name: Option<&str>) -> fmt::Result {
        match name {
            Some(name) => write!(self.f, "[{name}:{value}]"),
            None => write!(self.f, "{value}"),
        }
    }

    fn visit_cast(&mut self, ty: Type, operand: &SharedExpr) -> fmt::Result {
        write!(self.f, "(({ty})(")?;
        operand.walk(self)?;
        self.f.write_str("))")
    }

    fn visit_unary(&mut self, op: Operator, operand: &SharedExpr) -> fmt::Result {
        write!(self.f, "({op}")?;
        operand.walk(self)?;
        self.f.write_str(")")
    }

    fn visit_ite(
        &mut self,
        cond: &SharedExpr,
        then: &SharedExpr,
        otherwise: &SharedExpr,
    ) -> fmt::Result {
        self.f.write_str("(")?;
        cond.walk(self)?;
        self.f.write_str("?")?;
        then.walk(self)?;
        self.f.write_str(":")?;
        otherwise.walk(self)?;
        self.f.write_str(")")
    }

    fn visit_nary(&mut self, nary: &NaryExpr) -> fmt::Result {
        self.f.write_str("(")?;
        for (i, operand) in nary.operands().iter().enumerate() {
            if i > 0 {
                write!(self.f, "{}", nary.op())?;
            }
            operand.walk(self)?;
        }
        self.f.write_str(")")
    }
}

#[derive(Default)]
struct FreeVariables {
    vars: BTreeMap<String, Type>,
}

impl Visitor for FreeVariables {
    type Output = ();

    fn visit_any(&mut self, name: &str, ty: Type) {
        self.vars.insert(name.to_string(), ty);
    }

    fn visit_value(&mut self, _value: Scalar, _name: Option<&str>) {}

    fn visit_cast(&mut self, _ty: Type, operand: &SharedExpr) {
        operand.walk(self);
    }

    fn visit_unary(&mut self, _op: Operator, operand: &SharedExpr) {
        operand.walk(self);
    }

    fn visit_ite(&mut self, cond: &SharedExpr, then: &SharedExpr, otherwise: &SharedExpr) {
        cond.walk(self);
        then.walk(self);
        otherwise.walk(self);
    }

    fn visit_nary(&mut self, nary: &NaryExpr) {
        for operand in nary.operands() {
            operand.walk(self);
        }
    }
}
