//! Sequential encoding of expression DAGs.
//!
//! [`ExprEncoder`] is the [`Visitor`] that turns an expression into a solver
//! [`Term`]. Integers are encoded over the unbounded `Int` sort and booleans
//! over `Bool`; the narrow `char` and `short` types are rejected with
//! [`Error::UnsupportedType`] instead of being widened silently.
//!
//! Every free variable met during encoding is remembered so it can be
//! declared in the final [`Script`].

use std::collections::BTreeMap;

use crate::{
    expr::{
        node::{NaryExpr, SharedExpr},
        ops::Operator,
        types::{Scalar, Type},
        visitor::Visitor,
        Expr,
    },
    smt::{Declaration, Script, Sort, Term},
    Error, Result,
};

/// Translates expressions into `Bool`/`Int` terms.
#[derive(Debug, Default)]
pub struct ExprEncoder {
    declarations: BTreeMap<String, Sort>,
}

impl ExprEncoder {
    /// Creates an encoder with no declarations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes one expression.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedType`] for `char` and `short` leaves and casts
    /// - [`Error::EmptyNary`] for n-ary nodes without operands
    /// - [`Error::PartialNary`] for single-operand nodes of operators without identity
    pub fn encode(&mut self, expr: &Expr) -> Result<Term> {
        expr.walk(self)
    }

    /// The identity constant of `op`.
    ///
    /// This is the only way to obtain a term for an operator without
    /// operands; encoding an empty n-ary node fails instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoIdentity`] if `op` has no identity element.
    pub fn identity(op: Operator) -> Result<Term> {
        op.identity()
            .ok_or(Error::NoIdentity(op))
            .and_then(Self::literal)
    }

    /// Declares every free variable encountered so far in `script`.
    pub fn declare_into(&self, script: &mut Script) {
        for (name, sort) in &self.declarations {
            script.declare(Declaration::Const {
                name: name.clone(),
                sort: sort.clone(),
            });
        }
    }

    fn sort(ty: Type) -> Result<Sort> {
        match ty {
            Type::Bool => Ok(Sort::Bool),
            Type::Int => Ok(Sort::Int),
            Type::Char | Type::Short => Err(Error::UnsupportedType(ty)),
        }
    }

    fn literal(value: Scalar) -> Result<Term> {
        match value {
            Scalar::Bool(b) => Ok(Term::Bool(b)),
            Scalar::Int(v) => Ok(Term::Int(i64::from(v))),
            other => Err(Error::UnsupportedType(other.ty())),
        }
    }

    fn chain(terms: Vec<Term>, link: fn(Term, Term) -> Term) -> Term {
        let links = terms
            .windows(2)
            .map(|pair| link(pair[0].clone(), pair[1].clone()))
            .collect();
        Term::and(links)
    }
}

impl Visitor for ExprEncoder {
    type Output = Result<Term>;

    fn visit_any(&mut self, name: &str, ty: Type) -> Result<Term> {
        let sort = Self::sort(ty)?;
        self.declarations.insert(name.to_string(), sort.clone());
        Ok(Term::constant(name, sort))
    }

    fn visit_value(&mut self, value: Scalar, _name: Option<&str>) -> Result<Term> {
        Self::literal(value)
    }

    fn visit_cast(&mut self, ty: Type, operand: &SharedExpr) -> Result<Term> {
        let from = operand.ty();
        Self::sort(from)?;
        Self::sort(ty)?;
        let term = operand.walk(self)?;
        Ok(match (from, ty) {
            (Type::Bool, Type::Int) => Term::ite(term, Term::Int(1), Term::Int(0)),
            (Type::Int, Type::Bool) => Term::not(Term::eq(term, Term::Int(0))),
            _ => term,
        })
    }

    fn visit_unary(&mut self, op: Operator, operand: &SharedExpr) -> Result<Term> {
        debug_assert_eq!(op, Operator::Not);
        Ok(Term::not(operand.walk(self)?))
    }

    fn visit_ite(
        &mut self,
        cond: &SharedExpr,
        then: &SharedExpr,
        otherwise: &SharedExpr,
    ) -> Result<Term> {
        Ok(Term::ite(
            cond.walk(self)?,
            then.walk(self)?,
            otherwise.walk(self)?,
        ))
    }

    fn visit_nary(&mut self, nary: &NaryExpr) -> Result<Term> {
        let op = nary.op();
        let mut terms = nary
            .operands()
            .iter()
            .map(|operand| operand.walk(self))
            .collect::<Result<Vec<_>>>()?;

        match terms.len() {
            0 => return Err(Error::EmptyNary(op)),
            1 if op.identity().is_some() => return Ok(terms.remove(0)),
            1 => return Err(Error::PartialNary(op)),
            _ => {}
        }

        Ok(match op {
            Operator::Add => Term::Add(terms),
            Operator::LAnd => Term::And(terms),
            Operator::LOr => Term::Or(terms),
            Operator::Eql => Self::chain(terms, Term::eq),
            Operator::Lss => Self::chain(terms, Term::lt),
            Operator::Not => return Err(Error::PartialNary(op)),
        })
    }
}
