//! Operators of the expression DAG.
//!
//! This module defines [`Operator`], the fixed set of operators symbolic
//! expressions and event instructions may apply, together with the
//! [`OperatorAttr`] flags describing their algebraic properties.
//!
//! Operators are categorized as:
//! - **Arithmetic**: Add
//! - **Logical**: Not, LAnd, LOr
//! - **Comparison**: Eql, Lss
//!
//! The symbol and attribute tables are plain `match` expressions over the
//! closed enum, so they are immutable and need no initialisation.

use std::fmt;

use bitflags::bitflags;
use strum::{EnumCount, EnumIter};

use crate::expr::types::{Scalar, Type};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Algebraic properties of an operator
    pub struct OperatorAttr: u8 {
        /// `(a op b) op c == a op b op c`
        const LASSOC = 0x01;
        /// `a op (b op c) == a op b op c`
        const RASSOC = 0x02;
        /// `a op b == b op a`
        const COMM = 0x04;
        /// The operator has an identity element
        const HAS_ID_ELEMENT = 0x08;
    }
}

/// An operator of the expression DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount)]
pub enum Operator {
    /// Logical negation.
    Not,
    /// Addition.
    Add,
    /// Logical conjunction.
    LAnd,
    /// Logical disjunction.
    LOr,
    /// Equality.
    Eql,
    /// Signed less than.
    Lss,
}

impl Operator {
    /// Algebraic attributes of the operator.
    #[must_use]
    pub fn attrs(self) -> OperatorAttr {
        match self {
            Operator::Add | Operator::LAnd | Operator::LOr => {
                OperatorAttr::LASSOC
                    | OperatorAttr::RASSOC
                    | OperatorAttr::COMM
                    | OperatorAttr::HAS_ID_ELEMENT
            }
            Operator::Eql => OperatorAttr::LASSOC | OperatorAttr::RASSOC | OperatorAttr::COMM,
            Operator::Not | Operator::Lss => OperatorAttr::empty(),
        }
    }

    /// Infix symbol used when printing expressions.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Operator::Not => "!",
            Operator::Add => "+",
            Operator::LAnd => "&&",
            Operator::LOr => "||",
            Operator::Eql => "==",
            Operator::Lss => "<",
        }
    }

    /// Checks if this is a unary operation.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Operator::Not)
    }

    /// Checks if this operation yields a boolean regardless of its operand types.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        !matches!(self, Operator::Add)
    }

    /// Checks if n-ary nodes of this operator may absorb further operands.
    ///
    /// Only associative operators with an identity element are flattened, so
    /// `(a+b)+c` may become `(a+b+c)` while `(a==b)==c` keeps its shape.
    #[must_use]
    pub fn is_flattenable(self) -> bool {
        self.attrs().contains(
            OperatorAttr::LASSOC | OperatorAttr::RASSOC | OperatorAttr::HAS_ID_ELEMENT,
        )
    }

    /// The identity element of the operator.
    ///
    /// # Returns
    ///
    /// `Some` literal for operators carrying [`OperatorAttr::HAS_ID_ELEMENT`],
    /// `None` otherwise.
    #[must_use]
    pub const fn identity(self) -> Option<Scalar> {
        match self {
            Operator::Add => Some(Scalar::Int(0)),
            Operator::LAnd => Some(Scalar::Bool(true)),
            Operator::LOr => Some(Scalar::Bool(false)),
            Operator::Not | Operator::Eql | Operator::Lss => None,
        }
    }

    /// Result type of the operator applied to operands of type `operand`.
    #[must_use]
    pub const fn result_type(self, operand: Type) -> Type {
        if self.is_boolean() {
            Type::Bool
        } else {
            operand
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_symbols() {
        let symbols: Vec<&str> = Operator::iter().map(Operator::symbol).collect();
        assert_eq!(symbols, vec!["!", "+", "&&", "||", "==", "<"]);
    }

    #[test]
    fn test_identity_matches_attribute() {
        for op in Operator::iter() {
            assert_eq!(
                op.identity().is_some(),
                op.attrs().contains(OperatorAttr::HAS_ID_ELEMENT),
                "{op:?}"
            );
        }
    }

    #[test]
    fn test_flattenable() {
        assert!(Operator::Add.is_flattenable());
        assert!(Operator::LOr.is_flattenable());
        assert!(!Operator::Eql.is_flattenable());
        assert!(!Operator::Lss.is_flattenable());
        assert!(Operator::Eql.attrs().contains(OperatorAttr::COMM));
        assert!(Operator::Lss.attrs().is_empty());
    }
}
