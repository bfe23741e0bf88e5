//! Instructions computing the values events read and write.
//!
//! Instructions are the concurrency counterpart of [`crate::expr::Expr`]:
//! their leaves are literals and read events rather than named variables, and
//! they can dereference an array read at an offset.

use std::{fmt, rc::Rc};

use crate::{
    concurrent::event::Event,
    expr::{Operator, Scalar, Type},
};

/// A value computed from literals and read events.
#[derive(Debug)]
pub enum Instr {
    /// A literal
    Literal(Scalar),
    /// The value observed by a read event
    Basic(Rc<Event>),
    /// A unary operator application
    Unary {
        /// The operator
        op: Operator,
        /// The operand
        operand: Rc<Instr>,
    },
    /// A binary operator application
    Binary {
        /// The operator
        op: Operator,
        /// Left operand
        lhs: Rc<Instr>,
        /// Right operand
        rhs: Rc<Instr>,
    },
    /// An n-ary operator application over operands of type `ty`
    Nary {
        /// The operator
        op: Operator,
        /// Type of the operands
        ty: Type,
        /// The operands
        operands: Vec<Rc<Instr>>,
    },
    /// The element of an array read at an offset
    Deref {
        /// The array, usually a [`Instr::Basic`] of an array read
        memory: Rc<Instr>,
        /// Element index
        offset: Rc<Instr>,
    },
}

impl Instr {
    /// Creates a literal.
    #[must_use]
    pub fn literal(value: Scalar) -> Rc<Instr> {
        Rc::new(Instr::Literal(value))
    }

    /// Reads the value observed by `event`.
    #[must_use]
    pub fn basic(event: &Rc<Event>) -> Rc<Instr> {
        Rc::new(Instr::Basic(event.clone()))
    }

    /// Creates a unary application.
    #[must_use]
    pub fn unary(op: Operator, operand: Rc<Instr>) -> Rc<Instr> {
        Rc::new(Instr::Unary { op, operand })
    }

    /// Creates a binary application.
    #[must_use]
    pub fn binary(op: Operator, lhs: Rc<Instr>, rhs: Rc<Instr>) -> Rc<Instr> {
        Rc::new(Instr::Binary { op, lhs, rhs })
    }

    /// Creates an n-ary application.
    #[must_use]
    pub fn nary(op: Operator, ty: Type, operands: Vec<Rc<Instr>>) -> Rc<Instr> {
        Rc::new(Instr::Nary { op, ty, operands })
    }

    /// Loads `memory[offset]`.
    #[must_use]
    pub fn deref(memory: Rc<Instr>, offset: Rc<Instr>) -> Rc<Instr> {
        Rc::new(Instr::Deref { memory, offset })
    }

    /// Type of the computed value; arrays report their element type.
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Instr::Literal(value) => value.ty(),
            Instr::Basic(event) => event.memory_type().element(),
            Instr::Unary { .. } => Type::Bool,
            Instr::Binary { op, lhs, .. } => op.result_type(lhs.ty()),
            Instr::Nary { op, ty, .. } => op.result_type(*ty),
            Instr::Deref { memory, .. } => memory.ty(),
        }
    }

    /// Read events the value depends on, in first-use order.
    #[must_use]
    pub fn reads(&self) -> Vec<Rc<Event>> {
        let mut out: Vec<Rc<Event>> = Vec::new();
        self.collect_reads(&mut out);
        out
    }

    fn collect_reads(&self, out: &mut Vec<Rc<Event>>) {
        match self {
            Instr::Literal(_) => {}
            Instr::Basic(event) => {
                if !out.iter().any(|seen| seen.id() == event.id()) {
                    out.push(event.clone());
                }
            }
            Instr::Unary { operand, .. } => operand.collect_reads(out),
            Instr::Binary { lhs, rhs, .. } => {
                lhs.collect_reads(out);
                rhs.collect_reads(out);
            }
            Instr::Nary { operands, .. } => {
                for operand in operands {
                    operand.collect_reads(out);
                }
            }
            Instr::Deref { memory, offset } => {
                memory.collect_reads(out);
                offset.collect_reads(out);
            }
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Literal(value) => write!(f, "{value}"),
            Instr::Basic(event) => write!(f, "[{event}]"),
            Instr::Unary { op, operand } => write!(f, "({op}{operand})"),
            Instr::Binary { op, lhs, rhs } => write!(f, "({lhs}{op}{rhs})"),
            Instr::Nary { op, operands, .. } => {
                f.write_str("(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{op}")?;
                    }
                    write!(f, "{operand}")?;
                }
                f.write_str(")")
            }
            Instr::Deref { memory, offset } => write!(f, "{memory}[{offset}]"),
        }
    }
}
