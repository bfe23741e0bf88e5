//! Expression DAG nodes.
//!
//! Nodes are reference counted through [`SharedExpr`] and are never mutated
//! once shared. The single exception to immutability is the n-ary node, which
//! is assembled through an exclusively owned [`NaryBuilder`] and only becomes
//! an [`Expr::Nary`] when sealed. A sealed node can be reopened only while no
//! other owner holds it, see [`NaryBuilder::reopen`].

use std::{fmt, rc::Rc};

use crate::expr::{
    ops::Operator,
    types::{Scalar, Type},
    visitor::Printer,
};

/// Shared, immutable reference to an expression node.
pub type SharedExpr = Rc<Expr>;

/// A vertex of the expression DAG.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A free variable, printed as `[name]`.
    Any {
        /// Name of the variable
        name: String,
        /// Type of the variable
        ty: Type,
    },
    /// A literal, printed as its value or as `[name:value]` when named.
    Value {
        /// The literal
        value: Scalar,
        /// Optional name exposed through `set_symbolic`
        name: Option<String>,
    },
    /// A type conversion, printed as `((type)(operand))`.
    Cast {
        /// Target type
        ty: Type,
        /// Converted expression
        operand: SharedExpr,
    },
    /// A unary operator application, printed as `(!operand)`.
    Unary {
        /// The operator
        op: Operator,
        /// The operand
        operand: SharedExpr,
    },
    /// An if-then-else, printed as `(cond?then:otherwise)`.
    Ite {
        /// Boolean guard
        cond: SharedExpr,
        /// Value if the guard holds
        then: SharedExpr,
        /// Value if the guard does not hold
        otherwise: SharedExpr,
    },
    /// A sealed n-ary operator application, printed as `(a+b+c)`.
    Nary(NaryExpr),
}

impl Expr {
    /// Creates a free variable leaf.
    #[must_use]
    pub fn any(name: impl Into<String>, ty: Type) -> SharedExpr {
        Rc::new(Expr::Any {
            name: name.into(),
            ty,
        })
    }

    /// Creates an anonymous literal leaf.
    #[must_use]
    pub fn literal(value: Scalar) -> SharedExpr {
        Rc::new(Expr::Value { value, name: None })
    }

    /// Creates a named literal leaf.
    #[must_use]
    pub fn named(name: impl Into<String>, value: Scalar) -> SharedExpr {
        Rc::new(Expr::Value {
            value,
            name: Some(name.into()),
        })
    }

    /// Wraps `operand` in a cast to `ty`.
    #[must_use]
    pub fn cast(ty: Type, operand: SharedExpr) -> SharedExpr {
        Rc::new(Expr::Cast { ty, operand })
    }

    /// Creates a logical negation.
    #[must_use]
    pub fn not(operand: SharedExpr) -> SharedExpr {
        Rc::new(Expr::Unary {
            op: Operator::Not,
            operand,
        })
    }

    /// Creates an if-then-else node.
    ///
    /// # Arguments
    ///
    /// * `cond` - Boolean guard.
    /// * `then` - Value selected when `cond` holds.
    /// * `otherwise` - Value selected when `cond` does not hold.
    #[must_use]
    pub fn ite(cond: SharedExpr, then: SharedExpr, otherwise: SharedExpr) -> SharedExpr {
        Rc::new(Expr::Ite {
            cond,
            then,
            otherwise,
        })
    }

    /// Creates a sealed two-operand node.
    ///
    /// Operand types are not checked; `operand_ty` only determines the type
    /// of the result.
    #[must_use]
    pub fn binary(op: Operator, operand_ty: Type, lhs: SharedExpr, rhs: SharedExpr) -> SharedExpr {
        let mut builder = NaryBuilder::new(op, operand_ty);
        builder.append(lhs);
        builder.append(rhs);
        builder.seal()
    }

    /// Type of the value this node evaluates to.
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Expr::Any { ty, .. } | Expr::Cast { ty, .. } => *ty,
            Expr::Value { value, .. } => value.ty(),
            Expr::Unary { .. } => Type::Bool,
            Expr::Ite { then, .. } => then.ty(),
            Expr::Nary(nary) => nary.ty(),
        }
    }

    /// Returns the literal if this node is an anonymous or named literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<Scalar> {
        match self {
            Expr::Value { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.walk(&mut Printer::new(f))
    }
}

/// A sealed n-ary operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct NaryExpr {
    op: Operator,
    operand_ty: Type,
    operands: Vec<SharedExpr>,
}

impl NaryExpr {
    /// The operator applied to all operands.
    #[must_use]
    pub fn op(&self) -> Operator {
        self.op
    }

    /// Operands in application order.
    #[must_use]
    pub fn operands(&self) -> &[SharedExpr] {
        &self.operands
    }

    /// Type the operands were promoted to.
    #[must_use]
    pub fn operand_ty(&self) -> Type {
        self.operand_ty
    }

    /// Result type of the application.
    #[must_use]
    pub fn ty(&self) -> Type {
        self.op.result_type(self.operand_ty)
    }

    /// Checks if the node holds fewer than two operands.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.operands.len() < 2
    }
}

/// Exclusively owned, mutable n-ary node under construction.
#[derive(Debug)]
pub struct NaryBuilder {
    inner: NaryExpr,
}

impl NaryBuilder {
    /// Starts an empty application of `op` over operands of type `operand_ty`.
    #[must_use]
    pub fn new(op: Operator, operand_ty: Type) -> Self {
        Self {
            inner: NaryExpr {
                op,
                operand_ty,
                operands: Vec::new(),
            },
        }
    }

    /// Reopens a sealed node for further operands.
    ///
    /// Succeeds only when `expr` is an n-ary application of `op` and no other
    /// reference to it exists; otherwise the untouched reference is handed back.
    ///
    /// # Arguments
    ///
    /// * `expr` - The node to reopen.
    /// * `op` - The operator the reopened node must carry.
    ///
    /// # Errors
    ///
    /// Returns `expr` unchanged if it is shared or is not an application of `op`.
    pub fn reopen(expr: SharedExpr, op: Operator) -> std::result::Result<Self, SharedExpr> {
        match &*expr {
            Expr::Nary(nary) if nary.op == op => {}
            _ => return Err(expr),
        }
        match Rc::try_unwrap(expr) {
            Ok(Expr::Nary(inner)) => Ok(Self { inner }),
            Ok(other) => Err(Rc::new(other)),
            Err(shared) => Err(shared),
        }
    }

    /// Adds an operand after all existing ones.
    pub fn append(&mut self, operand: SharedExpr) {
        self.inner.operands.push(operand);
    }

    /// Adds an operand before all existing ones.
    pub fn prepend(&mut self, operand: SharedExpr) {
        self.inner.operands.insert(0, operand);
    }

    /// Number of operands added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.operands.len()
    }

    /// Checks if no operand has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.operands.is_empty()
    }

    /// The operator under construction.
    #[must_use]
    pub fn op(&self) -> Operator {
        self.inner.op
    }

    /// Freezes the node so it can be shared.
    #[must_use]
    pub fn seal(self) -> SharedExpr {
        Rc::new(Expr::Nary(self.inner))
    }
}
