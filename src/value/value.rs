//! Concolic values.
//!
//! A [`Value`] pairs a concrete host scalar with an optional symbolic
//! companion in the expression DAG. Operators compute the concrete result
//! eagerly with the host's promotion rules and, when either operand is
//! symbolic, build the matching DAG node with purely concrete operands
//! turned into literal leaves.
//!
//! # Symbolic vs concrete
//!
//! The two predicates are independent:
//! - [`Value::is_symbolic`] holds iff a companion expression is present
//! - [`Value::is_concrete`] holds unless the value originates from a free
//!   variable ([`Value::any`]); the branch engine relies on it to decide
//!   whether a guard can be trusted
//!
//! A value built with [`Value::with_expr`] is both symbolic and concrete.

use std::{
    fmt,
    ops::{Add, Not},
};

use crate::{
    branch::VarId,
    expr::{Expr, NaryBuilder, Operator, Scalar, SharedExpr, Type},
    value::primitive::{Primitive, Promote},
};

/// Version counter of a tracked variable.
pub type Version = u32;

/// A concrete value of type `T` with an optional symbolic companion.
#[derive(Debug, Clone)]
pub struct Value<T: Primitive> {
    data: T,
    expr: Option<SharedExpr>,
    concrete: bool,
    version: Version,
    origin: Option<(VarId, Version)>,
}

impl<T: Primitive> Value<T> {
    /// Creates a purely concrete value.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            expr: None,
            concrete: true,
            version: 0,
            origin: None,
        }
    }

    /// Creates a concrete value that carries `expr` as symbolic companion.
    #[must_use]
    pub fn with_expr(data: T, expr: SharedExpr) -> Self {
        Self {
            expr: Some(expr),
            ..Self::new(data)
        }
    }

    /// Creates a free variable named `name`.
    ///
    /// The concrete part is the default of `T` and only serves concolic
    /// continuation; the value is symbolic and not concrete.
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            data: T::default(),
            expr: Some(Expr::any(name, T::TYPE)),
            concrete: false,
            version: 0,
            origin: None,
        }
    }

    /// The concrete part.
    #[must_use]
    pub fn data(&self) -> T {
        self.data
    }

    /// The type tag, fixed at construction.
    #[must_use]
    pub fn ty(&self) -> Type {
        T::TYPE
    }

    /// The symbolic companion, if any.
    #[must_use]
    pub fn expr(&self) -> Option<&SharedExpr> {
        self.expr.as_ref()
    }

    /// The version of the variable this value was last assigned to.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Checks if a symbolic companion is present.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        self.expr.is_some()
    }

    /// Checks if the value was derived from host data only.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.concrete
    }

    /// Replaces the companion with a fresh leaf named `name`.
    ///
    /// Concrete values become `[name:data]`; free values become `[name]`.
    /// The version is left untouched.
    pub fn set_symbolic(&mut self, name: impl Into<String>) {
        self.expr = Some(if self.concrete {
            Expr::named(name, self.data.to_scalar())
        } else {
            Expr::any(name, T::TYPE)
        });
    }

    /// Copies the value into another primitive type.
    ///
    /// The data is converted natively. If the types differ, the companion is
    /// wrapped in a new cast node; otherwise it is shared.
    #[must_use]
    pub fn cast<U: Primitive>(&self) -> Value<U> {
        let same = T::TYPE == U::TYPE;
        Value {
            data: U::from_scalar(self.data.to_scalar()),
            expr: self.expr.as_ref().map(|expr| {
                if same {
                    expr.clone()
                } else {
                    Expr::cast(U::TYPE, expr.clone())
                }
            }),
            concrete: self.concrete,
            version: self.version,
            origin: if same { self.origin } else { None },
        }
    }

    /// Assigns `source` to this value.
    ///
    /// The type tag and the concreteness of `self` are kept. Data and
    /// companion are taken from `source`, converted to `T`, and the version
    /// becomes `max(version + 1, source.version())`.
    pub fn assign<U: Primitive>(&mut self, source: &Value<U>) {
        let converted = source.cast::<T>();
        self.data = converted.data;
        self.expr = converted.expr;
        self.version = (self.version + 1).max(source.version);
    }

    pub(crate) fn from_parts(
        data: T,
        expr: Option<SharedExpr>,
        concrete: bool,
        version: Version,
        origin: Option<(VarId, Version)>,
    ) -> Self {
        Self {
            data,
            expr,
            concrete,
            version,
            origin,
        }
    }

    pub(crate) fn origin(&self) -> Option<(VarId, Version)> {
        self.origin
    }

    /// The companion, or a literal leaf holding the data.
    pub(crate) fn materialize(&self) -> SharedExpr {
        self.expr
            .clone()
            .unwrap_or_else(|| Expr::literal(self.data.to_scalar()))
    }

    fn into_operand(self) -> Operand {
        Operand {
            expr: self.expr,
            data: self.data.to_scalar(),
        }
    }

    fn combine<U: Primitive, O: Primitive>(
        self,
        rhs: Value<U>,
        op: Operator,
        operand_ty: Type,
        data: O,
    ) -> Value<O> {
        let concrete = self.concrete && rhs.concrete;
        let expr = if self.is_symbolic() || rhs.is_symbolic() {
            Some(apply(op, operand_ty, self.into_operand(), rhs.into_operand()))
        } else {
            None
        };
        Value::from_parts(data, expr, concrete, 0, None)
    }

    fn promoted(&self) -> i32 {
        i32::from_scalar(self.data.to_scalar())
    }

    /// Signed less-than after promotion.
    #[must_use]
    pub fn lt<U: Primitive>(self, rhs: Value<U>) -> Value<bool> {
        let data = self.promoted() < rhs.promoted();
        self.combine(rhs, Operator::Lss, T::TYPE.common(U::TYPE), data)
    }

    /// Equality after promotion.
    #[must_use]
    pub fn equals<U: Primitive>(self, rhs: Value<U>) -> Value<bool> {
        let data = self.promoted() == rhs.promoted();
        self.combine(rhs, Operator::Eql, T::TYPE.common(U::TYPE), data)
    }
}

impl Value<bool> {
    /// Logical conjunction.
    #[must_use]
    pub fn and(self, rhs: Value<bool>) -> Value<bool> {
        let data = self.data && rhs.data;
        self.combine(rhs, Operator::LAnd, Type::Bool, data)
    }

    /// Logical disjunction.
    #[must_use]
    pub fn or(self, rhs: Value<bool>) -> Value<bool> {
        let data = self.data || rhs.data;
        self.combine(rhs, Operator::LOr, Type::Bool, data)
    }
}

impl<T, U> Add<Value<U>> for Value<T>
where
    T: Promote<U>,
    U: Primitive,
{
    type Output = Value<<T as Promote<U>>::Output>;

    fn add(self, rhs: Value<U>) -> Self::Output {
        let sum = self.promoted().wrapping_add(rhs.promoted());
        let data = <T as Promote<U>>::Output::from_scalar(Scalar::Int(sum));
        let operand_ty = <T as Promote<U>>::Output::TYPE;
        self.combine(rhs, Operator::Add, operand_ty, data)
    }
}

impl Not for Value<bool> {
    type Output = Value<bool>;

    fn not(self) -> Value<bool> {
        let expr = self.expr.map(Expr::not);
        Value::from_parts(!self.data, expr, self.concrete, 0, None)
    }
}

impl<T: Primitive> From<T> for Value<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Primitive> fmt::Display for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            Some(expr) => write!(f, "{expr}"),
            None => write!(f, "{}", self.data.to_scalar()),
        }
    }
}

struct Operand {
    expr: Option<SharedExpr>,
    data: Scalar,
}

impl Operand {
    fn into_expr(self, ty: Type) -> SharedExpr {
        let expr = self.expr.unwrap_or_else(|| Expr::literal(self.data));
        if self.data.ty() == ty {
            expr
        } else {
            Expr::cast(ty, expr)
        }
    }

    /// Reopens an exclusively owned application of `op` to absorb another operand.
    fn reopen(self, op: Operator, ty: Type) -> Result<NaryBuilder, Operand> {
        let Operand { expr, data } = self;
        match expr {
            Some(expr) if op.is_flattenable() && data.ty() == ty => NaryBuilder::reopen(expr, op)
                .map_err(|expr| Operand {
                    expr: Some(expr),
                    data,
                }),
            expr => Err(Operand { expr, data }),
        }
    }
}

fn apply(op: Operator, operand_ty: Type, lhs: Operand, rhs: Operand) -> SharedExpr {
    let lhs = match lhs.reopen(op, operand_ty) {
        Ok(mut builder) => {
            builder.append(rhs.into_expr(operand_ty));
            return builder.seal();
        }
        Err(lhs) => lhs,
    };
    let rhs = match rhs.reopen(op, operand_ty) {
        Ok(mut builder) => {
            builder.prepend(lhs.into_expr(operand_ty));
            return builder.seal();
        }
        Err(rhs) => rhs,
    };
    Expr::binary(
        op,
        operand_ty,
        lhs.into_expr(operand_ty),
        rhs.into_expr(operand_ty),
    )
}
