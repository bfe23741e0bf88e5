//! Arena of tracked variables.
//!
//! Every program variable the instrumentation tracks lives in one slot of a
//! [`Store`] and is addressed through a typed [`Var`] handle. Scopes never
//! hold references into the store; they keep copies of slots (snapshots) and
//! write joined results back through the store.

use std::{fmt, marker::PhantomData};

use log::trace;

use crate::{
    expr::{Expr, Scalar, SharedExpr},
    value::{Primitive, Value, Version},
    Error, Result,
};

/// Stable identity of a tracked variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var#{}", self.0)
    }
}

/// Typed handle to a variable of a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var<T: Primitive> {
    id: VarId,
    _marker: PhantomData<T>,
}

impl<T: Primitive> Var<T> {
    /// The untyped identity of the variable.
    #[must_use]
    pub fn id(&self) -> VarId {
        self.id
    }
}

/// Type-erased state of one variable.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) data: Scalar,
    pub(crate) expr: Option<SharedExpr>,
    pub(crate) concrete: bool,
    pub(crate) version: Version,
}

impl Slot {
    /// The companion, or a literal leaf holding the data.
    pub(crate) fn materialize(&self) -> SharedExpr {
        self.expr
            .clone()
            .unwrap_or_else(|| Expr::literal(self.data))
    }

    /// Checks if both slots denote the same value without building a node.
    pub(crate) fn same_value(&self, other: &Slot) -> bool {
        match (&self.expr, &other.expr) {
            (Some(lhs), Some(rhs)) => SharedExpr::ptr_eq(lhs, rhs),
            (None, None) => self.data == other.data,
            _ => false,
        }
    }
}

/// Arena of tracked variables.
#[derive(Debug, Clone, Default)]
pub struct Store {
    slots: Vec<Slot>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable initialised with `init`, at version 0.
    pub fn declare<T: Primitive>(&mut self, init: Value<T>) -> Var<T> {
        let id = VarId(self.slots.len());
        self.slots.push(Slot {
            data: init.data().to_scalar(),
            expr: init.expr().cloned(),
            concrete: init.is_concrete(),
            version: 0,
        });
        Var {
            id,
            _marker: PhantomData,
        }
    }

    /// Number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if no variable has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reads the current value of `var`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariable`] if `var` was not declared here.
    pub fn get<T: Primitive>(&self, var: Var<T>) -> Result<Value<T>> {
        let slot = self.slot(var.id)?;
        Ok(Value::from_parts(
            T::from_scalar(slot.data),
            slot.expr.clone(),
            slot.concrete,
            slot.version,
            Some((var.id, slot.version)),
        ))
    }

    /// Current version of `var`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariable`] if `var` was not declared here.
    pub fn version<T: Primitive>(&self, var: Var<T>) -> Result<Version> {
        Ok(self.slot(var.id)?.version)
    }

    /// Assigns `value` to `var`.
    ///
    /// Follows [`Value::assign`]: the variable keeps its type and concreteness
    /// and its version becomes `max(version + 1, value.version())`. Writing
    /// back a value read from the same variable at its current version is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariable`] if `var` was not declared here.
    pub fn set<T: Primitive, U: Primitive>(&mut self, var: Var<T>, value: Value<U>) -> Result<()> {
        let mut current = self.get(var)?;
        if value.origin() == Some((var.id, current.version())) {
            trace!("{}: self-assignment ignored", var.id);
            return Ok(());
        }
        current.assign(&value);
        self.put(
            var.id,
            Slot {
                data: current.data().to_scalar(),
                expr: current.expr().cloned(),
                concrete: current.is_concrete(),
                version: current.version(),
            },
        )
    }

    pub(crate) fn slot(&self, id: VarId) -> Result<&Slot> {
        self.slots.get(id.0).ok_or(Error::UnknownVariable(id))
    }

    pub(crate) fn put(&mut self, id: VarId, slot: Slot) -> Result<()> {
        let target = self.slots.get_mut(id.0).ok_or(Error::UnknownVariable(id))?;
        *target = slot;
        Ok(())
    }
}
