//! Two-armed conditional scopes.
//!
//! # Semantics
//!
//! An [`If`] moves through `Entry -> InThen -> (InElse)? -> Ended`:
//!
//! - [`If::begin_then`] snapshots every tracked variable and reports whether
//!   the then-arm should run: `true` unless the guard is concretely false.
//! - [`If::begin_else`] captures the then-arm results and resets every
//!   variable the then-arm modified to its entry value, one version later,
//!   so the else-arm starts from the pre-branch state. It reports whether the
//!   else-arm should run: `true` unless the guard is concretely true.
//! - [`If::end`] joins both arms (see [`crate::branch`]). A variable neither
//!   arm modified keeps its value and version.
//!
//! Scopes nest through the store: an inner `end` writes its join back with a
//! fresh version, which the enclosing scope then sees as a modification of its
//! current arm.

use log::debug;

use crate::{
    branch::{
        join::join,
        store::{Slot, Store, Var, VarId},
    },
    error::malformed_scope,
    value::{Primitive, Value},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Entry,
    InThen,
    InElse,
    Ended,
}

/// A conditional scope joining the variables it tracks.
#[derive(Debug)]
pub struct If {
    guard: Value<bool>,
    vars: Vec<VarId>,
    entry: Vec<Slot>,
    then: Vec<Slot>,
    state: State,
}

impl If {
    /// Opens a scope guarded by `guard`.
    #[must_use]
    pub fn new(guard: Value<bool>) -> Self {
        Self {
            guard,
            vars: Vec::new(),
            entry: Vec::new(),
            then: Vec::new(),
            state: State::Entry,
        }
    }

    /// The guard of the scope.
    #[must_use]
    pub fn guard(&self) -> &Value<bool> {
        &self.guard
    }

    /// Registers `var` for joining; tracking a variable twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedScope`] once the then-arm has begun.
    pub fn track<T: Primitive>(&mut self, var: Var<T>) -> Result<()> {
        if self.state != State::Entry {
            return Err(malformed_scope!("if", self.state, "track"));
        }
        if !self.vars.contains(&var.id()) {
            self.vars.push(var.id());
        }
        Ok(())
    }

    /// Enters the then-arm.
    ///
    /// # Returns
    ///
    /// `true` unless the guard is concretely false.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedScope`] if called twice, and
    /// [`crate::Error::UnknownVariable`] if a tracked variable is not in `store`.
    pub fn begin_then(&mut self, store: &Store) -> Result<bool> {
        if self.state != State::Entry {
            return Err(malformed_scope!("if", self.state, "begin_then"));
        }
        self.entry = snapshot(store, &self.vars)?;
        self.state = State::InThen;
        Ok(!self.guard.is_concrete() || self.guard.data())
    }

    /// Enters the else-arm.
    ///
    /// # Returns
    ///
    /// `true` unless the guard is concretely true.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedScope`] unless the scope is in its
    /// then-arm.
    pub fn begin_else(&mut self, store: &mut Store) -> Result<bool> {
        if self.state != State::InThen {
            return Err(malformed_scope!("if", self.state, "begin_else"));
        }
        self.then = snapshot(store, &self.vars)?;
        for ((id, entry), then) in self.vars.iter().zip(&self.entry).zip(&self.then) {
            if then.version != entry.version {
                store.put(
                    *id,
                    Slot {
                        version: then.version + 1,
                        ..entry.clone()
                    },
                )?;
            }
        }
        self.state = State::InElse;
        Ok(!self.guard.is_concrete() || !self.guard.data())
    }

    /// Closes the scope and joins every tracked variable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedScope`] if the then-arm was never
    /// entered or the scope already ended.
    pub fn end(&mut self, store: &mut Store) -> Result<()> {
        let otherwise = match self.state {
            State::InThen => {
                self.then = snapshot(store, &self.vars)?;
                self.entry.clone()
            }
            State::InElse => snapshot(store, &self.vars)?,
            State::Entry | State::Ended => {
                return Err(malformed_scope!("if", self.state, "end"));
            }
        };
        self.state = State::Ended;

        let guard_expr = self.guard.materialize();
        for (((id, entry), then), otherwise) in self
            .vars
            .iter()
            .zip(&self.entry)
            .zip(&self.then)
            .zip(&otherwise)
        {
            if then.version == entry.version && otherwise.version == entry.version {
                continue;
            }
            let version = then.version.max(otherwise.version) + 1;
            let joined = join(&self.guard, &guard_expr, then, otherwise, version);
            debug!(
                "if: join {id} at v{version}{}",
                joined
                    .expr
                    .as_ref()
                    .map(|expr| format!(" as {expr}"))
                    .unwrap_or_default()
            );
            store.put(*id, joined)?;
        }
        Ok(())
    }
}

pub(crate) fn snapshot(store: &Store, vars: &[VarId]) -> Result<Vec<Slot>> {
    vars.iter().map(|id| store.slot(*id).cloned()).collect()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::Error;

    fn symbolic_guard(store: &Store, i: Var<i32>, bound: i32) -> Result<Value<bool>> {
        Ok(store.get(i)?.lt(Value::new(bound)))
    }

    #[test]
    fn test_then_only() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::<i32>::any("I"));

        let mut branch = If::new(symbolic_guard(&store, i, 5)?);
        branch.track(i)?;
        branch.track(i)?;
        assert!(branch.begin_then(&store)?);
        store.set(i, store.get(i)? + Value::new(1))?;
        assert_eq!(store.version(i)?, 1);
        branch.end(&mut store)?;

        assert_eq!(store.get(i)?.to_string(), "(([I]<5)?([I]+1):[I])");
        assert_eq!(store.version(i)?, 2);
        Ok(())
    }

    #[test]
    fn test_then_else() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::<i32>::any("I"));
        let j = store.declare(Value::<i32>::any("J"));

        let mut branch = If::new(symbolic_guard(&store, i, 5)?);
        branch.track(i)?;
        branch.track(j)?;
        assert!(branch.begin_then(&store)?);
        store.set(i, store.get(i)? + Value::new(1))?;
        assert_eq!(store.version(i)?, 1);

        assert!(branch.begin_else(&mut store)?);
        assert_eq!(store.version(i)?, 2);
        assert_eq!(store.get(i)?.to_string(), "[I]");
        store.set(i, store.get(i)? + Value::new(2))?;
        assert_eq!(store.version(i)?, 3);
        branch.end(&mut store)?;

        assert_eq!(store.get(i)?.to_string(), "(([I]<5)?([I]+1):([I]+2))");
        assert_eq!(store.version(i)?, 4);
        assert_eq!(store.get(j)?.to_string(), "[J]");
        assert_eq!(store.version(j)?, 0);
        Ok(())
    }

    #[test]
    fn test_else_only_modification() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::<i32>::any("I"));
        let j = store.declare(Value::<i32>::any("J"));

        let mut branch = If::new(symbolic_guard(&store, i, 5)?);
        branch.track(j)?;
        branch.begin_then(&store)?;
        branch.begin_else(&mut store)?;
        store.set(j, store.get(j)? + Value::new(2))?;
        branch.end(&mut store)?;

        assert_eq!(store.get(j)?.to_string(), "(([I]<5)?[J]:([J]+2))");
        assert_eq!(store.version(j)?, 2);
        Ok(())
    }

    #[test]
    fn test_untouched_variable_keeps_identity() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::<i32>::any("I"));
        let before = store.get(i)?;

        let mut branch = If::new(Value::<bool>::any("G"));
        branch.track(i)?;
        branch.begin_then(&store)?;
        branch.begin_else(&mut store)?;
        branch.end(&mut store)?;

        let after = store.get(i)?;
        assert!(Rc::ptr_eq(before.expr().unwrap(), after.expr().unwrap()));
        assert_eq!(after.version(), 0);
        Ok(())
    }

    #[test]
    fn test_concrete_true_guard() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::new(2));

        let mut branch = If::new(Value::new(2).lt(Value::new(5)));
        branch.track(i)?;
        assert!(branch.begin_then(&store)?);
        store.set(i, store.get(i)? + Value::<i32>::any("A"))?;
        assert!(!branch.begin_else(&mut store)?);
        branch.end(&mut store)?;

        assert_eq!(store.get(i)?.to_string(), "(2+[A])");
        Ok(())
    }

    #[test]
    fn test_concrete_false_guard() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::new(7));

        let mut branch = If::new(Value::new(7).lt(Value::new(5)));
        branch.track(i)?;
        assert!(!branch.begin_then(&store)?);
        assert!(branch.begin_else(&mut store)?);
        store.set(i, store.get(i)? + Value::<i32>::any("A"))?;
        branch.end(&mut store)?;

        assert_eq!(store.get(i)?.to_string(), "(7+[A])");
        Ok(())
    }

    #[test]
    fn test_symbolic_guard_explores_both_arms() -> Result<()> {
        let mut store = Store::new();
        let mut branch = If::new(Value::<bool>::any("G"));
        assert!(branch.begin_then(&store)?);
        assert!(branch.begin_else(&mut store)?);
        branch.end(&mut store)?;
        Ok(())
    }

    #[test]
    fn test_malformed_usage() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::new(0));

        let mut branch = If::new(Value::new(true));
        assert!(matches!(
            branch.begin_else(&mut store),
            Err(Error::MalformedScope {
                call: "begin_else",
                ..
            })
        ));
        assert!(matches!(
            branch.end(&mut store),
            Err(Error::MalformedScope { call: "end", .. })
        ));

        branch.begin_then(&store)?;
        assert!(matches!(
            branch.track(i),
            Err(Error::MalformedScope { call: "track", .. })
        ));
        branch.end(&mut store)?;
        assert!(branch.end(&mut store).is_err());
        Ok(())
    }
}
