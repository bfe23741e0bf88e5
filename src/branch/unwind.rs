//! Bounded loop unwinding.
//!
//! A [`Loop`] is driven by calling [`Loop::unwind`] with the loop guard before
//! every iteration. While the [`UnwindingPolicy`] allows it and the guard is
//! not concretely false, the call records the guard together with the state
//! of every tracked variable and returns `true`. The first call that stops the
//! unwinding folds all recorded iterations right to left into one nested
//! if-then-else per variable and returns `false`, as does every later call.

use std::fmt;

use log::debug;

use crate::{
    branch::{
        conditional::snapshot,
        store::{Slot, Store, Var, VarId},
    },
    error::malformed_scope,
    expr::Expr,
    value::{Primitive, Value},
    Config, Result,
};

/// Decides whether a loop may be unwound once more.
pub trait UnwindingPolicy: fmt::Debug {
    /// Called before each prospective iteration with its guard.
    fn unwind(&mut self, guard: &Value<bool>) -> bool;
}

/// Allows a fixed number of unwindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedUnwindingPolicy {
    bound: usize,
    count: usize,
}

impl BoundedUnwindingPolicy {
    /// Creates a policy allowing `bound` unwindings.
    #[must_use]
    pub fn new(bound: usize) -> Self {
        Self { bound, count: 0 }
    }
}

impl UnwindingPolicy for BoundedUnwindingPolicy {
    fn unwind(&mut self, _guard: &Value<bool>) -> bool {
        if self.count < self.bound {
            self.count += 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Entry,
    Unwinding,
    Ended,
}

#[derive(Debug)]
struct Iteration {
    guard: Value<bool>,
    entry: Vec<Slot>,
}

/// A loop scope unwinding its body a bounded number of times.
#[derive(Debug)]
pub struct Loop {
    policy: Box<dyn UnwindingPolicy>,
    vars: Vec<VarId>,
    iterations: Vec<Iteration>,
    state: State,
}

impl Loop {
    /// Creates a loop unwinding at most `bound` times.
    #[must_use]
    pub fn new(bound: usize) -> Self {
        Self::with_policy(Box::new(BoundedUnwindingPolicy::new(bound)))
    }

    /// Creates a loop unwinding `config.unwind_bound` times.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.unwind_bound)
    }

    /// Creates a loop governed by a custom policy.
    #[must_use]
    pub fn with_policy(policy: Box<dyn UnwindingPolicy>) -> Self {
        Self {
            policy,
            vars: Vec::new(),
            iterations: Vec::new(),
            state: State::Entry,
        }
    }

    /// Registers `var` for joining; tracking a variable twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedScope`] once unwinding has begun.
    pub fn track<T: Primitive>(&mut self, var: Var<T>) -> Result<()> {
        if self.state != State::Entry {
            return Err(malformed_scope!("loop", self.state, "track"));
        }
        if !self.vars.contains(&var.id()) {
            self.vars.push(var.id());
        }
        Ok(())
    }

    /// Number of iterations recorded so far.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations.len()
    }

    /// Decides whether to run the body once more.
    ///
    /// # Arguments
    ///
    /// * `store` - The store holding the tracked variables.
    /// * `guard` - The loop condition evaluated on the current state.
    ///
    /// # Returns
    ///
    /// `true` if the body should run; `false` once the loop has been joined.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownVariable`] if a tracked variable is not
    /// in `store`.
    pub fn unwind(&mut self, store: &mut Store, guard: Value<bool>) -> Result<bool> {
        if self.state == State::Ended {
            return Ok(false);
        }
        self.state = State::Unwinding;

        let feasible = !guard.is_concrete() || guard.data();
        if feasible && self.policy.unwind(&guard) {
            let entry = snapshot(store, &self.vars)?;
            self.iterations.push(Iteration { guard, entry });
            return Ok(true);
        }

        self.join(store)?;
        self.state = State::Ended;
        Ok(false)
    }

    fn join(&self, store: &mut Store) -> Result<()> {
        let Some(first) = self.iterations.first() else {
            return Ok(());
        };
        for (index, id) in self.vars.iter().enumerate() {
            let current = store.slot(*id)?.clone();
            let initial = &first.entry[index];
            if current.version == initial.version {
                continue;
            }

            let mut folded = current.clone();
            for iteration in self.iterations.iter().rev() {
                let entry = &iteration.entry[index];
                let guard = &iteration.guard;
                if guard.is_concrete() || folded.same_value(entry) {
                    continue;
                }
                let taken = if guard.data() { &folded } else { entry };
                folded = Slot {
                    data: taken.data,
                    expr: Some(Expr::ite(
                        guard.materialize(),
                        folded.materialize(),
                        entry.materialize(),
                    )),
                    concrete: taken.concrete,
                    version: folded.version,
                };
            }
            folded.version = current.version + 1;
            debug!(
                "loop: join {id} over {} iterations at v{}",
                self.iterations.len(),
                folded.version
            );
            store.put(*id, folded)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_bounded_policy() {
        let mut policy = BoundedUnwindingPolicy::new(2);
        let guard = Value::new(true);
        assert!(policy.unwind(&guard));
        assert!(policy.unwind(&guard));
        assert!(!policy.unwind(&guard));
        assert!(!policy.unwind(&guard));
    }

    #[test]
    fn test_single_unwinding() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::<i32>::any("I"));
        let mut l = Loop::new(1);
        l.track(i)?;

        let guard = store.get(i)?.lt(Value::new(5));
        assert!(l.unwind(&mut store, guard)?);
        store.set(i, store.get(i)? + Value::new(1))?;
        let before = store.version(i)?;
        let guard = store.get(i)?.lt(Value::new(5));
        assert!(!l.unwind(&mut store, guard)?);

        assert_eq!(store.get(i)?.to_string(), "(([I]<5)?([I]+1):[I])");
        assert_eq!(store.version(i)?, before + 1);
        assert!(!l.unwind(&mut store, Value::new(true))?);
        assert_eq!(l.iterations(), 1);
        Ok(())
    }

    #[test]
    fn test_two_unwindings() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::<i32>::any("I"));
        let j = store.declare(Value::<i32>::any("J"));
        let mut l = Loop::new(2);
        l.track(i)?;
        l.track(j)?;

        let bounds = [5, 7];
        let steps = [1, 2];
        let mut k = 0;
        loop {
            let guard = store.get(i)?.lt(Value::new(bounds[k.min(1)]));
            if !l.unwind(&mut store, guard)? {
                break;
            }
            store.set(i, store.get(i)? + Value::new(steps[k]))?;
            store.set(j, store.get(j)? + Value::new(steps[k]))?;
            k += 1;
        }

        assert_eq!(k, 2);
        assert_eq!(
            store.get(i)?.to_string(),
            "(([I]<5)?((([I]+1)<7)?(([I]+1)+2):([I]+1)):[I])"
        );
        assert_eq!(
            store.get(j)?.to_string(),
            "(([I]<5)?((([I]+1)<7)?(([J]+1)+2):([J]+1)):[J])"
        );
        Ok(())
    }

    #[test]
    fn test_concretely_false_guard_stops() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::new(9));
        let mut l = Loop::from_config(&Config::with_unwind_bound(4));
        l.track(i)?;
        let guard = store.get(i)?.lt(Value::new(5));
        assert!(!l.unwind(&mut store, guard)?);
        assert_eq!(store.version(i)?, 0);
        assert_eq!(l.iterations(), 0);
        Ok(())
    }

    #[test]
    fn test_concrete_iterations_need_no_ternary() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::new(0));
        let a = Value::<i32>::any("A");
        let mut l = Loop::new(3);
        l.track(i)?;
        loop {
            let guard = store.get(i)?.lt(Value::new(2));
            if !l.unwind(&mut store, guard)? {
                break;
            }
            store.set(i, store.get(i)? + Value::new(1))?;
        }
        assert_eq!(store.get(i)?.data(), 2);
        assert!(!store.get(i)?.is_symbolic());

        let s = store.declare(Value::new(0));
        let mut l = Loop::new(1);
        l.track(s)?;
        while l.unwind(&mut store, Value::new(true))? {
            store.set(s, store.get(s)? + a.clone())?;
        }
        assert_eq!(store.get(s)?.to_string(), "(0+[A])");
        Ok(())
    }

    #[test]
    fn test_track_after_unwind() -> Result<()> {
        let mut store = Store::new();
        let i = store.declare(Value::new(0));
        let mut l = Loop::new(1);
        l.unwind(&mut store, Value::new(true))?;
        assert!(matches!(
            l.track(i),
            Err(Error::MalformedScope { scope: "loop", .. })
        ));
        Ok(())
    }
}
