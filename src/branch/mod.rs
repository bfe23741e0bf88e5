//! Branch and loop join engine.
//!
//! Tracked variables live in a [`Store`] and are addressed by typed [`Var`]
//! handles. An [`If`] or [`Loop`] scope registers the variables it must join
//! through `track`, keeps copies of their state at its boundaries and, when it
//! closes, writes one joined value per modified variable back to the store.
//!
//! # Join rule
//!
//! For a variable with value `t` at the end of the then-arm and `e` at the end
//! of the else-arm (the entry value when an arm did not run or did not exist):
//!
//! - a concrete guard selects its arm
//! - if `t` and `e` are the same expression object, that object is kept
//! - otherwise the variable becomes `(guard?t:e)`
//!
//! The joined variable is one version past the later of the two arms, and a
//! variable neither arm modified keeps both its value and its version.
//!
//! Loops apply the same rule iteration by iteration, from the innermost
//! unwinding outwards, so `k` unwindings yield one nested if-then-else.

mod conditional;
mod join;
mod store;
mod unwind;

pub use conditional::If;
pub use store::{Store, Var, VarId};
pub use unwind::{BoundedUnwindingPolicy, Loop, UnwindingPolicy};
