//! Solver boundary.
//!
//! This module contains everything between the engine and an external SMT
//! solver:
//!
//! - [`Term`] and [`Sort`]: a solver-agnostic term language
//! - [`Helper`]: naming of event constants, clocks, `rf` and join clocks
//! - [`Script`]: declarations plus assertions, rendered as SMT-LIB 2
//! - [`Model`]: values assigned by a solver, with term evaluation
//! - [`Solver`]: the narrow declare/assert/check/model interface
//!
//! With the `z3` feature enabled, `Z3Solver` implements [`Solver`].

mod helper;
mod model;
mod script;
mod solver;
mod term;
#[cfg(feature = "z3")]
mod z3solver;

pub use helper::{array_sort_of, sort_of, Access, Helper, INDEX_WIDTH, RF_FUNC};
pub use model::{FuncInterp, Model, ModelValue};
pub use script::{Declaration, Script};
pub use solver::{SatResult, Solver};
pub use term::{Sort, Term};
#[cfg(feature = "z3")]
pub use z3solver::Z3Solver;
