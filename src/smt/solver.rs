//! The solver boundary.
//!
//! The engine never decides satisfiability itself. Everything it produces is
//! handed to an implementation of [`Solver`], which exposes the four
//! operations an external SMT solver offers: declare, assert, check and
//! model extraction.

use std::fmt;

use crate::{
    smt::{model::Model, script::Declaration, term::Term},
    Result,
};

/// Outcome of a satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SatResult {
    /// The assertions have a model
    Sat,
    /// The assertions have no model
    Unsat,
    /// The solver gave up
    Unknown,
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SatResult::Sat => "sat",
            SatResult::Unsat => "unsat",
            SatResult::Unknown => "unknown",
        })
    }
}

/// An external constraint solver session.
///
/// A session is a single mutable resource: callers must not interleave two
/// encodings into the same session.
pub trait Solver {
    /// Declares a constant or function.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Solver`] if the backend rejects the declaration.
    fn declare(&mut self, declaration: &Declaration) -> Result<()>;

    /// Asserts a boolean term.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Solver`] if the backend rejects the term.
    fn assert(&mut self, term: &Term) -> Result<()>;

    /// Checks satisfiability of everything asserted so far.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Solver`] if the backend fails.
    fn check(&mut self) -> Result<SatResult>;

    /// Model of the last satisfiable check.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Solver`] if the last check was not satisfiable.
    fn model(&self) -> Result<Model>;
}
