use thiserror::Error;

use crate::{
    branch::VarId,
    expr::{Operator, Type},
    smt::Sort,
};

macro_rules! malformed_scope {
    ($scope:expr, $state:expr, $call:expr) => {
        crate::Error::MalformedScope {
            scope: $scope,
            state: format!("{:?}", $state),
            call: $call,
            file: file!(),
            line: line!(),
        }
    };
}

pub(crate) use malformed_scope;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant describes a local contract violation that is surfaced synchronously to the
/// caller. None of them is retried, and none of them is ever folded into a solver answer: an
/// [`Error::UnsupportedType`] is a distinct outcome from an unsatisfiable formula.
///
/// # Error Categories
///
/// ## Encoding Errors
/// - [`Error::UnsupportedType`] - An encoder cannot translate a primitive type
/// - [`Error::EmptyNary`] - An n-ary node without operands was encoded
/// - [`Error::PartialNary`] - A single-operand n-ary node has no identity to fall back on
/// - [`Error::NoIdentity`] - The identity constant of an operator without one was requested
/// - [`Error::SortMismatch`] - Two terms of incompatible sorts were combined
///
/// ## Scope Errors
/// - [`Error::MalformedScope`] - `If`/`Loop` calls arrived in the wrong order
/// - [`Error::UnknownVariable`] - A variable handle does not belong to the store
///
/// ## Solver Errors
/// - [`Error::Solver`] - The external solver backend failed
/// - [`Error::Evaluation`] - A term could not be evaluated under a model
///
/// # Examples
///
/// ```rust
/// use concolic::{branch::If, Error, Value};
///
/// let mut branch = If::new(Value::new(true));
/// let mut store = concolic::branch::Store::new();
///
/// match branch.end(&mut store) {
///     Err(Error::MalformedScope { call, .. }) => assert_eq!(call, "end"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An encoder was asked to translate a primitive type it does not support.
    ///
    /// The sequential encoder only knows `bool` and `int`; narrow integer types
    /// are rejected here rather than silently widened.
    #[error("Unsupported type - {0}")]
    UnsupportedType(Type),

    /// A branch or loop scope was driven out of order.
    ///
    /// # Fields
    ///
    /// * `scope` - Kind of scope (`if` or `loop`)
    /// * `state` - State the scope was in when the call arrived
    /// * `call` - The offending call
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Malformed scope - {file}:{line}: `{call}` on {scope} scope in state {state}")]
    MalformedScope {
        /// Kind of scope
        scope: &'static str,
        /// State of the scope at the time of the call
        state: String,
        /// Name of the call that was rejected
        call: &'static str,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An n-ary expression without any operand was encoded directly.
    #[error("Cannot encode n-ary `{0}` without operands")]
    EmptyNary(Operator),

    /// A single-operand n-ary expression whose operator has no identity element.
    #[error("Cannot encode n-ary `{0}` with a single operand")]
    PartialNary(Operator),

    /// The identity constant of an operator without identity element was requested.
    #[error("Operator `{0}` has no identity element")]
    NoIdentity(Operator),

    /// A term of the wrong sort was combined or evaluated.
    #[error("Sort mismatch - expected {expected}, found {found}")]
    SortMismatch {
        /// The sort required by the operation
        expected: Sort,
        /// The sort that was supplied
        found: Sort,
    },

    /// A variable handle that was never declared in this store.
    #[error("Unknown variable - {0}")]
    UnknownVariable(VarId),

    /// The external solver backend failed.
    #[error("Solver - {0}")]
    Solver(String),

    /// A term could not be evaluated under a model.
    #[error("Evaluation - {0}")]
    Evaluation(String),
}
