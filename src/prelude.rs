//! # concolic Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the concolic library. Import this module to get quick access to the essential
//! types for tracking values, joining branches and encoding executions.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all concolic operations
pub use crate::Error;

/// The result type used throughout concolic
pub use crate::Result;

/// Engine configuration
pub use crate::Config;

// ================================================================================================
// Expressions and Values
// ================================================================================================

/// Expression DAG nodes and builders
pub use crate::expr::{Expr, ExprEncoder, NaryBuilder, SharedExpr, Visitor};

/// Operators and primitive types
pub use crate::expr::{Operator, Scalar, Type};

/// Concolic values and path constraints
pub use crate::value::{Primitive, Tracer, Value, Version};

// ================================================================================================
// Branch Join Engine
// ================================================================================================

/// Variable store and scopes
pub use crate::branch::{BoundedUnwindingPolicy, If, Loop, Store, UnwindingPolicy, Var};

// ================================================================================================
// Concurrency
// ================================================================================================

/// Events, zones and the memory-model encoder
pub use crate::concurrent::{encode, Event, Instr, MemoryAddr, Recorder, Zone, ZoneRelation};

// ================================================================================================
// Solver Boundary
// ================================================================================================

/// Terms, scripts and models
pub use crate::smt::{Model, ModelValue, SatResult, Script, Solver, Sort, Term};

/// Z3 backend
#[cfg(feature = "z3")]
pub use crate::smt::Z3Solver;
