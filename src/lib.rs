// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # concolic
//!
//! A concolic execution core for a small imperative language with `bool`,
//! `char`, `short` and `int` scalars, arrays, conditionals, bounded loops and
//! shared-memory concurrency.
//!
//! Every tracked value carries its concrete data together with an optional
//! symbolic history. Conditionals and loops merge divergent states at their
//! join points into if-then-else expressions, and the memory accesses of a
//! concurrent execution are encoded into one SMT formula whose models are the
//! consistent interleavings.
//!
//! ## Features
//!
//! - **Expression DAG** - structurally shared, immutable once shared, printed
//!   in a canonical fully parenthesized infix form
//! - **Concolic values** - host scalars with promotion, casts and path
//!   constraints
//! - **Branch join engine** - `If`/`Loop` scopes with version counters
//! - **Concurrency encoder** - reads-from, write-serialization and from-reads
//!   over per-event clocks, partitioned by memory zone
//! - **Solver boundary** - own SMT-LIB 2 term language, model evaluation and an
//!   optional `z3` backend (feature `z3`)
//!
//! ## Quick Start
//!
//! ```rust
//! use concolic::prelude::*;
//!
//! let mut store = Store::new();
//! let i = store.declare(Value::<i32>::any("I"));
//!
//! let mut branch = If::new(store.get(i)?.lt(Value::new(5)));
//! branch.track(i)?;
//! if branch.begin_then(&store)? {
//!     store.set(i, store.get(i)? + Value::new(1))?;
//! }
//! branch.end(&mut store)?;
//!
//! assert_eq!(store.get(i)?.to_string(), "(([I]<5)?([I]+1):[I])");
//! # Ok::<(), concolic::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`expr`] - expression nodes, operators, visitors and the sequential encoder
//! - [`value`] - concolic values and the path-constraint [`Tracer`]
//! - [`branch`] - variable store and the `If`/`Loop` join engine
//! - [`concurrent`] - events, zones and the memory-model encoder
//! - [`smt`] - terms, scripts, models and solvers
//! - [`Error`] and [`Result`] - error handling
//! - [`Config`] - engine configuration

mod error;
mod config;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use concolic::prelude::*;
///
/// let x = Value::<i32>::any("X") + Value::new(1);
/// assert_eq!(x.to_string(), "([X]+1)");
/// ```
pub mod prelude;

/// Expression DAG nodes, operators and traversals.
pub mod expr;

/// Concolic values and path constraints.
pub mod value;

/// Join engine for conditionals and loops.
pub mod branch;

/// Event-based concurrency encoding.
pub mod concurrent;

/// Solver boundary: terms, scripts, models and backends.
pub mod smt;

/// `concolic` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `concolic` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// Engine configuration shared by loops, the tracer and the encoders.
pub use config::Config;

/// Concolic value and path-constraint tracer.
pub use value::{Tracer, Value};
