//! Event-based encoding of concurrent memory accesses.
//!
//! The instrumentation records every shared memory access as an [`Event`]
//! through a [`Recorder`]. At the end of abstract execution the events are
//! grouped by zone in a [`ZoneRelation`] and handed to [`encode`], which
//! produces one solver [`crate::smt::Script`]. A model of the script picks
//! a clock per event and, per read, the write it observes.
//!
//! # Axioms
//!
//! - **rf** (reads-from): an enabled read observes exactly one write to an
//!   overlapping zone; that write happens before the read, both are enabled
//!   and they agree on the value.
//! - **ws** (write-serialization): writes touching one zone atom have
//!   pairwise distinct clocks.
//! - **fr** (from-reads): a read of `x` happens before every enabled write
//!   `y` that follows `x` on the same atom.
//!
//! # Example
//!
//! ```rust
//! use concolic::concurrent::{encode, Instr, MemoryAddr, Recorder};
//! use concolic::expr::{Scalar, Type};
//! use concolic::Config;
//!
//! let mut recorder = Recorder::new();
//! recorder.write(MemoryAddr::new(0x10), Instr::literal(Scalar::Int(1)));
//! recorder.read(Type::Int, MemoryAddr::new(0x10));
//!
//! let script = encode(&recorder.relation(), &Config::default())?;
//! assert!(script.to_string().contains("(rf 2)"));
//! # Ok::<(), concolic::Error>(())
//! ```

mod encoder;
mod event;
mod instr;
mod memory;
mod recorder;
mod relation;
mod zone;

pub use encoder::{encode, OrderEncoder, ValueEncoder};
pub use event::{Event, EventId, EventKind, MemoryType, Payload};
pub use instr::Instr;
pub use memory::{MemoryAddr, Pointer};
pub use recorder::Recorder;
pub use relation::ZoneRelation;
pub use zone::Zone;
