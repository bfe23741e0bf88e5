//! Memory access events.
//!
//! An [`Event`] is one read or write of a memory location as observed by the
//! instrumentation. Events are immutable once recorded; they only get grouped
//! by the [`crate::concurrent::ZoneRelation`].

use std::{fmt, rc::Rc};

use crate::{
    concurrent::{instr::Instr, memory::MemoryAddr, zone::Zone},
    expr::Type,
    smt::{array_sort_of, sort_of, Access, Sort},
};

/// Program-order identifier of an event.
pub type EventId = usize;

/// Kind of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Load of a scalar or of a whole array
    Read,
    /// Store of a value computed by an instruction
    DirectWrite,
    /// Store of one element through a pointer into an array
    IndirectWrite,
}

/// Shape of the accessed memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryType {
    /// A single scalar of the given type
    Scalar(Type),
    /// An array of elements of the given type
    Array(Type),
}

impl MemoryType {
    /// Solver sort of the accessed memory.
    #[must_use]
    pub fn sort(self) -> Sort {
        match self {
            MemoryType::Scalar(ty) => sort_of(ty),
            MemoryType::Array(element) => array_sort_of(element),
        }
    }

    /// Type of a scalar, or of an array element.
    #[must_use]
    pub fn element(self) -> Type {
        match self {
            MemoryType::Scalar(ty) | MemoryType::Array(ty) => ty,
        }
    }
}

/// What a write stores.
#[derive(Debug)]
pub enum Payload {
    /// Reads store nothing
    None,
    /// The value of a direct write; for arrays, the value of every element
    Value(Rc<Instr>),
    /// An indirect write of `value` at `offset` into `memory`
    Store {
        /// The array being written, as read just before the write
        memory: Rc<Instr>,
        /// Element index
        offset: Rc<Instr>,
        /// Stored element
        value: Rc<Instr>,
    },
}

/// A recorded memory access.
#[derive(Debug)]
pub struct Event {
    pub(crate) id: EventId,
    pub(crate) kind: EventKind,
    pub(crate) memory_type: MemoryType,
    pub(crate) addr: MemoryAddr,
    pub(crate) condition: Option<Rc<Instr>>,
    pub(crate) payload: Payload,
}

impl Event {
    /// Program-order identifier.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Kind of the access.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Checks if the event is a read.
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.kind == EventKind::Read
    }

    /// Checks if the event is a direct or indirect write.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !self.is_read()
    }

    /// Shape of the accessed memory.
    #[must_use]
    pub fn memory_type(&self) -> MemoryType {
        self.memory_type
    }

    /// The accessed address.
    #[must_use]
    pub fn addr(&self) -> &MemoryAddr {
        &self.addr
    }

    /// The zone of the accessed address.
    #[must_use]
    pub fn zone(&self) -> Zone {
        self.addr.zone()
    }

    /// Guard under which the event happens; `None` means always.
    #[must_use]
    pub fn condition(&self) -> Option<&Rc<Instr>> {
        self.condition.as_ref()
    }

    /// What the event stores.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl Access for Event {
    fn event_id(&self) -> usize {
        self.id
    }

    fn value_sort(&self) -> Sort {
        self.memory_type.sort()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            EventKind::Read => "r",
            EventKind::DirectWrite => "w",
            EventKind::IndirectWrite => "iw",
        };
        write!(f, "{tag}{}@{}", self.id, self.zone())
    }
}
