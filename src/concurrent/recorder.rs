//! Event factory.
//!
//! The [`Recorder`] hands out program-ordered identifiers and attaches the
//! guard of the enclosing conditionals to every event it creates. Guards are
//! pushed and popped by the instrumentation as it enters and leaves branches.

use std::rc::Rc;

use log::trace;

use crate::{
    concurrent::{
        event::{Event, EventId, EventKind, MemoryType, Payload},
        instr::Instr,
        memory::MemoryAddr,
        relation::ZoneRelation,
    },
    expr::{Operator, Scalar, Type},
    smt::Sort,
    Error, Result,
};

/// Creates events in program order.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Vec<Rc<Event>>,
    guards: Vec<Rc<Instr>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a conditional guarded by the boolean instruction `guard`.
    pub fn push_guard(&mut self, guard: Rc<Instr>) {
        self.guards.push(guard);
    }

    /// Leaves the innermost conditional.
    pub fn pop_guard(&mut self) -> Option<Rc<Instr>> {
        self.guards.pop()
    }

    fn condition(&self) -> Option<Rc<Instr>> {
        match self.guards.as_slice() {
            [] => None,
            [guard] => Some(guard.clone()),
            guards => Some(Instr::nary(Operator::LAnd, Type::Bool, guards.to_vec())),
        }
    }

    fn record(
        &mut self,
        kind: EventKind,
        memory_type: MemoryType,
        addr: MemoryAddr,
        payload: Payload,
    ) -> Rc<Event> {
        let event = Rc::new(Event {
            id: self.events.len() + 1,
            kind,
            memory_type,
            addr,
            condition: self.condition(),
            payload,
        });
        trace!("recorded {event}");
        self.events.push(event.clone());
        event
    }

    /// Records a read of a scalar of type `ty`.
    pub fn read(&mut self, ty: Type, addr: MemoryAddr) -> Rc<Event> {
        self.record(EventKind::Read, MemoryType::Scalar(ty), addr, Payload::None)
    }

    /// Records a read of a whole array of `element`s.
    pub fn read_array(&mut self, element: Type, addr: MemoryAddr) -> Rc<Event> {
        self.record(
            EventKind::Read,
            MemoryType::Array(element),
            addr,
            Payload::None,
        )
    }

    /// Records a direct write of `value` to a scalar.
    pub fn write(&mut self, addr: MemoryAddr, value: Rc<Instr>) -> Rc<Event> {
        let ty = value.ty();
        self.record(
            EventKind::DirectWrite,
            MemoryType::Scalar(ty),
            addr,
            Payload::Value(value),
        )
    }

    /// Records the initialisation of a whole array with `init`.
    pub fn write_array(&mut self, addr: MemoryAddr, element: Type, init: Scalar) -> Rc<Event> {
        self.record(
            EventKind::DirectWrite,
            MemoryType::Array(element),
            addr,
            Payload::Value(Instr::literal(init.convert(element))),
        )
    }

    /// Records `memory[offset] = value` through a pointer.
    ///
    /// # Arguments
    ///
    /// * `memory` - A read of the array, taken just before the write.
    /// * `offset` - Element index.
    /// * `value` - Stored element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SortMismatch`] if `memory` is not an array read.
    pub fn write_indirect(
        &mut self,
        memory: &Rc<Event>,
        offset: Rc<Instr>,
        value: Rc<Instr>,
    ) -> Result<Rc<Event>> {
        let memory_type = memory.memory_type();
        if !memory.is_read() || !matches!(memory_type, MemoryType::Array(_)) {
            return Err(Error::SortMismatch {
                expected: Sort::array(Sort::BitVec(32), Sort::BitVec(32)),
                found: memory_type.sort(),
            });
        }
        Ok(self.record(
            EventKind::IndirectWrite,
            memory_type,
            memory.addr().clone(),
            Payload::Store {
                memory: Instr::basic(memory),
                offset,
                value,
            },
        ))
    }

    /// Every event recorded so far, in program order.
    #[must_use]
    pub fn events(&self) -> &[Rc<Event>] {
        &self.events
    }

    /// Looks up an event by identifier.
    #[must_use]
    pub fn event(&self, id: EventId) -> Option<&Rc<Event>> {
        id.checked_sub(1).and_then(|index| self.events.get(index))
    }

    /// Groups the shared events recorded so far by zone.
    #[must_use]
    pub fn relation(&self) -> ZoneRelation {
        ZoneRelation::new(self.events.iter().cloned())
    }
}
