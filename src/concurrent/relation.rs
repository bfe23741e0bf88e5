//! Grouping of shared events by memory zone.
//!
//! A [`ZoneRelation`] holds the shared events of one execution ordered by
//! identifier. It answers which events touch a given zone and splits the
//! touched locations into zone atoms: maximal sets of pointers that exactly
//! the same events access. Atoms are pairwise disjoint, so per-atom encodings
//! never have to reason about partial overlap.

use std::{
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use log::debug;

use crate::concurrent::{
    event::{Event, EventId},
    memory::Pointer,
    zone::Zone,
};

/// Shared events grouped by zone.
#[derive(Debug, Clone, Default)]
pub struct ZoneRelation {
    events: Vec<Rc<Event>>,
}

impl ZoneRelation {
    /// Builds the relation from `events`, dropping non-shared accesses.
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = Rc<Event>>) -> Self {
        let (mut shared, local): (Vec<_>, Vec<_>) =
            events.into_iter().partition(|event| event.addr().is_shared());
        if !local.is_empty() {
            debug!("relation: {} thread-local events skipped", local.len());
        }
        shared.sort_by_key(|event| event.id());
        shared.dedup_by_key(|event| event.id());
        Self { events: shared }
    }

    /// All shared events, ordered by identifier.
    #[must_use]
    pub fn events(&self) -> &[Rc<Event>] {
        &self.events
    }

    /// Shared read events.
    pub fn reads(&self) -> impl Iterator<Item = &Rc<Event>> {
        self.events.iter().filter(|event| event.is_read())
    }

    /// Shared write events.
    pub fn writes(&self) -> impl Iterator<Item = &Rc<Event>> {
        self.events.iter().filter(|event| event.is_write())
    }

    /// Events touching `zone` that satisfy `predicate`.
    #[must_use]
    pub fn find<P>(&self, zone: &Zone, predicate: P) -> Vec<Rc<Event>>
    where
        P: Fn(&Event) -> bool,
    {
        self.events
            .iter()
            .filter(|event| event.zone().overlaps(zone) && predicate(event.as_ref()))
            .cloned()
            .collect()
    }

    /// Reads and writes touching `zone`, in one pass.
    #[must_use]
    pub fn partition(&self, zone: &Zone) -> (Vec<Rc<Event>>, Vec<Rc<Event>>) {
        self.events
            .iter()
            .filter(|event| event.zone().overlaps(zone))
            .cloned()
            .partition(|event| event.is_read())
    }

    /// The maximal disjoint zones touched by the events.
    ///
    /// Two pointers belong to the same atom iff exactly the same events touch
    /// them. Atoms are returned in ascending order.
    #[must_use]
    pub fn zone_atoms(&self) -> Vec<Zone> {
        let mut touching: BTreeMap<Pointer, BTreeSet<EventId>> = BTreeMap::new();
        for event in &self.events {
            for ptr in event.addr().ptrs() {
                touching.entry(*ptr).or_default().insert(event.id());
            }
        }

        let mut atoms: BTreeMap<BTreeSet<EventId>, BTreeSet<Pointer>> = BTreeMap::new();
        for (ptr, events) in touching {
            atoms.entry(events).or_default().insert(ptr);
        }

        let mut atoms: Vec<Zone> = atoms.into_values().map(Zone::new).collect();
        atoms.sort();
        debug!("relation: {} events over {} atoms", self.events.len(), atoms.len());
        atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        concurrent::{instr::Instr, memory::MemoryAddr, recorder::Recorder},
        expr::{Scalar, Type},
    };

    fn one() -> Rc<Instr> {
        Instr::literal(Scalar::Int(1))
    }

    #[test]
    fn test_local_events_are_dropped() {
        let mut recorder = Recorder::new();
        recorder.write(MemoryAddr::with_sharing(1, false), one());
        recorder.write(MemoryAddr::new(2), one());
        let relation = recorder.relation();
        assert_eq!(relation.events().len(), 1);
        assert_eq!(relation.events()[0].id(), 2);
    }

    #[test]
    fn test_find_and_partition() {
        let mut recorder = Recorder::new();
        let w1 = recorder.write(MemoryAddr::new(1), one());
        let w2 = recorder.write(MemoryAddr::new(2), one());
        let r = recorder.read(Type::Int, MemoryAddr::new(1).join(&MemoryAddr::new(3)));
        let relation = recorder.relation();

        let writes = relation.find(&Zone::new([1]), Event::is_write);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].id(), w1.id());

        let (reads, writes) = relation.partition(&r.zone());
        assert_eq!(reads.len(), 1);
        assert_eq!(writes.len(), 1);
        assert!(relation.find(&Zone::new([3]), Event::is_write).is_empty());
        assert_eq!(relation.find(&Zone::new([2]), |_| true)[0].id(), w2.id());
        assert_eq!(relation.reads().count(), 1);
        assert_eq!(relation.writes().count(), 2);
    }

    #[test]
    fn test_zone_atoms_are_disjoint() {
        let mut recorder = Recorder::new();
        recorder.write(MemoryAddr::new(1).join(&MemoryAddr::new(2)), one());
        recorder.write(MemoryAddr::new(2).join(&MemoryAddr::new(3)), one());
        recorder.read(Type::Int, MemoryAddr::new(1).join(&MemoryAddr::new(2)));
        let atoms = recorder.relation().zone_atoms();

        assert_eq!(atoms, vec![Zone::new([1]), Zone::new([2]), Zone::new([3])]);
        for (i, a) in atoms.iter().enumerate() {
            for b in &atoms[i + 1..] {
                assert!(a.meet(b).is_bottom());
            }
        }
    }

    #[test]
    fn test_identically_touched_pointers_share_an_atom() {
        let mut recorder = Recorder::new();
        let both = MemoryAddr::new(1).join(&MemoryAddr::new(2));
        recorder.write(both.clone(), one());
        recorder.read(Type::Int, both);
        assert_eq!(recorder.relation().zone_atoms(), vec![Zone::new([1, 2])]);
    }
}
