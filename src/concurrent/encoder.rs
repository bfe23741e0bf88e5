//! Translation of recorded events into solver constraints.
//!
//! Two encoders share one [`Helper`] per pass:
//!
//! - [`ValueEncoder`] turns instructions into terms and states what every
//!   write stores (`v<id> = value`).
//! - [`OrderEncoder`] emits the memory-consistency axioms over event clocks:
//!   reads-from, write-serialization and from-reads.
//!
//! [`encode`] runs both over a [`ZoneRelation`] and returns the finished
//! [`Script`]. Happens-before is strict `<` on integer clocks in every axiom.

use std::{collections::BTreeSet, rc::Rc};

use log::{debug, trace};

use crate::{
    concurrent::{
        event::{Event, EventId, EventKind, MemoryType, Payload},
        instr::Instr,
        relation::ZoneRelation,
    },
    expr::Operator,
    smt::{Access, Helper, Script, Sort, Term, INDEX_WIDTH},
    Config, Error, Result,
};

/// Encodes instructions and write values.
pub struct ValueEncoder<'a> {
    helper: &'a mut Helper,
}

impl<'a> ValueEncoder<'a> {
    /// Creates an encoder emitting symbols through `helper`.
    pub fn new(helper: &'a mut Helper) -> Self {
        Self { helper }
    }

    /// Translates an instruction into a term.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyNary`] for an n-ary instruction without operands
    /// - [`Error::PartialNary`] for a unary use of a binary-only operator
    /// - [`Error::SortMismatch`] when operands have sorts the operator rejects
    pub fn encode(&mut self, instr: &Instr) -> Result<Term> {
        match instr {
            Instr::Literal(value) => Ok(self.helper.literal(*value)),
            Instr::Basic(event) => Ok(self.helper.constant(event.as_ref())),
            Instr::Unary { op, operand } => {
                let operand = self.encode(operand)?;
                apply(*op, vec![operand])
            }
            Instr::Binary { op, lhs, rhs } => {
                let operands = vec![self.encode(lhs)?, self.encode(rhs)?];
                apply(*op, operands)
            }
            Instr::Nary { op, operands, .. } => {
                if operands.is_empty() {
                    return Err(Error::EmptyNary(*op));
                }
                let operands = operands
                    .iter()
                    .map(|operand| self.encode(operand))
                    .collect::<Result<Vec<_>>>()?;
                apply(*op, operands)
            }
            Instr::Deref { memory, offset } => {
                let memory = self.encode(memory)?;
                let offset = index(self.encode(offset)?)?;
                let element = Term::select(memory, offset);
                element.sort()?;
                Ok(element)
            }
        }
    }

    /// The guard of `event`, or `true` if it is unconditional.
    ///
    /// # Errors
    ///
    /// Fails like [`ValueEncoder::encode`] on the guard instruction.
    pub fn condition(&mut self, event: &Event) -> Result<Term> {
        match event.condition() {
            Some(guard) => self.encode(guard),
            None => Ok(Term::Bool(true)),
        }
    }

    /// The equality between the value constant of `event` and what it stores.
    ///
    /// Reads store nothing and yield `true`.
    ///
    /// # Errors
    ///
    /// Fails like [`ValueEncoder::encode`] on the stored instructions.
    pub fn encode_eq(&mut self, event: &Event) -> Result<Term> {
        let value = match (event.kind(), event.payload()) {
            (EventKind::Read, _) | (_, Payload::None) => return Ok(Term::Bool(true)),
            (EventKind::DirectWrite, Payload::Value(init)) => match event.memory_type() {
                MemoryType::Scalar(_) => self.encode(init)?,
                MemoryType::Array(_) => Term::ConstArray {
                    sort: event.value_sort(),
                    value: Box::new(self.encode(init)?),
                },
            },
            (_, Payload::Value(value)) => self.encode(value)?,
            (
                _,
                Payload::Store {
                    memory,
                    offset,
                    value,
                },
            ) => {
                let memory = self.encode(memory)?;
                let offset = index(self.encode(offset)?)?;
                Term::store(memory, offset, self.encode(value)?)
            }
        };
        Ok(Term::eq(self.helper.constant(event), value))
    }

    /// Value equalities of every write in `relation`.
    ///
    /// # Errors
    ///
    /// Fails like [`ValueEncoder::encode_eq`].
    pub fn encode_writes(&mut self, relation: &ZoneRelation) -> Result<Term> {
        let equalities = relation
            .writes()
            .map(|write| self.encode_eq(write))
            .collect::<Result<Vec<_>>>()?;
        debug!("values: {} write equalities", equalities.len());
        Ok(Term::and(equalities))
    }
}

fn negate(term: Term) -> Result<Term> {
    match term.sort()? {
        Sort::Bool => Ok(Term::not(term)),
        Sort::BitVec(width) => Ok(Term::eq(term, Term::bv(0, width))),
        found => Err(Error::SortMismatch {
            expected: Sort::Bool,
            found,
        }),
    }
}

fn same_sort(operands: &[Term]) -> Result<Sort> {
    let expected = operands
        .first()
        .map(Term::sort)
        .transpose()?
        .unwrap_or(Sort::Bool);
    for operand in operands.iter().skip(1) {
        let found = operand.sort()?;
        if found != expected {
            return Err(Error::SortMismatch { expected, found });
        }
    }
    Ok(expected)
}

fn chain(operands: &[Term], link: fn(Term, Term) -> Term) -> Term {
    Term::and(
        operands
            .windows(2)
            .map(|pair| link(pair[0].clone(), pair[1].clone()))
            .collect(),
    )
}

fn apply(op: Operator, mut operands: Vec<Term>) -> Result<Term> {
    let sort = same_sort(&operands)?;
    if operands.len() == 1 {
        let operand = operands.remove(0);
        return match op {
            Operator::Not => negate(operand),
            op if op.identity().is_some() => Ok(operand),
            op => Err(Error::PartialNary(op)),
        };
    }
    match (op, &sort) {
        (Operator::Add, Sort::BitVec(_)) => {
            let mut operands = operands.into_iter();
            let first = operands.next().ok_or(Error::EmptyNary(op))?;
            Ok(operands.fold(first, Term::bvadd))
        }
        (Operator::LAnd, Sort::Bool) => Ok(Term::and(operands)),
        (Operator::LOr, Sort::Bool) => Ok(Term::or(operands)),
        (Operator::Eql, _) => Ok(chain(&operands, Term::eq)),
        (Operator::Lss, Sort::BitVec(_)) => Ok(chain(&operands, Term::bvslt)),
        (Operator::Not, _) => Err(Error::PartialNary(op)),
        (_, found) => Err(Error::SortMismatch {
            expected: if op.is_boolean() {
                Sort::Bool
            } else {
                Sort::BitVec(32)
            },
            found: found.clone(),
        }),
    }
}

/// Coerces an offset into an array index.
fn index(offset: Term) -> Result<Term> {
    match offset.sort()? {
        Sort::BitVec(INDEX_WIDTH) => Ok(offset),
        Sort::BitVec(width) if width < INDEX_WIDTH => Ok(Term::SignExtend {
            bits: INDEX_WIDTH - width,
            term: Box::new(offset),
        }),
        found => Err(Error::SortMismatch {
            expected: Sort::BitVec(INDEX_WIDTH),
            found,
        }),
    }
}

/// Encodes the reads-from, write-serialization and from-reads axioms.
pub struct OrderEncoder<'a> {
    helper: &'a mut Helper,
}

impl<'a> OrderEncoder<'a> {
    /// Creates an encoder emitting symbols through `helper`.
    pub fn new(helper: &'a mut Helper) -> Self {
        Self { helper }
    }

    fn condition(&mut self, event: &Event) -> Result<Option<Term>> {
        event
            .condition()
            .map(|guard| ValueEncoder::new(self.helper).encode(guard))
            .transpose()
    }

    /// Reads-from: every enabled read observes exactly one overlapping write.
    ///
    /// For each read `r` and candidate write `w` the clause is
    /// `rf(w, r) => (clk_w < clk_r) && guard_w && guard_r && v_w == v_r`;
    /// in addition `guard_r => rf(w_1, r) || ... || rf(w_n, r)`. Writes whose
    /// zone does not overlap the read's are never paired with it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SortMismatch`] if a candidate write stores a value of
    /// another sort than the read observes.
    pub fn encode_rf(&mut self, relation: &ZoneRelation) -> Result<Term> {
        let mut clauses = Vec::new();
        for read in relation.reads() {
            let zone = read.zone();
            if zone.is_bottom() {
                continue;
            }
            let read_sort = read.value_sort();
            let read_clock = self.helper.clock(read.as_ref());
            let read_value = self.helper.constant(read.as_ref());
            let read_guard = self.condition(read)?;

            let writes = relation.find(&zone, Event::is_write);
            let mut schedules = Vec::with_capacity(writes.len());
            for write in &writes {
                let found = write.value_sort();
                if found != read_sort {
                    return Err(Error::SortMismatch {
                        expected: read_sort,
                        found,
                    });
                }
                let rf = self.helper.rf(write.as_ref(), read.as_ref());
                let write_clock = self.helper.clock(write.as_ref());
                let mut effects = vec![self.helper.happens_before(&write_clock, &read_clock)];
                effects.extend(self.condition(write)?);
                effects.extend(read_guard.clone());
                effects.push(Term::eq(
                    self.helper.constant(write.as_ref()),
                    read_value.clone(),
                ));
                clauses.push(Term::implies(rf.clone(), Term::and(effects)));
                schedules.push(rf);
            }
            trace!("rf: {read} has {} candidate writes", schedules.len());
            clauses.push(Term::implies(
                read_guard.unwrap_or(Term::Bool(true)),
                Term::or(schedules),
            ));
        }
        debug!("rf: {} clauses", clauses.len());
        Ok(Term::and(clauses))
    }

    /// Write-serialization: writes touching one zone atom get distinct clocks.
    pub fn encode_ws(&mut self, relation: &ZoneRelation) -> Term {
        let mut clauses = Vec::new();
        for atom in relation.zone_atoms() {
            let writes = relation.find(&atom, Event::is_write);
            if writes.len() < 2 {
                continue;
            }
            let clocks = writes
                .iter()
                .map(|write| self.helper.clock(write.as_ref()))
                .collect();
            trace!("ws: {} writes on {atom}", writes.len());
            clauses.push(Term::Distinct(clocks));
        }
        debug!("ws: {} clauses", clauses.len());
        Term::and(clauses)
    }

    /// From-reads: a read of `x` happens before every enabled later write `y`.
    ///
    /// For each zone atom, each ordered pair of distinct writes `(x, y)` and
    /// each read `r` on it:
    /// `rf(x, r) && clk_x < clk_y && guard_y => clk_r < clk_y`.
    /// Triples reached through several atoms are emitted once.
    ///
    /// # Errors
    ///
    /// Fails like [`ValueEncoder::encode`] on the guard of `y`.
    pub fn encode_fr(&mut self, relation: &ZoneRelation) -> Result<Term> {
        let mut seen: BTreeSet<(EventId, EventId, EventId)> = BTreeSet::new();
        let mut clauses = Vec::new();
        for atom in relation.zone_atoms() {
            let (reads, writes) = relation.partition(&atom);
            for x in &writes {
                for y in &writes {
                    if Rc::ptr_eq(x, y) {
                        continue;
                    }
                    for read in &reads {
                        if !seen.insert((x.id(), y.id(), read.id())) {
                            continue;
                        }
                        clauses.push(self.from_read(x, y, read)?);
                    }
                }
            }
        }
        debug!("fr: {} clauses", clauses.len());
        Ok(Term::and(clauses))
    }

    fn from_read(&mut self, x: &Event, y: &Event, read: &Event) -> Result<Term> {
        let x_clock = self.helper.clock(x);
        let y_clock = self.helper.clock(y);
        let read_clock = self.helper.clock(read);
        let mut premise = vec![
            self.helper.rf(x, read),
            self.helper.happens_before(&x_clock, &y_clock),
        ];
        premise.extend(self.condition(y)?);
        trace!("fr: {read} from {x} before {y}");
        Ok(Term::implies(
            Term::and(premise),
            self.helper.happens_before(&read_clock, &y_clock),
        ))
    }
}

/// Encodes the shared events of `relation` into a self-contained script.
///
/// The script asserts the clock side conditions, then the conjunction of the
/// write value equalities with the rf, ws and fr axioms.
///
/// # Errors
///
/// Fails like [`ValueEncoder::encode_writes`] and [`OrderEncoder::encode_rf`].
pub fn encode(relation: &ZoneRelation, config: &Config) -> Result<Script> {
    let mut helper = Helper::new(config);
    let values = ValueEncoder::new(&mut helper).encode_writes(relation)?;

    let mut order = OrderEncoder::new(&mut helper);
    let rf = order.encode_rf(relation)?;
    let ws = order.encode_ws(relation);
    let fr = order.encode_fr(relation)?;

    debug!(
        "encoded {} events ({} reads)",
        relation.events().len(),
        relation.reads().count()
    );
    Ok(helper.finish(Term::and(vec![values, rf, ws, fr])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        concurrent::{memory::MemoryAddr, recorder::Recorder},
        expr::{Scalar, Type},
        smt::{FuncInterp, Model, ModelValue, RF_FUNC},
    };

    fn int(v: i32) -> Rc<Instr> {
        Instr::literal(Scalar::Int(v))
    }

    #[test]
    fn test_write_equalities() -> Result<()> {
        let mut recorder = Recorder::new();
        let scalar = recorder.write(MemoryAddr::new(1), int(5));
        let init = recorder.write_array(MemoryAddr::new(4), Type::Char, Scalar::Int(0));
        let array = recorder.read_array(Type::Char, MemoryAddr::new(4));
        let store = recorder.write_indirect(&array, int(2), Instr::literal(Scalar::Char(7)))?;
        let narrow = recorder.write_indirect(
            &array,
            Instr::literal(Scalar::Char(1)),
            Instr::literal(Scalar::Char(9)),
        )?;

        let mut helper = Helper::new(&Config::default());
        let mut values = ValueEncoder::new(&mut helper);
        assert_eq!(values.encode_eq(&scalar)?.to_string(), "(= v1 (_ bv5 32))");
        assert_eq!(
            values.encode_eq(&init)?.to_string(),
            "(= v2 ((as const (Array (_ BitVec 32) (_ BitVec 8))) (_ bv0 8)))"
        );
        assert_eq!(values.encode_eq(&array)?, Term::Bool(true));
        assert_eq!(
            values.encode_eq(&store)?.to_string(),
            "(= v4 (store v3 (_ bv2 32) (_ bv7 8)))"
        );
        assert_eq!(
            values.encode_eq(&narrow)?.to_string(),
            "(= v5 (store v3 ((_ sign_extend 24) (_ bv1 8)) (_ bv9 8)))"
        );
        Ok(())
    }

    #[test]
    fn test_instructions() -> Result<()> {
        let mut recorder = Recorder::new();
        let x = recorder.read(Type::Int, MemoryAddr::new(1));
        let flag = recorder.read(Type::Bool, MemoryAddr::new(2));
        let mut helper = Helper::new(&Config::default());
        let mut values = ValueEncoder::new(&mut helper);

        let not_x = Instr::unary(Operator::Not, Instr::basic(&x));
        assert_eq!(values.encode(&not_x)?.to_string(), "(= v1 (_ bv0 32))");

        let sum = Instr::nary(Operator::Add, Type::Int, vec![Instr::basic(&x), int(1), int(2)]);
        assert_eq!(
            values.encode(&sum)?.to_string(),
            "(bvadd (bvadd v1 (_ bv1 32)) (_ bv2 32))"
        );

        let less = Instr::binary(Operator::Lss, Instr::basic(&x), int(3));
        assert_eq!(values.encode(&less)?.to_string(), "(bvslt v1 (_ bv3 32))");

        let element = Instr::deref(Instr::basic(&x), int(0));
        assert!(values.encode(&element).is_err());

        let empty = Instr::nary(Operator::Add, Type::Int, vec![]);
        assert!(matches!(
            values.encode(&empty),
            Err(Error::EmptyNary(Operator::Add))
        ));

        let mixed = Instr::binary(Operator::Add, int(1), Instr::literal(Scalar::Char(1)));
        assert!(matches!(
            values.encode(&mixed),
            Err(Error::SortMismatch { .. })
        ));

        let guard = Instr::binary(Operator::LAnd, Instr::basic(&flag), less);
        assert_eq!(
            values.encode(&guard)?.to_string(),
            "(and v2 (bvslt v1 (_ bv3 32)))"
        );
        Ok(())
    }

    #[test]
    fn test_single_write_single_read() -> Result<()> {
        let mut recorder = Recorder::new();
        recorder.write(MemoryAddr::new(1), int(5));
        recorder.read(Type::Int, MemoryAddr::new(1));
        let script = encode(&recorder.relation(), &Config::default())?;

        let text = script.to_string();
        assert!(text.contains("(=> (= 1 (rf 2)) (and (< clk1 clk2) (= v1 v2)))"));
        assert!(text.contains("(=> true (= 1 (rf 2)))"));

        let mut rf = FuncInterp::default();
        rf.insert(vec![ModelValue::Int(2)], ModelValue::Int(1));
        let mut model = Model::new();
        model
            .set("clk1", ModelValue::Int(1))
            .set("clk2", ModelValue::Int(2))
            .set("v1", ModelValue::bv(5, 32))
            .set("v2", ModelValue::bv(5, 32))
            .set_func(RF_FUNC, rf);
        assert!(script.holds(&model)?);

        model.set("v2", ModelValue::bv(6, 32));
        assert!(!script.holds(&model)?);
        Ok(())
    }

    #[test]
    fn test_guarded_read_may_read_nothing() -> Result<()> {
        let mut recorder = Recorder::new();
        let flag = recorder.read(Type::Bool, MemoryAddr::with_sharing(9, false));
        recorder.push_guard(Instr::basic(&flag));
        recorder.read(Type::Int, MemoryAddr::new(1));
        recorder.pop_guard();
        let script = encode(&recorder.relation(), &Config::default())?;

        assert!(script.to_string().contains("(=> v1 false)"));
        let mut model = Model::new();
        model
            .set("v1", ModelValue::Bool(false))
            .set("clk2", ModelValue::Int(1))
            .set("v2", ModelValue::bv(0, 32));
        assert!(script.holds(&model)?);

        model.set("v1", ModelValue::Bool(true));
        assert!(!script.holds(&model)?);
        Ok(())
    }

    #[test]
    fn test_mismatched_sorts_are_rejected() {
        let mut recorder = Recorder::new();
        recorder.write(MemoryAddr::new(1), Instr::literal(Scalar::Char(1)));
        recorder.read(Type::Int, MemoryAddr::new(1));
        assert!(matches!(
            encode(&recorder.relation(), &Config::default()),
            Err(Error::SortMismatch { .. })
        ));
    }
}
