//! Encoding context shared by the concurrency encoders.
//!
//! [`Helper`] owns the naming of every solver-level symbol: one value constant
//! and one clock per event, the uninterpreted `rf` function and fresh join
//! clocks. It also collects the side assertions that come with those symbols
//! (every clock is strictly greater than the configured lower bound) so that a
//! finished [`Script`] is self-contained.
//!
//! Events reach the helper only through the narrow [`Access`] capability.

use std::collections::BTreeSet;

use log::trace;

use crate::{
    expr::{Operator, Scalar, Type},
    smt::{
        script::{Declaration, Script},
        term::{Sort, Term},
    },
    Config, Error, Result,
};

/// Width of array indices.
pub const INDEX_WIDTH: u32 = 32;

/// Symbol of the uninterpreted read-from function.
pub const RF_FUNC: &str = "rf";

/// What the helper needs to know about an event.
pub trait Access {
    /// Program-order identifier of the event.
    fn event_id(&self) -> usize;

    /// Sort of the value the event reads or writes.
    fn value_sort(&self) -> Sort;
}

/// Sort used for values of a primitive type.
#[must_use]
pub fn sort_of(ty: Type) -> Sort {
    match ty {
        Type::Bool => Sort::Bool,
        Type::Char | Type::Short | Type::Int => Sort::BitVec(ty.width()),
    }
}

/// Sort used for arrays with elements of a primitive type.
#[must_use]
pub fn array_sort_of(element: Type) -> Sort {
    Sort::array(Sort::BitVec(INDEX_WIDTH), sort_of(element))
}

/// Symbol factory and side-assertion collector for one encoding pass.
#[derive(Debug)]
pub struct Helper {
    script: Script,
    clock_lower_bound: i64,
    clocks: BTreeSet<usize>,
    join_counter: usize,
}

impl Helper {
    /// Creates a helper for a fresh script.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            script: Script::from_config(config),
            clock_lower_bound: config.clock_lower_bound,
            clocks: BTreeSet::new(),
            join_counter: 0,
        }
    }

    /// The value constant of an event.
    pub fn constant(&mut self, access: &impl Access) -> Term {
        let name = format!("v{}", access.event_id());
        let sort = access.value_sort();
        self.script.declare(Declaration::Const {
            name: name.clone(),
            sort: sort.clone(),
        });
        Term::constant(name, sort)
    }

    /// The clock of an event, asserted strictly positive on first use.
    pub fn clock(&mut self, access: &impl Access) -> Term {
        let id = access.event_id();
        let clock = Term::constant(format!("clk{id}"), Sort::Int);
        if self.clocks.insert(id) {
            self.declare_clock(&clock);
        }
        clock
    }

    fn declare_clock(&mut self, clock: &Term) {
        if let Term::Const { name, .. } = clock {
            self.script.declare(Declaration::Const {
                name: name.clone(),
                sort: Sort::Int,
            });
        }
        self.script
            .assert(Term::gt(clock.clone(), Term::Int(self.clock_lower_bound)));
    }

    /// `x` happens before `y`.
    #[must_use]
    pub fn happens_before(&self, x: &Term, y: &Term) -> Term {
        Term::lt(x.clone(), y.clone())
    }

    /// The read `read` takes its value from the write `write`.
    pub fn rf(&mut self, write: &impl Access, read: &impl Access) -> Term {
        self.script.declare(Declaration::Fun {
            name: RF_FUNC.to_string(),
            args: vec![Sort::Int],
            ret: Sort::Int,
        });
        trace!("rf: w{} -> r{}", write.event_id(), read.event_id());
        Term::eq(
            Term::Int(write.event_id() as i64),
            Term::apply(RF_FUNC, vec![Term::Int(read.event_id() as i64)], Sort::Int),
        )
    }

    /// Solver literal for a scalar.
    #[must_use]
    pub fn literal(&self, value: Scalar) -> Term {
        match value {
            Scalar::Bool(b) => Term::Bool(b),
            other => Term::bv(other.as_i64(), other.ty().width()),
        }
    }

    /// Identity element of `op` at operand type `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoIdentity`] for operators without identity element.
    pub fn identity(&self, op: Operator, ty: Type) -> Result<Term> {
        let identity = op.identity().ok_or(Error::NoIdentity(op))?;
        Ok(self.literal(identity.convert(op.result_type(ty))))
    }

    /// A fresh clock that happens after both `x` and `y`.
    ///
    /// Join clocks are named `<n>_Join` with `n` counting up per helper, so
    /// repeated joins never collide.
    pub fn join_clocks(&mut self, x: &Term, y: &Term) -> Term {
        let join = Term::constant(format!("{}_Join", self.join_counter), Sort::Int);
        self.join_counter += 1;
        self.declare_clock(&join);
        self.script.assert(self.happens_before(x, &join));
        self.script.assert(self.happens_before(y, &join));
        join
    }

    /// Finishes the pass by asserting `formula` after all side assertions.
    #[must_use]
    pub fn finish(mut self, formula: Term) -> Script {
        self.script.assert(formula);
        self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smt::model::{FuncInterp, Model, ModelValue};

    struct Probe(usize, Sort);

    impl Access for Probe {
        fn event_id(&self) -> usize {
            self.0
        }

        fn value_sort(&self) -> Sort {
            self.1.clone()
        }
    }

    #[test]
    fn test_clock_side_assertion_once() {
        let mut helper = Helper::new(&Config::default());
        let probe = Probe(3, Sort::BitVec(32));
        let first = helper.clock(&probe);
        let second = helper.clock(&probe);
        assert_eq!(first, second);

        let script = helper.finish(Term::Bool(true));
        assert_eq!(script.assertions()[0].to_string(), "(> clk3 0)");
        assert_eq!(script.assertions().len(), 2);
    }

    #[test]
    fn test_join_clocks_are_fresh() -> Result<()> {
        let mut helper = Helper::new(&Config::default());
        let x = helper.clock(&Probe(1, Sort::Bool));
        let y = helper.clock(&Probe(2, Sort::Bool));
        let j0 = helper.join_clocks(&x, &y);
        let j1 = helper.join_clocks(&x, &y);
        assert_ne!(j0, j1);
        assert_eq!(j0.to_string(), "|0_Join|");

        let script = helper.finish(Term::Bool(true));
        let mut model = Model::new();
        model
            .set("clk1", ModelValue::Int(1))
            .set("clk2", ModelValue::Int(2))
            .set("0_Join", ModelValue::Int(3))
            .set("1_Join", ModelValue::Int(3));
        assert!(script.holds(&model)?);

        model.set("1_Join", ModelValue::Int(2));
        assert!(!script.holds(&model)?);
        Ok(())
    }

    #[test]
    fn test_rf_and_literals() -> Result<()> {
        let mut helper = Helper::new(&Config::default());
        let w = Probe(1, Sort::BitVec(8));
        let r = Probe(2, Sort::BitVec(8));
        let rf = helper.rf(&w, &r);
        assert_eq!(rf.to_string(), "(= 1 (rf 2))");
        assert_eq!(helper.literal(Scalar::Char(-1)).to_string(), "(_ bv255 8)");
        assert_eq!(helper.literal(Scalar::Bool(true)), Term::Bool(true));
        assert_eq!(helper.identity(Operator::Add, Type::Char)?, Term::bv(0, 8));
        assert_eq!(helper.identity(Operator::LOr, Type::Bool)?, Term::Bool(false));
        assert!(matches!(
            helper.identity(Operator::Lss, Type::Int),
            Err(Error::NoIdentity(Operator::Lss))
        ));

        let mut interp = FuncInterp::default();
        interp.insert(vec![ModelValue::Int(2)], ModelValue::Int(1));
        let mut model = Model::new();
        model.set_func(RF_FUNC, interp);
        assert!(model.satisfies(&rf)?);
        Ok(())
    }

    #[test]
    fn test_sorts() {
        assert_eq!(sort_of(Type::Bool), Sort::Bool);
        assert_eq!(sort_of(Type::Short), Sort::BitVec(16));
        assert_eq!(
            array_sort_of(Type::Char).to_string(),
            "(Array (_ BitVec 32) (_ BitVec 8))"
        );
    }
}
