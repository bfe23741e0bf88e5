//! Z3 backend for the [`Solver`] boundary.
//!
//! Declarations and assertions are buffered as a [`Script`] and handed to Z3
//! as SMT-LIB 2 text on every check. Constant values of boolean, integer and
//! bit-vector sort are read back into a [`Model`]; array constants and
//! function interpretations are not extracted.

use log::debug;

use crate::{
    smt::{
        model::{Model, ModelValue},
        script::{Declaration, Script},
        solver::{SatResult, Solver},
        term::{Sort, Term},
    },
    Error, Result,
};

/// [`Solver`] implementation backed by Z3.
#[derive(Debug)]
pub struct Z3Solver {
    script: Script,
    model: Option<Model>,
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Z3Solver {
    /// Creates a new solver session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Script::new("ALL"),
            model: None,
        }
    }

    fn extract(&self, model: &z3::Model) -> Model {
        let mut out = Model::new();
        for declaration in self.script.declarations() {
            let Declaration::Const { name, sort } = declaration else {
                continue;
            };
            let value = match sort {
                Sort::Bool => model
                    .eval(&z3::ast::Bool::new_const(name.as_str()), true)
                    .and_then(|v| v.as_bool())
                    .map(ModelValue::Bool),
                Sort::Int => model
                    .eval(&z3::ast::Int::new_const(name.as_str()), true)
                    .and_then(|v| v.as_i64())
                    .map(ModelValue::Int),
                Sort::BitVec(width) => model
                    .eval(&z3::ast::BV::new_const(name.as_str(), *width), true)
                    .and_then(|v| v.as_u64())
                    .map(|value| ModelValue::BitVec {
                        value,
                        width: *width,
                    }),
                Sort::Array { .. } => None,
            };
            if let Some(value) = value {
                out.set(name.clone(), value);
            }
        }
        out
    }
}

impl Solver for Z3Solver {
    fn declare(&mut self, declaration: &Declaration) -> Result<()> {
        self.script.declare(declaration.clone());
        Ok(())
    }

    fn assert(&mut self, term: &Term) -> Result<()> {
        self.script.assert(term.clone());
        Ok(())
    }

    fn check(&mut self) -> Result<SatResult> {
        let solver = z3::Solver::new();
        solver.from_string(self.script.body());
        debug!(
            "z3: checking {} assertions over {} declarations",
            self.script.assertions().len(),
            self.script.declarations().len()
        );

        let result = match solver.check() {
            z3::SatResult::Sat => SatResult::Sat,
            z3::SatResult::Unsat => SatResult::Unsat,
            z3::SatResult::Unknown => SatResult::Unknown,
        };
        self.model = match result {
            SatResult::Sat => solver.get_model().map(|model| self.extract(&model)),
            _ => None,
        };
        Ok(result)
    }

    fn model(&self) -> Result<Model> {
        self.model
            .clone()
            .ok_or_else(|| Error::Solver("no model available".to_string()))
    }
}
