//! SMT-LIB 2 scripts.
//!
//! A [`Script`] is the single artefact the encoders produce: declarations of
//! every constant and function they introduced, followed by the assertions
//! that make up the formula. It renders as an SMT-LIB 2 script and can be
//! replayed into any [`Solver`].

use std::{collections::BTreeSet, fmt};

use crate::{
    smt::{
        model::Model,
        solver::{SatResult, Solver},
        term::{write_symbol, Sort, Term},
    },
    Config, Result,
};

/// A declared symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `(declare-const name sort)`
    Const {
        /// Symbol
        name: String,
        /// Sort of the constant
        sort: Sort,
    },
    /// `(declare-fun name (args) ret)`
    Fun {
        /// Symbol
        name: String,
        /// Argument sorts
        args: Vec<Sort>,
        /// Result sort
        ret: Sort,
    },
}

impl Declaration {
    /// The declared symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Declaration::Const { name, .. } | Declaration::Fun { name, .. } => name,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Const { name, sort } => {
                f.write_str("(declare-const ")?;
                write_symbol(f, name)?;
                write!(f, " {sort})")
            }
            Declaration::Fun { name, args, ret } => {
                f.write_str("(declare-fun ")?;
                write_symbol(f, name)?;
                f.write_str(" (")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ") {ret})")
            }
        }
    }
}

/// Declarations and assertions making up one solver query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    logic: String,
    declared: BTreeSet<String>,
    declarations: Vec<Declaration>,
    assertions: Vec<Term>,
}

impl Script {
    /// Creates an empty script for `logic`.
    #[must_use]
    pub fn new(logic: impl Into<String>) -> Self {
        Self {
            logic: logic.into(),
            declared: BTreeSet::new(),
            declarations: Vec::new(),
            assertions: Vec::new(),
        }
    }

    /// Creates an empty script using the logic of `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.logic.clone())
    }

    /// Adds a declaration; re-declaring a symbol is ignored.
    pub fn declare(&mut self, declaration: Declaration) {
        if self.declared.insert(declaration.name().to_string()) {
            self.declarations.push(declaration);
        }
    }

    /// Appends an assertion.
    pub fn assert(&mut self, term: Term) {
        self.assertions.push(term);
    }

    /// The SMT-LIB logic of the script.
    #[must_use]
    pub fn logic(&self) -> &str {
        &self.logic
    }

    /// Declarations in insertion order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Assertions in insertion order.
    #[must_use]
    pub fn assertions(&self) -> &[Term] {
        &self.assertions
    }

    /// The conjunction of all assertions.
    #[must_use]
    pub fn formula(&self) -> Term {
        Term::And(self.assertions.clone())
    }

    /// Checks whether every assertion holds under `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if an assertion cannot be evaluated under `model`.
    pub fn holds(&self, model: &Model) -> Result<bool> {
        for assertion in &self.assertions {
            if !model.satisfies(assertion)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Replays the script into `solver` and checks satisfiability.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the solver backend.
    pub fn check_with<S: Solver + ?Sized>(&self, solver: &mut S) -> Result<SatResult> {
        for declaration in &self.declarations {
            solver.declare(declaration)?;
        }
        for assertion in &self.assertions {
            solver.assert(assertion)?;
        }
        solver.check()
    }

    /// Declarations and assertions without the logic header and `check-sat`.
    #[must_use]
    pub fn body(&self) -> String {
        let mut out = String::new();
        for declaration in &self.declarations {
            out.push_str(&declaration.to_string());
            out.push('\n');
        }
        for assertion in &self.assertions {
            out.push_str(&format!("(assert {assertion})\n"));
        }
        out
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(set-logic {})", self.logic)?;
        f.write_str(&self.body())?;
        writeln!(f, "(check-sat)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smt::model::ModelValue;

    #[test]
    fn test_render() {
        let mut script = Script::new("QF_AUFBV");
        let x = Term::constant("x", Sort::Int);
        script.declare(Declaration::Const {
            name: "x".into(),
            sort: Sort::Int,
        });
        script.declare(Declaration::Const {
            name: "x".into(),
            sort: Sort::Int,
        });
        script.declare(Declaration::Fun {
            name: "rf".into(),
            args: vec![Sort::Int],
            ret: Sort::Int,
        });
        script.assert(Term::gt(x, Term::Int(0)));

        assert_eq!(
            script.to_string(),
            "(set-logic QF_AUFBV)\n\
             (declare-const x Int)\n\
             (declare-fun rf (Int) Int)\n\
             (assert (> x 0))\n\
             (check-sat)\n"
        );
        assert_eq!(script.declarations().len(), 2);
    }

    #[test]
    fn test_holds() -> Result<()> {
        let mut script = Script::from_config(&Config::default());
        assert_eq!(script.logic(), "ALL");
        script.assert(Term::gt(Term::constant("x", Sort::Int), Term::Int(0)));

        let mut model = Model::new();
        model.set("x", ModelValue::Int(3));
        assert!(script.holds(&model)?);
        model.set("x", ModelValue::Int(0));
        assert!(!script.holds(&model)?);
        Ok(())
    }
}
