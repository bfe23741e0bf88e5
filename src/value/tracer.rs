//! Path-constraint recording.
//!
//! Control flow driven by a symbolic boolean is the observable side effect of
//! concolic execution: every such decision is appended to the [`Tracer`] in
//! the polarity the concrete value took, exactly once per decision.

use std::{fmt, io};

use log::debug;

use crate::{
    expr::{Expr, ExprEncoder, SharedExpr},
    smt::Script,
    value::Value,
    Config, Result,
};

/// Record of the path constraints collected along one execution.
#[derive(Debug, Clone)]
pub struct Tracer {
    constraints: Vec<SharedExpr>,
    record: bool,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Tracer {
    /// Creates an empty, recording tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tracer honouring `config.record_path_constraints`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            constraints: Vec::new(),
            record: config.record_path_constraints,
        }
    }

    /// Converts `cond` to a host boolean to drive control flow.
    ///
    /// If `cond` is symbolic, its expression is recorded as is when the
    /// concrete value is `true` and negated otherwise.
    ///
    /// # Returns
    ///
    /// The concrete value of `cond`.
    pub fn branch(&mut self, cond: &Value<bool>) -> bool {
        let taken = cond.data();
        if let (true, Some(expr)) = (self.record, cond.expr()) {
            let constraint = if taken {
                expr.clone()
            } else {
                Expr::not(expr.clone())
            };
            debug!("path constraint #{}: {constraint}", self.constraints.len());
            self.constraints.push(constraint);
        }
        taken
    }

    /// Constraints recorded so far, oldest first.
    #[must_use]
    pub fn path_constraints(&self) -> &[SharedExpr] {
        &self.constraints
    }

    /// Writes one constraint per line.
    ///
    /// # Errors
    ///
    /// Propagates any error of `out`.
    pub fn write_path_constraints<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for constraint in &self.constraints {
            writeln!(out, "{constraint}")?;
        }
        Ok(())
    }

    /// Forgets every recorded constraint.
    pub fn reset(&mut self) {
        self.constraints.clear();
    }

    /// Asserts every recorded constraint into `script`.
    ///
    /// # Errors
    ///
    /// Fails like [`ExprEncoder::encode`], before anything is asserted.
    pub fn encode(&self, script: &mut Script) -> Result<()> {
        let mut encoder = ExprEncoder::new();
        let terms = self
            .constraints
            .iter()
            .map(|constraint| encoder.encode(constraint))
            .collect::<Result<Vec<_>>>()?;
        encoder.declare_into(script);
        for term in terms {
            script.assert(term);
        }
        Ok(())
    }
}

impl fmt::Display for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for constraint in &self.constraints {
            writeln!(f, "{constraint}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::{Scalar, Type},
        smt::{Model, ModelValue},
        Error,
    };

    #[test]
    fn test_records_polarity_once() {
        let mut a = Value::new(true);
        a.set_symbolic("A");
        let mut b = Value::new(false);
        b.set_symbolic("B");

        let mut tracer = Tracer::new();
        assert!(tracer.branch(&a));
        assert!(!tracer.branch(&b));
        assert!(tracer.branch(&Value::new(true)));

        let mut out = Vec::new();
        tracer.write_path_constraints(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[A:1]\n(![B:0])\n");
        assert_eq!(tracer.to_string(), "[A:1]\n(![B:0])\n");

        tracer.reset();
        assert!(tracer.path_constraints().is_empty());
    }

    #[test]
    fn test_disabled_recording() {
        let mut tracer = Tracer::from_config(&Config::minimal());
        assert!(tracer.branch(&Value::with_expr(true, Expr::any("A", Type::Bool))));
        assert!(tracer.path_constraints().is_empty());
    }

    #[test]
    fn test_encode() -> Result<()> {
        let i = Value::<i32>::any("I");
        let guard = i.clone().lt(Value::new(5));
        let mut tracer = Tracer::new();
        assert!(tracer.branch(&guard));

        let mut script = Script::new("QF_LIA");
        tracer.encode(&mut script)?;
        assert_eq!(script.assertions()[0].to_string(), "(< I 5)");

        let mut model = Model::new();
        model.set("I", ModelValue::Int(4));
        assert!(script.holds(&model)?);
        model.set("I", ModelValue::Int(5));
        assert!(!script.holds(&model)?);

        let c = Value::<i8>::any("C");
        let mut narrow = Tracer::new();
        narrow.branch(&c.equals(Value::with_expr(1i8, Expr::literal(Scalar::Char(1)))));
        assert!(matches!(
            narrow.encode(&mut Script::new("ALL")),
            Err(Error::UnsupportedType(Type::Char))
        ));
        Ok(())
    }
}
