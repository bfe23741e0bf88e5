//! Models and term evaluation.
//!
//! A [`Model`] assigns a [`ModelValue`] to constants and a finite
//! interpretation to uninterpreted functions. Solver backends produce models;
//! tests build them by hand as witnesses and evaluate generated formulas under
//! them with [`Model::eval`].

use std::collections::BTreeMap;

use crate::{
    smt::term::{mask, Sort, Term},
    Error, Result,
};

/// A value assigned by a model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Bit pattern of a bit-vector
    BitVec {
        /// Bit pattern, masked to `width`
        value: u64,
        /// Width in bits
        width: u32,
    },
    /// Array with a default element and explicit overrides keyed by bit pattern
    Array {
        /// Value of every element not listed in `entries`
        default: Box<ModelValue>,
        /// Explicitly stored elements
        entries: BTreeMap<u64, ModelValue>,
    },
}

impl ModelValue {
    /// Creates a bit-vector value from a signed integer, truncated to `width`.
    #[must_use]
    pub fn bv(value: i64, width: u32) -> ModelValue {
        ModelValue::BitVec {
            value: mask(value as u64, width),
            width,
        }
    }

    /// Sort of the value.
    #[must_use]
    pub fn sort(&self) -> Sort {
        match self {
            ModelValue::Bool(_) => Sort::Bool,
            ModelValue::Int(_) => Sort::Int,
            ModelValue::BitVec { width, .. } => Sort::BitVec(*width),
            ModelValue::Array { default, .. } => Sort::array(Sort::BitVec(32), default.sort()),
        }
    }

    fn as_bool(&self) -> Result<bool> {
        match self {
            ModelValue::Bool(b) => Ok(*b),
            other => Err(Error::SortMismatch {
                expected: Sort::Bool,
                found: other.sort(),
            }),
        }
    }

    fn as_int(&self) -> Result<i64> {
        match self {
            ModelValue::Int(v) => Ok(*v),
            other => Err(Error::SortMismatch {
                expected: Sort::Int,
                found: other.sort(),
            }),
        }
    }

    fn as_bv(&self) -> Result<(u64, u32)> {
        match self {
            ModelValue::BitVec { value, width } => Ok((*value, *width)),
            other => Err(Error::SortMismatch {
                expected: Sort::BitVec(32),
                found: other.sort(),
            }),
        }
    }

    /// Signed interpretation of a bit-vector or integer value.
    #[must_use]
    pub fn as_signed(&self) -> Option<i64> {
        match self {
            ModelValue::Int(v) => Some(*v),
            ModelValue::BitVec { value, width } => Some(sign_extend(*value, *width)),
            _ => None,
        }
    }
}

fn sign_extend(value: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return value as i64;
    }
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

/// Interpretation of an uninterpreted function as a finite table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncInterp {
    entries: BTreeMap<Vec<ModelValue>, ModelValue>,
    default: Option<ModelValue>,
}

impl FuncInterp {
    /// Creates an interpretation returning `default` outside its table.
    #[must_use]
    pub fn with_default(default: ModelValue) -> Self {
        Self {
            entries: BTreeMap::new(),
            default: Some(default),
        }
    }

    /// Maps `args` to `value`.
    pub fn insert(&mut self, args: Vec<ModelValue>, value: ModelValue) {
        self.entries.insert(args, value);
    }

    fn apply(&self, name: &str, args: &[ModelValue]) -> Result<ModelValue> {
        self.entries
            .get(args)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| Error::Evaluation(format!("`{name}` is undefined at {args:?}")))
    }
}

/// An assignment of values to constants and functions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    consts: BTreeMap<String, ModelValue>,
    funcs: BTreeMap<String, FuncInterp>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to the constant `name`.
    pub fn set(&mut self, name: impl Into<String>, value: ModelValue) -> &mut Self {
        self.consts.insert(name.into(), value);
        self
    }

    /// Assigns an interpretation to the function `name`.
    pub fn set_func(&mut self, name: impl Into<String>, interp: FuncInterp) -> &mut Self {
        self.funcs.insert(name.into(), interp);
        self
    }

    /// Value assigned to the constant `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelValue> {
        self.consts.get(name)
    }

    /// Iterates over all constant assignments in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModelValue)> {
        self.consts.iter()
    }

    /// Evaluates a term under this model.
    ///
    /// Bit-vector arithmetic wraps at the operand width; integer sums
    /// saturate at the bounds of `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] for constants or function points without
    /// an assignment and [`Error::SortMismatch`] for ill-sorted terms.
    pub fn eval(&self, term: &Term) -> Result<ModelValue> {
        Ok(match term {
            Term::Bool(b) => ModelValue::Bool(*b),
            Term::Int(v) => ModelValue::Int(*v),
            Term::BitVec { value, width } => ModelValue::BitVec {
                value: *value,
                width: *width,
            },
            Term::Const { name, .. } => self
                .consts
                .get(name)
                .cloned()
                .ok_or_else(|| Error::Evaluation(format!("`{name}` has no value")))?,
            Term::Apply { func, args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.funcs
                    .get(func)
                    .ok_or_else(|| Error::Evaluation(format!("`{func}` has no interpretation")))?
                    .apply(func, &args)?
            }
            Term::Not(t) => ModelValue::Bool(!self.eval(t)?.as_bool()?),
            Term::And(ts) => {
                let mut all = true;
                for t in ts {
                    all &= self.eval(t)?.as_bool()?;
                }
                ModelValue::Bool(all)
            }
            Term::Or(ts) => {
                let mut any = false;
                for t in ts {
                    any |= self.eval(t)?.as_bool()?;
                }
                ModelValue::Bool(any)
            }
            Term::Implies(a, b) => {
                ModelValue::Bool(!self.eval(a)?.as_bool()? || self.eval(b)?.as_bool()?)
            }
            Term::Eq(a, b) => ModelValue::Bool(self.eval(a)? == self.eval(b)?),
            Term::Distinct(ts) => {
                let values = ts
                    .iter()
                    .map(|t| self.eval(t))
                    .collect::<Result<Vec<_>>>()?;
                let distinct = values
                    .iter()
                    .enumerate()
                    .all(|(i, v)| values[i + 1..].iter().all(|w| w != v));
                ModelValue::Bool(distinct)
            }
            Term::Ite(c, t, e) => {
                if self.eval(c)?.as_bool()? {
                    self.eval(t)?
                } else {
                    self.eval(e)?
                }
            }
            Term::Lt(a, b) => ModelValue::Bool(self.eval(a)?.as_int()? < self.eval(b)?.as_int()?),
            Term::Gt(a, b) => ModelValue::Bool(self.eval(a)?.as_int()? > self.eval(b)?.as_int()?),
            Term::Add(ts) => {
                let mut sum = 0i64;
                for t in ts {
                    sum = sum.saturating_add(self.eval(t)?.as_int()?);
                }
                ModelValue::Int(sum)
            }
            Term::BvAdd(a, b) => {
                let (lhs, width) = self.eval(a)?.as_bv()?;
                let (rhs, _) = self.eval(b)?.as_bv()?;
                ModelValue::BitVec {
                    value: mask(lhs.wrapping_add(rhs), width),
                    width,
                }
            }
            Term::BvNot(t) => {
                let (value, width) = self.eval(t)?.as_bv()?;
                ModelValue::BitVec {
                    value: mask(!value, width),
                    width,
                }
            }
            Term::BvSlt(a, b) => {
                let (lhs, width) = self.eval(a)?.as_bv()?;
                let (rhs, _) = self.eval(b)?.as_bv()?;
                ModelValue::Bool(sign_extend(lhs, width) < sign_extend(rhs, width))
            }
            Term::SignExtend { bits, term } => {
                let (value, width) = self.eval(term)?.as_bv()?;
                ModelValue::bv(sign_extend(value, width), width + bits)
            }
            Term::Select(array, index) => match self.eval(array)? {
                ModelValue::Array { default, entries } => {
                    let (index, _) = self.eval(index)?.as_bv()?;
                    entries.get(&index).cloned().unwrap_or(*default)
                }
                other => {
                    return Err(Error::SortMismatch {
                        expected: Sort::array(Sort::BitVec(32), Sort::BitVec(32)),
                        found: other.sort(),
                    })
                }
            },
            Term::Store(array, index, value) => match self.eval(array)? {
                ModelValue::Array {
                    default,
                    mut entries,
                } => {
                    let (index, _) = self.eval(index)?.as_bv()?;
                    entries.insert(index, self.eval(value)?);
                    ModelValue::Array { default, entries }
                }
                other => {
                    return Err(Error::SortMismatch {
                        expected: Sort::array(Sort::BitVec(32), Sort::BitVec(32)),
                        found: other.sort(),
                    })
                }
            },
            Term::ConstArray { value, .. } => ModelValue::Array {
                default: Box::new(self.eval(value)?),
                entries: BTreeMap::new(),
            },
        })
    }

    /// Evaluates a boolean term under this model.
    ///
    /// # Errors
    ///
    /// Fails like [`Model::eval`], or with [`Error::SortMismatch`] when `term`
    /// is not boolean.
    pub fn satisfies(&self, term: &Term) -> Result<bool> {
        self.eval(term)?.as_bool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitvector_arithmetic_wraps() -> Result<()> {
        let model = Model::new();
        let sum = Term::bvadd(Term::bv(127, 8), Term::bv(1, 8));
        assert_eq!(model.eval(&sum)?, ModelValue::bv(-128, 8));
        assert!(model.satisfies(&Term::bvslt(sum, Term::bv(0, 8)))?);
        assert_eq!(
            model.eval(&Term::BvNot(Box::new(Term::bv(0, 4))))?,
            ModelValue::bv(15, 4)
        );
        Ok(())
    }

    #[test]
    fn test_arrays() -> Result<()> {
        let sort = Sort::array(Sort::BitVec(32), Sort::BitVec(8));
        let model = Model::new();
        let init = Term::ConstArray {
            sort,
            value: Box::new(Term::bv(7, 8)),
        };
        let stored = Term::store(init, Term::bv(2, 32), Term::bv(9, 8));
        assert_eq!(
            model.eval(&Term::select(stored.clone(), Term::bv(2, 32)))?,
            ModelValue::bv(9, 8)
        );
        assert_eq!(
            model.eval(&Term::select(stored, Term::bv(3, 32)))?,
            ModelValue::bv(7, 8)
        );
        Ok(())
    }

    #[test]
    fn test_functions_and_constants() -> Result<()> {
        let mut rf = FuncInterp::default();
        rf.insert(vec![ModelValue::Int(2)], ModelValue::Int(1));
        let mut model = Model::new();
        model.set("x", ModelValue::Int(1)).set_func("rf", rf);

        let lookup = Term::apply("rf", vec![Term::Int(2)], Sort::Int);
        assert!(model.satisfies(&Term::eq(Term::constant("x", Sort::Int), lookup))?);

        let missing = Term::apply("rf", vec![Term::Int(3)], Sort::Int);
        assert!(matches!(model.eval(&missing), Err(Error::Evaluation(_))));
        assert!(matches!(
            model.eval(&Term::constant("y", Sort::Int)),
            Err(Error::Evaluation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_distinct_and_sort_errors() -> Result<()> {
        let model = Model::new();
        assert!(model.satisfies(&Term::Distinct(vec![
            Term::Int(1),
            Term::Int(2),
            Term::Int(3)
        ]))?);
        assert!(!model.satisfies(&Term::Distinct(vec![Term::Int(1), Term::Int(1)]))?);
        assert!(matches!(
            model.satisfies(&Term::Int(1)),
            Err(Error::SortMismatch { .. })
        ));
        Ok(())
    }
}
