//! Solver-agnostic SMT terms.
//!
//! [`Term`] is a small first-order term language over the sorts the encoders
//! need: booleans, unbounded integers (clocks and event identifiers), fixed
//! width bit-vectors (event values) and arrays of bit-vectors. Terms print as
//! SMT-LIB 2 s-expressions through [`std::fmt::Display`].

use std::fmt;

use crate::{Error, Result};

/// Sort of an SMT term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
    /// `Bool`
    Bool,
    /// `Int`
    Int,
    /// `(_ BitVec width)`
    BitVec(u32),
    /// `(Array index element)`
    Array {
        /// Sort of the indices
        index: Box<Sort>,
        /// Sort of the elements
        element: Box<Sort>,
    },
}

impl Sort {
    /// Creates an array sort.
    #[must_use]
    pub fn array(index: Sort, element: Sort) -> Sort {
        Sort::Array {
            index: Box::new(index),
            element: Box::new(element),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => f.write_str("Bool"),
            Sort::Int => f.write_str("Int"),
            Sort::BitVec(width) => write!(f, "(_ BitVec {width})"),
            Sort::Array { index, element } => write!(f, "(Array {index} {element})"),
        }
    }
}

/// An SMT term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Bit-vector literal; `value` holds the bit pattern
    BitVec {
        /// Bit pattern, masked to `width`
        value: u64,
        /// Width in bits
        width: u32,
    },
    /// A declared constant
    Const {
        /// Symbol of the constant
        name: String,
        /// Sort of the constant
        sort: Sort,
    },
    /// Application of a declared function
    Apply {
        /// Symbol of the function
        func: String,
        /// Arguments
        args: Vec<Term>,
        /// Result sort
        sort: Sort,
    },
    /// `(not t)`
    Not(Box<Term>),
    /// `(and ...)`
    And(Vec<Term>),
    /// `(or ...)`
    Or(Vec<Term>),
    /// `(=> a b)`
    Implies(Box<Term>, Box<Term>),
    /// `(= a b)`
    Eq(Box<Term>, Box<Term>),
    /// `(distinct ...)`
    Distinct(Vec<Term>),
    /// `(ite c t e)`
    Ite(Box<Term>, Box<Term>, Box<Term>),
    /// Integer `(< a b)`
    Lt(Box<Term>, Box<Term>),
    /// Integer `(> a b)`
    Gt(Box<Term>, Box<Term>),
    /// Integer `(+ ...)`
    Add(Vec<Term>),
    /// `(bvadd a b)`
    BvAdd(Box<Term>, Box<Term>),
    /// `(bvnot t)`
    BvNot(Box<Term>),
    /// `(bvslt a b)`
    BvSlt(Box<Term>, Box<Term>),
    /// `((_ sign_extend bits) t)`
    SignExtend {
        /// Number of bits added
        bits: u32,
        /// Extended term
        term: Box<Term>,
    },
    /// `(select array index)`
    Select(Box<Term>, Box<Term>),
    /// `(store array index value)`
    Store(Box<Term>, Box<Term>, Box<Term>),
    /// `((as const sort) value)`
    ConstArray {
        /// Sort of the array
        sort: Sort,
        /// Value of every element
        value: Box<Term>,
    },
}

impl Term {
    /// Creates a bit-vector literal from a signed value, truncated to `width`.
    #[must_use]
    pub fn bv(value: i64, width: u32) -> Term {
        Term::BitVec {
            value: mask(value as u64, width),
            width,
        }
    }

    /// Creates a constant of the given sort.
    #[must_use]
    pub fn constant(name: impl Into<String>, sort: Sort) -> Term {
        Term::Const {
            name: name.into(),
            sort,
        }
    }

    /// Applies a declared function.
    #[must_use]
    pub fn apply(func: impl Into<String>, args: Vec<Term>, sort: Sort) -> Term {
        Term::Apply {
            func: func.into(),
            args,
            sort,
        }
    }

    /// Negates a boolean term.
    #[must_use]
    pub fn not(term: Term) -> Term {
        Term::Not(Box::new(term))
    }

    /// Conjoins terms; a single term is returned as is.
    #[must_use]
    pub fn and(mut terms: Vec<Term>) -> Term {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Term::And(terms)
        }
    }

    /// Disjoins terms; a single term is returned as is.
    #[must_use]
    pub fn or(mut terms: Vec<Term>) -> Term {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Term::Or(terms)
        }
    }

    /// Creates an implication.
    #[must_use]
    pub fn implies(lhs: Term, rhs: Term) -> Term {
        Term::Implies(Box::new(lhs), Box::new(rhs))
    }

    /// Creates an equality.
    #[must_use]
    pub fn eq(lhs: Term, rhs: Term) -> Term {
        Term::Eq(Box::new(lhs), Box::new(rhs))
    }

    /// Creates an if-then-else.
    #[must_use]
    pub fn ite(cond: Term, then: Term, otherwise: Term) -> Term {
        Term::Ite(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    /// Creates an integer strict less-than.
    #[must_use]
    pub fn lt(lhs: Term, rhs: Term) -> Term {
        Term::Lt(Box::new(lhs), Box::new(rhs))
    }

    /// Creates an integer strict greater-than.
    #[must_use]
    pub fn gt(lhs: Term, rhs: Term) -> Term {
        Term::Gt(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a bit-vector addition.
    #[must_use]
    pub fn bvadd(lhs: Term, rhs: Term) -> Term {
        Term::BvAdd(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a signed bit-vector less-than.
    #[must_use]
    pub fn bvslt(lhs: Term, rhs: Term) -> Term {
        Term::BvSlt(Box::new(lhs), Box::new(rhs))
    }

    /// Reads an array element.
    #[must_use]
    pub fn select(array: Term, index: Term) -> Term {
        Term::Select(Box::new(array), Box::new(index))
    }

    /// Writes an array element.
    #[must_use]
    pub fn store(array: Term, index: Term, value: Term) -> Term {
        Term::Store(Box::new(array), Box::new(index), Box::new(value))
    }

    /// Infers the sort of the term.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SortMismatch`] when an operand has a sort its operator
    /// does not accept.
    pub fn sort(&self) -> Result<Sort> {
        match self {
            Term::Bool(_)
            | Term::Not(_)
            | Term::And(_)
            | Term::Or(_)
            | Term::Implies(..)
            | Term::Eq(..)
            | Term::Distinct(_)
            | Term::Lt(..)
            | Term::Gt(..)
            | Term::BvSlt(..) => Ok(Sort::Bool),
            Term::Int(_) | Term::Add(_) => Ok(Sort::Int),
            Term::BitVec { width, .. } => Ok(Sort::BitVec(*width)),
            Term::Const { sort, .. } | Term::Apply { sort, .. } | Term::ConstArray { sort, .. } => {
                Ok(sort.clone())
            }
            Term::Ite(_, then, _) => then.sort(),
            Term::BvAdd(lhs, _) | Term::BvNot(lhs) => lhs.sort(),
            Term::SignExtend { bits, term } => match term.sort()? {
                Sort::BitVec(width) => Ok(Sort::BitVec(width + bits)),
                found => Err(Error::SortMismatch {
                    expected: Sort::BitVec(0),
                    found,
                }),
            },
            Term::Select(array, _) => match array.sort()? {
                Sort::Array { element, .. } => Ok(*element),
                found => Err(Error::SortMismatch {
                    expected: Sort::array(Sort::BitVec(32), Sort::BitVec(32)),
                    found,
                }),
            },
            Term::Store(array, ..) => array.sort(),
        }
    }
}

pub(crate) fn mask(value: u64, width: u32) -> u64 {
    if width >= 64 {
        value
    } else {
        value & ((1u64 << width) - 1)
    }
}

/// Writes `name` as an SMT-LIB symbol, quoting it when it is not a simple symbol.
pub(crate) fn write_symbol(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    const EXTRA: &str = "~!@$%^&*_-+=<>.?/";
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || EXTRA.contains(c))
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || EXTRA.contains(c));
    if simple {
        f.write_str(name)
    } else {
        write!(f, "|{name}|")
    }
}

fn write_app<'a>(
    f: &mut fmt::Formatter<'_>,
    head: &str,
    args: impl IntoIterator<Item = &'a Term>,
) -> fmt::Result {
    write!(f, "({head}")?;
    for arg in args {
        write!(f, " {arg}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Bool(b) => write!(f, "{b}"),
            Term::Int(v) if *v < 0 => write!(f, "(- {})", v.unsigned_abs()),
            Term::Int(v) => write!(f, "{v}"),
            Term::BitVec { value, width } => write!(f, "(_ bv{value} {width})"),
            Term::Const { name, .. } => write_symbol(f, name),
            Term::Apply { func, args, .. } => {
                f.write_str("(")?;
                write_symbol(f, func)?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
            Term::Not(t) => write_app(f, "not", [t.as_ref()]),
            Term::And(ts) if ts.is_empty() => f.write_str("true"),
            Term::And(ts) => write_app(f, "and", ts),
            Term::Or(ts) if ts.is_empty() => f.write_str("false"),
            Term::Or(ts) => write_app(f, "or", ts),
            Term::Implies(a, b) => write_app(f, "=>", [a.as_ref(), b.as_ref()]),
            Term::Eq(a, b) => write_app(f, "=", [a.as_ref(), b.as_ref()]),
            Term::Distinct(ts) if ts.len() < 2 => f.write_str("true"),
            Term::Distinct(ts) => write_app(f, "distinct", ts),
            Term::Ite(c, t, e) => write_app(f, "ite", [c.as_ref(), t.as_ref(), e.as_ref()]),
            Term::Lt(a, b) => write_app(f, "<", [a.as_ref(), b.as_ref()]),
            Term::Gt(a, b) => write_app(f, ">", [a.as_ref(), b.as_ref()]),
            Term::Add(ts) if ts.is_empty() => f.write_str("0"),
            Term::Add(ts) => write_app(f, "+", ts),
            Term::BvAdd(a, b) => write_app(f, "bvadd", [a.as_ref(), b.as_ref()]),
            Term::BvNot(t) => write_app(f, "bvnot", [t.as_ref()]),
            Term::BvSlt(a, b) => write_app(f, "bvslt", [a.as_ref(), b.as_ref()]),
            Term::SignExtend { bits, term } => write!(f, "((_ sign_extend {bits}) {term})"),
            Term::Select(a, i) => write_app(f, "select", [a.as_ref(), i.as_ref()]),
            Term::Store(a, i, v) => write_app(f, "store", [a.as_ref(), i.as_ref(), v.as_ref()]),
            Term::ConstArray { sort, value } => write!(f, "((as const {sort}) {value})"),
        }
    }
}
