//! Primitive types and scalar literals.
//!
//! [`Type`] is the closed set of primitive types a tracked value or an event can
//! carry. [`Scalar`] is a type-tagged literal used for expression leaves, solver
//! literals and model values.
//!
//! Conversions between scalars follow the native `as` semantics of the host
//! integers: narrowing truncates, widening sign-extends, and anything converted
//! to `bool` is `true` iff it is non-zero.

use std::fmt;

use strum::{EnumCount, EnumIter};

/// A primitive type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount)]
pub enum Type {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Char,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
}

impl Type {
    /// Bit width of the type; `bool` occupies a single bit.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Type::Bool => 1,
            Type::Char => 8,
            Type::Short => 16,
            Type::Int => 32,
        }
    }

    /// Integer promotion: every type narrower than `int`, including `bool`, becomes `int`.
    #[must_use]
    pub const fn promoted(self) -> Type {
        match self {
            Type::Bool | Type::Char | Type::Short | Type::Int => Type::Int,
        }
    }

    /// The common type of a binary arithmetic operation.
    ///
    /// Both operands are promoted first; the wider promoted type wins.
    #[must_use]
    pub const fn common(self, other: Type) -> Type {
        let (lhs, rhs) = (self.promoted(), other.promoted());
        if lhs.width() >= rhs.width() {
            lhs
        } else {
            rhs
        }
    }

    /// Source-level spelling of the type, as used in cast nodes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Type::Bool => "bool",
            Type::Char => "char",
            Type::Short => "short",
            Type::Int => "int",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal of one of the primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    /// Boolean literal
    Bool(bool),
    /// `char` literal
    Char(i8),
    /// `short` literal
    Short(i16),
    /// `int` literal
    Int(i32),
}

impl Scalar {
    /// The type tag of the literal.
    #[must_use]
    pub const fn ty(self) -> Type {
        match self {
            Scalar::Bool(_) => Type::Bool,
            Scalar::Char(_) => Type::Char,
            Scalar::Short(_) => Type::Short,
            Scalar::Int(_) => Type::Int,
        }
    }

    /// Widens the literal to an `i64`; `true` becomes 1.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Scalar::Bool(b) => b as i64,
            Scalar::Char(v) => v as i64,
            Scalar::Short(v) => v as i64,
            Scalar::Int(v) => v as i64,
        }
    }

    /// Converts the literal to another type using native conversion rules.
    ///
    /// # Arguments
    ///
    /// * `ty` - The target type.
    ///
    /// # Returns
    ///
    /// A literal of type `ty`.
    #[must_use]
    pub const fn convert(self, ty: Type) -> Scalar {
        let v = self.as_i64();
        match ty {
            Type::Bool => Scalar::Bool(v != 0),
            Type::Char => Scalar::Char(v as i8),
            Type::Short => Scalar::Short(v as i16),
            Type::Int => Scalar::Int(v as i32),
        }
    }

    /// The zero value of a type.
    #[must_use]
    pub const fn zero(ty: Type) -> Scalar {
        Scalar::Int(0).convert(ty)
    }

    /// Two's complement bit pattern of the literal, truncated to the type width.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        let width = self.ty().width();
        (self.as_i64() as u64) & (u64::MAX >> (64 - width))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
