//! Host primitives a [`crate::Value`] can carry.
//!
//! [`Primitive`] ties a Rust scalar to its [`Type`] tag, and [`Promote`] is
//! the fixed arithmetic-conversion table: the result type of combining two
//! primitives. Both are closed tables generated by macros.

use std::fmt;

use crate::expr::{Scalar, Type};

/// A host scalar with a fixed [`Type`] tag.
pub trait Primitive: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// Type tag of the primitive.
    const TYPE: Type;

    /// Wraps the value as a type-tagged literal.
    fn to_scalar(self) -> Scalar;

    /// Converts any literal into this primitive using native conversion rules.
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident, |$v:ident| $convert:expr;)*) => {
        $(
            impl Primitive for $ty {
                const TYPE: Type = Type::$variant;

                fn to_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }

                fn from_scalar(value: Scalar) -> Self {
                    let $v = value.as_i64();
                    $convert
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool, |v| v != 0;
    i8 => Char, |v| v as i8;
    i16 => Short, |v| v as i16;
    i32 => Int, |v| v as i32;
}

/// Result type of an arithmetic operation between `Self` and `Rhs`.
pub trait Promote<Rhs: Primitive>: Primitive {
    /// The promoted type.
    type Output: Primitive;
}

macro_rules! promote {
    ($($lhs:ty, $rhs:ty => $out:ty;)*) => {
        $(
            impl Promote<$rhs> for $lhs {
                type Output = $out;
            }
        )*
    };
}

promote! {
    bool, bool => i32;
    bool, i8 => i32;
    bool, i16 => i32;
    bool, i32 => i32;
    i8, bool => i32;
    i8, i8 => i32;
    i8, i16 => i32;
    i8, i32 => i32;
    i16, bool => i32;
    i16, i8 => i32;
    i16, i16 => i32;
    i16, i32 => i32;
    i32, bool => i32;
    i32, i8 => i32;
    i32, i16 => i32;
    i32, i32 => i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promoted<L: Promote<R>, R: Primitive>() -> Type {
        <L as Promote<R>>::Output::TYPE
    }

    #[test]
    fn test_table_agrees_with_common_type() {
        assert_eq!(promoted::<i8, i32>(), Type::Char.common(Type::Int));
        assert_eq!(promoted::<bool, i8>(), Type::Bool.common(Type::Char));
        assert_eq!(promoted::<i16, i16>(), Type::Short.common(Type::Short));
        assert_eq!(promoted::<i32, bool>(), Type::Int.common(Type::Bool));
    }

    #[test]
    fn test_round_trip_through_scalar() {
        assert_eq!(i8::from_scalar(Scalar::Int(383)), 127);
        assert!(bool::from_scalar(Scalar::Char(-3)));
        assert_eq!(i32::from_scalar(true.to_scalar()), 1);
        assert_eq!(i16::TYPE, Type::Short);
    }
}
