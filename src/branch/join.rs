//! Merging of divergent variable states.

use crate::{
    branch::store::Slot,
    expr::{Expr, SharedExpr},
    value::{Value, Version},
};

/// Merges the states of one variable at the end of a two-armed scope.
///
/// A concrete guard selects its arm outright. Otherwise the arms are joined
/// into `(guard?then:otherwise)`, unless both arms denote the same value, in
/// which case that value is kept as is. The concrete part always follows the
/// concrete guard value.
pub(crate) fn join(
    guard: &Value<bool>,
    guard_expr: &SharedExpr,
    then: &Slot,
    otherwise: &Slot,
    version: Version,
) -> Slot {
    let taken = if guard.data() { then } else { otherwise };
    if guard.is_concrete() || then.same_value(otherwise) {
        return Slot {
            version,
            ..taken.clone()
        };
    }
    Slot {
        data: taken.data,
        expr: Some(Expr::ite(
            guard_expr.clone(),
            then.materialize(),
            otherwise.materialize(),
        )),
        concrete: taken.concrete,
        version,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::expr::{Scalar, Type};

    fn slot(expr: Option<SharedExpr>, data: i32) -> Slot {
        Slot {
            data: Scalar::Int(data),
            expr,
            concrete: true,
            version: 0,
        }
    }

    #[test]
    fn test_identical_arms_are_shared() {
        let i = Expr::any("I", Type::Int);
        let guard = Value::<bool>::any("G");
        let joined = join(
            &guard,
            &guard.materialize(),
            &slot(Some(i.clone()), 0),
            &slot(Some(i.clone()), 0),
            3,
        );
        assert!(Rc::ptr_eq(joined.expr.as_ref().unwrap(), &i));
        assert_eq!(joined.version, 3);
    }

    #[test]
    fn test_concrete_arms_are_literalized() {
        let guard = Value::<bool>::any("G");
        let joined = join(&guard, &guard.materialize(), &slot(None, 1), &slot(None, 2), 1);
        assert_eq!(joined.expr.unwrap().to_string(), "([G]?1:2)");
        assert_eq!(joined.data, Scalar::Int(2));
    }

    #[test]
    fn test_concrete_guard_selects() {
        let guard = Value::new(true);
        let then = slot(Some(Expr::any("T", Type::Int)), 1);
        let joined = join(&guard, &guard.materialize(), &then, &slot(None, 2), 5);
        assert_eq!(joined.expr.unwrap().to_string(), "[T]");
        assert_eq!(joined.version, 5);
    }
}
