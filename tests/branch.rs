//! Branch join integration tests.
//!
//! These tests drive the public API the way an instrumented program would:
//! declare variables in a store, open `If`/`Loop` scopes around their bodies,
//! record path constraints and hand the resulting expressions to the solver
//! boundary.

use concolic::{
    branch::{If, Loop, Store, Var},
    expr::ExprEncoder,
    smt::{Model, ModelValue, Script},
    Config, Error, Result, Tracer, Value,
};

fn increment(store: &mut Store, var: Var<i32>, by: i32) -> Result<()> {
    let next = store.get(var)? + Value::new(by);
    store.set(var, next)
}

#[test]
fn nested_if_joins_inner_scope_first() -> Result<()> {
    let mut store = Store::new();
    let i = store.declare(Value::<i32>::any("I"));

    let mut outer = If::new(store.get(i)?.lt(Value::new(5)));
    outer.track(i)?;
    assert!(outer.begin_then(&store)?);
    increment(&mut store, i, 1)?;
    {
        let mut inner = If::new(store.get(i)?.lt(Value::new(7)));
        inner.track(i)?;
        assert!(inner.begin_then(&store)?);
        increment(&mut store, i, 2)?;
        inner.end(&mut store)?;
        assert_eq!(store.version(i)?, 3);
    }
    outer.end(&mut store)?;

    assert_eq!(
        store.get(i)?.to_string(),
        "(([I]<5)?((([I]+1)<7)?(([I]+1)+2):([I]+1)):[I])"
    );
    assert_eq!(store.version(i)?, 4);
    Ok(())
}

#[test]
fn concrete_guard_takes_one_arm() -> Result<()> {
    let mut store = Store::new();
    let x = store.declare(Value::new(1));
    let y = store.declare(Value::<i32>::any("Y"));

    let mut branch = If::new(store.get(x)?.lt(Value::new(0)));
    branch.track(x)?;
    branch.track(y)?;
    if branch.begin_then(&store)? {
        increment(&mut store, x, 10)?;
    }
    if branch.begin_else(&mut store)? {
        increment(&mut store, y, 1)?;
    }
    branch.end(&mut store)?;

    assert_eq!(store.get(x)?.data(), 1);
    assert!(!store.get(x)?.is_symbolic());
    assert_eq!(store.get(y)?.to_string(), "([Y]+1)");
    Ok(())
}

#[test]
fn scope_misuse_is_reported() {
    let mut store = Store::new();
    let mut branch = If::new(Value::<bool>::any("G"));
    assert!(matches!(
        branch.begin_else(&mut store),
        Err(Error::MalformedScope {
            call: "begin_else",
            ..
        })
    ));
}

#[test]
fn loop_join_encodes_and_evaluates() -> Result<()> {
    let mut store = Store::new();
    let i = store.declare(Value::<i32>::any("I"));
    let mut l = Loop::from_config(&Config::default());
    l.track(i)?;
    loop {
        let guard = store.get(i)?.lt(Value::new(5));
        if !l.unwind(&mut store, guard)? {
            break;
        }
        increment(&mut store, i, 1)?;
    }

    let joined = store.get(i)?;
    let expr = joined.expr().ok_or(Error::Evaluation("unjoined".into()))?;
    let term = ExprEncoder::new().encode(expr)?;
    assert_eq!(term.to_string(), "(ite (< I 5) (+ I 1) I)");

    let mut model = Model::new();
    model.set("I", ModelValue::Int(4));
    assert_eq!(model.eval(&term)?, ModelValue::Int(5));
    model.set("I", ModelValue::Int(9));
    assert_eq!(model.eval(&term)?, ModelValue::Int(9));
    Ok(())
}

#[test]
fn path_constraints_feed_the_solver() -> Result<()> {
    let mut tracer = Tracer::new();
    let i = Value::<i32>::any("I");
    let n = Value::<i32>::any("N");

    assert!(tracer.branch(&i.clone().lt(Value::new(5))));
    assert!(!tracer.branch(&i.clone().equals(n + Value::new(1))));
    assert!(tracer.branch(&Value::new(true)));
    assert_eq!(tracer.path_constraints().len(), 2);

    let mut out = Vec::new();
    tracer
        .write_path_constraints(&mut out)
        .map_err(|e| Error::Evaluation(e.to_string()))?;
    assert_eq!(String::from_utf8_lossy(&out), tracer.to_string());

    let mut script = Script::from_config(&Config::default());
    tracer.encode(&mut script)?;
    assert_eq!(script.declarations().len(), 2);

    let mut model = Model::new();
    model
        .set("I", ModelValue::Int(4))
        .set("N", ModelValue::Int(4));
    assert!(script.holds(&model)?);
    model.set("N", ModelValue::Int(3));
    assert!(!script.holds(&model)?);

    tracer.reset();
    assert!(tracer.path_constraints().is_empty());
    Ok(())
}
