//! Benchmarks for building and encoding symbolic state.
//!
//! Covers the hot paths of one concolic run:
//! - Flattened n-ary sums built through `Value` arithmetic
//! - Loop unwinding with joins of several variables
//! - Memory-model encoding of many events over overlapping zones

extern crate concolic;

use concolic::{
    branch::{Loop, Store},
    concurrent::{encode, Instr, MemoryAddr, Recorder},
    expr::{ExprEncoder, Scalar, Type},
    Config, Value,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Benchmark a long chain of additions on one symbolic value.
fn bench_value_sum(c: &mut Criterion) {
    c.bench_function("value_sum_64", |b| {
        b.iter(|| {
            let mut sum = Value::<i32>::any("X");
            for k in 0..64 {
                sum = sum + Value::new(black_box(k));
            }
            let term = ExprEncoder::new()
                .encode(sum.expr().expect("symbolic sum"))
                .unwrap();
            black_box(term)
        });
    });
}

/// Benchmark unwinding a loop over two variables four times.
fn bench_loop_unwinding(c: &mut Criterion) {
    c.bench_function("loop_unwind_4", |b| {
        b.iter(|| {
            let mut store = Store::new();
            let i = store.declare(Value::<i32>::any("I"));
            let j = store.declare(Value::<i32>::any("J"));
            let mut l = Loop::new(4);
            l.track(i).unwrap();
            l.track(j).unwrap();
            loop {
                let guard = store.get(i).unwrap().lt(Value::new(black_box(10)));
                if !l.unwind(&mut store, guard).unwrap() {
                    break;
                }
                let next = store.get(i).unwrap() + Value::new(1);
                store.set(i, next).unwrap();
                let next = store.get(j).unwrap() + store.get(i).unwrap();
                store.set(j, next).unwrap();
            }
            black_box(store.get(j).unwrap().to_string())
        });
    });
}

/// Benchmark encoding 32 writes and 32 reads over 8 shared locations.
fn bench_memory_model(c: &mut Criterion) {
    let mut recorder = Recorder::new();
    for k in 0..32u64 {
        let addr = MemoryAddr::new(k % 8).join(&MemoryAddr::new((k + 1) % 8));
        recorder.write(addr.clone(), Instr::literal(Scalar::Int(k as i32)));
        recorder.read(Type::Int, addr);
    }
    let relation = recorder.relation();
    let config = Config::default();

    c.bench_function("memory_model_64_events", |b| {
        b.iter(|| {
            let script = encode(black_box(&relation), &config).unwrap();
            black_box(script.assertions().len())
        });
    });
}

criterion_group!(
    benches,
    bench_value_sum,
    bench_loop_unwinding,
    bench_memory_model
);
criterion_main!(benches);
