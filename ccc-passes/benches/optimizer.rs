use ccc_ast::ast::{Program, Stmt};
use ccc_ast::builder::*;
use ccc_ast::types::TypeName::Int;
use ccc_passes::optimize::optimize;
use ccc_passes::sema::analyze;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

fn main_returning(body: Vec<Stmt>) -> Program {
    let mut program = program(vec![func(Int, "main", vec![], body)]);
    analyze(&mut program).unwrap();
    program
}

fn long_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("long-expr");

    let mut expr = int(1);
    for _i in 0..1000 {
        expr = add(expr, int(1));
    }
    let program = main_returning(vec![ret(expr)]);
    group.throughput(Throughput::Elements(1000));
    group.bench_function("long-expr", |b| {
        b.iter_batched(
            || program.clone(),
            |mut program| optimize(&mut program),
            BatchSize::SmallInput,
        )
    });
}

fn nested_if_true(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested-if-true");

    let mut body = vec![ret(int(0))];
    for _i in 0..200 {
        body = vec![if_(boolean(true), body)];
    }
    body.push(ret(int(1)));
    let program = main_returning(body);
    group.throughput(Throughput::Elements(200));
    group.bench_function("nested-if-true", |b| {
        b.iter_batched(
            || program.clone(),
            |mut program| optimize(&mut program),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, long_expr, nested_if_true);
criterion_main!(benches);
