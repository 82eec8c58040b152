use struc_gen::codegen::accumulator::{BitWidth, LayoutAccumulator};
use struc_gen::codegen::ir_runtime::{Env, exec};
use struc_gen::codegen::shared::builder::IrBuilder;
use struc_gen::codegen::shared::ir::{Expr, Stmt, StmtId};

fn run(builder: &IrBuilder, fragment: StmtId, env: &mut Env) -> u64 {
    exec(builder.arena(), &[fragment], env).expect("exec fragment");
    env["m"]
}

fn start(m: u64) -> Env {
    Env::from([("m".to_string(), m)])
}

#[test]
fn sub_byte_total_rounds_up_to_one_byte() {
    let mut builder = IrBuilder::new();
    let mut acc = LayoutAccumulator::new("m", 0);
    acc.add(&mut builder, BitWidth::Static(5));
    let flushed = acc.flush(&mut builder);

    assert_eq!(run(&builder, flushed.fragment, &mut start(0)), 1);
}

#[test]
fn dynamic_totals_round_up_to_whole_bytes() {
    for r in [0u64, 3, 8, 15] {
        let mut builder = IrBuilder::new();
        let mut acc = LayoutAccumulator::new("m", 0);
        acc.add(&mut builder, BitWidth::Static(10));
        acc.add(&mut builder, BitWidth::Dynamic(Expr::var("r")));
        let flushed = acc.flush(&mut builder);

        let mut env = start(0);
        env.insert("r".to_string(), r);
        assert_eq!(
            run(&builder, flushed.fragment, &mut env),
            (10 + r).div_ceil(8),
            "r = {r}"
        );
    }
}

#[test]
fn packed_flush_always_lands_on_a_multiple() {
    for pack in [2u64, 4, 8] {
        for initial in 0..9u64 {
            for bits in [0u64, 1, 7, 8, 9, 31] {
                let mut builder = IrBuilder::new();
                let mut acc = LayoutAccumulator::new("m", pack);
                acc.add(&mut builder, BitWidth::Static(bits));
                let flushed = acc.flush(&mut builder);

                let end = run(&builder, flushed.fragment, &mut start(initial));
                assert_eq!(end % pack, 0, "pack {pack}, start {initial}, bits {bits}");
                assert!(end >= initial + bits.div_ceil(8));
                assert!(end < initial + bits.div_ceil(8) + pack);
            }
        }
    }
}

#[test]
fn second_flush_leaves_aligned_cursor_alone() {
    let mut builder = IrBuilder::new();
    let mut acc = LayoutAccumulator::new("m", 4);
    acc.add(&mut builder, BitWidth::Static(10));
    let first = acc.flush(&mut builder);
    let second = acc.flush(&mut builder);
    assert_ne!(first.bound_check, second.bound_check);

    let mut env = start(0);
    assert_eq!(run(&builder, first.fragment, &mut env), 4);
    assert_eq!(run(&builder, second.fragment, &mut env), 4);
}

#[test]
fn two_bit_fields_fill_two_bytes() {
    let mut builder = IrBuilder::new();
    let mut acc = LayoutAccumulator::new("m", 0);
    acc.add(&mut builder, BitWidth::Static(3));
    acc.add(&mut builder, BitWidth::Static(13));
    let flushed = acc.flush(&mut builder);

    assert_eq!(run(&builder, flushed.fragment, &mut start(0)), 2);
}

#[test]
fn packed_flush_steps_through_each_statement() {
    let mut builder = IrBuilder::new();
    let mut acc = LayoutAccumulator::new("m", 4);
    acc.add(&mut builder, BitWidth::Static(10));
    let flushed = acc.flush(&mut builder);

    let Some(Stmt::Seq { stmts }) = builder.arena().get(flushed.fragment).cloned() else {
        panic!("flush fragment should be a sequence");
    };

    let mut env = start(0);
    let mut trace = vec![env["m"]];
    for id in stmts {
        if matches!(
            builder.arena().get(id),
            Some(Stmt::AddAssign { .. } | Stmt::If { .. })
        ) {
            exec(builder.arena(), &[id], &mut env).expect("exec step");
            trace.push(env["m"]);
        }
    }
    assert_eq!(trace, vec![0, 1, 2, 4]);

    let last = builder.arena().iter().last().map(|(id, _)| id);
    assert_eq!(last, Some(flushed.fragment));
    assert_eq!(
        builder.arena().get(flushed.bound_check.stmt()),
        Some(&Stmt::Placeholder)
    );
}
