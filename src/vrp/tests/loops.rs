use super::*;
use crate::ssa::BlockId;

/// `for i := 0; i < bound; i++` entered from `from`, returning
/// (header φ, body σ, increment).
fn counting_loop(func: &mut Function, from: BlockId, bound: Value) -> (Value, Value, Value) {
    let header = func.alloc_block();
    let body = func.alloc_block();
    let exit = func.alloc_block();

    let zero = func.const_int(0);
    let one = func.const_int(1);
    func.set_jump(from, header);

    let i = func.phi(header, vec![zero]);
    let cond = func.bin_op(header, BinOp::Lt, i, bound);
    func.set_branch(header, cond, body, exit);

    let bounded = func.sigma(body, i, true);
    let next = func.bin_op(body, BinOp::Add, bounded, one);
    func.add_phi_edge(i, next);
    func.set_jump(body, header);
    func.set_return(exit, None);

    (i, bounded, next)
}

#[test]
fn test_loop_with_constant_bound() {
    let mut func = Function::new();
    let start = func.alloc_block();
    let ten = func.const_int(10);
    let (i, bounded, next) = counting_loop(&mut func, start, ten);

    let ranges = solve(&func);
    assert_range(&ranges, i, "[0, 10]");
    assert_range(&ranges, bounded, "[0, 9]");
    assert_range(&ranges, next, "[1, 10]");
}

#[test]
fn test_loop_with_refined_parameter_bound() {
    // n ∈ [0, 10] via two σs, then for i := 0; i < n; i++. The loop bound
    // is a value, not a constant, so the σ in the body resolves as a
    // future once the refinement chain settles.
    let mut func = Function::new();
    let entry = func.alloc_block();
    let mid = func.alloc_block();
    let inner = func.alloc_block();
    let out = func.alloc_block();

    let n = func.add_param(Type::INT);
    let zero = func.const_int(0);
    let ten = func.const_int(10);

    let c1 = func.bin_op(entry, BinOp::Ge, n, zero);
    func.set_branch(entry, c1, mid, out);
    let n1 = func.sigma(mid, n, true);
    let c2 = func.bin_op(mid, BinOp::Le, n1, ten);
    func.set_branch(mid, c2, inner, out);
    let n2 = func.sigma(inner, n1, true);
    func.set_return(out, None);

    let (i, bounded, _) = counting_loop(&mut func, inner, n2);

    let ranges = solve(&func);
    assert_range(&ranges, n2, "[0, 10]");
    assert_range(&ranges, i, "[0, 10]");
    assert_range(&ranges, bounded, "[0, 9]");
}

#[test]
fn test_unbounded_counter_widens_to_infinity() {
    // the loop condition says nothing about i, so only the lower bound
    // survives
    let mut func = Function::new();
    let entry = func.alloc_block();
    let header = func.alloc_block();
    let body = func.alloc_block();
    let exit = func.alloc_block();

    let flag = func.add_param(Type::Bool);
    let zero = func.const_int(0);
    let one = func.const_int(1);
    func.set_jump(entry, header);

    let i = func.phi(header, vec![zero]);
    func.set_branch(header, flag, body, exit);
    let next = func.bin_op(body, BinOp::Add, i, one);
    func.add_phi_edge(i, next);
    func.set_jump(body, header);
    func.set_return(exit, Some(i));

    let ranges = solve(&func);
    assert_range(&ranges, i, "[0, ∞]");
    assert_range(&ranges, next, "[1, ∞]");
}
