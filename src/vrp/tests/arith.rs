use super::*;
use crate::vrp::graph::VertexKind;

#[test]
fn test_constant_addition_folds_to_point() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let three = func.const_int(3);
    let four = func.const_int(4);
    let sum = func.bin_op(entry, BinOp::Add, three, four);
    func.set_return(entry, Some(sum));

    let ranges = solve(&func);
    assert_range(&ranges, three, "[3, 3]");
    assert_range(&ranges, sum, "[7, 7]");
}

#[test]
fn test_subtraction_and_multiplication() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let ten = func.const_int(10);
    let three = func.const_int(3);
    let diff = func.bin_op(entry, BinOp::Sub, ten, three);
    let prod = func.bin_op(entry, BinOp::Mul, diff, three);
    func.set_return(entry, Some(prod));

    let ranges = solve(&func);
    assert_range(&ranges, diff, "[7, 7]");
    assert_range(&ranges, prod, "[21, 21]");
}

#[test]
fn test_each_constant_gets_one_vertex() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let three = func.const_int(3);
    let doubled = func.bin_op(entry, BinOp::Add, three, three);
    let tripled = func.bin_op(entry, BinOp::Add, doubled, three);
    func.set_return(entry, Some(tripled));

    let g = Graph::build(&func);
    let const_vertices = g
        .vertices
        .iter()
        .filter(|vx| match vx.kind {
            VertexKind::Value(v) => func.is_const(v),
            _ => false,
        })
        .count();
    assert_eq!(const_vertices, 1);

    let ranges = g.solve();
    assert_range(&ranges, doubled, "[6, 6]");
    assert_range(&ranges, tripled, "[9, 9]");
}

#[test]
fn test_division_is_not_modeled() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let a = func.const_int(100);
    let b = func.const_int(5);
    let quot = func.bin_op(entry, BinOp::Div, a, b);
    func.set_return(entry, Some(quot));

    let ranges = solve(&func);
    assert_range(&ranges, a, "[100, 100]");
    assert_unknown(&ranges, quot);
}

#[test]
fn test_unsigned_top_starts_at_zero() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let u = func.add_param(Type::UINT);
    let one = func.const_int_typed(1, Type::UINT);
    let bumped = func.bin_op(entry, BinOp::Add, u, one);
    func.set_return(entry, Some(bumped));

    let ranges = solve(&func);
    assert_range(&ranges, u, "[0, ∞]");
    assert_range(&ranges, bumped, "[1, ∞]");
}

#[test]
fn test_signed_overflow_clamps_to_full_line() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let a = func.const_int_typed(100, Type::I8);
    let b = func.const_int_typed(100, Type::I8);
    let sum = func.bin_op(entry, BinOp::Add, a, b);
    func.set_return(entry, Some(sum));

    let ranges = solve(&func);
    // 200 does not fit an i8
    assert_range(&ranges, sum, "[-∞, ∞]");
    assert_range(&ranges, a, "[100, 100]");
}

#[test]
fn test_conversion_carries_range_then_clamps() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let x = func.const_int(300);
    let zero = func.const_int(0);
    let wide = func.bin_op(entry, BinOp::Add, x, zero);
    let to32 = func.convert(entry, wide, Type::I32);
    let to8 = func.convert(entry, wide, Type::I8);
    func.set_return(entry, Some(to32));

    let ranges = solve(&func);
    assert_range(&ranges, to32, "[300, 300]");
    assert_range(&ranges, to8, "[-∞, ∞]");
}
