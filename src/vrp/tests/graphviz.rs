use super::*;

#[test]
fn test_graphviz_encodes_vertices_and_edges() {
    let mut func = Function::new();
    let entry = func.alloc_block();
    let a = func.const_int(1);
    let b = func.add_param(Type::INT);
    let sum = func.bin_op(entry, BinOp::Add, a, b);
    func.set_return(entry, Some(sum));

    let g = Graph::build(&func);
    let dot = g.graphviz();
    assert!(dot.starts_with("digraph{"));
    assert!(dot.ends_with("}"));
    // values are ovals, constraints are boxes
    assert!(dot.contains("shape=\"oval\""));
    assert!(dot.contains("shape=\"box\""));
    assert!(dot.contains(&format!("{a} + {b}")));
    assert!(dot.contains("style=\"solid\""));
    assert!(!dot.contains("style=\"dashed\""));
}

#[test]
fn test_graphviz_marks_control_edges_dashed() {
    // a future refinement adds a control edge from its bound
    let mut func = Function::new();
    let entry = func.alloc_block();
    let then_b = func.alloc_block();
    let else_b = func.alloc_block();

    let x = func.add_param(Type::INT);
    let n = func.add_param(Type::INT);
    let cond = func.bin_op(entry, BinOp::Lt, x, n);
    func.set_branch(entry, cond, then_b, else_b);
    let y = func.sigma(then_b, x, true);
    func.set_return(then_b, Some(y));
    func.set_return(else_b, None);

    let dot = Graph::build(&func).graphviz();
    assert!(dot.contains("style=\"dashed\""));
    assert!(dot.contains("∩"));
}
