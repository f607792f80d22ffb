//! Constraint graph construction
//!
//! One forward pass over the function emits a constraint per supported
//! instruction (constants first, each interned once), then wires edges:
//! operand → constraint and constraint → result for data flow, endpoint →
//! constraint (dashed in the debug dump) for future refinement bounds.
//! Vertices live in an arena addressed by index; edges are index pairs, so
//! the cyclic φ structure needs no back-references.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::ssa::{BinOp, Block, ConstValue, Function, InstrKind, Terminator, Type, Value, ValueDef};

use super::constraint::Constraint;
use super::interval::IntInterval;
use super::ranges::Ranges;
use super::scc;
use super::zext::Z;
use super::BuildError;

pub(crate) type VertexId = usize;
pub(crate) type ConstraintId = usize;

/// What a vertex stands for: an SSA value or a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VertexKind {
    Value(Value),
    Constraint(ConstraintId),
}

#[derive(Debug)]
pub(crate) struct Vertex {
    pub kind: VertexKind,
    pub scc: usize,
    pub succs: Vec<Edge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub control: bool,
}

/// The constraint graph of one SSA function, ready to solve.
pub struct Graph<'f> {
    pub(crate) func: &'f Function,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) value_vertex: HashMap<Value, VertexId>,
    pub(crate) constraints: Vec<Constraint>,
    constraint_vertex: Vec<VertexId>,
    pub(crate) sccs: Vec<Vec<VertexId>>,
    /// Outgoing edges per component
    pub(crate) scc_edges: Vec<Vec<Edge>>,
    /// Future constraints pinned to the component of their control source
    pub(crate) futures: Vec<Vec<ConstraintId>>,
    /// Future constraint targeting a given σ value
    pub(crate) future_of: HashMap<Value, ConstraintId>,
    pub(crate) ranges: Ranges<'f>,
}

impl<'f> Graph<'f> {
    /// Walk `func` and build its constraint graph, including the SCC
    /// partition and the per-component caches the solver consumes.
    pub fn build(func: &'f Function) -> Graph<'f> {
        let mut cs: Vec<Constraint> = Vec::new();

        // Constants first: a point interval per distinct constant operand.
        let mut seen: HashSet<Value> = HashSet::new();
        for block in func.blocks() {
            for &ins in &block.instrs {
                let ValueDef::Instr { kind, .. } = func.def(ins) else {
                    continue;
                };
                for op in kind.operands() {
                    let Some(konst) = func.const_value(op) else {
                        continue;
                    };
                    if !seen.insert(op) {
                        continue;
                    }
                    match konst {
                        ConstValue::Int(n) => {
                            let z = Z::from(n.clone());
                            cs.push(Constraint::IntInterval {
                                y: op,
                                interval: IntInterval::new(z.clone(), z),
                            });
                        }
                        ConstValue::Str(s) => {
                            let n = Z::from(s.len() as i64);
                            cs.push(Constraint::StringInterval {
                                y: op,
                                length: IntInterval::new(n.clone(), n),
                            });
                        }
                    }
                }
            }
        }

        for block in func.blocks() {
            for &ins in &block.instrs {
                let ValueDef::Instr { kind, .. } = func.def(ins) else {
                    continue;
                };
                match kind {
                    InstrKind::Convert { x } => {
                        if func.ty(ins).is_integer() {
                            cs.push(Constraint::IntConversion { y: ins, x: *x });
                        }
                    }
                    InstrKind::Call { callee, args } => {
                        if let Some(c) = intrinsic_constraint(ins, callee, args) {
                            cs.push(c);
                        }
                    }
                    InstrKind::Builtin { name, args } => {
                        if name == "len" && args.len() == 1 && func.ty(args[0]) == Type::String {
                            cs.push(Constraint::StringLength { y: ins, x: args[0] });
                        }
                    }
                    InstrKind::BinOp { op, lhs, rhs } => match func.ty(*lhs) {
                        Type::Int { .. } => {
                            // Division, remainder, and shifts are not
                            // modeled; their targets keep the clamped
                            // default.
                            let c = match op {
                                BinOp::Add => Some(Constraint::IntAdd {
                                    y: ins,
                                    a: *lhs,
                                    b: *rhs,
                                }),
                                BinOp::Sub => Some(Constraint::IntSub {
                                    y: ins,
                                    a: *lhs,
                                    b: *rhs,
                                }),
                                BinOp::Mul => Some(Constraint::IntMul {
                                    y: ins,
                                    a: *lhs,
                                    b: *rhs,
                                }),
                                _ => None,
                            };
                            cs.extend(c);
                        }
                        Type::String => {
                            if *op == BinOp::Add {
                                cs.push(Constraint::StringConcat {
                                    y: ins,
                                    a: *lhs,
                                    b: *rhs,
                                });
                            }
                        }
                        _ => {}
                    },
                    InstrKind::Slice { x, low, high } => {
                        if func.ty(*x) == Type::String {
                            cs.push(Constraint::StringSlice {
                                y: ins,
                                x: *x,
                                low: *low,
                                high: *high,
                            });
                        }
                    }
                    InstrKind::Phi { edges } => {
                        if func.ty(ins).is_supported() {
                            cs.push(Constraint::Phi {
                                y: ins,
                                vars: edges.clone(),
                            });
                        }
                    }
                    InstrKind::Sigma { x, branch } => {
                        match sigma_constraint(func, block, ins, *x, *branch) {
                            Ok(Some(c)) => cs.push(c),
                            Ok(None) => {}
                            Err(err) => debug!(sigma = %ins, error = %err, "skipping σ refinement"),
                        }
                    }
                    InstrKind::MakeChan { size } => {
                        cs.push(Constraint::MakeChannel { y: ins, size: *size });
                    }
                    InstrKind::ChangeType { x } => {
                        if func.ty(*x) == Type::Channel {
                            cs.push(Constraint::ChannelChangeType { y: ins, x: *x });
                        }
                    }
                }
            }
        }

        let mut g = Graph {
            func,
            vertices: Vec::new(),
            edges: Vec::new(),
            value_vertex: HashMap::new(),
            constraint_vertex: vec![usize::MAX; cs.len()],
            constraints: cs,
            sccs: Vec::new(),
            scc_edges: Vec::new(),
            futures: Vec::new(),
            future_of: HashMap::new(),
            ranges: Ranges::new(func),
        };

        for cid in 0..g.constraints.len() {
            let (ops, futs, y) = {
                let c = &g.constraints[cid];
                (c.operands(), c.futures(), c.y())
            };
            // operand → constraint (data), endpoint → constraint (control)
            for op in ops {
                let from = g.value_vertex_id(op);
                let to = g.constraint_vertex_id(cid);
                g.add_edge(from, to, false);
            }
            for op in futs {
                let from = g.value_vertex_id(op);
                let to = g.constraint_vertex_id(cid);
                g.add_edge(from, to, true);
            }
            // constraint → its result
            let from = g.constraint_vertex_id(cid);
            let to = g.value_vertex_id(y);
            g.add_edge(from, to, false);
            if g.constraints[cid].is_future() {
                g.future_of.insert(y, cid);
            }
        }

        g.partition();
        debug!(
            constraints = g.constraints.len(),
            vertices = g.vertices.len(),
            components = g.sccs.len(),
            "constraint graph built"
        );
        g
    }

    fn value_vertex_id(&mut self, v: Value) -> VertexId {
        if let Some(&id) = self.value_vertex.get(&v) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(Vertex {
            kind: VertexKind::Value(v),
            scc: 0,
            succs: Vec::new(),
        });
        self.value_vertex.insert(v, id);
        id
    }

    fn constraint_vertex_id(&mut self, cid: ConstraintId) -> VertexId {
        if self.constraint_vertex[cid] != usize::MAX {
            return self.constraint_vertex[cid];
        }
        let id = self.vertices.len();
        self.vertices.push(Vertex {
            kind: VertexKind::Constraint(cid),
            scc: 0,
            succs: Vec::new(),
        });
        self.constraint_vertex[cid] = id;
        id
    }

    fn add_edge(&mut self, from: VertexId, to: VertexId, control: bool) {
        let e = Edge { from, to, control };
        self.edges.push(e);
        self.vertices[from].succs.push(e);
    }

    /// Assign component ids and fill the per-component caches.
    fn partition(&mut self) {
        let succs: Vec<Vec<usize>> = self
            .vertices
            .iter()
            .map(|v| v.succs.iter().map(|e| e.to).collect())
            .collect();
        let (scc_of, count) = scc::strongly_connected(&succs);
        for (vid, scc) in scc_of.into_iter().enumerate() {
            self.vertices[vid].scc = scc;
        }
        self.sccs = vec![Vec::new(); count];
        for vid in 0..self.vertices.len() {
            let scc = self.vertices[vid].scc;
            self.sccs[scc].push(vid);
        }
        self.scc_edges = vec![Vec::new(); count];
        self.futures = vec![Vec::new(); count];
        for i in 0..self.edges.len() {
            let e = self.edges[i];
            let from_scc = self.vertices[e.from].scc;
            self.scc_edges[from_scc].push(e);
            if !e.control {
                continue;
            }
            if let VertexKind::Constraint(cid) = self.vertices[e.to].kind {
                if self.constraints[cid].is_future() {
                    self.futures[from_scc].push(cid);
                }
            }
        }
    }

    /// Debug rendering: ovals are values, boxes are constraints, fill
    /// color encodes the component, dashed edges are control edges.
    pub fn graphviz(&self) -> String {
        let mut lines = vec!["digraph{".to_owned()];
        for (i, v) in self.vertices.iter().enumerate() {
            let (shape, label) = match v.kind {
                VertexKind::Value(val) => ("oval", val.to_string()),
                VertexKind::Constraint(cid) => ("box", self.constraints[cid].to_string()),
            };
            lines.push(format!(
                "n{} [shape=\"{}\", label=\"{}\", colorscheme=spectral11, style=\"filled\", fillcolor=\"{}\"]",
                i + 1,
                shape,
                label,
                (v.scc % 11) + 1
            ));
        }
        for e in &self.edges {
            let style = if e.control { "dashed" } else { "solid" };
            lines.push(format!(
                "n{} -> n{} [style=\"{}\"]",
                e.from + 1,
                e.to + 1,
                style
            ));
        }
        lines.push("}".to_owned());
        lines.join("\n")
    }
}

/// Fixed-interval and copy constraints for calls with a known contract.
fn intrinsic_constraint(y: Value, callee: &str, args: &[Value]) -> Option<Constraint> {
    match callee {
        "strings.Index" | "strings.IndexAny" | "strings.IndexByte" | "strings.IndexFunc"
        | "strings.IndexRune" | "strings.LastIndex" | "strings.LastIndexAny"
        | "strings.LastIndexByte" | "strings.LastIndexFunc" => Some(Constraint::IntInterval {
            y,
            interval: IntInterval::new(Z::from(-1), Z::PosInf),
        }),
        "strings.Compare" => Some(Constraint::IntInterval {
            y,
            interval: IntInterval::new(Z::from(-1), Z::from(1)),
        }),
        "strings.Count" => Some(Constraint::IntInterval {
            y,
            interval: IntInterval::new(Z::zero(), Z::PosInf),
        }),
        "strings.Title" | "strings.ToLower" | "strings.ToLowerSpecial" | "strings.ToTitle"
        | "strings.ToTitleSpecial" | "strings.ToUpper" | "strings.ToUpperSpecial" => {
            args.first().map(|&x| Constraint::Copy { y, x })
        }
        _ => None,
    }
}

/// Derive the refinement constraint for a σ from the comparison that
/// dominates it. The predicate is normalized to `refined op other` form;
/// the interval follows the normalized operator.
fn sigma_constraint(
    func: &Function,
    block: &Block,
    y: Value,
    x: Value,
    branch: bool,
) -> Result<Option<Constraint>, BuildError> {
    let &pred = block.preds.first().ok_or(BuildError::MalformedSsa)?;
    let Terminator::Branch { cond, .. } = &func.block(pred).term else {
        return Err(BuildError::MalformedSsa);
    };
    let ValueDef::Instr {
        kind: InstrKind::BinOp { op, lhs, rhs },
        ..
    } = func.def(*cond)
    else {
        return Err(BuildError::MalformedSsa);
    };
    if !op.is_comparison() {
        return Err(BuildError::MalformedSsa);
    }
    let (mut op, lhs, rhs) = (*op, *lhs, *rhs);
    if !branch {
        op = op.inverted();
    }
    match func.ty(y) {
        Type::Int { .. } => sigma_integer(func, y, x, op, lhs, rhs),
        Type::String => sigma_string(func, y, op, lhs, rhs),
        _ => Err(BuildError::UnsupportedType(y)),
    }
}

fn sigma_integer(
    func: &Function,
    y: Value,
    x: Value,
    mut op: BinOp,
    lhs: Value,
    rhs: Value,
) -> Result<Option<Constraint>, BuildError> {
    let other = if lhs == x {
        rhs
    } else if rhs == x {
        op = op.inverted();
        lhs
    } else {
        return Err(BuildError::MalformedSsa);
    };
    if let Some(ConstValue::Int(n)) = func.const_value(other) {
        let Some(interval) = comparison_interval(op, Z::from(n.clone())) else {
            return Ok(None);
        };
        return Ok(Some(Constraint::IntIntersection { y, x, interval }));
    }
    Ok(future_refinement(y, x, op, other))
}

fn sigma_string(
    func: &Function,
    y: Value,
    mut op: BinOp,
    lhs: Value,
    rhs: Value,
) -> Result<Option<Constraint>, BuildError> {
    let len_subject = |v: Value| -> Option<Value> {
        match func.def(v) {
            ValueDef::Instr {
                kind: InstrKind::Builtin { name, args },
                ..
            } if name == "len" && args.len() == 1 => Some(args[0]),
            _ => None,
        }
    };
    let (subject, other) = if let Some(s) = len_subject(lhs) {
        (s, rhs)
    } else if let Some(s) = len_subject(rhs) {
        op = op.inverted();
        (s, lhs)
    } else {
        // comparisons not over len(s), e.g. string equality
        return Ok(None);
    };
    let Some(ConstValue::Int(n)) = func.const_value(other) else {
        return Ok(None);
    };
    let Some(interval) = comparison_interval(op, Z::from(n.clone())) else {
        return Ok(None);
    };
    Ok(Some(Constraint::StringIntersection {
        y,
        x: subject,
        interval,
    }))
}

/// Interval implied by `refined op v`, with ±1 adjustment for the strict
/// inequalities. `Ne` refines nothing.
fn comparison_interval(op: BinOp, v: Z) -> Option<IntInterval> {
    match op {
        BinOp::Eq => Some(IntInterval::new(v.clone(), v)),
        BinOp::Gt => Some(IntInterval::new(v.add(&Z::from(1)), Z::PosInf)),
        BinOp::Ge => Some(IntInterval::new(v, Z::PosInf)),
        BinOp::Lt => Some(IntInterval::new(Z::NegInf, v.sub(&Z::from(1)))),
        BinOp::Le => Some(IntInterval::new(Z::NegInf, v)),
        _ => None,
    }
}

/// Refinement whose bound is another value: resolvable only once that
/// value's range is known.
fn future_refinement(y: Value, x: Value, op: BinOp, other: Value) -> Option<Constraint> {
    let (lower, lower_offset, upper, upper_offset) = match op {
        BinOp::Eq => (Some(other), Z::zero(), Some(other), Z::zero()),
        BinOp::Gt => (Some(other), Z::from(1), None, Z::zero()),
        BinOp::Ge => (Some(other), Z::zero(), None, Z::zero()),
        BinOp::Lt => (None, Z::zero(), Some(other), Z::from(-1)),
        BinOp::Le => (None, Z::zero(), Some(other), Z::zero()),
        _ => return None,
    };
    Some(Constraint::FutureIntIntersection {
        y,
        x,
        lower,
        lower_offset,
        upper,
        upper_offset,
        interval: IntInterval::unknown(),
        resolved: false,
    })
}
