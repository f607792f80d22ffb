//! SSA function model consumed by the range analysis
//!
//! This is the collaborator surface the analysis walks, not an SSA engine:
//! a value arena plus basic blocks, where every instruction defines exactly
//! one value. φ merges values across predecessors, σ names an operand on a
//! specific edge of a conditional so branch-local refinement is possible.
//! The builder keeps predecessor lists current when terminators are set;
//! there is no parsing, dominance computation, or validation here.

use std::fmt;

use num_bigint::BigInt;

mod function_impl;

/// SSA value ID. Each value is defined exactly once, by a parameter, a
/// constant, or an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(pub u32);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Basic block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Structural type of an SSA value.
///
/// The analysis only distinguishes what it ranges over: integer width and
/// signedness, strings, and channels. Everything else is `Bool` (branch
/// conditions) or `Opaque` (unsupported, skipped during graph
/// construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int { bits: u32, signed: bool },
    String,
    Channel,
    Bool,
    Opaque,
}

impl Type {
    /// Platform-width signed integer
    pub const INT: Type = Type::Int { bits: 64, signed: true };
    /// Platform-width unsigned integer
    pub const UINT: Type = Type::Int { bits: 64, signed: false };
    pub const I8: Type = Type::Int { bits: 8, signed: true };
    pub const I16: Type = Type::Int { bits: 16, signed: true };
    pub const I32: Type = Type::Int { bits: 32, signed: true };
    pub const U8: Type = Type::Int { bits: 8, signed: false };
    pub const U32: Type = Type::Int { bits: 32, signed: false };

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int { .. })
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(self, Type::Int { signed: true, .. })
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(self, Type::Int { signed: false, .. })
    }

    /// True for the three kinds the analysis ranges over.
    pub fn is_supported(&self) -> bool {
        matches!(self, Type::Int { .. } | Type::String | Type::Channel)
    }
}

/// Binary operator token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    /// Comparison inversion: EQ↔NEQ, LT↔GEQ, LEQ↔GTR. Applied when a σ
    /// reaches its use along the false edge, and again when the refined
    /// operand sits on the right-hand side of the predicate.
    pub fn inverted(self) -> BinOp {
        match self {
            BinOp::Eq => BinOp::Ne,
            BinOp::Ne => BinOp::Eq,
            BinOp::Lt => BinOp::Ge,
            BinOp::Ge => BinOp::Lt,
            BinOp::Le => BinOp::Gt,
            BinOp::Gt => BinOp::Le,
            _ => panic!("inversion of non-comparison operator {self:?}"),
        }
    }
}

/// Constant payload: exact integer or string value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Int(BigInt),
    Str(String),
}

/// How a value came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDef {
    /// Function parameter; range is unknown until refined.
    Param,
    /// Literal constant.
    Const(ConstValue),
    /// Result of an instruction in `block`.
    Instr { block: BlockId, kind: InstrKind },
}

/// Instruction variants the analysis recognizes. Each defines the value it
/// is stored under in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrKind {
    BinOp {
        op: BinOp,
        lhs: Value,
        rhs: Value,
    },
    /// Integer type conversion
    Convert {
        x: Value,
    },
    /// Call with a statically resolvable callee, e.g. `strings.Index`
    Call {
        callee: String,
        args: Vec<Value>,
    },
    /// Builtin call, e.g. `len`
    Builtin {
        name: String,
        args: Vec<Value>,
    },
    Slice {
        x: Value,
        low: Option<Value>,
        high: Option<Value>,
    },
    Phi {
        /// One incoming value per predecessor, in predecessor order
        edges: Vec<Value>,
    },
    /// Names `x` on one edge of the conditional ending the single
    /// predecessor block; `branch` tells which edge.
    Sigma {
        x: Value,
        branch: bool,
    },
    MakeChan {
        size: Value,
    },
    ChangeType {
        x: Value,
    },
}

impl InstrKind {
    /// Values this instruction reads, in operand order.
    pub fn operands(&self) -> Vec<Value> {
        match self {
            InstrKind::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            InstrKind::Convert { x }
            | InstrKind::Sigma { x, .. }
            | InstrKind::ChangeType { x } => vec![*x],
            InstrKind::Call { args, .. } | InstrKind::Builtin { args, .. } => args.clone(),
            InstrKind::Slice { x, low, high } => {
                let mut ops = vec![*x];
                ops.extend(low.iter().copied());
                ops.extend(high.iter().copied());
                ops
            }
            InstrKind::Phi { edges } => edges.clone(),
            InstrKind::MakeChan { size } => vec![*size],
        }
    }
}

/// Block terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// Not yet set; must be replaced before analysis
    None,
    Jump {
        target: BlockId,
    },
    Branch {
        cond: Value,
        if_true: BlockId,
        if_false: BlockId,
    },
    Return {
        val: Option<Value>,
    },
}

/// Basic block: an ordered list of instruction values plus a terminator.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub instrs: Vec<Value>,
    pub preds: Vec<BlockId>,
    pub term: Terminator,
}

#[derive(Debug, Clone)]
struct ValueData {
    ty: Type,
    def: ValueDef,
}

/// An SSA function: the value arena and its basic blocks.
#[derive(Debug, Clone, Default)]
pub struct Function {
    blocks: Vec<Block>,
    values: Vec<ValueData>,
}
