use super::*;

impl Block {
    fn new(id: BlockId) -> Self {
        Self {
            id,
            instrs: Vec::new(),
            preds: Vec::new(),
            term: Terminator::None,
        }
    }

    /// Successor block IDs, from the terminator.
    pub fn successors(&self) -> Vec<BlockId> {
        match &self.term {
            Terminator::Jump { target } => vec![*target],
            Terminator::Branch {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
            Terminator::Return { .. } | Terminator::None => vec![],
        }
    }
}

impl Function {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new empty basic block.
    pub fn alloc_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new(id));
        id
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn ty(&self, v: Value) -> Type {
        self.values[v.0 as usize].ty
    }

    pub fn def(&self, v: Value) -> &ValueDef {
        &self.values[v.0 as usize].def
    }

    pub fn is_const(&self, v: Value) -> bool {
        matches!(self.def(v), ValueDef::Const(_))
    }

    /// Constant payload of `v`, if it is a constant.
    pub fn const_value(&self, v: Value) -> Option<&ConstValue> {
        match self.def(v) {
            ValueDef::Const(c) => Some(c),
            _ => None,
        }
    }

    fn alloc_value(&mut self, ty: Type, def: ValueDef) -> Value {
        let v = Value(self.values.len() as u32);
        self.values.push(ValueData { ty, def });
        v
    }

    fn push_instr(&mut self, block: BlockId, ty: Type, kind: InstrKind) -> Value {
        let v = self.alloc_value(ty, ValueDef::Instr { block, kind });
        self.blocks[block.0 as usize].instrs.push(v);
        v
    }

    /// Add a function parameter of the given type.
    pub fn add_param(&mut self, ty: Type) -> Value {
        self.alloc_value(ty, ValueDef::Param)
    }

    /// Intern a platform-width signed integer constant.
    pub fn const_int(&mut self, n: i64) -> Value {
        self.const_int_typed(n, Type::INT)
    }

    pub fn const_int_typed(&mut self, n: i64, ty: Type) -> Value {
        self.alloc_value(ty, ValueDef::Const(ConstValue::Int(BigInt::from(n))))
    }

    pub fn const_str(&mut self, s: &str) -> Value {
        self.alloc_value(Type::String, ValueDef::Const(ConstValue::Str(s.to_owned())))
    }

    /// Append a binary operation. Comparisons produce a `Bool`, everything
    /// else the type of the left operand.
    pub fn bin_op(&mut self, block: BlockId, op: BinOp, lhs: Value, rhs: Value) -> Value {
        let ty = if op.is_comparison() {
            Type::Bool
        } else {
            self.ty(lhs)
        };
        self.push_instr(block, ty, InstrKind::BinOp { op, lhs, rhs })
    }

    /// Append an integer conversion of `x` to `ty`.
    pub fn convert(&mut self, block: BlockId, x: Value, ty: Type) -> Value {
        self.push_instr(block, ty, InstrKind::Convert { x })
    }

    pub fn call(&mut self, block: BlockId, callee: &str, args: Vec<Value>, ty: Type) -> Value {
        self.push_instr(
            block,
            ty,
            InstrKind::Call {
                callee: callee.to_owned(),
                args,
            },
        )
    }

    pub fn builtin(&mut self, block: BlockId, name: &str, args: Vec<Value>, ty: Type) -> Value {
        self.push_instr(
            block,
            ty,
            InstrKind::Builtin {
                name: name.to_owned(),
                args,
            },
        )
    }

    /// Append `x[low:high]`; the result has the type of `x`.
    pub fn slice(
        &mut self,
        block: BlockId,
        x: Value,
        low: Option<Value>,
        high: Option<Value>,
    ) -> Value {
        let ty = self.ty(x);
        self.push_instr(block, ty, InstrKind::Slice { x, low, high })
    }

    /// Append a φ merging `edges`, one per predecessor in predecessor
    /// order. The result takes the type of the first edge.
    pub fn phi(&mut self, block: BlockId, edges: Vec<Value>) -> Value {
        let ty = self.ty(edges[0]);
        self.push_instr(block, ty, InstrKind::Phi { edges })
    }

    /// Add an incoming edge to an existing φ. Loop φs reference values
    /// defined later in the body, so they are built incrementally.
    pub fn add_phi_edge(&mut self, phi: Value, incoming: Value) {
        match &mut self.values[phi.0 as usize].def {
            ValueDef::Instr {
                kind: InstrKind::Phi { edges },
                ..
            } => edges.push(incoming),
            other => panic!("add_phi_edge on non-φ value {phi}: {other:?}"),
        }
    }

    /// Append a σ naming `x` on the `branch` edge of the conditional that
    /// ends this block's single predecessor.
    pub fn sigma(&mut self, block: BlockId, x: Value, branch: bool) -> Value {
        let ty = self.ty(x);
        self.push_instr(block, ty, InstrKind::Sigma { x, branch })
    }

    pub fn make_chan(&mut self, block: BlockId, size: Value) -> Value {
        self.push_instr(block, Type::Channel, InstrKind::MakeChan { size })
    }

    pub fn change_type(&mut self, block: BlockId, x: Value, ty: Type) -> Value {
        self.push_instr(block, ty, InstrKind::ChangeType { x })
    }

    pub fn set_jump(&mut self, block: BlockId, target: BlockId) {
        self.blocks[block.0 as usize].term = Terminator::Jump { target };
        self.add_pred(target, block);
    }

    pub fn set_branch(&mut self, block: BlockId, cond: Value, if_true: BlockId, if_false: BlockId) {
        self.blocks[block.0 as usize].term = Terminator::Branch {
            cond,
            if_true,
            if_false,
        };
        self.add_pred(if_true, block);
        self.add_pred(if_false, block);
    }

    pub fn set_return(&mut self, block: BlockId, val: Option<Value>) {
        self.blocks[block.0 as usize].term = Terminator::Return { val };
    }

    fn add_pred(&mut self, block: BlockId, pred: BlockId) {
        let preds = &mut self.blocks[block.0 as usize].preds;
        if !preds.contains(&pred) {
            preds.push(pred);
        }
    }
}
