//! Method bodies and their control-flow structure
//!
//! Variable numbering convention: `Var(0..num_params)` are the parameters,
//! receiver first for instance methods. The solver wires call bindings from
//! this convention alone, so callee bodies need not exist yet when an edge
//! is added.
//!
//! Block invariant: a call instruction always terminates its block. The
//! interprocedural view relies on this for its O(1) "block contains a call"
//! query and for return-site splicing.

use super::instruction::{CallSiteRef, Instr, NewSiteRef};
use crate::shared::models::{BlockId, MethodId, Selector, TypeName, Var};
use serde::{Deserialize, Serialize};

/// Half-open instruction range forming one basic block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub start: usize,
    pub end: usize,
    pub successors: Vec<BlockId>,
    pub has_call: bool,
}

/// Exception-handler coverage of an instruction range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerRange {
    pub start: usize,
    pub end: usize,
    pub handler: BlockId,
    pub catch_type: Option<TypeName>,
}

/// One method's instruction sequence + control-flow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrBody {
    method: MethodId,
    instructions: Vec<Instr>,
    blocks: Vec<BasicBlock>,
    handlers: Vec<HandlerRange>,
    num_params: u32,
    num_vars: u32,
}

impl IrBody {
    #[inline]
    pub fn method(&self) -> MethodId {
        self.method
    }

    #[inline]
    pub fn instructions(&self) -> &[Instr] {
        &self.instructions
    }

    #[inline]
    pub fn num_params(&self) -> u32 {
        self.num_params
    }

    #[inline]
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    #[inline]
    pub fn params(&self) -> impl Iterator<Item = Var> {
        (0..self.num_params).map(Var)
    }

    #[inline]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    #[inline]
    pub fn handlers(&self) -> &[HandlerRange] {
        &self.handlers
    }

    #[inline]
    pub fn entry_block(&self) -> BlockId {
        BlockId(0)
    }

    /// Blocks ending the method (return, or no local successor)
    pub fn exit_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().filter_map(|b| {
            let returns = self.instructions[b.start..b.end]
                .last()
                .map(|i| matches!(i, Instr::Return { .. }))
                .unwrap_or(false);
            (returns || b.successors.is_empty()).then_some(b.id)
        })
    }

    /// Block covering the given program counter
    pub fn block_containing(&self, pc: u32) -> Option<BlockId> {
        let pc = pc as usize;
        self.blocks
            .iter()
            .find(|b| b.start <= pc && pc < b.end)
            .map(|b| b.id)
    }

    /// All call sites with their program counters
    pub fn call_sites(&self) -> impl Iterator<Item = &CallSiteRef> {
        self.instructions.iter().filter_map(|i| i.call_site())
    }

    /// All allocation sites
    pub fn new_sites(&self) -> impl Iterator<Item = &NewSiteRef> {
        self.instructions.iter().filter_map(|i| i.new_site())
    }

    /// Compute def-use chains over the flat instruction sequence
    pub fn def_use(&self) -> DefUse {
        let n = self.num_vars as usize;
        let mut defs: Vec<Option<u32>> = vec![None; n];
        let mut uses: Vec<Vec<u32>> = vec![Vec::new(); n];

        let def = |v: Var, pc: usize, defs: &mut Vec<Option<u32>>| {
            if defs[v.index()].is_none() {
                defs[v.index()] = Some(pc as u32);
            }
        };
        let used = |v: Var, pc: usize, uses: &mut Vec<Vec<u32>>| {
            uses[v.index()].push(pc as u32);
        };

        for (pc, instr) in self.instructions.iter().enumerate() {
            match instr {
                Instr::New { dest, .. } => def(*dest, pc, &mut defs),
                Instr::Assign { dest, src } => {
                    def(*dest, pc, &mut defs);
                    used(*src, pc, &mut uses);
                }
                Instr::GetField { dest, obj, .. } => {
                    def(*dest, pc, &mut defs);
                    used(*obj, pc, &mut uses);
                }
                Instr::PutField { obj, value, .. } => {
                    used(*obj, pc, &mut uses);
                    used(*value, pc, &mut uses);
                }
                Instr::GetStatic { dest, .. } => def(*dest, pc, &mut defs),
                Instr::PutStatic { value, .. } => used(*value, pc, &mut uses),
                Instr::ArrayLoad { dest, array } => {
                    def(*dest, pc, &mut defs);
                    used(*array, pc, &mut uses);
                }
                Instr::ArrayStore { array, value } => {
                    used(*array, pc, &mut uses);
                    used(*value, pc, &mut uses);
                }
                Instr::Invoke {
                    receiver,
                    args,
                    dest,
                    ..
                } => {
                    if let Some(r) = receiver {
                        used(*r, pc, &mut uses);
                    }
                    for a in args {
                        used(*a, pc, &mut uses);
                    }
                    if let Some(d) = dest {
                        def(*d, pc, &mut defs);
                    }
                }
                Instr::Return { value } => {
                    if let Some(v) = value {
                        used(*v, pc, &mut uses);
                    }
                }
                Instr::Opaque { .. } => {}
            }
        }

        DefUse { defs, uses }
    }
}

/// Definition and use sites per variable
#[derive(Debug, Clone)]
pub struct DefUse {
    defs: Vec<Option<u32>>,
    uses: Vec<Vec<u32>>,
}

impl DefUse {
    #[inline]
    pub fn def_site(&self, var: Var) -> Option<u32> {
        self.defs.get(var.index()).copied().flatten()
    }

    #[inline]
    pub fn use_sites(&self, var: Var) -> &[u32] {
        self.uses.get(var.index()).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Incremental body assembly; used by fixtures and by IR synthesis
#[derive(Debug)]
pub struct IrBuilder {
    method: MethodId,
    instructions: Vec<Instr>,
    block_starts: Vec<usize>,
    edges: Vec<(BlockId, BlockId)>,
    num_params: u32,
    next_var: u32,
    handlers: Vec<HandlerRange>,
}

impl IrBuilder {
    pub fn new(method: MethodId, num_params: u32) -> Self {
        Self {
            method,
            instructions: Vec::new(),
            block_starts: vec![0],
            edges: Vec::new(),
            num_params,
            next_var: num_params,
            handlers: Vec::new(),
        }
    }

    #[inline]
    pub fn param(&self, index: u32) -> Var {
        debug_assert!(index < self.num_params);
        Var(index)
    }

    #[inline]
    pub fn fresh_var(&mut self) -> Var {
        let v = Var(self.next_var);
        self.next_var += 1;
        v
    }

    #[inline]
    fn pc(&self) -> u32 {
        self.instructions.len() as u32
    }

    #[inline]
    fn current_block(&self) -> BlockId {
        BlockId(self.block_starts.len() as u32 - 1)
    }

    pub fn new_instance(&mut self, dest: Var, ty: impl Into<TypeName>) -> u32 {
        let pc = self.pc();
        self.instructions.push(Instr::New {
            dest,
            site: NewSiteRef::new(pc, ty),
        });
        pc
    }

    pub fn new_container(
        &mut self,
        dest: Var,
        ty: impl Into<TypeName>,
        element: impl Into<TypeName>,
    ) -> u32 {
        let pc = self.pc();
        self.instructions.push(Instr::New {
            dest,
            site: NewSiteRef::new(pc, ty).with_element(element),
        });
        pc
    }

    pub fn assign(&mut self, dest: Var, src: Var) {
        self.instructions.push(Instr::Assign { dest, src });
    }

    pub fn get_field(&mut self, dest: Var, obj: Var, field: crate::shared::models::FieldRef) {
        self.instructions.push(Instr::GetField { dest, obj, field });
    }

    pub fn put_field(&mut self, obj: Var, field: crate::shared::models::FieldRef, value: Var) {
        self.instructions.push(Instr::PutField { obj, field, value });
    }

    pub fn get_static(&mut self, dest: Var, field: crate::shared::models::FieldRef) {
        self.instructions.push(Instr::GetStatic { dest, field });
    }

    pub fn put_static(&mut self, field: crate::shared::models::FieldRef, value: Var) {
        self.instructions.push(Instr::PutStatic { field, value });
    }

    pub fn array_load(&mut self, dest: Var, array: Var) {
        self.instructions.push(Instr::ArrayLoad { dest, array });
    }

    pub fn array_store(&mut self, array: Var, value: Var) {
        self.instructions.push(Instr::ArrayStore { array, value });
    }

    pub fn opaque(&mut self, mnemonic: impl Into<String>) {
        self.instructions.push(Instr::Opaque {
            mnemonic: mnemonic.into(),
        });
    }

    /// Emit a call. Ends the current block (see module invariant); the next
    /// instruction starts the fall-through return-site block.
    pub fn invoke(
        &mut self,
        declared_class: impl Into<TypeName>,
        selector: Selector,
        kind: super::DispatchKind,
        receiver: Option<Var>,
        args: Vec<Var>,
        dest: Option<Var>,
    ) -> u32 {
        let pc = self.pc();
        self.instructions.push(Instr::Invoke {
            site: CallSiteRef {
                pc,
                declared_class: declared_class.into(),
                selector,
                kind,
            },
            receiver,
            args,
            dest,
        });
        self.split_block();
        pc
    }

    pub fn ret(&mut self, value: Option<Var>) {
        self.instructions.push(Instr::Return { value });
        // terminator: no fall-through edge out of this block
        self.block_starts.push(self.instructions.len());
    }

    /// End the current block with a fall-through edge to a fresh block
    pub fn split_block(&mut self) -> BlockId {
        let from = self.current_block();
        self.block_starts.push(self.instructions.len());
        let to = self.current_block();
        self.edges.push((from, to));
        to
    }

    /// Explicit control-flow edge (branches, loops)
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.edges.push((from, to));
    }

    pub fn add_handler(&mut self, range: HandlerRange) {
        self.handlers.push(range);
    }

    pub fn finish(mut self) -> IrBody {
        // drop a trailing empty block left by a final terminator
        while self.block_starts.len() > 1
            && *self.block_starts.last().unwrap() == self.instructions.len()
        {
            self.block_starts.pop();
        }

        let n = self.block_starts.len();
        let mut blocks = Vec::with_capacity(n);
        for i in 0..n {
            let start = self.block_starts[i];
            let end = if i + 1 < n {
                self.block_starts[i + 1]
            } else {
                self.instructions.len()
            };
            let has_call = self.instructions[start..end].iter().any(Instr::is_call);
            blocks.push(BasicBlock {
                id: BlockId(i as u32),
                start,
                end,
                successors: Vec::new(),
                has_call,
            });
        }
        for (from, to) in self.edges {
            if to.index() < blocks.len() && !blocks[from.index()].successors.contains(&to) {
                blocks[from.index()].successors.push(to);
            }
        }

        IrBody {
            method: self.method,
            instructions: self.instructions,
            blocks,
            handlers: self.handlers,
            num_params: self.num_params,
            num_vars: self.next_var,
        }
    }
}
