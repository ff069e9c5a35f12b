//! The control-flow graph: an arena of [`BasicBlock`]s plus the
//! [`BlockRef`] sum type that lets compound control structures (loops,
//! if/else, inlined statement sequences) compose without forcing early
//! flattening.
//!
//! Grounded in guidance to treat this graph as genuinely cyclic rather
//! than forcing it into a DAG, and in
//! `examples/navicore-cem3/crates/compiler/src/call_graph.rs`'s
//! `HashMap`/index-based graph style (the teacher's nearest analogue to
//! an owned, mutable, possibly-cyclic graph) — adapted here to a `Vec`
//! arena since block ids are dense from zero.

use std::collections::HashSet;

use crate::error::internal_bug;
use crate::instr::{Instruction, JumpEdge, JumpKind, JumpRef, JumpSlot};

pub type BlockId = usize;

/// A basic block: straight-line instructions, at most one conditional
/// jump, at most one unconditional "next" jump, and the back-edges
/// pointing at it.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub instructions: Vec<Instruction>,
    pub cond: Option<JumpEdge>,
    pub next: Option<JumpEdge>,
    pub label: Option<String>,
    pub jumps_in: Vec<JumpRef>,
    pub entry_state: Option<crate::state::StateSet>,
    pub state_done: bool,
    pub line: Option<usize>,
}

impl BasicBlock {
    fn new(line: Option<usize>) -> Self {
        BasicBlock {
            instructions: Vec::new(),
            cond: None,
            next: None,
            label: None,
            jumps_in: Vec::new(),
            entry_state: None,
            state_done: false,
            line,
        }
    }

    pub fn is_empty_redirect(&self) -> bool {
        self.instructions.is_empty() && self.cond.is_none() && self.next.is_some()
    }
}

/// One entry/multi-exit view over the graph: either a single concrete
/// block, or a composite with a resolved entry and a set of resolved
/// exits. Keeping this as a sum type (rather than a `CompoundBlock`
/// object with mutable back-references) keeps traversal total — callers
/// never need to "unwrap until basic".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    Basic(BlockId),
    Compound { entry: BlockId, exits: Vec<BlockId> },
}

impl BlockRef {
    pub fn entry(&self) -> BlockId {
        match self {
            BlockRef::Basic(id) => *id,
            BlockRef::Compound { entry, .. } => *entry,
        }
    }

    pub fn exits(&self) -> Vec<BlockId> {
        match self {
            BlockRef::Basic(id) => vec![*id],
            BlockRef::Compound { exits, .. } => exits.clone(),
        }
    }
}

/// The block arena for one compilation. Owns every [`BasicBlock`]; all
/// cross-references are `BlockId`s, so the graph can be cyclic (loops)
/// without any `Rc`/`RefCell`.
#[derive(Debug, Default)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
}

impl Cfg {
    pub fn new() -> Self {
        Cfg { blocks: Vec::new() }
    }

    pub fn new_block(&mut self, line: Option<usize>) -> BlockId {
        self.blocks.push(BasicBlock::new(line));
        self.blocks.len() - 1
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id]
    }

    /// Wire `src`'s unconditional "next" edge to `dest`, maintaining
    /// `dest.jumps_in` transactionally with the forward edge.
    pub fn set_next(&mut self, src: BlockId, dest: BlockId) {
        self.unregister_jump_in(src, JumpSlot::Next);
        self.blocks[src].next = Some(JumpEdge::new(dest, JumpKind::Jump));
        self.register_jump_in(src, JumpSlot::Next);
    }

    pub fn set_cond(&mut self, src: BlockId, dest: BlockId, kind: JumpKind) {
        if kind == JumpKind::Jump {
            internal_bug("set_cond called with an unconditional JumpKind");
        }
        self.unregister_jump_in(src, JumpSlot::Cond);
        self.blocks[src].cond = Some(JumpEdge::new(dest, kind));
        self.register_jump_in(src, JumpSlot::Cond);
    }

    pub fn clear_next(&mut self, src: BlockId) {
        self.unregister_jump_in(src, JumpSlot::Next);
        self.blocks[src].next = None;
    }

    pub fn clear_cond(&mut self, src: BlockId) {
        self.unregister_jump_in(src, JumpSlot::Cond);
        self.blocks[src].cond = None;
    }

    /// Retarget an existing edge to a new destination in place (used by
    /// [`crate::cleanup`]'s empty-block redirection), keeping `jumps_in`
    /// consistent on both the old and new destination.
    pub fn retarget(&mut self, src: BlockId, slot: JumpSlot, new_dest: BlockId) {
        self.unregister_jump_in(src, slot);
        let edge = match slot {
            JumpSlot::Cond => self.blocks[src].cond.as_mut(),
            JumpSlot::Next => self.blocks[src].next.as_mut(),
        };
        match edge {
            Some(e) => e.dest = new_dest,
            None => internal_bug("retarget called on a block with no edge in that slot"),
        }
        self.register_jump_in(src, slot);
    }

    fn edge(&self, src: BlockId, slot: JumpSlot) -> Option<JumpEdge> {
        match slot {
            JumpSlot::Cond => self.blocks[src].cond,
            JumpSlot::Next => self.blocks[src].next,
        }
    }

    fn register_jump_in(&mut self, src: BlockId, slot: JumpSlot) {
        if let Some(edge) = self.edge(src, slot) {
            self.blocks[edge.dest].jumps_in.push(JumpRef { src, slot });
        }
    }

    fn unregister_jump_in(&mut self, src: BlockId, slot: JumpSlot) {
        if let Some(edge) = self.edge(src, slot) {
            self.blocks[edge.dest]
                .jumps_in
                .retain(|r| !(r.src == src && r.slot == slot));
        }
    }

    /// Every block reachable from `entry`, DFS order, each visited once.
    pub fn dfs_from(&self, entry: BlockId) -> Vec<BlockId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![entry];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let b = &self.blocks[id];
            // Push next before cond so cond (the "true"/first branch) is
            // visited first: stack is LIFO.
            if let Some(e) = b.next {
                stack.push(e.dest);
            }
            if let Some(e) = b.cond {
                stack.push(e.dest);
            }
        }
        order
    }
}
