//! CFG extraction: turns the tree of [`crate::block::BlockRef`]s
//! built by [`crate::emit_blocks`] into a flat, labeled layout — a DFS
//! walk from the program's first block, deduplicated, with a dedicated
//! end block appended last.
//!
//! Grounded in `examples/original_source/hrminstr.py`'s program-assembly
//! step (which walks the block tree and assigns letter labels) and in
//! the teacher's `fresh_temp`/`fresh_block` counters in
//! `examples/navicore-cem3/crates/compiler/src/codegen/virtual_stack.rs`
//! (deterministic, sequentially-assigned names handed out from a single
//! counter as each one is needed), reused here via
//! [`crate::ast::Namespace`] so labels and source temporaries never
//! collide.

use crate::ast::Namespace;
use crate::block::{BlockId, Cfg};

/// The finished, ready-to-assign layout: block visitation order plus
/// the dedicated end block every program falls through to.
pub struct Layout {
    pub order: Vec<BlockId>,
    pub end_block: BlockId,
}

/// Walk the graph from `program_entry`, assign base-26 labels in
/// visitation order, and append a fresh end block wired to by
/// `program_exit`'s `next` edge.
pub fn extract(cfg: &mut Cfg, program_entry: BlockId, program_exit: BlockId) -> Layout {
    let mut order = cfg.dfs_from(program_entry);

    let end_block = cfg.new_block(None);
    cfg.set_next(program_exit, end_block);
    // `set_next` may have just created the first jumps_in edge into
    // end_block from a node already in `order` (program_exit); the new
    // end block itself is never visited by dfs_from (it didn't exist
    // yet), so it's appended explicitly, and always last.
    order.push(end_block);

    let mut ns = Namespace::new();
    for &id in &order {
        let label = ns.fresh_name();
        cfg.block_mut(id).label = Some(label);
    }

    Layout { order, end_block }
}

/// True if any edge pointing at `id` is a non-implicit jump (i.e. `id`
/// must carry a label in the emitted assembly). Used by [`crate::asm`].
pub fn is_jump_target(cfg: &Cfg, id: BlockId) -> bool {
    cfg.block(id).jumps_in.iter().any(|jref| {
        let edge = match jref.slot {
            crate::instr::JumpSlot::Cond => cfg.block(jref.src).cond,
            crate::instr::JumpSlot::Next => cfg.block(jref.src).next,
        };
        edge.is_some_and(|e| !e.implicit)
    })
}
