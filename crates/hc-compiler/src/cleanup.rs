//! Block/jump cleanup: collapses empty redirect blocks and
//! marks jumps that layout order already makes implicit fall-throughs.
//!
//! Grounded in `examples/original_source/hrminstr.py`'s block-merging
//! pass (`Block.is_empty`/redirect-and-delete) and in the teacher's
//! own "no merge needed" elision in
//! `examples/navicore-cem3/crates/compiler/src/codegen/control_flow.rs`
//! (`codegen_if_statement`/`codegen_match_merge` skip emitting a merge
//! block at all once they can prove every branch into it is
//! unreachable) — generalized here from "skip the block" to "redirect
//! around the block and delete it."

use std::collections::HashSet;

use crate::block::{BlockId, Cfg};
use crate::instr::JumpSlot;

/// Redirect every incoming jump at an empty redirect block to its own
/// `next` target, repeating until no block qualifies, then mark
/// implicit fall-throughs given the final `order`.
///
/// `order` is updated in place: collapsed blocks are removed from it.
/// `end_block` and `program_entry` are never collapsed even if they
/// happen to qualify structurally, since callers hold onto those ids.
pub fn cleanup(cfg: &mut Cfg, order: &mut Vec<BlockId>, keep: &[BlockId]) {
    collapse_empty_redirects(cfg, order, keep);
    mark_fallthroughs(cfg, order);
}

/// Just the empty-redirect-block collapse, with no fall-through elision.
/// Split out for `--explicit-jumps`, which still wants the structural
/// cleanup but none of its jumps turned implicit.
pub fn collapse_empty_redirects(cfg: &mut Cfg, order: &mut Vec<BlockId>, keep: &[BlockId]) {
    let keep: HashSet<BlockId> = keep.iter().copied().collect();

    loop {
        let target = order
            .iter()
            .copied()
            .find(|&id| !keep.contains(&id) && cfg.block(id).is_empty_redirect());
        let Some(id) = target else { break };

        let dest = cfg.block(id).next.expect("is_empty_redirect implies next is Some").dest;
        let incoming: Vec<_> = cfg.block(id).jumps_in.clone();
        for jref in incoming {
            cfg.retarget(jref.src, jref.slot, dest);
        }
        // `id` is leaving the layout entirely; drop its own outgoing
        // edge so it stops cluttering `dest`'s `jumps_in`.
        cfg.clear_next(id);
        order.retain(|&b| b != id);
    }
}

/// Mark every `next` edge whose destination is already the following
/// block in `order` as an implicit fall-through, with no structural
/// change to the graph. Split out (alongside [`collapse_empty_redirects`])
/// for `--explicit-jumps`, which wants this step skipped entirely.
pub fn mark_fallthroughs(cfg: &mut Cfg, order: &[BlockId]) {
    for (i, &id) in order.iter().enumerate() {
        let successor = order.get(i + 1).copied();
        if let Some(mut next) = cfg.block(id).next {
            next.implicit = Some(next.dest) == successor;
            cfg.blocks[id].next = Some(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::JumpKind;

    #[test]
    fn empty_redirect_block_is_removed_and_incoming_jumps_retargeted() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        let empty = cfg.new_block(None);
        let c = cfg.new_block(Some(2));
        cfg.set_next(a, empty);
        cfg.set_next(empty, c);
        let mut order = vec![a, empty, c];

        cleanup(&mut cfg, &mut order, &[a, c]);

        assert_eq!(order, vec![a, c]);
        assert_eq!(cfg.block(a).next.unwrap().dest, c);
    }

    #[test]
    fn adjacent_next_in_layout_order_becomes_implicit() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        let b = cfg.new_block(Some(2));
        cfg.set_next(a, b);
        let mut order = vec![a, b];

        cleanup(&mut cfg, &mut order, &[a, b]);

        assert!(cfg.block(a).next.unwrap().implicit);
    }

    #[test]
    fn non_adjacent_next_stays_explicit() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        let b = cfg.new_block(Some(2));
        let c = cfg.new_block(Some(3));
        cfg.set_cond(a, c, JumpKind::JumpZero);
        cfg.set_next(a, c);
        let mut order = vec![a, b, c];

        cleanup(&mut cfg, &mut order, &[a, b, c]);

        assert!(!cfg.block(a).next.unwrap().implicit);
    }
}
