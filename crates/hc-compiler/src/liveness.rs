//! Variable-use (liveness) analysis: backward propagation
//! of "this instruction still needs variable `n`'s current value" across
//! a block and, when a block's start is reached with no local
//! definition, across every predecessor recorded in `jumps_in`. Reaching
//! the program entry with no definition anywhere is a use-before-init
//! source error.
//!
//! No equivalent exists in `examples/original_source/` (the Python
//! project never implemented dataflow optimization); the predecessor
//! bookkeeping this walk rides on — tracking which block feeds a merge
//! point, with a sentinel for "no real predecessor" — follows
//! `examples/navicore-cem3/crates/compiler/src/codegen/state.rs`'s
//! `BranchResult::predecessor`/`UNREACHABLE_PREDECESSOR`, adapted from a
//! single phi-predecessor slot to a full backward walk over `jumps_in`.

use std::collections::HashSet;

use crate::block::{BlockId, Cfg};
use crate::error::HCError;
use crate::instr::Instruction;
use crate::memmap::MemoryMap;

/// `variables_used` for every surviving instruction, indexed in
/// parallel with each block's (post dead-store-elimination) instruction
/// list — exactly what [`crate::merge`] needs to build its
/// used-simultaneously relation.
pub struct Liveness {
    pub used: Vec<Vec<HashSet<String>>>,
}

/// Run the backward propagation for every `reads_variable` instruction
/// reachable via `layout_order`, then delete dead `Save`s.
pub fn analyze(
    cfg: &mut Cfg,
    layout_order: &[BlockId],
    program_entry: BlockId,
    mem: &MemoryMap,
) -> Result<Liveness, HCError> {
    let mut used: Vec<Vec<HashSet<String>>> = cfg
        .blocks
        .iter()
        .map(|b| vec![HashSet::new(); b.instructions.len()])
        .collect();

    for &block in layout_order {
        let len = cfg.block(block).instructions.len();
        for idx in 0..len {
            let reads: Vec<String> = cfg.block(block).instructions[idx]
                .reads()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            for name in reads {
                let line = cfg.block(block).line.unwrap_or(0);
                propagate(cfg, &mut used, mem, block, idx, &name, program_entry, line)?;
            }
        }
    }

    for &block in layout_order {
        let instrs = std::mem::take(&mut cfg.blocks[block].instructions);
        let sets = std::mem::take(&mut used[block]);
        let mut kept_instructions = Vec::with_capacity(instrs.len());
        let mut kept_used = Vec::with_capacity(instrs.len());
        for (instr, set) in instrs.into_iter().zip(sets.into_iter()) {
            let dead = match (&instr, instr.writes()) {
                (Instruction::Save(_), Some(name)) => !set.contains(name),
                _ => false,
            };
            if !dead {
                kept_instructions.push(instr);
                kept_used.push(set);
            }
        }
        cfg.blocks[block].instructions = kept_instructions;
        used[block] = kept_used;
    }

    Ok(Liveness { used })
}

/// Mark every instruction preceding `start_idx` in `block` as needing
/// `name`, stopping at a definition or recursing into predecessors.
#[allow(clippy::too_many_arguments)]
fn propagate(
    cfg: &Cfg,
    used: &mut [Vec<HashSet<String>>],
    mem: &MemoryMap,
    block: BlockId,
    start_idx: usize,
    name: &str,
    program_entry: BlockId,
    origin_line: usize,
) -> Result<(), HCError> {
    let mut idx = start_idx;
    while idx > 0 {
        idx -= 1;
        if used[block][idx].contains(name) {
            return Ok(());
        }
        used[block][idx].insert(name.to_string());
        if cfg.block(block).instructions[idx].writes() == Some(name) {
            return Ok(());
        }
    }

    if mem.contains(name) {
        return Ok(());
    }

    // A loop whose header is the program entry has a back-edge into
    // itself, so `jumps_in` is never empty here even though there is no
    // predecessor that could carry a definition in from outside the
    // program. Catch that case before falling through to the
    // predecessor walk below, which would otherwise just re-mark the
    // same instructions and return `Ok` via the `contains` guard above.
    if block == program_entry {
        return Err(HCError::type_error(
            format!("Variable '{name}' referenced before assignment on line {origin_line}"),
            origin_line,
        ));
    }

    let preds: Vec<BlockId> = cfg.block(block).jumps_in.iter().map(|r| r.src).collect();
    if preds.is_empty() {
        return Err(HCError::type_error(
            format!("Variable '{name}' referenced before assignment on line {origin_line}"),
            origin_line,
        ));
    }

    for pred in preds {
        let pred_len = cfg.block(pred).instructions.len();
        propagate(cfg, used, mem, pred, pred_len, name, program_entry, origin_line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::Loc;

    #[test]
    fn load_after_save_keeps_the_save_and_marks_it_live() {
        let mut cfg = Cfg::new();
        let entry = cfg.new_block(Some(1));
        cfg.block_mut(entry).instructions = vec![
            Instruction::Input,
            Instruction::Save(Loc::Name("x".into())),
            Instruction::Load(Loc::Name("x".into())),
            Instruction::Output,
        ];
        let mem = MemoryMap::default();

        let live = analyze(&mut cfg, &[entry], entry, &mem).unwrap();

        assert_eq!(cfg.block(entry).instructions.len(), 4);
        assert!(live.used[entry][1].contains("x"));
    }

    #[test]
    fn overwritten_save_with_no_intervening_read_is_deleted() {
        let mut cfg = Cfg::new();
        let entry = cfg.new_block(Some(1));
        cfg.block_mut(entry).instructions = vec![
            Instruction::Input,
            Instruction::Save(Loc::Name("x".into())),
            Instruction::Input,
            Instruction::Save(Loc::Name("x".into())),
            Instruction::Load(Loc::Name("x".into())),
            Instruction::Output,
        ];
        let mem = MemoryMap::default();

        analyze(&mut cfg, &[entry], entry, &mem).unwrap();

        assert_eq!(
            cfg.block(entry).instructions,
            vec![
                Instruction::Input,
                Instruction::Input,
                Instruction::Save(Loc::Name("x".into())),
                Instruction::Load(Loc::Name("x".into())),
                Instruction::Output,
            ]
        );
    }

    #[test]
    fn read_with_no_definition_anywhere_is_use_before_init() {
        let mut cfg = Cfg::new();
        let entry = cfg.new_block(Some(1));
        cfg.block_mut(entry).instructions = vec![Instruction::Load(Loc::Name("foo".into())), Instruction::Output];
        let mem = MemoryMap::default();

        let err = analyze(&mut cfg, &[entry], entry, &mem).unwrap_err();
        match err {
            HCError::Type { message, line } => {
                assert_eq!(message, "Variable 'foo' referenced before assignment on line 1");
                assert_eq!(line, 1);
            }
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn init_declared_name_is_pre_initialized() {
        let mut cfg = Cfg::new();
        let entry = cfg.new_block(Some(1));
        cfg.block_mut(entry).instructions = vec![Instruction::Load(Loc::Name("foo".into())), Instruction::Output];
        let mem = crate::memmap::build_memory_map(&[crate::ast::Stmt::InitialValueDeclaration {
            name: "foo".to_string(),
            address: 0,
            line: 1,
        }])
        .unwrap();

        analyze(&mut cfg, &[entry], entry, &mem).unwrap();
    }

    #[test]
    fn difference_pseudo_instruction_keeps_both_operands_saves_alive() {
        // `Difference` is still unexpanded when liveness runs (that's
        // `state`'s job, which runs afterward), so both of its operands
        // must count as reads here or the `Save`s feeding them would be
        // wrongly pruned as dead.
        let mut cfg = Cfg::new();
        let entry = cfg.new_block(Some(1));
        cfg.block_mut(entry).instructions = vec![
            Instruction::Input,
            Instruction::Save(Loc::Name("a".into())),
            Instruction::Input,
            Instruction::Save(Loc::Name("b".into())),
            Instruction::Difference(Loc::Name("a".into()), Loc::Name("b".into())),
            Instruction::Output,
        ];
        let mem = MemoryMap::default();

        let live = analyze(&mut cfg, &[entry], entry, &mem).unwrap();

        assert_eq!(cfg.block(entry).instructions.len(), 6);
        assert!(live.used[entry][3].contains("b"));
        assert!(live.used[entry][1].contains("a"));
    }

    #[test]
    fn read_across_a_predecessor_edge_finds_the_definition() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        let b = cfg.new_block(Some(2));
        cfg.block_mut(a)
            .instructions
            .push(Instruction::Save(Loc::Name("x".into())));
        cfg.set_next(a, b);
        cfg.block_mut(b)
            .instructions
            .push(Instruction::Load(Loc::Name("x".into())));
        cfg.block_mut(b).instructions.push(Instruction::Output);
        let mem = MemoryMap::default();

        analyze(&mut cfg, &[a, b], a, &mem).unwrap();

        assert_eq!(cfg.block(a).instructions.len(), 1);
    }

    #[test]
    fn read_with_no_definition_in_a_self_looping_entry_block_is_use_before_init() {
        // Mirrors `forever\n  output x` with no `init x`: the loop body is
        // the program entry and jumps back into itself, so `jumps_in` is
        // never empty even though nothing outside the loop ever defines
        // `x`.
        let mut cfg = Cfg::new();
        let entry = cfg.new_block(Some(1));
        cfg.block_mut(entry)
            .instructions
            .push(Instruction::Load(Loc::Name("x".into())));
        cfg.block_mut(entry).instructions.push(Instruction::Output);
        cfg.set_next(entry, entry);
        let mem = MemoryMap::default();

        let err = analyze(&mut cfg, &[entry], entry, &mem).unwrap_err();
        match err {
            HCError::Type { message, .. } => {
                assert_eq!(message, "Variable 'x' referenced before assignment on line 1");
            }
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn definition_before_a_self_looping_entry_block_is_still_found() {
        // A variable initialized strictly before the loop is not on the
        // entry block at all, so the self-loop check must not fire for
        // it: `x = 0` / `forever output x` / `x = x + 1`.
        let mut cfg = Cfg::new();
        let init = cfg.new_block(Some(1));
        let body = cfg.new_block(Some(2));
        cfg.block_mut(init)
            .instructions
            .push(Instruction::Save(Loc::Name("x".into())));
        cfg.set_next(init, body);
        cfg.block_mut(body)
            .instructions
            .push(Instruction::Load(Loc::Name("x".into())));
        cfg.block_mut(body).instructions.push(Instruction::Output);
        cfg.set_next(body, body);
        let mem = MemoryMap::default();

        analyze(&mut cfg, &[init, body], init, &mem).unwrap();
    }
}
