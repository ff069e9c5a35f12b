//! Textual emission: prints the final, fully resolved CFG as HRM
//! assembly — the header, then one section per block in layout order
//! (`LABEL:` only where some non-implicit jump targets it, then its
//! instructions, then its conditional and unconditional jumps).
//!
//! Grounded in `examples/original_source/hrminstr.py`'s `Block.to_asm`
//! (label-if-needed, instructions, conditional, then non-implicit next),
//! down to the exact header string the original game expects.

use crate::block::{BlockId, Cfg};
use crate::error::internal_bug;
use crate::extract::is_jump_target;
use crate::instr::{Instruction, JumpKind, Loc};

pub const HEADER: &str = "-- HUMAN RESOURCE MACHINE PROGRAM --\n\n";

/// Render the whole program: header, then every block in `order`.
pub fn emit(cfg: &Cfg, order: &[BlockId]) -> String {
    let mut out = String::from(HEADER);
    for &id in order {
        emit_block(cfg, id, &mut out);
    }
    out
}

fn emit_block(cfg: &Cfg, id: BlockId, out: &mut String) {
    let block = cfg.block(id);

    if is_jump_target(cfg, id) {
        let label = block
            .label
            .as_deref()
            .unwrap_or_else(|| internal_bug("block reached emission with no label assigned"));
        out.push_str(label);
        out.push_str(":\n");
    }

    for instr in &block.instructions {
        out.push_str(&emit_instruction(instr));
        out.push('\n');
    }

    if let Some(cond) = block.cond {
        let mnemonic = match cond.kind {
            JumpKind::JumpZero => "JUMPZ",
            JumpKind::JumpNegative => "JUMPN",
            JumpKind::Jump => internal_bug("a block's conditional slot held an unconditional Jump"),
        };
        out.push_str(mnemonic);
        out.push(' ');
        out.push_str(label_of(cfg, cond.dest));
        out.push('\n');
    }

    if let Some(next) = block.next {
        if !next.implicit {
            out.push_str("JUMP ");
            out.push_str(label_of(cfg, next.dest));
            out.push('\n');
        }
    }
}

fn label_of(cfg: &Cfg, id: BlockId) -> &str {
    cfg.block(id)
        .label
        .as_deref()
        .unwrap_or_else(|| internal_bug("jump destination has no label"))
}

fn emit_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::Input => "INBOX".to_string(),
        Instruction::Output => "OUTBOX".to_string(),
        Instruction::Load(loc) => format!("COPYFROM {}", addr(loc)),
        Instruction::Save(loc) => format!("COPYTO {}", addr(loc)),
        Instruction::Add(loc) => format!("ADD {}", addr(loc)),
        Instruction::Subtract(loc) => format!("SUB {}", addr(loc)),
        Instruction::BumpUp(loc) => format!("BUMPUP {}", addr(loc)),
        Instruction::BumpDown(loc) => format!("BUMPDN {}", addr(loc)),
        Instruction::LoadConstant(_) => internal_bug("LoadConstant pseudo-instruction reached emission"),
        Instruction::Difference(..) => internal_bug("Difference pseudo-instruction reached emission"),
    }
}

fn addr(loc: &Loc) -> i32 {
    match loc {
        Loc::Address(a) => *a,
        Loc::Name(n) => internal_bug(format!("'{n}' reached emission still addressed by name")),
    }
}
