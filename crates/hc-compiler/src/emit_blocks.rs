//! Block emission and branch-block construction: walks the lowered AST
//! and builds the [`crate::block::Cfg`] arena, instruction by
//! instruction.
//!
//! Grounded in `examples/original_source/hrminstr.py`'s `Block`/
//! `CompoundBlock`/`ForeverBlock` construction methods (`assign_next`,
//! the `if`/`while` wiring in the old driver) and in
//! `examples/navicore-cem3/crates/compiler/src/codegen/control_flow.rs`'s
//! branch/merge-block style for if/match codegen, adapted to this
//! target's jump-zero/jump-negative primitives instead of LLVM-style
//! conditional branches.

use crate::ast::{Expr, ResultKind, Stmt};
use crate::block::{BlockId, BlockRef, Cfg};
use crate::error::internal_bug;
use crate::instr::{Instruction, JumpKind, Loc};

/// Emit a whole statement list, chaining each statement's exits into the
/// next statement's entry. An empty list synthesizes one empty block, so
/// callers always get something they can point a jump at.
pub fn emit_stmts(cfg: &mut Cfg, stmts: &[Stmt]) -> BlockRef {
    if stmts.is_empty() {
        let id = cfg.new_block(None);
        return BlockRef::Basic(id);
    }

    let mut refs: Vec<BlockRef> = stmts.iter().map(|s| emit_stmt(cfg, s)).collect();
    chain(cfg, &mut refs)
}

/// Wire block-ref `i`'s exits to block-ref `i+1`'s entry via plain
/// `next` jumps, returning a compound spanning the whole chain.
fn chain(cfg: &mut Cfg, refs: &mut [BlockRef]) -> BlockRef {
    for i in 0..refs.len().saturating_sub(1) {
        let dest = refs[i + 1].entry();
        for exit in refs[i].exits() {
            cfg.set_next(exit, dest);
        }
    }
    let entry = refs[0].entry();
    let exits = refs.last().unwrap().exits();
    BlockRef::Compound { entry, exits }
}

fn emit_stmt(cfg: &mut Cfg, stmt: &Stmt) -> BlockRef {
    match stmt {
        Stmt::InitialValueDeclaration { .. } => BlockRef::Basic(cfg.new_block(Some(stmt.line()))),
        Stmt::ExprLine { expr, line } => {
            let id = cfg.new_block(Some(*line));
            emit_value_expr(cfg, id, expr);
            BlockRef::Basic(id)
        }
        Stmt::Output { expr, line } => {
            let id = cfg.new_block(Some(*line));
            emit_value_expr(cfg, id, expr);
            cfg.block_mut(id).instructions.push(Instruction::Output);
            BlockRef::Basic(id)
        }
        Stmt::Forever { body, line } => {
            let entry_ref = emit_stmts(cfg, body);
            let entry = entry_ref.entry();
            for exit in entry_ref.exits() {
                cfg.set_next(exit, entry);
            }
            let _ = line;
            BlockRef::Compound {
                entry,
                exits: Vec::new(),
            }
        }
        Stmt::While { cond, body, line } => {
            let exit_id = cfg.new_block(Some(*line));
            let body_ref = emit_stmts(cfg, body);
            let body_entry = body_ref.entry();
            let cond_entry = create_branch_block(cfg, cond, body_entry, exit_id, *line);
            for exit in body_ref.exits() {
                cfg.set_next(exit, cond_entry);
            }
            BlockRef::Compound {
                entry: cond_entry,
                exits: vec![exit_id],
            }
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
            line,
        } => {
            let then_ref = emit_stmts(cfg, then_body);
            let else_ref = match else_body {
                Some(eb) => emit_stmts(cfg, eb),
                None => BlockRef::Basic(cfg.new_block(Some(*line))),
            };
            let entry = create_branch_block(cfg, cond, then_ref.entry(), else_ref.entry(), *line);
            let mut exits = then_ref.exits();
            exits.extend(else_ref.exits());
            BlockRef::Compound { entry, exits }
        }
    }
}

/// Emit instructions that leave `expr`'s value in the accumulator (and,
/// for `Assignment`, also save it), into block `id`. `expr` must already
/// be in the canonical post-lowering shape the invariants above assume
/// (additive right operands are plain variable refs, multiplication has
/// already been expanded, and so on).
fn emit_value_expr(cfg: &mut Cfg, id: BlockId, expr: &Expr) {
    match expr {
        Expr::Number(n) => cfg.block_mut(id).instructions.push(Instruction::LoadConstant(*n)),
        Expr::VariableRef(name) => cfg
            .block_mut(id)
            .instructions
            .push(Instruction::Load(Loc::Name(name.clone()))),
        Expr::Input => cfg.block_mut(id).instructions.push(Instruction::Input),
        Expr::Assignment(name, inner) => {
            emit_value_expr(cfg, id, inner);
            cfg.block_mut(id)
                .instructions
                .push(Instruction::Save(Loc::Name(name.clone())));
        }
        Expr::Add(l, r) | Expr::Subtract(l, r) => {
            emit_operand(cfg, id, l);
            let name = match &**r {
                Expr::VariableRef(n) => n.clone(),
                other => internal_bug(format!(
                    "post-lowering Add/Subtract right operand must be a VariableRef, got {other:?}"
                )),
            };
            let instr = if matches!(expr, Expr::Add(..)) {
                Instruction::Add(Loc::Name(name))
            } else {
                Instruction::Subtract(Loc::Name(name))
            };
            cfg.block_mut(id).instructions.push(instr);
        }
        Expr::Difference(l, r) => {
            let la = operand_loc(l);
            let ra = operand_loc(r);
            cfg.block_mut(id)
                .instructions
                .push(Instruction::Difference(la, ra));
        }
        Expr::Multiply(..) => internal_bug("Multiply survived to block emission; lowering should have expanded it"),
        Expr::InlineStatementExpr(stmts, inner) => {
            for s in stmts {
                let sub = emit_stmt(cfg, s);
                splice_before(cfg, id, sub);
            }
            emit_value_expr(cfg, id, inner);
        }
        Expr::Boolean(_)
        | Expr::CompareEq(..)
        | Expr::CompareNe(..)
        | Expr::CompareLt(..)
        | Expr::CompareLe(..)
        | Expr::CompareGt(..)
        | Expr::CompareGe(..)
        | Expr::LogicalNot(..)
        | Expr::LogicalAnd(..)
        | Expr::LogicalOr(..) => internal_bug(format!(
            "boolean-valued expression {expr:?} reached value-mode block emission"
        )),
    }
}

/// Load a simple additive operand (`Number` or `VariableRef`) into the
/// accumulator.
fn emit_operand(cfg: &mut Cfg, id: BlockId, operand: &Expr) {
    match operand {
        Expr::Number(n) => cfg.block_mut(id).instructions.push(Instruction::LoadConstant(*n)),
        Expr::VariableRef(name) => cfg
            .block_mut(id)
            .instructions
            .push(Instruction::Load(Loc::Name(name.clone()))),
        other => internal_bug(format!(
            "post-lowering additive left operand must be Number or VariableRef, got {other:?}"
        )),
    }
}

fn operand_loc(operand: &Expr) -> Loc {
    match operand {
        Expr::VariableRef(name) => Loc::Name(name.clone()),
        other => internal_bug(format!("Difference operand must be a VariableRef, got {other:?}")),
    }
}

/// Splice statement-emitted block `sub` in immediately before whatever
/// has already been written into `id`'s instruction stream: all of
/// `id`'s existing instructions move into a fresh continuation block
/// wired after `sub`'s exits, since a single block can't itself contain
/// another's control flow (`sub` may branch).
fn splice_before(cfg: &mut Cfg, id: BlockId, sub: BlockRef) {
    match sub {
        BlockRef::Basic(sub_id) if cfg.block(sub_id).cond.is_none() && cfg.block(sub_id).next.is_none() => {
            // Straight-line: fold its instructions directly into `id`
            // rather than paying for an extra block + jump.
            let mut instrs = std::mem::take(&mut cfg.block_mut(sub_id).instructions);
            let dest = cfg.block_mut(id);
            let mut merged = std::mem::take(&mut dest.instructions);
            instrs.append(&mut merged);
            cfg.block_mut(id).instructions = instrs;
        }
        other => {
            let continuation = cfg.new_block(cfg.block(id).line);
            cfg.block_mut(continuation).instructions = std::mem::take(&mut cfg.block_mut(id).instructions);
            for exit in other.exits() {
                cfg.set_next(exit, continuation);
            }
            // `id` becomes a pure redirect into the prefix; cleanup will
            // fold it away, but wire it now so traversal stays correct.
            cfg.set_next(id, other.entry());
        }
    }
}

/// Build the branch test for `cond`, wiring the taken path to
/// `then_dest` and the not-taken path to `else_dest`. Returns the
/// `BlockId` callers should jump to in order to evaluate `cond` — never
/// a [`BlockRef`], since every outgoing edge is already wired to the
/// caller-supplied destinations.
pub fn create_branch_block(
    cfg: &mut Cfg,
    cond: &Expr,
    then_dest: BlockId,
    else_dest: BlockId,
    line: usize,
) -> BlockId {
    match cond {
        Expr::Boolean(b) => {
            let id = cfg.new_block(Some(line));
            cfg.set_next(id, if *b { then_dest } else { else_dest });
            id
        }
        // Equality/inequality over two boolean-valued operands compiles
        // as XNOR/XOR: branch on `l`, then branch on `r` a second time
        // with then/else swapped for the other outcome of `l`. This
        // builds two independent copies of `r`'s branch block, one per
        // truth value of `l`, rather than reducing to a zero-comparison.
        Expr::CompareEq(l, r) if l.result_kind() == ResultKind::Boolean => {
            let then_via_r_true = create_branch_block(cfg, r, then_dest, else_dest, line);
            let then_via_r_false = create_branch_block(cfg, r, else_dest, then_dest, line);
            create_branch_block(cfg, l, then_via_r_true, then_via_r_false, line)
        }
        Expr::CompareNe(l, r) if l.result_kind() == ResultKind::Boolean => {
            let then_via_r_true = create_branch_block(cfg, r, else_dest, then_dest, line);
            let then_via_r_false = create_branch_block(cfg, r, then_dest, else_dest, line);
            create_branch_block(cfg, l, then_via_r_true, then_via_r_false, line)
        }
        Expr::CompareEq(l, r) | Expr::CompareNe(l, r) => {
            debug_assert!(matches!(**r, Expr::Number(0)));
            let id = cfg.new_block(Some(line));
            emit_value_expr(cfg, id, l);
            let (zero_dest, nonzero_dest) = if matches!(cond, Expr::CompareEq(..)) {
                (then_dest, else_dest)
            } else {
                (else_dest, then_dest)
            };
            cfg.set_cond(id, zero_dest, JumpKind::JumpZero);
            cfg.set_next(id, nonzero_dest);
            id
        }
        Expr::CompareLt(l, r)
        | Expr::CompareLe(l, r)
        | Expr::CompareGt(l, r)
        | Expr::CompareGe(l, r) => {
            debug_assert!(matches!(**r, Expr::Number(0)));
            let (negative_means_true, includes_zero) = match cond {
                Expr::CompareLt(..) => (true, false),
                Expr::CompareLe(..) => (true, true),
                Expr::CompareGt(..) => (false, false),
                Expr::CompareGe(..) => (false, true),
                _ => unreachable!(),
            };
            let id = cfg.new_block(Some(line));
            emit_value_expr(cfg, id, l);

            if negative_means_true {
                cfg.set_cond(id, then_dest, JumpKind::JumpNegative);
                if includes_zero {
                    let zero_test = cfg.new_block(Some(line));
                    cfg.set_next(id, zero_test);
                    cfg.set_cond(zero_test, then_dest, JumpKind::JumpZero);
                    cfg.set_next(zero_test, else_dest);
                } else {
                    cfg.set_next(id, else_dest);
                }
            } else {
                cfg.set_cond(id, else_dest, JumpKind::JumpNegative);
                if includes_zero {
                    cfg.set_next(id, then_dest);
                } else {
                    let zero_test = cfg.new_block(Some(line));
                    cfg.set_next(id, zero_test);
                    cfg.set_cond(zero_test, else_dest, JumpKind::JumpZero);
                    cfg.set_next(zero_test, then_dest);
                }
            }
            id
        }
        Expr::LogicalNot(inner) => create_branch_block(cfg, inner, else_dest, then_dest, line),
        Expr::LogicalAnd(l, r) => {
            let r_entry = create_branch_block(cfg, r, then_dest, else_dest, line);
            create_branch_block(cfg, l, r_entry, else_dest, line)
        }
        Expr::LogicalOr(l, r) => {
            let r_entry = create_branch_block(cfg, r, then_dest, else_dest, line);
            create_branch_block(cfg, l, then_dest, r_entry, line)
        }
        Expr::InlineStatementExpr(stmts, inner) => {
            let inner_entry = create_branch_block(cfg, inner, then_dest, else_dest, line);
            let prefix = emit_stmts(cfg, stmts);
            for exit in prefix.exits() {
                cfg.set_next(exit, inner_entry);
            }
            prefix.entry()
        }
        other => internal_bug(format!("non-branchable expression reached create_branch_block: {other:?}")),
    }
}
