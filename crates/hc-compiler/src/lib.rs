//! HC → HRM compiler.
//!
//! Grounded in the teacher's `crates/compiler/src/lib.rs`: a thin
//! `compile`/`compile_str` entry point that owns pass sequencing, with
//! the actual work living in per-pass modules the way the teacher splits
//! `codegen`/`analysis`/`ir` into siblings rather than one large file.
//! `tracing::debug!` spans mark each pass, mirroring the teacher's LSP
//! and runtime crates' use of `tracing` for pipeline visibility.

pub mod ast;
pub mod asm;
pub mod block;
pub mod cleanup;
pub mod config;
pub mod emit_blocks;
pub mod error;
pub mod extract;
pub mod indent;
pub mod instr;
pub mod lexer;
pub mod liveness;
pub mod lowering;
pub mod memassign;
pub mod memmap;
pub mod merge;
pub mod multiply;
pub mod parser;
pub mod state;

use ast::Namespace;
use block::{BlockId, BlockRef, Cfg};
use config::CompilerConfig;
use error::HCError;

/// Compile one HC source string into HRM assembly text.
///
/// `config.optimize` and `config.explicit_jumps` only ever gate passes
/// that are pure size/layout optimizations — [`merge`]'s variable
/// coalescing and [`cleanup`]'s empty-block collapse and fall-through
/// elision. [`liveness`] (use-before-init soundness) and [`state`]
/// (the only place pseudo-instructions are ever expanded) run
/// unconditionally: they are correctness passes, not optimizations, so
/// every configuration must run them to produce valid assembly at all.
pub fn compile(source: &str, config: &CompilerConfig) -> Result<String, HCError> {
    let stmts = tracing::debug_span!("parse").in_scope(|| indent::parse_program(source))?;

    let mut ns = Namespace::new();
    for stmt in &stmts {
        stmt.collect_names(&mut ns);
    }

    let mem = tracing::debug_span!("memmap").in_scope(|| memmap::build_memory_map(&stmts))?;

    let lowered = tracing::debug_span!("lower").in_scope(|| lowering::lower_program(stmts, &mut ns))?;

    let mut cfg = Cfg::new();
    let program_ref = tracing::debug_span!("emit_blocks").in_scope(|| emit_blocks::emit_stmts(&mut cfg, &lowered));
    let program_entry = program_ref.entry();
    let program_exit = converge(&mut cfg, &program_ref);

    let mut layout = tracing::debug_span!("extract").in_scope(|| extract::extract(&mut cfg, program_entry, program_exit));

    let liveness = tracing::debug_span!("liveness")
        .in_scope(|| liveness::analyze(&mut cfg, &layout.order, program_entry, &mem))?;

    if config.optimize {
        tracing::debug_span!("merge").in_scope(|| merge::merge(&mut cfg, &layout.order, &liveness, &mem));
    }

    tracing::debug_span!("state").in_scope(|| state::analyze(&mut cfg, program_entry))?;

    let keep = [program_entry, layout.end_block];
    tracing::debug_span!("cleanup").in_scope(|| {
        if config.optimize {
            cleanup::collapse_empty_redirects(&mut cfg, &mut layout.order, &keep);
        }
        if !config.explicit_jumps {
            cleanup::mark_fallthroughs(&mut cfg, &layout.order);
        }
    });

    tracing::debug_span!("memassign").in_scope(|| memassign::assign(&mut cfg, &layout.order, &mem));

    Ok(tracing::debug_span!("emit").in_scope(|| asm::emit(&cfg, &layout.order)))
}

/// Wire every exit of `program_ref` into a single block id, needed
/// because [`extract::extract`] takes one `program_exit` but a top-level
/// statement list ending in `if`/`else` can leave more than one open
/// exit.
fn converge(cfg: &mut Cfg, program_ref: &BlockRef) -> BlockId {
    let exits = program_ref.exits();
    if let [only] = exits[..] {
        return only;
    }
    let tail = cfg.new_block(None);
    for exit in exits {
        cfg.set_next(exit, tail);
    }
    tail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_compiles_to_inbox_outbox_loop() {
        let source = "forever\n    output input\n";
        let asm = compile(source, &CompilerConfig::default()).unwrap();
        assert!(asm.starts_with(asm::HEADER));
        assert!(asm.contains("INBOX"));
        assert!(asm.contains("OUTBOX"));
    }

    #[test]
    fn use_before_init_is_a_source_error() {
        let source = "output foo\n";
        let err = compile(source, &CompilerConfig::default()).unwrap_err();
        match err {
            HCError::Type { message, .. } => {
                assert_eq!(message, "Variable 'foo' referenced before assignment on line 1");
            }
            other => panic!("expected a type error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_init_address_is_a_source_error() {
        let source = "init a @ 0\ninit b @ 0\nforever\n    output input\n";
        let err = compile(source, &CompilerConfig::default()).unwrap_err();
        match err {
            HCError::Type { message, .. } => {
                assert_eq!(message, "Multiple variables declared at floor address 0 on line 2");
            }
            other => panic!("expected a type error, got {other:?}"),
        }
    }

    #[test]
    fn unoptimized_and_optimized_builds_both_compile_the_same_program() {
        let source = "forever\n    x = input\n    output x + x\n";
        let optimized = compile(source, &CompilerConfig::default()).unwrap();
        let unoptimized = compile(source, &CompilerConfig::new().with_optimize(false)).unwrap();
        assert!(optimized.contains("OUTBOX"));
        assert!(unoptimized.contains("OUTBOX"));
    }

    #[test]
    fn if_else_as_the_final_top_level_statement_still_reaches_an_end_block() {
        let source = "init x @ 0\nif x != 0\n    output x\nelse\n    output x\n";
        let asm = compile(source, &CompilerConfig::default()).unwrap();
        assert!(asm.contains("OUTBOX"));
    }
}
