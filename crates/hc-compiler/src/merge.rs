//! Variable merging: a register-coalescing-style pass
//! that renames never-simultaneously-live temporaries onto a shared
//! name, shrinking the floor footprint [`crate::memassign`] ultimately
//! has to allocate.
//!
//! No equivalent in `examples/original_source/` (the Python project
//! never optimized memory layout); the idea of sharing one piece of
//! limited storage among values that are never needed at once is
//! grounded in the teacher's virtual-stack spilling,
//! `examples/navicore-cem3/crates/compiler/src/codegen/virtual_stack.rs`
//! (`MAX_VIRTUAL_STACK`-bounded reuse of virtual registers, spilling to
//! memory only once the limit is hit) — recast here as an unbounded,
//! whole-program undirected conflict graph with greedy coalescing, where
//! `init`-declared names are pinned/"precolored" nodes that are never
//! merged away.

use std::collections::{HashMap, HashSet};

use crate::block::{BlockId, Cfg};
use crate::instr::{Instruction, Loc};
use crate::liveness::Liveness;
use crate::memmap::MemoryMap;

/// Build the undirected "used-simultaneously" relation: for every
/// instruction, every pair drawn from its `variables_used` set
/// conflicts.
fn build_interference(liveness: &Liveness) -> HashMap<String, HashSet<String>> {
    let mut graph: HashMap<String, HashSet<String>> = HashMap::new();
    for block_sets in &liveness.used {
        for set in block_sets {
            let names: Vec<&String> = set.iter().collect();
            for &n in &names {
                graph.entry(n.clone()).or_default();
            }
            for i in 0..names.len() {
                for j in (i + 1)..names.len() {
                    graph.entry(names[i].clone()).or_default().insert(names[j].clone());
                    graph.entry(names[j].clone()).or_default().insert(names[i].clone());
                }
            }
        }
    }
    graph
}

/// Greedily coalesce non-interfering names onto a shared representative,
/// then rewrite every `Loc::Name` in the graph to its representative.
/// `init`-declared names are keep-alive sinks: other names may be merged
/// into them, but they are never themselves retired.
pub fn merge(cfg: &mut Cfg, layout_order: &[BlockId], liveness: &Liveness, mem: &MemoryMap) {
    let mut graph = build_interference(liveness);
    let all_names: Vec<String> = graph.keys().cloned().collect();
    let mut rename: HashMap<String, String> = HashMap::new();

    let mut candidates = all_names.clone();
    candidates.sort();

    for name in &candidates {
        if rename.contains_key(name) {
            continue;
        }
        // `init`-declared names never get retired into something else,
        // but may still absorb other names below.
        for other in &candidates {
            if other == name || rename.contains_key(other) {
                continue;
            }
            if mem.contains(other) {
                continue; // pinned: never retired
            }
            let conflicts = graph.get(name).is_some_and(|n| n.contains(other));
            if conflicts {
                continue;
            }
            // Merge `other` into `name`: anyone conflicting with `other`
            // now conflicts with `name` too.
            let other_conflicts: HashSet<String> = graph.get(other).cloned().unwrap_or_default();
            for c in &other_conflicts {
                graph.entry(name.clone()).or_default().insert(c.clone());
                graph.entry(c.clone()).or_default().insert(name.clone());
            }
            rename.insert(other.clone(), name.clone());
        }
    }

    if rename.is_empty() {
        return;
    }

    for &block in layout_order {
        for instr in &mut cfg.blocks[block].instructions {
            rewrite_locs(instr, &rename);
        }
    }
}

/// Follow `rename` to the final representative. A name can be retired
/// into a representative that is itself retired again later (`b` into
/// `a`, then `a` into `c`); chasing the chain here keeps every name's
/// references pointed at the one representative that actually survives,
/// rather than parking some of them on an intermediate name that no
/// longer holds its own floor cell.
fn resolve<'a>(rename: &'a HashMap<String, String>, name: &'a str) -> &'a str {
    let mut current = name;
    while let Some(next) = rename.get(current) {
        current = next;
    }
    current
}

fn rewrite_locs(instr: &mut Instruction, rename: &HashMap<String, String>) {
    let targets: Vec<&mut Loc> = match instr {
        Instruction::Load(l) | Instruction::Save(l) | Instruction::Add(l) | Instruction::Subtract(l) => vec![l],
        Instruction::BumpUp(l) | Instruction::BumpDown(l) => vec![l],
        Instruction::Difference(a, b) => vec![a, b],
        Instruction::Input | Instruction::Output | Instruction::LoadConstant(_) => vec![],
    };
    for loc in targets {
        if let Loc::Name(name) = loc {
            let target = resolve(rename, name);
            if target != name {
                *name = target.to_string();
            }
        }
    }
}

#[cfg(test)]
mod resolve_tests {
    use super::resolve;
    use std::collections::HashMap;

    #[test]
    fn chases_a_multi_hop_chain_to_its_final_representative() {
        // "b" was retired into "a", then "a" was itself later retired
        // into "c". A non-transitive lookup would leave "b" pointed at
        // "a", which no longer holds its own floor cell.
        let mut rename = HashMap::new();
        rename.insert("b".to_string(), "a".to_string());
        rename.insert("a".to_string(), "c".to_string());

        assert_eq!(resolve(&rename, "b"), "c");
        assert_eq!(resolve(&rename, "a"), "c");
        assert_eq!(resolve(&rename, "c"), "c");
    }
}
