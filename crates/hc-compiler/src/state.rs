//! Accumulator-state analysis: a forward monotone dataflow
//! fixpoint over a small constraint lattice, used to eliminate redundant
//! loads/saves and to expand the `LoadConstant`/`Difference` pseudo
//! instructions into concrete ones.
//!
//! There's no equivalent pass in `examples/original_source/` (the Python
//! project never got this far) or in the teacher's own LLVM-backed
//! pipeline, so the lattice and transfer function are built from scratch
//! here; the per-block state this tracks (what's currently known to sit
//! in the accumulator, mirroring how the teacher's `CodeGen` carries
//! per-statement context through codegen) follows the struct-of-tracked-
//! state shape in
//! `examples/navicore-cem3/crates/compiler/src/codegen/state.rs`.

use std::collections::HashSet;

use crate::block::{BlockId, Cfg};
use crate::error::{internal_bug, HCError};
use crate::instr::{Instruction, JumpKind, JumpSlot, Loc};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Constraint {
    EmptyHands,
    VariableInHands(String),
    ValueInHands(i32),
    ValueNotInHands(i32),
    VariableHasValue(String, i32),
}

/// A set of simultaneously-true facts about the accumulator ("hands")
/// and named cells at one program point. The dataflow join is set
/// intersection, so this type carries that operation itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet(HashSet<Constraint>);

impl StateSet {
    pub fn new() -> Self {
        StateSet(HashSet::new())
    }

    fn empty_hands() -> Self {
        let mut s = StateSet::new();
        s.0.insert(Constraint::EmptyHands);
        s
    }

    fn add(&mut self, c: Constraint) {
        self.0.insert(c);
    }

    fn has_variable_in_hands(&self, name: &str) -> bool {
        self.0.contains(&Constraint::VariableInHands(name.to_string()))
    }

    fn value_in_hands(&self) -> Option<i32> {
        self.0.iter().find_map(|c| match c {
            Constraint::ValueInHands(v) => Some(*v),
            _ => None,
        })
    }

    /// Some variable whose current value is already sitting in hand, if
    /// the analysis knows of one (used by `LoadConstant(0)`'s `Subtract`
    /// rewrite: subtracting what's already in hand from itself is free).
    fn variable_in_hands(&self) -> Option<&str> {
        self.0.iter().find_map(|c| match c {
            Constraint::VariableInHands(n) => Some(n.as_str()),
            _ => None,
        })
    }

    fn value_of(&self, name: &str) -> Option<i32> {
        self.0.iter().find_map(|c| match c {
            Constraint::VariableHasValue(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    fn name_with_value(&self, v: i32) -> Option<&str> {
        self.0.iter().find_map(|c| match c {
            Constraint::VariableHasValue(n, val) if *val == v => Some(n.as_str()),
            _ => None,
        })
    }

    /// Everything but `VariableHasValue` facts about cells — those
    /// outlive whatever's currently in the accumulator.
    fn drop_accumulator_constraints(&mut self) {
        self.0.retain(|c| matches!(c, Constraint::VariableHasValue(..)));
    }

    fn drop_constraints_mentioning(&mut self, name: &str) {
        self.0.retain(|c| match c {
            Constraint::VariableInHands(n) => n != name,
            Constraint::VariableHasValue(n, _) => n != name,
            _ => true,
        });
    }

    /// Dataflow join: a fact survives only if every contributing edge
    /// agreed on it. No edges (unreachable block) means no constraints.
    fn intersect(states: &[StateSet]) -> StateSet {
        let mut iter = states.iter();
        let Some(first) = iter.next() else {
            return StateSet::new();
        };
        let merged = iter.fold(first.0.clone(), |acc, s| acc.intersection(&s.0).cloned().collect());
        StateSet(merged)
    }
}

/// One instruction's effect on the incoming state: the per-instruction
/// transfer function for this lattice.
fn transfer(instr: &Instruction, mut state: StateSet) -> StateSet {
    match instr {
        Instruction::Input => {
            state.drop_accumulator_constraints();
            state
        }
        Instruction::Output => {
            state.drop_accumulator_constraints();
            state.add(Constraint::EmptyHands);
            state
        }
        Instruction::Load(loc) => {
            let name = loc_name(loc, "Load");
            if !state.has_variable_in_hands(name) {
                state.drop_accumulator_constraints();
            }
            state.add(Constraint::VariableInHands(name.to_string()));
            if let Some(v) = state.value_of(name) {
                state.add(Constraint::ValueInHands(v));
            }
            state
        }
        Instruction::Save(loc) => {
            let name = loc_name(loc, "Save");
            let carried = state.value_in_hands();
            state.drop_constraints_mentioning(name);
            state.add(Constraint::VariableInHands(name.to_string()));
            if let Some(v) = carried {
                state.add(Constraint::VariableHasValue(name.to_string(), v));
            }
            state
        }
        Instruction::Add(_) | Instruction::Subtract(_) | Instruction::Difference(..) => {
            state.drop_accumulator_constraints();
            state
        }
        Instruction::BumpUp(loc) | Instruction::BumpDown(loc) => {
            let name = loc_name(loc, "Bump").to_string();
            state.drop_accumulator_constraints();
            state.drop_constraints_mentioning(&name);
            state.add(Constraint::VariableInHands(name));
            state
        }
        Instruction::LoadConstant(v) => {
            state.drop_accumulator_constraints();
            state.add(Constraint::ValueInHands(*v));
            state
        }
    }
}

fn loc_name<'a>(loc: &'a Loc, who: &str) -> &'a str {
    loc.name()
        .unwrap_or_else(|| internal_bug(format!("{who} still addressed by name when it should hold a Loc::Address")))
}

/// Run the forward fixpoint over every block reachable from `entry`,
/// populating `entry_state`/`state_done`, then rewrite pseudo
/// instructions using the now-known entry state of each block.
pub fn analyze(cfg: &mut Cfg, entry: BlockId) -> Result<(), HCError> {
    let order = cfg.dfs_from(entry);
    let mut computed: Vec<Option<StateSet>> = vec![None; cfg.blocks.len()];

    let mut changed = true;
    while changed {
        changed = false;
        for &id in &order {
            let new_state = compute_entry_state(cfg, id, entry, &computed);
            if computed[id].as_ref() != Some(&new_state) {
                computed[id] = Some(new_state);
                changed = true;
            }
        }
    }

    for &id in &order {
        let state = computed[id].clone().unwrap_or_else(StateSet::new);
        cfg.blocks[id].entry_state = Some(state);
        cfg.blocks[id].state_done = true;
    }

    for &id in &order {
        rewrite_block(cfg, id)?;
    }
    Ok(())
}

fn compute_entry_state(cfg: &Cfg, id: BlockId, program_entry: BlockId, computed: &[Option<StateSet>]) -> StateSet {
    let mut contributions = Vec::new();
    if id == program_entry {
        contributions.push(StateSet::empty_hands());
    }
    for jref in &cfg.block(id).jumps_in {
        if let Some(pred_entry) = &computed[jref.src] {
            contributions.push(edge_exit_state(cfg, jref.src, jref.slot, pred_entry));
        }
    }
    if contributions.is_empty() {
        StateSet::new()
    } else {
        StateSet::intersect(&contributions)
    }
}

/// The state visible to whoever is reached via `src`'s `slot` edge: fold
/// the transfer function across `src`'s instructions, then refine for
/// the specific branch taken (the `JUMPZ` pass/fail rule;
/// `JUMPN` carries no extra refinement).
fn edge_exit_state(cfg: &Cfg, src: BlockId, slot: JumpSlot, entry: &StateSet) -> StateSet {
    let block = cfg.block(src);
    let mut state = entry.clone();
    for instr in &block.instructions {
        state = transfer(instr, state);
    }
    if let Some(cond) = block.cond {
        if cond.kind == JumpKind::JumpZero {
            match slot {
                JumpSlot::Cond => {
                    state.0.remove(&Constraint::ValueNotInHands(0));
                    state.add(Constraint::ValueInHands(0));
                }
                JumpSlot::Next => {
                    state.0.remove(&Constraint::ValueInHands(0));
                    state.add(Constraint::ValueNotInHands(0));
                }
            }
        }
    }
    state
}

/// Walk `id`'s instructions, carrying the running state forward from
/// `entry_state`, deleting redundant loads/saves and expanding
/// `LoadConstant`/`Difference` pseudo-instructions as each one's
/// concrete predecessor state allows.
fn rewrite_block(cfg: &mut Cfg, id: BlockId) -> Result<(), HCError> {
    let mut state = cfg
        .block(id)
        .entry_state
        .clone()
        .unwrap_or_else(|| internal_bug("rewrite_block ran before analyze computed an entry state"));
    let line = cfg.block(id).line;
    let old = std::mem::take(&mut cfg.blocks[id].instructions);
    let mut rewritten = Vec::with_capacity(old.len());

    for instr in old {
        match instr {
            Instruction::Load(loc) => {
                let name = loc_name(&loc, "Load").to_string();
                if state.has_variable_in_hands(&name) {
                    // Redundant: accumulator already equals this cell.
                } else {
                    rewritten.push(Instruction::Load(loc));
                }
                state = transfer(&Instruction::Load(Loc::Name(name)), state);
            }
            Instruction::Save(loc) => {
                let name = loc_name(&loc, "Save").to_string();
                let redundant = state.has_variable_in_hands(&name)
                    || state
                        .value_in_hands()
                        .is_some_and(|v| state.value_of(&name) == Some(v));
                if !redundant {
                    rewritten.push(Instruction::Save(loc));
                }
                state = transfer(&Instruction::Save(Loc::Name(name)), state);
            }
            Instruction::LoadConstant(v) => {
                let expanded = expand_load_constant(v, &state, line)?;
                if let Some(instr) = expanded {
                    state = transfer(&instr, state);
                    rewritten.push(instr);
                }
            }
            Instruction::Difference(a, b) => {
                let expanded = expand_difference(&a, &b, &state, line)?;
                for instr in expanded {
                    state = transfer(&instr, state);
                    rewritten.push(instr);
                }
            }
            other => {
                state = transfer(&other, state);
                rewritten.push(other);
            }
        }
    }

    cfg.blocks[id].instructions = rewritten;
    Ok(())
}

/// `LoadConstant(v)` expansion: delete if `v`'s already in
/// hand, reuse a live cell holding `v`, or derive `0` by subtracting
/// whatever's already in hand from itself. Anything else means this
/// literal cannot be synthesized from the values this block can ever see
/// — a source-level failure, not a compiler bug.
fn expand_load_constant(v: i32, state: &StateSet, line: Option<usize>) -> Result<Option<Instruction>, HCError> {
    if state.value_in_hands() == Some(v) {
        return Ok(None);
    }
    if let Some(name) = state.name_with_value(v) {
        return Ok(Some(Instruction::Load(Loc::Name(name.to_string()))));
    }
    if v == 0 {
        if let Some(m) = state.variable_in_hands() {
            return Ok(Some(Instruction::Subtract(Loc::Name(m.to_string()))));
        }
    }
    Err(HCError::type_error(
        format!(
            "The literal {v} cannot be produced on this path without a variable already known to hold it, on line {}",
            line.unwrap_or(0)
        ),
        line.unwrap_or(0),
    ))
}

/// `Difference(a, b)` expansion: always `a - b`, sign preserved. Reuse
/// `a` if it's already in hand; otherwise load it explicitly first. The
/// spec's third form (reuse `b`, yielding `b - a`) is unsound for
/// order-sensitive comparisons and is intentionally not used here — see
/// DESIGN.md.
fn expand_difference(a: &Loc, b: &Loc, state: &StateSet, line: Option<usize>) -> Result<Vec<Instruction>, HCError> {
    let a_name = loc_name(a, "Difference");
    let _ = line;
    if state.has_variable_in_hands(a_name) {
        Ok(vec![Instruction::Subtract(b.clone())])
    } else {
        Ok(vec![Instruction::Load(a.clone()), Instruction::Subtract(b.clone())])
    }
}
