//! Memory assignment: the final pass before textual
//! emission, mapping every surviving `Loc::Name` to a concrete floor
//! address.
//!
//! Grounded in `examples/original_source/hrminstr.py`'s floor-allocation
//! step (`init`-declared slots bind first, everything else fills the
//! first free hole or appends) and in the determinism
//! guarantee: `init` addresses bind in textual order, remaining names on
//! first encounter in block/instruction order.

use crate::block::{BlockId, Cfg};
use crate::instr::{Instruction, Loc};
use crate::memmap::MemoryMap;

/// Floor layout: `floor[i]` is the name occupying address `i`, or `None`
/// for a hole. Built once, consumed by [`crate::asm`] only to know how
/// many addresses exist — the instructions themselves carry their own
/// resolved `Loc::Address` after [`assign`] runs.
#[derive(Debug, Default)]
pub struct Floor {
    pub slots: Vec<Option<String>>,
}

impl Floor {
    fn address_of(&self, name: &str) -> Option<i32> {
        self.slots
            .iter()
            .position(|s| s.as_deref() == Some(name))
            .map(|i| i as i32)
    }

    fn first_hole(&self) -> Option<i32> {
        self.slots.iter().position(|s| s.is_none()).map(|i| i as i32)
    }

    fn place_at(&mut self, name: &str, addr: i32) {
        let idx = addr as usize;
        if self.slots.len() <= idx {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(name.to_string());
    }

    fn append(&mut self, name: &str) -> i32 {
        self.slots.push(Some(name.to_string()));
        (self.slots.len() - 1) as i32
    }

    /// Reuse an existing slot for `name`, or allocate the first hole, or
    /// append a fresh one.
    fn address_for(&mut self, name: &str) -> i32 {
        if let Some(addr) = self.address_of(name) {
            return addr;
        }
        if let Some(addr) = self.first_hole() {
            self.place_at(name, addr);
            return addr;
        }
        self.append(name)
    }
}

/// Pre-populate the floor from `init` declarations (in their declared
/// textual order, at their declared addresses), then walk every
/// instruction in `layout_order` assigning addresses to the rest.
pub fn assign(cfg: &mut Cfg, layout_order: &[BlockId], mem: &MemoryMap) -> Floor {
    let mut floor = Floor::default();
    for (name, addr) in &mem.declared_order {
        floor.place_at(name, *addr);
    }

    for &block in layout_order {
        for instr in &mut cfg.blocks[block].instructions {
            resolve_instruction(instr, &mut floor);
        }
    }

    floor
}

fn resolve_instruction(instr: &mut Instruction, floor: &mut Floor) {
    let locs: Vec<&mut Loc> = match instr {
        Instruction::Load(l) | Instruction::Save(l) | Instruction::Add(l) | Instruction::Subtract(l) => vec![l],
        Instruction::BumpUp(l) | Instruction::BumpDown(l) => vec![l],
        Instruction::Difference(a, b) => vec![a, b],
        Instruction::Input | Instruction::Output | Instruction::LoadConstant(_) => vec![],
    };
    for loc in locs {
        if let Loc::Name(name) = loc {
            let addr = floor.address_for(name);
            *loc = Loc::Address(addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;
    use crate::block::Cfg;

    #[test]
    fn init_declared_addresses_bind_first() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        cfg.block_mut(a)
            .instructions
            .push(Instruction::Load(Loc::Name("x".into())));
        let mem = crate::memmap::build_memory_map(&[Stmt::InitialValueDeclaration {
            name: "x".to_string(),
            address: 5,
            line: 1,
        }])
        .unwrap();

        assign(&mut cfg, &[a], &mem);

        assert_eq!(
            cfg.block(a).instructions[0],
            Instruction::Load(Loc::Address(5))
        );
    }

    #[test]
    fn undeclared_names_fill_holes_then_append() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        cfg.block_mut(a).instructions = vec![
            Instruction::Load(Loc::Name("a".into())),
            Instruction::Save(Loc::Name("b".into())),
        ];
        let mem = crate::memmap::build_memory_map(&[Stmt::InitialValueDeclaration {
            name: "pinned".to_string(),
            address: 0,
            line: 1,
        }])
        .unwrap();

        assign(&mut cfg, &[a], &mem);

        assert_eq!(
            cfg.block(a).instructions[0],
            Instruction::Load(Loc::Address(1))
        );
        assert_eq!(
            cfg.block(a).instructions[1],
            Instruction::Save(Loc::Address(2))
        );
    }

    #[test]
    fn repeated_name_reuses_its_address() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block(Some(1));
        cfg.block_mut(a).instructions = vec![
            Instruction::Load(Loc::Name("a".into())),
            Instruction::Save(Loc::Name("a".into())),
        ];
        let mem = MemoryMap::default();

        assign(&mut cfg, &[a], &mem);

        assert_eq!(cfg.block(a).instructions[0], Instruction::Load(Loc::Address(0)));
        assert_eq!(cfg.block(a).instructions[1], Instruction::Save(Loc::Address(0)));
    }
}
