//! Linear instructions, pseudo-instructions, and jump edges — the
//! vocabulary blocks are built out of.
//!
//! Grounded in `examples/original_source/hrminstr.py`'s `HRMInstruction`
//! hierarchy (`Input`, `Output`, `Save`, `Load`, `Add`, `Subtract`,
//! `BumpUp`, `BumpDown`, `PseudoInstruction`/`LoadConstant`/`Difference`,
//! `AbstractJump`/`Jump`/`JumpZero`/`JumpNegative`), reworked as closed
//! Rust enums's sum-type guidance rather than one Python
//! class per opcode.

use crate::block::BlockId;

/// Where an operand lives: a user/temporary name before [`crate::memassign`]
/// runs, a concrete floor address afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Loc {
    Name(String),
    Address(i32),
}

impl Loc {
    pub fn name(&self) -> Option<&str> {
        match self {
            Loc::Name(n) => Some(n),
            Loc::Address(_) => None,
        }
    }
}

/// An instruction inside a block. `LoadConstant`/`Difference` are
/// pseudo-instructions: legal mid-pipeline, a compiler bug if they
/// survive to [`crate::asm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Input,
    Output,
    Load(Loc),
    Save(Loc),
    Add(Loc),
    Subtract(Loc),
    BumpUp(Loc),
    BumpDown(Loc),
    /// Pseudo: load the literal `value` into the accumulator.
    LoadConstant(i32),
    /// Pseudo: the value `a - b`, sign preserved. Which of `a`/`b` gets
    /// an explicit `Load` (as opposed to reusing whatever's already in
    /// hand) is undecided until accumulator-state analysis runs; the
    /// subtraction itself is never reordered, since comparisons built on
    /// top of it (`<`, `<=`, `>`, `>=`) are sign-sensitive.
    Difference(Loc, Loc),
}

impl Instruction {
    pub fn is_pseudo(&self) -> bool {
        matches!(self, Instruction::LoadConstant(_) | Instruction::Difference(..))
    }

    /// Every variable name this instruction reads. `Difference` is still
    /// a pseudo instruction when liveness runs (it isn't expanded until
    /// [`crate::state`] does so afterward), and both of its operands are
    /// already concrete names at that point, so both must be reported
    /// here or a `Save` feeding one could be mistaken for dead.
    pub fn reads(&self) -> Vec<&str> {
        match self {
            Instruction::Load(l) | Instruction::Add(l) | Instruction::Subtract(l) => l.name().into_iter().collect(),
            Instruction::Difference(a, b) => a.name().into_iter().chain(b.name()).collect(),
            _ => Vec::new(),
        }
    }

    /// The variable name this instruction writes (`writes_variable`).
    pub fn writes(&self) -> Option<&str> {
        match self {
            Instruction::Save(l) | Instruction::BumpUp(l) | Instruction::BumpDown(l) => l.name(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Jump,
    JumpZero,
    JumpNegative,
}

/// An outgoing edge from a block. `implicit` is set by
/// [`crate::cleanup`] once layout order makes the jump a no-op fall-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpEdge {
    pub dest: BlockId,
    pub kind: JumpKind,
    pub implicit: bool,
}

impl JumpEdge {
    pub fn new(dest: BlockId, kind: JumpKind) -> Self {
        JumpEdge {
            dest,
            kind,
            implicit: false,
        }
    }
}

/// Which outgoing slot of a block a back-edge refers to. A block has at
/// most one conditional jump and at most one unconditional/next jump, so
/// this pair fully identifies an edge without a separate jump arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpSlot {
    Cond,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpRef {
    pub src: BlockId,
    pub slot: JumpSlot,
}
