//! A Human Resource Machine emulator, test-only: drives the assembly
//! [`hccompile::compile`] produces with a concrete inbox and asserts on
//! the resulting outbox.
//!
//! Grounded in `examples/original_source/test/hrm.py`'s `Office`
//! (accumulator-in-`hands`, label table, linear program counter) but
//! extended well past its `INBOX`/`OUTBOX`/`JUMP`-only scope to the full
//! mnemonic set this compiler emits: `COPYFROM`/`COPYTO`/`ADD`/`SUB`/
//! `BUMPUP`/`BUMPDN`/`JUMPZ`/`JUMPN`.

use std::collections::HashMap;

use hccompile::config::CompilerConfig;

const MIN_VALUE: i32 = -999;
const MAX_VALUE: i32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Char(char),
}

impl Value {
    fn as_int(self) -> Result<i32, RuntimeError> {
        match self {
            Value::Int(n) => Ok(n),
            Value::Char(c) => Err(RuntimeError::NotANumber(c)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RuntimeError {
    OutboxEmptyHands,
    CopyFromEmptyCell(i32),
    NotANumber(char),
    OutOfRange(i32),
    UnknownLabel(String),
    ParseError(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::OutboxEmptyHands => write!(f, "can't OUTBOX with empty hands"),
            RuntimeError::CopyFromEmptyCell(addr) => write!(f, "floor cell {addr} is empty"),
            RuntimeError::NotANumber(c) => write!(f, "'{c}' is not a number"),
            RuntimeError::OutOfRange(n) => write!(f, "{n} is outside [-999, 999]"),
            RuntimeError::UnknownLabel(name) => write!(f, "unknown label '{name}'"),
            RuntimeError::ParseError(line) => write!(f, "failed to parse line: '{line}'"),
        }
    }
}

#[derive(Debug, Clone)]
enum Instr {
    Inbox,
    Outbox,
    CopyFrom(i32),
    CopyTo(i32),
    Add(i32),
    Sub(i32),
    BumpUp(i32),
    BumpDn(i32),
    Jump(String),
    Jumpz(String),
    Jumpn(String),
}

struct Program {
    instrs: Vec<Instr>,
    labels: HashMap<String, usize>,
}

fn parse(asm: &str) -> Result<Program, RuntimeError> {
    let mut lines = asm.lines();
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            continue;
        }
        if line.trim() == "-- HUMAN RESOURCE MACHINE PROGRAM --" {
            break;
        }
        return Err(RuntimeError::ParseError(line.to_string()));
    }

    let mut instrs = Vec::new();
    let mut labels = HashMap::new();

    for raw in lines {
        let mut line = raw.trim();
        if let Some(colon) = line.find(':') {
            let (name, rest) = line.split_at(colon);
            labels.insert(name.trim().to_string(), instrs.len());
            line = rest[1..].trim();
        }
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let mnemonic = parts.next().unwrap();
        let arg = parts.next();

        let instr = match mnemonic {
            "INBOX" => Instr::Inbox,
            "OUTBOX" => Instr::Outbox,
            "COPYFROM" => Instr::CopyFrom(parse_addr(arg, raw)?),
            "COPYTO" => Instr::CopyTo(parse_addr(arg, raw)?),
            "ADD" => Instr::Add(parse_addr(arg, raw)?),
            "SUB" => Instr::Sub(parse_addr(arg, raw)?),
            "BUMPUP" => Instr::BumpUp(parse_addr(arg, raw)?),
            "BUMPDN" => Instr::BumpDn(parse_addr(arg, raw)?),
            "JUMP" => Instr::Jump(parse_label(arg, raw)?),
            "JUMPZ" => Instr::Jumpz(parse_label(arg, raw)?),
            "JUMPN" => Instr::Jumpn(parse_label(arg, raw)?),
            _ => return Err(RuntimeError::ParseError(raw.to_string())),
        };
        instrs.push(instr);
    }

    Ok(Program { instrs, labels })
}

fn parse_addr(arg: Option<&str>, raw: &str) -> Result<i32, RuntimeError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or_else(|| RuntimeError::ParseError(raw.to_string()))
}

fn parse_label(arg: Option<&str>, raw: &str) -> Result<String, RuntimeError> {
    arg.map(|a| a.to_string())
        .ok_or_else(|| RuntimeError::ParseError(raw.to_string()))
}

/// Run `asm` against `inbox`, returning everything sent to the outbox.
/// Execution halts the moment `INBOX` is reached with nothing left to
/// read — that is the ordinary, successful end of a Human Resource
/// Machine program, not an error.
pub fn run(asm: &str, inbox: Vec<Value>) -> Result<Vec<Value>, RuntimeError> {
    let program = parse(asm)?;
    let mut inbox = inbox.into_iter();
    let mut outbox = Vec::new();
    let mut hands: Option<Value> = None;
    let mut floor: HashMap<i32, Value> = HashMap::new();
    let mut pc = 0usize;

    // Conservative step cap: every test program here is small and
    // terminates in well under this many steps. A real infinite loop
    // (a compiler bug) fails the test instead of hanging the suite.
    const STEP_BUDGET: usize = 1_000_000;
    let mut steps = 0usize;

    while pc < program.instrs.len() {
        steps += 1;
        assert!(steps < STEP_BUDGET, "program did not halt within the step budget");

        match &program.instrs[pc] {
            Instr::Inbox => match inbox.next() {
                Some(v) => hands = Some(v),
                None => break,
            },
            Instr::Outbox => {
                let v = hands.take().ok_or(RuntimeError::OutboxEmptyHands)?;
                outbox.push(v);
            }
            Instr::CopyFrom(addr) => {
                let v = *floor.get(addr).ok_or(RuntimeError::CopyFromEmptyCell(*addr))?;
                hands = Some(v);
            }
            Instr::CopyTo(addr) => {
                let v = hands.ok_or(RuntimeError::OutboxEmptyHands)?;
                floor.insert(*addr, v);
            }
            Instr::Add(addr) => {
                let a = hands.ok_or(RuntimeError::OutboxEmptyHands)?.as_int()?;
                let b = floor.get(addr).ok_or(RuntimeError::CopyFromEmptyCell(*addr))?.as_int()?;
                hands = Some(Value::Int(checked(a + b)?));
            }
            Instr::Sub(addr) => {
                let a = hands.ok_or(RuntimeError::OutboxEmptyHands)?;
                let b = *floor.get(addr).ok_or(RuntimeError::CopyFromEmptyCell(*addr))?;
                hands = Some(subtract(a, b)?);
            }
            Instr::BumpUp(addr) => {
                let v = floor.get(addr).ok_or(RuntimeError::CopyFromEmptyCell(*addr))?.as_int()?;
                let bumped = checked(v + 1)?;
                floor.insert(*addr, Value::Int(bumped));
                hands = Some(Value::Int(bumped));
            }
            Instr::BumpDn(addr) => {
                let v = floor.get(addr).ok_or(RuntimeError::CopyFromEmptyCell(*addr))?.as_int()?;
                let bumped = checked(v - 1)?;
                floor.insert(*addr, Value::Int(bumped));
                hands = Some(Value::Int(bumped));
            }
            Instr::Jump(label) => {
                pc = *program.labels.get(label).ok_or_else(|| RuntimeError::UnknownLabel(label.clone()))?;
                continue;
            }
            Instr::Jumpz(label) => {
                let is_zero = matches!(hands, Some(Value::Int(0)));
                if is_zero {
                    pc = *program.labels.get(label).ok_or_else(|| RuntimeError::UnknownLabel(label.clone()))?;
                    continue;
                }
            }
            Instr::Jumpn(label) => {
                let is_neg = matches!(hands, Some(Value::Int(n)) if n < 0);
                if is_neg {
                    pc = *program.labels.get(label).ok_or_else(|| RuntimeError::UnknownLabel(label.clone()))?;
                    continue;
                }
            }
        }
        pc += 1;
    }

    Ok(outbox)
}

fn checked(n: i32) -> Result<i32, RuntimeError> {
    if (MIN_VALUE..=MAX_VALUE).contains(&n) {
        Ok(n)
    } else {
        Err(RuntimeError::OutOfRange(n))
    }
}

/// HRM's `SUB` on two letters yields their alphabet distance as an
/// integer; `SUB` with one int and one char operand is a boss error.
fn subtract(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(checked(a - b)?)),
        (Value::Char(a), Value::Char(b)) => Ok(Value::Int(checked(a as i32 - b as i32)?)),
        (Value::Int(_), Value::Char(c)) | (Value::Char(c), Value::Int(_)) => Err(RuntimeError::NotANumber(c)),
    }
}

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().map(|&n| Value::Int(n)).collect()
}

fn chars(s: &str) -> Vec<Value> {
    s.chars().map(Value::Char).collect()
}

fn expect_ints(values: &[Value]) -> Vec<i32> {
    values
        .iter()
        .map(|v| match v {
            Value::Int(n) => *n,
            Value::Char(c) => panic!("expected an int, got char '{c}'"),
        })
        .collect()
}

#[test]
fn echo_passes_integers_through_unchanged() {
    let source = "forever\n    output input\n";
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let out = run(&asm, ints(&[1, 2, 3])).unwrap();
    assert_eq!(expect_ints(&out), vec![1, 2, 3]);
}

#[test]
fn echo_passes_characters_through_unchanged() {
    let source = "forever\n    output input\n";
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let out = run(&asm, chars("AUTOEXEC")).unwrap();
    assert_eq!(out, chars("AUTOEXEC"));
}

#[test]
fn tripler_multiplies_every_inbox_value_by_three() {
    let source = "forever\n    x = input\n    output x * 3\n";
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let out = run(&asm, ints(&[6, -1, 7, 0])).unwrap();
    assert_eq!(expect_ints(&out), vec![18, -3, 21, 0]);
}

#[test]
fn octoplier_multiplies_every_inbox_value_by_eight() {
    let source = "forever\n    x = input\n    output x * 8\n";
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let out = run(&asm, ints(&[3, -2, 6, 0])).unwrap();
    assert_eq!(expect_ints(&out), vec![24, -16, 48, 0]);
}

#[test]
fn equality_xnor_outputs_pairs_that_share_a_sign() {
    let source = concat!(
        "forever\n",
        "    a = input\n",
        "    b = input\n",
        "    if (a >= 0) == (b >= 0)\n",
        "        output a\n",
        "        output b\n",
    );
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let out = run(&asm, ints(&[3, -4, 2, 13, -9, -14])).unwrap();
    assert_eq!(expect_ints(&out), vec![2, 13, -9, -14]);
}

#[test]
fn optimized_and_unoptimized_builds_agree_on_output() {
    let source = concat!(
        "forever\n",
        "    a = input\n",
        "    b = input\n",
        "    if (a >= 0) == (b >= 0)\n",
        "        output a\n",
        "        output b\n",
    );
    let inbox = ints(&[3, -4, 2, 13, -9, -14]);

    let optimized = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let unoptimized = hccompile::compile(source, &CompilerConfig::new().with_optimize(false)).unwrap();
    let explicit = hccompile::compile(source, &CompilerConfig::new().with_explicit_jumps(true)).unwrap();

    let out_a = run(&optimized, inbox.clone()).unwrap();
    let out_b = run(&unoptimized, inbox.clone()).unwrap();
    let out_c = run(&explicit, inbox).unwrap();

    assert_eq!(out_a, out_b);
    assert_eq!(out_a, out_c);
}

#[test]
fn forever_with_a_trivial_body_loops_back_to_its_own_entry() {
    let source = "forever\n    x = input\n";
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    assert!(asm.contains("JUMP"));
}

#[test]
fn a_statically_false_while_condition_never_runs_its_body() {
    // `0 != 0` constant-folds to `Boolean(false)` during lowering, so the
    // loop body below is never reached regardless of what it contains.
    let source = "while 0 != 0\n    output 1\n";
    let asm = hccompile::compile(source, &CompilerConfig::default()).unwrap();
    let out = run(&asm, Vec::new()).unwrap();
    assert!(out.is_empty());
}
