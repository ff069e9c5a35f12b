//! Memory map extraction: walks the (already nested) statement tree for
//! `init NAME @ ADDR` declarations and builds the name→floor-address
//! table that [`crate::memassign`] seeds its allocation from.
//!
//! Grounded in `examples/original_source/hcast.py`'s declaration-gathering
//! loop (`Variable {mem.name} declared twice`, `Multiple variables
//! declared at {mem.loc}`), with the messages below reworded from the
//! original's.

use std::collections::HashMap;

use crate::ast::Stmt;
use crate::error::HCError;

/// `init`-declared name → floor address, plus reverse lookup for the
/// duplicate-address check.
#[derive(Debug, Default)]
pub struct MemoryMap {
    by_name: HashMap<String, i32>,
    /// Declaration order, preserved for [`crate::memassign`]'s
    /// "`init` addresses bind first in their textual order" rule.
    pub declared_order: Vec<(String, i32)>,
}

impl MemoryMap {
    pub fn address_of(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// Walk every `init` declaration in the program (at any nesting depth —
/// the grammar doesn't restrict them to the top level) and build the
/// memory map, rejecting duplicate names or addresses.
pub fn build_memory_map(program: &[Stmt]) -> Result<MemoryMap, HCError> {
    let mut map = MemoryMap::default();
    let mut by_address: HashMap<i32, String> = HashMap::new();

    walk(program, &mut map, &mut by_address)?;
    Ok(map)
}

fn walk(
    stmts: &[Stmt],
    map: &mut MemoryMap,
    by_address: &mut HashMap<i32, String>,
) -> Result<(), HCError> {
    for stmt in stmts {
        match stmt {
            Stmt::InitialValueDeclaration {
                name,
                address,
                line,
            } => {
                if map.contains(name) {
                    return Err(HCError::type_error(
                        format!("Variable '{name}' declared twice on line {line}"),
                        *line,
                    ));
                }
                if let Some(_other) = by_address.get(address) {
                    return Err(HCError::type_error(
                        format!("Multiple variables declared at floor address {address} on line {line}"),
                        *line,
                    ));
                }
                map.by_name.insert(name.clone(), *address);
                by_address.insert(*address, name.clone());
                map.declared_order.push((name.clone(), *address));
            }
            Stmt::Forever { body, .. } => walk(body, map, by_address)?,
            Stmt::While { body, .. } => walk(body, map, by_address)?,
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                walk(then_body, map, by_address)?;
                if let Some(eb) = else_body {
                    walk(eb, map, by_address)?;
                }
            }
            Stmt::ExprLine { .. } | Stmt::Output { .. } => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_declarations() {
        let prog = vec![
            Stmt::InitialValueDeclaration {
                name: "a".to_string(),
                address: 0,
                line: 1,
            },
            Stmt::InitialValueDeclaration {
                name: "b".to_string(),
                address: 1,
                line: 2,
            },
        ];
        let map = build_memory_map(&prog).unwrap();
        assert_eq!(map.address_of("a"), Some(0));
        assert_eq!(map.address_of("b"), Some(1));
    }

    #[test]
    fn rejects_duplicate_name() {
        let prog = vec![
            Stmt::InitialValueDeclaration {
                name: "foo".to_string(),
                address: 0,
                line: 1,
            },
            Stmt::InitialValueDeclaration {
                name: "foo".to_string(),
                address: 1,
                line: 5,
            },
        ];
        let err = build_memory_map(&prog).unwrap_err();
        match err {
            HCError::Type { message, line } => {
                assert_eq!(message, "Variable 'foo' declared twice on line 5");
                assert_eq!(line, 5);
            }
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_address() {
        let prog = vec![
            Stmt::InitialValueDeclaration {
                name: "a".to_string(),
                address: 0,
                line: 1,
            },
            Stmt::InitialValueDeclaration {
                name: "b".to_string(),
                address: 0,
                line: 2,
            },
        ];
        let err = build_memory_map(&prog).unwrap_err();
        match err {
            HCError::Type { message, .. } => {
                assert_eq!(message, "Multiple variables declared at floor address 0 on line 2");
            }
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn finds_declarations_inside_nested_bodies() {
        let prog = vec![Stmt::Forever {
            body: vec![Stmt::InitialValueDeclaration {
                name: "x".to_string(),
                address: 3,
                line: 2,
            }],
            line: 1,
        }];
        let map = build_memory_map(&prog).unwrap();
        assert_eq!(map.address_of("x"), Some(3));
    }
}
