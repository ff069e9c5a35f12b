//! Phase-2 ("indent-nesting") pass: turns the flat, line-by-line output
//! of [`crate::parser`] into a properly nested [`Stmt`] tree, using
//! indentation to delimit bodies.
//!
//! Grounded in `examples/original_source/hcparse2.py`'s `nest_lines`: a
//! stack of open blocks keyed by the indent string that introduced
//! them. A line's indent must be exactly the current block's indent
//! (continue), a strict prefix extension of it (open a new block), or a
//! prefix of some enclosing block's indent (close blocks until it
//! matches) — anything else is a syntax error.

use crate::ast::Stmt;
use crate::error::HCError;
use crate::lexer::lex;
use crate::parser::{parse_line, RawLine};

/// Which slot of the most recently pushed compound statement a closed
/// frame's statements should be written back into. The `usize` indexes
/// into the *parent* frame's `stmts`, which is stable once recorded:
/// frames are closed strictly LIFO, and a `Vec`'s earlier indices never
/// move as later elements are appended.
enum Attach {
    Root,
    ForeverBody(usize),
    WhileBody(usize),
    IfThen(usize),
    IfElse(usize),
}

struct Frame {
    /// `None` until the first line inside this (freshly opened) block
    /// is seen, at which point its indent establishes this frame's.
    indent: Option<String>,
    stmts: Vec<Stmt>,
    attach: Attach,
}

/// Parse a complete source string into a top-level statement list.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, HCError> {
    let lexed = lex(source)?;

    let mut stack = vec![Frame {
        indent: Some(String::new()),
        stmts: Vec::new(),
        attach: Attach::Root,
    }];

    for line in &lexed {
        let lineno_token = line
            .tokens
            .first()
            .map(|t| t.line)
            .unwrap_or(0);
        let raw = parse_line(&line.tokens, lineno_token)?;
        process_line(&mut stack, &line.indent, lineno_token, raw)?;
    }

    while stack.len() > 1 {
        close_frame(&mut stack);
    }

    Ok(stack.pop().unwrap().stmts)
}

fn process_line(
    stack: &mut Vec<Frame>,
    indent: &str,
    lineno: usize,
    raw: RawLine,
) -> Result<(), HCError> {
    // Establish a freshly opened frame's indent from its first line.
    if stack.last().unwrap().indent.is_none() {
        let parent_indent = stack[stack.len() - 2].indent.as_deref().unwrap_or("");
        if !indent.starts_with(parent_indent) || indent.len() <= parent_indent.len() {
            return Err(HCError::syntax(
                format!("Expected indented block on line {lineno}"),
                lineno,
                1,
            ));
        }
        stack.last_mut().unwrap().indent = Some(indent.to_string());
    }

    // Close frames whose indent is a strict ancestor of this line's.
    loop {
        let top_indent = stack.last().unwrap().indent.clone().unwrap();
        if indent == top_indent {
            break;
        }
        if stack.len() > 1 && top_indent.starts_with(indent) && indent.len() < top_indent.len() {
            close_frame(stack);
            continue;
        }
        return Err(HCError::syntax(
            format!(
                "Unexpected indent on line {lineno} — expected {} but got {}",
                describe_indent(&top_indent),
                describe_indent(indent)
            ),
            lineno,
            1,
        ));
    }

    match raw {
        RawLine::Else => {
            let frame = stack.last_mut().unwrap();
            let idx = frame.stmts.len().checked_sub(1).ok_or_else(|| {
                HCError::syntax(
                    format!("Else statement has no matching If statement on line {lineno}"),
                    lineno,
                    1,
                )
            })?;
            match frame.stmts.get(idx) {
                Some(Stmt::If { else_body: None, .. }) => {}
                Some(Stmt::If {
                    else_body: Some(_), ..
                }) => {
                    return Err(HCError::syntax(
                        format!("If statement has multiple Else statements on line {lineno}"),
                        lineno,
                        1,
                    ));
                }
                _ => {
                    return Err(HCError::syntax(
                        format!("Else statement has no matching If statement on line {lineno}"),
                        lineno,
                        1,
                    ));
                }
            }
            stack.push(Frame {
                indent: None,
                stmts: Vec::new(),
                attach: Attach::IfElse(idx),
            });
        }
        RawLine::InitDecl { name, address } => {
            stack.last_mut().unwrap().stmts.push(Stmt::InitialValueDeclaration {
                name,
                address,
                line: lineno,
            });
        }
        RawLine::Output { expr } => {
            stack
                .last_mut()
                .unwrap()
                .stmts
                .push(Stmt::Output { expr, line: lineno });
        }
        RawLine::ExprLine { expr } => {
            stack
                .last_mut()
                .unwrap()
                .stmts
                .push(Stmt::ExprLine { expr, line: lineno });
        }
        RawLine::Forever => {
            let frame = stack.last_mut().unwrap();
            let idx = frame.stmts.len();
            frame.stmts.push(Stmt::Forever {
                body: Vec::new(),
                line: lineno,
            });
            stack.push(Frame {
                indent: None,
                stmts: Vec::new(),
                attach: Attach::ForeverBody(idx),
            });
        }
        RawLine::While { cond } => {
            let frame = stack.last_mut().unwrap();
            let idx = frame.stmts.len();
            frame.stmts.push(Stmt::While {
                cond,
                body: Vec::new(),
                line: lineno,
            });
            stack.push(Frame {
                indent: None,
                stmts: Vec::new(),
                attach: Attach::WhileBody(idx),
            });
        }
        RawLine::If { cond } => {
            let frame = stack.last_mut().unwrap();
            let idx = frame.stmts.len();
            frame.stmts.push(Stmt::If {
                cond,
                then_body: Vec::new(),
                else_body: None,
                line: lineno,
            });
            stack.push(Frame {
                indent: None,
                stmts: Vec::new(),
                attach: Attach::IfThen(idx),
            });
        }
    }

    Ok(())
}

fn close_frame(stack: &mut Vec<Frame>) {
    let frame = stack.pop().unwrap();
    let parent = stack.last_mut().unwrap();
    match frame.attach {
        Attach::Root => unreachable!("root frame is never closed"),
        Attach::ForeverBody(idx) => {
            if let Stmt::Forever { body, .. } = &mut parent.stmts[idx] {
                *body = frame.stmts;
            }
        }
        Attach::WhileBody(idx) => {
            if let Stmt::While { body, .. } = &mut parent.stmts[idx] {
                *body = frame.stmts;
            }
        }
        Attach::IfThen(idx) => {
            if let Stmt::If { then_body, .. } = &mut parent.stmts[idx] {
                *then_body = frame.stmts;
            }
        }
        Attach::IfElse(idx) => {
            if let Stmt::If { else_body, .. } = &mut parent.stmts[idx] {
                *else_body = Some(frame.stmts);
            }
        }
    }
}

/// Human-readable rendering of an indent string for error messages,
/// e.g. `"1 tab"`, `"4 spaces"`, `"no indent"`.
fn describe_indent(s: &str) -> String {
    if s.is_empty() {
        return "no indent".to_string();
    }
    let tabs = s.chars().filter(|&c| c == '\t').count();
    let spaces = s.chars().filter(|&c| c == ' ').count();
    if tabs > 0 && spaces == 0 {
        format!("{tabs} tab{}", if tabs == 1 { "" } else { "s" })
    } else if spaces > 0 && tabs == 0 {
        format!("{spaces} space{}", if spaces == 1 { "" } else { "s" })
    } else {
        format!("{} characters of mixed indentation", s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn nests_forever_and_if_else() {
        let src = "forever\n\tif input\n\t\toutput 1\n\telse\n\t\toutput 0\n";
        let prog = parse_program(src).unwrap();
        assert_eq!(prog.len(), 1);
        match &prog[0] {
            Stmt::Forever { body, .. } => {
                assert_eq!(body.len(), 1);
                match &body[0] {
                    Stmt::If {
                        then_body,
                        else_body,
                        ..
                    } => {
                        assert_eq!(then_body.len(), 1);
                        assert!(else_body.is_some());
                        assert_eq!(else_body.as_ref().unwrap().len(), 1);
                    }
                    other => panic!("expected if, got {other:?}"),
                }
            }
            other => panic!("expected forever, got {other:?}"),
        }
    }

    #[test]
    fn sibling_statements_stay_flat() {
        let prog = parse_program("output 1\noutput 2\n").unwrap();
        assert_eq!(prog.len(), 2);
    }

    #[test]
    fn else_without_if_is_syntax_error() {
        let err = parse_program("output 1\nelse\n\toutput 2\n").unwrap_err();
        assert!(matches!(err, HCError::Syntax { .. }));
    }

    #[test]
    fn unexpected_indent_is_syntax_error() {
        let err = parse_program("output 1\n\toutput 2\n").unwrap_err();
        assert!(matches!(err, HCError::Syntax { .. }));
    }

    #[test]
    fn body_requires_deeper_indent() {
        let err = parse_program("forever\noutput 1\n").unwrap_err();
        match err {
            HCError::Syntax { message, .. } => {
                assert!(message.contains("Expected indented block"))
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn while_body_nests_one_level() {
        let prog = parse_program("while a\n\ta = a - 1\n").unwrap();
        match &prog[0] {
            Stmt::While { body, cond, .. } => {
                assert_eq!(body.len(), 1);
                assert_eq!(*cond, Expr::VariableRef("a".to_string()));
            }
            other => panic!("expected while, got {other:?}"),
        }
    }
}
