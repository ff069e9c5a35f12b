//! Lexer: turns one physical line of source into a leading-indent string
//! plus a flat token stream. HC has no line continuations and comments
//! run to end-of-line, so tokenizing one line at a time keeps the phase-1
//! parser simple without losing anything the grammar needs.
//!
//! Grounded in `examples/original_source/hclex.py`'s token alphabet,
//! extended with the `if`/`else`/`while` keywords and the comparison
//! and logical operators those control structures need.

use crate::error::HCError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Init,
    Input,
    Output,
    If,
    Else,
    Forever,
    While,
    Identifier(String),
    Number(i32),
    Equals,
    PlusEquals,
    MinusEquals,
    OrOr,
    AndAnd,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Bang,
    At,
    LParen,
    RParen,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub tok: Tok,
    pub line: usize,
    pub col: usize,
}

/// A single tokenized line: its leading indentation (verbatim, so mixed
/// tabs/spaces remain distinguishable) and the tokens after it.
/// Blank lines and comment-only lines are not returned by [`lex_line`].
pub struct LexedLine {
    pub indent: String,
    pub tokens: Vec<Token>,
}

/// Tokenize every non-blank, non-comment line of `source`.
pub fn lex(source: &str) -> Result<Vec<LexedLine>, HCError> {
    let mut out = Vec::new();
    for (i, raw_line) in source.lines().enumerate() {
        let lineno = i + 1;
        if let Some(stripped) = strip_comment(raw_line) {
            if stripped.trim().is_empty() {
                continue;
            }
            out.push(lex_line(stripped, lineno)?);
        }
    }
    Ok(out)
}

/// Strip a `#`-to-end-of-line comment. Returns `None` only if the whole
/// line is consumed (kept simple: `#` never appears inside this
/// language's literals, so no quoting concerns).
fn strip_comment(line: &str) -> Option<&str> {
    match line.find('#') {
        Some(idx) => Some(&line[..idx]),
        None => Some(line),
    }
}

fn lex_line(line: &str, lineno: usize) -> Result<LexedLine, HCError> {
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let indent = line[..indent_len].to_string();
    let rest = &line[indent_len..];

    let mut tokens = Vec::new();
    let chars: Vec<char> = rest.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let c = chars[i];
        let col = indent_len + i + 1;

        if c == ' ' || c == '\t' {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value: i32 = text
                .parse()
                .map_err(|_| HCError::lexical(format!("Invalid number '{text}'"), lineno, col))?;
            tokens.push(Token {
                tok: Tok::Number(value),
                line: lineno,
                col,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let tok = match text.as_str() {
                "init" => Tok::Init,
                "input" => Tok::Input,
                "output" => Tok::Output,
                "if" => Tok::If,
                "else" => Tok::Else,
                "forever" => Tok::Forever,
                "while" => Tok::While,
                _ => Tok::Identifier(text),
            };
            tokens.push(Token {
                tok,
                line: lineno,
                col,
            });
            continue;
        }

        macro_rules! two_char {
            ($second:expr, $two:expr, $one:expr) => {{
                if i + 1 < chars.len() && chars[i + 1] == $second {
                    i += 2;
                    $two
                } else {
                    i += 1;
                    $one
                }
            }};
        }

        let tok = match c {
            '=' => two_char!('=', Tok::EqEq, Tok::Equals),
            '!' => two_char!('=', Tok::NotEq, Tok::Bang),
            '<' => two_char!('=', Tok::Le, Tok::Lt),
            '>' => two_char!('=', Tok::Ge, Tok::Gt),
            '+' => two_char!('=', Tok::PlusEquals, Tok::Plus),
            '-' => two_char!('=', Tok::MinusEquals, Tok::Minus),
            '&' => {
                if i + 1 < chars.len() && chars[i + 1] == '&' {
                    i += 2;
                    Tok::AndAnd
                } else {
                    return Err(HCError::lexical(
                        format!("Unexpected character at line {lineno}, col {col}: '&'"),
                        lineno,
                        col,
                    ));
                }
            }
            '|' => {
                if i + 1 < chars.len() && chars[i + 1] == '|' {
                    i += 2;
                    Tok::OrOr
                } else {
                    return Err(HCError::lexical(
                        format!("Unexpected character at line {lineno}, col {col}: '|'"),
                        lineno,
                        col,
                    ));
                }
            }
            '*' => {
                i += 1;
                Tok::Star
            }
            '@' => {
                i += 1;
                Tok::At
            }
            '(' => {
                i += 1;
                Tok::LParen
            }
            ')' => {
                i += 1;
                Tok::RParen
            }
            other => {
                return Err(HCError::lexical(
                    format!("Unexpected character at line {lineno}, col {col}: '{other}'"),
                    lineno,
                    col,
                ));
            }
        };
        tokens.push(Token {
            tok,
            line: lineno,
            col,
        });
    }

    Ok(LexedLine { indent, tokens })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_identifiers() {
        let lines = lex("output input_val\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].tokens[0].tok, Tok::Output);
        assert_eq!(
            lines[0].tokens[1].tok,
            Tok::Identifier("input_val".to_string())
        );
    }

    #[test]
    fn lexes_two_char_operators() {
        let lines = lex("if a == b && c != d\n").unwrap();
        let toks: Vec<_> = lines[0].tokens.iter().map(|t| t.tok.clone()).collect();
        assert!(toks.contains(&Tok::EqEq));
        assert!(toks.contains(&Tok::AndAnd));
        assert!(toks.contains(&Tok::NotEq));
    }

    #[test]
    fn captures_indent_verbatim() {
        let lines = lex("forever\n\toutput 1\n").unwrap();
        assert_eq!(lines[0].indent, "");
        assert_eq!(lines[1].indent, "\t");
    }

    #[test]
    fn rejects_unknown_character() {
        let err = lex("output a ~ b\n").unwrap_err();
        match err {
            HCError::Lexical { message, line, col } => {
                assert_eq!(line, 1);
                assert_eq!(col, 10);
                assert!(message.contains('~'));
            }
            _ => panic!("expected lexical error"),
        }
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let lines = lex("# comment\n\noutput 1\n").unwrap();
        assert_eq!(lines.len(), 1);
    }
}
