//! Error types for the HC compiler.
//!
//! Source-facing failures (lexical, syntactic, semantic) are represented
//! as [`HCError`] and propagate through `Result` all the way out to the
//! CLI. Violations of the compiler's own invariants are a different
//! animal: they indicate a bug in this crate, not a mistake in the
//! user's program, so they never travel as a `Result` — see
//! [`internal_bug`].

use std::fmt;

/// A source-facing error: lexical, syntactic, or semantic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HCError {
    /// The lexer encountered a character it does not recognize.
    Lexical {
        message: String,
        line: usize,
        col: usize,
    },
    /// The line or indentation parser could not make sense of the input.
    Syntax {
        message: String,
        line: usize,
        col: usize,
    },
    /// A semantically invalid but syntactically well-formed program
    /// (`HCTypeError` in spec terms): duplicate declarations, use
    /// before assignment, multiplying two non-constants, etc.
    Type { message: String, line: usize },
}

impl HCError {
    pub fn lexical(message: impl Into<String>, line: usize, col: usize) -> Self {
        HCError::Lexical {
            message: message.into(),
            line,
            col,
        }
    }

    pub fn syntax(message: impl Into<String>, line: usize, col: usize) -> Self {
        HCError::Syntax {
            message: message.into(),
            line,
            col,
        }
    }

    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        HCError::Type {
            message: message.into(),
            line,
        }
    }

    /// 1-based line number this error should be reported against.
    pub fn line(&self) -> usize {
        match self {
            HCError::Lexical { line, .. } => *line,
            HCError::Syntax { line, .. } => *line,
            HCError::Type { line, .. } => *line,
        }
    }
}

impl fmt::Display for HCError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HCError::Lexical { message, .. } => write!(f, "{message}"),
            HCError::Syntax { message, .. } => write!(f, "{message}"),
            HCError::Type { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for HCError {}

/// Marker type for compiler-internal invariant violations
/// (`HCInternalError` in spec terms). Never constructed directly by
/// callers — go through [`internal_bug`], which panics immediately.
#[derive(Debug)]
pub struct HCInternalError(pub String);

impl fmt::Display for HCInternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal compiler error: {}", self.0)
    }
}

impl std::error::Error for HCInternalError {}

/// Raise a compiler-internal invariant violation.
///
/// These exist only for bugs in this crate (an unexpanded pseudo
/// instruction reaching emission, a jump edge with no matching
/// `jumps_in` record, and so on) — never for anything a user's source
/// program can trigger. Panicking is deliberate: these must abort with
/// a diagnostic rather than surface as a "your program is wrong"
/// exit-1 error.
pub fn internal_bug(message: impl Into<String>) -> ! {
    panic!("{}", HCInternalError(message.into()));
}
