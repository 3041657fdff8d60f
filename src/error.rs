//! The fixed error taxonomy and the shared error context threaded through
//! tokenizing, parsing, pattern matching, and evaluation.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// Result alias used by every fallible core API.
pub type RunResult<T> = Result<T, LazyError>;

/// The closed set of error kinds a Lazylang program can raise.
///
/// Variant names match the taxonomy in the language specification exactly,
/// so `ErrorKind::TypeMismatch.to_string()` is `"TypeMismatch"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorKind {
    /// Tokenizer: invalid byte.
    UnexpectedCharacter,
    /// Tokenizer: missing closing quote.
    UnterminatedString,
    /// Parser: expected expression position.
    ExpectedExpression,
    /// Parser: wrong token in context.
    UnexpectedToken,
    /// Evaluator: free identifier.
    UnknownIdentifier,
    /// Evaluator: wrong-shape operand, failed pattern match outside `when`,
    /// non-boolean condition, invalid arithmetic pairing, division by zero.
    TypeMismatch,
    /// Evaluator: applied a non-function.
    ExpectedFunction,
    /// Evaluator: field absent from object.
    UnknownField,
    /// Evaluator: array index beyond length.
    OutOfBounds,
    /// Resolver: unresolvable import.
    ModuleNotFound,
    /// Built-in: arity violation.
    WrongNumberOfArguments,
    /// Built-in: value out of permitted range.
    InvalidArgument,
    /// Evaluator: thunk re-entered while evaluating.
    CyclicReference,
    /// Evaluator: `crash` primitive invoked.
    UserCrash,
}

/// A 1-based source location (line/column), a zero-based byte offset, and
/// the length of the offending fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
    pub length: usize,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32, offset: usize, length: usize) -> Self {
        Self { line, column, offset, length }
    }
}

/// Extra detail attached to an error, filled in only when relevant to the
/// error kind.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub location: Option<SourceLocation>,
    /// "Did you mean `...`?" — populated for `UnknownIdentifier`.
    pub suggestion: Option<String>,
    /// Available field names — populated for `UnknownField` (capped at 5).
    pub available_fields: Vec<String>,
    /// Expected / found type names — populated for `TypeMismatch`.
    pub expected_type: Option<&'static str>,
    pub found_type: Option<&'static str>,
}

impl ErrorContext {
    pub fn at(location: SourceLocation) -> Self {
        Self { location: Some(location), ..Self::default() }
    }
}

/// A fatal core error: kind, message, and context.
///
/// There is no in-language catch; every `LazyError` unwinds to the
/// top-level entry point (`evaluate`/`run`).
#[derive(Debug, Clone)]
pub struct LazyError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: ErrorContext,
}

impl LazyError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), context: ErrorContext::default() }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.context.location = Some(location);
        self
    }

    pub fn type_mismatch(
        message: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        let mut err = Self::new(ErrorKind::TypeMismatch, message);
        err.context.expected_type = Some(expected);
        err.context.found_type = Some(found);
        err
    }

    pub fn unknown_field(name: &str, available: &[String]) -> Self {
        let mut err = Self::new(ErrorKind::UnknownField, format!("unknown field `{name}`"));
        err.context.available_fields = available.iter().take(5).cloned().collect();
        err
    }

    pub fn unknown_identifier(name: &str, known: &[String]) -> Self {
        let mut err = Self::new(ErrorKind::UnknownIdentifier, format!("unknown identifier `{name}`"));
        err.context.suggestion = closest_match(name, known);
        err
    }
}

impl fmt::Display for LazyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(loc) = self.context.location {
            write!(f, " at {}:{}", loc.line, loc.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for LazyError {}

/// Finds the closest name in `candidates` to `name` by Levenshtein distance,
/// within the threshold `len/2 + 1` used for "did you mean" hints.
pub fn closest_match(name: &str, candidates: &[String]) -> Option<String> {
    let threshold = name.chars().count() / 2 + 1;
    candidates
        .iter()
        .map(|candidate| (candidate, levenshtein(name, candidate)))
        .filter(|(_, distance)| *distance <= threshold)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.clone())
}

/// Classic Wagner-Fischer edit distance over Unicode scalar values.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let tmp = row[j + 1];
            row[j + 1] = if ca == cb {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j + 1])
            };
            prev = tmp;
        }
    }
    row[b.len()]
}

/// Observation hook for evaluation, modeled on the teacher crate's
/// `VmTracer`. The default `NoopTracer` costs nothing; embedding hosts can
/// implement this to collect coverage or profiling data without the core
/// depending on a logging backend.
pub trait Tracer {
    fn on_thunk_forced(&mut self, _location: Option<SourceLocation>) {}
    fn on_import(&mut self, _path: &str) {}
}

/// A `Tracer` that observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn levenshtein_basic() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn closest_match_finds_near_miss() {
        let known = vec!["length".to_string(), "width".to_string()];
        assert_eq!(closest_match("lenght", &known), Some("length".to_string()));
    }

    #[test]
    fn closest_match_none_too_far() {
        let known = vec!["zzzzzzzzzz".to_string()];
        assert_eq!(closest_match("a", &known), None);
    }

    #[test]
    fn error_kind_display_matches_taxonomy() {
        assert_eq!(ErrorKind::TypeMismatch.to_string(), "TypeMismatch");
        assert_eq!(ErrorKind::UserCrash.to_string(), "UserCrash");
    }
}
