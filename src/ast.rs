//! The closed set of expression and pattern variants produced by the
//! parser and walked by the evaluator.

use std::rc::Rc;

use crate::error::SourceLocation;

/// An expression node plus the source location of its leading token, used
/// for error reporting (the evaluator attaches the closest enclosing
/// node's location to any error it raises).
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: SourceLocation,
}

impl Expr {
    pub fn new(kind: ExprKind, location: SourceLocation) -> Rc<Expr> {
        Rc::new(Expr { kind, location })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Concat,
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// A single object field in an object literal or object-extend clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub key: FieldKey,
    pub value: Rc<Expr>,
    /// `true` for `name { ... }` (patch/deep-merge), `false` for `name: value`.
    pub merge: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKey {
    Static(String),
    /// `[expr]` — evaluated at object-construction/extension time.
    Dynamic(Rc<Expr>),
}

/// One `for pattern in expr` / `when expr` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    For { pattern: Rc<Pattern>, source: Rc<Expr> },
    Guard(Rc<Expr>),
}

/// One array element, with optional conditional guard.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElement {
    pub value: Rc<Expr>,
    pub condition: Option<ElementCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementCondition {
    If(Rc<Expr>),
    Unless(Rc<Expr>),
}

/// One `pattern then body` arm of a `when ... matches` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenArm {
    pub pattern: Rc<Pattern>,
    pub body: Rc<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringSegment {
    Literal(String),
    Expr(Rc<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    String(String),
    Symbol(String),
    Interpolated(Vec<StringSegment>),
    Identifier(String),

    Array(Vec<ArrayElement>),
    Tuple(Vec<Rc<Expr>>),
    Object(Vec<ObjectField>),
    /// `base { field... }`.
    ObjectExtend { base: Rc<Expr>, fields: Vec<ObjectField> },

    Unary { op: UnOp, operand: Rc<Expr> },
    Binary { op: BinOp, left: Rc<Expr>, right: Rc<Expr> },

    Lambda { param: Rc<Pattern>, body: Rc<Expr> },
    /// `pattern = value<newline>body`. The pattern is usually a plain
    /// identifier but may be any destructuring pattern (e.g. the
    /// `{ a, b } = expr` import-destructuring sugar).
    Let { pattern: Rc<Pattern>, value: Rc<Expr>, body: Rc<Expr> },
    Application { callee: Rc<Expr>, argument: Rc<Expr> },

    FieldAccess { object: Rc<Expr>, name: String },
    /// `.name` used as a standalone value (single-argument projection function).
    FieldAccessor { names: Vec<String> },
    /// `obj.{a, b}`.
    FieldProjection { object: Rc<Expr>, names: Vec<String> },
    Index { collection: Rc<Expr>, key: Rc<Expr> },

    If { condition: Rc<Expr>, then_branch: Rc<Expr>, else_branch: Option<Rc<Expr>> },
    When { scrutinee: Rc<Expr>, arms: Vec<WhenArm>, otherwise: Option<Rc<Expr>> },

    ArrayComprehension { body: Rc<Expr>, clauses: Vec<Clause> },
    ObjectComprehension { key: FieldKey, value: Rc<Expr>, clauses: Vec<Clause> },

    Import(String),

    /// `expr where binding; binding; ...` desugars to nested `Let`s at parse
    /// time, but we keep the shape for clarity; see `parser::parse_where`.
    Where { body: Rc<Expr>, bindings: Vec<(String, Rc<Expr>)> },
}

/// The closed set of pattern variants used for destructuring in `let`,
/// lambda parameters, and `when` arms.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Identifier(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    String(String),
    Symbol(String),
    Tuple(Vec<Rc<Pattern>>),
    Array { prefix: Vec<Rc<Pattern>>, rest: Option<String> },
    Object(Vec<ObjectFieldPattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFieldPattern {
    pub name: String,
    /// `None` for the `name` shorthand (bind-by-name); `Some` for `name: subpattern`.
    pub subpattern: Option<Rc<Pattern>>,
}
