//! Target tree: a Python-shaped statement and expression grammar.
//!
//! Nodes are plain owned data. The lowering builds them fresh and hands
//! ownership to the caller; [`PythonWriter`](crate::output::python::PythonWriter)
//! renders them as source text.

use serde::Serialize;

/// A generated Python identifier.
pub type Identifier = String;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Return {
        value: Option<Expr>,
    },
    Delete {
        targets: Vec<Expr>,
    },
    /// `t1, t2, ... = value`; a single target is a plain assignment.
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: Operator,
        value: Expr,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        finalbody: Vec<Stmt>,
    },
    Global {
        names: Vec<Identifier>,
    },
    Nonlocal {
        names: Vec<Identifier>,
    },
    Expr {
        value: Expr,
    },
    Pass,
    Break,
    Continue,
    /// A `#` comment line; `text` excludes the marker.
    Comment {
        text: String,
    },
    /// Documentation string; one entry per line.
    DocString {
        lines: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub name: Identifier,
    pub args: Arguments,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Arguments {
    pub args: Vec<Identifier>,
    /// `*name` collecting trailing positional arguments.
    pub vararg: Option<Identifier>,
    /// Defaults for the last `defaults.len()` entries of `args`.
    pub defaults: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDef {
    pub name: Identifier,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptHandler {
    pub typ: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    BoolOp {
        op: BoolOperator,
        values: Vec<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Lambda {
        args: Arguments,
        body: Box<Expr>,
    },
    Dict {
        keys: Vec<Expr>,
        values: Vec<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOperator>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    /// Numeric literal, kept in source form (`0`, `0.0`, `0x1f`, `2j`).
    Num {
        n: String,
    },
    /// String literal holding the decoded value.
    Str {
        s: String,
    },
    NameConstant {
        value: Constant,
    },
    Attribute {
        value: Box<Expr>,
        attr: Identifier,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Slice>,
    },
    Starred {
        value: Box<Expr>,
    },
    Name {
        id: Identifier,
    },
    List {
        elts: Vec<Expr>,
    },
    Tuple {
        elts: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Slice {
    Index(Expr),
    Range {
        lower: Option<Expr>,
        upper: Option<Expr>,
        step: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub arg: Identifier,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constant {
    None,
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
}

// ============================================================================
// Constructors
// ============================================================================

impl Expr {
    pub fn name(id: impl Into<Identifier>) -> Self {
        Expr::Name { id: id.into() }
    }

    pub fn num(n: impl Into<String>) -> Self {
        Expr::Num { n: n.into() }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Str { s: s.into() }
    }

    pub fn none() -> Self {
        Expr::NameConstant {
            value: Constant::None,
        }
    }

    pub fn bool(value: bool) -> Self {
        Expr::NameConstant {
            value: if value {
                Constant::True
            } else {
                Constant::False
            },
        }
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args,
            keywords: Vec::new(),
        }
    }

    pub fn attribute(value: Expr, attr: impl Into<Identifier>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn index(value: Expr, index: Expr) -> Self {
        Expr::Subscript {
            value: Box::new(value),
            slice: Box::new(Slice::Index(index)),
        }
    }

    pub fn binop(left: Expr, op: Operator, right: Expr) -> Self {
        Expr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn compare(left: Expr, op: CmpOperator, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(left),
            ops: vec![op],
            comparators: vec![right],
        }
    }

    pub fn tuple(elts: Vec<Expr>) -> Self {
        Expr::Tuple { elts }
    }

    pub fn list(elts: Vec<Expr>) -> Self {
        Expr::List { elts }
    }

    pub fn starred(value: Expr) -> Self {
        Expr::Starred {
            value: Box::new(value),
        }
    }

    /// A single value stays as is; zero or several become a tuple.
    pub fn make_tuple(mut values: Vec<Expr>) -> Self {
        if values.len() == 1 {
            values.remove(0)
        } else {
            Expr::Tuple { elts: values }
        }
    }
}

impl Stmt {
    pub fn expr(value: Expr) -> Self {
        Stmt::Expr { value }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign {
            targets: vec![target],
            value,
        }
    }

    pub fn if_stmt(test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>) -> Self {
        Stmt::If { test, body, orelse }
    }

    pub fn return_stmt(value: Option<Expr>) -> Self {
        Stmt::Return { value }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Stmt::Comment { text: text.into() }
    }
}

/// `[stmt]`, or `[pass]` when `body` is empty.
pub fn or_pass(body: Vec<Stmt>) -> Vec<Stmt> {
    if body.is_empty() {
        vec![Stmt::Pass]
    } else {
        body
    }
}
