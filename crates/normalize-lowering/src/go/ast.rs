//! Resolved Go syntax tree.
//!
//! Nodes are immutable once built. Anything that needs resolution (types,
//! objects, positions) is looked up through a [`TypeOracle`] keyed by the
//! node's [`NodeId`].
//!
//! [`TypeOracle`]: crate::oracle::TypeOracle

use std::collections::HashMap;

/// Identity of a node, used to query the type oracle and the comment map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

/// Offset into a [`FileSet`](crate::oracle::FileSet). `Pos(0)` means "no position".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pos(pub u32);

impl Pos {
    pub const NONE: Pos = Pos(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub id: NodeId,
    pub pos: Pos,
    pub name: String,
}

impl Ident {
    /// The discard identifier `_`.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub pos: Pos,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Placeholder for a node the parser could not build.
    Bad,
    Ident(Ident),
    BasicLit {
        kind: LitKind,
        value: String,
    },
    Composite {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Paren(Box<Expr>),
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`; `ty` is `None` for the `x.(type)` guard of a type switch.
    TypeAssert {
        x: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
        /// Final argument spread with `...`.
        ellipsis: bool,
    },
    /// `*x`, both dereference and pointer type.
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        x: Box<Expr>,
        y: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayType {
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    StructType(FieldList),
    FuncType(FuncType),
    InterfaceType,
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType(Box<Expr>),
    Ellipsis(Option<Box<Expr>>),
}

impl Expr {
    /// Short description of the node's shape, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::Bad => "BadExpr",
            ExprKind::Ident(_) => "Ident",
            ExprKind::BasicLit { .. } => "BasicLit",
            ExprKind::Composite { .. } => "CompositeLit",
            ExprKind::FuncLit { .. } => "FuncLit",
            ExprKind::Paren(_) => "ParenExpr",
            ExprKind::Selector { .. } => "SelectorExpr",
            ExprKind::Index { .. } => "IndexExpr",
            ExprKind::Slice { .. } => "SliceExpr",
            ExprKind::TypeAssert { .. } => "TypeAssertExpr",
            ExprKind::Call { .. } => "CallExpr",
            ExprKind::Star(_) => "StarExpr",
            ExprKind::Unary { .. } => "UnaryExpr",
            ExprKind::Binary { .. } => "BinaryExpr",
            ExprKind::KeyValue { .. } => "KeyValueExpr",
            ExprKind::ArrayType { .. } => "ArrayType",
            ExprKind::StructType(_) => "StructType",
            ExprKind::FuncType(_) => "FuncType",
            ExprKind::InterfaceType => "InterfaceType",
            ExprKind::MapType { .. } => "MapType",
            ExprKind::ChanType(_) => "ChanType",
            ExprKind::Ellipsis(_) => "Ellipsis",
        }
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// True for the discard identifier `_`.
    pub fn is_blank(&self) -> bool {
        self.as_ident().is_some_and(Ident::is_blank)
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `^x`
    Xor,
    /// `&x`
    Addr,
    /// `<-x`
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub pos: Pos,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Bad,
    Decl(GenDecl),
    Empty,
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        tok: IncDec,
    },
    Assign {
        lhs: Vec<Expr>,
        tok: AssignTok,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        tok: BranchTok,
        label: Option<Ident>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Block,
        els: Option<Box<Stmt>>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        /// Either `x.(type)` as an expression statement or `v := x.(type)`.
        assign: Box<Stmt>,
        clauses: Vec<CaseClause>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        tok: AssignTok,
        x: Expr,
        body: Block,
    },
}

impl Stmt {
    /// Short description of the node's shape, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            StmtKind::Bad => "BadStmt",
            StmtKind::Decl(_) => "DeclStmt",
            StmtKind::Empty => "EmptyStmt",
            StmtKind::Labeled { .. } => "LabeledStmt",
            StmtKind::Expr(_) => "ExprStmt",
            StmtKind::Send { .. } => "SendStmt",
            StmtKind::IncDec { .. } => "IncDecStmt",
            StmtKind::Assign { .. } => "AssignStmt",
            StmtKind::Go(_) => "GoStmt",
            StmtKind::Defer(_) => "DeferStmt",
            StmtKind::Return(_) => "ReturnStmt",
            StmtKind::Branch { .. } => "BranchStmt",
            StmtKind::Block(_) => "BlockStmt",
            StmtKind::If { .. } => "IfStmt",
            StmtKind::Switch { .. } => "SwitchStmt",
            StmtKind::TypeSwitch { .. } => "TypeSwitchStmt",
            StmtKind::For { .. } => "ForStmt",
            StmtKind::Range { .. } => "RangeStmt",
        }
    }
}

/// One `case`/`default` arm. An empty `list` marks the default clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub id: NodeId,
    pub pos: Pos,
    pub list: Vec<Expr>,
    pub body: Vec<Stmt>,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.list.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDec {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignTok {
    /// `=`
    Assign,
    /// `:=`
    Define,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTok {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Bad(Pos),
    Gen(GenDecl),
    Func(FuncDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclTok {
    Import,
    Const,
    Type,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub pos: Pos,
    pub tok: DeclTok,
    pub doc: Option<CommentGroup>,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub pos: Pos,
    pub name: Option<Ident>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub pos: Pos,
    pub doc: Option<CommentGroup>,
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub pos: Pos,
    pub doc: Option<CommentGroup>,
    pub name: Ident,
    /// `type A = B` rather than `type A B`.
    pub alias: bool,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub pos: Pos,
    pub doc: Option<CommentGroup>,
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    /// `None` for functions implemented outside Go.
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub pos: Pos,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldList {
    pub fields: Vec<Field>,
}

impl FieldList {
    /// Number of declared entries, counting an unnamed field as one.
    pub fn arity(&self) -> usize {
        self.fields.iter().map(|f| f.names.len().max(1)).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub pos: Pos,
    pub names: Vec<Ident>,
    pub ty: Expr,
}

/// A Go source file: package clause, declarations and attached comments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub name: String,
    pub decls: Vec<Decl>,
    pub comments: CommentMap,
}

// ============================================================================
// Comments
// ============================================================================

/// A run of adjacent comments, kept as written (`// ...` or `/* ... */`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentGroup {
    pub comments: Vec<String>,
}

impl CommentGroup {
    pub fn new<I, S>(comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comments: comments.into_iter().map(Into::into).collect(),
        }
    }

    /// Comment text with markers removed, one entry per line.
    ///
    /// Leading and trailing blank lines are dropped and runs of blank lines
    /// collapse to one, mirroring `go/ast.CommentGroup.Text`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for comment in &self.comments {
            if let Some(rest) = comment.strip_prefix("//") {
                lines.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            } else if let Some(rest) = comment.strip_prefix("/*") {
                let rest = rest.strip_suffix("*/").unwrap_or(rest);
                lines.extend(rest.lines().map(str::to_string));
            } else {
                lines.push(comment.clone());
            }
        }

        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            let line = line.trim_end().to_string();
            if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
                continue;
            }
            out.push(line);
        }
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        out
    }
}

/// Comment groups attached to statements and declaration names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentMap {
    groups: HashMap<NodeId, Vec<CommentGroup>>,
}

impl CommentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, node: NodeId, group: CommentGroup) {
        self.groups.entry(node).or_default().push(group);
    }

    pub fn get(&self, node: NodeId) -> &[CommentGroup] {
        self.groups.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
