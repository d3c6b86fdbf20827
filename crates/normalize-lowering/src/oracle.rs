//! Type-and-symbol oracle.
//!
//! The lowering never resolves names or types itself; it asks a
//! [`TypeOracle`]. [`TypeInfo`] is a table-backed oracle with a builder API,
//! used by front ends that already ran a checker and by tests.

use crate::go::{
    BasicKind, BinaryOp, Block, Expr, ExprKind, Ident, LitKind, Named, NodeId, Object, ObjectId,
    ObjectKind, Pos, Stmt, StmtKind, Type, Underlying,
};
use std::collections::HashMap;
use std::fmt;

/// Queries answered by the checker that annotated the input tree.
pub trait TypeOracle {
    /// Resolved type of an expression or identifier.
    fn type_of(&self, node: NodeId) -> Option<&Type>;

    /// Object an identifier defines or refers to. `None` for `_`.
    fn object_of(&self, node: NodeId) -> Option<ObjectId>;

    fn object(&self, id: ObjectId) -> Option<&Object>;

    /// Object implicitly declared by a type-switch case clause.
    fn implicit(&self, clause: NodeId) -> Option<ObjectId>;

    fn position(&self, pos: Pos) -> Option<Position>;
}

/// Resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

// ============================================================================
// FileSet
// ============================================================================

#[derive(Debug, Clone)]
struct SourceFile {
    name: String,
    base: u32,
    size: u32,
    /// Offsets of the first byte of each line.
    lines: Vec<u32>,
}

/// Maps [`Pos`] offsets back to file, line and column.
#[derive(Debug, Clone)]
pub struct FileSet {
    files: Vec<SourceFile>,
    next_base: u32,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            next_base: 1,
        }
    }

    /// Register a file and return its base; `Pos(base + offset)` addresses
    /// byte `offset` of `source`.
    pub fn add_file(&mut self, name: impl Into<String>, source: &str) -> u32 {
        let base = self.next_base;
        let size = source.len() as u32;
        let mut lines = vec![0];
        lines.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        );
        self.files.push(SourceFile {
            name: name.into(),
            base,
            size,
            lines,
        });
        self.next_base = base + size + 1;
        base
    }

    pub fn position(&self, pos: Pos) -> Option<Position> {
        if !pos.is_valid() {
            return None;
        }
        let file = self
            .files
            .iter()
            .find(|f| pos.0 >= f.base && pos.0 <= f.base + f.size)?;
        let offset = pos.0 - file.base;
        let line = file.lines.partition_point(|start| *start <= offset);
        let line_start = file.lines[line - 1];
        Some(Position {
            file: file.name.clone(),
            line: line as u32,
            column: offset - line_start + 1,
        })
    }
}

// ============================================================================
// TypeInfo
// ============================================================================

/// Table-backed [`TypeOracle`].
#[derive(Debug, Clone)]
pub struct TypeInfo {
    fset: FileSet,
    objects: Vec<Object>,
    uses: HashMap<NodeId, ObjectId>,
    types: HashMap<NodeId, Type>,
    implicits: HashMap<NodeId, ObjectId>,
    universe: HashMap<String, ObjectId>,
    next_node: u32,
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self::new()
    }
}

const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

const BASIC_TYPES: &[BasicKind] = &[
    BasicKind::Bool,
    BasicKind::Int,
    BasicKind::Int8,
    BasicKind::Int16,
    BasicKind::Int32,
    BasicKind::Int64,
    BasicKind::Uint,
    BasicKind::Uint8,
    BasicKind::Uint16,
    BasicKind::Uint32,
    BasicKind::Uint64,
    BasicKind::Uintptr,
    BasicKind::Float32,
    BasicKind::Float64,
    BasicKind::Complex64,
    BasicKind::Complex128,
    BasicKind::String,
];

impl TypeInfo {
    /// Empty tables with the universe scope predeclared.
    pub fn new() -> Self {
        let mut info = Self {
            fset: FileSet::new(),
            objects: Vec::new(),
            uses: HashMap::new(),
            types: HashMap::new(),
            implicits: HashMap::new(),
            universe: HashMap::new(),
            next_node: 1,
        };

        for name in BUILTIN_FUNCS {
            info.predeclare(Object::new(*name, ObjectKind::Builtin));
        }
        for kind in BASIC_TYPES {
            info.predeclare(Object::new(kind.name(), ObjectKind::TypeName).with_type(Type::Basic(*kind)));
        }
        info.predeclare(Object::new("byte", ObjectKind::TypeName).with_type(Type::Basic(BasicKind::Uint8)));
        info.predeclare(Object::new("rune", ObjectKind::TypeName).with_type(Type::Basic(BasicKind::Int32)));
        info.predeclare(Object::new("error", ObjectKind::TypeName).with_type(Type::Interface));
        info.predeclare(Object::new("any", ObjectKind::TypeName).with_type(Type::Interface));
        info.predeclare(
            Object::new("true", ObjectKind::Const)
                .with_type(Type::Basic(BasicKind::UntypedBool))
                .with_constant(crate::go::Constant::Bool(true)),
        );
        info.predeclare(
            Object::new("false", ObjectKind::Const)
                .with_type(Type::Basic(BasicKind::UntypedBool))
                .with_constant(crate::go::Constant::Bool(false)),
        );
        info.predeclare(Object::new("iota", ObjectKind::Const).with_type(Type::Basic(BasicKind::UntypedInt)));
        info.predeclare(Object::new("nil", ObjectKind::Nil).with_type(Type::Basic(BasicKind::UntypedNil)));
        info
    }

    fn predeclare(&mut self, object: Object) {
        let name = object.name.clone();
        let id = self.declare(object.package_level());
        self.universe.insert(name, id);
    }

    pub fn file_set(&self) -> &FileSet {
        &self.fset
    }

    pub fn file_set_mut(&mut self) -> &mut FileSet {
        &mut self.fset
    }

    /// Allocate a fresh node id.
    pub fn node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub fn declare(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    /// Declare a package-level type name whose type refers back to it.
    pub fn declare_named(&mut self, name: &str, underlying: Underlying) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        let ty = Type::Named(Named {
            obj: id,
            name: name.into(),
            underlying,
        });
        self.declare(
            Object::new(name, ObjectKind::TypeName)
                .with_type(ty)
                .package_level(),
        )
    }

    /// Look up a predeclared object (`len`, `int`, `nil`, ...).
    pub fn universe(&self, name: &str) -> Option<ObjectId> {
        self.universe.get(name).copied()
    }

    pub fn record_use(&mut self, node: NodeId, obj: ObjectId) {
        self.uses.insert(node, obj);
    }

    pub fn record_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn record_implicit(&mut self, clause: NodeId, obj: ObjectId) {
        self.implicits.insert(clause, obj);
    }

    // ------------------------------------------------------------------------
    // Tree builders. Each returns a node with a fresh id and records whatever
    // resolution it implies.
    // ------------------------------------------------------------------------

    /// Identifier resolving to `obj`, named after it.
    pub fn ident(&mut self, obj: ObjectId) -> Ident {
        self.ident_at(obj, Pos::NONE)
    }

    pub fn ident_at(&mut self, obj: ObjectId, pos: Pos) -> Ident {
        let id = self.node();
        self.uses.insert(id, obj);
        let name = self.objects[obj.0 as usize].name.clone();
        Ident { id, pos, name }
    }

    /// The discard identifier; resolves to nothing.
    pub fn blank(&mut self) -> Ident {
        Ident {
            id: self.node(),
            pos: Pos::NONE,
            name: "_".into(),
        }
    }

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.node(),
            pos: Pos::NONE,
            kind,
        }
    }

    pub fn typed_expr(&mut self, kind: ExprKind, ty: Type) -> Expr {
        let expr = self.expr(kind);
        self.types.insert(expr.id, ty);
        expr
    }

    /// Identifier expression for `obj`.
    pub fn name(&mut self, obj: ObjectId) -> Expr {
        let ident = self.ident(obj);
        Expr {
            id: ident.id,
            pos: ident.pos,
            kind: ExprKind::Ident(ident),
        }
    }

    /// Identifier expression for a predeclared name; `None` when the
    /// universe has no such name.
    pub fn builtin(&mut self, name: &str) -> Option<Expr> {
        let obj = self.universe(name)?;
        Some(self.name(obj))
    }

    pub fn blank_expr(&mut self) -> Expr {
        let ident = self.blank();
        Expr {
            id: ident.id,
            pos: ident.pos,
            kind: ExprKind::Ident(ident),
        }
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.typed_expr(
            ExprKind::BasicLit {
                kind: LitKind::Int,
                value: value.to_string(),
            },
            Type::Basic(BasicKind::UntypedInt),
        )
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.typed_expr(
            ExprKind::BasicLit {
                kind: LitKind::String,
                value: format!("{value:?}"),
            },
            Type::Basic(BasicKind::UntypedString),
        )
    }

    pub fn call(&mut self, fun: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            fun: Box::new(fun),
            args,
            ellipsis: false,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, x: Expr, y: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    pub fn selector(&mut self, x: Expr, sel: ObjectId) -> Expr {
        let sel = self.ident(sel);
        self.expr(ExprKind::Selector {
            x: Box::new(x),
            sel,
        })
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.node(),
            pos: Pos::NONE,
            kind,
        }
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        Block { stmts }
    }
}

impl TypeOracle for TypeInfo {
    fn type_of(&self, node: NodeId) -> Option<&Type> {
        if let Some(ty) = self.types.get(&node) {
            return Some(ty);
        }
        let obj = self.uses.get(&node)?;
        self.objects.get(obj.0 as usize)?.ty.as_ref()
    }

    fn object_of(&self, node: NodeId) -> Option<ObjectId> {
        self.uses.get(&node).copied()
    }

    fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0 as usize)
    }

    fn implicit(&self, clause: NodeId) -> Option<ObjectId> {
        self.implicits.get(&clause).copied()
    }

    fn position(&self, pos: Pos) -> Option<Position> {
        self.fset.position(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_lookup() {
        let mut fset = FileSet::new();
        let base = fset.add_file("main.go", "package main\n\nfunc f() {}\n");
        let pos = fset.position(Pos(base + 14)).unwrap();
        assert_eq!(pos.to_string(), "main.go:3:1");
        let pos = fset.position(Pos(base + 19)).unwrap();
        assert_eq!(pos.to_string(), "main.go:3:6");
        assert!(fset.position(Pos::NONE).is_none());
    }

    #[test]
    fn test_second_file_offsets() {
        let mut fset = FileSet::new();
        fset.add_file("a.go", "abc");
        let base = fset.add_file("b.go", "x\ny");
        assert_eq!(fset.position(Pos(base + 2)).unwrap().to_string(), "b.go:2:1");
    }

    #[test]
    fn test_type_of_falls_back_to_object() {
        let mut info = TypeInfo::new();
        let x = info.declare(Object::new("x", ObjectKind::Var).with_type(Type::Basic(BasicKind::Int)));
        let ident = info.ident(x);
        assert_eq!(info.type_of(ident.id), Some(&Type::Basic(BasicKind::Int)));
        assert_eq!(info.object_of(ident.id), Some(x));
    }

    #[test]
    fn test_declare_named_refers_to_itself() {
        let mut info = TypeInfo::new();
        let point = info.declare_named("Point", Underlying::Struct);
        match &info.object(point).unwrap().ty {
            Some(Type::Named(named)) => assert_eq!(named.obj, point),
            other => panic!("unexpected type {other:?}"),
        }
    }

    #[test]
    fn test_universe_is_predeclared() {
        let info = TypeInfo::new();
        let len = info.universe("len").unwrap();
        assert_eq!(info.object(len).unwrap().kind, ObjectKind::Builtin);
        assert!(info.universe("nil").is_some());
        assert!(info.universe("fmt").is_none());
    }

    #[test]
    fn test_builtin_is_none_for_unknown_names() {
        let mut info = TypeInfo::new();
        let nil = info.builtin("nil").unwrap();
        assert_eq!(info.object_of(nil.id), info.universe("nil"));
        assert!(info.builtin("fmt").is_none());
    }
}
