//! Statement, declaration and type lowering.
//!
//! A [`Compiler`] owns the naming scope for one compilation unit and
//! threads it through every construct it lowers. Expressions are handed to
//! an [`ExprLowering`] engine; whatever statements the engine hoists are
//! spliced in front of the statement that needed them.

mod decl;
mod defers;
mod module;
mod stmt;

pub use decl::{DeclArtifact, FuncDecl, zero_value};
pub use module::{ModuleBuilder, compile_files};

use crate::config::LoweringConfig;
use crate::error::{ErrorKind, LowerError, Result};
use crate::expr::{CaseKind, ExprCompiler, ExprLowering};
use crate::go::{self, CommentMap, Ident, NodeId, Object, ObjectId, ObjectKind, Pos, Type};
use crate::ir::{self, Identifier};
use crate::oracle::TypeOracle;
use crate::scope::{Scope, escape};

static DEFAULT_ENGINE: ExprCompiler = ExprCompiler;

/// Where the construct being lowered was reached from.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// A file-level declaration, including the bodies of declared
    /// functions. Comments are carried over and deferred calls recorded.
    File { comments: Option<&'a CommentMap> },
    /// The body of a function literal reached through an expression.
    Literal,
}

/// State of the function body currently being lowered.
#[derive(Debug)]
pub(crate) struct FunctionFrame {
    /// Capture-list temporary, present when the body defers calls.
    pub(crate) defers: Option<Identifier>,
    /// Named results, returned by a bare `return`.
    pub(crate) results: Vec<Identifier>,
    /// Scope depth of the body's own level.
    depth: usize,
    pub(crate) globals: Vec<Identifier>,
    pub(crate) nonlocals: Vec<Identifier>,
}

impl FunctionFrame {
    fn new(depth: usize) -> Self {
        Self {
            defers: None,
            results: Vec::new(),
            depth,
            globals: Vec::new(),
            nonlocals: Vec::new(),
        }
    }
}

pub struct Compiler<'a> {
    info: &'a dyn TypeOracle,
    engine: &'a dyn ExprLowering,
    config: LoweringConfig,
    scope: Scope,
    origin: Origin<'a>,
    frame: Option<FunctionFrame>,
}

impl<'a> Compiler<'a> {
    /// File-level compiler using the default expression engine.
    pub fn new(info: &'a dyn TypeOracle) -> Self {
        Self {
            info,
            engine: &DEFAULT_ENGINE,
            config: LoweringConfig::default(),
            scope: Scope::new(),
            origin: Origin::File { comments: None },
            frame: None,
        }
    }

    pub fn with_config(mut self, config: LoweringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_engine(mut self, engine: &'a dyn ExprLowering) -> Self {
        self.engine = engine;
        self
    }

    /// Attach a comment index; only consulted for file-rooted constructs.
    pub fn with_comments(mut self, comments: &'a CommentMap) -> Self {
        self.set_comments(Some(comments));
        self
    }

    pub(crate) fn set_comments(&mut self, comments: Option<&'a CommentMap>) {
        if let Origin::File { comments: current } = &mut self.origin {
            *current = comments;
        }
    }

    pub fn info(&self) -> &'a dyn TypeOracle {
        self.info
    }

    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    pub fn origin(&self) -> Origin<'a> {
        self.origin
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Build an error, resolving `pos` when the oracle knows it.
    pub fn err(&self, pos: Pos, kind: ErrorKind) -> LowerError {
        LowerError::new(self.info.position(pos), kind)
    }

    pub fn type_of(&self, node: NodeId) -> Option<&'a Type> {
        self.info.type_of(node)
    }

    pub fn object(&self, ident: &Ident) -> Option<(ObjectId, &'a Object)> {
        let id = self.info.object_of(ident.id)?;
        Some((id, self.info.object(id)?))
    }

    /// Stable name for the object `ident` resolves to; `_` for the blank
    /// identifier.
    pub fn identifier(&mut self, ident: &Ident) -> Result<Identifier> {
        match self.object(ident) {
            Some((id, object)) => Ok(self.scope.object_name(id, object)),
            None if ident.is_blank() => Ok("_".into()),
            None => Err(self.err(ident.pos, ErrorKind::Unresolved(ident.name.clone()))),
        }
    }

    /// Attribute name for the field or method `ident` resolves to. The
    /// declaration and every selector agree on it.
    pub fn member_name(&mut self, ident: &Ident) -> Identifier {
        match self.object(ident) {
            Some((id, object)) => self.scope.member_name(id, object),
            None => escape(&ident.name),
        }
    }

    pub fn object_name(&mut self, id: ObjectId) -> Result<Identifier> {
        let info = self.info;
        match info.object(id) {
            Some(object) => Ok(self.scope.object_name(id, object)),
            None => Err(LowerError::new(None, ErrorKind::Unresolved(format!("{id:?}")))),
        }
    }

    /// Fresh temporary in the current function level.
    pub fn temp(&mut self, base: &str) -> Identifier {
        self.scope.temp(base)
    }

    /// Lower `f` inside a nested function level with its own frame.
    pub(crate) fn in_function<R>(
        &mut self,
        origin: Origin<'a>,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.scope.push();
        let saved_frame = self.frame.replace(FunctionFrame::new(self.scope.depth()));
        let saved_origin = std::mem::replace(&mut self.origin, origin);
        let result = f(self);
        self.origin = saved_origin;
        self.frame = saved_frame;
        self.scope.pop();
        result
    }

    pub(crate) fn frame_mut(&mut self) -> Option<&mut FunctionFrame> {
        self.frame.as_mut()
    }

    pub(crate) fn frame(&self) -> Option<&FunctionFrame> {
        self.frame.as_ref()
    }

    /// Record a store to `target` so the enclosing function can declare
    /// `global`/`nonlocal` names.
    pub(crate) fn note_store(&mut self, target: &go::Expr) -> Result<()> {
        let Some(ident) = target.unparen().as_ident() else {
            return Ok(());
        };
        let Some(depth) = self.frame.as_ref().map(|f| f.depth) else {
            return Ok(());
        };
        let Some((id, object)) = self.object(ident) else {
            return Ok(());
        };
        if object.kind != ObjectKind::Var {
            return Ok(());
        }
        let name = self.scope.object_name(id, object);
        let home = self.scope.home(id);
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };
        if object.package_level {
            if !frame.globals.contains(&name) {
                frame.globals.push(name);
            }
        } else if home.is_some_and(|home| home >= 1 && home + 1 < depth)
            && !frame.nonlocals.contains(&name)
        {
            frame.nonlocals.push(name);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Expression helpers. Hoisted statements go to `pre`, in the order the
    // engine produced them.
    // ------------------------------------------------------------------------

    pub(crate) fn expr(&mut self, pre: &mut Vec<ir::Stmt>, expr: &go::Expr) -> Result<ir::Expr> {
        let engine = self.engine;
        Ok(engine.lower_expr(self, expr)?.splice(pre))
    }

    pub(crate) fn exprs(
        &mut self,
        pre: &mut Vec<ir::Stmt>,
        exprs: &[go::Expr],
    ) -> Result<Vec<ir::Expr>> {
        let engine = self.engine;
        Ok(engine.lower_exprs(self, exprs)?.splice(pre))
    }

    pub(crate) fn exprs_tuple(
        &mut self,
        pre: &mut Vec<ir::Stmt>,
        exprs: &[go::Expr],
    ) -> Result<Option<ir::Expr>> {
        let engine = self.engine;
        Ok(engine.lower_exprs_tuple(self, exprs)?.splice(pre))
    }

    pub(crate) fn case_test(
        &mut self,
        pre: &mut Vec<ir::Stmt>,
        clause: &go::CaseClause,
        tag: Option<&ir::Expr>,
        kind: CaseKind,
    ) -> Result<Option<ir::Expr>> {
        let engine = self.engine;
        Ok(engine.case_test(self, clause, tag, kind)?.splice(pre))
    }
}
