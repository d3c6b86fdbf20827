//! Deferred calls.
//!
//! A function that defers calls gets a capture list initialised to `[]`.
//! Every `defer f(a, b)` appends `(f, (a, b))`; the body runs inside a
//! `try` whose `finally` replays the list in reverse:
//!
//! ```text
//! defers = []
//! try:
//!     ...
//!     defers.append((f, (a, b)))
//!     ...
//! finally:
//!     for fun, args in reversed(defers):
//!         fun(*args)
//! ```
//!
//! Unwinding driven by exceptions is not modelled beyond what `finally`
//! gives for free.

use super::Compiler;
use crate::error::{ErrorKind, Result};
use crate::go::{self, Block, ExprKind, StmtKind};
use crate::ir::{Expr, Identifier, Stmt};
use tracing::debug;

/// Whether `body` contains a `defer` of its own. Nested function literals
/// are not entered; their defers belong to them.
pub(crate) fn has_defer(body: &Block) -> bool {
    body.stmts.iter().any(stmt_has_defer)
}

fn stmt_has_defer(stmt: &go::Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Defer(_) => true,
        StmtKind::Labeled { stmt, .. } => stmt_has_defer(stmt),
        StmtKind::Block(block) => has_defer(block),
        StmtKind::If { init, body, els, .. } => {
            init.as_deref().is_some_and(stmt_has_defer)
                || has_defer(body)
                || els.as_deref().is_some_and(stmt_has_defer)
        }
        StmtKind::Switch { init, clauses, .. } | StmtKind::TypeSwitch { init, clauses, .. } => {
            init.as_deref().is_some_and(stmt_has_defer)
                || clauses.iter().any(|clause| clause.body.iter().any(stmt_has_defer))
        }
        StmtKind::For {
            init, post, body, ..
        } => {
            init.as_deref().is_some_and(stmt_has_defer)
                || post.as_deref().is_some_and(stmt_has_defer)
                || has_defer(body)
        }
        StmtKind::Range { body, .. } => has_defer(body),
        StmtKind::Bad
        | StmtKind::Decl(_)
        | StmtKind::Empty
        | StmtKind::Expr(_)
        | StmtKind::Send { .. }
        | StmtKind::IncDec { .. }
        | StmtKind::Assign { .. }
        | StmtKind::Go(_)
        | StmtKind::Return(_)
        | StmtKind::Branch { .. } => false,
    }
}

impl<'a> Compiler<'a> {
    /// `defer f(args)` appends `(f, (args,))` to the active capture list.
    pub(crate) fn compile_defer(&mut self, call: &go::Expr, out: &mut Vec<Stmt>) -> Result<()> {
        let Some(list) = self.frame().and_then(|frame| frame.defers.clone()) else {
            debug!("dropping defer outside a declared function");
            return Ok(());
        };
        let ExprKind::Call { fun, args, ellipsis } = &call.unparen().kind else {
            return Err(self.err(call.pos, ErrorKind::DeferNonCall(call.describe())));
        };

        let fun = self.expr(out, fun)?;
        let mut args = self.exprs(out, args)?;
        if *ellipsis {
            if let Some(last) = args.pop() {
                args.push(Expr::starred(last));
            }
        }
        let entry = Expr::tuple(vec![fun, Expr::tuple(args)]);
        out.push(Stmt::expr(Expr::call(
            Expr::attribute(Expr::name(list), "append"),
            vec![entry],
        )));
        Ok(())
    }

    /// Capture-list initialisation followed by `try: body finally: unwind`.
    pub(crate) fn wrap_defers(&mut self, list: Identifier, body: Vec<Stmt>) -> Vec<Stmt> {
        let fun = Expr::name(self.temp("fun"));
        let args = Expr::name(self.temp("args"));
        let unwind = Stmt::For {
            target: Expr::tuple(vec![fun.clone(), args.clone()]),
            iter: Expr::call(Expr::name("reversed"), vec![Expr::name(list.clone())]),
            body: vec![Stmt::expr(Expr::call(fun, vec![Expr::starred(args)]))],
        };
        vec![
            Stmt::assign(Expr::name(list), Expr::list(vec![])),
            Stmt::Try {
                body: crate::ir::or_pass(body),
                handlers: Vec::new(),
                finalbody: vec![unwind],
            },
        ]
    }
}
