//! Statement lowering.

use super::{Compiler, Origin};
use crate::error::{ErrorKind, Result};
use crate::expr::{CaseKind, is_inexact};
use crate::go::{
    self, AssignTok, Block, BranchTok, CaseClause, ExprKind, IncDec, NodeId, ObjectKind, StmtKind,
    Type, Underlying,
};
use crate::ir::{ExceptHandler, Expr, Operator, Stmt, UnaryOperator, or_pass};
use tracing::{debug, warn};

/// Placeholder called where a `fallthrough` would continue into the next case.
const FALLTHROUGH_MARKER: &str = "_TODO_fallthrough";

impl<'a> Compiler<'a> {
    /// Lower one statement, preceded by its comments when lowering a
    /// file-rooted construct.
    pub fn compile_stmt(&mut self, stmt: &go::Stmt) -> Result<Vec<Stmt>> {
        let mut out = self.comments_for(stmt.id);
        self.lower_stmt(stmt, &mut out)?;
        Ok(out)
    }

    pub fn compile_stmts(&mut self, stmts: &[go::Stmt]) -> Result<Vec<Stmt>> {
        let mut out = Vec::new();
        for stmt in stmts {
            out.extend(self.compile_stmt(stmt)?);
        }
        Ok(out)
    }

    pub fn compile_block(&mut self, block: &Block) -> Result<Vec<Stmt>> {
        self.compile_stmts(&block.stmts)
    }

    /// One `#` comment statement per line of every group attached to `node`.
    pub(crate) fn comments_for(&self, node: NodeId) -> Vec<Stmt> {
        let Origin::File {
            comments: Some(map),
        } = self.origin
        else {
            return Vec::new();
        };
        if !self.config.comments {
            return Vec::new();
        }
        map.get(node)
            .iter()
            .flat_map(|group| group.lines())
            .map(Stmt::comment)
            .collect()
    }

    fn lower_stmt(&mut self, stmt: &go::Stmt, out: &mut Vec<Stmt>) -> Result<()> {
        match &stmt.kind {
            StmtKind::Bad => return Err(self.err(stmt.pos, ErrorKind::UnknownStmt(stmt.describe()))),

            StmtKind::Decl(decl) => self.compile_decl_stmt(decl, out)?,

            StmtKind::Empty => {}

            StmtKind::Labeled { label, stmt: inner } => {
                debug!("dropping label {}", label.name);
                out.extend(self.compile_stmt(inner)?);
            }

            StmtKind::Expr(expr) => self.compile_expr_stmt(expr, out)?,

            StmtKind::Send { .. } => debug!("dropping channel send"),

            StmtKind::Go(_) => debug!("dropping go statement"),

            StmtKind::IncDec { x, tok } => {
                self.note_store(x)?;
                let target = self.expr(out, x)?;
                let op = match tok {
                    IncDec::Inc => Operator::Add,
                    IncDec::Dec => Operator::Sub,
                };
                out.push(Stmt::AugAssign {
                    target,
                    op,
                    value: Expr::num("1"),
                });
            }

            StmtKind::Assign { lhs, tok, rhs } => self.compile_assign(stmt, lhs, *tok, rhs, out)?,

            StmtKind::Defer(call) => self.compile_defer(call, out)?,

            StmtKind::Return(results) => {
                let value = if results.is_empty() {
                    self.named_results()
                } else {
                    self.exprs_tuple(out, results)?
                };
                out.push(Stmt::return_stmt(value));
            }

            StmtKind::Branch { tok, label } => {
                if let Some(label) = label {
                    debug!("dropping branch label {}", label.name);
                }
                match tok {
                    BranchTok::Break => out.push(Stmt::Break),
                    BranchTok::Continue => out.push(Stmt::Continue),
                    BranchTok::Goto => {
                        debug!("lowering goto to pass");
                        out.push(Stmt::Pass);
                    }
                    BranchTok::Fallthrough => {
                        match self.info.position(stmt.pos) {
                            Some(position) => warn!("{position}: fallthrough is not supported"),
                            None => warn!("fallthrough is not supported"),
                        }
                        out.push(Stmt::expr(Expr::call(Expr::name(FALLTHROUGH_MARKER), vec![])));
                    }
                }
            }

            StmtKind::Block(block) => out.extend(self.compile_block(block)?),

            StmtKind::If {
                init,
                cond,
                body,
                els,
            } => {
                if let Some(init) = init {
                    out.extend(self.compile_stmt(init)?);
                }
                let test = self.expr(out, cond)?;
                let body = self.compile_block(body)?;
                let orelse = match els {
                    Some(els) => self.compile_stmt(els)?,
                    None => Vec::new(),
                };
                out.push(Stmt::if_stmt(test, body, orelse));
            }

            StmtKind::Switch { init, tag, clauses } => {
                if let Some(init) = init {
                    out.extend(self.compile_stmt(init)?);
                }
                let tag = match tag {
                    Some(tag) => {
                        let value = self.expr(out, tag)?;
                        let name = Expr::name(self.temp("tag"));
                        out.push(Stmt::assign(name.clone(), value));
                        Some(name)
                    }
                    None => None,
                };
                self.compile_cases(clauses, tag.as_ref(), CaseKind::Value, None, out)?;
            }

            StmtKind::TypeSwitch {
                init,
                assign,
                clauses,
            } => self.compile_type_switch(init.as_deref(), assign, clauses, out)?,

            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                if let Some(init) = init {
                    out.extend(self.compile_stmt(init)?);
                }
                let test = match cond {
                    Some(cond) => self.expr(out, cond)?,
                    None => Expr::bool(true),
                };
                let mut lowered = self.compile_block(body)?;
                if let Some(post) = post {
                    lowered.extend(self.compile_stmt(post)?);
                }
                out.push(Stmt::While {
                    test,
                    body: or_pass(lowered),
                });
            }

            StmtKind::Range {
                key,
                value,
                tok,
                x,
                body,
            } => self.compile_range(stmt, key.as_ref(), value.as_ref(), *tok, x, body, out)?,
        }
        Ok(())
    }

    /// Names of the current function's named results, as a return value.
    fn named_results(&self) -> Option<Expr> {
        let results = &self.frame()?.results;
        if results.is_empty() {
            return None;
        }
        Some(Expr::make_tuple(results.iter().map(Expr::name).collect()))
    }

    fn compile_assign(
        &mut self,
        stmt: &go::Stmt,
        lhs: &[go::Expr],
        tok: AssignTok,
        rhs: &[go::Expr],
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        if matches!(tok, AssignTok::Assign | AssignTok::Define) {
            for target in lhs {
                self.note_store(target)?;
            }
            let targets = self.exprs(out, lhs)?;
            let Some(value) = self.exprs_tuple(out, rhs)? else {
                return Err(self.err(stmt.pos, ErrorKind::UnknownStmt(stmt.describe())));
            };
            out.push(Stmt::Assign { targets, value });
            return Ok(());
        }

        let ([target], [value]) = (lhs, rhs) else {
            return Err(self.err(
                stmt.pos,
                ErrorKind::CompoundArity {
                    lhs: lhs.len(),
                    rhs: rhs.len(),
                },
            ));
        };
        self.note_store(target)?;
        let target_ty = self.type_of(target.id);
        let lowered_target = self.expr(out, target)?;
        let lowered_value = self.expr(out, value)?;

        // x &^= y becomes x &= ~y
        let (op, value) = match tok {
            AssignTok::AndNotAssign => (
                Operator::BitAnd,
                Expr::unary(UnaryOperator::Invert, lowered_value),
            ),
            AssignTok::QuoAssign if is_inexact(target_ty) => (Operator::Div, lowered_value),
            tok => match augmented_op(tok) {
                Some(op) => (op, lowered_value),
                None => return Err(self.err(stmt.pos, ErrorKind::UnknownStmt(stmt.describe()))),
            },
        };
        out.push(Stmt::AugAssign {
            target: lowered_target,
            op,
            value,
        });
        Ok(())
    }

    fn compile_expr_stmt(&mut self, expr: &go::Expr, out: &mut Vec<Stmt>) -> Result<()> {
        if let Some((map, key)) = self.delete_args(expr) {
            let map = self.expr(out, map)?;
            let key = self.expr(out, key)?;
            out.push(Stmt::Try {
                body: vec![Stmt::Delete {
                    targets: vec![Expr::index(map, key)],
                }],
                handlers: vec![ExceptHandler {
                    typ: Some(Expr::name("KeyError")),
                    body: vec![Stmt::Pass],
                }],
                finalbody: Vec::new(),
            });
            return Ok(());
        }
        let value = self.expr(out, expr)?;
        out.push(Stmt::expr(value));
        Ok(())
    }

    /// `(map, key)` when `expr` calls the predeclared `delete`.
    fn delete_args<'e>(&self, expr: &'e go::Expr) -> Option<(&'e go::Expr, &'e go::Expr)> {
        let ExprKind::Call { fun, args, .. } = &expr.unparen().kind else {
            return None;
        };
        let (_, object) = self.object(fun.unparen().as_ident()?)?;
        if object.kind != ObjectKind::Builtin || object.name != "delete" {
            return None;
        }
        match args.as_slice() {
            [map, key] => Some((map, key)),
            _ => None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_range(
        &mut self,
        stmt: &go::Stmt,
        key: Option<&go::Expr>,
        value: Option<&go::Expr>,
        tok: AssignTok,
        x: &go::Expr,
        body: &Block,
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        if tok == AssignTok::Assign {
            for target in key.into_iter().chain(value) {
                self.note_store(target)?;
            }
        }
        let category = self.type_of(x.id).map(Type::underlying);
        let collection = self.expr(out, x)?;

        let (target, iter) = match (key, value) {
            (None, Some(_)) => {
                return Err(self.err(stmt.pos, ErrorKind::RangeValueWithoutKey));
            }
            (None, None) => (Expr::name("_"), range_of(category, collection)),
            (Some(key), None) => {
                let key = self.expr(out, key)?;
                let iter = match category {
                    Some(Underlying::Map) => collection,
                    _ => Expr::call(
                        Expr::name("range"),
                        vec![int_range_bound(category, collection)],
                    ),
                };
                (key, iter)
            }
            (Some(key), Some(value)) if key.is_blank() => {
                let value = self.expr(out, value)?;
                let iter = match category {
                    Some(Underlying::Map) => method_call(collection, "values"),
                    _ => collection,
                };
                (value, iter)
            }
            (Some(key), Some(value)) => {
                let key = self.expr(out, key)?;
                let value = self.expr(out, value)?;
                let iter = match category {
                    Some(Underlying::Map) => method_call(collection, "items"),
                    _ => Expr::call(Expr::name("enumerate"), vec![collection]),
                };
                (Expr::tuple(vec![key, value]), iter)
            }
        };

        let body = or_pass(self.compile_block(body)?);
        out.push(Stmt::For { target, iter, body });
        Ok(())
    }

    fn compile_type_switch(
        &mut self,
        init: Option<&go::Stmt>,
        assign: &go::Stmt,
        clauses: &[CaseClause],
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        if let Some(init) = init {
            out.extend(self.compile_stmt(init)?);
        }

        let (binding, guard) = match &assign.kind {
            StmtKind::Expr(guard) => (None, guard),
            StmtKind::Assign { lhs, rhs, .. } => match (lhs.as_slice(), rhs.as_slice()) {
                ([target], [guard]) => match target.as_ident() {
                    Some(ident) => (Some(ident), guard),
                    None => {
                        return Err(self.err(target.pos, ErrorKind::TypeSwitchGuard(target.describe())));
                    }
                },
                _ => return Err(self.err(assign.pos, ErrorKind::TypeSwitchGuard(assign.describe()))),
            },
            _ => return Err(self.err(assign.pos, ErrorKind::TypeSwitchGuard(assign.describe()))),
        };
        let ExprKind::TypeAssert { x, ty: None } = &guard.unparen().kind else {
            return Err(self.err(guard.pos, ErrorKind::TypeSwitchGuard(guard.describe())));
        };

        let probed = self.expr(out, x)?;
        let (subject, value) = match binding.filter(|ident| !ident.is_blank()) {
            Some(ident) => {
                let name = Expr::name(self.temp(&ident.name));
                out.push(Stmt::assign(name.clone(), probed));
                (name.clone(), Some(name))
            }
            None => (probed, None),
        };
        let tag = Expr::name(self.temp("tag"));
        out.push(Stmt::assign(
            tag.clone(),
            Expr::call(Expr::name("type"), vec![subject]),
        ));
        self.compile_cases(clauses, Some(&tag), CaseKind::Type, value.as_ref(), out)
    }

    /// Fold case clauses into an if/elif chain whose final `else` is the
    /// default clause, wherever that clause appeared.
    fn compile_cases(
        &mut self,
        clauses: &[CaseClause],
        tag: Option<&Expr>,
        kind: CaseKind,
        binding: Option<&Expr>,
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        let mut tests_pre = Vec::new();
        let mut arms = Vec::with_capacity(clauses.len());
        let mut default = Vec::new();

        for clause in clauses {
            let test = self.case_test(&mut tests_pre, clause, tag, kind)?;
            let mut body = Vec::new();
            if let Some(value) = binding {
                if let Some(implicit) = self.info.implicit(clause.id) {
                    let name = self.object_name(implicit)?;
                    body.push(Stmt::assign(Expr::name(name), value.clone()));
                }
            }
            body.extend(self.compile_stmts(&clause.body)?);
            match test {
                Some(test) => arms.push((test, body)),
                None => default = body,
            }
        }

        out.extend(tests_pre);
        let chain = arms
            .into_iter()
            .rev()
            .fold(default, |orelse, (test, body)| {
                vec![Stmt::if_stmt(test, body, orelse)]
            });
        out.extend(chain);
        Ok(())
    }
}

fn augmented_op(tok: AssignTok) -> Option<Operator> {
    Some(match tok {
        AssignTok::AddAssign => Operator::Add,
        AssignTok::SubAssign => Operator::Sub,
        AssignTok::MulAssign => Operator::Mult,
        AssignTok::QuoAssign => Operator::FloorDiv,
        AssignTok::RemAssign => Operator::Mod,
        AssignTok::AndAssign => Operator::BitAnd,
        AssignTok::OrAssign => Operator::BitOr,
        AssignTok::XorAssign => Operator::BitXor,
        AssignTok::ShlAssign => Operator::LShift,
        AssignTok::ShrAssign => Operator::RShift,
        AssignTok::Assign | AssignTok::Define | AssignTok::AndNotAssign => return None,
    })
}

fn is_int(category: Option<Underlying>) -> bool {
    matches!(category, Some(Underlying::Basic(kind)) if kind.is_integer())
}

/// Iterable for a range with no bindings.
fn range_of(category: Option<Underlying>, collection: Expr) -> Expr {
    if is_int(category) {
        Expr::call(Expr::name("range"), vec![collection])
    } else {
        collection
    }
}

/// Upper bound of the index range: the integer itself, else its length.
fn int_range_bound(category: Option<Underlying>, collection: Expr) -> Expr {
    if is_int(category) {
        collection
    } else {
        Expr::call(Expr::name("len"), vec![collection])
    }
}

fn method_call(receiver: Expr, method: &str) -> Expr {
    Expr::call(Expr::attribute(receiver, method), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augmented_op_table() {
        assert_eq!(augmented_op(AssignTok::ShlAssign), Some(Operator::LShift));
        assert_eq!(augmented_op(AssignTok::QuoAssign), Some(Operator::FloorDiv));
        assert_eq!(augmented_op(AssignTok::AndNotAssign), None);
        assert_eq!(augmented_op(AssignTok::Define), None);
    }

    #[test]
    fn test_range_bounds() {
        let int = Some(Underlying::Basic(go::BasicKind::Int));
        assert_eq!(int_range_bound(int, Expr::name("n")), Expr::name("n"));
        assert_eq!(
            int_range_bound(Some(Underlying::Slice), Expr::name("xs")),
            Expr::call(Expr::name("len"), vec![Expr::name("xs")])
        );
        assert_eq!(
            range_of(int, Expr::name("n")),
            Expr::call(Expr::name("range"), vec![Expr::name("n")])
        );
    }
}
