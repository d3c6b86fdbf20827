//! Expression lowering.
//!
//! [`ExprLowering`] is the seam between statement lowering and expression
//! lowering. An engine returns the lowered expression together with the
//! statements that must run before it ([`Lowered`]); callers splice those
//! in. [`ExprCompiler`] is the default engine.

use crate::compiler::{Compiler, zero_value};
use crate::error::{ErrorKind, Result};
use crate::go::{
    self, BasicKind, BinaryOp, CaseClause, Constant, ExprKind, LitKind, ObjectKind, Type,
    Underlying, UnaryOp,
};
use crate::ir::{
    BoolOperator, CmpOperator, Comprehension, Expr, Keyword, Operator, Slice, Stmt, UnaryOperator,
};

/// A lowered value plus the statements hoisted while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered<T = Expr> {
    pub value: T,
    pub hoisted: Vec<Stmt>,
}

impl<T> Lowered<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            hoisted: Vec::new(),
        }
    }

    pub fn with_hoisted(value: T, hoisted: Vec<Stmt>) -> Self {
        Self { value, hoisted }
    }

    /// Move the hoisted statements to the end of `into` and return the value.
    pub fn splice(self, into: &mut Vec<Stmt>) -> T {
        into.extend(self.hoisted);
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lowered<U> {
        Lowered {
            value: f(self.value),
            hoisted: self.hoisted,
        }
    }
}

/// Whether a case clause lists values or types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Value,
    Type,
}

/// Expression-lowering contract consumed by statement lowering.
pub trait ExprLowering {
    fn lower_expr(&self, c: &mut Compiler<'_>, expr: &go::Expr) -> Result<Lowered>;

    /// Runtime class of a type expression, for type-switch cases.
    fn lower_type(&self, c: &mut Compiler<'_>, expr: &go::Expr) -> Result<Lowered> {
        self.lower_expr(c, expr)
    }

    /// Lower each expression in order (assignment targets, call arguments).
    fn lower_exprs(&self, c: &mut Compiler<'_>, exprs: &[go::Expr]) -> Result<Lowered<Vec<Expr>>> {
        let mut hoisted = Vec::new();
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.lower_expr(c, expr)?.splice(&mut hoisted));
        }
        Ok(Lowered::with_hoisted(values, hoisted))
    }

    /// Lower a right-hand side: `None` when empty, the value itself when
    /// there is one, a tuple otherwise.
    fn lower_exprs_tuple(
        &self,
        c: &mut Compiler<'_>,
        exprs: &[go::Expr],
    ) -> Result<Lowered<Option<Expr>>> {
        Ok(self.lower_exprs(c, exprs)?.map(|values| {
            if values.is_empty() {
                None
            } else {
                Some(Expr::make_tuple(values))
            }
        }))
    }

    /// Test for one case clause: a disjunction of `tag == value` (or of the
    /// bare values when there is no tag). `None` for the default clause.
    fn case_test(
        &self,
        c: &mut Compiler<'_>,
        clause: &CaseClause,
        tag: Option<&Expr>,
        kind: CaseKind,
    ) -> Result<Lowered<Option<Expr>>> {
        let mut hoisted = Vec::new();
        let mut tests = Vec::with_capacity(clause.list.len());
        for value in &clause.list {
            let lowered = match kind {
                CaseKind::Value => self.lower_expr(c, value)?,
                CaseKind::Type => self.lower_type(c, value)?,
            };
            let value = lowered.splice(&mut hoisted);
            tests.push(match tag {
                Some(tag) => Expr::compare(tag.clone(), CmpOperator::Eq, value),
                None => value,
            });
        }
        let test = match tests.len() {
            0 => None,
            1 => tests.pop(),
            _ => Some(Expr::BoolOp {
                op: BoolOperator::Or,
                values: tests,
            }),
        };
        Ok(Lowered::with_hoisted(test, hoisted))
    }
}

/// Default expression engine.
///
/// Function literals whose body is more than a single `return` cannot be
/// Python lambdas; they are hoisted as a nested `def` under a temporary
/// name and referenced by that name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExprCompiler;

impl ExprLowering for ExprCompiler {
    fn lower_expr(&self, c: &mut Compiler<'_>, expr: &go::Expr) -> Result<Lowered> {
        let mut pre = Vec::new();
        let value = self.compile(c, &mut pre, expr)?;
        Ok(Lowered::with_hoisted(value, pre))
    }

    fn lower_type(&self, c: &mut Compiler<'_>, expr: &go::Expr) -> Result<Lowered> {
        let value = self.compile_type(c, expr)?;
        Ok(Lowered::new(value))
    }
}

impl ExprCompiler {
    fn compile(&self, c: &mut Compiler<'_>, pre: &mut Vec<Stmt>, expr: &go::Expr) -> Result<Expr> {
        match &expr.kind {
            ExprKind::Ident(ident) => self.compile_ident(c, ident),

            ExprKind::BasicLit { kind, value } => Ok(compile_lit(*kind, value)),

            ExprKind::Composite { elts, .. } => self.compile_composite(c, pre, expr, elts),

            ExprKind::FuncLit { ty, body } => Ok(c.compile_func_lit(ty, body)?.splice(pre)),

            ExprKind::Paren(inner) => self.compile(c, pre, inner),

            ExprKind::Selector { x, sel } => {
                if let Some(ident) = x.unparen().as_ident() {
                    if let Some((_, object)) = c.object(ident) {
                        if object.kind == ObjectKind::PkgName {
                            return Ok(Expr::attribute(Expr::name(&object.name), sel.name.clone()));
                        }
                    }
                }
                let value = self.compile(c, pre, x)?;
                Ok(Expr::attribute(value, c.member_name(sel)))
            }

            ExprKind::Index { x, index } => {
                let value = self.compile(c, pre, x)?;
                let index = self.compile(c, pre, index)?;
                Ok(Expr::index(value, index))
            }

            ExprKind::Slice { x, low, high, .. } => {
                let value = self.compile(c, pre, x)?;
                let lower = low.as_deref().map(|e| self.compile(c, pre, e)).transpose()?;
                let upper = high.as_deref().map(|e| self.compile(c, pre, e)).transpose()?;
                Ok(Expr::Subscript {
                    value: Box::new(value),
                    slice: Box::new(Slice::Range {
                        lower,
                        upper,
                        step: None,
                    }),
                })
            }

            // Duck typing: the asserted type changes nothing at runtime.
            ExprKind::TypeAssert { x, ty: Some(_) } => self.compile(c, pre, x),

            ExprKind::Call {
                fun,
                args,
                ellipsis,
            } => self.compile_call(c, pre, expr, fun, args, *ellipsis),

            ExprKind::Star(x) => self.compile(c, pre, x),

            ExprKind::Unary { op, x } => {
                let op = match op {
                    UnaryOp::Addr => return self.compile(c, pre, x),
                    UnaryOp::Plus => UnaryOperator::UAdd,
                    UnaryOp::Neg => UnaryOperator::USub,
                    UnaryOp::Not => UnaryOperator::Not,
                    UnaryOp::Xor => UnaryOperator::Invert,
                    UnaryOp::Recv => {
                        return Err(c.err(expr.pos, ErrorKind::Unsupported("channel receive".into())));
                    }
                };
                let operand = self.compile(c, pre, x)?;
                Ok(Expr::unary(op, operand))
            }

            ExprKind::Binary { op, x, y } => {
                let left = self.compile(c, pre, x)?;
                let right = self.compile(c, pre, y)?;
                Ok(compile_binary(c, expr, *op, left, right))
            }

            ExprKind::Bad
            | ExprKind::TypeAssert { ty: None, .. }
            | ExprKind::KeyValue { .. }
            | ExprKind::ArrayType { .. }
            | ExprKind::StructType(_)
            | ExprKind::FuncType(_)
            | ExprKind::InterfaceType
            | ExprKind::MapType { .. }
            | ExprKind::ChanType(_)
            | ExprKind::Ellipsis(_) => Err(c.err(expr.pos, ErrorKind::UnknownExpr(expr.describe()))),
        }
    }

    fn compile_ident(&self, c: &mut Compiler<'_>, ident: &go::Ident) -> Result<Expr> {
        let Some((_, object)) = c.object(ident) else {
            return Ok(Expr::name(c.identifier(ident)?));
        };
        match object.kind {
            ObjectKind::Nil => Ok(Expr::none()),
            ObjectKind::Const if object.package_level && ident.name == "iota" => Err(c.err(
                ident.pos,
                ErrorKind::Unsupported("iota outside a constant declaration".into()),
            )),
            ObjectKind::Const if object.package_level && matches!(ident.name.as_str(), "true" | "false") => {
                match object.constant {
                    Some(Constant::Bool(value)) => Ok(Expr::bool(value)),
                    _ => Ok(Expr::name(c.identifier(ident)?)),
                }
            }
            ObjectKind::TypeName => self.compile_type(c, &ident_expr(ident)),
            ObjectKind::Builtin => Err(c.err(
                ident.pos,
                ErrorKind::Unsupported(format!("builtin {} used as a value", ident.name)),
            )),
            _ => Ok(Expr::name(c.identifier(ident)?)),
        }
    }

    /// Runtime class for a type expression.
    fn compile_type(&self, c: &mut Compiler<'_>, expr: &go::Expr) -> Result<Expr> {
        match &expr.kind {
            ExprKind::Paren(inner) | ExprKind::Star(inner) => self.compile_type(c, inner),
            ExprKind::ArrayType { .. } => Ok(Expr::name("list")),
            ExprKind::MapType { .. } => Ok(Expr::name("dict")),
            ExprKind::Selector { .. } => {
                let mut pre = Vec::new();
                self.compile(c, &mut pre, expr)
            }
            ExprKind::Ident(ident) => {
                let Some((_, object)) = c.object(ident) else {
                    return Err(c.err(ident.pos, ErrorKind::Unresolved(ident.name.clone())));
                };
                match (object.kind, object.ty.as_ref()) {
                    (ObjectKind::Nil, _) => Ok(Expr::call(Expr::name("type"), vec![Expr::none()])),
                    (ObjectKind::TypeName, Some(Type::Basic(kind))) => basic_class(*kind)
                        .map(Expr::name)
                        .ok_or_else(|| c.err(ident.pos, ErrorKind::TypeCase(kind.name().into()))),
                    (ObjectKind::TypeName, Some(ty)) if ty.underlying() == Underlying::Interface => {
                        Err(c.err(ident.pos, ErrorKind::TypeCase(ident.name.clone())))
                    }
                    (ObjectKind::TypeName, _) => Ok(Expr::name(c.identifier(ident)?)),
                    _ => Err(c.err(ident.pos, ErrorKind::TypeCase(ident.name.clone()))),
                }
            }
            _ => Err(c.err(expr.pos, ErrorKind::TypeCase(expr.describe().into()))),
        }
    }

    fn compile_call(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        call: &go::Expr,
        fun: &go::Expr,
        args: &[go::Expr],
        ellipsis: bool,
    ) -> Result<Expr> {
        let callee = fun.unparen();
        if let Some(ident) = callee.as_ident() {
            if let Some((_, object)) = c.object(ident) {
                match object.kind {
                    ObjectKind::Builtin => {
                        return self.compile_builtin(c, pre, call, &ident.name, args, ellipsis);
                    }
                    ObjectKind::TypeName => {
                        return self.compile_conversion(c, pre, callee, object.ty.as_ref(), args);
                    }
                    _ => {}
                }
            }
        }
        if is_type_expr(callee) {
            return self.compile_conversion(c, pre, callee, None, args);
        }

        let func = self.compile(c, pre, fun)?;
        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            lowered.push(self.compile(c, pre, arg)?);
        }
        if ellipsis {
            if let Some(last) = lowered.pop() {
                lowered.push(Expr::starred(last));
            }
        }
        Ok(Expr::call(func, lowered))
    }

    /// `T(x)`: numeric and string conversions map to the Python builtins,
    /// named types to their class, anything else passes the value through.
    fn compile_conversion(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        callee: &go::Expr,
        target: Option<&Type>,
        args: &[go::Expr],
    ) -> Result<Expr> {
        let [arg] = args else {
            return Err(c.err(callee.pos, ErrorKind::UnknownExpr("conversion")));
        };
        let value = self.compile(c, pre, arg)?;
        match target {
            Some(Type::Basic(BasicKind::String)) if is_integer(c.type_of(arg.id)) => {
                Ok(Expr::call(Expr::name("chr"), vec![value]))
            }
            Some(Type::Basic(kind)) => match basic_class(*kind) {
                Some(class) => Ok(Expr::call(Expr::name(class), vec![value])),
                None => Ok(value),
            },
            Some(Type::Named(_)) => {
                let class = self.compile_type(c, callee)?;
                Ok(Expr::call(class, vec![value]))
            }
            _ => Ok(value),
        }
    }

    fn compile_builtin(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        call: &go::Expr,
        name: &str,
        args: &[go::Expr],
        ellipsis: bool,
    ) -> Result<Expr> {
        match name {
            "len" | "cap" => {
                let args = self.compile_args(c, pre, args)?;
                Ok(Expr::call(Expr::name("len"), args))
            }
            "min" | "max" => {
                let args = self.compile_args(c, pre, args)?;
                Ok(Expr::call(Expr::name(name), args))
            }
            "append" => {
                let mut args = self.compile_args(c, pre, args)?;
                if args.is_empty() {
                    return Err(c.err(call.pos, ErrorKind::UnknownExpr("append without arguments")));
                }
                let slice = args.remove(0);
                if args.is_empty() {
                    return Ok(slice);
                }
                // A nil slice is None; `or []` makes it concatenable.
                let base = Expr::BoolOp {
                    op: BoolOperator::Or,
                    values: vec![slice, Expr::list(vec![])],
                };
                let tail = if ellipsis {
                    args.pop().unwrap_or_else(|| Expr::list(vec![]))
                } else {
                    Expr::list(args)
                };
                Ok(Expr::binop(base, Operator::Add, tail))
            }
            "make" => self.compile_make(c, pre, call, args),
            "new" => {
                let Some(ty) = args.first().and_then(|arg| c.type_of(arg.id)) else {
                    return Err(c.err(call.pos, ErrorKind::MissingType("new")));
                };
                zero_value(ty).map_err(|kind| c.err(call.pos, kind))
            }
            "delete" => {
                let args = self.compile_args(c, pre, args)?;
                let [map, key] = <[Expr; 2]>::try_from(args)
                    .map_err(|_| c.err(call.pos, ErrorKind::UnknownExpr("delete")))?;
                Ok(Expr::call(
                    Expr::attribute(map, "pop"),
                    vec![key, Expr::none()],
                ))
            }
            "print" => {
                let args = self.compile_args(c, pre, args)?;
                Ok(Expr::Call {
                    func: Box::new(Expr::name("print")),
                    args,
                    keywords: vec![
                        Keyword {
                            arg: "sep".into(),
                            value: Expr::string(""),
                        },
                        Keyword {
                            arg: "end".into(),
                            value: Expr::string(""),
                        },
                    ],
                })
            }
            "println" => {
                let args = self.compile_args(c, pre, args)?;
                Ok(Expr::call(Expr::name("print"), args))
            }
            _ => Err(c.err(call.pos, ErrorKind::Unsupported(format!("builtin {name}")))),
        }
    }

    fn compile_make(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        call: &go::Expr,
        args: &[go::Expr],
    ) -> Result<Expr> {
        let Some(ty) = c.type_of(call.id).or_else(|| args.first().and_then(|a| c.type_of(a.id)))
        else {
            return Err(c.err(call.pos, ErrorKind::MissingType("make")));
        };
        match ty {
            Type::Map { .. } => Ok(Expr::Dict {
                keys: vec![],
                values: vec![],
            }),
            Type::Slice(elem) => {
                let Some(len) = args.get(1) else {
                    return Err(c.err(call.pos, ErrorKind::UnknownExpr("make without length")));
                };
                let len = self.compile(c, pre, len)?;
                let elt = zero_value(elem).map_err(|kind| c.err(call.pos, kind))?;
                Ok(Expr::ListComp {
                    elt: Box::new(elt),
                    generators: vec![Comprehension {
                        target: Expr::name("_"),
                        iter: Expr::call(Expr::name("range"), vec![len]),
                    }],
                })
            }
            other => Err(c.err(call.pos, ErrorKind::Unsupported(format!("make of {}", other.describe())))),
        }
    }

    fn compile_args(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        args: &[go::Expr],
    ) -> Result<Vec<Expr>> {
        args.iter().map(|arg| self.compile(c, pre, arg)).collect()
    }

    fn compile_composite(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        expr: &go::Expr,
        elts: &[go::Expr],
    ) -> Result<Expr> {
        let Some(ty) = c.type_of(expr.id) else {
            return Err(c.err(expr.pos, ErrorKind::MissingType("composite literal")));
        };
        let ty = match ty {
            Type::Pointer(inner) => inner.as_ref(),
            ty => ty,
        };

        match ty {
            Type::Named(named) if named.underlying == Underlying::Map => {
                self.compile_dict(c, pre, elts)
            }
            Type::Named(named) => {
                let class = Expr::name(c.object_name(named.obj)?);
                if named.underlying == Underlying::Struct {
                    self.compile_struct_lit(c, pre, class, elts)
                } else {
                    let list = self.compile_list(c, pre, elts)?;
                    Ok(Expr::call(class, vec![Expr::list(list)]))
                }
            }
            Type::Map { .. } => self.compile_dict(c, pre, elts),
            Type::Slice(_) => Ok(Expr::list(self.compile_list(c, pre, elts)?)),
            Type::Array { len, elem } => {
                let mut elts = self.compile_list(c, pre, elts)?;
                while (elts.len() as u64) < *len {
                    elts.push(zero_value(elem).map_err(|kind| c.err(expr.pos, kind))?);
                }
                Ok(Expr::list(elts))
            }
            other => Err(c.err(
                expr.pos,
                ErrorKind::Unsupported(format!("composite literal of {}", other.describe())),
            )),
        }
    }

    fn compile_struct_lit(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        class: Expr,
        elts: &[go::Expr],
    ) -> Result<Expr> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        for elt in elts {
            match &elt.kind {
                ExprKind::KeyValue { key, value } => {
                    let Some(field) = key.as_ident() else {
                        return Err(c.err(key.pos, ErrorKind::UnknownExpr(key.describe())));
                    };
                    let arg = c.member_name(field);
                    let value = self.compile(c, pre, value)?;
                    keywords.push(Keyword { arg, value });
                }
                _ => args.push(self.compile(c, pre, elt)?),
            }
        }
        Ok(Expr::Call {
            func: Box::new(class),
            args,
            keywords,
        })
    }

    fn compile_list(
        &self,
        c: &mut Compiler<'_>,
        pre: &mut Vec<Stmt>,
        elts: &[go::Expr],
    ) -> Result<Vec<Expr>> {
        let mut items = Vec::with_capacity(elts.len());
        for elt in elts {
            if let ExprKind::KeyValue { .. } = elt.kind {
                return Err(c.err(
                    elt.pos,
                    ErrorKind::Unsupported("indexed elements in a slice literal".into()),
                ));
            }
            items.push(self.compile(c, pre, elt)?);
        }
        Ok(items)
    }

    fn compile_dict(&self, c: &mut Compiler<'_>, pre: &mut Vec<Stmt>, elts: &[go::Expr]) -> Result<Expr> {
        let mut keys = Vec::with_capacity(elts.len());
        let mut values = Vec::with_capacity(elts.len());
        for elt in elts {
            let ExprKind::KeyValue { key, value } = &elt.kind else {
                return Err(c.err(elt.pos, ErrorKind::UnknownExpr(elt.describe())));
            };
            keys.push(self.compile(c, pre, key)?);
            values.push(self.compile(c, pre, value)?);
        }
        Ok(Expr::Dict { keys, values })
    }
}

fn ident_expr(ident: &go::Ident) -> go::Expr {
    go::Expr {
        id: ident.id,
        pos: ident.pos,
        kind: ExprKind::Ident(ident.clone()),
    }
}

fn is_type_expr(expr: &go::Expr) -> bool {
    match &expr.kind {
        ExprKind::ArrayType { .. }
        | ExprKind::MapType { .. }
        | ExprKind::FuncType(_)
        | ExprKind::ChanType(_)
        | ExprKind::InterfaceType
        | ExprKind::StructType(_) => true,
        ExprKind::Star(inner) | ExprKind::Paren(inner) => is_type_expr(inner),
        _ => false,
    }
}

fn is_integer(ty: Option<&Type>) -> bool {
    match ty.map(Type::underlying) {
        Some(Underlying::Basic(kind)) => kind.is_integer(),
        _ => false,
    }
}

pub(crate) fn is_inexact(ty: Option<&Type>) -> bool {
    match ty.map(Type::underlying) {
        Some(Underlying::Basic(kind)) => kind.is_float() || kind.is_complex(),
        _ => false,
    }
}

/// Python class holding values of a basic Go type.
fn basic_class(kind: BasicKind) -> Option<&'static str> {
    if kind.is_integer() {
        Some("int")
    } else if kind.is_float() {
        Some("float")
    } else if kind.is_complex() {
        Some("complex")
    } else if kind.is_string() {
        Some("str")
    } else if kind.is_boolean() {
        Some("bool")
    } else {
        None
    }
}

fn compile_binary(c: &Compiler<'_>, expr: &go::Expr, op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let op = match op {
        BinaryOp::Add => Operator::Add,
        BinaryOp::Sub => Operator::Sub,
        BinaryOp::Mul => Operator::Mult,
        BinaryOp::Quo => {
            let ty = c.type_of(expr.id).or_else(|| match &expr.kind {
                ExprKind::Binary { x, .. } => c.type_of(x.id),
                _ => None,
            });
            if is_inexact(ty) {
                Operator::Div
            } else {
                Operator::FloorDiv
            }
        }
        BinaryOp::Rem => Operator::Mod,
        BinaryOp::And => Operator::BitAnd,
        BinaryOp::Or => Operator::BitOr,
        BinaryOp::Xor => Operator::BitXor,
        BinaryOp::Shl => Operator::LShift,
        BinaryOp::Shr => Operator::RShift,
        BinaryOp::AndNot => {
            let right = Expr::unary(UnaryOperator::Invert, right);
            return Expr::binop(left, Operator::BitAnd, right);
        }
        BinaryOp::LAnd | BinaryOp::LOr => {
            let op = if op == BinaryOp::LAnd {
                BoolOperator::And
            } else {
                BoolOperator::Or
            };
            return Expr::BoolOp {
                op,
                values: vec![left, right],
            };
        }
        BinaryOp::Eql => return Expr::compare(left, CmpOperator::Eq, right),
        BinaryOp::Neq => return Expr::compare(left, CmpOperator::NotEq, right),
        BinaryOp::Lss => return Expr::compare(left, CmpOperator::Lt, right),
        BinaryOp::Leq => return Expr::compare(left, CmpOperator::LtE, right),
        BinaryOp::Gtr => return Expr::compare(left, CmpOperator::Gt, right),
        BinaryOp::Geq => return Expr::compare(left, CmpOperator::GtE, right),
    };
    Expr::binop(left, op, right)
}

fn compile_lit(kind: LitKind, value: &str) -> Expr {
    match kind {
        LitKind::Int => {
            let digits = value.replace('_', "");
            let legacy_octal =
                digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit());
            if legacy_octal {
                Expr::num(format!("0o{}", &digits[1..]))
            } else {
                Expr::num(digits)
            }
        }
        LitKind::Float => Expr::num(value.replace('_', "")),
        LitKind::Imag => Expr::num(format!("{}j", value.trim_end_matches('i'))),
        LitKind::Char | LitKind::String => Expr::string(unquote(value)),
    }
}

/// Decode a Go string or rune literal, quotes included.
pub fn unquote(literal: &str) -> String {
    if let Some(raw) = literal.strip_prefix('`') {
        return raw.strip_suffix('`').unwrap_or(raw).replace('\r', "");
    }
    let inner = literal
        .strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        let decoded = match esc {
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0c}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0b}'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'x' => take_code(&mut chars, 2, 16),
            'u' => take_code(&mut chars, 4, 16),
            'U' => take_code(&mut chars, 8, 16),
            '0'..='7' => {
                let rest: String = chars.by_ref().take(2).collect();
                u32::from_str_radix(&format!("{esc}{rest}"), 8)
                    .ok()
                    .and_then(char::from_u32)
            }
            other => {
                out.push('\\');
                Some(other)
            }
        };
        if let Some(decoded) = decoded {
            out.push(decoded);
        }
    }
    out
}

fn take_code(chars: &mut std::str::Chars<'_>, digits: usize, radix: u32) -> Option<char> {
    let code: String = chars.by_ref().take(digits).collect();
    u32::from_str_radix(&code, radix).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_interpreted() {
        assert_eq!(unquote(r#""a\tb\n""#), "a\tb\n");
        assert_eq!(unquote(r#""\x41\u00e9\101""#), "AéA");
        assert_eq!(unquote(r#""say \"hi\"""#), "say \"hi\"");
    }

    #[test]
    fn test_unquote_raw_and_rune() {
        assert_eq!(unquote("`C:\\path`"), "C:\\path");
        assert_eq!(unquote("' '"), " ");
        assert_eq!(unquote(r"'\n'"), "\n");
    }

    #[test]
    fn test_int_literals() {
        assert_eq!(compile_lit(LitKind::Int, "0755"), Expr::num("0o755"));
        assert_eq!(compile_lit(LitKind::Int, "0x1F"), Expr::num("0x1F"));
        assert_eq!(compile_lit(LitKind::Int, "1_000"), Expr::num("1000"));
        assert_eq!(compile_lit(LitKind::Int, "0"), Expr::num("0"));
        assert_eq!(compile_lit(LitKind::Imag, "2i"), Expr::num("2j"));
    }

    #[test]
    fn test_basic_class() {
        assert_eq!(basic_class(BasicKind::Uint8), Some("int"));
        assert_eq!(basic_class(BasicKind::Float32), Some("float"));
        assert_eq!(basic_class(BasicKind::String), Some("str"));
        assert_eq!(basic_class(BasicKind::UnsafePointer), None);
    }

    #[test]
    fn test_lowered_splice_appends_in_order() {
        let mut pre = vec![Stmt::Pass];
        let lowered = Lowered::with_hoisted(Expr::name("x"), vec![Stmt::Break, Stmt::Continue]);
        let value = lowered.splice(&mut pre);
        assert_eq!(value, Expr::name("x"));
        assert_eq!(pre, vec![Stmt::Pass, Stmt::Break, Stmt::Continue]);
    }
}
