//! Declaration and type lowering.

use super::{Compiler, Origin};
use crate::error::{ErrorKind, Result};
use crate::expr::Lowered;
use crate::go::{
    self, BasicKind, Block, CommentGroup, Constant, Decl, ExprKind, FieldList, FuncType, GenDecl,
    Ident, Spec, Type, TypeSpec, Underlying, ValueSpec,
};
use crate::ir::{
    Arguments, ClassDef, Comprehension, Expr, FunctionDef, Identifier, Stmt, or_pass,
};
use crate::scope::escape;
use tracing::{debug, trace};

/// A lowered function or method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// Owning type for methods; `None` for free functions.
    pub class: Option<Identifier>,
    pub def: FunctionDef,
}

/// Top-level output of one declaration, grouped by the module assembler.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclArtifact {
    Class(ClassDef),
    /// `A = B` for a type declared in terms of another named type.
    Alias(Stmt),
    Function(FuncDecl),
    /// Package-level variable and constant bindings, hoisted statements included.
    Values(Vec<Stmt>),
}

/// Zero value of `ty`.
///
/// Depends only on the type: named types are constructed by their declared
/// name, whatever the scope later calls them.
pub fn zero_value(ty: &Type) -> std::result::Result<Expr, ErrorKind> {
    match ty {
        Type::Pointer(_)
        | Type::Slice(_)
        | Type::Map { .. }
        | Type::Signature(_)
        | Type::Interface
        | Type::Struct(_)
        | Type::Chan(_) => Ok(Expr::none()),
        Type::Basic(kind) => basic_zero(*kind),
        Type::Named(named) => match named.underlying {
            Underlying::Struct | Underlying::Basic(_) | Underlying::Slice | Underlying::Array => {
                Ok(Expr::call(Expr::name(escape(&named.name)), vec![]))
            }
            _ => Ok(Expr::none()),
        },
        Type::Array { len, elem } => Ok(Expr::ListComp {
            elt: Box::new(zero_value(elem)?),
            generators: vec![Comprehension {
                target: Expr::name("_"),
                iter: Expr::call(Expr::name("range"), vec![Expr::num(len.to_string())]),
            }],
        }),
        Type::Tuple(_) => Err(ErrorKind::NoZeroValue(ty.describe())),
    }
}

fn basic_zero(kind: BasicKind) -> std::result::Result<Expr, ErrorKind> {
    if kind.is_string() {
        Ok(Expr::string(""))
    } else if kind.is_boolean() {
        Ok(Expr::bool(false))
    } else if kind.is_integer() {
        Ok(Expr::num("0"))
    } else if kind.is_float() || kind.is_complex() {
        Ok(Expr::num("0.0"))
    } else if matches!(kind, BasicKind::UnsafePointer | BasicKind::UntypedNil) {
        Ok(Expr::none())
    } else {
        Err(ErrorKind::NoZeroValue(kind.name().to_string()))
    }
}

fn constant_literal(value: &Constant) -> Expr {
    match value {
        Constant::Bool(b) => Expr::bool(*b),
        Constant::Int(n) => Expr::num(n.to_string()),
        Constant::Float(f) if f.is_finite() && f.fract() == 0.0 => Expr::num(format!("{f:.1}")),
        Constant::Float(f) => Expr::num(f.to_string()),
        Constant::String(s) => Expr::string(s.clone()),
    }
}

/// Receiver of a method: the owning type and the receiver's name, if any.
struct Receiver<'n> {
    class: Identifier,
    name: Option<&'n Ident>,
}

impl<'a> Compiler<'a> {
    /// Lower a file-level declaration.
    pub fn compile_decl(&mut self, decl: &Decl) -> Result<Vec<DeclArtifact>> {
        match decl {
            Decl::Bad(pos) => Err(self.err(*pos, ErrorKind::UnknownDecl)),
            Decl::Func(func) => Ok(vec![DeclArtifact::Function(self.compile_func_decl(func)?)]),
            Decl::Gen(decl) => self.compile_gen_decl(decl),
        }
    }

    pub fn compile_gen_decl(&mut self, decl: &GenDecl) -> Result<Vec<DeclArtifact>> {
        let mut artifacts = Vec::new();
        for spec in &decl.specs {
            match spec {
                Spec::Import(import) => debug!("ignoring import {}", import.path),
                Spec::Value(spec) => {
                    artifacts.push(DeclArtifact::Values(self.compile_value_spec(spec)?));
                }
                Spec::Type(spec) => {
                    // An unparenthesized declaration keeps its doc on the GenDecl.
                    let doc = spec
                        .doc
                        .as_ref()
                        .or_else(|| (decl.specs.len() == 1).then_some(decl.doc.as_ref()).flatten());
                    match self.compile_type_spec(spec, doc)? {
                        Some(Stmt::ClassDef(class)) => artifacts.push(DeclArtifact::Class(class)),
                        Some(binding) => artifacts.push(DeclArtifact::Alias(binding)),
                        None => {}
                    }
                }
            }
        }
        Ok(artifacts)
    }

    /// Declarations inside a function body lower inline.
    pub(crate) fn compile_decl_stmt(&mut self, decl: &GenDecl, out: &mut Vec<Stmt>) -> Result<()> {
        for spec in &decl.specs {
            match spec {
                Spec::Import(import) => {
                    return Err(self.err(import.pos, ErrorKind::UnknownSpec("ImportSpec")));
                }
                Spec::Value(spec) => out.extend(self.compile_value_spec(spec)?),
                Spec::Type(spec) => {
                    if let Some(stmt) = self.compile_type_spec(spec, spec.doc.as_ref())? {
                        out.push(stmt);
                    }
                }
            }
        }
        Ok(())
    }

    /// `var`/`const` spec as a single (possibly multi-target) assignment.
    ///
    /// ```text
    /// var x, y int           x, y = 0, 0
    /// var x, y int = 1, 2    x, y = 1, 2
    /// var x, y int = f()     x, y = f()
    /// ```
    pub fn compile_value_spec(&mut self, spec: &ValueSpec) -> Result<Vec<Stmt>> {
        let mut out = Vec::new();
        let mut targets = Vec::with_capacity(spec.names.len());
        let mut values = Vec::with_capacity(spec.names.len());

        for (i, name) in spec.names.iter().enumerate() {
            // Constants never lower their initializer, which may mention `iota`.
            let constant = self.object(name).and_then(|(_, object)| object.constant.as_ref());
            if let Some(constant) = constant {
                values.push(constant_literal(constant));
            } else if spec.values.is_empty() {
                values.push(self.zero_value_of(name)?);
            } else if let Some(value) = spec.values.get(i) {
                values.push(self.expr(&mut out, value)?);
            }
            targets.push(Expr::name(self.identifier(name)?));
        }

        out.push(Stmt::Assign {
            targets,
            value: Expr::make_tuple(values),
        });
        Ok(out)
    }

    fn zero_value_of(&self, name: &Ident) -> Result<Expr> {
        match self.type_of(name.id) {
            Some(ty) => zero_value(ty).map_err(|kind| self.err(name.pos, kind)),
            None if name.is_blank() => Ok(Expr::none()),
            None => Err(self.err(name.pos, ErrorKind::MissingType("variable declaration"))),
        }
    }

    /// Lower a type declaration to a class, an alias binding, or nothing.
    pub fn compile_type_spec(
        &mut self,
        spec: &TypeSpec,
        doc: Option<&CommentGroup>,
    ) -> Result<Option<Stmt>> {
        let Some(ty) = self.type_of(spec.ty.id) else {
            return Err(self.err(spec.pos, ErrorKind::MissingType("type declaration")));
        };
        trace!("lowering type {}", spec.name.name);

        match ty {
            Type::Struct(st) => {
                let mut fields = Vec::with_capacity(st.fields.len());
                for field in &st.fields {
                    let name = match self.info.object(field.obj) {
                        Some(object) => self.scope.member_name(field.obj, object),
                        None => escape(&field.name),
                    };
                    fields.push((name, &field.ty));
                }
                let class = self.compile_class(spec, doc, &fields)?;
                Ok(Some(Stmt::ClassDef(class)))
            }
            Type::Named(named) => {
                let target = self.identifier(&spec.name)?;
                let source = self.object_name(named.obj)?;
                Ok(Some(Stmt::assign(Expr::name(target), Expr::name(source))))
            }
            Type::Basic(_) | Type::Slice(_) | Type::Array { .. } => {
                let class = self.compile_class(spec, doc, &[("value".to_string(), ty)])?;
                Ok(Some(Stmt::ClassDef(class)))
            }
            Type::Interface | Type::Signature(_) | Type::Map { .. } => {
                debug!("skipping {} type {}", ty.describe(), spec.name.name);
                Ok(None)
            }
            other => Err(self.err(spec.pos, ErrorKind::UnknownTypeSpec(other.describe()))),
        }
    }

    fn compile_class(
        &mut self,
        spec: &TypeSpec,
        doc: Option<&CommentGroup>,
        fields: &[(Identifier, &Type)],
    ) -> Result<ClassDef> {
        let name = self.identifier(&spec.name)?;
        let mut body = Vec::new();

        if let Some(lines) = self.doc_lines(doc, Some(spec.name.id)) {
            body.push(Stmt::DocString { lines });
        }
        if !fields.is_empty() {
            body.push(Stmt::FunctionDef(self.compile_init(spec, fields)?));
        }

        Ok(ClassDef {
            name,
            body: or_pass(body),
        })
    }

    /// `__init__(self, f1=zero1, ...)` assigning every field in order.
    fn compile_init(&mut self, spec: &TypeSpec, fields: &[(Identifier, &Type)]) -> Result<FunctionDef> {
        let origin = self.origin;
        self.in_function(origin, |c| {
            for (field, _) in fields {
                c.scope.reserve(field);
            }
            let base = c.config.receiver.clone();
            let receiver = c.temp(&base);

            let mut args = Arguments {
                args: vec![receiver.clone()],
                ..Arguments::default()
            };
            let mut body = Vec::with_capacity(fields.len());
            for (field, ty) in fields {
                args.args.push(field.clone());
                args.defaults
                    .push(zero_value(ty).map_err(|kind| c.err(spec.pos, kind))?);
                body.push(Stmt::assign(
                    Expr::attribute(Expr::name(receiver.clone()), field.clone()),
                    Expr::name(field.clone()),
                ));
            }

            Ok(FunctionDef {
                name: "__init__".into(),
                args,
                body,
            })
        })
    }

    /// Doc string lines, when doc strings are wanted here. Falls back to the
    /// comments attached to `node`.
    fn doc_lines(&self, doc: Option<&CommentGroup>, node: Option<go::NodeId>) -> Option<Vec<String>> {
        let Origin::File { comments } = self.origin else {
            return None;
        };
        if !self.config.doc_strings {
            return None;
        }
        let group = doc.or_else(|| comments.zip(node).and_then(|(map, node)| map.get(node).first()))?;
        let lines = group.lines();
        (!lines.is_empty()).then_some(lines)
    }

    pub fn compile_func_decl(&mut self, decl: &go::FuncDecl) -> Result<FuncDecl> {
        let receiver = decl
            .recv
            .as_ref()
            .map(|recv| self.receiver(recv))
            .transpose()?;

        // Methods live in their class namespace; only free functions compete
        // for package-level names.
        let name = match &receiver {
            Some(_) => self.member_name(&decl.name),
            None => self.identifier(&decl.name)?,
        };
        trace!("lowering function {}", name);

        let doc = self.doc_lines(decl.doc.as_ref(), None);
        let origin = self.origin;
        let empty = Block::default();
        let body = decl.body.as_ref().unwrap_or(&empty);
        let def = self.compile_function(
            origin,
            name,
            &decl.ty,
            body,
            receiver.as_ref().map(|r| r.name),
            doc,
        )?;

        Ok(FuncDecl {
            class: receiver.map(|r| r.class),
            def,
        })
    }

    fn receiver<'n>(&mut self, recv: &'n FieldList) -> Result<Receiver<'n>> {
        let field = match recv.fields.as_slice() {
            [field] if field.names.len() <= 1 => field,
            [] => return Err(self.err(go::Pos::NONE, ErrorKind::UnknownDecl)),
            fields => return Err(self.err(fields[0].pos, ErrorKind::MultipleReceivers)),
        };
        let ty = match &field.ty.unparen().kind {
            ExprKind::Star(inner) => inner.unparen(),
            _ => field.ty.unparen(),
        };
        let Some(type_name) = ty.as_ident() else {
            return Err(self.err(field.pos, ErrorKind::UnknownFieldType(field.ty.describe())));
        };
        Ok(Receiver {
            class: self.identifier(type_name)?,
            name: field.names.first(),
        })
    }

    /// Lower a function literal: a lambda when the body is a single return,
    /// otherwise a nested definition hoisted ahead of the use.
    pub fn compile_func_lit(&mut self, ty: &FuncType, body: &Block) -> Result<Lowered> {
        let def = self.compile_function(Origin::Literal, String::new(), ty, body, None, None)?;

        if let [Stmt::Return { value: Some(value) }] = def.body.as_slice() {
            return Ok(Lowered::new(Expr::Lambda {
                args: def.args,
                body: Box::new(value.clone()),
            }));
        }

        let name = self.temp("func");
        let value = Expr::name(name.clone());
        Ok(Lowered::with_hoisted(
            value,
            vec![Stmt::FunctionDef(FunctionDef { name, ..def })],
        ))
    }

    /// Shared body of declared functions, methods and literals.
    ///
    /// Layout of the generated body: doc string, `global`/`nonlocal`
    /// declarations, named-result initialisation, then either the lowered
    /// statements or the defer capture list and a `try`/`finally` around them.
    fn compile_function(
        &mut self,
        origin: Origin<'a>,
        name: Identifier,
        ty: &FuncType,
        body: &Block,
        receiver: Option<Option<&Ident>>,
        doc: Option<Vec<String>>,
    ) -> Result<FunctionDef> {
        self.in_function(origin, |c| {
            let mut args = Arguments::default();
            if let Some(receiver) = receiver {
                let receiver = match receiver.filter(|ident| !ident.is_blank()) {
                    Some(ident) => c.identifier(ident)?,
                    None => {
                        let base = c.config.receiver.clone();
                        c.temp(&base)
                    }
                };
                args.args.push(receiver);
            }
            c.compile_params(&ty.params, &mut args)?;

            let mut prologue = c.compile_named_results(ty.results.as_ref())?;

            let defers = matches!(origin, Origin::File { .. }) && super::defers::has_defer(body);
            if defers {
                let list = c.temp("defers");
                if let Some(frame) = c.frame_mut() {
                    frame.defers = Some(list);
                }
            }

            let lowered = c.compile_block(body)?;

            let mut out = Vec::new();
            if let Some(lines) = doc {
                out.push(Stmt::DocString { lines });
            }
            if let Some(frame) = c.frame_mut() {
                if !frame.globals.is_empty() {
                    out.push(Stmt::Global {
                        names: std::mem::take(&mut frame.globals),
                    });
                }
                if !frame.nonlocals.is_empty() {
                    out.push(Stmt::Nonlocal {
                        names: std::mem::take(&mut frame.nonlocals),
                    });
                }
            }
            out.append(&mut prologue);
            match c.frame().and_then(|frame| frame.defers.clone()) {
                Some(list) => out.extend(c.wrap_defers(list, lowered)),
                None => out.extend(lowered),
            }

            Ok(FunctionDef {
                name,
                args,
                body: or_pass(out),
            })
        })
    }

    fn compile_params(&mut self, params: &FieldList, args: &mut Arguments) -> Result<()> {
        let last = params.fields.len().saturating_sub(1);
        for (i, field) in params.fields.iter().enumerate() {
            let mut names = Vec::with_capacity(field.names.len().max(1));
            if field.names.is_empty() {
                names.push(self.temp("arg"));
            }
            for ident in &field.names {
                if ident.is_blank() {
                    names.push(self.temp("_"));
                } else {
                    names.push(self.identifier(ident)?);
                }
            }

            if i == last && matches!(field.ty.kind, ExprKind::Ellipsis(_)) {
                args.vararg = names.pop();
            }
            args.args.extend(names);
        }
        Ok(())
    }

    /// Zero-initialise named results and remember them for bare returns.
    fn compile_named_results(&mut self, results: Option<&FieldList>) -> Result<Vec<Stmt>> {
        let mut prologue = Vec::new();
        let Some(results) = results else {
            return Ok(prologue);
        };
        for field in &results.fields {
            for ident in &field.names {
                let name = if ident.is_blank() {
                    self.temp("result")
                } else {
                    self.identifier(ident)?
                };
                let ty = self.type_of(ident.id).or_else(|| self.type_of(field.ty.id));
                let Some(ty) = ty else {
                    return Err(self.err(ident.pos, ErrorKind::MissingType("named result")));
                };
                let zero = zero_value(ty).map_err(|kind| self.err(ident.pos, kind))?;
                prologue.push(Stmt::assign(Expr::name(name.clone()), zero));
                if let Some(frame) = self.frame_mut() {
                    frame.results.push(name);
                }
            }
        }
        Ok(prologue)
    }
}
