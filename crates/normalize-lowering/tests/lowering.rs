//! End-to-end lowering tests.
//!
//! Each test builds a resolved tree with `TypeInfo`'s builders, lowers it
//! and checks the rendered Python. Run `cargo insta review` after
//! intentional output changes.

use insta::assert_snapshot;
use normalize_lowering::go::{
    self, AssignTok, BasicKind, BinaryOp, Block, BranchTok, CaseClause, CommentGroup, CommentMap,
    Decl, DeclTok, ExprKind, Field, FieldList, FieldVar, File, FuncType, GenDecl, Ident, IncDec,
    Object, ObjectId, ObjectKind, Pos, Signature, Spec, StmtKind, StructType, Type,
    TypeSpec, Underlying, ValueSpec,
};
use normalize_lowering::{
    Compiler, DeclArtifact, ErrorKind, LoweringConfig, PythonWriter, TypeInfo, compile_files, ir,
};

// ============================================================================
// Helpers
// ============================================================================

fn int() -> Type {
    Type::Basic(BasicKind::Int)
}

fn local(info: &mut TypeInfo, name: &str, ty: Type) -> ObjectId {
    info.declare(Object::new(name, ObjectKind::Var).with_type(ty))
}

fn global(info: &mut TypeInfo, name: &str, ty: Type) -> ObjectId {
    info.declare(Object::new(name, ObjectKind::Var).with_type(ty).package_level())
}

fn func(info: &mut TypeInfo, name: &str) -> ObjectId {
    info.declare(
        Object::new(name, ObjectKind::Func)
            .with_type(Type::Signature(Signature::default()))
            .package_level(),
    )
}

fn call_stmt(info: &mut TypeInfo, f: ObjectId, args: Vec<go::Expr>) -> go::Stmt {
    let fun = info.name(f);
    let call = info.call(fun, args);
    info.expr_stmt(call)
}

fn assign(info: &mut TypeInfo, lhs: Vec<go::Expr>, tok: AssignTok, rhs: Vec<go::Expr>) -> go::Stmt {
    info.stmt(StmtKind::Assign { lhs, tok, rhs })
}

fn clause(info: &mut TypeInfo, list: Vec<go::Expr>, body: Vec<go::Stmt>) -> CaseClause {
    CaseClause {
        id: info.node(),
        pos: Pos::NONE,
        list,
        body,
    }
}

fn field(names: Vec<Ident>, ty: go::Expr) -> Field {
    Field {
        pos: Pos::NONE,
        names,
        ty,
    }
}

fn signature(params: Vec<Field>, results: Option<Vec<Field>>) -> FuncType {
    FuncType {
        pos: Pos::NONE,
        params: FieldList { fields: params },
        results: results.map(|fields| FieldList { fields }),
    }
}

fn func_decl(info: &mut TypeInfo, obj: ObjectId, ty: FuncType, stmts: Vec<go::Stmt>) -> Decl {
    let name = info.ident(obj);
    Decl::Func(go::FuncDecl {
        pos: Pos::NONE,
        doc: None,
        recv: None,
        name,
        ty,
        body: Some(Block { stmts }),
    })
}

fn gen_decl(tok: DeclTok, doc: Option<CommentGroup>, specs: Vec<Spec>) -> Decl {
    Decl::Gen(GenDecl {
        pos: Pos::NONE,
        tok,
        doc,
        specs,
    })
}

fn type_spec(name: Ident, ty: go::Expr) -> Spec {
    Spec::Type(TypeSpec {
        pos: Pos::NONE,
        doc: None,
        name,
        alias: false,
        ty,
    })
}

fn value_spec(names: Vec<Ident>, ty: Option<go::Expr>, values: Vec<go::Expr>) -> Spec {
    Spec::Value(ValueSpec {
        pos: Pos::NONE,
        doc: None,
        names,
        ty,
        values,
    })
}

fn lower(info: &TypeInfo, stmts: &[go::Stmt]) -> String {
    let mut compiler = Compiler::new(info);
    let out = compiler.compile_stmts(stmts).expect("lowering failed");
    PythonWriter::emit_stmts(&out)
}

fn render(artifacts: Vec<DeclArtifact>) -> String {
    let stmts: Vec<ir::Stmt> = artifacts
        .into_iter()
        .flat_map(|artifact| match artifact {
            DeclArtifact::Class(class) => vec![ir::Stmt::ClassDef(class)],
            DeclArtifact::Alias(binding) => vec![binding],
            DeclArtifact::Function(func) => vec![ir::Stmt::FunctionDef(func.def)],
            DeclArtifact::Values(values) => values,
        })
        .collect();
    PythonWriter::emit_stmts(&stmts)
}

fn lower_decl(info: &TypeInfo, decl: &Decl) -> String {
    let mut compiler = Compiler::new(info);
    render(compiler.compile_decl(decl).expect("lowering failed"))
}

// ============================================================================
// Range loops
// ============================================================================

mod range {
    use super::*;

    #[test]
    fn key_and_value_enumerate() {
        let mut info = TypeInfo::new();
        let xs = local(&mut info, "xs", Type::Slice(Box::new(int())));
        let i = local(&mut info, "i", int());
        let v = local(&mut info, "v", int());
        let use_ = func(&mut info, "use");

        let args = vec![info.name(i), info.name(v)];
        let body = call_stmt(&mut info, use_, args);
        let key = info.name(i);
        let value = info.name(v);
        let x = info.name(xs);
        let stmt = info.stmt(StmtKind::Range {
            key: Some(key),
            value: Some(value),
            tok: AssignTok::Define,
            x,
            body: Block { stmts: vec![body] },
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        for i, v in enumerate(xs):
            use(i, v)
        ");
    }

    #[test]
    fn key_only_empty_body() {
        let mut info = TypeInfo::new();
        let xs = local(&mut info, "xs", Type::Slice(Box::new(int())));
        let i = local(&mut info, "i", int());

        let key = info.name(i);
        let x = info.name(xs);
        let stmt = info.stmt(StmtKind::Range {
            key: Some(key),
            value: None,
            tok: AssignTok::Define,
            x,
            body: Block::default(),
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        for i in range(len(xs)):
            pass
        ");
    }

    #[test]
    fn blank_key_iterates_values() {
        let mut info = TypeInfo::new();
        let xs = local(&mut info, "xs", Type::Slice(Box::new(int())));
        let v = local(&mut info, "v", int());
        let total = local(&mut info, "total", int());

        let target = info.name(total);
        let addend = info.name(v);
        let body = assign(&mut info, vec![target], AssignTok::AddAssign, vec![addend]);
        let key = info.blank_expr();
        let value = info.name(v);
        let x = info.name(xs);
        let stmt = info.stmt(StmtKind::Range {
            key: Some(key),
            value: Some(value),
            tok: AssignTok::Define,
            x,
            body: Block { stmts: vec![body] },
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        for v in xs:
            total += v
        ");
    }

    #[test]
    fn neither_bound() {
        let mut info = TypeInfo::new();
        let xs = local(&mut info, "xs", Type::Slice(Box::new(int())));
        let x = info.name(xs);
        let stmt = info.stmt(StmtKind::Range {
            key: None,
            value: None,
            tok: AssignTok::Define,
            x,
            body: Block::default(),
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        for _ in xs:
            pass
        ");
    }

    #[test]
    fn map_items_and_integer_range() {
        let mut info = TypeInfo::new();
        let m = local(
            &mut info,
            "m",
            Type::Map {
                key: Box::new(Type::Basic(BasicKind::String)),
                value: Box::new(int()),
            },
        );
        let n = local(&mut info, "n", int());
        let k = local(&mut info, "k", Type::Basic(BasicKind::String));
        let v = local(&mut info, "v", int());
        let i = local(&mut info, "i", int());

        let key = info.name(k);
        let value = info.name(v);
        let x = info.name(m);
        let over_map = info.stmt(StmtKind::Range {
            key: Some(key),
            value: Some(value),
            tok: AssignTok::Define,
            x,
            body: Block::default(),
        });
        let key = info.name(i);
        let x = info.name(n);
        let over_int = info.stmt(StmtKind::Range {
            key: Some(key),
            value: None,
            tok: AssignTok::Define,
            x,
            body: Block::default(),
        });

        assert_snapshot!(lower(&info, &[over_map, over_int]), @r"
        for k, v in m.items():
            pass
        for i in range(n):
            pass
        ");
    }

    #[test]
    fn value_without_key_is_an_error() {
        let mut info = TypeInfo::new();
        let base = info
            .file_set_mut()
            .add_file("main.go", "package main\n\nfunc f() {\n\tfor v = range xs {}\n}\n");
        let xs = local(&mut info, "xs", Type::Slice(Box::new(int())));
        let v = local(&mut info, "v", int());

        let value = info.name(v);
        let x = info.name(xs);
        let mut stmt = info.stmt(StmtKind::Range {
            key: None,
            value: Some(value),
            tok: AssignTok::Assign,
            x,
            body: Block::default(),
        });
        stmt.pos = Pos(base + 26);

        let err = Compiler::new(&info).compile_stmts(&[stmt]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::RangeValueWithoutKey);
        assert_eq!(
            err.to_string(),
            "main.go:4:2: key == nil and value != nil in range for"
        );
    }
}

// ============================================================================
// Assignments and declarations in statement position
// ============================================================================

mod assignments {
    use super::*;

    #[test]
    fn bit_clear_assign() {
        let mut info = TypeInfo::new();
        let x = local(&mut info, "x", int());
        let mask = local(&mut info, "mask", int());
        let target = info.name(x);
        let value = info.name(mask);
        let stmt = assign(&mut info, vec![target], AssignTok::AndNotAssign, vec![value]);

        assert_snapshot!(lower(&info, &[stmt]), @"x &= ~mask");
    }

    #[test]
    fn bit_clear_assign_tree() {
        let mut info = TypeInfo::new();
        let x = local(&mut info, "x", int());
        let mask = local(&mut info, "mask", int());
        let target = info.name(x);
        let value = info.name(mask);
        let stmt = assign(&mut info, vec![target], AssignTok::AndNotAssign, vec![value]);

        let out = Compiler::new(&info).compile_stmt(&stmt).unwrap();
        insta::assert_json_snapshot!(out, @r#"
        [
          {
            "type": "AugAssign",
            "target": {
              "type": "Name",
              "id": "x"
            },
            "op": "BitAnd",
            "value": {
              "type": "UnaryOp",
              "op": "Invert",
              "operand": {
                "type": "Name",
                "id": "mask"
              }
            }
          }
        ]
        "#);
    }

    #[test]
    fn division_follows_operand_type() {
        let mut info = TypeInfo::new();
        let n = local(&mut info, "n", int());
        let f = local(&mut info, "f", Type::Basic(BasicKind::Float64));
        let target = info.name(n);
        let two = info.int(2);
        let int_div = assign(&mut info, vec![target], AssignTok::QuoAssign, vec![two]);
        let target = info.name(f);
        let two = info.int(2);
        let float_div = assign(&mut info, vec![target], AssignTok::QuoAssign, vec![two]);

        assert_snapshot!(lower(&info, &[int_div, float_div]), @r"
        n //= 2
        f /= 2
        ");
    }

    #[test]
    fn compound_assignment_needs_single_operands() {
        let mut info = TypeInfo::new();
        let a = local(&mut info, "a", int());
        let b = local(&mut info, "b", int());
        let lhs = vec![info.name(a), info.name(b)];
        let rhs = vec![info.int(1), info.int(2)];
        let stmt = assign(&mut info, lhs, AssignTok::AddAssign, rhs);

        let err = Compiler::new(&info).compile_stmt(&stmt).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CompoundArity { lhs: 2, rhs: 2 });
    }

    #[test]
    fn inc_dec() {
        let mut info = TypeInfo::new();
        let n = local(&mut info, "n", int());
        let x = info.name(n);
        let inc = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let x = info.name(n);
        let dec = info.stmt(StmtKind::IncDec { x, tok: IncDec::Dec });

        assert_snapshot!(lower(&info, &[inc, dec]), @r"
        n += 1
        n -= 1
        ");
    }

    #[test]
    fn var_without_initializer_uses_zero_values() {
        let mut info = TypeInfo::new();
        let a = local(&mut info, "a", int());
        let b = local(&mut info, "b", int());
        let names = vec![info.ident(a), info.ident(b)];
        let ty = info.builtin("int").unwrap();
        let decl = GenDecl {
            pos: Pos::NONE,
            tok: DeclTok::Var,
            doc: None,
            specs: vec![value_spec(names, Some(ty), vec![])],
        };
        let stmt = info.stmt(StmtKind::Decl(decl));

        assert_snapshot!(lower(&info, &[stmt]), @"a, b = 0, 0");
    }

    #[test]
    fn var_initializer_modes() {
        let mut info = TypeInfo::new();
        let a = local(&mut info, "a", int());
        let s = local(&mut info, "s", Type::Basic(BasicKind::String));
        let q = local(&mut info, "q", int());
        let r = local(&mut info, "r", int());
        let divmod = func(&mut info, "divmod");

        let names = vec![info.ident(a), info.ident(s)];
        let values = vec![info.int(1), info.string("x")];
        let pairwise = value_spec(names, None, values);

        let names = vec![info.ident(q), info.ident(r)];
        let fun = info.name(divmod);
        let args = vec![info.int(7), info.int(2)];
        let call = info.call(fun, args);
        let shared = value_spec(names, None, vec![call]);

        let decl = GenDecl {
            pos: Pos::NONE,
            tok: DeclTok::Var,
            doc: None,
            specs: vec![pairwise, shared],
        };
        let stmt = info.stmt(StmtKind::Decl(decl));

        assert_snapshot!(lower(&info, &[stmt]), @r#"
        a, s = 1, "x"
        q, r = divmod(7, 2)
        "#);
    }

    #[test]
    fn constants_use_their_value() {
        let mut info = TypeInfo::new();
        let first = info.declare(
            Object::new("First", ObjectKind::Const)
                .with_type(int())
                .with_constant(go::Constant::Int(0)),
        );
        let second = info.declare(
            Object::new("Second", ObjectKind::Const)
                .with_type(int())
                .with_constant(go::Constant::Int(1)),
        );
        let names = vec![info.ident(first)];
        let iota = info.builtin("iota").unwrap();
        let explicit = value_spec(names, None, vec![iota]);
        let implicit = value_spec(vec![info.ident(second)], None, vec![]);
        let decl = GenDecl {
            pos: Pos::NONE,
            tok: DeclTok::Const,
            doc: None,
            specs: vec![explicit, implicit],
        };
        let stmt = info.stmt(StmtKind::Decl(decl));

        assert_snapshot!(lower(&info, &[stmt]), @r"
        First = 0
        Second = 1
        ");
    }

    #[test]
    fn guarded_delete() {
        let mut info = TypeInfo::new();
        let m = local(
            &mut info,
            "m",
            Type::Map {
                key: Box::new(Type::Basic(BasicKind::String)),
                value: Box::new(int()),
            },
        );
        let k = local(&mut info, "k", Type::Basic(BasicKind::String));
        let delete = info.builtin("delete").unwrap();
        let args = vec![info.name(m), info.name(k)];
        let call = info.call(delete, args);
        let stmt = info.expr_stmt(call);

        assert_snapshot!(lower(&info, &[stmt]), @r"
        try:
            del m[k]
        except KeyError:
            pass
        ");
    }

    #[test]
    fn same_object_same_name() {
        let mut info = TypeInfo::new();
        let outer = local(&mut info, "x", int());
        let inner = local(&mut info, "x", int());

        let target = info.name(outer);
        let one = info.int(1);
        let first = assign(&mut info, vec![target], AssignTok::Define, vec![one]);
        let target = info.name(inner);
        let two = info.int(2);
        let second = assign(&mut info, vec![target], AssignTok::Define, vec![two]);
        let println = info.builtin("println").unwrap();
        let args = vec![info.name(outer), info.name(inner), info.name(outer)];
        let call = info.call(println, args);
        let third = info.expr_stmt(call);

        assert_snapshot!(lower(&info, &[first, second, third]), @r"
        x = 1
        x1 = 2
        print(x, x1, x)
        ");
    }
}

// ============================================================================
// Control flow
// ============================================================================

mod control_flow {
    use super::*;

    #[test]
    fn tagless_switch_with_default() {
        let mut info = TypeInfo::new();
        let cond1 = local(&mut info, "cond1", Type::Basic(BasicKind::Bool));
        let cond2 = local(&mut info, "cond2", Type::Basic(BasicKind::Bool));
        let a = func(&mut info, "A");
        let b = func(&mut info, "B");
        let c = func(&mut info, "C");

        let test = info.name(cond1);
        let body = call_stmt(&mut info, a, vec![]);
        let first = clause(&mut info, vec![test], vec![body]);
        let test = info.name(cond2);
        let body = call_stmt(&mut info, b, vec![]);
        let second = clause(&mut info, vec![test], vec![body]);
        let body = call_stmt(&mut info, c, vec![]);
        let default = clause(&mut info, vec![], vec![body]);
        let stmt = info.stmt(StmtKind::Switch {
            init: None,
            tag: None,
            clauses: vec![first, second, default],
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        if cond1:
            A()
        elif cond2:
            B()
        else:
            C()
        ");
    }

    #[test]
    fn default_clause_moves_to_the_end() {
        let mut info = TypeInfo::new();
        let x = local(&mut info, "x", int());
        let a = func(&mut info, "a");
        let b = func(&mut info, "b");
        let c = func(&mut info, "c");

        let values = vec![info.int(1), info.int(2)];
        let body = call_stmt(&mut info, a, vec![]);
        let first = clause(&mut info, values, vec![body]);
        let body = call_stmt(&mut info, c, vec![]);
        let default = clause(&mut info, vec![], vec![body]);
        let value = info.int(3);
        let body = call_stmt(&mut info, b, vec![]);
        let last = clause(&mut info, vec![value], vec![body]);
        let tag = info.name(x);
        let stmt = info.stmt(StmtKind::Switch {
            init: None,
            tag: Some(tag),
            clauses: vec![first, default, last],
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        tag = x
        if (tag == 1) or (tag == 2):
            a()
        elif tag == 3:
            b()
        else:
            c()
        ");
    }

    #[test]
    fn default_only_switch_is_unwrapped() {
        let mut info = TypeInfo::new();
        let c = func(&mut info, "c");
        let body = call_stmt(&mut info, c, vec![]);
        let default = clause(&mut info, vec![], vec![body]);
        let stmt = info.stmt(StmtKind::Switch {
            init: None,
            tag: None,
            clauses: vec![default],
        });

        assert_snapshot!(lower(&info, &[stmt]), @"c()");
    }

    #[test]
    fn switch_without_default() {
        let mut info = TypeInfo::new();
        let ready = local(&mut info, "ready", Type::Basic(BasicKind::Bool));
        let go_ = func(&mut info, "start");
        let test = info.name(ready);
        let body = call_stmt(&mut info, go_, vec![]);
        let only = clause(&mut info, vec![test], vec![body]);
        let stmt = info.stmt(StmtKind::Switch {
            init: None,
            tag: None,
            clauses: vec![only],
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        if ready:
            start()
        ");
    }

    #[test]
    fn switch_temp_does_not_shadow_globals() {
        let mut info = TypeInfo::new();
        let f = func(&mut info, "f");
        let x = local(&mut info, "x", int());
        let tag = global(&mut info, "tag", int());

        let values = vec![info.int(1)];
        let result = info.name(tag);
        let ret = info.stmt(StmtKind::Return(vec![result]));
        let one = clause(&mut info, values, vec![ret]);
        let subject = info.name(x);
        let switch = info.stmt(StmtKind::Switch {
            init: None,
            tag: Some(subject),
            clauses: vec![one],
        });
        let zero = info.int(0);
        let fallback = info.stmt(StmtKind::Return(vec![zero]));
        let names = vec![info.ident(x)];
        let ty = info.builtin("int").unwrap();
        let decl = func_decl(&mut info, f, signature(vec![field(names, ty)], None), vec![switch, fallback]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        def f(x):
            tag = x
            if tag == 1:
                return tag1
            return 0
        ");
    }

    #[test]
    fn type_switch_binds_value() {
        let mut info = TypeInfo::new();
        let x = local(&mut info, "x", Type::Interface);
        let use_ = func(&mut info, "use");
        let v_int = local(&mut info, "v", int());
        let v_nil = local(&mut info, "v", Type::Interface);

        let binding = Ident {
            id: info.node(),
            pos: Pos::NONE,
            name: "v".into(),
        };
        let binding = info.expr(ExprKind::Ident(binding));
        let probe = info.name(x);
        let guard = info.expr(ExprKind::TypeAssert {
            x: Box::new(probe),
            ty: None,
        });
        let guard = assign(&mut info, vec![binding], AssignTok::Define, vec![guard]);

        let ty = info.builtin("int").unwrap();
        let arg = info.name(v_int);
        let body = call_stmt(&mut info, use_, vec![arg]);
        let int_case = clause(&mut info, vec![ty], vec![body]);
        info.record_implicit(int_case.id, v_int);

        let ty = info.builtin("nil").unwrap();
        let arg = info.name(v_nil);
        let body = call_stmt(&mut info, use_, vec![arg]);
        let nil_case = clause(&mut info, vec![ty], vec![body]);
        info.record_implicit(nil_case.id, v_nil);

        let println = info.builtin("println").unwrap();
        let text = info.string("other");
        let call = info.call(println, vec![text]);
        let body = info.expr_stmt(call);
        let default = clause(&mut info, vec![], vec![body]);

        let stmt = info.stmt(StmtKind::TypeSwitch {
            init: None,
            assign: Box::new(guard),
            clauses: vec![int_case, nil_case, default],
        });

        assert_snapshot!(lower(&info, &[stmt]), @r#"
        v = x
        tag = type(v)
        if tag == int:
            v1 = v
            use(v1)
        elif tag == type(None):
            v2 = v
            use(v2)
        else:
            print("other")
        "#);
    }

    #[test]
    fn type_switch_rejects_other_guards() {
        let mut info = TypeInfo::new();
        let x = local(&mut info, "x", Type::Interface);
        let guard = info.name(x);
        let guard = info.expr_stmt(guard);
        let stmt = info.stmt(StmtKind::TypeSwitch {
            init: None,
            assign: Box::new(guard),
            clauses: vec![],
        });

        let err = Compiler::new(&info).compile_stmt(&stmt).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::TypeSwitchGuard("Ident"));
    }

    #[test]
    fn counted_loop() {
        let mut info = TypeInfo::new();
        let i = local(&mut info, "i", int());
        let n = local(&mut info, "n", int());
        let s = local(&mut info, "s", int());

        let target = info.name(i);
        let zero = info.int(0);
        let init = assign(&mut info, vec![target], AssignTok::Define, vec![zero]);
        let left = info.name(i);
        let right = info.name(n);
        let cond = info.binary(BinaryOp::Lss, left, right);
        let x = info.name(i);
        let post = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let target = info.name(s);
        let value = info.name(i);
        let body = assign(&mut info, vec![target], AssignTok::AddAssign, vec![value]);
        let stmt = info.stmt(StmtKind::For {
            init: Some(Box::new(init)),
            cond: Some(cond),
            post: Some(Box::new(post)),
            body: Block { stmts: vec![body] },
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        i = 0
        while i < n:
            s += i
            i += 1
        ");
    }

    #[test]
    fn infinite_loop_with_empty_body() {
        let mut info = TypeInfo::new();
        let stmt = info.stmt(StmtKind::For {
            init: None,
            cond: None,
            post: None,
            body: Block::default(),
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        while True:
            pass
        ");
    }

    #[test]
    fn if_with_init_and_else_if() {
        let mut info = TypeInfo::new();
        let err = local(&mut info, "err", Type::Interface);
        let n = local(&mut info, "n", int());
        let load = func(&mut info, "load");
        let fail = func(&mut info, "fail");

        let target = info.name(err);
        let fun = info.name(load);
        let call = info.call(fun, vec![]);
        let init = assign(&mut info, vec![target], AssignTok::Define, vec![call]);
        let left = info.name(err);
        let nil = info.builtin("nil").unwrap();
        let cond = info.binary(BinaryOp::Neq, left, nil);
        let arg = info.name(err);
        let then = call_stmt(&mut info, fail, vec![arg]);

        let left = info.name(n);
        let zero = info.int(0);
        let cond2 = info.binary(BinaryOp::Eql, left, zero);
        let brk = info.stmt(StmtKind::Branch {
            tok: BranchTok::Break,
            label: None,
        });
        let else_if = info.stmt(StmtKind::If {
            init: None,
            cond: cond2,
            body: Block { stmts: vec![brk] },
            els: None,
        });
        let stmt = info.stmt(StmtKind::If {
            init: Some(Box::new(init)),
            cond,
            body: Block { stmts: vec![then] },
            els: Some(Box::new(else_if)),
        });

        assert_snapshot!(lower(&info, &[stmt]), @r"
        err = load()
        if err != None:
            fail(err)
        elif n == 0:
            break
        ");
    }

    #[test]
    fn unsupported_constructs_are_silenced() {
        let mut info = TypeInfo::new();
        let worker = func(&mut info, "worker");
        let ch = local(&mut info, "ch", Type::Chan(Box::new(int())));

        let fun = info.name(worker);
        let call = info.call(fun, vec![]);
        let spawn = info.stmt(StmtKind::Go(call));
        let chan = info.name(ch);
        let value = info.int(1);
        let send = info.stmt(StmtKind::Send { chan, value });
        let brk = info.stmt(StmtKind::Branch {
            tok: BranchTok::Break,
            label: None,
        });
        let label = Ident {
            id: info.node(),
            pos: Pos::NONE,
            name: "outer".into(),
        };
        let labeled = info.stmt(StmtKind::Labeled {
            label: label.clone(),
            stmt: Box::new(brk),
        });
        let jump = info.stmt(StmtKind::Branch {
            tok: BranchTok::Goto,
            label: Some(label),
        });
        let fallthrough = info.stmt(StmtKind::Branch {
            tok: BranchTok::Fallthrough,
            label: None,
        });

        assert_snapshot!(lower(&info, &[spawn, send, labeled, jump, fallthrough]), @r"
        break
        pass
        _TODO_fallthrough()
        ");
    }

    #[test]
    fn bad_statement_is_fatal() {
        let mut info = TypeInfo::new();
        let stmt = info.stmt(StmtKind::Bad);
        let err = Compiler::new(&info).compile_stmt(&stmt).unwrap_err();
        assert_eq!(err.to_string(), "unknown Stmt: BadStmt");
    }

    #[test]
    fn comments_are_attached_in_file_context() {
        let mut info = TypeInfo::new();
        let n = local(&mut info, "n", int());
        let x = info.name(n);
        let stmt = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let mut comments = CommentMap::new();
        comments.attach(stmt.id, CommentGroup::new(["// bump the counter"]));

        let mut compiler = Compiler::new(&info).with_comments(&comments);
        let out = compiler.compile_stmt(&stmt).unwrap();
        assert_snapshot!(PythonWriter::emit_stmts(&out), @r"
        # bump the counter
        n += 1
        ");

        let config = LoweringConfig {
            comments: false,
            ..LoweringConfig::default()
        };
        let mut compiler = Compiler::new(&info)
            .with_comments(&comments)
            .with_config(config);
        let out = compiler.compile_stmt(&stmt).unwrap();
        assert_eq!(PythonWriter::emit_stmts(&out), "n += 1\n");
    }
}

// ============================================================================
// Hoisted statements
// ============================================================================

mod hoisting {
    use super::*;
    use normalize_lowering::{ExprCompiler, ExprLowering, Lowered};

    /// Engine that moves every call into a fresh temporary, so the order in
    /// which hoisted statements are spliced shows up in the output.
    struct HoistCalls;

    impl ExprLowering for HoistCalls {
        fn lower_expr(&self, c: &mut Compiler<'_>, expr: &go::Expr) -> normalize_lowering::Result<Lowered> {
            let lowered = ExprCompiler.lower_expr(c, expr)?;
            if !matches!(expr.kind, ExprKind::Call { .. }) {
                return Ok(lowered);
            }
            let mut hoisted = lowered.hoisted;
            let temp = c.temp("t");
            hoisted.push(ir::Stmt::assign(ir::Expr::name(temp.clone()), lowered.value));
            Ok(Lowered::with_hoisted(ir::Expr::name(temp), hoisted))
        }
    }

    fn lower_hoisting(info: &TypeInfo, stmt: &go::Stmt) -> String {
        let engine = HoistCalls;
        let mut compiler = Compiler::new(info).with_engine(&engine);
        let out = compiler.compile_stmt(stmt).expect("lowering failed");
        PythonWriter::emit_stmts(&out)
    }

    fn call(info: &mut TypeInfo, f: ObjectId, args: Vec<go::Expr>) -> go::Expr {
        let fun = info.name(f);
        info.call(fun, args)
    }

    fn set(info: &mut TypeInfo, target: ObjectId, value: i64) -> go::Stmt {
        let target = info.name(target);
        let value = info.int(value);
        assign(info, vec![target], AssignTok::Assign, vec![value])
    }

    #[test]
    fn multi_value_assignment_hoists_left_to_right() {
        let mut info = TypeInfo::new();
        let a = local(&mut info, "a", int());
        let b = local(&mut info, "b", int());
        let f = func(&mut info, "f");
        let g = func(&mut info, "g");

        let lhs = vec![info.name(a), info.name(b)];
        let rhs = vec![call(&mut info, f, vec![]), call(&mut info, g, vec![])];
        let stmt = assign(&mut info, lhs, AssignTok::Assign, rhs);

        assert_snapshot!(lower_hoisting(&info, &stmt), @r"
        t = f()
        t1 = g()
        a, b = t, t1
        ");
    }

    #[test]
    fn switch_hoists_init_then_tag_then_case_tests() {
        let mut info = TypeInfo::new();
        let x = local(&mut info, "x", int());
        let n = local(&mut info, "n", int());
        let f = func(&mut info, "f");
        let g = func(&mut info, "g");
        let h = func(&mut info, "h");
        let k = func(&mut info, "k");

        let target = info.name(x);
        let value = call(&mut info, f, vec![]);
        let init = assign(&mut info, vec![target], AssignTok::Define, vec![value]);
        let arg = info.name(x);
        let tag = call(&mut info, g, vec![arg]);
        let test = call(&mut info, h, vec![]);
        let body = set(&mut info, n, 1);
        let first = clause(&mut info, vec![test], vec![body]);
        let test = call(&mut info, k, vec![]);
        let body = set(&mut info, n, 2);
        let second = clause(&mut info, vec![test], vec![body]);
        let stmt = info.stmt(StmtKind::Switch {
            init: Some(Box::new(init)),
            tag: Some(tag),
            clauses: vec![first, second],
        });

        assert_snapshot!(lower_hoisting(&info, &stmt), @r"
        t = f()
        x = t
        t1 = g(x)
        tag = t1
        t2 = h()
        t3 = k()
        if tag == t2:
            n = 1
        elif tag == t3:
            n = 2
        ");
    }

    #[test]
    fn if_hoists_init_before_condition() {
        let mut info = TypeInfo::new();
        let v = local(&mut info, "v", int());
        let n = local(&mut info, "n", int());
        let f = func(&mut info, "f");
        let ok = func(&mut info, "ok");

        let target = info.name(v);
        let value = call(&mut info, f, vec![]);
        let init = assign(&mut info, vec![target], AssignTok::Define, vec![value]);
        let arg = info.name(v);
        let cond = call(&mut info, ok, vec![arg]);
        let body = set(&mut info, n, 1);
        let stmt = info.stmt(StmtKind::If {
            init: Some(Box::new(init)),
            cond,
            body: Block { stmts: vec![body] },
            els: None,
        });

        assert_snapshot!(lower_hoisting(&info, &stmt), @r"
        t = f()
        v = t
        t1 = ok(v)
        if t1:
            n = 1
        ");
    }

    #[test]
    fn counted_loop_hoists_condition_after_init() {
        let mut info = TypeInfo::new();
        let i = local(&mut info, "i", int());
        let n = local(&mut info, "n", int());
        let start = func(&mut info, "start");
        let more = func(&mut info, "more");

        let target = info.name(i);
        let value = call(&mut info, start, vec![]);
        let init = assign(&mut info, vec![target], AssignTok::Define, vec![value]);
        let arg = info.name(i);
        let cond = call(&mut info, more, vec![arg]);
        let x = info.name(i);
        let post = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let body = set(&mut info, n, 1);
        let stmt = info.stmt(StmtKind::For {
            init: Some(Box::new(init)),
            cond: Some(cond),
            post: Some(Box::new(post)),
            body: Block { stmts: vec![body] },
        });

        assert_snapshot!(lower_hoisting(&info, &stmt), @r"
        t = start()
        i = t
        t1 = more(i)
        while t1:
            n = 1
            i += 1
        ");
    }
}

// ============================================================================
// Functions and defers
// ============================================================================

mod functions {
    use super::*;

    #[test]
    fn defers_unwind_in_reverse() {
        let mut info = TypeInfo::new();
        let run = func(&mut info, "run");
        let f = func(&mut info, "f");
        let g = func(&mut info, "g");
        let x = local(&mut info, "x", int());
        let y = local(&mut info, "y", int());

        let fun = info.name(f);
        let arg = info.name(x);
        let call = info.call(fun, vec![arg]);
        let defer_f = info.stmt(StmtKind::Defer(call));
        let fun = info.name(g);
        let arg = info.name(y);
        let call = info.call(fun, vec![arg]);
        let defer_g = info.stmt(StmtKind::Defer(call));
        let ret = info.stmt(StmtKind::Return(vec![]));

        let names = vec![info.ident(x), info.ident(y)];
        let ty = info.builtin("int").unwrap();
        let sig = signature(vec![field(names, ty)], None);
        let decl = func_decl(&mut info, run, sig, vec![defer_f, defer_g, ret]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        def run(x, y):
            defers = []
            try:
                defers.append((f, (x,)))
                defers.append((g, (y,)))
                return
            finally:
                for fun, args in reversed(defers):
                    fun(*args)
        ");
    }

    #[test]
    fn defer_outside_function_is_dropped() {
        let mut info = TypeInfo::new();
        let f = func(&mut info, "f");
        let fun = info.name(f);
        let call = info.call(fun, vec![]);
        let stmt = info.stmt(StmtKind::Defer(call));

        assert_eq!(lower(&info, &[stmt]), "");
    }

    #[test]
    fn named_results_and_bare_return() {
        let mut info = TypeInfo::new();
        let div = func(&mut info, "div");
        let a = local(&mut info, "a", int());
        let b = local(&mut info, "b", int());
        let q = local(&mut info, "q", int());
        let err = local(&mut info, "err", Type::Interface);

        let target = info.name(q);
        let left = info.name(a);
        let right = info.name(b);
        let quotient = info.binary(BinaryOp::Quo, left, right);
        let body = assign(&mut info, vec![target], AssignTok::Assign, vec![quotient]);
        let ret = info.stmt(StmtKind::Return(vec![]));

        let params = vec![info.ident(a), info.ident(b)];
        let int_ty = info.builtin("int").unwrap();
        let q_name = vec![info.ident(q)];
        let q_ty = info.builtin("int").unwrap();
        let err_name = vec![info.ident(err)];
        let err_ty = info.builtin("error").unwrap();
        let sig = signature(
            vec![field(params, int_ty)],
            Some(vec![field(q_name, q_ty), field(err_name, err_ty)]),
        );
        let decl = func_decl(&mut info, div, sig, vec![body, ret]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        def div(a, b):
            q = 0
            err = None
            q = a // b
            return q, err
        ");
    }

    #[test]
    fn global_stores_are_declared() {
        let mut info = TypeInfo::new();
        let bump = func(&mut info, "bump");
        let counter = global(&mut info, "counter", int());
        let x = info.name(counter);
        let stmt = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let decl = func_decl(&mut info, bump, signature(vec![], None), vec![stmt]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        def bump():
            global counter
            counter += 1
        ");
    }

    #[test]
    fn closures_declare_nonlocal_and_hoist() {
        let mut info = TypeInfo::new();
        let outer = func(&mut info, "outer");
        let n = local(&mut info, "n", int());
        let inc = local(&mut info, "inc", Type::Signature(Signature::default()));

        let target = info.name(n);
        let zero = info.int(0);
        let init = assign(&mut info, vec![target], AssignTok::Define, vec![zero]);
        let x = info.name(n);
        let bump = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let lit = info.expr(ExprKind::FuncLit {
            ty: FuncType::default(),
            body: Block { stmts: vec![bump] },
        });
        let target = info.name(inc);
        let bind = assign(&mut info, vec![target], AssignTok::Define, vec![lit]);
        let decl = func_decl(&mut info, outer, signature(vec![], None), vec![init, bind]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        def outer():
            n = 0
            def func():
                nonlocal n
                n += 1
            inc = func
        ");
    }

    #[test]
    fn single_return_literal_is_a_lambda() {
        let mut info = TypeInfo::new();
        let a = local(&mut info, "a", int());
        let add = local(&mut info, "add", Type::Signature(Signature::default()));

        let left = info.name(a);
        let one = info.int(1);
        let sum = info.binary(BinaryOp::Add, left, one);
        let ret = info.stmt(StmtKind::Return(vec![sum]));
        let names = vec![info.ident(a)];
        let ty = info.builtin("int").unwrap();
        let lit = info.expr(ExprKind::FuncLit {
            ty: signature(vec![field(names, ty)], None),
            body: Block { stmts: vec![ret] },
        });
        let target = info.name(add);
        let stmt = assign(&mut info, vec![target], AssignTok::Define, vec![lit]);

        assert_snapshot!(lower(&info, &[stmt]), @"add = lambda a: a + 1");
    }

    #[test]
    fn method_calls_match_method_definitions() {
        let mut info = TypeInfo::new();
        let shape = info.declare_named("Shape", Underlying::Struct);
        let method = info.declare(Object::new("m", ObjectKind::Func));
        let recv = local(&mut info, "s", Type::Pointer(Box::new(int())));
        let g = func(&mut info, "g");
        let t = local(&mut info, "t", Type::Pointer(Box::new(int())));
        let m = local(&mut info, "m", int());

        // func g(t *Shape) { m := 1; t.m() }
        let target = info.name(m);
        let one = info.int(1);
        let define = assign(&mut info, vec![target], AssignTok::Define, vec![one]);
        let receiver = info.name(t);
        let fun = info.selector(receiver, method);
        let call = info.call(fun, vec![]);
        let invoke = info.expr_stmt(call);
        let names = vec![info.ident(t)];
        let ty = info.name(shape);
        let ty = info.expr(ExprKind::Star(Box::new(ty)));
        let g_decl = func_decl(&mut info, g, signature(vec![field(names, ty)], None), vec![define, invoke]);

        // func (s *Shape) m() {}
        let recv_ty = info.name(shape);
        let recv_ty = info.expr(ExprKind::Star(Box::new(recv_ty)));
        let recv_names = vec![info.ident(recv)];
        let name = info.ident(method);
        let method_decl = Decl::Func(go::FuncDecl {
            pos: Pos::NONE,
            doc: None,
            recv: Some(FieldList {
                fields: vec![field(recv_names, recv_ty)],
            }),
            name,
            ty: FuncType::default(),
            body: Some(Block::default()),
        });

        let mut compiler = Compiler::new(&info);
        let caller = render(compiler.compile_decl(&g_decl).unwrap());
        let callee = render(compiler.compile_decl(&method_decl).unwrap());

        assert_snapshot!(caller, @r"
        def g(t):
            m = 1
            t.m()
        ");
        assert_snapshot!(callee, @r"
        def m(s):
            pass
        ");
    }

    #[test]
    fn variadic_and_unnamed_parameters() {
        let mut info = TypeInfo::new();
        let log = func(&mut info, "log");
        let parts = local(&mut info, "parts", Type::Slice(Box::new(Type::Basic(BasicKind::String))));

        let string_ty = info.builtin("string").unwrap();
        let elem = info.builtin("string").unwrap();
        let rest = info.expr(ExprKind::Ellipsis(Some(Box::new(elem))));
        let names = vec![info.ident(parts)];
        let blank = vec![info.blank()];
        let int_ty = info.builtin("int").unwrap();
        let sig = signature(
            vec![field(vec![], string_ty), field(blank, int_ty), field(names, rest)],
            None,
        );
        let decl = func_decl(&mut info, log, sig, vec![]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        def log(arg, _, *parts):
            pass
        ");
    }

    #[test]
    fn multiple_receivers_are_rejected() {
        let mut info = TypeInfo::new();
        let point = info.declare_named("Point", Underlying::Struct);
        let method = info.declare(Object::new("Move", ObjectKind::Func));
        let p = local(&mut info, "p", int());
        let q = local(&mut info, "q", int());

        let names = vec![info.ident(p), info.ident(q)];
        let ty = info.name(point);
        let name = info.ident(method);
        let decl = Decl::Func(go::FuncDecl {
            pos: Pos::NONE,
            doc: None,
            recv: Some(FieldList {
                fields: vec![field(names, ty)],
            }),
            name,
            ty: FuncType::default(),
            body: Some(Block::default()),
        });

        let err = Compiler::new(&info).compile_decl(&decl).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MultipleReceivers);
    }
}

// ============================================================================
// Type declarations
// ============================================================================

mod types {
    use super::*;

    #[test]
    fn struct_becomes_class() {
        let mut info = TypeInfo::new();
        let point = info.declare_named("Point", Underlying::Struct);
        let mut fields = Vec::new();
        for (name, ty) in [
            ("X", int()),
            ("Y", int()),
            ("Name", Type::Basic(BasicKind::String)),
        ] {
            let obj = info.declare(Object::new(name, ObjectKind::Field).with_type(ty.clone()));
            fields.push(FieldVar {
                obj,
                name: name.into(),
                ty,
            });
        }
        let ty = info.typed_expr(
            ExprKind::StructType(FieldList::default()),
            Type::Struct(StructType { fields }),
        );
        let name = info.ident(point);
        let decl = gen_decl(
            DeclTok::Type,
            Some(CommentGroup::new(["// Point is a point."])),
            vec![type_spec(name, ty)],
        );

        assert_snapshot!(lower_decl(&info, &decl), @r#"
        class Point:
            """Point is a point."""
            def __init__(self, X=0, Y=0, Name=""):
                self.X = X
                self.Y = Y
                self.Name = Name
        "#);
    }

    #[test]
    fn empty_struct_is_pass() {
        let mut info = TypeInfo::new();
        let unit = info.declare_named("Unit", Underlying::Struct);
        let ty = info.typed_expr(
            ExprKind::StructType(FieldList::default()),
            Type::Struct(StructType::default()),
        );
        let name = info.ident(unit);
        let decl = gen_decl(DeclTok::Type, None, vec![type_spec(name, ty)]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        class Unit:
            pass
        ");
    }

    #[test]
    fn basic_type_wraps_a_value() {
        let mut info = TypeInfo::new();
        let celsius = info.declare_named("Celsius", Underlying::Basic(BasicKind::Float64));
        let ty = info.builtin("float64").unwrap();
        let name = info.ident(celsius);
        let decl = gen_decl(DeclTok::Type, None, vec![type_spec(name, ty)]);

        assert_snapshot!(lower_decl(&info, &decl), @r"
        class Celsius:
            def __init__(self, value=0.0):
                self.value = value
        ");
    }

    #[test]
    fn named_type_becomes_alias() {
        let mut info = TypeInfo::new();
        let point = info.declare_named("Point", Underlying::Struct);
        let vertex = info.declare_named("Vertex", Underlying::Struct);
        let ty = info.name(point);
        let name = info.ident(vertex);
        let decl = gen_decl(DeclTok::Type, None, vec![type_spec(name, ty)]);

        assert_snapshot!(lower_decl(&info, &decl), @"Vertex = Point");
    }

    #[test]
    fn interface_declares_nothing() {
        let mut info = TypeInfo::new();
        let reader = info.declare_named("Reader", Underlying::Interface);
        let ty = info.typed_expr(ExprKind::InterfaceType, Type::Interface);
        let name = info.ident(reader);
        let decl = gen_decl(DeclTok::Type, None, vec![type_spec(name, ty)]);

        let artifacts = Compiler::new(&info).compile_decl(&decl).unwrap();
        assert!(artifacts.is_empty());
    }
}

// ============================================================================
// Module assembly
// ============================================================================

mod module {
    use super::*;

    /// `type Point struct{}`, a method on it, `main` and a package variable,
    /// declared in that order.
    fn program(info: &mut TypeInfo) -> Vec<File> {
        let point = info.declare_named("Point", Underlying::Struct);
        let area = info.declare(Object::new("area", ObjectKind::Func));
        let p = local(info, "p", Type::Pointer(Box::new(int())));
        let main = func(info, "main");
        let counter = global(info, "counter", int());

        let ty = info.typed_expr(
            ExprKind::StructType(FieldList::default()),
            Type::Struct(StructType::default()),
        );
        let name = info.ident(point);
        let point_decl = gen_decl(DeclTok::Type, None, vec![type_spec(name, ty)]);

        let zero = info.int(0);
        let ret = info.stmt(StmtKind::Return(vec![zero]));
        let recv_ty = info.name(point);
        let recv_ty = info.expr(ExprKind::Star(Box::new(recv_ty)));
        let recv_names = vec![info.ident(p)];
        let name = info.ident(area);
        let method = Decl::Func(go::FuncDecl {
            pos: Pos::NONE,
            doc: None,
            recv: Some(FieldList {
                fields: vec![field(recv_names, recv_ty)],
            }),
            name,
            ty: FuncType::default(),
            body: Some(Block { stmts: vec![ret] }),
        });

        let x = info.name(counter);
        let bump = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let main_decl = func_decl(info, main, signature(vec![], None), vec![bump]);

        let names = vec![info.ident(counter)];
        let ty = info.builtin("int").unwrap();
        let var_decl = gen_decl(DeclTok::Var, None, vec![value_spec(names, Some(ty), vec![])]);

        vec![File {
            name: "main.go".into(),
            decls: vec![point_decl, method, main_decl, var_decl],
            comments: CommentMap::new(),
        }]
    }

    #[test]
    fn module_order_and_entry_point() {
        let mut info = TypeInfo::new();
        let files = program(&mut info);
        let module = compile_files(Compiler::new(&info), &files).unwrap();

        assert_snapshot!(PythonWriter::emit(&module), @r#"
        class Point:
            def area(p):
                return 0
        def main():
            global counter
            counter += 1
        counter = 0
        if __name__ == "__main__":
            main()
        "#);
    }

    #[test]
    fn module_tree() {
        let mut info = TypeInfo::new();
        let bump = func(&mut info, "bump");
        let counter = global(&mut info, "counter", int());

        let x = info.name(counter);
        let inc = info.stmt(StmtKind::IncDec { x, tok: IncDec::Inc });
        let bump_decl = func_decl(&mut info, bump, signature(vec![], None), vec![inc]);
        let names = vec![info.ident(counter)];
        let ty = info.builtin("int").unwrap();
        let var_decl = gen_decl(DeclTok::Var, None, vec![value_spec(names, Some(ty), vec![])]);
        let files = vec![File {
            name: "counter.go".into(),
            decls: vec![bump_decl, var_decl],
            comments: CommentMap::new(),
        }];

        let module = compile_files(Compiler::new(&info), &files).unwrap();
        insta::assert_json_snapshot!(module, @r#"
        {
          "body": [
            {
              "type": "FunctionDef",
              "name": "bump",
              "args": {
                "args": [],
                "vararg": null,
                "defaults": []
              },
              "body": [
                {
                  "type": "Global",
                  "names": [
                    "counter"
                  ]
                },
                {
                  "type": "AugAssign",
                  "target": {
                    "type": "Name",
                    "id": "counter"
                  },
                  "op": "Add",
                  "value": {
                    "type": "Num",
                    "n": "1"
                  }
                }
              ]
            },
            {
              "type": "Assign",
              "targets": [
                {
                  "type": "Name",
                  "id": "counter"
                }
              ],
              "value": {
                "type": "Num",
                "n": "0"
              }
            }
          ]
        }
        "#);
    }

    #[test]
    fn config_file_controls_output() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"receiver = \"this\"\nentry_point = false\n").unwrap();
        let config = LoweringConfig::load(file.path()).unwrap();

        let mut info = TypeInfo::new();
        let files = program(&mut info);
        let module = compile_files(Compiler::new(&info).with_config(config), &files).unwrap();
        let out = PythonWriter::emit(&module);
        assert!(!out.contains("__main__"));

        let shape = info.declare_named("Shape", Underlying::Struct);
        let sides = info.declare(Object::new("Sides", ObjectKind::Field).with_type(int()));
        let ty = info.typed_expr(
            ExprKind::StructType(FieldList::default()),
            Type::Struct(StructType {
                fields: vec![FieldVar {
                    obj: sides,
                    name: "Sides".into(),
                    ty: int(),
                }],
            }),
        );
        let name = info.ident(shape);
        let decl = gen_decl(DeclTok::Type, None, vec![type_spec(name, ty)]);
        let config = LoweringConfig {
            receiver: "this".into(),
            ..LoweringConfig::default()
        };
        let out = render(Compiler::new(&info).with_config(config).compile_decl(&decl).unwrap());
        assert!(out.contains("def __init__(this, Sides=0):"));
        assert!(out.contains("this.Sides = Sides"));
    }
}
