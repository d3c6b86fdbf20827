//! Python writer for the lowered tree.
//!
//! Emits a [`Module`] as Python source with four-space indentation.
//! Operator expressions are parenthesized wherever they nest inside another
//! operator, attribute or subscript; statement-level expressions, call
//! arguments and sequence items are written bare.

use crate::ir::*;
use std::fmt::Write;

/// Emits the target tree as Python source code.
pub struct PythonWriter {
    output: String,
    indent: usize,
}

impl PythonWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a module to Python source.
    pub fn emit(module: &Module) -> String {
        Self::emit_stmts(&module.body)
    }

    pub fn emit_stmts(stmts: &[Stmt]) -> String {
        let mut writer = Self::new();
        for stmt in stmts {
            writer.write_stmt(stmt);
        }
        writer.output
    }

    pub fn emit_expr(expr: &Expr) -> String {
        let mut writer = Self::new();
        writer.write_top_expr(expr);
        writer.output
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    fn write_block(&mut self, body: &[Stmt]) {
        self.indent += 1;
        if body.is_empty() {
            self.write_indent();
            self.output.push_str("pass\n");
        }
        for stmt in body {
            self.write_stmt(stmt);
        }
        self.indent -= 1;
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        self.write_indent();
        match stmt {
            Stmt::FunctionDef(func) => {
                self.output.push_str("def ");
                self.output.push_str(&func.name);
                self.output.push('(');
                self.write_arguments(&func.args);
                self.output.push_str("):\n");
                self.write_block(&func.body);
            }

            Stmt::ClassDef(class) => {
                let _ = writeln!(self.output, "class {}:", class.name);
                self.write_block(&class.body);
            }

            Stmt::Return { value } => {
                self.output.push_str("return");
                if let Some(value) = value {
                    self.output.push(' ');
                    self.write_unpacked(value);
                }
                self.output.push('\n');
            }

            Stmt::Delete { targets } => {
                self.output.push_str("del ");
                self.write_list(targets);
                self.output.push('\n');
            }

            Stmt::Assign { targets, value } => {
                for (i, target) in targets.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr(target);
                }
                self.output.push_str(" = ");
                self.write_unpacked(value);
                self.output.push('\n');
            }

            Stmt::AugAssign { target, op, value } => {
                self.write_expr(target);
                let _ = write!(self.output, " {}= ", operator(*op));
                self.write_top_expr(value);
                self.output.push('\n');
            }

            Stmt::For { target, iter, body } => {
                self.output.push_str("for ");
                self.write_unpacked(target);
                self.output.push_str(" in ");
                self.write_top_expr(iter);
                self.output.push_str(":\n");
                self.write_block(body);
            }

            Stmt::While { test, body } => {
                self.output.push_str("while ");
                self.write_top_expr(test);
                self.output.push_str(":\n");
                self.write_block(body);
            }

            Stmt::If { .. } => self.write_if(stmt),

            Stmt::Try {
                body,
                handlers,
                finalbody,
            } => {
                self.output.push_str("try:\n");
                self.write_block(body);
                for handler in handlers {
                    self.write_indent();
                    self.output.push_str("except");
                    if let Some(typ) = &handler.typ {
                        self.output.push(' ');
                        self.write_expr(typ);
                    }
                    self.output.push_str(":\n");
                    self.write_block(&handler.body);
                }
                if !finalbody.is_empty() {
                    self.write_indent();
                    self.output.push_str("finally:\n");
                    self.write_block(finalbody);
                }
            }

            Stmt::Global { names } => {
                let _ = writeln!(self.output, "global {}", names.join(", "));
            }

            Stmt::Nonlocal { names } => {
                let _ = writeln!(self.output, "nonlocal {}", names.join(", "));
            }

            Stmt::Expr { value } => {
                self.write_top_expr(value);
                self.output.push('\n');
            }

            Stmt::Pass => self.output.push_str("pass\n"),
            Stmt::Break => self.output.push_str("break\n"),
            Stmt::Continue => self.output.push_str("continue\n"),

            Stmt::Comment { text } => {
                if text.is_empty() {
                    self.output.push_str("#\n");
                } else {
                    let _ = writeln!(self.output, "# {text}");
                }
            }

            Stmt::DocString { lines } => self.write_docstring(lines),
        }
    }

    /// `if`, folding an `else` that holds a single `if` into `elif`.
    fn write_if(&mut self, stmt: &Stmt) {
        let Stmt::If { test, body, orelse } = stmt else {
            return;
        };
        self.output.push_str("if ");
        self.write_top_expr(test);
        self.output.push_str(":\n");
        self.write_block(body);

        match orelse.as_slice() {
            [] => {}
            [nested @ Stmt::If { .. }] => {
                self.write_indent();
                self.output.push_str("el");
                self.write_if(nested);
            }
            orelse => {
                self.write_indent();
                self.output.push_str("else:\n");
                self.write_block(orelse);
            }
        }
    }

    fn write_docstring(&mut self, lines: &[String]) {
        let escape = |line: &str| line.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
        match lines {
            [] => self.output.push_str("\"\"\"\"\"\"\n"),
            [line] => {
                let _ = writeln!(self.output, "\"\"\"{}\"\"\"", escape(line));
            }
            [first, rest @ ..] => {
                let _ = writeln!(self.output, "\"\"\"{}", escape(first));
                for line in rest {
                    if line.is_empty() {
                        self.output.push('\n');
                    } else {
                        self.write_indent();
                        self.output.push_str(&escape(line));
                        self.output.push('\n');
                    }
                }
                self.write_indent();
                self.output.push_str("\"\"\"\n");
            }
        }
    }

    fn write_arguments(&mut self, args: &Arguments) {
        let first_default = args.args.len().saturating_sub(args.defaults.len());
        let mut first = true;
        for (i, arg) in args.args.iter().enumerate() {
            if !first {
                self.output.push_str(", ");
            }
            first = false;
            self.output.push_str(arg);
            if i >= first_default {
                self.output.push('=');
                self.write_top_expr(&args.defaults[i - first_default]);
            }
        }
        if let Some(vararg) = &args.vararg {
            if !first {
                self.output.push_str(", ");
            }
            self.output.push('*');
            self.output.push_str(vararg);
        }
    }

    /// A tuple written without its parentheses, as assignment values, return
    /// values and loop targets allow.
    fn write_unpacked(&mut self, expr: &Expr) {
        match expr {
            Expr::Tuple { elts } if !elts.is_empty() => {
                self.write_list(elts);
                if elts.len() == 1 {
                    self.output.push(',');
                }
            }
            _ => self.write_top_expr(expr),
        }
    }

    /// An expression in statement position: operators need no grouping.
    fn write_top_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BoolOp { op, values } => self.write_bool_op(*op, values),
            Expr::BinOp { left, op, right } => self.write_bin_op(left, *op, right),
            Expr::Compare {
                left,
                ops,
                comparators,
            } => self.write_compare(left, ops, comparators),
            Expr::Lambda { args, body } => self.write_lambda(args, body),
            _ => self.write_expr(expr),
        }
    }

    /// Comma-separated items; each item is its own grouping context.
    fn write_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_top_expr(expr);
        }
    }

    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BoolOp { .. } | Expr::BinOp { .. } | Expr::Compare { .. } | Expr::Lambda { .. } => {
                self.output.push('(');
                self.write_top_expr(expr);
                self.output.push(')');
            }

            Expr::UnaryOp { op, operand } => {
                self.output.push_str(match op {
                    UnaryOperator::Invert => "~",
                    UnaryOperator::Not => "not ",
                    UnaryOperator::UAdd => "+",
                    UnaryOperator::USub => "-",
                });
                self.write_expr(operand);
            }

            Expr::Dict { keys, values } => {
                self.output.push('{');
                for (i, (key, value)) in keys.iter().zip(values).enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_top_expr(key);
                    self.output.push_str(": ");
                    self.write_top_expr(value);
                }
                self.output.push('}');
            }

            Expr::ListComp { elt, generators } => {
                self.output.push('[');
                self.write_expr(elt);
                for generator in generators {
                    self.output.push_str(" for ");
                    self.write_unpacked(&generator.target);
                    self.output.push_str(" in ");
                    self.write_expr(&generator.iter);
                }
                self.output.push(']');
            }

            Expr::Call {
                func,
                args,
                keywords,
            } => {
                self.write_expr(func);
                self.output.push('(');
                self.write_list(args);
                for (i, keyword) in keywords.iter().enumerate() {
                    if i > 0 || !args.is_empty() {
                        self.output.push_str(", ");
                    }
                    self.output.push_str(&keyword.arg);
                    self.output.push('=');
                    self.write_top_expr(&keyword.value);
                }
                self.output.push(')');
            }

            Expr::Num { n } => self.output.push_str(n),

            Expr::Str { s } => self.write_string(s),

            Expr::NameConstant { value } => self.output.push_str(match value {
                Constant::None => "None",
                Constant::True => "True",
                Constant::False => "False",
            }),

            Expr::Attribute { value, attr } => {
                self.write_expr(value);
                self.output.push('.');
                self.output.push_str(attr);
            }

            Expr::Subscript { value, slice } => {
                self.write_expr(value);
                self.output.push('[');
                match slice.as_ref() {
                    Slice::Index(index) => self.write_unpacked(index),
                    Slice::Range { lower, upper, step } => {
                        if let Some(lower) = lower {
                            self.write_expr(lower);
                        }
                        self.output.push(':');
                        if let Some(upper) = upper {
                            self.write_expr(upper);
                        }
                        if let Some(step) = step {
                            self.output.push(':');
                            self.write_expr(step);
                        }
                    }
                }
                self.output.push(']');
            }

            Expr::Starred { value } => {
                self.output.push('*');
                self.write_expr(value);
            }

            Expr::Name { id } => self.output.push_str(id),

            Expr::List { elts } => {
                self.output.push('[');
                self.write_list(elts);
                self.output.push(']');
            }

            Expr::Tuple { elts } => {
                self.output.push('(');
                self.write_list(elts);
                if elts.len() == 1 {
                    self.output.push(',');
                }
                self.output.push(')');
            }
        }
    }

    fn write_bool_op(&mut self, op: BoolOperator, values: &[Expr]) {
        let op = match op {
            BoolOperator::And => " and ",
            BoolOperator::Or => " or ",
        };
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.output.push_str(op);
            }
            self.write_expr(value);
        }
    }

    fn write_bin_op(&mut self, left: &Expr, op: Operator, right: &Expr) {
        self.write_expr(left);
        let _ = write!(self.output, " {} ", operator(op));
        self.write_expr(right);
    }

    fn write_compare(&mut self, left: &Expr, ops: &[CmpOperator], comparators: &[Expr]) {
        self.write_expr(left);
        for (op, right) in ops.iter().zip(comparators) {
            let op = match op {
                CmpOperator::Eq => "==",
                CmpOperator::NotEq => "!=",
                CmpOperator::Lt => "<",
                CmpOperator::LtE => "<=",
                CmpOperator::Gt => ">",
                CmpOperator::GtE => ">=",
                CmpOperator::In => "in",
                CmpOperator::NotIn => "not in",
            };
            let _ = write!(self.output, " {op} ");
            self.write_expr(right);
        }
    }

    fn write_lambda(&mut self, args: &Arguments, body: &Expr) {
        self.output.push_str("lambda");
        if !args.args.is_empty() || args.vararg.is_some() {
            self.output.push(' ');
            self.write_arguments(args);
        }
        self.output.push_str(": ");
        self.write_unpacked(body);
    }

    fn write_string(&mut self, s: &str) {
        self.output.push('"');
        for c in s.chars() {
            match c {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if c.is_control() => {
                    let _ = write!(self.output, "\\x{:02x}", c as u32);
                }
                _ => self.output.push(c),
            }
        }
        self.output.push('"');
    }
}

fn operator(op: Operator) -> &'static str {
    match op {
        Operator::Add => "+",
        Operator::Sub => "-",
        Operator::Mult => "*",
        Operator::Div => "/",
        Operator::FloorDiv => "//",
        Operator::Mod => "%",
        Operator::LShift => "<<",
        Operator::RShift => ">>",
        Operator::BitOr => "|",
        Operator::BitXor => "^",
        Operator::BitAnd => "&",
    }
}

impl Default for PythonWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_assignment() {
        let output = PythonWriter::emit_stmts(&[Stmt::assign(Expr::name("x"), Expr::num("42"))]);
        assert_eq!(output, "x = 42\n");
    }

    #[test]
    fn test_tuple_unpacking() {
        let stmt = Stmt::Assign {
            targets: vec![Expr::name("a"), Expr::name("b")],
            value: Expr::tuple(vec![Expr::num("0"), Expr::num("0")]),
        };
        assert_eq!(PythonWriter::emit_stmts(&[stmt]), "a, b = 0, 0\n");
    }

    #[test]
    fn test_single_element_tuple() {
        let value = Expr::tuple(vec![Expr::name("f"), Expr::tuple(vec![Expr::name("x")])]);
        assert_eq!(PythonWriter::emit_expr(&value), "(f, (x,))");
    }

    #[test]
    fn test_nested_operators_parenthesized() {
        let expr = Expr::binop(
            Expr::binop(Expr::name("a"), Operator::Add, Expr::name("b")),
            Operator::Mult,
            Expr::name("c"),
        );
        assert_eq!(PythonWriter::emit_expr(&expr), "(a + b) * c");
    }

    #[test]
    fn test_elif_chain() {
        let stmt = Stmt::if_stmt(
            Expr::name("a"),
            vec![Stmt::Pass],
            vec![Stmt::if_stmt(
                Expr::name("b"),
                vec![Stmt::Break],
                vec![Stmt::Continue],
            )],
        );
        insta::assert_snapshot!(PythonWriter::emit_stmts(&[stmt]), @r"
        if a:
            pass
        elif b:
            break
        else:
            continue
        ");
    }

    #[test]
    fn test_function_with_defaults_and_vararg() {
        let def = FunctionDef {
            name: "f".into(),
            args: Arguments {
                args: vec!["self".into(), "x".into()],
                vararg: Some("rest".into()),
                defaults: vec![Expr::num("0")],
            },
            body: vec![],
        };
        assert_eq!(
            PythonWriter::emit_stmts(&[Stmt::FunctionDef(def)]),
            "def f(self, x=0, *rest):\n    pass\n"
        );
    }

    #[test]
    fn test_try_except_finally() {
        let stmt = Stmt::Try {
            body: vec![Stmt::Delete {
                targets: vec![Expr::index(Expr::name("m"), Expr::name("k"))],
            }],
            handlers: vec![ExceptHandler {
                typ: Some(Expr::name("KeyError")),
                body: vec![Stmt::Pass],
            }],
            finalbody: vec![],
        };
        insta::assert_snapshot!(PythonWriter::emit_stmts(&[stmt]), @r"
        try:
            del m[k]
        except KeyError:
            pass
        ");
    }

    #[test]
    fn test_docstring_and_comment() {
        let class = ClassDef {
            name: "Point".into(),
            body: vec![
                Stmt::DocString {
                    lines: vec!["A point.".into(), "".into(), "Immutable.".into()],
                },
                Stmt::comment("fields follow"),
                Stmt::Pass,
            ],
        };
        insta::assert_snapshot!(PythonWriter::emit_stmts(&[Stmt::ClassDef(class)]), @r#"
        class Point:
            """A point.

            Immutable.
            """
            # fields follow
            pass
        "#);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(PythonWriter::emit_expr(&Expr::string("a\"b\n")), r#""a\"b\n""#);
        assert_eq!(PythonWriter::emit_expr(&Expr::string("\u{7}")), r#""\x07""#);
    }

    #[test]
    fn test_keywords_and_lambda() {
        let call = Expr::Call {
            func: Box::new(Expr::name("print")),
            args: vec![Expr::name("x")],
            keywords: vec![Keyword {
                arg: "end".into(),
                value: Expr::string(""),
            }],
        };
        assert_eq!(PythonWriter::emit_expr(&call), r#"print(x, end="")"#);

        let lambda = Expr::Lambda {
            args: Arguments {
                args: vec!["a".into()],
                ..Arguments::default()
            },
            body: Box::new(Expr::binop(Expr::name("a"), Operator::Add, Expr::num("1"))),
        };
        assert_eq!(PythonWriter::emit_expr(&lambda), "lambda a: a + 1");
        let call = Expr::call(Expr::name("apply"), vec![lambda]);
        assert_eq!(PythonWriter::emit_expr(&call), "apply(lambda a: a + 1)");
    }
}
