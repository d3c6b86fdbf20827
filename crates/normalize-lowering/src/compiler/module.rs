//! Module assembly.
//!
//! Declarations lower one at a time into [`DeclArtifact`]s; the builder
//! groups them and lays the module out as classes (each followed by its
//! methods), alias bindings, free functions, value bindings and finally the
//! entry-point guard.

use super::{Compiler, DeclArtifact};
use crate::error::Result;
use crate::go::{Decl, File};
use crate::ir::{ClassDef, CmpOperator, Expr, FunctionDef, Identifier, Module, Stmt};
use std::collections::HashMap;
use tracing::warn;

pub struct ModuleBuilder<'a> {
    compiler: Compiler<'a>,
    classes: Vec<ClassDef>,
    aliases: Vec<Stmt>,
    functions: Vec<FunctionDef>,
    methods: HashMap<Identifier, Vec<FunctionDef>>,
    /// Owners in the order their first method was seen, for stable warnings.
    method_owners: Vec<Identifier>,
    values: Vec<Stmt>,
    entry: Option<Identifier>,
}

impl<'a> ModuleBuilder<'a> {
    pub fn new(compiler: Compiler<'a>) -> Self {
        Self {
            compiler,
            classes: Vec::new(),
            aliases: Vec::new(),
            functions: Vec::new(),
            methods: HashMap::new(),
            method_owners: Vec::new(),
            values: Vec::new(),
            entry: None,
        }
    }

    /// Lower every declaration of `file`, with its comments attached.
    pub fn add_file(&mut self, file: &'a File) -> Result<()> {
        self.compiler.set_comments(Some(&file.comments));
        let result = file.decls.iter().try_for_each(|decl| self.add_decl(decl));
        self.compiler.set_comments(None);
        result
    }

    pub fn add_decl(&mut self, decl: &Decl) -> Result<()> {
        let is_main = matches!(decl, Decl::Func(func) if func.recv.is_none() && func.name.name == "main");
        for artifact in self.compiler.compile_decl(decl)? {
            match artifact {
                DeclArtifact::Class(class) => self.classes.push(class),
                DeclArtifact::Alias(binding) => self.aliases.push(binding),
                DeclArtifact::Function(func) => match func.class {
                    Some(class) => {
                        if !self.methods.contains_key(&class) {
                            self.method_owners.push(class.clone());
                        }
                        self.methods.entry(class).or_default().push(func.def);
                    }
                    None => {
                        if is_main {
                            self.entry = Some(func.def.name.clone());
                        }
                        self.functions.push(func.def);
                    }
                },
                DeclArtifact::Values(stmts) => self.values.extend(stmts),
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Module {
        let mut body = Vec::new();

        for mut class in self.classes {
            if let Some(methods) = self.methods.remove(&class.name) {
                if class.body == [Stmt::Pass] {
                    class.body.clear();
                }
                class.body.extend(methods.into_iter().map(Stmt::FunctionDef));
            }
            body.push(Stmt::ClassDef(class));
        }
        for owner in &self.method_owners {
            if let Some(methods) = self.methods.get(owner) {
                warn!("dropping {} method(s) of {owner}: no class was generated for it", methods.len());
            }
        }

        body.extend(self.aliases);
        body.extend(self.functions.into_iter().map(Stmt::FunctionDef));
        body.extend(self.values);

        if self.compiler.config().entry_point {
            if let Some(main) = self.entry {
                body.push(Stmt::if_stmt(
                    Expr::compare(
                        Expr::name("__name__"),
                        CmpOperator::Eq,
                        Expr::string("__main__"),
                    ),
                    vec![Stmt::expr(Expr::call(Expr::name(main), vec![]))],
                    Vec::new(),
                ));
            }
        }

        Module::new(body)
    }
}

/// Lower a set of files into one module.
pub fn compile_files<'a>(compiler: Compiler<'a>, files: &'a [File]) -> Result<Module> {
    let mut builder = ModuleBuilder::new(compiler);
    for file in files {
        builder.add_file(file)?;
    }
    Ok(builder.finish())
}
