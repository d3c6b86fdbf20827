//! Naming scope: stable identifiers for resolved objects plus temporaries.
//!
//! Every object gets exactly one name for the lifetime of the compilation
//! unit. Names are also registered in the level (function nesting depth)
//! they were first given in, so temporaries and later names can avoid them.
//! A nested level sees every name of its ancestors; siblings do not see
//! each other, so two functions may both use a temporary called `tag`.

use crate::go::{Object, ObjectId, ObjectKind};
use crate::ir::Identifier;
use std::collections::{HashMap, HashSet};

/// Python keywords and the builtins the lowering itself emits calls to.
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "class", "def", "del",
    "elif", "except", "finally", "from", "global", "in", "is", "lambda", "nonlocal", "not", "or",
    "pass", "raise", "try", "while", "with", "yield", "KeyError", "bool", "chr", "complex",
    "dict", "enumerate", "float", "int", "len", "list", "max", "min", "print", "range", "reversed",
    "str", "type",
];

/// Append `_` to identifiers that would shadow a keyword or a builtin the
/// generated code depends on.
pub fn escape(name: &str) -> Identifier {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

#[derive(Debug, Default)]
struct Level {
    taken: HashSet<Identifier>,
}

#[derive(Debug)]
pub struct Scope {
    names: HashMap<ObjectId, Identifier>,
    /// Level a local object was named in.
    homes: HashMap<ObjectId, usize>,
    levels: Vec<Level>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            homes: HashMap::new(),
            levels: vec![Level::default()],
        }
    }

    /// Number of live levels; the file level is depth 1.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Enter a nested function body.
    pub fn push(&mut self) {
        self.levels.push(Level::default());
    }

    /// Leave a nested function body. Names already handed out stay valid.
    pub fn pop(&mut self) {
        if self.levels.len() > 1 {
            self.levels.pop();
        }
    }

    /// Stable name for `id`, assigning one on first sight.
    pub fn object_name(&mut self, id: ObjectId, object: &Object) -> Identifier {
        if let Some(name) = self.names.get(&id) {
            return name.clone();
        }

        let base = escape(&object.name);
        let name = match object.kind {
            // Attribute namespace or names owned by collaborators; never renamed.
            ObjectKind::Field
            | ObjectKind::PkgName
            | ObjectKind::Builtin
            | ObjectKind::Nil
            | ObjectKind::Label => base,
            // Avoid every live level: a temporary of the function being
            // lowered would otherwise shadow the global.
            _ if object.package_level => {
                let name = self.fresh(&base, self.levels.len());
                self.levels[0].taken.insert(name.clone());
                name
            }
            _ => {
                let name = self.fresh(&base, self.levels.len());
                let level = self.levels.len() - 1;
                self.levels[level].taken.insert(name.clone());
                self.homes.insert(id, level);
                name
            }
        };

        self.names.insert(id, name.clone());
        name
    }

    /// Attribute name for a field or method. Members live in their class
    /// namespace, so they are never renamed and never block other names.
    pub fn member_name(&mut self, id: ObjectId, object: &Object) -> Identifier {
        self.names
            .entry(id)
            .or_insert_with(|| escape(&object.name))
            .clone()
    }

    /// Name previously assigned to `id`, if any.
    pub fn lookup(&self, id: ObjectId) -> Option<&Identifier> {
        self.names.get(&id)
    }

    /// Level index a local object was named in; `None` for package-level
    /// objects, fields and objects not yet named.
    pub fn home(&self, id: ObjectId) -> Option<usize> {
        self.homes.get(&id).copied()
    }

    /// Mark `name` as taken in the current level without binding an object.
    pub fn reserve(&mut self, name: &str) {
        let level = self.levels.len() - 1;
        self.levels[level].taken.insert(name.to_string());
    }

    /// Fresh synthetic name in the current level.
    pub fn temp(&mut self, base: &str) -> Identifier {
        let name = self.fresh(&escape(base), self.levels.len());
        let level = self.levels.len() - 1;
        self.levels[level].taken.insert(name.clone());
        name
    }

    /// `base`, or `base1`, `base2`, ... whichever is free in the first
    /// `visible` levels.
    fn fresh(&self, base: &str, visible: usize) -> Identifier {
        let taken = |name: &str| self.levels[..visible].iter().any(|l| l.taken.contains(name));
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
