//! Resolved Go types and objects.

/// Identity of a resolved object (variable, constant, type name, function, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Invalid,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    pub fn is_boolean(self) -> bool {
        matches!(self, BasicKind::Bool | BasicKind::UntypedBool)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            BasicKind::Float32 | BasicKind::Float64 | BasicKind::UntypedFloat
        )
    }

    pub fn is_complex(self) -> bool {
        matches!(
            self,
            BasicKind::Complex64 | BasicKind::Complex128 | BasicKind::UntypedComplex
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }

    /// Name of the predeclared Go type.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Invalid => "invalid type",
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "unsafe.Pointer",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedComplex => "untyped complex",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Basic(BasicKind),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: u64, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan(Box<Type>),
    Signature(Signature),
    Interface,
    Struct(StructType),
    Named(Named),
    Tuple(Vec<Type>),
}

impl Type {
    /// Category name used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Type::Basic(kind) => kind.name().to_string(),
            Type::Pointer(_) => "pointer".into(),
            Type::Slice(_) => "slice".into(),
            Type::Array { .. } => "array".into(),
            Type::Map { .. } => "map".into(),
            Type::Chan(_) => "chan".into(),
            Type::Signature(_) => "signature".into(),
            Type::Interface => "interface".into(),
            Type::Struct(_) => "struct".into(),
            Type::Named(named) => format!("named type {}", named.name),
            Type::Tuple(_) => "tuple".into(),
        }
    }

    /// Structural category after looking through a named type.
    pub fn underlying(&self) -> Underlying {
        match self {
            Type::Basic(kind) => Underlying::Basic(*kind),
            Type::Pointer(_) => Underlying::Pointer,
            Type::Slice(_) => Underlying::Slice,
            Type::Array { .. } => Underlying::Array,
            Type::Map { .. } => Underlying::Map,
            Type::Chan(_) => Underlying::Chan,
            Type::Signature(_) => Underlying::Signature,
            Type::Interface => Underlying::Interface,
            Type::Struct(_) => Underlying::Struct,
            Type::Named(named) => named.underlying,
            Type::Tuple(_) => Underlying::Tuple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructType {
    pub fields: Vec<FieldVar>,
}

/// A struct field: its object identity, declared name and type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldVar {
    pub obj: ObjectId,
    pub name: String,
    pub ty: Type,
}

/// Reference to a declared type.
///
/// Only the category of the underlying type is carried, which keeps
/// recursive types (`type List struct { next *List }`) finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Named {
    pub obj: ObjectId,
    pub name: String,
    pub underlying: Underlying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underlying {
    Basic(BasicKind),
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Signature,
    Interface,
    Struct,
    Tuple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Var,
    Field,
    Const,
    TypeName,
    Func,
    PkgName,
    Builtin,
    Nil,
    Label,
}

/// Compile-time value of a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub ty: Option<Type>,
    /// Declared at package scope (or the universe scope).
    pub package_level: bool,
    pub constant: Option<Constant>,
}

impl Object {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: None,
            package_level: false,
            constant: None,
        }
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn package_level(mut self) -> Self {
        self.package_level = true;
        self
    }

    pub fn with_constant(mut self, value: Constant) -> Self {
        self.constant = Some(value);
        self
    }
}
