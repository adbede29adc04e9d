//! Declaration-level view of a parsed module.
//!
//! Only the shapes the weaver needs are modelled: top-level functions and
//! methods with their signatures, variable and constant declarations with
//! their initializers, and type declarations. Function bodies are not kept.

use crate::span::{Pos, Span};
use serde::{Deserialize, Serialize};

/// The identifier Go reserves for "discard".
pub const BLANK: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default)]
    pub pos: Pos,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pos: Pos::default(),
        }
    }

    pub fn at(name: impl Into<String>, pos: Pos) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name == BLANK
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Closed set of type expressions the weaver distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    /// A generic instantiation such as `List[T]`.
    Index {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    Interface,
    Struct,
    Other(String),
}

impl TypeExpr {
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name(name.into())
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn index(base: TypeExpr, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Index {
            base: Box::new(base),
            args,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, TypeExpr::Interface)
    }
}

/// A single parameter, result or receiver slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    #[serde(default)]
    pub variadic: bool,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(Ident::new(name)),
            ty,
            variadic: false,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Self {
            name: None,
            ty,
            variadic: false,
        }
    }

    pub fn name_str(&self) -> &str {
        self.name.as_ref().map(Ident::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Ident,
    pub recv: Option<Field>,
    pub type_params: Vec<Ident>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub pos: Pos,
}

impl FuncDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Ident::new(name),
            recv: None,
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
            pos: Pos::default(),
        }
    }

    pub fn with_recv(mut self, recv: Field) -> Self {
        self.recv = Some(recv);
        self
    }

    pub fn with_params(mut self, params: Vec<Field>) -> Self {
        self.params = params;
        self
    }

    pub fn with_results(mut self, results: Vec<Field>) -> Self {
        self.results = results;
        self
    }

    pub fn with_type_params(mut self, params: Vec<Ident>) -> Self {
        self.type_params = params;
        self
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    Str(String),
    Int(i64),
    /// Any initializer the weaver does not interpret, kept as source text.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::null(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Int(value))
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(ExprKind::Raw(text.into()))
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// A `var` or `const` spec: `var a, b int = 1, 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDecl {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub pos: Pos,
}

impl ValueDecl {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Ident::new).collect(),
            ty: None,
            values: Vec::new(),
            pos: Pos::default(),
        }
    }

    pub fn with_values(mut self, values: Vec<Expr>) -> Self {
        self.values = values;
        self
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }

    pub fn first_name(&self) -> Option<&str> {
        self.names.first().map(Ident::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: Ident,
    pub alias: bool,
    pub type_params: Vec<Ident>,
    pub ty: TypeExpr,
    pub pos: Pos,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Ident::new(name),
            alias: false,
            type_params: Vec::new(),
            ty,
            pos: Pos::default(),
        }
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    Var(ValueDecl),
    Const(ValueDecl),
    Type(TypeDecl),
}

impl Decl {
    pub fn pos(&self) -> Pos {
        match self {
            Decl::Func(decl) => decl.pos,
            Decl::Var(decl) | Decl::Const(decl) => decl.pos,
            Decl::Type(decl) => decl.pos,
        }
    }
}

/// One parsed file of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name relative to the module directory.
    pub name: String,
    pub package: String,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            decls: Vec::new(),
        }
    }

    pub fn with_decls(mut self, decls: Vec<Decl>) -> Self {
        self.decls = decls;
        self
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }

    pub fn consts(&self) -> impl Iterator<Item = &ValueDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Const(value) => Some(value),
            _ => None,
        })
    }
}
