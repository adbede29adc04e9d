//! Normalized record of one instrumentable declaration.

use serde::Serialize;
use tw_core::ast::BLANK;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receiver {
    pub type_name: String,
    pub pointer: bool,
    pub name: String,
}

/// Declaration shape, decided once at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DeclShape {
    Function,
    GenericFunction,
    /// `generic` is set when the receiver type is a generic instantiation.
    Method { receiver: Receiver, generic: bool },
    Closure,
    PlainVariable,
    /// Synthesized companion of a [`DeclShape::PlainVariable`] registering its address.
    AddressOfVariable,
    Constant,
    /// Records that `type_name` is an interface; never a call target.
    InterfaceMarker { type_name: String },
}

/// Numeric kind tag of the registration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i64)]
pub enum DeclKind {
    Func = 0,
    Var = 1,
    VarPtr = 2,
    Const = 3,
}

impl DeclKind {
    pub fn is_func(self) -> bool {
        self == DeclKind::Func
    }

    pub fn tag(self) -> i64 {
        self as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub file_index: usize,
    pub file_name: String,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Empty only for interface markers.
    pub name: String,
    #[serde(flatten)]
    pub shape: DeclShape,
    pub params: Vec<String>,
    pub results: Vec<String>,
    pub follows_trap_marker: bool,
    pub origin: Origin,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, shape: DeclShape, origin: Origin) -> Self {
        Self {
            name: name.into(),
            shape,
            params: Vec::new(),
            results: Vec::new(),
            follows_trap_marker: false,
            origin,
        }
    }

    pub fn kind(&self) -> DeclKind {
        match self.shape {
            DeclShape::PlainVariable => DeclKind::Var,
            DeclShape::AddressOfVariable => DeclKind::VarPtr,
            DeclShape::Constant => DeclKind::Const,
            _ => DeclKind::Func,
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(
            self.shape,
            DeclShape::GenericFunction | DeclShape::Method { generic: true, .. }
        )
    }

    pub fn is_closure(&self) -> bool {
        matches!(self.shape, DeclShape::Closure)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.shape, DeclShape::InterfaceMarker { .. })
    }

    pub fn is_blank(&self) -> bool {
        self.name == BLANK
    }

    pub fn receiver(&self) -> Option<&Receiver> {
        match &self.shape {
            DeclShape::Method { receiver, .. } => Some(receiver),
            _ => None,
        }
    }

    pub fn receiver_type_name(&self) -> &str {
        match &self.shape {
            DeclShape::Method { receiver, .. } => &receiver.type_name,
            DeclShape::InterfaceMarker { type_name } => type_name,
            _ => "",
        }
    }

    pub fn receiver_is_pointer(&self) -> bool {
        self.receiver().is_some_and(|receiver| receiver.pointer)
    }

    pub fn receiver_name(&self) -> &str {
        self.receiver().map(|receiver| receiver.name.as_str()).unwrap_or("")
    }

    /// Expression referencing the declaration from generated code; `None` for
    /// interface markers.
    pub fn ref_name(&self) -> Option<String> {
        if self.is_interface() {
            return None;
        }
        if !self.kind().is_func() {
            return Some(self.name.clone());
        }
        Some(format_func_ref_name(
            self.receiver_type_name(),
            self.receiver_is_pointer(),
            &self.name,
        ))
    }

    pub fn identity_name(&self) -> String {
        match &self.shape {
            DeclShape::InterfaceMarker { type_name } => type_name.clone(),
            DeclShape::AddressOfVariable => format!("*{}", self.name),
            DeclShape::PlainVariable | DeclShape::Constant => self.name.clone(),
            _ => format_func_ref_name(
                self.receiver_type_name(),
                self.receiver_is_pointer(),
                &self.name,
            ),
        }
    }

    /// Companion descriptor registering the variable's address.
    pub fn address_of(&self) -> Descriptor {
        Descriptor {
            shape: DeclShape::AddressOfVariable,
            ..self.clone()
        }
    }
}

/// `name`, `T.name` or `(*T).name`.
pub fn format_func_ref_name(recv_type_name: &str, recv_ptr: bool, name: &str) -> String {
    if recv_type_name.is_empty() {
        return name.to_string();
    }
    if recv_ptr {
        return format!("(*{}).{}", recv_type_name, name);
    }
    format!("{}.{}", recv_type_name, name)
}
