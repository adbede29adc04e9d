//! Structured form of a synthesized compilation unit.
//!
//! Units are assembled programmatically and rendered to text exactly once by
//! a language emitter, which owns all quoting and escaping.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Ident(String),
    /// `&name`
    AddrOf(String),
    /// A string slice literal; empty renders as `nil`.
    StrList(Vec<String>),
    /// Positional composite literal `Ty{a, b, ...}`.
    Composite { ty: String, fields: Vec<Value> },
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Value::Ident(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Stmt {
    /// `name := value`
    Define { name: String, value: Value },
    Call { callee: String, args: Vec<Value> },
}

impl Stmt {
    pub fn is_call_to(&self, name: &str) -> bool {
        matches!(self, Stmt::Call { callee, .. } if callee == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructField {
    pub name: String,
    pub ty: String,
}

impl StructField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UnitItem {
    Comment(String),
    Const {
        name: String,
        value: Value,
    },
    Struct {
        name: String,
        fields: Vec<StructField>,
    },
    Func {
        name: String,
        params: Vec<StructField>,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticUnit {
    /// File name the unit is appended under.
    pub name: String,
    pub package: String,
    pub items: Vec<UnitItem>,
}

impl SyntheticUnit {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: UnitItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn func_bodies(&self, func_name: &str) -> impl Iterator<Item = &[Stmt]> {
        let func_name = func_name.to_string();
        self.items.iter().filter_map(move |item| match item {
            UnitItem::Func { name, body, .. } if *name == func_name => Some(body.as_slice()),
            _ => None,
        })
    }

    /// Number of calls to `callee` across every function of the unit.
    pub fn count_calls(&self, callee: &str) -> usize {
        self.items
            .iter()
            .filter_map(|item| match item {
                UnitItem::Func { body, .. } => Some(body),
                _ => None,
            })
            .flatten()
            .filter(|stmt| stmt.is_call_to(callee))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_calls_across_functions() {
        let mut unit = SyntheticUnit::new("reg.go", "demo");
        let call = Stmt::Call {
            callee: "reg".to_string(),
            args: vec![Value::Nil],
        };
        unit.push(UnitItem::Func {
            name: "init".to_string(),
            params: Vec::new(),
            body: vec![
                Stmt::Define {
                    name: "f".to_string(),
                    value: Value::str("a.go"),
                },
                call.clone(),
                call.clone(),
            ],
        });
        unit.push(UnitItem::Func {
            name: "init".to_string(),
            params: Vec::new(),
            body: vec![call],
        });
        assert_eq!(unit.count_calls("reg"), 3);
        assert_eq!(unit.func_bodies("init").count(), 2);
    }
}
