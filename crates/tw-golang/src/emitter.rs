//! Go source emitter for synthesized units.

use itertools::Itertools;
use tw_core::unit::{Stmt, StructField, SyntheticUnit, UnitItem, Value};

/// Renders a [`SyntheticUnit`] as gofmt-style Go source.
pub struct GoEmitter {
    code: String,
    indent: usize,
}

impl GoEmitter {
    pub fn new() -> Self {
        Self {
            code: String::new(),
            indent: 0,
        }
    }

    pub fn render(unit: &SyntheticUnit) -> String {
        let mut emitter = GoEmitter::new();
        emitter.emit_unit(unit);
        emitter.finish()
    }

    fn finish(mut self) -> String {
        let trimmed = self.code.trim_end().len();
        self.code.truncate(trimmed);
        self.code.push('\n');
        self.code
    }

    fn emit_unit(&mut self, unit: &SyntheticUnit) {
        self.push_line(&format!("package {}", unit.package));
        for item in &unit.items {
            self.push_blank_line();
            self.emit_item(item);
        }
    }

    fn emit_item(&mut self, item: &UnitItem) {
        match item {
            UnitItem::Comment(text) => {
                for line in text.lines() {
                    self.push_line(&format!("// {}", line));
                }
            }
            UnitItem::Const { name, value } => {
                self.push_line(&format!("const {} = {}", name, render_value(value)));
            }
            UnitItem::Struct { name, fields } => self.emit_struct(name, fields),
            UnitItem::Func { name, params, body } => self.emit_func(name, params, body),
        }
    }

    fn emit_struct(&mut self, name: &str, fields: &[StructField]) {
        self.push_line(&format!("type {} struct {{", name));
        self.indent += 1;
        let width = fields.iter().map(|field| field.name.len()).max().unwrap_or(0);
        for field in fields {
            self.push_line(&format!("{:width$} {}", field.name, field.ty, width = width));
        }
        self.indent -= 1;
        self.push_line("}");
    }

    fn emit_func(&mut self, name: &str, params: &[StructField], body: &[Stmt]) {
        let params = params
            .iter()
            .map(|param| format!("{} {}", param.name, param.ty))
            .join(", ");
        self.push_line(&format!("func {}({}) {{", name, params));
        self.indent += 1;
        for stmt in body {
            let line = render_stmt(stmt);
            self.push_line(&line);
        }
        self.indent -= 1;
        self.push_line("}");
    }

    fn push_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.code.push('\t');
        }
        self.code.push_str(line);
        self.code.push('\n');
    }

    fn push_blank_line(&mut self) {
        if !self.code.ends_with("\n\n") {
            self.code.push('\n');
        }
    }
}

impl Default for GoEmitter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Define { name, value } => format!("{} := {}", name, render_value(value)),
        Stmt::Call { callee, args } => {
            format!("{}({})", callee, args.iter().map(render_value).join(","))
        }
    }
}

pub fn render_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Int(value) => value.to_string(),
        Value::Str(value) => quote(value),
        Value::Ident(name) => name.clone(),
        Value::AddrOf(name) => format!("&{}", name),
        Value::StrList(items) if items.is_empty() => "nil".to_string(),
        Value::StrList(items) => format!("[]string{{{}}}", items.iter().map(|item| quote(item)).join(",")),
        Value::Composite { ty, fields } => {
            format!("{}{{{}}}", ty, fields.iter().map(render_value).join(","))
        }
    }
}

/// Go interpreted string literal for `value`, escaping like `strconv.Quote`.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            ch if (ch as u32) < 0x20 || ch == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}
