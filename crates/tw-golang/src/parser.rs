//! Go parser built on top of `tree-sitter-go`.
//!
//! This parser maps Go top-level declarations into the trapweave declaration
//! model. Function bodies and imports are skipped; only the shapes the weaver
//! instruments are kept.

use eyre::{eyre, Result};
use tracing::warn;
use tree_sitter::{Node as TsNode, Parser as TsParser};
use tw_core::ast::{
    Decl, Expr, ExprKind, Field, FuncDecl, Ident, SourceFile, TypeDecl, TypeExpr, ValueDecl,
};
use tw_core::diagnostics::Diagnostic;
use tw_core::span::{Pos, Span};

/// High-level parser that owns a tree-sitter instance for Go.
pub struct GoParser {
    parser: TsParser,
}

/// A parsed file together with the non-fatal findings collected on the way.
#[derive(Debug, Clone)]
pub struct ParsedGo {
    pub file: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

impl GoParser {
    /// Create a new parser instance with the Go grammar loaded.
    pub fn new() -> Result<Self> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|err| eyre!("Failed to load tree-sitter Go grammar: {err}"))?;
        Ok(Self { parser })
    }

    /// Parse Go source into the declaration model. `name` is recorded as the
    /// file name of the result.
    pub fn parse_str(&mut self, source: &str, name: &str) -> Result<ParsedGo> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| eyre!("failed to parse Go source {name}"))?;

        let mut ctx = ParseCtx {
            source,
            file: name,
            diagnostics: Vec::new(),
        };
        let root = tree.root_node();
        if root.has_error() {
            ctx.diagnostics.push(
                Diagnostic::warning("source contains syntax errors; declarations may be incomplete")
                    .with_location(name, pos_of(root)),
            );
        }
        let file = parse_file(&mut ctx, root)?;
        Ok(ParsedGo {
            file,
            diagnostics: ctx.diagnostics,
        })
    }
}

struct ParseCtx<'a> {
    source: &'a str,
    file: &'a str,
    diagnostics: Vec<Diagnostic>,
}

impl ParseCtx<'_> {
    fn text(&self, node: TsNode) -> Result<String> {
        Ok(node.utf8_text(self.source.as_bytes())?.to_string())
    }

    fn unsupported(&mut self, what: &str, node: TsNode) {
        warn!("unsupported go {what}: {:?}", node.kind());
        self.diagnostics.push(
            Diagnostic::warning(format!("unsupported {what} `{}`", node.kind()))
                .with_location(self.file, pos_of(node)),
        );
    }
}

fn pos_of(node: TsNode) -> Pos {
    let start = node.start_position();
    Pos::new(start.row as u32 + 1, start.column as u32 + 1)
}

fn span_of(node: TsNode) -> Span {
    Span::new(node.start_byte() as u32, node.end_byte() as u32)
}

fn parse_file(ctx: &mut ParseCtx<'_>, root: TsNode) -> Result<SourceFile> {
    let mut cursor = root.walk();
    let mut package = String::new();
    let mut decls = Vec::new();

    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                if let Some(name) = parse_package_clause(ctx, child)? {
                    package = name;
                }
            }
            "import_declaration" | "comment" => {}
            "type_declaration" => decls.extend(parse_type_declaration(ctx, child)?),
            "const_declaration" => decls.extend(parse_value_declaration(ctx, child, false)?),
            "var_declaration" => decls.extend(parse_value_declaration(ctx, child, true)?),
            "function_declaration" | "method_declaration" => {
                decls.push(Decl::Func(parse_function(ctx, child)?));
            }
            _ => ctx.unsupported("top-level node", child),
        }
    }

    Ok(SourceFile {
        name: ctx.file.to_string(),
        package,
        decls,
    })
}

fn parse_package_clause(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<Option<String>> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "package_identifier" || child.kind() == "identifier" {
            return Ok(Some(ctx.text(child)?));
        }
    }
    warn!("package clause missing name");
    Ok(None)
}

fn parse_type_declaration(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<Vec<Decl>> {
    let mut decls = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "type_spec" => decls.push(Decl::Type(parse_type_spec(ctx, child, false)?)),
            "type_alias" => decls.push(Decl::Type(parse_type_spec(ctx, child, true)?)),
            _ => {}
        }
    }
    Ok(decls)
}

fn parse_type_spec(ctx: &mut ParseCtx<'_>, node: TsNode, alias: bool) -> Result<TypeDecl> {
    let name_node = node
        .child_by_field_name("name")
        .ok_or_else(|| eyre!("type spec missing name"))?;
    let ty_node = node
        .child_by_field_name("type")
        .ok_or_else(|| eyre!("type spec missing type"))?;
    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|params| parse_type_parameters(ctx, params))
        .transpose()?
        .unwrap_or_default();

    Ok(TypeDecl {
        name: Ident::at(ctx.text(name_node)?, pos_of(name_node)),
        alias,
        type_params,
        ty: parse_type_node(ctx, ty_node)?,
        pos: pos_of(node),
    })
}

fn parse_value_declaration(ctx: &mut ParseCtx<'_>, node: TsNode, is_var: bool) -> Result<Vec<Decl>> {
    let mut decls = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "const_spec" | "var_spec" => {
                let spec = parse_value_spec(ctx, child)?;
                decls.push(if is_var { Decl::Var(spec) } else { Decl::Const(spec) });
            }
            // newer grammars wrap grouped specs in a list node
            "var_spec_list" | "const_spec_list" => {
                decls.extend(parse_value_declaration(ctx, child, is_var)?);
            }
            _ => {}
        }
    }
    Ok(decls)
}

fn parse_value_spec(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<ValueDecl> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for name_node in node.children_by_field_name("name", &mut cursor) {
        names.push(Ident::at(ctx.text(name_node)?, pos_of(name_node)));
    }

    let ty = node
        .child_by_field_name("type")
        .map(|ty| parse_type_node(ctx, ty))
        .transpose()?;
    let values = node
        .child_by_field_name("value")
        .map(|list| parse_expression_list(ctx, list))
        .transpose()?
        .unwrap_or_default();

    Ok(ValueDecl {
        names,
        ty,
        values,
        pos: pos_of(node),
    })
}

fn parse_function(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<FuncDecl> {
    let name_node = node
        .child_by_field_name("name")
        .ok_or_else(|| eyre!("function declaration missing name"))?;
    let name = Ident::at(ctx.text(name_node)?, pos_of(name_node));

    let recv = match node.child_by_field_name("receiver") {
        Some(list) => parse_parameter_list(ctx, list)?.into_iter().next(),
        None => None,
    };
    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|params| parse_type_parameters(ctx, params))
        .transpose()?
        .unwrap_or_default();
    let params = node
        .child_by_field_name("parameters")
        .map(|list| parse_parameter_list(ctx, list))
        .transpose()?
        .unwrap_or_default();
    let results = match node.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => parse_parameter_list(ctx, result)?,
        Some(result) => vec![Field::unnamed(parse_type_node(ctx, result)?)],
        None => Vec::new(),
    };

    Ok(FuncDecl {
        name,
        recv,
        type_params,
        params,
        results,
        pos: pos_of(node),
    })
}

fn parse_parameter_list(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "parameter_declaration" => fields.extend(parse_parameter_declaration(ctx, child, false)?),
            "variadic_parameter_declaration" => {
                fields.extend(parse_parameter_declaration(ctx, child, true)?)
            }
            _ => {}
        }
    }
    Ok(fields)
}

/// `a, b int` becomes two fields; `int` alone becomes one unnamed field.
fn parse_parameter_declaration(ctx: &mut ParseCtx<'_>, node: TsNode, variadic: bool) -> Result<Vec<Field>> {
    let ty_node = node
        .child_by_field_name("type")
        .ok_or_else(|| eyre!("parameter missing type"))?;
    let ty = parse_type_node(ctx, ty_node)?;

    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        .map(|name| Ok(Ident::at(ctx.text(name)?, pos_of(name))))
        .collect::<Result<Vec<_>>>()?;

    if names.is_empty() {
        return Ok(vec![Field {
            name: None,
            ty,
            variadic,
        }]);
    }
    Ok(names
        .into_iter()
        .map(|name| Field {
            name: Some(name),
            ty: ty.clone(),
            variadic,
        })
        .collect())
}

fn parse_type_parameters(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<Vec<Ident>> {
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for decl in node.named_children(&mut cursor) {
        if decl.kind() != "type_parameter_declaration" {
            continue;
        }
        let mut name_cursor = decl.walk();
        for name in decl.children_by_field_name("name", &mut name_cursor) {
            params.push(Ident::at(ctx.text(name)?, pos_of(name)));
        }
    }
    Ok(params)
}

fn parse_type_node(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<TypeExpr> {
    match node.kind() {
        "type_identifier" | "identifier" => Ok(TypeExpr::Name(ctx.text(node)?)),
        "qualified_type" => {
            let package = node
                .child_by_field_name("package")
                .ok_or_else(|| eyre!("qualified type missing package"))?;
            let name = node
                .child_by_field_name("name")
                .ok_or_else(|| eyre!("qualified type missing name"))?;
            Ok(TypeExpr::Qualified {
                package: ctx.text(package)?,
                name: ctx.text(name)?,
            })
        }
        "pointer_type" => {
            let inner = last_named_child(node).ok_or_else(|| eyre!("pointer type missing inner"))?;
            Ok(TypeExpr::pointer(parse_type_node(ctx, inner)?))
        }
        "generic_type" => {
            let base = node
                .child_by_field_name("type")
                .ok_or_else(|| eyre!("generic type missing base"))?;
            let base = parse_type_node(ctx, base)?;
            let mut args = Vec::new();
            if let Some(arg_list) = node.child_by_field_name("type_arguments") {
                let mut cursor = arg_list.walk();
                for arg in arg_list.named_children(&mut cursor) {
                    args.push(parse_type_node(ctx, arg)?);
                }
            }
            Ok(TypeExpr::index(base, args))
        }
        // `type_elem` wraps each type argument in recent grammars
        "parenthesized_type" | "type_elem" => match first_named_child(node) {
            Some(inner) => parse_type_node(ctx, inner),
            None => Ok(TypeExpr::Other(ctx.text(node)?)),
        },
        "interface_type" => Ok(TypeExpr::Interface),
        "struct_type" => Ok(TypeExpr::Struct),
        _ => Ok(TypeExpr::Other(ctx.text(node)?)),
    }
}

fn parse_expression_list(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<Vec<Expr>> {
    let mut exprs = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        exprs.push(parse_expr(ctx, child)?);
    }
    Ok(exprs)
}

fn parse_expr(ctx: &mut ParseCtx<'_>, node: TsNode) -> Result<Expr> {
    let raw = ctx.text(node)?;
    let kind = match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => ExprKind::Str(unquote(&raw)),
        "int_literal" => parse_int_literal(&raw)
            .map(ExprKind::Int)
            .unwrap_or(ExprKind::Raw(raw)),
        _ => ExprKind::Raw(raw),
    };
    Ok(Expr {
        kind,
        span: span_of(node),
    })
}

fn parse_int_literal(raw: &str) -> Option<i64> {
    let normalized = raw.replace('_', "");
    let lower = normalized.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok();
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok();
    }
    if lower.len() > 1 && lower.starts_with('0') {
        return i64::from_str_radix(&lower[1..], 8).ok();
    }
    lower.parse().ok()
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('`') && raw.ends_with('`') {
        return raw[1..raw.len() - 1].to_string();
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        return out;
    }
    raw.to_string()
}

fn first_named_child(node: TsNode) -> Option<TsNode> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

fn last_named_child(node: TsNode) -> Option<TsNode> {
    let mut cursor = node.walk();
    let last = node.named_children(&mut cursor).last();
    last
}
