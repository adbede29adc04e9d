//! Declaration extraction: one descriptor per instrumentable declaration.

use std::collections::HashSet;

use tracing::debug;
use tw_core::ast::{Decl, Field, FuncDecl, Ident, SourceFile, TypeDecl, ValueDecl, BLANK};
use tw_core::span::Pos;

use crate::consts::{
    ARG_PLACEHOLDER, BLANK_SUFFIX, INIT_FUNC, RECV_PLACEHOLDER, RES_PLACEHOLDER, TRAP_MARKER_PREFIX,
};
use crate::descriptor::{DeclShape, Descriptor, Origin, Receiver};
use crate::error::{Result, WeaveError};
use crate::receiver::unwrap_receiver;

/// Walk every file in order and produce the raw descriptor sequence.
///
/// Missing or blank receiver, parameter and result names are backfilled in the
/// tree itself so that every registered slot is nameable. Variables and
/// constants are extracted only when `var_trap` is set, except for a trap
/// marker constant and the variable declared right after it.
pub fn extract(files: &mut [SourceFile], var_trap: bool) -> Result<Vec<Descriptor>> {
    let mut descriptors = Vec::new();
    for (file_index, file) in files.iter_mut().enumerate() {
        let file_name = file.name.clone();
        let origin = |pos: Pos| Origin {
            file_index,
            file_name: file_name.clone(),
            line: pos.line,
            col: pos.col,
        };

        let paired = if var_trap {
            HashSet::new()
        } else {
            trap_pair_positions(&file.decls)
        };

        for (decl_index, decl) in file.decls.iter_mut().enumerate() {
            match decl {
                Decl::Func(func) => {
                    if let Some(descriptor) = extract_func(func, origin(func.pos))? {
                        descriptors.push(descriptor);
                    }
                }
                Decl::Var(value) => {
                    if var_trap {
                        extract_vars(value, value.names.len(), &origin, &mut descriptors);
                    } else if paired.contains(&decl_index) {
                        extract_vars(value, 1, &origin, &mut descriptors);
                    }
                }
                Decl::Const(value) => {
                    let names: &[Ident] = if var_trap {
                        &value.names
                    } else if paired.contains(&decl_index) {
                        // only the marker itself
                        value.names.last().map(std::slice::from_ref).unwrap_or_default()
                    } else {
                        &[]
                    };
                    for name in names {
                        descriptors.push(Descriptor::new(
                            name.name.clone(),
                            DeclShape::Constant,
                            origin(value.pos),
                        ));
                    }
                }
                Decl::Type(ty) => {
                    if let Some(marker) = extract_interface_marker(ty, origin(ty.pos)) {
                        descriptors.push(marker);
                    }
                }
            }
        }
    }
    Ok(descriptors)
}

fn extract_func(func: &mut FuncDecl, origin: Origin) -> Result<Option<Descriptor>> {
    if func.name.name == INIT_FUNC {
        return Ok(None);
    }
    fill_missing_names(func);

    let shape = match &func.recv {
        Some(recv) => {
            let receiver = unwrap_receiver(&recv.ty).ok_or_else(|| WeaveError::UnsupportedReceiver {
                func: func.name.name.clone(),
                ty: format!("{:?}", recv.ty),
            })?;
            if receiver.generic {
                debug!(
                    method = %func.name,
                    receiver = %receiver.name,
                    "generic receiver: registering metadata only"
                );
            }
            DeclShape::Method {
                receiver: Receiver {
                    type_name: receiver.name,
                    pointer: receiver.pointer,
                    name: recv.name_str().to_string(),
                },
                generic: receiver.generic || func.is_generic(),
            }
        }
        None if func.is_generic() => DeclShape::GenericFunction,
        None => DeclShape::Function,
    };

    let mut descriptor = Descriptor::new(func.name.name.clone(), shape, origin);
    descriptor.params = field_names(&func.params);
    descriptor.results = field_names(&func.results);
    Ok(Some(descriptor))
}

/// Each name yields a value descriptor immediately followed by its address
/// companion. Only the first `limit` names are taken.
fn extract_vars(
    value: &ValueDecl,
    limit: usize,
    origin: &impl Fn(Pos) -> Origin,
    out: &mut Vec<Descriptor>,
) {
    for name in value.names.iter().take(limit) {
        let descriptor = Descriptor::new(name.name.clone(), DeclShape::PlainVariable, origin(value.pos));
        let address = descriptor.address_of();
        out.push(descriptor);
        out.push(address);
    }
}

fn extract_interface_marker(ty: &TypeDecl, origin: Origin) -> Option<Descriptor> {
    if ty.alias || !ty.type_params.is_empty() || !ty.ty.is_interface() {
        return None;
    }
    Some(Descriptor::new(
        "",
        DeclShape::InterfaceMarker {
            type_name: ty.name.name.clone(),
        },
        origin,
    ))
}

/// Indices of a marker constant and the variable declaration that immediately
/// follows it when the variable's first name matches the marker's suffix.
fn trap_pair_positions(decls: &[Decl]) -> HashSet<usize> {
    let mut positions = HashSet::new();
    for (index, window) in decls.windows(2).enumerate() {
        let (Decl::Const(marker), Decl::Var(var)) = (&window[0], &window[1]) else {
            continue;
        };
        let (Some(marker_name), Some(var_name)) = (last_name(marker), var.first_name()) else {
            continue;
        };
        if is_trap_marker_for(marker_name, var_name) {
            positions.insert(index);
            positions.insert(index + 1);
        }
    }
    positions
}

fn last_name(value: &ValueDecl) -> Option<&str> {
    value.names.last().map(Ident::as_str)
}

/// `__xgo_trap_x` marks a variable named `x`, compared case-insensitively.
pub fn is_trap_marker_for(marker_name: &str, var_name: &str) -> bool {
    marker_name
        .strip_prefix(TRAP_MARKER_PREFIX)
        .is_some_and(|suffix| suffix.eq_ignore_ascii_case(var_name))
}

fn field_names(fields: &[Field]) -> Vec<String> {
    fields.iter().map(|field| field.name_str().to_string()).collect()
}

/// Give every receiver, parameter and result slot a usable name. Placeholders
/// never collide with names already present in the signature.
pub fn fill_missing_names(func: &mut FuncDecl) {
    let mut taken: HashSet<String> = func
        .recv
        .iter()
        .chain(func.params.iter())
        .chain(func.results.iter())
        .filter_map(|field| field.name.as_ref())
        .map(|name| name.name.clone())
        .chain(func.type_params.iter().map(|param| param.name.clone()))
        .collect();

    if let Some(recv) = func.recv.as_mut() {
        fill_name(recv, RECV_PLACEHOLDER.to_string(), &mut taken);
    }
    for (index, param) in func.params.iter_mut().enumerate() {
        fill_name(param, format!("{ARG_PLACEHOLDER}_{index}"), &mut taken);
    }
    for (index, result) in func.results.iter_mut().enumerate() {
        fill_name(result, format!("{RES_PLACEHOLDER}_{index}"), &mut taken);
    }
}

fn fill_name(field: &mut Field, placeholder: String, taken: &mut HashSet<String>) {
    let candidate = match &field.name {
        None => placeholder,
        Some(name) if name.name == BLANK => format!("{placeholder}{BLANK_SUFFIX}"),
        Some(_) => return,
    };
    let mut unique = candidate;
    while taken.contains(&unique) {
        unique.push('_');
    }
    taken.insert(unique.clone());
    let pos = field.name.as_ref().map(|name| name.pos).unwrap_or_default();
    field.name = Some(Ident::at(unique, pos));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::ast::TypeExpr;

    fn file(decls: Vec<Decl>) -> SourceFile {
        SourceFile::new("a.go", "demo").with_decls(decls)
    }

    #[test]
    fn placeholders_fill_missing_and_blank_names() {
        let mut func = FuncDecl::new("F")
            .with_recv(Field::unnamed(TypeExpr::name("T")))
            .with_params(vec![
                Field::unnamed(TypeExpr::name("int")),
                Field::named("_", TypeExpr::name("string")),
                Field::named("n", TypeExpr::name("int")),
            ])
            .with_results(vec![Field::unnamed(TypeExpr::name("error"))]);
        fill_missing_names(&mut func);

        assert_eq!(func.recv.as_ref().map(Field::name_str), Some("__xgo_recv_auto_filled"));
        let params: Vec<&str> = func.params.iter().map(Field::name_str).collect();
        assert_eq!(
            params,
            vec!["__xgo_arg_auto_filled_0", "__xgo_arg_auto_filled_1_blank", "n"]
        );
        assert_eq!(func.results[0].name_str(), "__xgo_res_auto_filled_0");
    }

    #[test]
    fn placeholders_are_deduplicated() {
        let mut func = FuncDecl::new("F").with_params(vec![
            Field::unnamed(TypeExpr::name("int")),
            Field::named("__xgo_arg_auto_filled_0", TypeExpr::name("int")),
        ]);
        fill_missing_names(&mut func);
        assert_eq!(func.params[0].name_str(), "__xgo_arg_auto_filled_0_");
        assert_eq!(func.params[1].name_str(), "__xgo_arg_auto_filled_0");
    }

    #[test]
    fn init_is_never_extracted() {
        let mut files = vec![file(vec![
            Decl::Func(FuncDecl::new("init")),
            Decl::Func(FuncDecl::new("init").with_recv(Field::named("t", TypeExpr::name("T")))),
            Decl::Func(FuncDecl::new("run")),
        ])];
        let descriptors = extract(&mut files, true).expect("extract");
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["run"]);
    }

    #[test]
    fn variables_yield_value_and_address_pairs() {
        let mut files = vec![file(vec![Decl::Var(ValueDecl::new(["a", "b", "c"]).at(Pos::new(4, 5)))])];
        let descriptors = extract(&mut files, true).expect("extract");
        assert_eq!(descriptors.len(), 6);
        for pair in descriptors.chunks(2) {
            assert_eq!(pair[0].shape, DeclShape::PlainVariable);
            assert_eq!(pair[1].shape, DeclShape::AddressOfVariable);
            assert_eq!(pair[0].name, pair[1].name);
            assert_eq!(pair[0].origin, pair[1].origin);
            assert_eq!(pair[0].origin.line, 4);
        }
    }

    #[test]
    fn values_are_ignored_without_var_trap() {
        let mut files = vec![file(vec![
            Decl::Var(ValueDecl::new(["a"])),
            Decl::Const(ValueDecl::new(["B"])),
        ])];
        assert!(extract(&mut files, false).expect("extract").is_empty());
    }

    #[test]
    fn trap_pair_is_extracted_without_var_trap() {
        let mut files = vec![file(vec![
            Decl::Var(ValueDecl::new(["other"])),
            Decl::Const(ValueDecl::new(["__xgo_trap_counter"])),
            Decl::Var(ValueDecl::new(["Counter", "extra"])),
        ])];
        let descriptors = extract(&mut files, false).expect("extract");
        let shapes: Vec<(&str, i64)> = descriptors
            .iter()
            .map(|d| (d.name.as_str(), d.kind().tag()))
            .collect();
        assert_eq!(
            shapes,
            vec![("__xgo_trap_counter", 3), ("Counter", 1), ("Counter", 2)]
        );
    }

    #[test]
    fn interface_markers_skip_aliases_and_generics() {
        let mut alias = TypeDecl::new("Alias", TypeExpr::Interface);
        alias.alias = true;
        let mut generic = TypeDecl::new("Gen", TypeExpr::Interface);
        generic.type_params = vec![Ident::new("T")];
        let mut files = vec![file(vec![
            Decl::Type(TypeDecl::new("Reader", TypeExpr::Interface).at(Pos::new(7, 6))),
            Decl::Type(alias),
            Decl::Type(generic),
            Decl::Type(TypeDecl::new("S", TypeExpr::Struct)),
        ])];
        let descriptors = extract(&mut files, false).expect("extract");
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].is_interface());
        assert_eq!(descriptors[0].receiver_type_name(), "Reader");
        assert_eq!(descriptors[0].name, "");
        assert_eq!(descriptors[0].origin.line, 7);
    }

    #[test]
    fn unsupported_receiver_is_an_error() {
        let recv = Field::named("r", TypeExpr::pointer(TypeExpr::pointer(TypeExpr::name("T"))));
        let mut files = vec![file(vec![Decl::Func(FuncDecl::new("M").with_recv(recv))])];
        let err = extract(&mut files, false).expect_err("double pointer receiver");
        assert!(matches!(err, WeaveError::UnsupportedReceiver { .. }));
    }
}
