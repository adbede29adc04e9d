//! Registration code synthesis.
//!
//! Every surviving descriptor becomes one call to the registration entry
//! point carrying a positional record (see [`crate::helper::RECORD_FIELDS`]).
//! Calls are chunked into batches; each batch is its own unit with a single
//! module initializer that declares the file-reference locals it uses.

use std::collections::HashSet;

use tracing::debug;
use tw_core::unit::{Stmt, SyntheticUnit, UnitItem, Value};

use crate::batch::{batch_unit_name, split_batches};
use crate::consts::{BATCH_UNIT_BASE, FILE_REF_PREFIX, INIT_FUNC, LOCAL_FUNC_STUB, LOCAL_PKG_NAME, REGISTER_FUNC};
use crate::descriptor::{DeclKind, DeclShape, Descriptor};
use crate::error::Result;

pub fn file_ref(file_index: usize) -> String {
    format!("{FILE_REF_PREFIX}{file_index}")
}

/// Whether a descriptor produces a registration call at all.
pub fn is_registered(descriptor: &Descriptor) -> bool {
    !descriptor.is_blank() && !descriptor.is_interface()
}

/// The positional record passed to the registration entry point.
pub fn registration_record(descriptor: &Descriptor) -> Value {
    let kind = descriptor.kind();
    let func_ref = match descriptor.ref_name() {
        Some(name) if kind.is_func() && !descriptor.is_generic() => Value::Ident(name),
        _ => Value::Nil,
    };
    let var_ref = match (&descriptor.shape, descriptor.ref_name()) {
        (DeclShape::PlainVariable | DeclShape::AddressOfVariable, Some(name)) => Value::AddrOf(name),
        (DeclShape::Constant, Some(name)) => Value::Ident(name),
        _ => Value::Nil,
    };

    Value::Composite {
        ty: LOCAL_FUNC_STUB.to_string(),
        fields: vec![
            Value::ident(LOCAL_PKG_NAME),
            Value::Int(kind.tag()),
            func_ref,
            var_ref,
            Value::Int(0),
            Value::Bool(descriptor.is_interface()),
            Value::Bool(descriptor.is_generic()),
            Value::Bool(descriptor.is_closure()),
            Value::str(descriptor.receiver_type_name()),
            Value::Bool(descriptor.receiver_is_pointer()),
            Value::str(&descriptor.name),
            Value::str(descriptor.identity_name()),
            Value::str(descriptor.receiver_name()),
            Value::StrList(descriptor.params.clone()),
            Value::StrList(descriptor.results.clone()),
            // first-arg-context and last-result-error are resolved by the runtime
            Value::Bool(false),
            Value::Bool(false),
            Value::ident(file_ref(descriptor.origin.file_index)),
            Value::Int(i64::from(descriptor.origin.line)),
        ],
    }
}

/// Initializer body for one batch: file-reference locals first, then one call
/// per registered descriptor.
pub fn batch_body(batch: &[Descriptor]) -> Vec<Stmt> {
    let mut declared = HashSet::new();
    let mut file_defs = Vec::new();
    let mut calls = Vec::with_capacity(batch.len());
    for descriptor in batch.iter().filter(|descriptor| is_registered(descriptor)) {
        let origin = &descriptor.origin;
        if declared.insert(origin.file_index) {
            file_defs.push(Stmt::Define {
                name: file_ref(origin.file_index),
                value: Value::str(&origin.file_name),
            });
        }
        calls.push(Stmt::Call {
            callee: REGISTER_FUNC.to_string(),
            args: vec![registration_record(descriptor)],
        });
    }
    if calls.is_empty() {
        return Vec::new();
    }
    file_defs.extend(calls);
    file_defs
}

/// Split the registered descriptors into batches of at most `batch_size` and
/// build one unit per batch. Blank names and interface markers take no slot.
pub fn synthesize(package: &str, descriptors: &[Descriptor], batch_size: usize) -> Result<Vec<SyntheticUnit>> {
    let registered: Vec<Descriptor> = descriptors
        .iter()
        .filter(|descriptor| is_registered(descriptor))
        .cloned()
        .collect();
    let skipped = descriptors.len() - registered.len();
    if skipped > 0 {
        debug!(skipped, "descriptors without a registration call");
    }

    let batches = split_batches(&registered, batch_size)?;
    let count = batches.len();
    let units = batches
        .into_iter()
        .enumerate()
        .map(|(index, batch)| {
            let mut unit = SyntheticUnit::new(batch_unit_name(BATCH_UNIT_BASE, index, count), package);
            unit.push(UnitItem::Func {
                name: INIT_FUNC.to_string(),
                params: Vec::new(),
                body: batch_body(batch),
            });
            unit
        })
        .collect();
    Ok(units)
}

/// Registration calls per descriptor kind, for logging.
pub fn count_by_kind(descriptors: &[Descriptor]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for descriptor in descriptors.iter().filter(|descriptor| is_registered(descriptor)) {
        let slot = match descriptor.kind() {
            DeclKind::Func => 0,
            DeclKind::Var => 1,
            DeclKind::VarPtr => 2,
            DeclKind::Const => 3,
        };
        counts[slot] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Origin, Receiver};
    use crate::helper::RECORD_FIELDS;
    use pretty_assertions::assert_eq;
    use tw_golang::emitter::render_stmt;
    use tw_golang::GoEmitter;

    fn origin(file_index: usize, line: u32) -> Origin {
        Origin {
            file_index,
            file_name: format!("f{file_index}.go"),
            line,
            col: 1,
        }
    }

    fn func(name: &str, file_index: usize) -> Descriptor {
        Descriptor::new(name, DeclShape::Function, origin(file_index, 1))
    }

    fn fields(record: &Value) -> &[Value] {
        match record {
            Value::Composite { fields, .. } => fields,
            other => panic!("not a record: {other:?}"),
        }
    }

    #[test]
    fn record_has_one_value_per_stub_field() {
        let record = registration_record(&func("Run", 0));
        assert_eq!(fields(&record).len(), RECORD_FIELDS.len());
    }

    #[test]
    fn method_record_renders_positionally() {
        let mut method = Descriptor::new(
            "Close",
            DeclShape::Method {
                receiver: Receiver {
                    type_name: "File".to_string(),
                    pointer: true,
                    name: "f".to_string(),
                },
                generic: false,
            },
            origin(2, 17),
        );
        method.params = vec!["force".to_string()];
        method.results = vec!["err".to_string()];
        let stmt = Stmt::Call {
            callee: REGISTER_FUNC.to_string(),
            args: vec![registration_record(&method)],
        };
        assert_eq!(
            render_stmt(&stmt),
            "__xgo_link_generated_register_func(__xgo_local_func_stub{__xgo_local_pkg_name,0,(*File).Close,nil,0,false,false,false,\"File\",true,\"Close\",\"(*File).Close\",\"f\",[]string{\"force\"},[]string{\"err\"},false,false,__xgo_reg_file_gen_2,17})"
        );
    }

    #[test]
    fn generics_register_without_function_reference() {
        let generic = Descriptor::new("Map", DeclShape::GenericFunction, origin(0, 3));
        let record = registration_record(&generic);
        assert_eq!(fields(&record)[2], Value::Nil);
        assert_eq!(fields(&record)[6], Value::Bool(true));
    }

    #[test]
    fn variables_and_constants_reference_values() {
        let var = Descriptor::new("count", DeclShape::PlainVariable, origin(0, 1));
        let addr = var.address_of();
        let konst = Descriptor::new("Max", DeclShape::Constant, origin(0, 2));
        assert_eq!(fields(&registration_record(&var))[3], Value::AddrOf("count".to_string()));
        assert_eq!(fields(&registration_record(&addr))[3], Value::AddrOf("count".to_string()));
        assert_eq!(fields(&registration_record(&addr))[1], Value::Int(2));
        assert_eq!(fields(&registration_record(&addr))[11], Value::str("*count"));
        assert_eq!(fields(&registration_record(&konst))[3], Value::ident("Max"));
        assert_eq!(fields(&registration_record(&konst))[2], Value::Nil);
    }

    #[test]
    fn blank_and_interface_descriptors_are_not_registered() {
        let marker = Descriptor::new(
            "",
            DeclShape::InterfaceMarker {
                type_name: "Reader".to_string(),
            },
            origin(0, 1),
        );
        let body = batch_body(&[func("_", 0), marker, func("Run", 1)]);
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[0],
            Stmt::Define {
                name: "__xgo_reg_file_gen_1".to_string(),
                value: Value::str("f1.go"),
            }
        );
        assert!(body[1].is_call_to(REGISTER_FUNC));
    }

    #[test]
    fn file_references_are_declared_once_per_batch() {
        let descriptors = vec![func("A", 0), func("B", 1), func("C", 0), func("D", 1)];
        let units = synthesize("demo", &descriptors, 3).expect("synthesize");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "__xgo_autogen_register_func_info_0.go");
        assert_eq!(units[1].name, "__xgo_autogen_register_func_info_1.go");

        let first: Vec<&Stmt> = units[0].func_bodies(INIT_FUNC).flatten().collect();
        let defines = first.iter().filter(|stmt| matches!(stmt, Stmt::Define { .. })).count();
        assert_eq!(defines, 2);

        // file 1 spans both batches and is declared again in the second
        let second = GoEmitter::render(&units[1]);
        assert!(second.contains("__xgo_reg_file_gen_1 := \"f1.go\"\n"));
        assert!(!second.contains("__xgo_reg_file_gen_0"));
    }

    #[test]
    fn single_batch_unit_is_unsuffixed() {
        let units = synthesize("demo", &[func("A", 0)], 1000).expect("synthesize");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "__xgo_autogen_register_func_info.go");
        assert_eq!(units[0].count_calls(REGISTER_FUNC), 1);
    }

    #[test]
    fn empty_input_produces_no_units() {
        assert!(synthesize("demo", &[], 1000).expect("synthesize").is_empty());
        assert!(synthesize("demo", &[func("_", 0)], 1000).expect("synthesize").is_empty());
    }

    fn interface_marker(line: u32) -> Descriptor {
        Descriptor::new(
            "",
            DeclShape::InterfaceMarker {
                type_name: "R".to_string(),
            },
            origin(0, line),
        )
    }

    #[test]
    fn unregistered_descriptors_take_no_batch_slot() {
        let mut descriptors = vec![interface_marker(1)];
        descriptors.extend((0..4).map(|i| func(&format!("F{i}"), 0)));
        let units = synthesize("demo", &descriptors, 2).expect("synthesize");
        let sizes: Vec<(&str, usize)> = units
            .iter()
            .map(|unit| (unit.name.as_str(), unit.count_calls(REGISTER_FUNC)))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("__xgo_autogen_register_func_info_0.go", 2),
                ("__xgo_autogen_register_func_info_1.go", 2),
            ]
        );
    }

    #[test]
    fn trailing_blank_does_not_force_a_suffix() {
        let mut descriptors: Vec<Descriptor> = (0..3).map(|i| func(&format!("F{i}"), 0)).collect();
        descriptors.push(func("_", 0));
        let units = synthesize("demo", &descriptors, 3).expect("synthesize");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "__xgo_autogen_register_func_info.go");
        assert_eq!(units[0].count_calls(REGISTER_FUNC), 3);
    }

    #[test]
    fn counts_registered_kinds() {
        let var = Descriptor::new("v", DeclShape::PlainVariable, origin(0, 1));
        let descriptors = vec![func("A", 0), var.address_of(), var, func("_", 0)];
        assert_eq!(count_by_kind(&descriptors), [1, 1, 1, 0]);
    }
}
