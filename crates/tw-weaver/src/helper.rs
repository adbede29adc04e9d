//! The fixed helper unit appended next to every set of registration batches.

use tw_core::unit::{StructField, SyntheticUnit, UnitItem, Value};

use crate::consts::{HELPER_UNIT_NAME, LOCAL_FUNC_STUB, LOCAL_PKG_NAME, REGISTER_FUNC};
use crate::contract::REGISTER_FUNC_PARAMS;

/// Field layout of the registration record, in positional order.
pub const RECORD_FIELDS: [(&str, &str); 19] = [
    ("PkgPath", "string"),
    ("Kind", "int"),
    ("Fn", "interface{}"),
    ("Var", "interface{}"),
    ("PC", "uintptr"),
    ("Interface", "bool"),
    ("Generic", "bool"),
    ("Closure", "bool"),
    ("RecvTypeName", "string"),
    ("RecvPtr", "bool"),
    ("Name", "string"),
    ("IdentityName", "string"),
    ("RecvName", "string"),
    ("ArgNames", "[]string"),
    ("ResNames", "[]string"),
    ("FirstArgCtx", "bool"),
    ("LastResultErr", "bool"),
    ("File", "string"),
    ("Line", "int"),
];

/// Build the helper unit: module identity constant, record type and the local
/// stand-in for the runtime's registration entry point.
pub fn helper_unit(package: &str, module_path: &str) -> SyntheticUnit {
    let mut unit = SyntheticUnit::new(HELPER_UNIT_NAME, package);
    unit.push(UnitItem::Comment(
        "Code generated by trapweave. DO NOT EDIT.".to_string(),
    ))
    .push(UnitItem::Const {
        name: LOCAL_PKG_NAME.to_string(),
        value: Value::str(module_path),
    })
    .push(UnitItem::Struct {
        name: LOCAL_FUNC_STUB.to_string(),
        fields: RECORD_FIELDS
            .iter()
            .map(|(name, ty)| StructField::new(*name, *ty))
            .collect(),
    })
    .push(UnitItem::Func {
        name: REGISTER_FUNC.to_string(),
        params: REGISTER_FUNC_PARAMS
            .iter()
            .map(|(name, ty)| StructField::new(*name, *ty))
            .collect(),
        body: Vec::new(),
    });
    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tw_golang::GoEmitter;

    #[test]
    fn identity_constant_holds_module_path() {
        let unit = helper_unit("demo", "example.com/demo");
        assert_eq!(
            unit.items[1],
            UnitItem::Const {
                name: LOCAL_PKG_NAME.to_string(),
                value: Value::str("example.com/demo"),
            }
        );
    }

    #[test]
    fn renders_entry_point_and_record_type() {
        let text = GoEmitter::render(&helper_unit("demo", "example.com/demo"));
        assert!(text.starts_with("package demo\n"));
        assert!(text.contains("const __xgo_local_pkg_name = \"example.com/demo\"\n"));
        assert!(text.contains("func __xgo_link_generated_register_func(info interface{}) {\n}\n"));
        assert!(text.contains("type __xgo_local_func_stub struct {\n\tPkgPath       string\n"));
        assert!(text.contains("\tLine          int\n}\n"));
    }
}
