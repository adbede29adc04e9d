//! Descriptor dumps for the compile data directory.

use std::path::{Path, PathBuf};

use crate::descriptor::Descriptor;

/// `<dir>/<module path with '/' replaced by '_'>.decls.json`
pub fn dump_path(dir: &Path, module_path: &str) -> PathBuf {
    dir.join(format!("{}.decls.json", module_path.replace('/', "_")))
}

pub fn descriptors_json(descriptors: &[Descriptor]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DeclShape, Origin, Receiver};

    #[test]
    fn dump_file_is_named_after_module() {
        let path = dump_path(Path::new("/tmp/data"), "example.com/app/pkg");
        assert_eq!(path, PathBuf::from("/tmp/data/example.com_app_pkg.decls.json"));
    }

    #[test]
    fn shape_is_flattened_into_the_record() {
        let method = Descriptor::new(
            "M",
            DeclShape::Method {
                receiver: Receiver {
                    type_name: "T".to_string(),
                    pointer: true,
                    name: "t".to_string(),
                },
                generic: false,
            },
            Origin {
                file_index: 0,
                file_name: "a.go".to_string(),
                line: 4,
                col: 1,
            },
        );
        let json = descriptors_json(&[method]).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse back");
        assert_eq!(value[0]["shape"], "method");
        assert_eq!(value[0]["receiver"]["type_name"], "T");
        assert_eq!(value[0]["origin"]["line"], 4);
    }
}
