use std::collections::HashMap;

use tw_core::span::Pos;

use crate::descriptor::Descriptor;

/// Source position to descriptor lookup for call-target declarations.
///
/// Entries point into the descriptor list the index was built from.
#[derive(Debug, Default, Clone)]
pub struct PositionIndex {
    files: HashMap<String, HashMap<Pos, usize>>,
}

impl PositionIndex {
    /// Index every function-kind descriptor except interface markers. A later
    /// descriptor at the same position replaces an earlier one.
    pub fn build(descriptors: &[Descriptor]) -> Self {
        let mut files: HashMap<String, HashMap<Pos, usize>> = HashMap::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.is_interface() || !descriptor.kind().is_func() {
                continue;
            }
            let origin = &descriptor.origin;
            files
                .entry(origin.file_name.clone())
                .or_default()
                .insert(Pos::new(origin.line, origin.col), index);
        }
        Self { files }
    }

    pub fn lookup(&self, file_name: &str, pos: Pos) -> Option<usize> {
        self.files.get(file_name)?.get(&pos).copied()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn len(&self) -> usize {
        self.files.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DeclShape, Origin};

    fn at(name: &str, shape: DeclShape, file: &str, line: u32, col: u32) -> Descriptor {
        Descriptor::new(
            name,
            shape,
            Origin {
                file_index: 0,
                file_name: file.to_string(),
                line,
                col,
            },
        )
    }

    #[test]
    fn only_call_targets_are_indexed() {
        let descriptors = vec![
            at("Run", DeclShape::Function, "a.go", 3, 1),
            at("v", DeclShape::PlainVariable, "a.go", 5, 5),
            at(
                "",
                DeclShape::InterfaceMarker {
                    type_name: "Reader".to_string(),
                },
                "a.go",
                7,
                6,
            ),
            at("Map", DeclShape::GenericFunction, "b.go", 3, 1),
        ];
        let index = PositionIndex::build(&descriptors);
        assert_eq!(index.len(), 2);
        assert_eq!(index.file_count(), 2);
        assert_eq!(index.lookup("a.go", Pos::new(3, 1)), Some(0));
        assert_eq!(index.lookup("b.go", Pos::new(3, 1)), Some(3));
        assert_eq!(index.lookup("a.go", Pos::new(5, 5)), None);
        assert_eq!(index.lookup("a.go", Pos::new(7, 6)), None);
        assert_eq!(index.lookup("c.go", Pos::new(3, 1)), None);
    }
}
