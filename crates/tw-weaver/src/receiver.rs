//! Receiver type unwrapping.
//!
//! Grammar accepted, at most one level of each:
//!
//! ```text
//! receiver := '*' instance | instance
//! instance := Name '[' args ']' | Name
//! ```

use tw_core::ast::TypeExpr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverType {
    pub name: String,
    pub pointer: bool,
    pub generic: bool,
}

/// `None` when `ty` is not a (pointer to a) possibly instantiated named type.
pub fn unwrap_receiver(ty: &TypeExpr) -> Option<ReceiverType> {
    match ty {
        TypeExpr::Pointer(inner) => {
            let mut receiver = unwrap_instance(inner)?;
            receiver.pointer = true;
            Some(receiver)
        }
        other => unwrap_instance(other),
    }
}

fn unwrap_instance(ty: &TypeExpr) -> Option<ReceiverType> {
    match ty {
        TypeExpr::Index { base, .. } => {
            let name = unwrap_name(base)?;
            Some(ReceiverType {
                name,
                pointer: false,
                generic: true,
            })
        }
        other => Some(ReceiverType {
            name: unwrap_name(other)?,
            pointer: false,
            generic: false,
        }),
    }
}

fn unwrap_name(ty: &TypeExpr) -> Option<String> {
    match ty {
        TypeExpr::Name(name) => Some(name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect(ty: TypeExpr, name: &str, pointer: bool, generic: bool) {
        assert_eq!(
            unwrap_receiver(&ty),
            Some(ReceiverType {
                name: name.to_string(),
                pointer,
                generic,
            })
        );
    }

    #[test]
    fn unwraps_all_accepted_shapes() {
        let list_t = || TypeExpr::index(TypeExpr::name("List"), vec![TypeExpr::name("T")]);
        expect(TypeExpr::name("T"), "T", false, false);
        expect(TypeExpr::pointer(TypeExpr::name("T")), "T", true, false);
        expect(list_t(), "List", false, true);
        expect(TypeExpr::pointer(list_t()), "List", true, true);
    }

    #[test]
    fn rejects_nested_indirections() {
        let double = TypeExpr::pointer(TypeExpr::pointer(TypeExpr::name("T")));
        assert_eq!(unwrap_receiver(&double), None);
        let qualified = TypeExpr::Qualified {
            package: "io".to_string(),
            name: "Reader".to_string(),
        };
        assert_eq!(unwrap_receiver(&qualified), None);
    }
}
