//! Toolchain version stamping of the runtime core module.

use tracing::debug;
use tw_core::ast::{Decl, Expr, ExprKind, SourceFile};
use tw_core::config::WeaveEnv;
use tw_core::span::Span;
use tw_golang::emitter::quote;
use tw_golang::TextEdit;

use crate::consts::{NUMBER_CONST, REVISION_CONST, VERSION_CONST, VERSION_FILE_SUFFIX, XGO_RUNTIME_CORE_PKG};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStamp {
    pub version: String,
    pub revision: String,
    pub number: i64,
}

impl VersionStamp {
    /// All three inputs must be present and the number a positive integer.
    pub fn from_env(env: &WeaveEnv) -> Option<Self> {
        let version = env.toolchain_version.clone()?;
        let revision = env.toolchain_revision.clone()?;
        let number = env
            .toolchain_version_number
            .as_deref()?
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|number| *number > 0)?;
        Some(Self {
            version,
            revision,
            number,
        })
    }

    fn value_for(&self, const_name: &str) -> Option<ExprKind> {
        match const_name {
            VERSION_CONST => Some(ExprKind::Str(self.version.clone())),
            REVISION_CONST => Some(ExprKind::Str(self.revision.clone())),
            NUMBER_CONST => Some(ExprKind::Int(self.number)),
            _ => None,
        }
    }
}

/// A rewritten constant initializer, locatable in the original source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstPatch {
    pub file_index: usize,
    pub name: String,
    pub span: Span,
    pub replacement: String,
}

impl ConstPatch {
    pub fn text_edit(&self) -> TextEdit {
        TextEdit::new(self.span, self.replacement.clone())
    }
}

/// Rewrite the version constants of the runtime core module. Any unmet
/// precondition leaves the files untouched and yields no patches.
pub fn patch_versions(module_path: &str, files: &mut [SourceFile], stamp: Option<&VersionStamp>) -> Vec<ConstPatch> {
    if module_path != XGO_RUNTIME_CORE_PKG {
        return Vec::new();
    }
    let Some(stamp) = stamp else {
        debug!(module = module_path, "toolchain version not provided");
        return Vec::new();
    };
    let Some((file_index, file)) = files
        .iter_mut()
        .enumerate()
        .find(|(_, file)| file.name.ends_with(VERSION_FILE_SUFFIX))
    else {
        debug!(module = module_path, "no version file");
        return Vec::new();
    };

    let mut patches = Vec::new();
    for decl in file.decls.iter_mut() {
        let Decl::Const(value) = decl else {
            continue;
        };
        for (index, name) in value.names.iter().enumerate() {
            let Some(kind) = stamp.value_for(name.as_str()) else {
                continue;
            };
            let replacement = render_literal(&kind);
            match value.values.get_mut(index) {
                Some(expr) => {
                    if !expr.span.is_null() {
                        patches.push(ConstPatch {
                            file_index,
                            name: name.name.clone(),
                            span: expr.span,
                            replacement,
                        });
                    }
                    expr.kind = kind;
                }
                None => value.values.push(Expr::new(kind)),
            }
        }
    }
    debug!(module = module_path, file = %file.name, patches = patches.len(), "version constants patched");
    patches
}

fn render_literal(kind: &ExprKind) -> String {
    match kind {
        ExprKind::Str(text) => quote(text),
        ExprKind::Int(number) => number.to_string(),
        ExprKind::Raw(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::ast::ValueDecl;

    fn env(number: &str) -> WeaveEnv {
        WeaveEnv {
            toolchain_version: Some("1.2.3".to_string()),
            toolchain_revision: Some("abcdef".to_string()),
            toolchain_version_number: Some(number.to_string()),
            ..WeaveEnv::default()
        }
    }

    fn version_file() -> SourceFile {
        SourceFile::new("core/version.go", "core").with_decls(vec![
            Decl::Const(ValueDecl::new([VERSION_CONST]).with_values(vec![Expr::string("").with_span(Span::new(30, 32))])),
            Decl::Const(ValueDecl::new([REVISION_CONST]).with_values(vec![Expr::string("").with_span(Span::new(50, 52))])),
            Decl::Const(ValueDecl::new([NUMBER_CONST]).with_values(vec![Expr::int(0).with_span(Span::new(70, 71))])),
            Decl::Const(ValueDecl::new(["Other"]).with_values(vec![Expr::int(7)])),
        ])
    }

    #[test]
    fn number_must_be_positive_integer() {
        assert!(VersionStamp::from_env(&env("42")).is_some());
        assert!(VersionStamp::from_env(&env("-1")).is_none());
        assert!(VersionStamp::from_env(&env("0")).is_none());
        assert!(VersionStamp::from_env(&env("abc")).is_none());
        assert!(VersionStamp::from_env(&WeaveEnv::default()).is_none());
    }

    #[test]
    fn patches_the_three_constants() {
        let stamp = VersionStamp::from_env(&env("42"));
        let mut files = vec![SourceFile::new("core.go", "core"), version_file()];
        let patches = patch_versions(XGO_RUNTIME_CORE_PKG, &mut files, stamp.as_ref());

        let summary: Vec<(usize, &str, &str)> = patches
            .iter()
            .map(|patch| (patch.file_index, patch.name.as_str(), patch.replacement.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, VERSION_CONST, "\"1.2.3\""),
                (1, REVISION_CONST, "\"abcdef\""),
                (1, NUMBER_CONST, "42"),
            ]
        );
        let Decl::Const(number) = &files[1].decls[2] else {
            panic!("const expected");
        };
        assert_eq!(number.values[0].kind, ExprKind::Int(42));
        let Decl::Const(other) = &files[1].decls[3] else {
            panic!("const expected");
        };
        assert_eq!(other.values[0].kind, ExprKind::Int(7));
    }

    #[test]
    fn other_modules_are_untouched() {
        let stamp = VersionStamp::from_env(&env("42"));
        let mut files = vec![version_file()];
        let before = files.clone();
        assert!(patch_versions("example.com/app", &mut files, stamp.as_ref()).is_empty());
        assert_eq!(files, before);
    }

    #[test]
    fn invalid_number_is_a_silent_no_op() {
        let stamp = VersionStamp::from_env(&env("-1"));
        let mut files = vec![version_file()];
        let before = files.clone();
        assert!(patch_versions(XGO_RUNTIME_CORE_PKG, &mut files, stamp.as_ref()).is_empty());
        assert_eq!(files, before);
    }
}
