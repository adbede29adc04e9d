//! Module- and declaration-level eligibility policy.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use tw_core::ast::{Decl, SourceFile};

use crate::consts::{REGISTER_FUNC, SKIP_TRAP_CONST, XGO_MODULE, XGO_TEST_SUBTREES};

/// Implementation-internal areas of the runtime; never rewritten.
const RESERVED_PREFIXES: &[&str] = &["runtime/", "internal/"];

/// Force-skipped regardless of mode.
const SPECIAL_PREFIXES: &[&str] = &["crypto/"];
const SPECIAL_PATHS: &[&str] = &["crypto"];

/// Standard-library modules that are safe to intercept. Concurrency
/// primitives, unsafe memory, reflection and the runtime are deliberately absent.
static STD_ALLOW_LIST: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "bytes",
        "database/sql",
        "encoding/base64",
        "encoding/hex",
        "encoding/json",
        "errors",
        "fmt",
        "math",
        "math/bits",
        "net/http",
        "net/url",
        "os/exec",
        "path",
        "path/filepath",
        "sort",
        "strconv",
        "strings",
        "time",
        "unicode",
        "unicode/utf16",
        "unicode/utf8",
    ]
    .into_iter()
    .collect()
});

/// Why a whole module is left uninstrumented. Not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyPath,
    ReservedPrefix(&'static str),
    StdNotAllowed,
    Special,
    WeaverModule,
    /// A file declares [`SKIP_TRAP_CONST`].
    SkipMarker,
    /// The module declares its own [`REGISTER_FUNC`].
    VolatileModule,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyPath => write!(f, "empty module path"),
            SkipReason::ReservedPrefix(prefix) => write!(f, "reserved prefix `{prefix}`"),
            SkipReason::StdNotAllowed => write!(f, "standard library module not on the allow-list"),
            SkipReason::Special => write!(f, "special module"),
            SkipReason::WeaverModule => write!(f, "weaver's own module"),
            SkipReason::SkipMarker => write!(f, "`{SKIP_TRAP_CONST}` declared"),
            SkipReason::VolatileModule => write!(f, "module declares `{REGISTER_FUNC}`"),
        }
    }
}

/// Path-based policy, evaluated in order; `None` means eligible.
pub fn module_skip_reason(module_path: &str, std_mode: bool) -> Option<SkipReason> {
    if module_path.is_empty() {
        return Some(SkipReason::EmptyPath);
    }
    if let Some(prefix) = RESERVED_PREFIXES
        .iter()
        .find(|prefix| module_path.starts_with(**prefix))
    {
        return Some(SkipReason::ReservedPrefix(*prefix));
    }
    if std_mode {
        if is_std_allowed(module_path) {
            return None;
        }
        return Some(SkipReason::StdNotAllowed);
    }
    if is_special_module(module_path) {
        return Some(SkipReason::Special);
    }
    if is_weaver_module(module_path) {
        return Some(SkipReason::WeaverModule);
    }
    None
}

pub fn is_module_skipped(module_path: &str, std_mode: bool) -> bool {
    module_skip_reason(module_path, std_mode).is_some()
}

/// Per-declaration filter layered on the module gate. Only standard-library
/// modules are filtered, and only by their membership in the allow-list.
pub fn is_declaration_allowed(module_path: &str, std_mode: bool, identity_name: &str) -> bool {
    if !std_mode {
        return true;
    }
    allow_std_decl(module_path, identity_name)
}

fn allow_std_decl(module_path: &str, _identity_name: &str) -> bool {
    is_std_allowed(module_path)
}

pub fn is_std_allowed(module_path: &str) -> bool {
    STD_ALLOW_LIST.contains(module_path)
}

fn is_special_module(module_path: &str) -> bool {
    SPECIAL_PATHS.contains(&module_path)
        || SPECIAL_PREFIXES
            .iter()
            .any(|prefix| module_path.starts_with(prefix))
}

/// The weaver's own module is skipped except for its test subtrees.
pub fn is_weaver_module(module_path: &str) -> bool {
    let Some(suffix) = cut_module_prefix(module_path, XGO_MODULE) else {
        return false;
    };
    if suffix.is_empty() {
        return true;
    }
    !XGO_TEST_SUBTREES
        .iter()
        .any(|subtree| cut_module_prefix(suffix, subtree).is_some())
}

/// `Some(rest)` when `path` equals `module` or lies below it.
fn cut_module_prefix<'a>(path: &'a str, module: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(module)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('/')
}

/// Escape hatch: any const declaration whose first name is [`SKIP_TRAP_CONST`].
pub fn has_skip_marker(files: &[SourceFile]) -> bool {
    files
        .iter()
        .flat_map(|file| file.consts())
        .any(|decl| decl.first_name() == Some(SKIP_TRAP_CONST))
}

/// A module that declares the registration entry point itself would collide
/// with the generated helper unit.
pub fn declares_register_func(files: &[SourceFile]) -> bool {
    files.iter().flat_map(|file| file.decls.iter()).any(|decl| {
        matches!(decl, Decl::Func(func) if func.recv.is_none() && func.name.name == REGISTER_FUNC)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::ast::{FuncDecl, ValueDecl};

    #[test]
    fn reserved_prefixes_are_always_skipped() {
        for std_mode in [false, true] {
            assert_eq!(
                module_skip_reason("runtime/internal/atomic", std_mode),
                Some(SkipReason::ReservedPrefix("runtime/"))
            );
            assert!(is_module_skipped("internal/abi", std_mode));
        }
    }

    #[test]
    fn empty_path_is_skipped() {
        assert_eq!(module_skip_reason("", false), Some(SkipReason::EmptyPath));
    }

    #[test]
    fn std_mode_uses_allow_list() {
        assert!(!is_module_skipped("strconv", true));
        assert!(!is_module_skipped("net/http", true));
        assert_eq!(module_skip_reason("sync", true), Some(SkipReason::StdNotAllowed));
        assert!(is_module_skipped("unsafe", true));
        assert!(is_module_skipped("crypto/sha256", true));
    }

    #[test]
    fn special_modules_are_skipped_outside_std_mode() {
        assert_eq!(module_skip_reason("crypto/tls", false), Some(SkipReason::Special));
        assert_eq!(module_skip_reason("crypto", false), Some(SkipReason::Special));
        assert_eq!(module_skip_reason("cryptography/x", false), None);
    }

    #[test]
    fn weaver_module_only_keeps_tests() {
        assert!(is_module_skipped("github.com/xhd2015/xgo", false));
        assert!(is_module_skipped("github.com/xhd2015/xgo/runtime/core", false));
        assert!(!is_module_skipped("github.com/xhd2015/xgo/test", false));
        assert!(!is_module_skipped("github.com/xhd2015/xgo/runtime/test/trap", false));
        assert!(!is_module_skipped("github.com/xhd2015/xgox", false));
        assert!(!is_module_skipped("example.com/app", false));
    }

    #[test]
    fn declaration_filter_is_permissive_outside_std_mode() {
        assert!(is_declaration_allowed("example.com/app", false, "Run"));
        assert!(is_declaration_allowed("strings", true, "Split"));
        assert!(!is_declaration_allowed("sync", true, "(*Mutex).Lock"));
    }

    #[test]
    fn skip_marker_is_detected_in_any_file() {
        let plain = SourceFile::new("a.go", "demo").with_decls(vec![Decl::Func(FuncDecl::new("A"))]);
        let marked = SourceFile::new("b.go", "demo")
            .with_decls(vec![Decl::Const(ValueDecl::new([SKIP_TRAP_CONST]))]);
        assert!(!has_skip_marker(std::slice::from_ref(&plain)));
        assert!(has_skip_marker(&[plain, marked]));
    }

    #[test]
    fn register_func_method_is_not_volatile() {
        let method = FuncDecl::new(REGISTER_FUNC).with_recv(tw_core::ast::Field::unnamed(
            tw_core::ast::TypeExpr::name("T"),
        ));
        let file = SourceFile::new("a.go", "demo").with_decls(vec![Decl::Func(method)]);
        assert!(!declares_register_func(std::slice::from_ref(&file)));

        let func = SourceFile::new("b.go", "demo").with_decls(vec![Decl::Func(FuncDecl::new(REGISTER_FUNC))]);
        assert!(declares_register_func(&[file, func]));
    }
}
