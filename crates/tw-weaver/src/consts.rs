//! Reserved identifiers shared with the runtime collaborator.

pub const XGO_MODULE: &str = "github.com/xhd2015/xgo";
pub const XGO_RUNTIME_CORE_PKG: &str = "github.com/xhd2015/xgo/runtime/core";

/// Sub-paths of [`XGO_MODULE`] that stay eligible.
pub const XGO_TEST_SUBTREES: &[&str] = &["test", "runtime/test"];

/// A module declaring this constant is never instrumented.
pub const SKIP_TRAP_CONST: &str = "__XGO_SKIP_TRAP";
pub const TRAP_MARKER_PREFIX: &str = "__xgo_trap_";

pub const REGISTER_FUNC: &str = "__xgo_link_generated_register_func";
pub const LOCAL_FUNC_STUB: &str = "__xgo_local_func_stub";
pub const LOCAL_PKG_NAME: &str = "__xgo_local_pkg_name";
pub const FILE_REF_PREFIX: &str = "__xgo_reg_file_gen_";

pub const RECV_PLACEHOLDER: &str = "__xgo_recv_auto_filled";
pub const ARG_PLACEHOLDER: &str = "__xgo_arg_auto_filled";
pub const RES_PLACEHOLDER: &str = "__xgo_res_auto_filled";
pub const BLANK_SUFFIX: &str = "_blank";

pub const HELPER_UNIT_NAME: &str = "__xgo_autogen_register_func_helper.go";
pub const BATCH_UNIT_BASE: &str = "__xgo_autogen_register_func_info";

/// Name of the module initializer; never instrumented, may repeat.
pub const INIT_FUNC: &str = "init";

pub const VERSION_FILE_SUFFIX: &str = "version.go";
pub const VERSION_CONST: &str = "XGO_VERSION";
pub const REVISION_CONST: &str = "XGO_REVISION";
pub const NUMBER_CONST: &str = "XGO_NUMBER";
