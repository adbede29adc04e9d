//! Signature agreement between the generated helper unit and the runtime.

use itertools::Itertools;
use tracing::debug;

use crate::contract_gen::GENERATED_REGISTER_FUNC_SIGNATURE;
use crate::error::{Result, WeaveError};

pub const EXPECTED_REGISTER_FUNC_SIGNATURE: &str = "func(info interface{})";

/// Parameters of the registration entry point as declared by the helper unit.
pub const REGISTER_FUNC_PARAMS: [(&str, &str); 1] = [("info", "interface{}")];

/// Fail if the runtime's entry point no longer matches what the weaver emits.
pub fn verify() -> Result<()> {
    verify_signature(GENERATED_REGISTER_FUNC_SIGNATURE)
}

pub fn verify_signature(generated: &str) -> Result<()> {
    if generated != EXPECTED_REGISTER_FUNC_SIGNATURE {
        return Err(WeaveError::ContractDrift {
            expected: EXPECTED_REGISTER_FUNC_SIGNATURE.to_string(),
            generated: generated.to_string(),
        });
    }
    debug!(signature = generated, "runtime contract verified");
    Ok(())
}

/// `func(name type, ...)` for the helper's declared parameters.
pub fn declared_signature() -> String {
    let params = REGISTER_FUNC_PARAMS
        .iter()
        .map(|(name, ty)| format!("{name} {ty}"))
        .join(", ");
    format!("func({params})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_signature_matches() {
        assert!(verify().is_ok());
    }

    #[test]
    fn helper_declares_the_expected_signature() {
        assert_eq!(declared_signature(), EXPECTED_REGISTER_FUNC_SIGNATURE);
    }

    #[test]
    fn drift_is_fatal() {
        let err = verify_signature("func(info interface{}, extra int)").expect_err("drift");
        match err {
            WeaveError::ContractDrift { expected, generated } => {
                assert_eq!(expected, "func(info interface{})");
                assert_eq!(generated, "func(info interface{}, extra int)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
