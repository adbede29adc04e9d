// Code generated from the runtime's registration entry point. DO NOT EDIT.

pub const GENERATED_REGISTER_FUNC_SIGNATURE: &str = "func(info interface{})";
