//! Code generation module

mod code_generator;
mod form_generator;
mod model_generator;
mod naming;
mod type_mapper;

pub use code_generator::*;
pub use naming::*;
pub use type_mapper::*;

/// One indentation level in generated Python
pub(crate) const INDENT: &str = "    ";
