//! Settings: defaults, environment file, config file and call-time arguments

pub mod defaults;
mod environment;
pub mod languages;
mod resolver;
mod settings;

pub use defaults::ModelFlavor;
pub use environment::EnvironmentDefaults;
pub use resolver::{merge_values, ArgumentOverrides, ConfigResolver};
pub use settings::*;
