//! CLI command implementations

mod plan;
mod run;
mod validate;

pub use plan::plan;
pub use run::run;
pub use validate::validate;
