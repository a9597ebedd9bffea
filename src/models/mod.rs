//! Kondukto API model types.

mod event;
mod label;
mod param_tree;
mod product;
mod project;
mod release;
mod scan;
mod scan_params;
mod team;

pub use event::*;
pub use label::*;
pub use param_tree::*;
pub use product::*;
pub use project::*;
pub use release::*;
pub use scan::*;
pub use scan_params::*;
pub use team::*;
