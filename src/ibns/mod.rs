//! Dialect selection, interface classification and render planning.
//!
//! Everything here is pure and synchronous: no device I/O, no template engine.

mod classify;
mod dialect;
mod plan;

pub use classify::{classify, classify_switch};
pub use dialect::select_dialect;
pub use plan::{build_plan, template_id};
