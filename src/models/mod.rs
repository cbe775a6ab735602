mod interfaces;
mod inventory;
mod pipeline;
mod plan;
mod switches;

pub use interfaces::*;
pub use inventory::*;
pub use pipeline::*;
pub use plan::*;
pub use switches::*;
