//! Configuration types and helpers.

mod defaults;
mod document;
mod environment;
mod forward;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use document::*;
pub use environment::*;
pub use forward::*;
