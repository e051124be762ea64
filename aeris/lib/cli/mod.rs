//! Command-line argument types and terminal styling for the `aeris` binary.

mod args;
mod styles;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use args::*;
pub use styles::*;
