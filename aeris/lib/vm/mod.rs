//! Boxes and the parameters derived from them.

mod params;
mod spec;
mod vm_box;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use params::*;
pub use spec::*;
pub use vm_box::*;
