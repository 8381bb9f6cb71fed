//! Profile source adapters.
//!
//! - `InMemoryProfileSource` - for tests and single-process setups
//! - `FsProfileSource` - JSON profile files under a base directory

mod filesystem;
mod in_memory;

pub use filesystem::FsProfileSource;
pub use in_memory::InMemoryProfileSource;
