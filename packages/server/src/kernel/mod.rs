//! Kernel module - server infrastructure and dependencies.

pub mod blob;
pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use blob::LocalBlobStorage;
pub use deps::{ServerDeps, WorkerClientAdapter};
pub use test_dependencies::TestDependencies;
pub use traits::*;
