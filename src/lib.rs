pub mod allocator;
pub mod constants;
pub mod error;
pub mod io;
pub mod logger;
pub mod memory;
pub mod process;
pub mod registry;
pub mod translation;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use constants::*;
pub use error::{AllocationPurpose, MemoryError};
pub use translation::{Access, AccessKind, VirtualAddress};
pub use vm_manager::{Validation, VmManager};
