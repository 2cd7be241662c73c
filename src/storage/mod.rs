//! Storage medium implementations
//!
//! The recorder talks to the card only through [`StorageMedium`]; `fs` backs
//! it with a host directory and `memory` simulates a card.

pub mod fs;
pub mod memory;
pub mod traits;

pub use fs::FsMedium;
pub use memory::{MemoryHandle, MemoryMedium};
pub use traits::{SlotId, StorageMedium};
