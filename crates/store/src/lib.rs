//! Persistence for the advisor: an in-memory `Store` implementation and the
//! approval/roll operations layered on top of it.

pub mod approval;
pub mod memory;

pub use approval::{
    approve_recommendation, reject_recommendation, roll_position, thesis_stale,
};
pub use memory::MemoryStore;
