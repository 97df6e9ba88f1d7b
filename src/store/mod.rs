//! Storage layer
//!
//! This module provides data access for the ChestScan server.
//!
//! Everything here is process-local: the demo product keeps its user table,
//! sessions and analysis history in memory, and all state resets on restart.
//! The repository traits are the seam a persistent backend would implement.

mod analysis;
mod session;
mod user;

pub use analysis::{AnalysisRepository, MemoryAnalysisRepository};
pub use session::{MemorySessionRepository, SessionRepository};
pub use user::{MemoryUserRepository, UserRepository};
