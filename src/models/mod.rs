//! Data models
//!
//! This module contains all data structures used throughout the ChestScan server.
//! Models represent:
//! - Core entities (User, Session)
//! - Inference results (XrayAnalysis, AnalysisRecord, ChatMessage)
//! - Internal data transfer objects

mod analysis;
mod chat;
mod session;
mod user;

pub use analysis::{AnalysisRecord, Prediction, XrayAnalysis};
pub use chat::{ChatMessage, ChatRole};
pub use session::Session;
pub use user::{User, UserRole};
