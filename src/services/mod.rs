//! Services layer - Business logic
//!
//! This module contains the business logic services for the ChestScan server.
//! Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod auth;
pub mod password;

pub use auth::{AuthService, AuthServiceError, LoginInput, RegisterInput};
pub use password::{hash_password, verify_password};
