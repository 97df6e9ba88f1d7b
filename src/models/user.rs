//! User model
//!
//! Defines the User entity for the ChestScan demo. Users are created on
//! registration and never updated or deleted; the whole table lives in
//! process memory and resets on restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
///
/// Patients register themselves; the admin account is seeded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Full name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Date of birth
    pub dob: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Free-form medical history
    pub medical_history: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(name: String, email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: 0, // Will be set by the repository
            name,
            email,
            password_hash,
            role,
            dob: None,
            phone: None,
            medical_history: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the optional profile fields collected at registration
    pub fn with_profile(
        mut self,
        dob: Option<String>,
        phone: Option<String>,
        medical_history: Option<String>,
    ) -> Self {
        self.dob = dob;
        self.phone = phone;
        self.medical_history = medical_history;
        self
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role for authorization.
///
/// - Admin: access to the admin dashboard and patient list
/// - Patient: access to the patient dashboard and AI services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator
    Admin,
    /// Patient (default for self-registration)
    Patient,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Patient
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Patient => write!(f, "patient"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "patient" => Ok(UserRole::Patient),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}
