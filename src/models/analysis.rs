//! X-ray analysis models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of analyzing a chest X-ray image.
///
/// Produced once per analysis request and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrayAnalysis {
    /// Classification outcome
    pub prediction: Prediction,
    /// Model confidence in [0, 1]
    pub confidence: f64,
    /// URL of the analyzed image
    pub image_url: String,
    /// Backend-assigned report identifier
    pub report_id: String,
    /// Download URL for the generated report, when the backend produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_download_url: Option<String>,
    /// When the analysis completed
    pub created_at: DateTime<Utc>,
}

/// Classification outcome for a chest X-ray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    /// No signs of pneumonia detected
    Normal,
    /// Pneumonia may be present
    Pneumonia,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Normal => write!(f, "Normal"),
            Prediction::Pneumonia => write!(f, "Pneumonia"),
        }
    }
}

impl FromStr for Prediction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Prediction::Normal),
            "pneumonia" => Ok(Prediction::Pneumonia),
            _ => Err(anyhow::anyhow!("Invalid prediction: {}", s)),
        }
    }
}

/// A completed analysis attributed to a patient.
///
/// Kept in the in-memory analysis repository so the dashboard can list a
/// patient's history and the admin analytics can count outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique record identifier
    pub id: i64,
    /// Owning user ID
    pub user_id: i64,
    /// The analysis result
    pub analysis: XrayAnalysis,
}
