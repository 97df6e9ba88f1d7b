//! Analysis history repository

use crate::models::{AnalysisRecord, Prediction, XrayAnalysis};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Analysis history repository trait
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Record a completed analysis for a user
    async fn record(&self, user_id: i64, analysis: &XrayAnalysis) -> Result<AnalysisRecord>;

    /// List a user's analyses, newest first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<AnalysisRecord>>;

    /// Count all recorded analyses
    async fn count(&self) -> Result<i64>;

    /// Count recorded analyses with a pneumonia outcome
    async fn count_pneumonia(&self) -> Result<i64>;
}

/// In-memory analysis history
pub struct MemoryAnalysisRepository {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryAnalysisRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn AnalysisRepository> {
        Arc::new(Self::new())
    }
}

impl Default for MemoryAnalysisRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisRepository for MemoryAnalysisRepository {
    async fn record(&self, user_id: i64, analysis: &XrayAnalysis) -> Result<AnalysisRecord> {
        let mut records = self.records.write().await;
        let record = AnalysisRecord {
            id: records.len() as i64 + 1,
            user_id,
            analysis: analysis.clone(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<AnalysisRecord>> {
        let records = self.records.read().await;
        let mut result: Vec<AnalysisRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        result.reverse();
        Ok(result)
    }

    async fn count(&self) -> Result<i64> {
        let records = self.records.read().await;
        Ok(records.len() as i64)
    }

    async fn count_pneumonia(&self) -> Result<i64> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.analysis.prediction == Prediction::Pneumonia)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn analysis(prediction: Prediction, report_id: &str) -> XrayAnalysis {
        XrayAnalysis {
            prediction,
            confidence: 0.9,
            image_url: "/uploads/test.png".to_string(),
            report_id: report_id.to_string(),
            report_download_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let repo = MemoryAnalysisRepository::new();
        repo.record(1, &analysis(Prediction::Normal, "REP-000001"))
            .await
            .unwrap();
        repo.record(1, &analysis(Prediction::Pneumonia, "REP-000002"))
            .await
            .unwrap();
        repo.record(2, &analysis(Prediction::Normal, "REP-000003"))
            .await
            .unwrap();

        let history = repo.list_for_user(1).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].analysis.report_id, "REP-000002");
        assert_eq!(history[1].analysis.report_id, "REP-000001");
    }

    #[tokio::test]
    async fn test_counts() {
        let repo = MemoryAnalysisRepository::new();
        repo.record(1, &analysis(Prediction::Pneumonia, "REP-000001"))
            .await
            .unwrap();
        repo.record(1, &analysis(Prediction::Normal, "REP-000002"))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.count_pneumonia().await.unwrap(), 1);
    }
}
