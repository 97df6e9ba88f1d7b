//! Mock inference backend
//!
//! Fabricates analysis results and chat replies locally so the demo works
//! without a model-serving backend. Results are random within the
//! documented bounds; chat replies come from a small keyword table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::inference::{InferenceBackend, InferenceError, XrayUpload};
use crate::models::{ChatMessage, Prediction, XrayAnalysis};

/// Canned chatbot replies, keyed by topic
const REPLY_SYMPTOMS: &str = "Common symptoms of pneumonia include chest pain, coughing, fatigue, fever, shortness of breath, and in some cases, confusion or low energy, especially in older adults.";
const REPLY_CAUSES: &str = "Pneumonia is typically caused by infection with bacteria, viruses, or fungi. The most common cause is the bacterium Streptococcus pneumoniae. Risk factors include smoking, weakened immune system, and certain chronic illnesses.";
const REPLY_TREATMENT: &str = "Treatment depends on the cause of pneumonia. Bacterial pneumonia is treated with antibiotics. Viral pneumonia may be treated with antiviral medications. Rest, hydration, and over-the-counter medications for fever and pain are also recommended.";
const REPLY_PREVENTION: &str = "Vaccination is key to preventing pneumonia. Both pneumococcal and flu vaccines can help. Other preventive measures include good hygiene practices, avoiding smoking, and maintaining good overall health.";
const REPLY_DIAGNOSIS: &str = "Pneumonia is diagnosed through physical examinations, chest X-rays, blood tests, pulse oximetry, sputum tests, and sometimes CT scans or pleural fluid cultures in more severe cases.";
const REPLY_RISK: &str = "People at higher risk for pneumonia include older adults, young children, smokers, people with chronic diseases, and those with weakened immune systems.";
const REPLY_DEFAULT: &str = "I'm an AI assistant specialized in providing information about pneumonia and lung health. Feel free to ask me about symptoms, causes, treatment, prevention, or any other related topic.";

/// Fabricated confidence bounds
const CONFIDENCE_MIN: f64 = 0.85;
const CONFIDENCE_MAX: f64 = 0.95;

/// Mock inference backend
pub struct MockBackend {
    upload_config: Arc<UploadConfig>,
    delay: Duration,
}

impl MockBackend {
    /// Create a new mock backend.
    ///
    /// `delay` is the artificial processing time added before every reply.
    pub fn new(upload_config: Arc<UploadConfig>, delay: Duration) -> Self {
        Self {
            upload_config,
            delay,
        }
    }

    /// Store the uploaded image and return its serving URL
    async fn store_image(&self, upload: &XrayUpload) -> Result<String> {
        fs::create_dir_all(&self.upload_config.path)
            .await
            .context("Failed to create upload directory")?;

        let ext = self.upload_config.get_extension(&upload.content_type);
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.upload_config.path.join(&filename);

        fs::write(&path, &upload.data)
            .await
            .with_context(|| format!("Failed to save uploaded image to {:?}", path))?;

        Ok(format!("/uploads/{}", filename))
    }
}

/// Pick the canned reply for a message via keyword matching
fn canned_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();

    if lower.contains("symptom") || lower.contains("feel") {
        REPLY_SYMPTOMS
    } else if lower.contains("cause") || lower.contains("why") || lower.contains("how get") {
        REPLY_CAUSES
    } else if lower.contains("treat") || lower.contains("cure") || lower.contains("medicine") {
        REPLY_TREATMENT
    } else if lower.contains("prevent") || lower.contains("avoid") {
        REPLY_PREVENTION
    } else if lower.contains("diagnos") || lower.contains("test") {
        REPLY_DIAGNOSIS
    } else if lower.contains("risk") || lower.contains("danger") {
        REPLY_RISK
    } else {
        REPLY_DEFAULT
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn analyze(&self, upload: XrayUpload) -> Result<XrayAnalysis, InferenceError> {
        // Simulate model processing time
        tokio::time::sleep(self.delay).await;

        let image_url = self.store_image(&upload).await?;

        let (prediction, confidence, report_id) = {
            let mut rng = rand::thread_rng();
            let prediction = if rng.gen_bool(0.5) {
                Prediction::Pneumonia
            } else {
                Prediction::Normal
            };
            let confidence = rng.gen_range(CONFIDENCE_MIN..=CONFIDENCE_MAX);
            let report_id = format!("REP-{:06}", rng.gen_range(0..1_000_000));
            (prediction, confidence, report_id)
        };

        Ok(XrayAnalysis {
            prediction,
            confidence,
            image_url,
            report_id,
            report_download_url: None,
            created_at: Utc::now(),
        })
    }

    async fn chat(&self, message: &str) -> Result<ChatMessage, InferenceError> {
        tokio::time::sleep(self.delay).await;
        Ok(ChatMessage::assistant(canned_reply(message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;

    fn test_backend(dir: &std::path::Path) -> MockBackend {
        let config = UploadConfig {
            path: dir.to_path_buf(),
            ..Default::default()
        };
        MockBackend::new(Arc::new(config), Duration::ZERO)
    }

    fn png_upload() -> XrayUpload {
        XrayUpload {
            filename: "xray.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_analyze_confidence_within_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let backend = test_backend(dir.path());

        for _ in 0..20 {
            let result = backend.analyze(png_upload()).await.unwrap();
            assert!(
                (CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&result.confidence),
                "confidence {} out of bounds",
                result.confidence
            );
            assert!(matches!(
                result.prediction,
                Prediction::Normal | Prediction::Pneumonia
            ));
        }
    }

    #[tokio::test]
    async fn test_analyze_stores_image_and_assigns_report_id() {
        let dir = tempfile::tempdir().unwrap();
        let backend = test_backend(dir.path());

        let result = backend.analyze(png_upload()).await.unwrap();

        assert!(result.report_id.starts_with("REP-"));
        assert!(result.image_url.starts_with("/uploads/"));
        assert!(result.image_url.ends_with(".png"));
        assert!(result.report_download_url.is_none());

        let saved = dir.path().join(result.image_url.trim_start_matches("/uploads/"));
        assert!(saved.exists());
    }

    #[tokio::test]
    async fn test_chat_keyword_matching() {
        let dir = tempfile::tempdir().unwrap();
        let backend = test_backend(dir.path());

        let reply = backend
            .chat("What are the symptoms of pneumonia?")
            .await
            .unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, REPLY_SYMPTOMS);

        let reply = backend.chat("How is it DIAGNOSED?").await.unwrap();
        assert_eq!(reply.content, REPLY_DIAGNOSIS);

        let reply = backend.chat("Can pneumonia be prevented?").await.unwrap();
        assert_eq!(reply.content, REPLY_PREVENTION);
    }

    #[tokio::test]
    async fn test_chat_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let backend = test_backend(dir.path());

        let reply = backend.chat("Tell me a joke").await.unwrap();
        assert_eq!(reply.content, REPLY_DEFAULT);
    }
}
