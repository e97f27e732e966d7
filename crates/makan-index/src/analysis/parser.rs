use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured record extracted from a review transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Reviewer's score, 0.0 to 10.0; 0 when the transcript never states one.
    pub score: f64,
    /// Three short highlights suitable for the vendor card.
    pub keypoints: Vec<String>,
    /// Review date, `YYYY-MM-DD`.
    pub review_date: NaiveDate,
}

/// The model is told to answer with a raw JSON object, but some responses
/// still arrive wrapped in markdown code fences. Strip every fence marker
/// before parsing.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_report(raw: &str) -> Result<AnalysisReport, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(raw))
}
