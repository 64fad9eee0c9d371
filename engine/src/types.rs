use serde::{Deserialize, Serialize};

use crate::blend::Verdict;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub url: String,
    /// Sent by the browser extension, not used.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub url: String,
    pub prediction: u8,
    pub phishing_probability: f64,
    pub risk_score: f64,
}

impl PredictResponse {
    pub fn new(url: &str, verdict: &Verdict) -> Self {
        Self {
            url: url.to_string(),
            prediction: verdict.prediction,
            phishing_probability: verdict.rounded_probability(),
            risk_score: verdict.risk_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub model_version: String,
    pub known_tlds: usize,
}
