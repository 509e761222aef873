use serde::{Deserialize, Serialize};

/// Text pulled off a plaque image by the OCR engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawOcrResult {
    pub text: String,

    /// Average word confidence, 0–100. Only filled when it was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl RawOcrResult {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}
