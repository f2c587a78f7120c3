use serde::{Deserialize, Serialize};

/// A single label returned by the Vision API (`labelAnnotations[]` entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAnnotation {
    pub description: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topicality: Option<f64>,
}

impl LabelAnnotation {
    #[cfg(test)]
    pub fn new(description: impl Into<String>, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
            mid: None,
            topicality: None,
        }
    }
}

/// Body of a successful `POST /detect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub ingredient: Option<String>,
}

/// Body of a failed `POST /detect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
