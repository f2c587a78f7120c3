use std::sync::Arc;

use crate::services::{extract_ingredient, LabelSource};

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to read uploaded image: {0}")]
    Upload(String),

    #[error("missing 'image' field in multipart form")]
    MissingImage,

    #[error("label detection failed: {0}")]
    LabelService(#[source] anyhow::Error),
}

impl DetectError {
    pub fn kind(&self) -> &'static str {
        match self {
            DetectError::Upload(_) => "upload",
            DetectError::MissingImage => "missing_image",
            DetectError::LabelService(_) => "label_service",
        }
    }
}

/// Image bytes in, best-guess ingredient out
pub struct IngredientDetector {
    label_source: Arc<dyn LabelSource>,
}

impl IngredientDetector {
    pub fn new(label_source: Arc<dyn LabelSource>) -> Self {
        Self { label_source }
    }

    pub async fn detect(&self, image: &[u8]) -> Result<Option<String>, DetectError> {
        let labels = self
            .label_source
            .detect_labels(image)
            .await
            .map_err(DetectError::LabelService)?;

        let ingredient = extract_ingredient(&labels);
        log::info!("🥕 Detected ingredient: {:?} (from {} labels)", ingredient, labels.len());

        Ok(ingredient)
    }
}
