use anyhow::Result;

use crate::models::LabelAnnotation;

/// Anything that can turn image bytes into ranked labels (Google Vision, test stubs...)
#[async_trait::async_trait]
pub trait LabelSource: Send + Sync {
    /// Labels in the source's own ranking order, best first
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<LabelAnnotation>>;
}
